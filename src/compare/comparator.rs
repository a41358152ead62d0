// src/compare/comparator.rs

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::compare::analytical::AnalyticalSolution;
use crate::domain::grid::StructuredGrid;
use crate::domain::scenario::ScenarioParameters;
use crate::infra::constants::{source, tolerances};
use crate::infra::error::{AtError, AtResult};
use crate::io::output::TemperatureField;

/// 模拟结果与解析解的并排比对数据集
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonDataset {
    pub backend: String,
    pub scenario: String,
    /// 比对时刻 [s]（模拟输出中最接近请求时刻者）
    pub time: f64,
    /// 稳态解析解还是瞬态解析解
    pub steady: bool,
    /// 相对源项中心的下游 X 坐标 [m]
    pub x: Vec<f64>,
    pub analytical: Vec<f64>,
    pub simulated: Vec<f64>,
    pub residual: Vec<f64>,
}

impl ComparisonDataset {
    pub fn max_abs_residual(&self) -> f64 {
        self.residual.iter().fold(0.0, |acc, r| acc.max(r.abs()))
    }

    pub fn within_tolerance(&self, tolerance: f64) -> bool {
        self.max_abs_residual() <= tolerance
    }

    /// 数据集落盘（JSON，可直接喂给外部绘图工具）
    pub fn write_json(&self, path: &Path) -> AtResult<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .map_err(|e| AtError::io(format!("写入比对数据集 {}", path.display()), e))?;
        Ok(())
    }
}

/// 比对器
///
/// 解析解采样与模拟切片使用同一条列中心坐标推导规则
/// （网格的累计宽度减半宽），坐标原点平移到源项单元中心，
/// 保证残差只反映模型误差。
pub struct Comparator<'g> {
    grid: &'g StructuredGrid,
}

impl<'g> Comparator<'g> {
    pub fn new(grid: &'g StructuredGrid) -> Self {
        Self { grid }
    }

    /// 源项下游（严格以东）各列中心相对源项中心的 X 坐标
    pub fn shifted_centroids(&self) -> Vec<f64> {
        let centroids = self.grid.column_centroids();
        let origin = centroids[source::COLUMN];
        centroids[source::COLUMN + 1..]
            .iter()
            .map(|x| x - origin)
            .collect()
    }

    /// 下游剖面的起始列（源项列的下一列）
    pub fn profile_start_col(&self) -> usize {
        source::COLUMN + 1
    }

    /// 在请求时刻附近对齐模拟场与解析解，产出残差数据集
    pub fn compare(
        &self,
        backend: &str,
        scenario: &str,
        params: &ScenarioParameters,
        field: &TemperatureField,
        analytical: &dyn AnalyticalSolution,
        time: f64,
        steady: bool,
    ) -> AtResult<ComparisonDataset> {
        let x = self.shifted_centroids();

        let time_index = field
            .nearest_time(time)
            .ok_or_else(|| AtError::comparator("温度场不含任何输出时刻".to_string()))?;
        let matched_time = field.times[time_index];
        if (matched_time - time).abs() > tolerances::EPSILON_TIME {
            log::debug!(
                "比对时刻对齐: 请求 {} s, 实际输出 {} s",
                time,
                matched_time
            );
        }

        let simulated = field.centerline(
            time_index,
            source::LAYER,
            source::ROW,
            self.profile_start_col(),
        )?;

        if simulated.len() != x.len() {
            return Err(AtError::comparator(format!(
                "模拟剖面长度 {} 与坐标数 {} 不符",
                simulated.len(),
                x.len()
            )));
        }
        if let Some(pos) = simulated.iter().position(|v| v.is_nan()) {
            return Err(AtError::comparator(format!(
                "模拟剖面在第 {} 列缺失数据 (backend={})",
                self.profile_start_col() + pos,
                backend
            )));
        }

        let reference = if steady {
            analytical.steady_profile(&x, params)
        } else {
            analytical.transient_profile(&x, matched_time, params)
        };
        if reference.len() != x.len() {
            return Err(AtError::comparator(format!(
                "解析解剖面长度 {} 与坐标数 {} 不符",
                reference.len(),
                x.len()
            )));
        }

        let residual = simulated
            .iter()
            .zip(&reference)
            .map(|(s, a)| s - a)
            .collect();

        Ok(ComparisonDataset {
            backend: backend.to_string(),
            scenario: scenario.to_string(),
            time: matched_time,
            steady,
            x,
            analytical: reference,
            simulated,
            residual,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::constants::aquifer;
    use ndarray::Array3;

    /// 常数场桩：解析解恒为初始温度
    struct ConstantSolution;

    impl AnalyticalSolution for ConstantSolution {
        fn steady_profile(&self, x: &[f64], _params: &ScenarioParameters) -> Vec<f64> {
            vec![aquifer::INITIAL_TEMPERATURE; x.len()]
        }

        fn transient_profile(
            &self,
            x: &[f64],
            _time: f64,
            _params: &ScenarioParameters,
        ) -> Vec<f64> {
            vec![aquifer::INITIAL_TEMPERATURE; x.len()]
        }
    }

    fn params() -> ScenarioParameters {
        ScenarioParameters {
            peclet: 1.0,
            gradient: 1.2e-4,
            seepage_velocity: 3.7e-6,
            constant_head_right: 13.964,
        }
    }

    fn uniform_field(grid: &StructuredGrid, value: f64) -> TemperatureField {
        TemperatureField {
            times: vec![8.64e5],
            data: vec![Array3::from_elem(
                (grid.nlay, grid.nrow(), grid.ncol()),
                value,
            )],
        }
    }

    #[test]
    fn test_shifted_centroids_origin() {
        let grid = StructuredGrid::reference().unwrap();
        let comparator = Comparator::new(&grid);
        let x = comparator.shifted_centroids();
        // 源项以东的列数
        assert_eq!(x.len(), grid.ncol() - source::COLUMN - 1);
        // 第一个下游中心点与源项中心的距离是两个半宽之和
        assert!((x[0] - (0.1 / 2.0 + 0.5 / 2.0)).abs() < 1e-12);
        // 坐标严格单调递增
        assert!(x.windows(2).all(|w| w[1] > w[0]));
    }

    #[test]
    fn test_zero_residual_for_matching_fields() {
        let grid = StructuredGrid::reference().unwrap();
        let comparator = Comparator::new(&grid);
        let field = uniform_field(&grid, aquifer::INITIAL_TEMPERATURE);

        let dataset = comparator
            .compare(
                "mf6",
                "hecht-mendez-b",
                &params(),
                &field,
                &ConstantSolution,
                8.64e5,
                false,
            )
            .unwrap();
        assert_eq!(dataset.max_abs_residual(), 0.0);
        assert!(dataset.within_tolerance(tolerances::DEFAULT_COMPARISON_TOLERANCE));
    }

    #[test]
    fn test_nan_cells_reported() {
        let grid = StructuredGrid::reference().unwrap();
        let comparator = Comparator::new(&grid);
        let field = uniform_field(&grid, f64::NAN);

        let err = comparator
            .compare(
                "mf6",
                "hecht-mendez-b",
                &params(),
                &field,
                &ConstantSolution,
                8.64e5,
                true,
            )
            .unwrap_err();
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_dataset_json_roundtrip() {
        let grid = StructuredGrid::reference().unwrap();
        let comparator = Comparator::new(&grid);
        let field = uniform_field(&grid, aquifer::INITIAL_TEMPERATURE);
        let dataset = comparator
            .compare(
                "mt3dms",
                "hecht-mendez-c",
                &params(),
                &field,
                &ConstantSolution,
                1.296e7,
                true,
            )
            .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("comparison.json");
        dataset.write_json(&path).unwrap();
        let back: ComparisonDataset =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(back.backend, "mt3dms");
        assert_eq!(back.x.len(), dataset.x.len());
    }
}
