// src/domain/grid.rs

use serde::{Deserialize, Serialize};

use crate::infra::constants::{geometry, tolerances};
use crate::infra::error::{AtError, AtResult};

/// 非均匀结构化三维网格
///
/// 两个水平轴各有一条非均匀宽度序列，源项所在的行/列加密到 0.1 m，
/// 向计算域边缘按块状几何级数放粗到 10~16 m；垂向为等厚分层。
/// 进程内构建一次，之后不可变。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredGrid {
    /// 列宽序列 (X 方向) [m]，长度 = 列数
    pub delr: Vec<f64>,
    /// 行宽序列 (Y 方向) [m]，长度 = 行数
    pub delc: Vec<f64>,
    /// 层数
    pub nlay: usize,
    /// 层厚 [m]
    pub delz: f64,
    /// 顶面高程 [m]
    pub top: f64,
    /// 各层底面高程 [m]
    pub botm: Vec<f64>,
}

/// 将 (重复次数, 宽度) 块展开为宽度序列
fn expand_blocks(blocks: &[(usize, f64)]) -> Vec<f64> {
    let mut widths = Vec::new();
    for &(count, width) in blocks {
        for _ in 0..count {
            widths.push(width);
        }
    }
    widths
}

impl StructuredGrid {
    /// 构建基准算例的参考网格（情景无关的固定几何）
    pub fn reference() -> AtResult<Self> {
        // 列宽：域边缘 10 m，向源项列逐块加密至 0.1 m，
        // 源项下游以 0.5 m 分辨率延伸 100 m，最后一列 15.9 m 闭合总长
        let delr = expand_blocks(&[
            (3, 10.0),
            (2, 8.0),
            (2, 4.0),
            (2, 2.0),
            (4, 1.0),
            (8, 0.5),
            (1, 0.1),
            (200, 0.5),
            (10, 1.0),
            (2, 2.0),
            (2, 4.0),
            (2, 8.0),
            (8, 10.0),
            (1, 15.9),
        ]);

        // 行宽：关于源项行对称加密
        let delc = expand_blocks(&[
            (6, 10.0),
            (1, 8.0),
            (2, 4.0),
            (2, 2.0),
            (10, 1.0),
            (20, 0.5),
            (1, 0.1),
            (20, 0.5),
            (10, 1.0),
            (2, 2.0),
            (2, 4.0),
            (1, 8.0),
            (6, 10.0),
        ]);

        Self::new(delr, delc, geometry::NLAY, geometry::DELZ, geometry::TOP)
    }

    /// 由宽度序列和分层参数构建网格，并立即校验
    pub fn new(
        delr: Vec<f64>,
        delc: Vec<f64>,
        nlay: usize,
        delz: f64,
        top: f64,
    ) -> AtResult<Self> {
        let botm = (1..=nlay).map(|k| top - delz * k as f64).collect();
        let grid = Self {
            delr,
            delc,
            nlay,
            delz,
            top,
            botm,
        };
        grid.validate()?;
        Ok(grid)
    }

    pub fn ncol(&self) -> usize {
        self.delr.len()
    }

    pub fn nrow(&self) -> usize {
        self.delc.len()
    }

    pub fn total_cells(&self) -> usize {
        self.nlay * self.nrow() * self.ncol()
    }

    /// 列中心 X 坐标：累计宽度减去半宽
    ///
    /// 该中心点推导规则同时服务于模拟输出切片与解析解采样，
    /// 保证残差只反映模型误差而非坐标构造漂移。
    pub fn column_centroids(&self) -> Vec<f64> {
        Self::centroids_of(&self.delr)
    }

    /// 行中心 Y 坐标
    pub fn row_centroids(&self) -> Vec<f64> {
        Self::centroids_of(&self.delc)
    }

    fn centroids_of(widths: &[f64]) -> Vec<f64> {
        let mut centroids = Vec::with_capacity(widths.len());
        let mut cum = 0.0;
        for &w in widths {
            cum += w;
            centroids.push(cum - 0.5 * w);
        }
        centroids
    }

    /// 校验网格定义
    ///
    /// 宽度序列与申明的计算域范围不符属于配置错误，必须立即失败，
    /// 而不是静默缩放。
    pub fn validate(&self) -> AtResult<()> {
        if self.nlay == 0 || self.nrow() == 0 || self.ncol() == 0 {
            return Err(AtError::invalid_grid("层数/行数/列数必须大于 0"));
        }
        if self.delz <= 0.0 {
            return Err(AtError::invalid_grid("层厚必须为正数"));
        }
        if let Some(w) = self
            .delr
            .iter()
            .chain(self.delc.iter())
            .find(|w| **w <= 0.0)
        {
            return Err(AtError::invalid_grid(format!("存在非正的网格宽度: {}", w)));
        }

        let sum_r: f64 = self.delr.iter().sum();
        if (sum_r - geometry::DOMAIN_LENGTH).abs() > tolerances::EPSILON_WIDTH_SUM {
            return Err(AtError::invalid_grid(format!(
                "列宽总和 {:.6} m 与计算域长度 {} m 不符",
                sum_r,
                geometry::DOMAIN_LENGTH
            )));
        }

        let sum_c: f64 = self.delc.iter().sum();
        if (sum_c - geometry::DOMAIN_WIDTH).abs() > tolerances::EPSILON_WIDTH_SUM {
            return Err(AtError::invalid_grid(format!(
                "行宽总和 {:.6} m 与计算域宽度 {} m 不符",
                sum_c,
                geometry::DOMAIN_WIDTH
            )));
        }

        if self.botm.len() != self.nlay {
            return Err(AtError::invalid_grid("层底高程数量与层数不符"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::constants::source;

    #[test]
    fn test_reference_grid_dimensions() {
        let grid = StructuredGrid::reference().unwrap();
        assert_eq!(grid.ncol(), geometry::NCOL);
        assert_eq!(grid.nrow(), geometry::NROW);
        assert_eq!(grid.nlay, geometry::NLAY);
    }

    #[test]
    fn test_width_sums_match_domain() {
        let grid = StructuredGrid::reference().unwrap();
        let sum_r: f64 = grid.delr.iter().sum();
        let sum_c: f64 = grid.delc.iter().sum();
        assert!((sum_r - geometry::DOMAIN_LENGTH).abs() < tolerances::EPSILON_WIDTH_SUM);
        assert!((sum_c - geometry::DOMAIN_WIDTH).abs() < tolerances::EPSILON_WIDTH_SUM);
    }

    #[test]
    fn test_finest_cell_at_source() {
        let grid = StructuredGrid::reference().unwrap();
        assert_eq!(grid.delr[source::COLUMN], geometry::FINEST_WIDTH);
        assert_eq!(grid.delc[source::ROW], geometry::FINEST_WIDTH);
        // 源项单元是唯一的最细列/行
        assert_eq!(
            grid.delr
                .iter()
                .filter(|w| **w == geometry::FINEST_WIDTH)
                .count(),
            1
        );
        assert_eq!(
            grid.delc
                .iter()
                .filter(|w| **w == geometry::FINEST_WIDTH)
                .count(),
            1
        );
    }

    #[test]
    fn test_centroid_rule() {
        let grid = StructuredGrid::new(
            vec![10.0, 4.0, 2.0],
            vec![1.0; 0],
            1,
            1.0,
            0.0,
        );
        // 行宽为空的网格不合法
        assert!(grid.is_err());

        let centroids = StructuredGrid::centroids_of(&[10.0, 4.0, 2.0]);
        assert_eq!(centroids, vec![5.0, 12.0, 15.0]);
    }

    #[test]
    fn test_layer_bottoms() {
        let grid = StructuredGrid::reference().unwrap();
        assert_eq!(grid.botm.len(), geometry::NLAY);
        assert!((grid.botm[0] - 12.0).abs() < tolerances::EPSILON);
        assert!((grid.botm[geometry::NLAY - 1] - 0.0).abs() < tolerances::EPSILON);
    }

    #[test]
    fn test_invalid_width_sum_is_fatal() {
        let mut delr = StructuredGrid::reference().unwrap().delr;
        let delc = StructuredGrid::reference().unwrap().delc;
        delr[0] += 1.0;
        let err = StructuredGrid::new(delr, delc, geometry::NLAY, geometry::DELZ, geometry::TOP)
            .unwrap_err();
        assert!(err.is_fatal());
        assert!(matches!(err, AtError::InvalidGrid { .. }));
    }
}
