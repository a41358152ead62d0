// src/domain/boundary.rs

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::domain::grid::StructuredGrid;
use crate::domain::scenario::ScenarioParameters;
use crate::infra::constants::{aquifer, source};
use crate::infra::error::{AtError, AtResult};

/// 三维单元索引（0 基：层, 行, 列）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellIndex {
    pub layer: usize,
    pub row: usize,
    pub col: usize,
}

impl CellIndex {
    pub fn new(layer: usize, row: usize, col: usize) -> Self {
        Self { layer, row, col }
    }
}

impl std::fmt::Display for CellIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {})", self.layer, self.row, self.col)
    }
}

/// 单个固定水头/固定温度边界单元
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BoundaryCell {
    pub cell: CellIndex,
    /// 固定水头 [m]
    pub head: f64,
    /// 携带的温度值 [K]（两侧都携带初始含水层温度）
    pub temperature: f64,
    /// 输运模型中是否锁定该单元温度（仅左边界锁定）
    pub fixes_temperature: bool,
}

/// 一个应力期内的边界指定集合
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoundaryAssignment {
    pub cells: Vec<BoundaryCell>,
}

impl BoundaryAssignment {
    /// 校验边界覆盖：左右两条边各含 行数 x 层数 个单元，无重复、无遗漏
    pub fn validate(&self, grid: &StructuredGrid) -> AtResult<()> {
        let per_edge = grid.nlay * grid.nrow();
        let right_col = grid.ncol() - 1;

        let mut seen = HashSet::new();
        let mut left = 0usize;
        let mut right = 0usize;

        for bc in &self.cells {
            if !seen.insert(bc.cell) {
                return Err(AtError::config(format!("重复的边界单元: {}", bc.cell)));
            }
            if bc.cell.col == 0 {
                left += 1;
                if !bc.fixes_temperature {
                    return Err(AtError::config(format!(
                        "左边界单元 {} 未锁定温度",
                        bc.cell
                    )));
                }
                if (bc.temperature - aquifer::INITIAL_TEMPERATURE).abs() > f64::EPSILON {
                    return Err(AtError::config(format!(
                        "左边界单元 {} 温度 {} 与初始含水层温度不符",
                        bc.cell, bc.temperature
                    )));
                }
            } else if bc.cell.col == right_col {
                right += 1;
            } else {
                return Err(AtError::config(format!(
                    "边界单元 {} 不在左/右边界列上",
                    bc.cell
                )));
            }
        }

        if left != per_edge || right != per_edge {
            return Err(AtError::config(format!(
                "边界覆盖不完整: 左 {}/{}，右 {}/{}",
                left, per_edge, right, per_edge
            )));
        }

        Ok(())
    }

    pub fn left_cells(&self) -> impl Iterator<Item = &BoundaryCell> {
        self.cells.iter().filter(|bc| bc.cell.col == 0)
    }

    pub fn right_cells(&self) -> impl Iterator<Item = &BoundaryCell> {
        self.cells.iter().filter(|bc| bc.cell.col != 0)
    }
}

/// 井式换热器源项（单点、固定速率）
///
/// 文献正文描述源项占据三个中间层，而原始模型输入仅激活第 7 层；
/// 此处保持输入文件的单层行为。
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SourceTerm {
    pub cell: CellIndex,
    /// 能量注入/抽取速率（负值为抽取）
    pub rate: f64,
    /// 传统后端源汇混合包关联的温度标签
    pub temperature_label: f64,
}

impl SourceTerm {
    pub fn reference() -> Self {
        Self {
            cell: CellIndex::new(source::LAYER, source::ROW, source::COLUMN),
            rate: source::RATE,
            temperature_label: source::LEGACY_TEMPERATURE_LABEL,
        }
    }
}

/// 羽流中心线观测单元集合
///
/// 既用于向模拟器请求观测输出，也用于比对器采样。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservationSet {
    pub cells: Vec<CellIndex>,
}

impl ObservationSet {
    /// 沿源项下游中心线每隔一列取一个观测单元
    pub fn reference() -> Self {
        let cells = (source::COLUMN..source::COLUMN + 201)
            .step_by(2)
            .map(|col| CellIndex::new(source::LAYER, source::ROW, col))
            .collect();
        Self { cells }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// 边界/源项组装器
///
/// 给定网格与情景参数，产出一个应力期的边界指定与源项。
/// 左边界始终是初始水头与初始温度；右边界水头由情景参数决定，
/// 以此实现不同的水力梯度（零 Peclet 情景下右侧与左侧水头一致，
/// 组装器照常构建，是否执行由运行器决定）。
pub struct BoundaryAssembler<'g> {
    grid: &'g StructuredGrid,
}

impl<'g> BoundaryAssembler<'g> {
    pub fn new(grid: &'g StructuredGrid) -> Self {
        Self { grid }
    }

    pub fn assemble(&self, params: &ScenarioParameters) -> AtResult<BoundaryAssignment> {
        params.validate().map_err(AtError::config)?;

        let right_col = self.grid.ncol() - 1;
        let mut cells = Vec::with_capacity(2 * self.grid.nlay * self.grid.nrow());

        for layer in 0..self.grid.nlay {
            for row in 0..self.grid.nrow() {
                cells.push(BoundaryCell {
                    cell: CellIndex::new(layer, row, 0),
                    head: aquifer::INITIAL_HEAD,
                    temperature: aquifer::INITIAL_TEMPERATURE,
                    fixes_temperature: true,
                });
                cells.push(BoundaryCell {
                    cell: CellIndex::new(layer, row, right_col),
                    head: params.constant_head_right,
                    temperature: aquifer::INITIAL_TEMPERATURE,
                    fixes_temperature: false,
                });
            }
        }

        let assignment = BoundaryAssignment { cells };
        assignment.validate(self.grid)?;

        log::debug!(
            "边界组装完成: 左右各 {} 个固定水头单元, 右边界水头 {} m",
            self.grid.nlay * self.grid.nrow(),
            params.constant_head_right
        );

        Ok(assignment)
    }

    /// 源项是情景不变的常数
    pub fn source_term(&self) -> SourceTerm {
        SourceTerm::reference()
    }

    /// 观测集合同样情景不变
    pub fn observations(&self) -> ObservationSet {
        ObservationSet::reference()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::scenario::ScenarioTable;
    use crate::infra::constants::geometry;

    fn grid() -> StructuredGrid {
        StructuredGrid::reference().unwrap()
    }

    #[test]
    fn test_boundary_coverage_all_scenarios() {
        let grid = grid();
        let assembler = BoundaryAssembler::new(&grid);
        let table = ScenarioTable::reference();

        for (_, params) in table.iter() {
            let assignment = assembler.assemble(params).unwrap();
            assert!(assignment.validate(&grid).is_ok());
            let per_edge = geometry::NLAY * geometry::NROW;
            assert_eq!(assignment.left_cells().count(), per_edge);
            assert_eq!(assignment.right_cells().count(), per_edge);
            assert_eq!(assignment.cells.len(), 2 * per_edge);
        }
    }

    #[test]
    fn test_left_edge_temperature_fixed() {
        let grid = grid();
        let assembler = BoundaryAssembler::new(&grid);
        let table = ScenarioTable::reference();
        let (_, params) = table.get(1).unwrap();
        let assignment = assembler.assemble(params).unwrap();

        for bc in assignment.left_cells() {
            assert!(bc.fixes_temperature);
            assert_eq!(bc.temperature, aquifer::INITIAL_TEMPERATURE);
            assert_eq!(bc.head, aquifer::INITIAL_HEAD);
        }
        for bc in assignment.right_cells() {
            assert!(!bc.fixes_temperature);
            assert_eq!(bc.head, params.constant_head_right);
        }
    }

    #[test]
    fn test_duplicate_cell_rejected() {
        let grid = grid();
        let assembler = BoundaryAssembler::new(&grid);
        let table = ScenarioTable::reference();
        let (_, params) = table.get(1).unwrap();
        let mut assignment = assembler.assemble(params).unwrap();
        assignment.cells.push(assignment.cells[0]);
        assert!(assignment.validate(&grid).is_err());
    }

    #[test]
    fn test_zero_peclet_constructible() {
        // 零 Peclet 情景没有解析解对照，但组装必须照常工作
        let grid = grid();
        let assembler = BoundaryAssembler::new(&grid);
        let table = ScenarioTable::reference();
        let (_, params) = table.get(0).unwrap();
        let assignment = assembler.assemble(params).unwrap();
        for bc in assignment.right_cells() {
            assert_eq!(bc.head, aquifer::INITIAL_HEAD);
        }
    }

    #[test]
    fn test_source_term_reference() {
        let st = SourceTerm::reference();
        assert_eq!(st.cell, CellIndex::new(6, 41, 21));
        assert!(st.rate < 0.0);
    }

    #[test]
    fn test_observation_set_along_centerline() {
        let obs = ObservationSet::reference();
        assert_eq!(obs.len(), 101);
        assert!(obs.cells.iter().all(|c| c.layer == source::LAYER));
        assert!(obs.cells.iter().all(|c| c.row == source::ROW));
        assert_eq!(obs.cells[0].col, source::COLUMN);
        assert_eq!(obs.cells[1].col, source::COLUMN + 2);
    }

    #[test]
    fn test_observations_inside_grid() {
        let grid = grid();
        let obs = ObservationSet::reference();
        assert!(obs.cells.iter().all(|c| c.col < grid.ncol()));
    }
}
