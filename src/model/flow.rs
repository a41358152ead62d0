// src/model/flow.rs

use serde::{Deserialize, Serialize};

use crate::domain::boundary::BoundaryAssignment;
use crate::domain::grid::StructuredGrid;
use crate::infra::constants::aquifer;
use crate::infra::error::{AtError, AtResult};
use crate::model::schedule::StressPeriod;
use crate::model::solver::{LinearAcceleration, SolverSettings};

/// 稳态流动模型描述
///
/// 后端无关的数据模型：两个后端适配器渲染同一份描述，
/// 描述构建逻辑不按后端重复。单应力期、单时间步，
/// 储水系数为零，流动场在本算例中不随时间演化。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowModelDescriptor {
    /// 模型名（输出工件以此为前缀）
    pub name: String,
    /// 所属情景键
    pub scenario: String,
    /// 空间离散
    pub grid: StructuredGrid,
    /// 时间离散（恒为单稳态应力期）
    pub schedule: StressPeriod,
    /// 初始水头 [m]
    pub initial_head: f64,
    /// 固定水头边界
    pub boundaries: BoundaryAssignment,
    /// 水平渗透系数 [m/s]（均匀各向同性）
    pub hydraulic_conductivity: f64,
    /// 垂直渗透系数 [m/s]
    pub vertical_conductivity: f64,
    /// 贮水率（稳态流动恒为零）
    pub specific_storage: f64,
    /// 给水度（稳态流动恒为零）
    pub specific_yield: f64,
    /// 求解器设置
    pub solver: SolverSettings,
}

impl FlowModelDescriptor {
    pub fn build(
        grid: &StructuredGrid,
        scenario_key: &str,
        boundaries: BoundaryAssignment,
    ) -> AtResult<Self> {
        let descriptor = Self {
            name: format!("gwf-{}", scenario_key),
            scenario: scenario_key.to_string(),
            grid: grid.clone(),
            schedule: StressPeriod::steady_flow(),
            initial_head: aquifer::INITIAL_HEAD,
            boundaries,
            hydraulic_conductivity: aquifer::HK,
            vertical_conductivity: aquifer::VK,
            specific_storage: 0.0,
            specific_yield: 0.0,
            solver: SolverSettings::flow_defaults(),
        };
        descriptor.validate()?;
        Ok(descriptor)
    }

    /// 水头场输出工件名
    pub fn head_artifact(&self) -> String {
        format!("{}.hds", self.name)
    }

    /// 体积通量/预算场输出工件名
    pub fn budget_artifact(&self) -> String {
        format!("{}.bud", self.name)
    }

    pub fn validate(&self) -> AtResult<()> {
        self.grid.validate()?;
        self.boundaries.validate(&self.grid)?;
        self.schedule.validate().map_err(AtError::config)?;
        self.solver.validate().map_err(AtError::config)?;

        if self.schedule.steps != 1.0 {
            return Err(AtError::config(
                "稳态流动模型必须恰好一个时间步".to_string(),
            ));
        }
        if self.specific_storage != 0.0 || self.specific_yield != 0.0 {
            return Err(AtError::config(
                "稳态流动模型的储水参数必须为零".to_string(),
            ));
        }
        if self.hydraulic_conductivity <= 0.0 || self.vertical_conductivity <= 0.0 {
            return Err(AtError::config("渗透系数必须为正数".to_string()));
        }
        if self.solver.acceleration != LinearAcceleration::Cg {
            return Err(AtError::config(
                "流动求解必须使用共轭梯度族加速".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::boundary::BoundaryAssembler;
    use crate::domain::scenario::ScenarioTable;

    fn build_descriptor() -> FlowModelDescriptor {
        let grid = StructuredGrid::reference().unwrap();
        let table = ScenarioTable::reference();
        let (key, params) = table.get(1).unwrap();
        let boundaries = BoundaryAssembler::new(&grid).assemble(params).unwrap();
        FlowModelDescriptor::build(&grid, key, boundaries).unwrap()
    }

    #[test]
    fn test_build_flow_descriptor() {
        let flow = build_descriptor();
        assert_eq!(flow.name, "gwf-hecht-mendez-b");
        assert_eq!(flow.schedule.steps, 1.0);
        assert_eq!(flow.specific_storage, 0.0);
        assert_eq!(flow.head_artifact(), "gwf-hecht-mendez-b.hds");
        assert_eq!(flow.budget_artifact(), "gwf-hecht-mendez-b.bud");
    }

    #[test]
    fn test_transient_flow_rejected() {
        let mut flow = build_descriptor();
        flow.schedule.steps = 10.0;
        assert!(flow.validate().is_err());
    }

    #[test]
    fn test_json_roundtrip() {
        let flow = build_descriptor();
        let json = serde_json::to_string(&flow).unwrap();
        let back: FlowModelDescriptor = serde_json::from_str(&json).unwrap();
        assert_eq!(back.name, flow.name);
        assert_eq!(back.boundaries.cells.len(), flow.boundaries.cells.len());
    }
}
