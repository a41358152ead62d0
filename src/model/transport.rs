// src/model/transport.rs

use serde::{Deserialize, Serialize};

use crate::domain::boundary::{BoundaryAssignment, ObservationSet, SourceTerm};
use crate::domain::grid::StructuredGrid;
use crate::domain::scenario::ScenarioParameters;
use crate::infra::constants::{aquifer, transport};
use crate::infra::error::{AtError, AtResult};
use crate::model::coupling::CouplingLink;
use crate::model::flow::FlowModelDescriptor;
use crate::model::schedule::{StressPeriod, TransportRegime};
use crate::model::solver::SolverSettings;

/// 对流离散格式
///
/// 由单个离散控制参数决定的双态状态机：
/// 非负值选择迎风加权，哨兵值 -1 选择 TVD 限制格式，
/// 其余取值一律视为无法识别的配置。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdvectionScheme {
    Upstream,
    Tvd,
}

impl AdvectionScheme {
    pub fn from_control(control: i32) -> AtResult<Self> {
        if control >= 0 {
            Ok(Self::Upstream)
        } else if control == -1 {
            Ok(Self::Tvd)
        } else {
            Err(AtError::config(format!(
                "无法识别的对流格式控制参数: {}",
                control
            )))
        }
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            Self::Upstream => "UPSTREAM",
            Self::Tvd => "TVD",
        }
    }
}

/// 弥散包
///
/// 纵向弥散度为零时整个弥散包被省略，而不是带退化系数写出。
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DispersionPackage {
    /// 纵向弥散度 [m]
    pub longitudinal: f64,
    /// 水平横向弥散度 [m]（纵向 x 比值）
    pub transverse_horizontal: f64,
    /// 垂直横向弥散度 [m]（纵向 x 比值）
    pub transverse_vertical: f64,
    /// 分子扩散系数 [m^2/s]
    pub molecular_diffusion: f64,
}

impl DispersionPackage {
    /// 由纵向弥散度和两个比值推导；零弥散度 -> None
    pub fn derive(
        longitudinal: f64,
        ratio_horizontal: f64,
        ratio_vertical: f64,
        molecular_diffusion: f64,
    ) -> Option<Self> {
        if longitudinal == 0.0 {
            return None;
        }
        Some(Self {
            longitudinal,
            transverse_horizontal: longitudinal * ratio_horizontal,
            transverse_vertical: longitudinal * ratio_vertical,
            molecular_diffusion,
        })
    }
}

/// 线性平衡吸附包
///
/// 本算例恒开启（热迟滞的等效表示），但保持可关断能力
/// 以服务其他情景。
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SorptionPackage {
    pub enabled: bool,
    /// 干容重 [g/cm^3]
    pub bulk_density: f64,
    /// 分配系数 Kd [cm^3/g]
    pub distribution_coefficient: f64,
}

impl SorptionPackage {
    pub fn linear_defaults() -> Self {
        Self {
            enabled: true,
            bulk_density: aquifer::BULK_DENSITY,
            distribution_coefficient: aquifer::DISTRIBUTION_COEFFICIENT,
        }
    }
}

/// 输运模型描述
///
/// 时间方案取决于 Peclet 工况而非单一固定方案；
/// 定稿 (finalize) 之前必须消费一个已完成的耦合句柄，
/// 这是本模型最关键的前置条件。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransportModelDescriptor {
    /// 模型名
    pub name: String,
    /// 所属情景键
    pub scenario: String,
    /// 配对流动模型名
    pub flow_model: String,
    /// 空间离散（与流动模型一致）
    pub grid: StructuredGrid,
    /// 输运工况
    pub regime: TransportRegime,
    /// 时间离散
    pub schedule: StressPeriod,
    /// 对流格式
    pub advection: AdvectionScheme,
    /// Courant 数目标
    pub courant_target: f64,
    /// 弥散包（纵向弥散度为零时省略）
    pub dispersion: Option<DispersionPackage>,
    /// 吸附包
    pub sorption: SorptionPackage,
    /// 孔隙度
    pub porosity: f64,
    /// 初始温度场 [K]
    pub initial_temperature: f64,
    /// 非活动单元标记
    pub inactive_marker: f64,
    /// 最小饱和厚度比例
    pub min_saturated_fraction: f64,
    /// 输出时刻 [s]
    pub output_times: Vec<f64>,
    /// 内部子步数上限
    pub max_internal_steps: u32,
    /// 初始步长提示 [s]（零渗流速度时传统后端使用；0 表示交给模拟器）
    pub initial_step_hint: f64,
    /// 井源项
    pub source: SourceTerm,
    /// 边界温度指定（与流动模型共享同一组装结果）
    pub boundaries: BoundaryAssignment,
    /// 中心线观测集合
    pub observations: ObservationSet,
    /// 求解器设置
    pub solver: SolverSettings,

    /// 已解析的耦合句柄；仅 finalize 能够填充
    #[serde(skip)]
    coupling: Option<CouplingLink>,
}

impl TransportModelDescriptor {
    /// 构建输运模型描述
    ///
    /// 对流动描述的引用表达了数据依赖：输运模型的输入部分
    /// 来自流动模型的输出工件。
    #[allow(clippy::too_many_arguments)]
    pub fn build(
        grid: &StructuredGrid,
        scenario_key: &str,
        params: &ScenarioParameters,
        flow: &FlowModelDescriptor,
        boundaries: BoundaryAssignment,
        source: SourceTerm,
        observations: ObservationSet,
        advection_control: i32,
    ) -> AtResult<Self> {
        let regime = TransportRegime::classify(params.peclet)?;
        let schedule = regime.schedule(scenario_key)?;
        let advection = AdvectionScheme::from_control(advection_control)?;

        let dispersion = DispersionPackage::derive(
            aquifer::LONGITUDINAL_DISPERSIVITY,
            aquifer::TRANSVERSE_RATIO_HORIZONTAL,
            aquifer::TRANSVERSE_RATIO_VERTICAL,
            aquifer::MOLECULAR_DIFFUSION,
        );

        // 零渗流速度时给传统后端一个保守的初始步长
        let initial_step_hint = if params.seepage_velocity == 0.0 {
            transport::DIFFUSIVE_STEP_HINT
        } else {
            0.0
        };

        let descriptor = Self {
            name: format!("gwt-{}", scenario_key),
            scenario: scenario_key.to_string(),
            flow_model: flow.name.clone(),
            grid: grid.clone(),
            regime,
            schedule,
            advection,
            courant_target: transport::COURANT_TARGET,
            dispersion,
            sorption: SorptionPackage::linear_defaults(),
            porosity: aquifer::POROSITY,
            initial_temperature: aquifer::INITIAL_TEMPERATURE,
            inactive_marker: transport::INACTIVE_MARKER,
            min_saturated_fraction: transport::MIN_SATURATED_FRACTION,
            output_times: transport::OUTPUT_TIMES.to_vec(),
            max_internal_steps: transport::MAX_INTERNAL_STEPS,
            initial_step_hint,
            source,
            boundaries,
            observations,
            solver: SolverSettings::transport_defaults(),
            coupling: None,
        };
        descriptor.validate()?;
        Ok(descriptor)
    }

    /// 用已完成的耦合句柄定稿
    ///
    /// 在配对流动执行成功之前定稿属于顺序违规，
    /// 必须在任何模拟器调用之前被发现。
    pub fn finalize(&mut self, link: &CouplingLink) -> AtResult<()> {
        link.require_completed()?;
        if link.flow_model != self.flow_model {
            return Err(AtError::coupling(format!(
                "耦合句柄属于流动模型 {}，而输运模型 {} 配对的是 {}",
                link.flow_model, self.name, self.flow_model
            )));
        }
        self.coupling = Some(link.clone());
        log::debug!(
            "输运模型 {} 已定稿, 耦合 {}",
            self.name,
            link.artifacts.describe()
        );
        Ok(())
    }

    pub fn is_finalized(&self) -> bool {
        self.coupling.is_some()
    }

    /// 取已解析的耦合句柄；未定稿即取用属于前置条件违反
    pub fn coupling(&self) -> AtResult<&CouplingLink> {
        self.coupling.as_ref().ok_or_else(|| {
            AtError::coupling(format!(
                "输运模型 {} 尚未定稿（缺少流动模型 {} 的输出句柄）",
                self.name, self.flow_model
            ))
        })
    }

    pub fn validate(&self) -> AtResult<()> {
        self.grid.validate()?;
        self.boundaries.validate(&self.grid)?;
        self.schedule.validate().map_err(AtError::config)?;
        self.solver.validate().map_err(AtError::config)?;

        if self.porosity <= 0.0 || self.porosity >= 1.0 {
            return Err(AtError::config(format!(
                "孔隙度必须在 (0, 1) 范围内: {}",
                self.porosity
            )));
        }
        if let Some(dsp) = &self.dispersion {
            if dsp.longitudinal <= 0.0 {
                return Err(AtError::config(
                    "弥散包存在时纵向弥散度必须为正数".to_string(),
                ));
            }
        }
        if self.source.cell.layer >= self.grid.nlay
            || self.source.cell.row >= self.grid.nrow()
            || self.source.cell.col >= self.grid.ncol()
        {
            return Err(AtError::config(format!(
                "源项单元 {} 超出网格范围",
                self.source.cell
            )));
        }
        if self.output_times.is_empty() {
            return Err(AtError::config("至少需要一个输出时刻".to_string()));
        }
        for t in &self.output_times {
            if *t <= 0.0 || *t > self.schedule.length {
                return Err(AtError::config(format!(
                    "输出时刻 {} 超出应力期范围",
                    t
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::boundary::BoundaryAssembler;
    use crate::domain::scenario::ScenarioTable;
    use crate::model::coupling::CouplingArtifacts;
    use std::path::PathBuf;

    fn build_pair(index: usize) -> (FlowModelDescriptor, TransportModelDescriptor) {
        let grid = StructuredGrid::reference().unwrap();
        let table = ScenarioTable::reference();
        let (key, params) = table.get(index).unwrap();
        let assembler = BoundaryAssembler::new(&grid);
        let boundaries = assembler.assemble(params).unwrap();
        let flow = FlowModelDescriptor::build(&grid, key, boundaries.clone()).unwrap();
        let transport = TransportModelDescriptor::build(
            &grid,
            key,
            params,
            &flow,
            boundaries,
            assembler.source_term(),
            assembler.observations(),
            transport::ADVECTION_CONTROL,
        )
        .unwrap();
        (flow, transport)
    }

    #[test]
    fn test_advection_scheme_selection() {
        assert_eq!(
            AdvectionScheme::from_control(0).unwrap(),
            AdvectionScheme::Upstream
        );
        assert_eq!(
            AdvectionScheme::from_control(3).unwrap(),
            AdvectionScheme::Upstream
        );
        assert_eq!(
            AdvectionScheme::from_control(-1).unwrap(),
            AdvectionScheme::Tvd
        );
        let err = AdvectionScheme::from_control(-2).unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn test_dispersion_omitted_when_zero() {
        assert!(DispersionPackage::derive(0.0, 0.1, 0.1, 1.84e-6).is_none());

        let dsp = DispersionPackage::derive(0.5, 0.1, 0.1, 1.84e-6).unwrap();
        assert!((dsp.transverse_horizontal - 0.05).abs() < 1e-12);
        assert!((dsp.transverse_vertical - 0.05).abs() < 1e-12);
    }

    #[test]
    fn test_build_intermediate_regime() {
        let (_, tr) = build_pair(1);
        assert_eq!(tr.regime, TransportRegime::GeometricRefinement);
        assert_eq!(tr.schedule.steps, 25.0);
        assert_eq!(tr.schedule.multiplier, 1.3);
        assert_eq!(tr.advection, AdvectionScheme::Tvd);
        assert!(tr.sorption.enabled);
        assert_eq!(tr.initial_step_hint, 0.0);
        assert_eq!(tr.flow_model, "gwf-hecht-mendez-b");
    }

    #[test]
    fn test_diffusive_scenario_refused() {
        let grid = StructuredGrid::reference().unwrap();
        let table = ScenarioTable::reference();
        let (key, params) = table.get(0).unwrap();
        let assembler = BoundaryAssembler::new(&grid);
        let boundaries = assembler.assemble(params).unwrap();
        let flow = FlowModelDescriptor::build(&grid, key, boundaries.clone()).unwrap();
        let err = TransportModelDescriptor::build(
            &grid,
            key,
            params,
            &flow,
            boundaries,
            assembler.source_term(),
            assembler.observations(),
            transport::ADVECTION_CONTROL,
        )
        .unwrap_err();
        assert!(matches!(err, AtError::UnsupportedScenario { .. }));
    }

    #[test]
    fn test_finalize_requires_completed_link() {
        let (flow, mut tr) = build_pair(1);
        assert!(!tr.is_finalized());
        assert!(tr.coupling().is_err());

        let pending = CouplingLink::pending(
            flow.name.clone(),
            CouplingArtifacts::SplitFields {
                head: PathBuf::from(flow.head_artifact()),
                budget: PathBuf::from(flow.budget_artifact()),
            },
        );
        let err = tr.finalize(&pending).unwrap_err();
        assert!(matches!(err, AtError::CouplingPrecondition { .. }));

        let done = CouplingLink::completed(
            flow.name.clone(),
            CouplingArtifacts::SplitFields {
                head: PathBuf::from(flow.head_artifact()),
                budget: PathBuf::from(flow.budget_artifact()),
            },
        );
        tr.finalize(&done).unwrap();
        assert!(tr.is_finalized());
        assert!(tr.coupling().is_ok());
    }

    #[test]
    fn test_finalize_rejects_foreign_link() {
        let (_, mut tr) = build_pair(1);
        let foreign = CouplingLink::completed(
            "gwf-other",
            CouplingArtifacts::LinkFile {
                path: PathBuf::from("other.ftl"),
            },
        );
        assert!(tr.finalize(&foreign).is_err());
    }

    #[test]
    fn test_serialization_skips_coupling() {
        let (flow, mut tr) = build_pair(2);
        let done = CouplingLink::completed(
            flow.name.clone(),
            CouplingArtifacts::LinkFile {
                path: PathBuf::from("flow.ftl"),
            },
        );
        tr.finalize(&done).unwrap();

        let json = serde_json::to_string(&tr).unwrap();
        let back: TransportModelDescriptor = serde_json::from_str(&json).unwrap();
        // 运行期句柄不随模型定义序列化
        assert!(!back.is_finalized());
        assert_eq!(back.name, tr.name);
    }
}
