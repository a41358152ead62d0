// src/model/schedule.rs

use serde::{Deserialize, Serialize};

use crate::infra::constants::{tolerances, transport};
use crate::infra::error::{AtError, AtResult};

/// 应力期定义：(时长, 步数, 步长放大系数)
///
/// 步数以 f64 承载：固定步长工况的商 (100/3) 不是整数，
/// 原始输入即把分数步数原样传给模拟器，此处保持该语义。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StressPeriod {
    /// 应力期时长 [s]
    pub length: f64,
    /// 时间步数
    pub steps: f64,
    /// 步长放大系数
    pub multiplier: f64,
}

impl StressPeriod {
    /// 稳态流动：单应力期、单时间步，流动场不随时间演化
    pub fn steady_flow() -> Self {
        Self {
            length: transport::SIMULATION_PERIOD,
            steps: 1.0,
            multiplier: 1.0,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.length <= 0.0 {
            return Err("应力期时长必须为正数".into());
        }
        if self.steps <= 0.0 {
            return Err("时间步数必须为正数".into());
        }
        if self.multiplier < 1.0 {
            return Err("步长放大系数不能小于 1.0".into());
        }
        Ok(())
    }

    /// 均分步长 [s]（放大系数为 1 时）
    pub fn uniform_step_length(&self) -> f64 {
        self.length / self.steps
    }
}

/// 输运时间方案工况
///
/// 由 Peclet 数选择，三个工况各自拥有独立的时间离散推导规则，
/// 避免分支散落在构建路径中。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransportRegime {
    /// 纯扩散（Peclet = 0）：没有解析解对照，拒绝执行
    Diffusive,
    /// 中间工况（0 < Peclet < 10）：固定总时长、少量逐步加长的时间步
    GeometricRefinement,
    /// 对流主导（Peclet >= 10）：基准单元倍数推导的固定步长
    FixedStep,
}

impl TransportRegime {
    /// 由 Peclet 数分类工况
    pub fn classify(peclet: f64) -> AtResult<Self> {
        if !peclet.is_finite() || peclet < 0.0 {
            return Err(AtError::config(format!(
                "无法识别的 Peclet 数: {}",
                peclet
            )));
        }
        if peclet == 0.0 {
            Ok(Self::Diffusive)
        } else if peclet < 10.0 {
            Ok(Self::GeometricRefinement)
        } else {
            Ok(Self::FixedStep)
        }
    }

    /// 推导本工况的输运应力期
    ///
    /// 纯扩散工况没有可检验的参照解，必须拒绝而不是产出
    /// 无法核对的结果。
    pub fn schedule(&self, scenario_key: &str) -> AtResult<StressPeriod> {
        match self {
            Self::Diffusive => Err(AtError::unsupported_scenario(
                scenario_key,
                "纯扩散工况没有解析解对照，不参与端到端执行",
            )),
            Self::GeometricRefinement => Ok(StressPeriod {
                length: transport::SIMULATION_PERIOD,
                steps: transport::GEOMETRIC_STEPS,
                multiplier: transport::GEOMETRIC_MULTIPLIER,
            }),
            Self::FixedStep => {
                let step = transport::BASELINE_STEP * transport::FIXED_STEP_MULTIPLE;
                let steps = transport::SIMULATION_PERIOD / step;
                debug_assert!(
                    (steps * step - transport::SIMULATION_PERIOD).abs() < tolerances::EPSILON
                );
                Ok(StressPeriod {
                    length: transport::SIMULATION_PERIOD,
                    steps,
                    multiplier: 1.0,
                })
            }
        }
    }
}
