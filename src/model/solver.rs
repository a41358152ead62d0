// src/model/solver.rs

use serde::{Deserialize, Serialize};

use crate::infra::constants::solver;

/// 线性加速方法
///
/// 流动模型与输运模型使用不同的加速方法。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LinearAcceleration {
    /// 共轭梯度（对称系统，流动求解）
    Cg,
    /// 稳定双共轭梯度（非对称系统，输运求解）
    BicgStab,
}

/// 迭代求解器设置
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SolverSettings {
    /// 外迭代上限
    pub outer_maximum: usize,
    /// 内迭代上限
    pub inner_maximum: usize,
    /// 水头/浓度收敛容差
    pub closure: f64,
    /// 残差收敛容差
    pub residual_closure: f64,
    /// 松弛因子
    pub relaxation: f64,
    /// 线性加速方法
    pub acceleration: LinearAcceleration,
}

impl SolverSettings {
    /// 流动模型缺省设置（共轭梯度族，不松弛）
    pub fn flow_defaults() -> Self {
        Self {
            outer_maximum: solver::OUTER_MAXIMUM,
            inner_maximum: solver::INNER_MAXIMUM,
            closure: solver::HEAD_CLOSURE,
            residual_closure: solver::RESIDUAL_CLOSURE,
            relaxation: solver::RELAXATION,
            acceleration: LinearAcceleration::Cg,
        }
    }

    /// 输运模型缺省设置
    pub fn transport_defaults() -> Self {
        Self {
            acceleration: LinearAcceleration::BicgStab,
            ..Self::flow_defaults()
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.outer_maximum == 0 || self.inner_maximum == 0 {
            return Err("迭代上限必须大于 0".into());
        }
        if self.closure <= 0.0 || self.residual_closure <= 0.0 {
            return Err("收敛容差必须为正数".into());
        }
        if self.relaxation <= 0.0 || self.relaxation > 2.0 {
            return Err("松弛因子应在 (0, 2] 范围内".into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_valid() {
        assert!(SolverSettings::flow_defaults().validate().is_ok());
        assert!(SolverSettings::transport_defaults().validate().is_ok());
    }

    #[test]
    fn test_acceleration_split() {
        assert_eq!(
            SolverSettings::flow_defaults().acceleration,
            LinearAcceleration::Cg
        );
        assert_eq!(
            SolverSettings::transport_defaults().acceleration,
            LinearAcceleration::BicgStab
        );
    }

    #[test]
    fn test_validation_failure() {
        let mut s = SolverSettings::flow_defaults();
        s.closure = 0.0;
        assert!(s.validate().is_err());
    }
}
