// src/domain/scenario.rs

use serde::{Deserialize, Serialize};

use crate::infra::error::{AtError, AtResult};

/// 情景物理参数
///
/// 三个 Peclet 工况并非通过独立的速度场实现，而是通过右边界
/// 固定水头的取值产生不同的水力梯度。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScenarioParameters {
    /// Peclet 数（对流与扩散输运速率之比，选择输运工况）
    pub peclet: f64,
    /// 水力梯度 [m/m]
    pub gradient: f64,
    /// 渗流速度 [m/s]
    pub seepage_velocity: f64,
    /// 右边界固定水头 [m]
    pub constant_head_right: f64,
}

impl ScenarioParameters {
    pub fn validate(&self) -> Result<(), String> {
        if !self.peclet.is_finite() || self.peclet < 0.0 {
            return Err(format!("Peclet 数必须为非负有限值: {}", self.peclet));
        }
        if !self.constant_head_right.is_finite() {
            return Err("右边界水头必须为有限值".into());
        }
        if self.seepage_velocity < 0.0 {
            return Err("渗流速度不能为负数".into());
        }
        Ok(())
    }
}

/// 命名情景的有序表
///
/// 情景通过序号寻址；越界序号属于配置错误。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioTable {
    entries: Vec<(String, ScenarioParameters)>,
}

impl ScenarioTable {
    /// 基准算例的三个参考情景
    ///
    /// 情景 a (Peclet = 0) 可以构建但没有解析解对照，
    /// 默认批处理入口将其排除。
    pub fn reference() -> Self {
        Self {
            entries: vec![
                (
                    "hecht-mendez-a".to_string(),
                    ScenarioParameters {
                        peclet: 0.0,
                        gradient: 0.0,
                        seepage_velocity: 0.0,
                        constant_head_right: 14.0,
                    },
                ),
                (
                    "hecht-mendez-b".to_string(),
                    ScenarioParameters {
                        peclet: 1.0,
                        gradient: 1.2e-4,
                        seepage_velocity: 3.7e-6,
                        constant_head_right: 13.964,
                    },
                ),
                (
                    "hecht-mendez-c".to_string(),
                    ScenarioParameters {
                        peclet: 10.0,
                        gradient: 1.2e-3,
                        seepage_velocity: 3.7e-5,
                        constant_head_right: 13.64,
                    },
                ),
            ],
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 按序号取情景；越界立即返回配置错误
    pub fn get(&self, index: usize) -> AtResult<(&str, &ScenarioParameters)> {
        self.entries
            .get(index)
            .map(|(key, params)| (key.as_str(), params))
            .ok_or_else(|| {
                AtError::config(format!(
                    "情景序号 {} 越界（共 {} 个情景）",
                    index,
                    self.entries.len()
                ))
            })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ScenarioParameters)> {
        self.entries.iter().map(|(k, p)| (k.as_str(), p))
    }

    /// 默认批处理的情景序号（排除无解析解对照的情景 a）
    pub fn default_batch(&self) -> Vec<usize> {
        self.iter()
            .enumerate()
            .filter(|(_, (_, p))| p.peclet > 0.0)
            .map(|(i, _)| i)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_table() {
        let table = ScenarioTable::reference();
        assert_eq!(table.len(), 3);
        let (key, params) = table.get(1).unwrap();
        assert_eq!(key, "hecht-mendez-b");
        assert_eq!(params.peclet, 1.0);
        assert_eq!(params.constant_head_right, 13.964);
    }

    #[test]
    fn test_out_of_range_index() {
        let table = ScenarioTable::reference();
        let err = table.get(3).unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn test_default_batch_excludes_diffusive() {
        let table = ScenarioTable::reference();
        assert_eq!(table.default_batch(), vec![1, 2]);
    }

    #[test]
    fn test_parameter_validation() {
        let table = ScenarioTable::reference();
        let (_, params) = table.get(0).unwrap();
        assert!(params.validate().is_ok());

        let bad = ScenarioParameters {
            peclet: -1.0,
            gradient: 0.0,
            seepage_velocity: 0.0,
            constant_head_right: 14.0,
        };
        assert!(bad.validate().is_err());
    }
}
