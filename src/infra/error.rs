// src/infra/error.rs

use thiserror::Error;

pub type AtResult<T> = Result<T, AtError>;

/// 统一错误类型
///
/// 按照可恢复性分为两类：
/// - 配置类错误（网格定义、方案选择、耦合前置条件）是致命的，
///   必须在调用任何求解器之前中止当前情景；
/// - 执行类错误（外部求解器退出码非零、比对数据缺失）是情景级可恢复的，
///   批处理驱动记录后继续处理后续情景。
#[derive(Debug, Error)]
pub enum AtError {
    #[error("IO 错误 ({context}): {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("配置错误: {0}")]
    Config(String),

    #[error("网格错误: {message}")]
    InvalidGrid { message: String },

    #[error("不支持的情景 ({key}): {reason}")]
    UnsupportedScenario { key: String, reason: String },

    #[error("耦合前置条件违反: {message}")]
    CouplingPrecondition { message: String },

    #[error("求解器执行失败 [{backend}]: {message}")]
    Execution { backend: String, message: String },

    #[error("比对错误: {message}")]
    Comparator { message: String },

    #[error("序列化错误: {0}")]
    Serialization(String),
}

impl AtError {
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn invalid_grid(msg: impl Into<String>) -> Self {
        Self::InvalidGrid {
            message: msg.into(),
        }
    }

    pub fn unsupported_scenario(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::UnsupportedScenario {
            key: key.into(),
            reason: reason.into(),
        }
    }

    pub fn coupling(msg: impl Into<String>) -> Self {
        Self::CouplingPrecondition {
            message: msg.into(),
        }
    }

    pub fn execution(backend: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Execution {
            backend: backend.into(),
            message: msg.into(),
        }
    }

    pub fn comparator(msg: impl Into<String>) -> Self {
        Self::Comparator {
            message: msg.into(),
        }
    }

    /// 是否为致命错误（配置类）
    ///
    /// 致命错误要求批处理驱动全部停止；
    /// 非致命错误（执行/比对类）仅跳过当前情景或当前后端。
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::Execution { .. } | Self::Comparator { .. })
    }
}

impl From<std::io::Error> for AtError {
    fn from(e: std::io::Error) -> Self {
        Self::Io {
            context: "IO 操作".into(),
            source: e,
        }
    }
}

impl From<serde_json::Error> for AtError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}
