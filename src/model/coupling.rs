// src/model/coupling.rs

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::infra::error::{AtError, AtResult};

/// 流动输出工件的具体形态
///
/// 统一后端以分立的水头场与体积通量场文件交接；
/// 传统后端以单个链接文件打包同样的两类工件。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CouplingArtifacts {
    /// 分立文件：水头场 + 通量/预算场
    SplitFields { head: PathBuf, budget: PathBuf },
    /// 单个链接文件
    LinkFile { path: PathBuf },
}

impl CouplingArtifacts {
    pub fn describe(&self) -> String {
        match self {
            Self::SplitFields { head, budget } => {
                format!("head={} budget={}", head.display(), budget.display())
            }
            Self::LinkFile { path } => format!("link={}", path.display()),
        }
    }
}

/// 流动 -> 输运的显式耦合句柄
///
/// 输运模型对流动模型输出的依赖是单向的文件中介依赖。
/// 句柄携带完成标志：只有配对的流动执行成功之后，句柄才完成；
/// 在此之前试图定稿或执行输运模型是顺序违规，由类型层面而非
/// 运行期路径探测来保证。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouplingLink {
    /// 配对流动模型名
    pub flow_model: String,
    /// 输出工件
    pub artifacts: CouplingArtifacts,
    completed: bool,
}

impl CouplingLink {
    /// 流动执行之前的待定句柄
    pub fn pending(flow_model: impl Into<String>, artifacts: CouplingArtifacts) -> Self {
        Self {
            flow_model: flow_model.into(),
            artifacts,
            completed: false,
        }
    }

    /// 标记配对流动执行成功
    pub fn mark_completed(&mut self) {
        self.completed = true;
    }

    /// 流动执行成功后的完成句柄
    pub fn completed(flow_model: impl Into<String>, artifacts: CouplingArtifacts) -> Self {
        Self {
            flow_model: flow_model.into(),
            artifacts,
            completed: true,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    /// 要求句柄已完成，否则返回耦合前置条件错误
    pub fn require_completed(&self) -> AtResult<&CouplingArtifacts> {
        if !self.completed {
            return Err(AtError::coupling(format!(
                "流动模型 {} 的输出尚未就绪 ({})",
                self.flow_model,
                self.artifacts.describe()
            )));
        }
        Ok(&self.artifacts)
    }
}
