// src/workflow/report.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::infra::error::{AtError, AtResult};

/// 情景运行阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunPhase {
    Build,
    Write,
    Run,
    Plot,
    Abort,
}

/// 情景运行状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunStatus {
    Pending,   // 尚未开始
    Running,   // 进行中
    Completed, // 成功
    Failed,    // 某个后端执行失败
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RunStatus::Pending => "PENDING",
            RunStatus::Running => "RUNNING",
            RunStatus::Completed => "COMPLETED",
            RunStatus::Failed => "FAILED",
        };
        write!(f, "{}", s)
    }
}

/// 单个后端的执行结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendOutcome {
    pub backend: String,
    pub success: bool,
    /// 失败时的诊断文本（含后端名与情景键的上下文由报告承载）
    pub diagnostic: Option<String>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// 情景运行报告
///
/// 与运行工件放在同一目录下序列化，供批处理驱动与前端查询。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioReport {
    pub id: Uuid,
    pub scenario: String,
    pub status: RunStatus,
    /// 到达的最后阶段
    pub phase_reached: RunPhase,
    pub outcomes: Vec<BackendOutcome>,
    /// 产出的比对数据集文件
    pub comparison_files: Vec<PathBuf>,
    /// 比对过程中的非致命问题（缺失工件等）
    pub comparator_notes: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl ScenarioReport {
    pub fn new(scenario: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            scenario: scenario.into(),
            status: RunStatus::Pending,
            phase_reached: RunPhase::Build,
            outcomes: Vec::new(),
            comparison_files: Vec::new(),
            comparator_notes: Vec::new(),
            created_at: Utc::now(),
            finished_at: None,
        }
    }

    pub fn record_outcome(&mut self, outcome: BackendOutcome) {
        if !outcome.success {
            log::error!(
                "后端 {} 在情景 {} 执行失败: {}",
                outcome.backend,
                self.scenario,
                outcome.diagnostic.as_deref().unwrap_or("无诊断信息")
            );
        }
        self.outcomes.push(outcome);
    }

    /// 所有已记录后端是否全部成功
    pub fn all_succeeded(&self) -> bool {
        !self.outcomes.is_empty() && self.outcomes.iter().all(|o| o.success)
    }

    pub fn finish(&mut self, status: RunStatus, phase: RunPhase) {
        self.status = status;
        self.phase_reached = phase;
        self.finished_at = Some(Utc::now());
    }

    pub fn write_json(&self, path: &Path) -> AtResult<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .map_err(|e| AtError::io(format!("写入运行报告 {}", path.display()), e))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(backend: &str, success: bool) -> BackendOutcome {
        BackendOutcome {
            backend: backend.to_string(),
            success,
            diagnostic: if success {
                None
            } else {
                Some("exit status 1".to_string())
            },
            started_at: Utc::now(),
            finished_at: Utc::now(),
        }
    }

    #[test]
    fn test_all_succeeded() {
        let mut report = ScenarioReport::new("hecht-mendez-b");
        assert!(!report.all_succeeded());
        report.record_outcome(outcome("mf6", true));
        assert!(report.all_succeeded());
        report.record_outcome(outcome("mt3dms", false));
        assert!(!report.all_succeeded());
    }

    #[test]
    fn test_status_display() {
        assert_eq!(RunStatus::Completed.to_string(), "COMPLETED");
        assert_eq!(RunStatus::Failed.to_string(), "FAILED");
    }

    #[test]
    fn test_report_json_roundtrip() {
        let mut report = ScenarioReport::new("hecht-mendez-c");
        report.record_outcome(outcome("mf6", true));
        report.finish(RunStatus::Completed, RunPhase::Plot);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run-report.json");
        report.write_json(&path).unwrap();
        let back: ScenarioReport =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(back.scenario, "hecht-mendez-c");
        assert_eq!(back.status, RunStatus::Completed);
        assert!(back.finished_at.is_some());
    }
}
