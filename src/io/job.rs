// src/io/job.rs

use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::infra::error::{AtError, AtResult};

/// 将模型定义写为规范 JSON 作业文档
///
/// 模拟器原生输入格式的打包由外部包装层负责；
/// 核心以作业文档为唯一的序列化形式。
pub fn write_job_document<T: Serialize>(
    dir: &Path,
    file_name: &str,
    doc: &T,
) -> AtResult<PathBuf> {
    fs::create_dir_all(dir)
        .map_err(|e| AtError::io(format!("创建目录 {}", dir.display()), e))?;

    let path = dir.join(file_name);
    let json = serde_json::to_string_pretty(doc)?;
    fs::write(&path, json).map_err(|e| AtError::io(format!("写入 {}", path.display()), e))?;

    log::debug!("作业文档已写出: {}", path.display());
    Ok(path)
}

/// 以阻塞方式调用外部模拟器可执行文件
///
/// 无超时、不支持取消（挂起的执行交由外部进程监督处理）。
/// 启动失败与非零退出码都归为执行类错误：情景级可恢复，
/// 不中止批处理。
pub fn run_executable(backend: &str, exe: &Path, workdir: &Path) -> AtResult<String> {
    log::info!(
        "[{}] 调用模拟器: {} (目录 {})",
        backend,
        exe.display(),
        workdir.display()
    );

    let output = Command::new(exe)
        .current_dir(workdir)
        .output()
        .map_err(|e| {
            AtError::execution(
                backend,
                format!("无法启动 {}: {}", exe.display(), e),
            )
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let stdout = String::from_utf8_lossy(&output.stdout);
        return Err(AtError::execution(
            backend,
            format!(
                "{} 退出状态 {}; stderr: {}; stdout 尾部: {}",
                exe.display(),
                output.status,
                stderr.trim(),
                tail(&stdout, 400)
            ),
        ));
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

fn tail(text: &str, max: usize) -> &str {
    if text.len() <= max {
        return text.trim();
    }
    let mut start = text.len() - max;
    while !text.is_char_boundary(start) {
        start += 1;
    }
    &text[start..]
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    #[derive(Serialize)]
    struct Doc {
        name: String,
        value: f64,
    }

    #[test]
    fn test_write_job_document() {
        let dir = tempfile::tempdir().unwrap();
        let doc = Doc {
            name: "gwf-test".into(),
            value: 14.0,
        };
        let path = write_job_document(dir.path(), "gwf-test.json", &doc).unwrap();
        let content = std::fs::read_to_string(path).unwrap();
        assert!(content.contains("gwf-test"));
    }

    #[test]
    fn test_unreachable_executable_is_recoverable() {
        let dir = tempfile::tempdir().unwrap();
        let err = run_executable(
            "mf6",
            Path::new("/nonexistent/simulator"),
            dir.path(),
        )
        .unwrap_err();
        assert!(!err.is_fatal());
        assert!(matches!(err, AtError::Execution { .. }));
    }
}
