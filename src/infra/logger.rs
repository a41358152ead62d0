// src/infra/logger.rs

use env_logger::{Builder, Target};
use log::LevelFilter;
use std::io::Write;

/// 初始化日志系统
///
/// # 参数
/// - `level`: 日志级别字符串（如 "info", "debug", "trace"），None 则使用环境变量
pub fn init_logging(level: Option<&str>) {
    let log_level = level
        .and_then(|l| l.parse::<LevelFilter>().ok())
        .or_else(|| {
            std::env::var("RUST_LOG")
                .ok()
                .and_then(|v| v.parse::<LevelFilter>().ok())
        })
        .unwrap_or(LevelFilter::Info);

    let result = Builder::new()
        .filter_level(log_level)
        .target(Target::Stdout)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {:5} {}:{}] {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                record.level(),
                record
                    .file()
                    .unwrap_or("unknown")
                    .rsplit('/')
                    .next()
                    .unwrap_or("unknown"),
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .try_init();

    if result.is_ok() {
        log::info!(
            "日志系统初始化完成 (Level: {})",
            log_level.to_string().to_uppercase()
        );
    }
}
