// src/commands/run.rs

//! 运行情景命令
//!
//! 按序号运行单个情景，或运行默认批处理（排除无解析解
//! 对照的纯扩散情景）。解析解模块由外部注入，命令行运行
//! 不做比对，只到 RUN 阶段为止。

use clap::Args;
use std::path::PathBuf;

use aquatherm::infra::config::RunConfig;
use aquatherm::workflow::report::RunStatus;
use aquatherm::workflow::runner::ScenarioRunner;
use aquatherm::AtResult;

/// 运行情景参数
#[derive(Args)]
pub struct RunArgs {
    /// 情景序号（省略则运行默认批处理）
    #[arg(short, long)]
    pub scenario: Option<usize>,

    /// 工作目录根
    #[arg(short, long, default_value = "output")]
    pub workspace: PathBuf,

    /// 统一模拟器可执行文件
    #[arg(long, default_value = "mf6")]
    pub mf6_exe: PathBuf,

    /// 传统流动模拟器可执行文件
    #[arg(long, default_value = "mf2005")]
    pub mf2005_exe: PathBuf,

    /// 传统输运模拟器可执行文件
    #[arg(long, default_value = "mt3d-usgs")]
    pub mt3dusgs_exe: PathBuf,

    /// 同时运行传统后端配对
    #[arg(long)]
    pub legacy: bool,

    /// 只构建与写出，不调用模拟器
    #[arg(long)]
    pub no_run: bool,

    /// 跳过写出阶段（复用目录中已有的模型输入）
    #[arg(long)]
    pub no_write: bool,
}

/// 执行运行命令
pub fn execute(args: RunArgs) -> AtResult<()> {
    log::info!("=== AquaTherm 情景运行 ===");

    let config = RunConfig::new(args.workspace)
        .with_mf6_exe(args.mf6_exe)
        .with_legacy_exes(args.mf2005_exe, args.mt3dusgs_exe)
        .with_legacy(args.legacy)
        .with_run(!args.no_run)
        .with_write(!args.no_write)
        // 命令行入口不注入解析解，比对阶段交给外部驱动
        .with_plot(false);

    let runner = ScenarioRunner::new(&config)?;
    log::info!("情景表共 {} 个情景", runner.table().len());

    let reports = match args.scenario {
        Some(index) => vec![runner.run_scenario(index)?],
        None => runner.run_default_batch()?,
    };

    let mut failed = 0usize;
    for report in &reports {
        log::info!(
            "情景 {}: {} (阶段 {:?})",
            report.scenario,
            report.status,
            report.phase_reached
        );
        if report.status == RunStatus::Failed {
            failed += 1;
        }
    }

    if failed > 0 {
        log::warn!("{}/{} 个情景执行失败", failed, reports.len());
    } else {
        log::info!("全部 {} 个情景完成", reports.len());
    }
    Ok(())
}
