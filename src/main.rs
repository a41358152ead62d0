// src/main.rs

//! AquaTherm 命令行界面
//!
//! 井式换热器热输运基准算例的双后端模型编排工具。

mod commands;

use clap::{Parser, Subcommand};

use aquatherm::infra::logger::init_logging;

/// AquaTherm 流动/输运模型编排命令行工具
#[derive(Parser)]
#[command(name = "aquatherm")]
#[command(author = "AquaTherm Team")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Borehole heat exchanger transport benchmark orchestrator", long_about = None)]
struct Cli {
    /// 日志级别 (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 运行情景（构建、写出、执行、比对）
    Run(commands::run::RunArgs),
    /// 校验网格与模型描述，不触碰模拟器
    Validate(commands::validate::ValidateArgs),
    /// 显示情景表与网格摘要
    Info(commands::info::InfoArgs),
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    init_logging(Some(&cli.log_level));

    let result = match cli.command {
        Commands::Run(args) => commands::run::execute(args),
        Commands::Validate(args) => commands::validate::execute(args),
        Commands::Info(args) => commands::info::execute(args),
    };

    match result {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            std::process::ExitCode::FAILURE
        }
    }
}
