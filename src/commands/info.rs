// src/commands/info.rs

//! 信息命令
//!
//! 打印情景表与网格摘要。

use clap::Args;

use aquatherm::domain::grid::StructuredGrid;
use aquatherm::domain::scenario::ScenarioTable;
use aquatherm::infra::constants::{geometry, source};
use aquatherm::AtResult;

/// 信息参数
#[derive(Args)]
pub struct InfoArgs {}

/// 执行信息命令
pub fn execute(_args: InfoArgs) -> AtResult<()> {
    let grid = StructuredGrid::reference()?;

    println!("AquaTherm - 井式换热器热输运基准算例");
    println!();
    println!(
        "网格: {} 层 x {} 行 x {} 列, 计算域 {} m x {} m",
        grid.nlay,
        grid.nrow(),
        grid.ncol(),
        geometry::DOMAIN_LENGTH,
        geometry::DOMAIN_WIDTH
    );
    println!(
        "源项单元 (0 基): 层 {}, 行 {}, 列 {}, 速率 {:.3e}",
        source::LAYER,
        source::ROW,
        source::COLUMN,
        source::RATE
    );
    println!();
    println!("情景表:");

    let table = ScenarioTable::reference();
    for (index, (key, params)) in table.iter().enumerate() {
        let note = if params.peclet == 0.0 {
            " (无解析解对照，默认批处理排除)"
        } else {
            ""
        };
        println!(
            "  [{}] {}: Peclet={}, 梯度={:.2e}, 渗流速度={:.2e} m/s, 右边界水头={} m{}",
            index,
            key,
            params.peclet,
            params.gradient,
            params.seepage_velocity,
            params.constant_head_right,
            note
        );
    }

    Ok(())
}
