// src/commands/validate.rs

//! 校验命令
//!
//! 为每个情景构建网格、边界与模型描述并执行全部校验，
//! 不写文件、不调用模拟器。纯扩散情景只做描述级构建
//! （流动模型与边界），其输运方案本来就拒绝执行。

use clap::Args;

use aquatherm::domain::boundary::BoundaryAssembler;
use aquatherm::domain::grid::StructuredGrid;
use aquatherm::domain::scenario::ScenarioTable;
use aquatherm::infra::constants::transport;
use aquatherm::model::flow::FlowModelDescriptor;
use aquatherm::model::schedule::TransportRegime;
use aquatherm::model::transport::TransportModelDescriptor;
use aquatherm::AtResult;

/// 校验参数
#[derive(Args)]
pub struct ValidateArgs {}

/// 执行校验命令
pub fn execute(_args: ValidateArgs) -> AtResult<()> {
    log::info!("=== AquaTherm 配置校验 ===");

    let grid = StructuredGrid::reference()?;
    log::info!(
        "网格: {} 层 x {} 行 x {} 列 ({} 单元)",
        grid.nlay,
        grid.nrow(),
        grid.ncol(),
        grid.total_cells()
    );

    let table = ScenarioTable::reference();
    let assembler = BoundaryAssembler::new(&grid);

    for (index, (key, params)) in table.iter().enumerate() {
        let boundaries = assembler.assemble(params)?;
        let flow = FlowModelDescriptor::build(&grid, key, boundaries.clone())?;

        let regime = TransportRegime::classify(params.peclet)?;
        match regime {
            TransportRegime::Diffusive => {
                log::info!(
                    "[{}] {} 描述级校验通过（纯扩散工况，不参与端到端执行）",
                    index,
                    key
                );
            }
            _ => {
                let tr = TransportModelDescriptor::build(
                    &grid,
                    key,
                    params,
                    &flow,
                    boundaries,
                    assembler.source_term(),
                    assembler.observations(),
                    transport::ADVECTION_CONTROL,
                )?;
                log::info!(
                    "[{}] {} 校验通过 (工况 {:?}, {} 步, 格式 {})",
                    index,
                    key,
                    tr.regime,
                    tr.schedule.steps,
                    tr.advection.keyword()
                );
            }
        }
    }

    log::info!("全部情景校验通过");
    Ok(())
}
