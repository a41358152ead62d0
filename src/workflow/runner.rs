// src/workflow/runner.rs

use chrono::Utc;
use std::path::Path;

use crate::compare::analytical::AnalyticalSolution;
use crate::compare::comparator::Comparator;
use crate::domain::boundary::BoundaryAssembler;
use crate::domain::grid::StructuredGrid;
use crate::domain::scenario::{ScenarioParameters, ScenarioTable};
use crate::infra::config::RunConfig;
use crate::infra::constants::{thermal, transport as transport_constants};
use crate::infra::error::{AtError, AtResult};
use crate::io::backends::{LegacyBackend, UnifiedBackend};
use crate::io::traits::SimulatorBackend;
use crate::model::flow::FlowModelDescriptor;
use crate::model::schedule::TransportRegime;
use crate::model::transport::TransportModelDescriptor;
use crate::workflow::report::{BackendOutcome, RunPhase, RunStatus, ScenarioReport};

/// 情景运行器
///
/// 状态机 BUILD -> WRITE -> RUN -> PLOT/ABORT，单线程顺序执行。
/// 同一后端内流动执行必须成功完成之后才尝试输运执行（硬性
/// 数据依赖，不是调度便利）；某个后端失败时记录诊断并中止该
/// 情景的后续阶段，但不妨碍批处理中其他情景。
pub struct ScenarioRunner<'a> {
    config: &'a RunConfig,
    grid: StructuredGrid,
    table: ScenarioTable,
    analytical: Option<&'a dyn AnalyticalSolution>,
}

impl<'a> ScenarioRunner<'a> {
    pub fn new(config: &'a RunConfig) -> AtResult<Self> {
        config.validate().map_err(AtError::config)?;
        Ok(Self {
            config,
            grid: StructuredGrid::reference()?,
            table: ScenarioTable::reference(),
            analytical: None,
        })
    }

    /// 注入外部解析解（不提供时 PLOT 阶段跳过比对）
    pub fn with_analytical(mut self, analytical: &'a dyn AnalyticalSolution) -> Self {
        self.analytical = Some(analytical);
        self
    }

    pub fn table(&self) -> &ScenarioTable {
        &self.table
    }

    fn backends(&self) -> Vec<Box<dyn SimulatorBackend>> {
        let mut backends: Vec<Box<dyn SimulatorBackend>> =
            vec![Box::new(UnifiedBackend::new(self.config.mf6_exe.clone()))];
        if self.config.run_legacy {
            backends.push(Box::new(LegacyBackend::new(
                self.config.mf2005_exe.clone(),
                self.config.mt3dusgs_exe.clone(),
            )));
        }
        backends
    }

    /// 构建一个情景的流动/输运描述对（BUILD 阶段）
    fn build_descriptors(
        &self,
        key: &str,
        params: &ScenarioParameters,
    ) -> AtResult<(FlowModelDescriptor, TransportModelDescriptor)> {
        let assembler = BoundaryAssembler::new(&self.grid);
        let boundaries = assembler.assemble(params)?;

        let flow = FlowModelDescriptor::build(&self.grid, key, boundaries.clone())?;
        let transport = TransportModelDescriptor::build(
            &self.grid,
            key,
            params,
            &flow,
            boundaries,
            assembler.source_term(),
            assembler.observations(),
            transport_constants::ADVECTION_CONTROL,
        )?;

        log::info!(
            "模型构建完成: {} (工况 {:?}, {} 个边界单元)",
            key,
            transport.regime,
            flow.boundaries.cells.len()
        );
        Ok((flow, transport))
    }

    /// 运行单个情景
    ///
    /// 配置类错误（越界序号、纯扩散情景、耦合顺序违规）直接
    /// 返回 Err；执行类失败记录在报告里并返回 Ok。
    pub fn run_scenario(&self, index: usize) -> AtResult<ScenarioReport> {
        let (key, params) = self.table.get(index)?;

        // 纯扩散情景拒绝执行，早于任何后端调用
        let regime = TransportRegime::classify(params.peclet)?;
        regime.schedule(key)?;

        let mut report = ScenarioReport::new(key);
        report.status = RunStatus::Running;
        log::info!("=== 情景 {} (序号 {}) ===", key, index);

        if !self.config.build_models {
            log::info!("构建开关关闭，情景 {} 不做任何事", key);
            report.finish(RunStatus::Completed, RunPhase::Build);
            return Ok(report);
        }

        // BUILD
        let (flow, transport) = self.build_descriptors(key, params)?;

        let workdir = self.config.workspace_dir.join(key);
        std::fs::create_dir_all(&workdir)
            .map_err(|e| AtError::io(format!("创建工作目录 {}", workdir.display()), e))?;

        let mut last_phase = RunPhase::Build;
        // PLOT 阶段需要各后端已定稿的输运描述
        let mut completed: Vec<(Box<dyn SimulatorBackend>, TransportModelDescriptor)> =
            Vec::new();

        for backend in self.backends() {
            // 每个后端各自定稿一份输运描述（耦合工件形态不同）
            let mut transport_for_backend = transport.clone();

            // WRITE
            if self.config.write_models {
                backend.render(&flow, &transport_for_backend, &workdir)?;
                last_phase = RunPhase::Write;
            }

            // RUN
            if !self.config.run_models {
                continue;
            }
            last_phase = RunPhase::Run;
            let started_at = Utc::now();

            let flow_result = backend.run_flow(&flow, &workdir);
            let outcome = match flow_result {
                Ok(link) => {
                    // 流动成功后输运描述才能定稿；违规是致命的
                    transport_for_backend.finalize(&link)?;
                    match backend.run_transport(&transport_for_backend, &workdir) {
                        Ok(()) => BackendOutcome {
                            backend: backend.name().to_string(),
                            success: true,
                            diagnostic: None,
                            started_at,
                            finished_at: Utc::now(),
                        },
                        Err(e) if !e.is_fatal() => BackendOutcome {
                            backend: backend.name().to_string(),
                            success: false,
                            diagnostic: Some(format!("输运执行失败: {}", e)),
                            started_at,
                            finished_at: Utc::now(),
                        },
                        Err(e) => return Err(e),
                    }
                }
                // 流动失败：短路，不得尝试该后端的输运执行
                Err(e) if !e.is_fatal() => BackendOutcome {
                    backend: backend.name().to_string(),
                    success: false,
                    diagnostic: Some(format!("流动执行失败，输运未尝试: {}", e)),
                    started_at,
                    finished_at: Utc::now(),
                },
                Err(e) => return Err(e),
            };

            let success = outcome.success;
            report.record_outcome(outcome);
            if success {
                completed.push((backend, transport_for_backend));
            }
        }

        if !self.config.run_models {
            report.finish(RunStatus::Completed, last_phase);
            self.persist_report(&report, &workdir);
            return Ok(report);
        }

        // 任一后端失败即 ABORT：该情景不再前进
        if !report.all_succeeded() {
            report.finish(RunStatus::Failed, RunPhase::Abort);
            self.persist_report(&report, &workdir);
            return Ok(report);
        }

        // PLOT：仅在全部后端成功时进入
        if self.config.plot_results {
            self.plot_phase(&mut report, key, params, &completed, &workdir);
            report.finish(RunStatus::Completed, RunPhase::Plot);
        } else {
            report.finish(RunStatus::Completed, RunPhase::Run);
        }

        self.persist_report(&report, &workdir);
        Ok(report)
    }

    /// PLOT 阶段：采样解析解、对齐模拟场、落盘比对数据集
    ///
    /// 比对类错误只记录，不中止批处理。
    fn plot_phase(
        &self,
        report: &mut ScenarioReport,
        key: &str,
        params: &ScenarioParameters,
        completed: &[(Box<dyn SimulatorBackend>, TransportModelDescriptor)],
        workdir: &Path,
    ) {
        let analytical = match self.analytical {
            Some(a) => a,
            None => {
                log::info!("未提供解析解，情景 {} 跳过比对", key);
                return;
            }
        };

        let comparator = Comparator::new(&self.grid);
        for (backend, transport) in completed {
            let field = match backend.temperature_field(transport, workdir) {
                Ok(f) => f,
                Err(e) => {
                    log::warn!("[{}] 读取温度场失败: {}", backend.name(), e);
                    report.comparator_notes.push(e.to_string());
                    continue;
                }
            };

            // 瞬态解在 10 天观测时刻比对，稳态解在模拟末时刻比对
            let cases = [
                (thermal::OBSERVATION_TIME, false, "transient"),
                (transport_constants::SIMULATION_PERIOD, true, "steady"),
            ];
            for (time, steady, label) in cases {
                match comparator.compare(
                    backend.name(),
                    key,
                    params,
                    &field,
                    analytical,
                    time,
                    steady,
                ) {
                    Ok(dataset) => {
                        let path = workdir
                            .join(format!("comparison-{}-{}.json", backend.name(), label));
                        match dataset.write_json(&path) {
                            Ok(()) => {
                                log::info!(
                                    "[{}] 比对数据集 {} 最大残差 {:.4} K",
                                    backend.name(),
                                    label,
                                    dataset.max_abs_residual()
                                );
                                report.comparison_files.push(path);
                            }
                            Err(e) => report.comparator_notes.push(e.to_string()),
                        }
                    }
                    Err(e) => {
                        log::warn!("[{}] 比对失败: {}", backend.name(), e);
                        report.comparator_notes.push(e.to_string());
                    }
                }
            }
        }
    }

    fn persist_report(&self, report: &ScenarioReport, workdir: &Path) {
        let path = workdir.join("run-report.json");
        if let Err(e) = report.write_json(&path) {
            log::warn!("运行报告写出失败: {}", e);
        }
    }

    /// 批处理：配置类错误全部停止，执行类失败跳过并继续
    pub fn run_batch(&self, indices: &[usize]) -> AtResult<Vec<ScenarioReport>> {
        let mut reports = Vec::with_capacity(indices.len());
        for &index in indices {
            let report = self.run_scenario(index)?;
            if report.status == RunStatus::Failed {
                log::warn!(
                    "情景 {} 失败，继续处理批处理中的后续情景",
                    report.scenario
                );
            }
            reports.push(report);
        }
        Ok(reports)
    }

    /// 默认批处理：排除无解析解对照的纯扩散情景
    pub fn run_default_batch(&self) -> AtResult<Vec<ScenarioReport>> {
        let indices = self.table.default_batch();
        self.run_batch(&indices)
    }
}
