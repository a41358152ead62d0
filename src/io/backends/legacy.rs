// src/io/backends/legacy.rs

use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::infra::constants::solver;
use crate::infra::error::AtResult;
use crate::io::job;
use crate::io::output::TemperatureField;
use crate::io::traits::SimulatorBackend;
use crate::model::coupling::{CouplingArtifacts, CouplingLink};
use crate::model::flow::FlowModelDescriptor;
use crate::model::transport::TransportModelDescriptor;

/// 传统有限差分后端配对 (MODFLOW-2005 + MT3D 风格)
///
/// 两个独立可执行文件共享一个工作子目录：流动执行写出链接
/// 文件（将水头与通量两类工件打包），输运执行读取同一文件。
pub struct LegacyBackend {
    flow_exe: PathBuf,
    transport_exe: PathBuf,
}

const LEGACY_DIR: &str = "mt3d";

#[derive(Serialize)]
struct LegacyFlowJob<'a> {
    #[serde(flatten)]
    model: &'a FlowModelDescriptor,
    /// 链接文件工件名（供配对输运模型读取）
    link_artifact: String,
    /// 传统流动求解器 (PCG) 迭代上限
    pcg_outer: usize,
    pcg_inner: usize,
}

#[derive(Serialize)]
struct LegacyTransportJob<'a> {
    #[serde(flatten)]
    model: &'a TransportModelDescriptor,
    /// 流动链接文件（相对工作目录）
    link_file: String,
    /// 传统输运求解器 (GCG) 迭代上限与收敛容差
    gcg_outer: usize,
    gcg_inner: usize,
    gcg_closure: f64,
}

impl LegacyBackend {
    pub fn new(flow_exe: impl Into<PathBuf>, transport_exe: impl Into<PathBuf>) -> Self {
        Self {
            flow_exe: flow_exe.into(),
            transport_exe: transport_exe.into(),
        }
    }

    fn link_artifact(flow: &FlowModelDescriptor) -> String {
        format!("{}.ftl", flow.name)
    }

    fn field_path(&self, transport: &TransportModelDescriptor, workdir: &Path) -> PathBuf {
        workdir
            .join(LEGACY_DIR)
            .join(format!("{}.ucn.csv", transport.name))
    }
}

impl SimulatorBackend for LegacyBackend {
    fn name(&self) -> &'static str {
        "mt3dms"
    }

    fn render(
        &self,
        flow: &FlowModelDescriptor,
        transport: &TransportModelDescriptor,
        workdir: &Path,
    ) -> AtResult<()> {
        log::info!("[{}] 渲染模型定义: {}", self.name(), flow.scenario);
        let dir = workdir.join(LEGACY_DIR);

        let flow_doc = LegacyFlowJob {
            model: flow,
            link_artifact: Self::link_artifact(flow),
            pcg_outer: solver::LEGACY_FLOW_OUTER,
            pcg_inner: solver::LEGACY_FLOW_INNER,
        };
        job::write_job_document(&dir, &format!("{}.json", flow.name), &flow_doc)?;

        let transport_doc = LegacyTransportJob {
            model: transport,
            link_file: Self::link_artifact(flow),
            gcg_outer: solver::LEGACY_TRANSPORT_OUTER,
            gcg_inner: solver::LEGACY_TRANSPORT_INNER,
            gcg_closure: solver::LEGACY_CONCENTRATION_CLOSURE,
        };
        job::write_job_document(&dir, &format!("{}.json", transport.name), &transport_doc)?;

        Ok(())
    }

    fn run_flow(&self, flow: &FlowModelDescriptor, workdir: &Path) -> AtResult<CouplingLink> {
        job::run_executable(self.name(), &self.flow_exe, &workdir.join(LEGACY_DIR))?;

        Ok(CouplingLink::completed(
            flow.name.clone(),
            CouplingArtifacts::LinkFile {
                path: PathBuf::from(LEGACY_DIR).join(Self::link_artifact(flow)),
            },
        ))
    }

    fn run_transport(
        &self,
        transport: &TransportModelDescriptor,
        workdir: &Path,
    ) -> AtResult<()> {
        let link = transport.coupling()?;
        log::debug!(
            "[{}] 输运耦合 {}",
            self.name(),
            link.artifacts.describe()
        );

        job::run_executable(self.name(), &self.transport_exe, &workdir.join(LEGACY_DIR))?;
        Ok(())
    }

    fn temperature_field(
        &self,
        transport: &TransportModelDescriptor,
        workdir: &Path,
    ) -> AtResult<TemperatureField> {
        let dims = (
            transport.grid.nlay,
            transport.grid.nrow(),
            transport.grid.ncol(),
        );
        TemperatureField::from_csv(&self.field_path(transport, workdir), dims)
    }
}
