// src/io/backends/unified.rs

use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::infra::error::AtResult;
use crate::io::job;
use crate::io::output::TemperatureField;
use crate::io::traits::SimulatorBackend;
use crate::model::coupling::{CouplingArtifacts, CouplingLink};
use crate::model::flow::FlowModelDescriptor;
use crate::model::transport::TransportModelDescriptor;

/// 统一流动/输运后端 (MODFLOW 6 风格)
///
/// 流动与输运是同一模拟语境下的两个子模型，各占一个子目录；
/// 输运通过命名的流动模型接口块按相对路径引用流动执行写出的
/// 水头场与预算场文件。
pub struct UnifiedBackend {
    exe: PathBuf,
}

const FLOW_DIR: &str = "mf6gwf";
const TRANSPORT_DIR: &str = "mf6gwt";

/// 流动模型接口记录：(工件类型, 相对路径)
#[derive(Debug, Serialize)]
struct InterfaceRecord {
    kind: String,
    path: String,
}

#[derive(Serialize)]
struct UnifiedTransportJob<'a> {
    #[serde(flatten)]
    model: &'a TransportModelDescriptor,
    /// 命名耦合接口：按相对路径读取流动输出
    flow_model_interface: Vec<InterfaceRecord>,
}

impl UnifiedBackend {
    pub fn new(exe: impl Into<PathBuf>) -> Self {
        Self { exe: exe.into() }
    }

    fn field_path(&self, transport: &TransportModelDescriptor, workdir: &Path) -> PathBuf {
        workdir
            .join(TRANSPORT_DIR)
            .join(format!("{}.ucn.csv", transport.name))
    }
}

impl SimulatorBackend for UnifiedBackend {
    fn name(&self) -> &'static str {
        "mf6"
    }

    fn render(
        &self,
        flow: &FlowModelDescriptor,
        transport: &TransportModelDescriptor,
        workdir: &Path,
    ) -> AtResult<()> {
        log::info!("[{}] 渲染模型定义: {}", self.name(), flow.scenario);

        job::write_job_document(
            &workdir.join(FLOW_DIR),
            &format!("{}.json", flow.name),
            flow,
        )?;

        let interface = vec![
            InterfaceRecord {
                kind: "GWFHEAD".into(),
                path: format!("../{}/{}", FLOW_DIR, flow.head_artifact()),
            },
            InterfaceRecord {
                kind: "GWFBUDGET".into(),
                path: format!("../{}/{}", FLOW_DIR, flow.budget_artifact()),
            },
        ];
        let doc = UnifiedTransportJob {
            model: transport,
            flow_model_interface: interface,
        };
        job::write_job_document(
            &workdir.join(TRANSPORT_DIR),
            &format!("{}.json", transport.name),
            &doc,
        )?;

        Ok(())
    }

    fn run_flow(&self, flow: &FlowModelDescriptor, workdir: &Path) -> AtResult<CouplingLink> {
        job::run_executable(self.name(), &self.exe, &workdir.join(FLOW_DIR))?;

        Ok(CouplingLink::completed(
            flow.name.clone(),
            CouplingArtifacts::SplitFields {
                head: PathBuf::from(FLOW_DIR).join(flow.head_artifact()),
                budget: PathBuf::from(FLOW_DIR).join(flow.budget_artifact()),
            },
        ))
    }

    fn run_transport(
        &self,
        transport: &TransportModelDescriptor,
        workdir: &Path,
    ) -> AtResult<()> {
        // 未定稿（耦合句柄缺失）在这里失败，先于任何模拟器调用
        let link = transport.coupling()?;
        log::debug!(
            "[{}] 输运耦合 {}",
            self.name(),
            link.artifacts.describe()
        );

        job::run_executable(self.name(), &self.exe, &workdir.join(TRANSPORT_DIR))?;
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
