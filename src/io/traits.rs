// src/io/traits.rs

use std::path::Path;

use crate::infra::error::AtResult;
use crate::io::output::TemperatureField;
use crate::model::coupling::CouplingLink;
use crate::model::flow::FlowModelDescriptor;
use crate::model::transport::TransportModelDescriptor;

/// 模拟器后端能力
///
/// 两个后端渲染同一份流动/输运描述对，描述构建逻辑不重复。
/// 执行顺序（先流动后输运）不由适配器自行把关：输运执行需要
/// 经由已定稿描述取得耦合句柄，未定稿即在类型层面失败。
pub trait SimulatorBackend {
    /// 后端名（诊断信息使用）
    fn name(&self) -> &'static str;

    /// 将描述对渲染到工作目录下的后端输入形式
    fn render(
        &self,
        flow: &FlowModelDescriptor,
        transport: &TransportModelDescriptor,
        workdir: &Path,
    ) -> AtResult<()>;

    /// 执行流动模型；成功时返回已完成的耦合句柄
    fn run_flow(&self, flow: &FlowModelDescriptor, workdir: &Path) -> AtResult<CouplingLink>;

    /// 执行输运模型（要求描述已定稿）
    fn run_transport(
        &self,
        transport: &TransportModelDescriptor,
        workdir: &Path,
    ) -> AtResult<()>;

    /// 读取输运执行产出的温度场（统一访问口径，与后端无关）
    fn temperature_field(
        &self,
        transport: &TransportModelDescriptor,
        workdir: &Path,
    ) -> AtResult<TemperatureField>;
}
