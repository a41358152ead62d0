// src/infra/config.rs

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// 运行配置
///
/// 核心只消费这些开关，不产生它们：阶段开关 (build/write/run/plot)
/// 控制情景运行器走到哪一步；`run_legacy` 决定是否同时运行
/// 传统后端配对 (MODFLOW-2005 + MT3D-USGS)。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// 工作目录根（每个情景在其下建立独立子目录）
    pub workspace_dir: PathBuf,

    /// 是否构建模型描述
    pub build_models: bool,

    /// 是否将模型描述序列化到后端输入形式
    pub write_models: bool,

    /// 是否调用外部求解器执行
    pub run_models: bool,

    /// 是否在全部后端成功后生成比对数据集
    pub plot_results: bool,

    /// 是否运行传统后端配对
    pub run_legacy: bool,

    /// 统一流动/输运模拟器可执行文件路径
    pub mf6_exe: PathBuf,

    /// 传统流动模拟器可执行文件路径
    pub mf2005_exe: PathBuf,

    /// 传统输运模拟器可执行文件路径
    pub mt3dusgs_exe: PathBuf,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            workspace_dir: PathBuf::from("./output"),
            build_models: true,
            write_models: true,
            run_models: true,
            plot_results: true,
            run_legacy: false,
            mf6_exe: PathBuf::from("mf6"),
            mf2005_exe: PathBuf::from("mf2005"),
            mt3dusgs_exe: PathBuf::from("mt3d-usgs"),
        }
    }
}

impl RunConfig {
    pub fn new(workspace_dir: impl Into<PathBuf>) -> Self {
        Self {
            workspace_dir: workspace_dir.into(),
            ..Default::default()
        }
    }

    pub fn with_legacy(mut self, enabled: bool) -> Self {
        self.run_legacy = enabled;
        self
    }

    pub fn with_write(mut self, enabled: bool) -> Self {
        self.write_models = enabled;
        self
    }

    pub fn with_run(mut self, enabled: bool) -> Self {
        self.run_models = enabled;
        self
    }

    pub fn with_plot(mut self, enabled: bool) -> Self {
        self.plot_results = enabled;
        self
    }

    pub fn with_mf6_exe(mut self, exe: impl Into<PathBuf>) -> Self {
        self.mf6_exe = exe.into();
        self
    }

    pub fn with_legacy_exes(
        mut self,
        flow_exe: impl Into<PathBuf>,
        transport_exe: impl Into<PathBuf>,
    ) -> Self {
        self.mf2005_exe = flow_exe.into();
        self.mt3dusgs_exe = transport_exe.into();
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.workspace_dir.as_os_str().is_empty() {
            return Err("工作目录不能为空".into());
        }
        if self.mf6_exe.as_os_str().is_empty() {
            return Err("统一模拟器可执行文件路径不能为空".into());
        }
        if self.run_legacy {
            if self.mf2005_exe.as_os_str().is_empty() {
                return Err("传统流动模拟器可执行文件路径不能为空".into());
            }
            if self.mt3dusgs_exe.as_os_str().is_empty() {
                return Err("传统输运模拟器可执行文件路径不能为空".into());
            }
        }
        Ok(())
    }
}
