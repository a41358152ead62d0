// src/infra/constants.rs

/// 模型几何常数 (Geometry)
/// Hecht-Mendez 基准算例的空间离散是情景无关的固定几何。
pub mod geometry {
    /// 层数
    pub const NLAY: usize = 13;

    /// 行数 (Y 方向)
    pub const NROW: usize = 83;

    /// 列数 (X 方向)
    pub const NCOL: usize = 247;

    /// 层厚 [m]（垂向均匀分层）
    pub const DELZ: f64 = 1.0;

    /// 模型顶面高程 [m]
    pub const TOP: f64 = 13.0;

    /// 计算域长度 (X 方向) [m]
    pub const DOMAIN_LENGTH: f64 = 300.0;

    /// 计算域宽度 (Y 方向) [m]
    ///
    /// 文献给出的名义宽度为 200 m；实际行宽序列在对称的 100 + 100 m
    /// 之间插入了 0.1 m 的源项加密行，因此精确总和为 200.1 m。
    /// 校验按精确总和执行，绝不对宽度序列做静默缩放。
    pub const DOMAIN_WIDTH: f64 = 200.1;

    /// 源项附近的最细网格宽度 [m]
    pub const FINEST_WIDTH: f64 = 0.1;
}

/// 含水层性质 (Aquifer Properties)
pub mod aquifer {
    /// 水平渗透系数 [m/s]
    pub const HK: f64 = 8.0e-3;

    /// 垂直渗透系数 [m/s]
    pub const VK: f64 = 8.0e-3;

    /// 初始水头 [m]（左边界固定水头与初始场一致）
    pub const INITIAL_HEAD: f64 = 14.0;

    /// 含水层初始温度 [K]（亦为左边界固定温度与初始浓度场）
    pub const INITIAL_TEMPERATURE: f64 = 285.15;

    /// 孔隙度
    pub const POROSITY: f64 = 0.26;

    /// 纵向弥散度 [m]
    pub const LONGITUDINAL_DISPERSIVITY: f64 = 0.5;

    /// 水平横向弥散度与纵向弥散度之比
    pub const TRANSVERSE_RATIO_HORIZONTAL: f64 = 0.1;

    /// 垂直横向弥散度与纵向弥散度之比
    pub const TRANSVERSE_RATIO_VERTICAL: f64 = 0.1;

    /// 分子扩散系数（热传导的等效表示）[m^2/s]
    pub const MOLECULAR_DIFFUSION: f64 = 1.84e-6;

    /// 干容重 [g/cm^3]（线性平衡吸附）
    pub const BULK_DENSITY: f64 = 1.7;

    /// 分配系数 Kd [cm^3/g]
    pub const DISTRIBUTION_COEFFICIENT: f64 = 0.176;
}

/// 井源项 (Borehole Heat Exchanger)
pub mod source {
    /// 源项所在层（0 基索引；即第 7 层）
    ///
    /// 注意：Hecht-Mendez 文献正文描述源项占据第 6、7、8 三个中间层，
    /// 但原始模型输入文件只激活了第 7 层。此处忠实复现输入文件的
    /// 单层行为，不向三层描述"修正"。
    pub const LAYER: usize = 6;

    /// 源项所在行（0 基索引；即第 42 行）
    pub const ROW: usize = 41;

    /// 源项所在列（0 基索引；即第 22 列）
    pub const COLUMN: usize = 21;

    /// 取热速率（负值为抽取能量）
    pub const RATE: f64 = -1.434e-5;

    /// 传统后端源汇混合包使用的温度标签
    pub const LEGACY_TEMPERATURE_LABEL: f64 = 15.0;
}

/// 输运时间控制 (Transport Timing)
pub mod transport {
    /// 模拟总时长 [s]（约 150 天）
    pub const SIMULATION_PERIOD: f64 = 1.296e7;

    /// 基准时间步单元 [s]（总时长的百分之一，约 1.5 天）
    pub const BASELINE_STEP: f64 = 1.296e5;

    /// 固定步长方案中基准单元的倍数
    pub const FIXED_STEP_MULTIPLE: f64 = 3.0;

    /// 几何加密方案的步数
    pub const GEOMETRIC_STEPS: f64 = 25.0;

    /// 几何加密方案的步长放大系数
    pub const GEOMETRIC_MULTIPLIER: f64 = 1.3;

    /// 输出时刻 [s]（10 天与 150 天）
    pub const OUTPUT_TIMES: [f64; 2] = [8.64e5, 1.296e7];

    /// 单个应力期内部输运子步数上限
    pub const MAX_INTERNAL_STEPS: u32 = 20_000;

    /// 渗流速度为零时传统后端的初始步长提示 [s]
    pub const DIFFUSIVE_STEP_HINT: f64 = 5.0e4;

    /// 离散对流格式控制参数（-1 选择 TVD 限制格式）
    pub const ADVECTION_CONTROL: i32 = -1;

    /// 对流 Courant 数目标
    pub const COURANT_TARGET: f64 = 1.0;

    /// 非活动单元浓度标记
    pub const INACTIVE_MARKER: f64 = -1.0e10;

    /// 最小饱和厚度比例
    pub const MIN_SATURATED_FRACTION: f64 = 0.01;
}

/// 求解器设置 (Solver Settings)
pub mod solver {
    /// 外迭代上限
    pub const OUTER_MAXIMUM: usize = 100;

    /// 内迭代上限
    pub const INNER_MAXIMUM: usize = 300;

    /// 水头/浓度收敛容差
    pub const HEAD_CLOSURE: f64 = 5.0e-5;

    /// 残差收敛容差
    pub const RESIDUAL_CLOSURE: f64 = 1.0e-8;

    /// 松弛因子（1.0 即不松弛）
    pub const RELAXATION: f64 = 1.0;

    /// 传统流动求解器 (PCG) 外/内迭代上限
    pub const LEGACY_FLOW_OUTER: usize = 90;
    pub const LEGACY_FLOW_INNER: usize = 20;

    /// 传统输运求解器 (GCG) 外/内迭代上限
    pub const LEGACY_TRANSPORT_OUTER: usize = 100;
    pub const LEGACY_TRANSPORT_INNER: usize = 50;

    /// 传统输运求解器浓度收敛容差
    pub const LEGACY_CONCENTRATION_CLOSURE: f64 = 1.0e-7;
}

/// 解析解采样常数 (Analytical Sampling)
/// 这些参数由外部解析解模块消费，比对器按原样传递。
pub mod thermal {
    /// 水的密度 [kg/m^3]
    pub const WATER_DENSITY: f64 = 1000.0;

    /// 水的比热容 [J/(kg*K)]
    pub const WATER_HEAT_CAPACITY: f64 = 4185.0;

    /// 热扩散系数（解析解使用的热传导等效值）[m^2/s]
    ///
    /// 注意：与输运模型输入的 1.84e-6 略有出入，原始算例即如此，
    /// 两个常数各自保留。
    pub const THERMAL_DIFFUSIVITY: f64 = 1.86e-6;

    /// 线源功率 [W/m]
    pub const LINE_SOURCE_FLUX: f64 = -60.0;

    /// 面源功率 [W/m^2]
    pub const PLANAR_SOURCE_FLUX: f64 = -600.0;

    /// 热迟滞因子（文献值）
    pub const RETARDATION: f64 = 2.59;

    /// 源项在 Y 方向的几何尺寸 [m]
    pub const SOURCE_WIDTH_Y: f64 = 0.1;

    /// 瞬态解析解的观测时刻 [s]（10 天）
    pub const OBSERVATION_TIME: f64 = 8.64e5;
}

/// 数值容差 (Numerical Tolerances)
pub mod tolerances {
    /// 通用浮点比较极小值
    pub const EPSILON: f64 = 1e-9;

    /// 网格宽度总和校验容差
    pub const EPSILON_WIDTH_SUM: f64 = 1e-6;

    /// 时间比较阈值 [s]
    pub const EPSILON_TIME: f64 = 1e-6;

    /// 比对残差的默认接受容差 [K]
    pub const DEFAULT_COMPARISON_TOLERANCE: f64 = 0.5;
}
