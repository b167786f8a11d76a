// ==========================================
// 节点折扣结算引擎 - 核心库
// ==========================================
// 职责: 折扣条件目录 × 交易台账 → 按月 / 按客户的结算明细 + 汇总
// 系统定位: 纯计算引擎 (文件读取在导入层, 报表渲染在外部)
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 配置层 - 业务常量
pub mod config;

// 引擎层 - 结算规则
pub mod engine;

// 导入层 - 已清洗表格
pub mod importer;

// 日志系统
pub mod logging;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{
    ApplicationBasis, DiscountType, Liquidation, RecognitionPeriod, ValidatorField,
};

// 领域实体
pub use domain::{
    ConditionRecord, ContributionResult, EmptyReason, PriceRecord, SettlementOutcome,
    SettlementOutput, SettlementRequest, SettlementSnapshot, TransactionRecord,
};

// 配置
pub use config::EngineConfig;

// 引擎
pub use engine::{EngineError, EngineResult, SettlementEngine, SettlementStrategy};

// 导入
pub use importer::{ImportError, SnapshotLoader};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "节点折扣结算引擎";
