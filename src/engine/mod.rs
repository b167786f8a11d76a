// ==========================================
// 节点折扣结算引擎 - 引擎层
// ==========================================
// 职责: 条件过滤 / 通配展开 / 基准解析 / 折扣计算 / 明细拆分 / 汇总
// 红线: 引擎不读写文件, 不关心单元格样式; 输入快照只读
// ==========================================

pub mod basis_resolver;
pub mod calculators;
pub mod condition_filter;
pub mod error;
pub mod numeric;
pub mod orchestrator;
pub mod partitioner;
pub mod period;
pub mod strategy;
pub mod summary;
pub mod transaction_filter;
pub mod validator_expansion;
pub mod weight_band;

// 重导出核心引擎
pub use basis_resolver::BasisResolver;
pub use calculators::{
    CommercialRecognitionCalculator, LogisticsCalculator, RebateCalculator, SellOutCalculator,
};
pub use condition_filter::ConditionFilter;
pub use error::{EngineError, EngineResult};
pub use orchestrator::SettlementEngine;
pub use partitioner::SheetPartitioner;
pub use strategy::{Computation, SettlementStrategy};
pub use summary::SummaryAggregator;
pub use transaction_filter::TransactionFilter;
pub use validator_expansion::ValidatorExpansionEngine;
pub use weight_band::{WeightBand, WeightBandEngine, WeightBandOutcome};
