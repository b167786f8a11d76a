// ==========================================
// 节点折扣结算引擎 - 领域模型层
// ==========================================
// 职责: 定义条件目录、交易台账、价格、结算结果等实体与类型
// 红线: 不含文件读写逻辑,不含计算逻辑
// ==========================================

pub mod condition;
pub mod settlement;
pub mod sheet;
pub mod transaction;
pub mod types;

// 重导出核心类型
pub use condition::{BonusValue, ConditionRecord, ExpandedConditionRecord, ValidatorValue};
pub use settlement::{
    EmptyReason, RenderedOutput, SettlementOutcome, SettlementOutput, SettlementRequest,
    SettlementSnapshot,
};
pub use sheet::{
    CellValue, ContributionResult, SellOutPivot, SellOutPivotRow, SettlementSheet, SheetColumn,
    SheetTable, SummaryRow, SummaryRowKind, SummarySheet,
};
pub use transaction::{PriceRecord, TransactionRecord};
pub use types::{
    month_name, ApplicationBasis, DiscountType, Liquidation, RecognitionPeriod, ValidatorField,
    MONTH_NAMES,
};
