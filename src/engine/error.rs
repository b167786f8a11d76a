// ==========================================
// 节点折扣结算引擎 - 引擎错误类型
// ==========================================
// 工具: thiserror 派生宏
// 说明: 空结果不是错误,见 SettlementOutcome::Empty
// ==========================================

use thiserror::Error;

/// 输入不变量错误(致命,中止本次运行)
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("计算基准不唯一 (节点 {node}): {labels:?}")]
    NonHomogeneousBasis { node: String, labels: Vec<String> },

    #[error("不支持的折扣类型: {0}")]
    UnsupportedDiscountType(String),

    #[error("奖励值无法解析 (节点 {node}): '{value}'")]
    InvalidBonusValue { node: String, value: String },

    #[error("重量区间文本无法解析: '{text}'")]
    InvalidBandText { text: String },

    #[error("必填字段缺失 ({record}): {field}")]
    MissingField { record: String, field: String },

    #[error("无效请求: {0}")]
    InvalidRequest(String),
}

/// Result 类型别名
pub type EngineResult<T> = Result<T, EngineError>;
