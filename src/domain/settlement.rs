// ==========================================
// 节点折扣结算引擎 - 结算请求 / 快照 / 结果
// ==========================================
// 职责: 一次结算运行的输入与输出
// 红线: 快照只读共享 (Arc), 每次运行产出全新的结果对象
// ==========================================

use crate::domain::condition::ConditionRecord;
use crate::domain::sheet::{SellOutPivot, SettlementSheet, SheetTable, SummarySheet};
use crate::domain::transaction::{PriceRecord, TransactionRecord};
use crate::domain::types::{DiscountType, Liquidation};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

// ==========================================
// 结算请求 (Request Options)
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementRequest {
    pub liquidation: Liquidation,
    pub node: String,
    pub discount_type: DiscountType,
    pub year: i32,
    pub month: u32,
}

impl SettlementRequest {
    pub fn new(
        liquidation: Liquidation,
        node: impl Into<String>,
        discount_type: DiscountType,
        year: i32,
        month: u32,
    ) -> Self {
        Self {
            liquidation,
            node: node.into(),
            discount_type,
            year,
            month,
        }
    }
}

// ==========================================
// 输入快照 (Settlement Snapshot)
// ==========================================
// 由外部导入层按自己的节奏刷新; 引擎只读
#[derive(Debug, Clone, Default)]
pub struct SettlementSnapshot {
    pub conditions: Arc<Vec<ConditionRecord>>,
    pub sales: Arc<Vec<TransactionRecord>>,
    pub sellout: Arc<Vec<TransactionRecord>>,
    pub prices: Arc<Vec<PriceRecord>>,
}

impl SettlementSnapshot {
    pub fn new(
        conditions: Vec<ConditionRecord>,
        sales: Vec<TransactionRecord>,
        sellout: Vec<TransactionRecord>,
        prices: Vec<PriceRecord>,
    ) -> Self {
        Self {
            conditions: Arc::new(conditions),
            sales: Arc::new(sales),
            sellout: Arc::new(sellout),
            prices: Arc::new(prices),
        }
    }
}

// ==========================================
// 结算输出 (Settlement Output)
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettlementOutput {
    pub run_id: Uuid,
    pub request: SettlementRequest,
    pub sheets: Vec<SettlementSheet>,
    pub summaries: Vec<SummarySheet>,
    /// Sell-Out 透视表,渲染层需要
    pub pivot: Option<SellOutPivot>,
}

impl SettlementOutput {
    pub fn sheet(&self, name: &str) -> Option<&SettlementSheet> {
        self.sheets.iter().find(|s| s.name == name)
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }

    pub fn summary(&self) -> Option<&SummarySheet> {
        self.summaries.first()
    }

    /// 全部明细表的贡献合计
    pub fn contribution_total(&self) -> f64 {
        self.sheets.iter().map(|s| s.contribution_total()).sum()
    }

    pub fn to_tables(&self) -> RenderedOutput {
        RenderedOutput {
            run_id: self.run_id,
            sheets: self.sheets.iter().map(|s| s.to_table()).collect(),
            summaries: self.summaries.clone(),
            pivot: self.pivot.clone(),
        }
    }
}

/// 交给报表渲染层的扁平结构
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderedOutput {
    pub run_id: Uuid,
    pub sheets: Vec<SheetTable>,
    pub summaries: Vec<SummarySheet>,
    pub pivot: Option<SellOutPivot>,
}

// ==========================================
// 空结果信号 (Empty Result Signal)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EmptyReason {
    NoConditions,   // 目录中无匹配条件
    NoTransactions, // 期间内无台账记录
    NoMatches,      // 关联后无记录
}

impl fmt::Display for EmptyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmptyReason::NoConditions => write!(f, "未找到匹配的折扣条件"),
            EmptyReason::NoTransactions => write!(f, "所选期间内无交易记录"),
            EmptyReason::NoMatches => write!(f, "无交易记录匹配折扣条件,未生成结算"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SettlementOutcome {
    Generated(SettlementOutput),
    Empty(EmptyReason),
}

impl SettlementOutcome {
    pub fn is_empty(&self) -> bool {
        matches!(self, SettlementOutcome::Empty(_))
    }

    pub fn output(&self) -> Option<&SettlementOutput> {
        match self {
            SettlementOutcome::Generated(output) => Some(output),
            SettlementOutcome::Empty(_) => None,
        }
    }

    pub fn into_output(self) -> Option<SettlementOutput> {
        match self {
            SettlementOutcome::Generated(output) => Some(output),
            SettlementOutcome::Empty(_) => None,
        }
    }

    pub fn empty_reason(&self) -> Option<EmptyReason> {
        match self {
            SettlementOutcome::Generated(_) => None,
            SettlementOutcome::Empty(reason) => Some(*reason),
        }
    }
}
