// ==========================================
// 节点折扣结算引擎 - 交易台账与价格主数据
// ==========================================
// 职责: Sell-In 销售 / Sell-Out 终端销售 共用的台账行,以及价格行
// 红线: 载入后不可变,计算器只读
// ==========================================

use crate::domain::types::ValidatorField;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// 交易行 (Transaction Record)
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct TransactionRecord {
    // ===== 期间 =====
    pub year: i32,
    pub month: u32,

    // ===== 节点 =====
    pub node_code: String,
    pub node_name: String,

    // ===== 校验维度 =====
    pub client_code: String,
    pub client_name: String,
    pub recipient_code: String,
    pub recipient_name: String,
    pub stage: String,
    pub family: String,
    pub product_code: String,
    pub product_name: String,

    // ===== 发票 =====
    pub invoice_class: String,
    pub invoice_number: String,
    #[serde(default)]
    pub partners: Option<String>,
    pub invoice_date: Option<NaiveDate>,
    /// 客户订单参考(自提订单含 "RECOGE")
    pub order_reference: String,

    // ===== 数量与金额 =====
    pub billed_quantity: f64,
    pub weight: f64,
    pub net_value: f64,
    pub base_price: f64,

    // ===== 折扣分项 =====
    pub volume_discount: f64,
    pub quotation_discount: f64,
    pub contract_discount: f64,
    pub logistics_discount: f64,
    pub logistics_rebate: f64,
    pub net_price: f64,
}

impl TransactionRecord {
    /// 校验字段对应的台账值
    pub fn validator_value(&self, field: ValidatorField) -> &str {
        match field {
            ValidatorField::Client => &self.client_code,
            ValidatorField::Recipient => &self.recipient_code,
            ValidatorField::Stage => &self.stage,
            ValidatorField::Family => &self.family,
            ValidatorField::Product => &self.product_code,
        }
    }
}

// ==========================================
// 价格行 (Price Record)
// ==========================================
// 仅 Sell-Out 计算使用
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRecord {
    pub node_code: String,
    pub product_code: String,
    pub list_price: f64,
    /// 发票折扣比例 (0.12 = 12%)
    pub invoice_discount_pct: f64,
}
