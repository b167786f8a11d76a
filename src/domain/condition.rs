// ==========================================
// 节点折扣结算引擎 - 折扣条件目录 (Binnacle)
// ==========================================
// 职责: 条件行 / 通配校验值 / 奖励值 / 展开后的条件行
// 红线: 条件行只读,展开时克隆新行,不原地修改
// ==========================================

use crate::domain::types::{DiscountType, Liquidation, RecognitionPeriod, ValidatorField};
use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 校验值 (Validator Value)
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValidatorValue {
    Wildcard,
    Value(String),
}

impl ValidatorValue {
    /// 解析原始单元格,命中任一通配标记即视为通配
    pub fn parse(raw: &str, wildcard_markers: &[String]) -> Self {
        let trimmed = raw.trim();
        if wildcard_markers.iter().any(|m| m.eq_ignore_ascii_case(trimmed)) {
            ValidatorValue::Wildcard
        } else {
            ValidatorValue::Value(trimmed.to_string())
        }
    }

    pub fn value(raw: impl Into<String>) -> Self {
        ValidatorValue::Value(raw.into())
    }

    pub fn is_wildcard(&self) -> bool {
        matches!(self, ValidatorValue::Wildcard)
    }

    pub fn as_concrete(&self) -> Option<&str> {
        match self {
            ValidatorValue::Wildcard => None,
            ValidatorValue::Value(v) => Some(v.as_str()),
        }
    }
}

impl fmt::Display for ValidatorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidatorValue::Wildcard => write!(f, "*"),
            ValidatorValue::Value(v) => write!(f, "{}", v),
        }
    }
}

// ==========================================
// 奖励值 (Bonus Value)
// ==========================================
// 目录中可能是数值,也可能是带货币格式的文本 ("$1,250.50" / "0,05")
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BonusValue {
    Numeric(f64),
    Text(String),
}

impl BonusValue {
    /// 解析为数值比率,无法解析时返回 None
    ///
    /// # 规则
    /// - 去掉 `$` 与空白
    /// - 同时出现 `,` 与 `.` → `,` 为千分位
    /// - 仅出现 `,` 且其后恰好三位数字 → 千分位,否则视为小数点
    pub fn rate(&self) -> Option<f64> {
        match self {
            BonusValue::Numeric(v) => Some(*v),
            BonusValue::Text(raw) => {
                let cleaned: String = raw
                    .chars()
                    .filter(|c| *c != '$' && !c.is_whitespace())
                    .collect();
                if cleaned.is_empty() {
                    return None;
                }

                let normalized = if cleaned.contains('.') {
                    cleaned.replace(',', "")
                } else if let Some(pos) = cleaned.rfind(',') {
                    let tail = &cleaned[pos + 1..];
                    if cleaned.matches(',').count() > 1
                        || (tail.len() == 3 && tail.chars().all(|c| c.is_ascii_digit()))
                    {
                        cleaned.replace(',', "")
                    } else {
                        cleaned.replace(',', ".")
                    }
                } else {
                    cleaned
                };

                normalized.parse::<f64>().ok()
            }
        }
    }
}

impl fmt::Display for BonusValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BonusValue::Numeric(v) => write!(f, "{}", v),
            BonusValue::Text(s) => write!(f, "{}", s),
        }
    }
}

// ==========================================
// 条件行 (Condition Record)
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionRecord {
    pub liquidation: Liquidation,
    pub node_code: String,
    pub node_name: String,
    pub client_type: String,
    pub discount_type: DiscountType,
    pub period: RecognitionPeriod,
    /// 原始计算基准标签 ("Tonelada" / "Precio Base" / ...)
    pub basis_label: String,
    pub bonus: BonusValue,
    /// 重量区间文本,仅区间规则节点使用 ("8K - 12K TM")
    pub band_text: Option<String>,

    // ===== 五个校验字段(顺序固定) =====
    pub client: ValidatorValue,
    pub recipient: ValidatorValue,
    pub stage: ValidatorValue,
    pub family: ValidatorValue,
    pub product: ValidatorValue,
}

impl ConditionRecord {
    pub fn validator(&self, field: ValidatorField) -> &ValidatorValue {
        match field {
            ValidatorField::Client => &self.client,
            ValidatorField::Recipient => &self.recipient,
            ValidatorField::Stage => &self.stage,
            ValidatorField::Family => &self.family,
            ValidatorField::Product => &self.product,
        }
    }

    /// 克隆当前行并替换一个校验字段
    pub fn with_validator(&self, field: ValidatorField, value: ValidatorValue) -> Self {
        let mut row = self.clone();
        match field {
            ValidatorField::Client => row.client = value,
            ValidatorField::Recipient => row.recipient = value,
            ValidatorField::Stage => row.stage = value,
            ValidatorField::Family => row.family = value,
            ValidatorField::Product => row.product = value,
        }
        row
    }

    /// 给定字段序列中是否仍有通配
    pub fn has_wildcard_in(&self, order: &[ValidatorField]) -> bool {
        order.iter().any(|f| self.validator(*f).is_wildcard())
    }
}

// ==========================================
// 展开后的条件行 (Expanded Condition Record)
// ==========================================
// 不变量: 展开顺序中的校验字段全部为具体值
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpandedConditionRecord {
    pub condition: ConditionRecord,
}

impl ExpandedConditionRecord {
    pub fn new(condition: ConditionRecord) -> Self {
        Self { condition }
    }

    /// 具体校验值;通配(未在展开顺序中)返回 None
    pub fn key(&self, field: ValidatorField) -> Option<&str> {
        self.condition.validator(field).as_concrete()
    }

    pub fn into_condition(self) -> ConditionRecord {
        self.condition
    }
}
