// ==========================================
// 节点折扣结算引擎 - 校验字段通配展开引擎
// ==========================================
// 职责: 将条件行中的通配校验值替换为交易台账中实际出现的值
// 红线: 严格按字段顺序逐列展开,后列的候选值受前列已确定值约束
// ==========================================
// 输入: 过滤后的条件子集 + 交易台账
// 输出: 展开后的条件表(行数 >= 具体行数)
// ==========================================

use crate::domain::condition::{ConditionRecord, ExpandedConditionRecord, ValidatorValue};
use crate::domain::transaction::TransactionRecord;
use crate::domain::types::ValidatorField;
use std::collections::HashSet;
use tracing::debug;

// ==========================================
// ValidatorExpansionEngine - 通配展开引擎
// ==========================================
// 红线: 无状态引擎,输入只读,每一步返回新表
pub struct ValidatorExpansionEngine;

impl ValidatorExpansionEngine {
    /// 按给定字段顺序展开通配
    ///
    /// # 规则
    /// - 具体值: 原样保留
    /// - 通配: 在"前序字段均匹配"的交易中取该字段的去重值,每个值克隆一行
    /// - 通配但无匹配交易: 丢弃该行
    ///
    /// # 参数
    /// - conditions: 条件子集
    /// - transactions: 交易台账
    /// - order: 字段顺序 (Sell-In 五列 / Sell-Out 四列)
    pub fn expand(
        conditions: &[ConditionRecord],
        transactions: &[TransactionRecord],
        order: &[ValidatorField],
    ) -> Vec<ExpandedConditionRecord> {
        let mut rows: Vec<ConditionRecord> = conditions.to_vec();

        for (index, field) in order.iter().enumerate() {
            let resolved = &order[..index];
            let mut expanded = Vec::with_capacity(rows.len());
            let mut dropped = 0usize;

            for row in &rows {
                match row.validator(*field) {
                    ValidatorValue::Value(_) => expanded.push(row.clone()),
                    ValidatorValue::Wildcard => {
                        let candidates =
                            Self::distinct_values(row, transactions, resolved, *field);
                        if candidates.is_empty() {
                            dropped += 1;
                        }
                        expanded.extend(candidates.into_iter().map(|value| {
                            row.with_validator(*field, ValidatorValue::Value(value))
                        }));
                    }
                }
            }

            debug!(
                field = %field,
                rows_in = rows.len(),
                rows_out = expanded.len(),
                dropped,
                "通配展开步骤完成"
            );
            rows = expanded;
        }

        rows.into_iter().map(ExpandedConditionRecord::new).collect()
    }

    /// 在前序字段均匹配的交易中,按首次出现顺序取目标字段的去重值
    fn distinct_values(
        row: &ConditionRecord,
        transactions: &[TransactionRecord],
        resolved: &[ValidatorField],
        field: ValidatorField,
    ) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut values = Vec::new();

        for tx in transactions {
            let in_scope = resolved
                .iter()
                .all(|f| Self::matches(row.validator(*f), tx.validator_value(*f)));
            if !in_scope {
                continue;
            }
            let value = tx.validator_value(field);
            if seen.insert(value) {
                values.push(value.to_string());
            }
        }

        values
    }

    fn matches(expected: &ValidatorValue, actual: &str) -> bool {
        match expected {
            ValidatorValue::Wildcard => true,
            ValidatorValue::Value(v) => v == actual,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::condition::BonusValue;
    use crate::domain::types::{DiscountType, Liquidation, RecognitionPeriod};

    fn condition(client: ValidatorValue, product: ValidatorValue) -> ConditionRecord {
        ConditionRecord {
            liquidation: Liquidation::SellIn,
            node_code: "10".to_string(),
            node_name: "NODO A".to_string(),
            client_type: "Distribuidor".to_string(),
            discount_type: DiscountType::Rebate,
            period: RecognitionPeriod::Monthly,
            basis_label: "Tonelada".to_string(),
            bonus: BonusValue::Numeric(0.05),
            band_text: None,
            client,
            recipient: ValidatorValue::Wildcard,
            stage: ValidatorValue::Wildcard,
            family: ValidatorValue::Wildcard,
            product,
        }
    }

    fn tx(client: &str, product: &str) -> TransactionRecord {
        TransactionRecord {
            client_code: client.to_string(),
            recipient_code: format!("R-{}", client),
            stage: "Engorde".to_string(),
            family: "Fam".to_string(),
            product_code: product.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_wildcard_scoped_by_earlier_concrete_value() {
        let conditions = vec![condition(ValidatorValue::value("C1"), ValidatorValue::Wildcard)];
        let transactions = vec![tx("C1", "P1"), tx("C1", "P2"), tx("C2", "P3"), tx("C1", "P1")];

        let expanded = ValidatorExpansionEngine::expand(
            &conditions,
            &transactions,
            &ValidatorField::SELL_IN_ORDER,
        );

        let products: Vec<&str> = expanded
            .iter()
            .filter_map(|e| e.key(ValidatorField::Product))
            .collect();
        assert_eq!(products, vec!["P1", "P2"]);
    }

    #[test]
    fn test_wildcard_without_transactions_is_dropped() {
        let conditions = vec![condition(ValidatorValue::value("C9"), ValidatorValue::Wildcard)];
        let transactions = vec![tx("C1", "P1")];

        let expanded = ValidatorExpansionEngine::expand(
            &conditions,
            &transactions,
            &ValidatorField::SELL_IN_ORDER,
        );
        assert!(expanded.is_empty());
    }

    #[test]
    fn test_concrete_row_kept_even_without_transactions() {
        let mut row = condition(ValidatorValue::value("C9"), ValidatorValue::value("P9"));
        row.recipient = ValidatorValue::value("R9");
        row.stage = ValidatorValue::value("S9");
        row.family = ValidatorValue::value("F9");

        let expanded = ValidatorExpansionEngine::expand(
            &[row.clone()],
            &[tx("C1", "P1")],
            &ValidatorField::SELL_IN_ORDER,
        );
        assert_eq!(expanded.len(), 1);
        assert_eq!(expanded[0].condition, row);
    }

    #[test]
    fn test_input_conditions_not_mutated() {
        let conditions = vec![condition(ValidatorValue::Wildcard, ValidatorValue::Wildcard)];
        let before = conditions.clone();
        let _ = ValidatorExpansionEngine::expand(
            &conditions,
            &[tx("C1", "P1")],
            &ValidatorField::SELL_IN_ORDER,
        );
        assert_eq!(conditions, before);
    }
}
