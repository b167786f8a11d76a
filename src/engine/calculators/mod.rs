// ==========================================
// 节点折扣结算引擎 - 折扣类型计算器
// ==========================================
// 职责: 交易 × 展开条件 内连接, 按计算基准追加中间列与贡献金额
// 红线: 输入只读; 未匹配条件的交易不参与结算
// ==========================================
// 共用步骤:
//   1. 展开条件按 (五个校验值, 奖励值) 去重
//   2. 以校验字段为键做内连接
//   3. 奖励值解析为比率 (无法解析 → InvalidBonusValue)
//   4. 单价 / 发票折扣 (价格基准使用)
// ==========================================

pub mod commercial;
pub mod logistics;
pub mod rebate;
pub mod sell_out;

pub use commercial::CommercialRecognitionCalculator;
pub use logistics::LogisticsCalculator;
pub use rebate::RebateCalculator;
pub use sell_out::SellOutCalculator;

use crate::config::EngineConfig;
use crate::domain::condition::{ConditionRecord, ExpandedConditionRecord};
use crate::domain::sheet::ContributionResult;
use crate::domain::transaction::TransactionRecord;
use crate::domain::types::ValidatorField;
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::numeric::ratio;
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// 奖励值 → 比率
pub fn bonus_rate(condition: &ConditionRecord) -> EngineResult<f64> {
    condition
        .bonus
        .rate()
        .ok_or_else(|| EngineError::InvalidBonusValue {
            node: condition.node_name.clone(),
            value: condition.bonus.to_string(),
        })
}

/// 按 (校验值..., 奖励值) 去重,保留首次出现顺序
pub fn dedup_conditions(
    expanded: &[ExpandedConditionRecord],
    order: &[ValidatorField],
) -> Vec<ExpandedConditionRecord> {
    let mut seen: HashSet<(Vec<String>, String)> = HashSet::new();
    expanded
        .iter()
        .filter(|e| {
            let key: Vec<String> = order
                .iter()
                .map(|f| e.condition.validator(*f).to_string())
                .collect();
            seen.insert((key, e.condition.bonus.to_string()))
        })
        .cloned()
        .collect()
}

/// 交易与展开条件内连接
///
/// 同一交易匹配多条条件(奖励值不同)时,每条条件各产生一行
pub fn join_conditions(
    transactions: &[TransactionRecord],
    expanded: &[ExpandedConditionRecord],
    order: &[ValidatorField],
) -> EngineResult<Vec<ContributionResult>> {
    let conditions = dedup_conditions(expanded, order);

    let mut index: HashMap<Vec<&str>, Vec<(&ExpandedConditionRecord, f64)>> = HashMap::new();
    for condition in &conditions {
        let key: Option<Vec<&str>> = order.iter().map(|f| condition.key(*f)).collect();
        // 展开后仍为通配的行无法连接
        let Some(key) = key else { continue };
        let rate = bonus_rate(&condition.condition)?;
        index.entry(key).or_default().push((condition, rate));
    }

    let mut joined = Vec::new();
    for tx in transactions {
        let key: Vec<&str> = order.iter().map(|f| tx.validator_value(*f)).collect();
        if let Some(matches) = index.get(&key) {
            for (condition, rate) in matches {
                let mut row = ContributionResult::from_transaction(tx);
                row.condition = Some((*condition).clone());
                row.bonus_rate = Some(*rate);
                joined.push(row);
            }
        }
    }

    debug!(
        transactions = transactions.len(),
        conditions = conditions.len(),
        joined = joined.len(),
        "交易与条件内连接完成"
    );
    Ok(joined)
}

/// 追加单价与发票折扣列
///
/// unit_price = base_price / weight / 除数; invoice_discount = volume_discount / base_price
pub fn with_price_components(mut row: ContributionResult, config: &EngineConfig) -> ContributionResult {
    let tx = &row.transaction;
    let divisor = config.divisor_for_family(&tx.family);
    let unit_price = ratio(ratio(tx.base_price, tx.weight), divisor);
    let invoice_discount = ratio(tx.volume_discount, tx.base_price);
    row.unit_price = Some(unit_price);
    row.invoice_discount = Some(invoice_discount);
    row
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::condition::{BonusValue, ValidatorValue};
    use crate::domain::types::{DiscountType, Liquidation, RecognitionPeriod};

    fn expanded(client: &str, product: &str, bonus: BonusValue) -> ExpandedConditionRecord {
        ExpandedConditionRecord::new(ConditionRecord {
            liquidation: Liquidation::SellIn,
            node_code: "10".to_string(),
            node_name: "NODO A".to_string(),
            client_type: "Distribuidor".to_string(),
            discount_type: DiscountType::Rebate,
            period: RecognitionPeriod::Monthly,
            basis_label: "Tonelada".to_string(),
            bonus,
            band_text: None,
            client: ValidatorValue::value(client),
            recipient: ValidatorValue::value("R1"),
            stage: ValidatorValue::value("Engorde"),
            family: ValidatorValue::value("Fam"),
            product: ValidatorValue::value(product),
        })
    }

    fn tx(client: &str, product: &str) -> TransactionRecord {
        TransactionRecord {
            client_code: client.to_string(),
            recipient_code: "R1".to_string(),
            stage: "Engorde".to_string(),
            family: "Fam".to_string(),
            product_code: product.to_string(),
            weight: 10.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_join_excludes_unmatched_and_dedups() {
        let conditions = vec![
            expanded("C1", "P1", BonusValue::Numeric(0.05)),
            expanded("C1", "P1", BonusValue::Numeric(0.05)),
        ];
        let transactions = vec![tx("C1", "P1"), tx("C2", "P1")];

        let joined =
            join_conditions(&transactions, &conditions, &ValidatorField::SELL_IN_ORDER).unwrap();
        assert_eq!(joined.len(), 1);
        assert_eq!(joined[0].bonus_rate, Some(0.05));
        assert_eq!(joined[0].transaction.client_code, "C1");
    }

    #[test]
    fn test_join_multiple_bonus_values_fan_out() {
        let conditions = vec![
            expanded("C1", "P1", BonusValue::Numeric(0.05)),
            expanded("C1", "P1", BonusValue::Numeric(0.01)),
        ];
        let joined =
            join_conditions(&[tx("C1", "P1")], &conditions, &ValidatorField::SELL_IN_ORDER).unwrap();
        assert_eq!(joined.len(), 2);
    }

    #[test]
    fn test_join_invalid_bonus_is_error() {
        let conditions = vec![expanded("C1", "P1", BonusValue::Text("abc".to_string()))];
        let result = join_conditions(&[tx("C1", "P1")], &conditions, &ValidatorField::SELL_IN_ORDER);
        assert!(matches!(result, Err(EngineError::InvalidBonusValue { .. })));
    }

    #[test]
    fn test_price_components_special_family() {
        let config = EngineConfig::default();
        let mut t = tx("C1", "P1");
        t.base_price = 4000.0;
        t.weight = 10.0;
        t.volume_discount = -400.0;

        let row = with_price_components(ContributionResult::from_transaction(&t), &config);
        assert_eq!(row.unit_price, Some(10.0));
        assert_eq!(row.invoice_discount, Some(-0.1));

        t.family = "Nicovita Origin".to_string();
        let row = with_price_components(ContributionResult::from_transaction(&t), &config);
        assert_eq!(row.unit_price, Some(4.0));
    }

    #[test]
    fn test_price_components_zero_weight() {
        let t = TransactionRecord {
            base_price: 100.0,
            ..Default::default()
        };
        let row = with_price_components(ContributionResult::from_transaction(&t), &EngineConfig::default());
        assert_eq!(row.unit_price, Some(0.0));
    }
}
