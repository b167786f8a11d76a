// ==========================================
// 节点折扣结算引擎 - 物流折扣计算器 (CR / Fluvial)
// ==========================================
// 公式: APORTE = weight × bonus (始终按吨位)
// CR: 只结算订单参考含自提标记的交易
// ==========================================

use super::join_conditions;
use crate::config::EngineConfig;
use crate::domain::condition::ExpandedConditionRecord;
use crate::domain::sheet::ContributionResult;
use crate::domain::transaction::TransactionRecord;
use crate::domain::types::ValidatorField;
use crate::engine::error::EngineResult;
use crate::engine::transaction_filter::TransactionFilter;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogisticsKind {
    Cr,
    Fluvial,
}

pub struct LogisticsCalculator;

impl LogisticsCalculator {
    pub fn compute(
        kind: LogisticsKind,
        transactions: &[TransactionRecord],
        expanded: &[ExpandedConditionRecord],
        config: &EngineConfig,
    ) -> EngineResult<Vec<ContributionResult>> {
        let eligible = match kind {
            LogisticsKind::Cr => {
                let kept = TransactionFilter::pickup_only(transactions, &config.pickup_marker);
                debug!(
                    before = transactions.len(),
                    after = kept.len(),
                    marker = %config.pickup_marker,
                    "物流 CR 自提过滤"
                );
                kept
            }
            LogisticsKind::Fluvial => transactions.to_vec(),
        };

        let joined = join_conditions(&eligible, expanded, &ValidatorField::SELL_IN_ORDER)?;
        Ok(joined
            .into_iter()
            .map(|row| {
                let contribution = row.transaction.weight * row.bonus_rate.unwrap_or(0.0);
                ContributionResult {
                    contribution_amount: Some(contribution),
                    ..row
                }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::condition::{BonusValue, ConditionRecord, ValidatorValue};
    use crate::domain::types::{DiscountType, Liquidation, RecognitionPeriod};

    fn expanded() -> ExpandedConditionRecord {
        ExpandedConditionRecord::new(ConditionRecord {
            liquidation: Liquidation::SellIn,
            node_code: "10".to_string(),
            node_name: "NODO A".to_string(),
            client_type: "Distribuidor".to_string(),
            discount_type: DiscountType::LogisticsCr,
            period: RecognitionPeriod::Monthly,
            basis_label: "Tonelada".to_string(),
            bonus: BonusValue::Text("$3".to_string()),
            band_text: None,
            client: ValidatorValue::value("C1"),
            recipient: ValidatorValue::value("R1"),
            stage: ValidatorValue::value("S"),
            family: ValidatorValue::value("F"),
            product: ValidatorValue::value("P1"),
        })
    }

    fn tx(reference: &str) -> TransactionRecord {
        TransactionRecord {
            client_code: "C1".to_string(),
            recipient_code: "R1".to_string(),
            stage: "S".to_string(),
            family: "F".to_string(),
            product_code: "P1".to_string(),
            order_reference: reference.to_string(),
            weight: 20.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_cr_keeps_pickup_orders_only() {
        let rows = LogisticsCalculator::compute(
            LogisticsKind::Cr,
            &[tx("RECOGE EN PLANTA"), tx("ORD-123")],
            &[expanded()],
            &EngineConfig::default(),
        )
        .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].contribution_amount, Some(60.0));
    }

    #[test]
    fn test_fluvial_keeps_all_orders() {
        let rows = LogisticsCalculator::compute(
            LogisticsKind::Fluvial,
            &[tx("RECOGE"), tx("ORD-123")],
            &[expanded()],
            &EngineConfig::default(),
        )
        .unwrap();
        assert_eq!(rows.len(), 2);
    }
}
