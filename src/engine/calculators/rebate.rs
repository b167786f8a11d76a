// ==========================================
// 节点折扣结算引擎 - Rebate 计算器
// ==========================================
// 公式:
//   Weight    : APORTE = weight × bonus
//   BasePrice : APORTE = base_price × bonus × (1 + contract_discount / (base_price + volume_discount))
//   NetValue  : APORTE = (base_price + volume_discount) × bonus
// 价格基准额外输出 PVP / Dto. Factura / P. Crédito / Dto. Adicional
// ==========================================

use super::{join_conditions, with_price_components};
use crate::config::EngineConfig;
use crate::domain::condition::ExpandedConditionRecord;
use crate::domain::sheet::ContributionResult;
use crate::domain::transaction::TransactionRecord;
use crate::domain::types::{ApplicationBasis, ValidatorField};
use crate::engine::error::EngineResult;
use crate::engine::numeric::ratio;

pub struct RebateCalculator;

impl RebateCalculator {
    pub fn compute(
        transactions: &[TransactionRecord],
        expanded: &[ExpandedConditionRecord],
        basis: ApplicationBasis,
        config: &EngineConfig,
    ) -> EngineResult<Vec<ContributionResult>> {
        let joined = join_conditions(transactions, expanded, &ValidatorField::SELL_IN_ORDER)?;
        Ok(joined
            .into_iter()
            .map(|row| Self::apply(row, basis, config))
            .collect())
    }

    fn apply(row: ContributionResult, basis: ApplicationBasis, config: &EngineConfig) -> ContributionResult {
        let rate = row.bonus_rate.unwrap_or(0.0);

        if basis == ApplicationBasis::Weight {
            let contribution = row.transaction.weight * rate;
            return ContributionResult {
                contribution_amount: Some(contribution),
                ..row
            };
        }

        let mut row = with_price_components(row, config);
        let tx = &row.transaction;
        let unit_price = row.unit_price.unwrap_or(0.0);
        let credit_price = unit_price * (1.0 + row.invoice_discount.unwrap_or(0.0));
        let additional_discount = -ratio(
            ratio(
                unit_price * (tx.base_price - tx.net_value + tx.volume_discount),
                tx.base_price,
            ),
            credit_price,
        );

        let contribution = match basis {
            ApplicationBasis::BasePrice => {
                tx.base_price
                    * rate
                    * (1.0 + ratio(tx.contract_discount, tx.base_price + tx.volume_discount))
            }
            _ => (tx.base_price + tx.volume_discount) * rate,
        };

        row.credit_price = Some(credit_price);
        row.additional_discount = Some(additional_discount);
        row.contribution_amount = Some(contribution);
        row
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::condition::{BonusValue, ConditionRecord, ValidatorValue};
    use crate::domain::types::{DiscountType, Liquidation, RecognitionPeriod};

    fn expanded(basis: &str, bonus: f64) -> ExpandedConditionRecord {
        ExpandedConditionRecord::new(ConditionRecord {
            liquidation: Liquidation::SellIn,
            node_code: "10".to_string(),
            node_name: "NODO A".to_string(),
            client_type: "Distribuidor".to_string(),
            discount_type: DiscountType::Rebate,
            period: RecognitionPeriod::Monthly,
            basis_label: basis.to_string(),
            bonus: BonusValue::Numeric(bonus),
            band_text: None,
            client: ValidatorValue::value("C1"),
            recipient: ValidatorValue::value("R1"),
            stage: ValidatorValue::value("S"),
            family: ValidatorValue::value("F"),
            product: ValidatorValue::value("P1"),
        })
    }

    fn tx() -> TransactionRecord {
        TransactionRecord {
            client_code: "C1".to_string(),
            recipient_code: "R1".to_string(),
            stage: "S".to_string(),
            family: "F".to_string(),
            product_code: "P1".to_string(),
            weight: 2.0,
            base_price: 800.0,
            net_value: 700.0,
            volume_discount: -80.0,
            contract_discount: -36.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_weight_basis() {
        let rows = RebateCalculator::compute(
            &[tx()],
            &[expanded("Tonelada", 0.5)],
            ApplicationBasis::Weight,
            &EngineConfig::default(),
        )
        .unwrap();
        assert_eq!(rows[0].contribution_amount, Some(1.0));
        assert_eq!(rows[0].unit_price, None);
    }

    #[test]
    fn test_base_price_basis() {
        let rows = RebateCalculator::compute(
            &[tx()],
            &[expanded("Precio Base", 0.1)],
            ApplicationBasis::BasePrice,
            &EngineConfig::default(),
        )
        .unwrap();
        let row = &rows[0];
        // 800 × 0.1 × (1 + (-36 / 720)) = 76
        assert!((row.contribution() - 76.0).abs() < 1e-9);
        // PVP = 800 / 2 / 40 = 10; Dto. Factura = -0.1; P. Crédito = 9
        assert_eq!(row.unit_price, Some(10.0));
        assert!((row.credit_price.unwrap() - 9.0).abs() < 1e-9);
        // Dto. Adicional = -(10 × 20 / 800) / 9
        assert!((row.additional_discount.unwrap() + 0.25 / 9.0).abs() < 1e-9);
    }

    #[test]
    fn test_net_value_basis() {
        let rows = RebateCalculator::compute(
            &[tx()],
            &[expanded("Valor Neto", 0.1)],
            ApplicationBasis::NetValue,
            &EngineConfig::default(),
        )
        .unwrap();
        assert!((rows[0].contribution() - 72.0).abs() < 1e-9);
        assert!(rows[0].credit_price.is_some());
    }
}
