// ==========================================
// 节点折扣结算引擎 - 商业认定 (Reconocimiento Comercial) 计算器
// ==========================================
// 公式:
//   Weight    : APORTE = weight × bonus
//   BasePrice : P. Crédito = trunc(PVP × (1 + Dto. Factura − bonus), 3)
//               APORTE     = trunc(PVP × bonus, 3) × qty × (1 + Dto. Adicional)
//   NetValue  : P. Crédito = trunc(PVP × (1 + Dto. Factura), 3)
//               APORTE     = P. Crédito × (1 + Dto. Adicional) × bonus × qty
//   Dto. Adicional = round((base_price − net_value + volume_discount) / base_price, 5)
// 红线: trunc 不得以四舍五入代替
// ==========================================

use super::{join_conditions, with_price_components};
use crate::config::EngineConfig;
use crate::domain::condition::ExpandedConditionRecord;
use crate::domain::sheet::ContributionResult;
use crate::domain::transaction::TransactionRecord;
use crate::domain::types::{ApplicationBasis, ValidatorField};
use crate::engine::error::EngineResult;
use crate::engine::numeric::{ratio, round_to, trunc};

pub struct CommercialRecognitionCalculator;

impl CommercialRecognitionCalculator {
    pub fn compute(
        transactions: &[TransactionRecord],
        expanded: &[ExpandedConditionRecord],
        basis: ApplicationBasis,
        config: &EngineConfig,
    ) -> EngineResult<Vec<ContributionResult>> {
        let joined = join_conditions(transactions, expanded, &ValidatorField::SELL_IN_ORDER)?;
        Ok(joined
            .into_iter()
            .map(|row| Self::apply(with_price_components(row, config), basis))
            .collect())
    }

    /// 在已有 PVP / Dto. Factura 的行上计算贡献
    pub fn apply(row: ContributionResult, basis: ApplicationBasis) -> ContributionResult {
        let rate = row.bonus_rate.unwrap_or(0.0);
        let tx = &row.transaction;

        if basis == ApplicationBasis::Weight {
            let contribution = tx.weight * rate;
            return ContributionResult {
                contribution_amount: Some(contribution),
                ..row
            };
        }

        let unit_price = row.unit_price.unwrap_or(0.0);
        let invoice_discount = row.invoice_discount.unwrap_or(0.0);
        let additional_discount = round_to(
            ratio(tx.base_price - tx.net_value + tx.volume_discount, tx.base_price),
            5,
        );

        let (credit_price, contribution) = match basis {
            ApplicationBasis::BasePrice => {
                let credit = trunc(unit_price * (1.0 + invoice_discount - rate), 3);
                let contribution = trunc(unit_price * rate, 3)
                    * tx.billed_quantity
                    * (1.0 + additional_discount);
                (credit, contribution)
            }
            _ => {
                let credit = trunc(unit_price * (1.0 + invoice_discount), 3);
                let contribution =
                    credit * (1.0 + additional_discount) * rate * tx.billed_quantity;
                (credit, contribution)
            }
        };

        ContributionResult {
            credit_price: Some(credit_price),
            additional_discount: Some(additional_discount),
            contribution_amount: Some(contribution),
            ..row
        }
    }
}
