// ==========================================
// 节点折扣结算引擎 - 计算基准解析
// ==========================================
// 职责: 从条件子集读取唯一的计算基准标签并映射为 ApplicationBasis
// 红线: 标签不唯一时报错,不猜测取值
// ==========================================

use crate::domain::condition::ConditionRecord;
use crate::domain::types::ApplicationBasis;
use crate::engine::error::{EngineError, EngineResult};

pub struct BasisResolver;

impl BasisResolver {
    /// 解析条件子集的计算基准
    ///
    /// # 返回
    /// - Ok(Some(basis)): 标签唯一
    /// - Ok(None): 子集为空
    /// - Err(NonHomogeneousBasis): 子集中出现多个不同标签
    pub fn resolve(conditions: &[ConditionRecord]) -> EngineResult<Option<ApplicationBasis>> {
        let labels = Self::distinct_labels(conditions);
        match labels.as_slice() {
            [] => Ok(None),
            [label] => Ok(Some(ApplicationBasis::from_label(label))),
            _ => Err(EngineError::NonHomogeneousBasis {
                node: conditions
                    .first()
                    .map(|c| c.node_name.clone())
                    .unwrap_or_default(),
                labels,
            }),
        }
    }

    /// Sell-Out 透视表允许混合基准,按出现顺序返回去重后的基准列表
    pub fn present_bases(conditions: &[ConditionRecord]) -> Vec<ApplicationBasis> {
        let mut bases: Vec<ApplicationBasis> = Vec::new();
        for c in conditions {
            let basis = ApplicationBasis::from_label(&c.basis_label);
            let column = basis.pivot_column();
            if !bases.iter().any(|b| b.pivot_column() == column) {
                bases.push(basis);
            }
        }
        // P.Base 列固定在前
        bases.sort_by_key(|b| *b != ApplicationBasis::BasePrice);
        bases
    }

    fn distinct_labels(conditions: &[ConditionRecord]) -> Vec<String> {
        let mut labels: Vec<String> = Vec::new();
        for c in conditions {
            let label = c.basis_label.trim();
            if !labels.iter().any(|l| l == label) {
                labels.push(label.to_string());
            }
        }
        labels
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::condition::{BonusValue, ValidatorValue};
    use crate::domain::types::{DiscountType, Liquidation, RecognitionPeriod};

    fn condition(label: &str) -> ConditionRecord {
        ConditionRecord {
            liquidation: Liquidation::SellIn,
            node_code: "10".to_string(),
            node_name: "NODO A".to_string(),
            client_type: "Distribuidor".to_string(),
            discount_type: DiscountType::Rebate,
            period: RecognitionPeriod::Monthly,
            basis_label: label.to_string(),
            bonus: BonusValue::Numeric(0.05),
            band_text: None,
            client: ValidatorValue::Wildcard,
            recipient: ValidatorValue::Wildcard,
            stage: ValidatorValue::Wildcard,
            family: ValidatorValue::Wildcard,
            product: ValidatorValue::Wildcard,
        }
    }

    #[test]
    fn test_resolve_homogeneous() {
        let conditions = vec![condition("Precio Base"), condition("Precio Base ")];
        assert_eq!(
            BasisResolver::resolve(&conditions).unwrap(),
            Some(ApplicationBasis::BasePrice)
        );
    }

    #[test]
    fn test_resolve_empty() {
        assert_eq!(BasisResolver::resolve(&[]).unwrap(), None);
    }

    #[test]
    fn test_resolve_mixed_labels_is_error() {
        let conditions = vec![condition("Tonelada"), condition("Valor Neto")];
        match BasisResolver::resolve(&conditions) {
            Err(EngineError::NonHomogeneousBasis { node, labels }) => {
                assert_eq!(node, "NODO A");
                assert_eq!(labels, vec!["Tonelada", "Valor Neto"]);
            }
            other => panic!("expected NonHomogeneousBasis, got {:?}", other),
        }
    }

    #[test]
    fn test_present_bases_puts_base_price_first() {
        let conditions = vec![
            condition("Valor Neto"),
            condition("Precio Base"),
            condition("Precio Neto"),
        ];
        assert_eq!(
            BasisResolver::present_bases(&conditions),
            vec![ApplicationBasis::BasePrice, ApplicationBasis::NetValue]
        );
    }
}
