// ==========================================
// 节点折扣结算引擎 - 结算策略
// ==========================================
// 用途: 以 (结算方向, 折扣类型, 节点) 选出唯一策略,并分派到对应的纯函数计算器
// 红线: 区间规则节点作为独立策略,不在计算器内按节点名分支
// ==========================================

use crate::config::EngineConfig;
use crate::domain::condition::{ConditionRecord, ExpandedConditionRecord};
use crate::domain::settlement::SettlementRequest;
use crate::domain::sheet::{ContributionResult, SellOutPivot};
use crate::domain::transaction::{PriceRecord, TransactionRecord};
use crate::domain::types::{ApplicationBasis, DiscountType, Liquidation, ValidatorField};
use crate::engine::basis_resolver::BasisResolver;
use crate::engine::calculators::logistics::LogisticsKind;
use crate::engine::calculators::{
    CommercialRecognitionCalculator, LogisticsCalculator, RebateCalculator, SellOutCalculator,
};
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::transaction_filter::normalize_condition_families;
use crate::engine::validator_expansion::ValidatorExpansionEngine;
use crate::engine::weight_band::{WeightBandEngine, WeightBandOutcome};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 结算策略(带计算基准的标签联合)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettlementStrategy {
    Rebate(ApplicationBasis),
    WeightBand,
    LogisticsCr,
    LogisticsFluvial,
    CommercialRecognition(ApplicationBasis),
    SellOut,
}

/// 策略计算产物
#[derive(Debug, Clone, PartialEq)]
pub enum Computation {
    /// 逐行贡献 (Rebate / 物流 / 商业认定)
    Contributions(Vec<ContributionResult>),
    /// 区间规则: 明细行不带贡献,汇总用评估结果
    WeightBand {
        rows: Vec<ContributionResult>,
        outcome: WeightBandOutcome,
    },
    /// Sell-Out: 明细行 + 透视表
    SellOut {
        rows: Vec<ContributionResult>,
        pivot: SellOutPivot,
    },
}

impl Computation {
    pub fn rows(&self) -> &[ContributionResult] {
        match self {
            Computation::Contributions(rows) => rows,
            Computation::WeightBand { rows, .. } => rows,
            Computation::SellOut { rows, .. } => rows,
        }
    }

    pub fn pivot(&self) -> Option<&SellOutPivot> {
        match self {
            Computation::SellOut { pivot, .. } => Some(pivot),
            _ => None,
        }
    }
}

impl SettlementStrategy {
    /// 选择策略
    ///
    /// # 参数
    /// - request: 结算请求
    /// - conditions: 已过滤的条件子集(非空)
    /// - config: 引擎配置
    pub fn select(
        request: &SettlementRequest,
        conditions: &[ConditionRecord],
        config: &EngineConfig,
    ) -> EngineResult<Self> {
        if request.liquidation == Liquidation::SellOut {
            return Ok(SettlementStrategy::SellOut);
        }

        if request.discount_type == DiscountType::Rebate && config.is_weight_band_node(&request.node)
        {
            return Ok(SettlementStrategy::WeightBand);
        }

        let basis = BasisResolver::resolve(conditions)?.unwrap_or(ApplicationBasis::Weight);
        match request.discount_type {
            DiscountType::Rebate => Ok(SettlementStrategy::Rebate(basis)),
            DiscountType::LogisticsCr => Ok(SettlementStrategy::LogisticsCr),
            DiscountType::LogisticsFluvial => Ok(SettlementStrategy::LogisticsFluvial),
            DiscountType::CommercialRecognition => {
                Ok(SettlementStrategy::CommercialRecognition(basis))
            }
            DiscountType::Other => Err(EngineError::UnsupportedDiscountType(
                request.discount_type.label().to_string(),
            )),
        }
    }

    pub fn is_logistics(&self) -> bool {
        matches!(
            self,
            SettlementStrategy::LogisticsCr | SettlementStrategy::LogisticsFluvial
        )
    }

    /// 计算使用的基准; 物流与区间规则固定为吨位
    pub fn basis(&self) -> Option<ApplicationBasis> {
        match self {
            SettlementStrategy::Rebate(b) | SettlementStrategy::CommercialRecognition(b) => Some(*b),
            SettlementStrategy::WeightBand
            | SettlementStrategy::LogisticsCr
            | SettlementStrategy::LogisticsFluvial => Some(ApplicationBasis::Weight),
            SettlementStrategy::SellOut => None,
        }
    }

    /// 展开顺序
    pub fn validator_order(&self) -> &'static [ValidatorField] {
        match self {
            SettlementStrategy::SellOut => &ValidatorField::SELL_OUT_ORDER,
            _ => &ValidatorField::SELL_IN_ORDER,
        }
    }

    /// 执行策略: 通配展开(区间规则除外) → 计算器
    pub fn compute(
        &self,
        transactions: &[TransactionRecord],
        conditions: &[ConditionRecord],
        prices: &[PriceRecord],
        config: &EngineConfig,
    ) -> EngineResult<Computation> {
        if *self == SettlementStrategy::WeightBand {
            let outcome = WeightBandEngine::evaluate(conditions, transactions)?;
            let rows = transactions
                .iter()
                .map(ContributionResult::from_transaction)
                .collect();
            return Ok(Computation::WeightBand { rows, outcome });
        }

        if *self == SettlementStrategy::SellOut {
            let normalized = normalize_condition_families(conditions);
            let expanded = self.expand(&normalized, transactions);
            let result = SellOutCalculator::compute(transactions, &expanded, prices)?;
            return Ok(Computation::SellOut {
                rows: result.rows,
                pivot: result.pivot,
            });
        }

        let expanded = self.expand(conditions, transactions);
        let rows = match self {
            SettlementStrategy::Rebate(basis) => {
                RebateCalculator::compute(transactions, &expanded, *basis, config)?
            }
            SettlementStrategy::CommercialRecognition(basis) => {
                CommercialRecognitionCalculator::compute(transactions, &expanded, *basis, config)?
            }
            SettlementStrategy::LogisticsCr => {
                LogisticsCalculator::compute(LogisticsKind::Cr, transactions, &expanded, config)?
            }
            SettlementStrategy::LogisticsFluvial => LogisticsCalculator::compute(
                LogisticsKind::Fluvial,
                transactions,
                &expanded,
                config,
            )?,
            SettlementStrategy::WeightBand | SettlementStrategy::SellOut => Vec::new(),
        };
        Ok(Computation::Contributions(rows))
    }

    fn expand(
        &self,
        conditions: &[ConditionRecord],
        transactions: &[TransactionRecord],
    ) -> Vec<ExpandedConditionRecord> {
        ValidatorExpansionEngine::expand(conditions, transactions, self.validator_order())
    }
}

impl fmt::Display for SettlementStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettlementStrategy::Rebate(b) => write!(f, "rebate[{}]", b),
            SettlementStrategy::WeightBand => write!(f, "weight_band"),
            SettlementStrategy::LogisticsCr => write!(f, "logistics_cr"),
            SettlementStrategy::LogisticsFluvial => write!(f, "logistics_fluvial"),
            SettlementStrategy::CommercialRecognition(b) => {
                write!(f, "commercial_recognition[{}]", b)
            }
            SettlementStrategy::SellOut => write!(f, "sell_out"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::condition::{BonusValue, ValidatorValue};
    use crate::domain::types::RecognitionPeriod;

    fn condition(basis: &str) -> ConditionRecord {
        ConditionRecord {
            liquidation: Liquidation::SellIn,
            node_code: "10".to_string(),
            node_name: "NODO A".to_string(),
            client_type: "Distribuidor".to_string(),
            discount_type: DiscountType::Rebate,
            period: RecognitionPeriod::Monthly,
            basis_label: basis.to_string(),
            bonus: BonusValue::Numeric(0.05),
            band_text: None,
            client: ValidatorValue::Wildcard,
            recipient: ValidatorValue::Wildcard,
            stage: ValidatorValue::Wildcard,
            family: ValidatorValue::Wildcard,
            product: ValidatorValue::Wildcard,
        }
    }

    fn request(liq: Liquidation, node: &str, dt: DiscountType) -> SettlementRequest {
        SettlementRequest::new(liq, node, dt, 2024, 3)
    }

    #[test]
    fn test_select() {
        let config = EngineConfig::default();
        let base = vec![condition("Precio Base")];

        assert_eq!(
            SettlementStrategy::select(
                &request(Liquidation::SellIn, "NODO A", DiscountType::Rebate),
                &base,
                &config
            )
            .unwrap(),
            SettlementStrategy::Rebate(ApplicationBasis::BasePrice)
        );
        assert_eq!(
            SettlementStrategy::select(
                &request(Liquidation::SellIn, "D. COPACIGULF", DiscountType::Rebate),
                &base,
                &config
            )
            .unwrap(),
            SettlementStrategy::WeightBand
        );
        assert_eq!(
            SettlementStrategy::select(
                &request(Liquidation::SellOut, "NODO A", DiscountType::Rebate),
                &[condition("Precio Base"), condition("Precio Neto")],
                &config
            )
            .unwrap(),
            SettlementStrategy::SellOut
        );
    }

    #[test]
    fn test_select_rejects_other_and_mixed_basis() {
        let config = EngineConfig::default();
        assert!(matches!(
            SettlementStrategy::select(
                &request(Liquidation::SellIn, "NODO A", DiscountType::Other),
                &[condition("Tonelada")],
                &config
            ),
            Err(EngineError::UnsupportedDiscountType(_))
        ));
        assert!(matches!(
            SettlementStrategy::select(
                &request(Liquidation::SellIn, "NODO A", DiscountType::Rebate),
                &[condition("Tonelada"), condition("Precio Base")],
                &config
            ),
            Err(EngineError::NonHomogeneousBasis { .. })
        ));
    }

    #[test]
    fn test_basis_and_order() {
        assert_eq!(SettlementStrategy::LogisticsCr.basis(), Some(ApplicationBasis::Weight));
        assert_eq!(SettlementStrategy::SellOut.validator_order().len(), 4);
        assert!(SettlementStrategy::LogisticsFluvial.is_logistics());
        assert_eq!(
            SettlementStrategy::Rebate(ApplicationBasis::NetValue).to_string(),
            "rebate[NET_VALUE]"
        );
    }
}
