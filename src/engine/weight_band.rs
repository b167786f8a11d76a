// ==========================================
// 节点折扣结算引擎 - 重量区间规则
// ==========================================
// 职责: 区间规则节点不做通配展开,按月均吨位选中一条区间条件
// 规则:
//   1. 区间文本 "8K - 12K TM" → [8000, 12000]
//   2. 月均吨位 = 各月吨位合计的平均值
//   3. 选中区间包含月均吨位的条件行,奖励值 × 100 即达成百分比
// 红线: 不产生逐行贡献,只供汇总表使用
// ==========================================

use crate::domain::condition::ConditionRecord;
use crate::domain::transaction::TransactionRecord;
use crate::engine::error::{EngineError, EngineResult};
use std::collections::BTreeMap;
use tracing::{debug, warn};

// ==========================================
// WeightBand - 吨位区间
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightBand {
    pub lower: f64,
    pub upper: f64,
}

impl WeightBand {
    /// 解析区间文本 ("X - Y ...", 数值可带 K 表示千吨)
    pub fn parse(text: &str) -> EngineResult<Self> {
        let invalid = || EngineError::InvalidBandText {
            text: text.to_string(),
        };

        let mut parts = text.split(" - ");
        let lower_raw = parts.next().ok_or_else(invalid)?;
        let upper_raw = parts
            .next()
            .and_then(|p| p.split_whitespace().next())
            .ok_or_else(invalid)?;

        let lower = Self::parse_bound(lower_raw).ok_or_else(invalid)?;
        let upper = Self::parse_bound(upper_raw).ok_or_else(invalid)?;
        Ok(Self { lower, upper })
    }

    fn parse_bound(raw: &str) -> Option<f64> {
        raw.replace('K', "")
            .trim()
            .parse::<f64>()
            .ok()
            .map(|v| v * 1000.0)
    }

    /// 闭区间判定
    pub fn contains(&self, value: f64) -> bool {
        value >= self.lower && value <= self.upper
    }
}

// ==========================================
// 区间规则评估结果
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct WeightBandOutcome {
    pub mean_weight: f64,
    pub mean_net_value: f64,
    pub band: Option<WeightBand>,
    pub selected: Option<ConditionRecord>,
    /// 达成百分比 (奖励值 × 100)
    pub percentage_won: f64,
}

pub struct WeightBandEngine;

impl WeightBandEngine {
    /// 评估区间规则
    ///
    /// # 参数
    /// - conditions: 区间规则节点的条件子集
    /// - transactions: 周期内已过滤的交易
    ///
    /// # 返回
    /// 无区间包含月均吨位时 percentage_won = 0
    pub fn evaluate(
        conditions: &[ConditionRecord],
        transactions: &[TransactionRecord],
    ) -> EngineResult<WeightBandOutcome> {
        let mean_weight = Self::monthly_mean(transactions, |tx| tx.weight);
        let mean_net_value = Self::monthly_mean(transactions, |tx| tx.net_value);

        let mut selected: Option<(WeightBand, &ConditionRecord)> = None;
        for condition in conditions {
            let text = condition
                .band_text
                .as_deref()
                .ok_or_else(|| EngineError::MissingField {
                    record: format!("条件 {}", condition.node_name),
                    field: "CONDICION".to_string(),
                })?;
            let band = WeightBand::parse(text)?;
            if selected.is_none() && band.contains(mean_weight) {
                selected = Some((band, condition));
            }
        }

        let outcome = match selected {
            Some((band, condition)) => {
                let rate = condition.bonus.rate().ok_or_else(|| EngineError::InvalidBonusValue {
                    node: condition.node_name.clone(),
                    value: condition.bonus.to_string(),
                })?;
                debug!(
                    mean_weight,
                    lower = band.lower,
                    upper = band.upper,
                    rate,
                    "区间规则选中条件"
                );
                WeightBandOutcome {
                    mean_weight,
                    mean_net_value,
                    band: Some(band),
                    selected: Some(condition.clone()),
                    percentage_won: rate * 100.0,
                }
            }
            None => {
                warn!(mean_weight, bands = conditions.len(), "月均吨位未落入任何区间, 达成百分比记为 0");
                WeightBandOutcome {
                    mean_weight,
                    mean_net_value,
                    band: None,
                    selected: None,
                    percentage_won: 0.0,
                }
            }
        };
        Ok(outcome)
    }

    /// 按月汇总后取平均;无交易时为 0
    pub fn monthly_mean<F>(transactions: &[TransactionRecord], value: F) -> f64
    where
        F: Fn(&TransactionRecord) -> f64,
    {
        let mut per_month: BTreeMap<u32, f64> = BTreeMap::new();
        for tx in transactions {
            *per_month.entry(tx.month).or_insert(0.0) += value(tx);
        }
        if per_month.is_empty() {
            return 0.0;
        }
        per_month.values().sum::<f64>() / per_month.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::condition::{BonusValue, ValidatorValue};
    use crate::domain::types::{DiscountType, Liquidation, RecognitionPeriod};

    fn band_condition(text: &str, bonus: f64) -> ConditionRecord {
        ConditionRecord {
            liquidation: Liquidation::SellIn,
            node_code: "20".to_string(),
            node_name: "D. COPACIGULF".to_string(),
            client_type: "Distribuidor".to_string(),
            discount_type: DiscountType::Rebate,
            period: RecognitionPeriod::Quarterly,
            basis_label: "Tonelada".to_string(),
            bonus: BonusValue::Numeric(bonus),
            band_text: Some(text.to_string()),
            client: ValidatorValue::Wildcard,
            recipient: ValidatorValue::Wildcard,
            stage: ValidatorValue::Wildcard,
            family: ValidatorValue::Wildcard,
            product: ValidatorValue::Wildcard,
        }
    }

    fn tx(month: u32, weight: f64) -> TransactionRecord {
        TransactionRecord {
            month,
            weight,
            net_value: weight * 2.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_parse_band() {
        let band = WeightBand::parse("8K - 12K TM").unwrap();
        assert_eq!(band, WeightBand { lower: 8000.0, upper: 12000.0 });
        assert!(band.contains(8000.0));
        assert!(band.contains(12000.0));
        assert!(!band.contains(12000.1));
    }

    #[test]
    fn test_parse_band_invalid() {
        assert!(matches!(
            WeightBand::parse("desde 8K"),
            Err(EngineError::InvalidBandText { .. })
        ));
        assert!(WeightBand::parse("AK - 12K").is_err());
    }

    #[test]
    fn test_monthly_mean() {
        let transactions = vec![tx(1, 4000.0), tx(1, 5000.0), tx(2, 11000.0)];
        assert_eq!(WeightBandEngine::monthly_mean(&transactions, |t| t.weight), 10000.0);
        assert_eq!(WeightBandEngine::monthly_mean(&[], |t| t.weight), 0.0);
    }

    #[test]
    fn test_evaluate_selects_band() {
        let conditions = vec![
            band_condition("0K - 8K TM", 0.0),
            band_condition("8K - 12K TM", 0.015),
            band_condition("12K - 99K TM", 0.02),
        ];
        let transactions = vec![tx(1, 9000.0), tx(2, 11000.0)];

        let outcome = WeightBandEngine::evaluate(&conditions, &transactions).unwrap();
        assert_eq!(outcome.mean_weight, 10000.0);
        assert!((outcome.percentage_won - 1.5).abs() < 1e-9);
        assert_eq!(outcome.band.map(|b| b.lower), Some(8000.0));
    }

    #[test]
    fn test_evaluate_no_band_gives_zero() {
        let conditions = vec![band_condition("8K - 12K TM", 0.015)];
        let outcome = WeightBandEngine::evaluate(&conditions, &[tx(1, 100.0)]).unwrap();
        assert_eq!(outcome.percentage_won, 0.0);
        assert!(outcome.selected.is_none());
    }

    #[test]
    fn test_evaluate_missing_band_text() {
        let mut condition = band_condition("8K - 12K TM", 0.015);
        condition.band_text = None;
        assert!(matches!(
            WeightBandEngine::evaluate(&[condition], &[tx(1, 100.0)]),
            Err(EngineError::MissingField { .. })
        ));
    }
}
