// ==========================================
// 节点折扣结算引擎 - Sell-Out 计算器
// ==========================================
// 步骤:
//   1. 展开条件透视为 (client, stage, family, product) × 基准列
//   2. 终端销售 ⨝ 价格主数据 (node_code, product_code)
//   3. ⨝ 透视表 (client, stage, family, product)
//   4. 每个出现的基准列: APORTE = PVP × 数量 × 奖励 × (P.Base 为 1, 否则 Dto. Factura)
// 红线: 缺价格的交易排除并告警,不以 0 价格参与结算
// ==========================================

use super::bonus_rate;
use crate::domain::condition::ExpandedConditionRecord;
use crate::domain::sheet::{ContributionResult, SellOutPivot, SellOutPivotRow};
use crate::domain::transaction::{PriceRecord, TransactionRecord};
use crate::domain::types::{ApplicationBasis, ValidatorField};
use crate::engine::basis_resolver::BasisResolver;
use crate::engine::error::EngineResult;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, warn};

type PivotKey = (String, String, String, String);

/// Sell-Out 计算结果: 明细行 + 供渲染层使用的透视表
#[derive(Debug, Clone, PartialEq)]
pub struct SellOutComputation {
    pub pivot: SellOutPivot,
    pub rows: Vec<ContributionResult>,
}

pub struct SellOutCalculator;

impl SellOutCalculator {
    /// 透视展开后的条件(同键同基准的奖励值求和,缺失填 0)
    pub fn build_pivot(expanded: &[ExpandedConditionRecord]) -> EngineResult<SellOutPivot> {
        let conditions: Vec<_> = expanded.iter().map(|e| e.condition.clone()).collect();
        let bases = BasisResolver::present_bases(&conditions);

        let mut grouped: BTreeMap<PivotKey, (f64, f64)> = BTreeMap::new();
        for e in expanded {
            let key = match (
                e.key(ValidatorField::Client),
                e.key(ValidatorField::Stage),
                e.key(ValidatorField::Family),
                e.key(ValidatorField::Product),
            ) {
                (Some(c), Some(s), Some(f), Some(p)) => {
                    (c.to_string(), s.to_string(), f.to_string(), p.to_string())
                }
                _ => continue,
            };
            let rate = bonus_rate(&e.condition)?;
            let entry = grouped.entry(key).or_insert((0.0, 0.0));
            match ApplicationBasis::from_label(&e.condition.basis_label) {
                ApplicationBasis::BasePrice => entry.0 += rate,
                _ => entry.1 += rate,
            }
        }

        let rows = grouped
            .into_iter()
            .map(|((client, stage, family, product), (base, net))| SellOutPivotRow {
                client,
                stage,
                family,
                product,
                base_price_bonus: base,
                net_value_bonus: net,
            })
            .collect();

        Ok(SellOutPivot { bases, rows })
    }

    pub fn compute(
        transactions: &[TransactionRecord],
        expanded: &[ExpandedConditionRecord],
        prices: &[PriceRecord],
    ) -> EngineResult<SellOutComputation> {
        let pivot = Self::build_pivot(expanded)?;
        let has_base = pivot.has(ApplicationBasis::BasePrice);
        let has_net = pivot.bases.iter().any(|b| *b != ApplicationBasis::BasePrice);

        let mut price_index: HashMap<(&str, &str), &PriceRecord> = HashMap::new();
        for price in prices {
            price_index
                .entry((price.node_code.as_str(), price.product_code.as_str()))
                .or_insert(price);
        }

        let pivot_index: HashMap<(&str, &str, &str, &str), &SellOutPivotRow> = pivot
            .rows
            .iter()
            .map(|r| {
                (
                    (r.client.as_str(), r.stage.as_str(), r.family.as_str(), r.product.as_str()),
                    r,
                )
            })
            .collect();

        let mut missing_price = 0usize;
        let mut rows = Vec::new();
        for tx in transactions {
            let key = (
                tx.client_code.as_str(),
                tx.stage.as_str(),
                tx.family.as_str(),
                tx.product_code.as_str(),
            );
            let Some(bonus) = pivot_index.get(&key) else {
                continue;
            };
            let Some(price) = price_index.get(&(tx.node_code.as_str(), tx.product_code.as_str()))
            else {
                missing_price += 1;
                continue;
            };

            let gross = price.list_price * tx.billed_quantity;
            let base_contribution = has_base.then(|| gross * bonus.base_price_bonus);
            let net_contribution =
                has_net.then(|| gross * bonus.net_value_bonus * price.invoice_discount_pct);

            let mut row = ContributionResult::from_transaction(tx);
            row.unit_price = Some(price.list_price);
            row.invoice_discount = Some(price.invoice_discount_pct);
            row.base_price_bonus = has_base.then_some(bonus.base_price_bonus);
            row.net_value_bonus = has_net.then_some(bonus.net_value_bonus);
            row.base_price_contribution = base_contribution;
            row.net_value_contribution = net_contribution;
            row.contribution_amount =
                Some(base_contribution.unwrap_or(0.0) + net_contribution.unwrap_or(0.0));
            rows.push(row);
        }

        if missing_price > 0 {
            warn!(missing_price, "终端销售缺少价格主数据, 已排除");
        }
        debug!(
            pivot_rows = pivot.rows.len(),
            joined = rows.len(),
            "Sell-Out 关联完成"
        );

        Ok(SellOutComputation { pivot, rows })
    }
}
