// ==========================================
// 节点折扣结算引擎 - 汇总表聚合
// ==========================================
// 职责: 将贡献明细归约为 "Resumen" 汇总表
// 布局:
//   Rebate      : Mes Resumen | Toneladas | Dólares | Importe NC (按月)
//   区间规则    : Mes Resumen | Toneladas | Dólares + 派生行
//   物流 CR/河运: DESTINATARIO | TMS | USD | APORTE (按收货方)
//   商业认定    : MES | CLIENTE | TMS | USD | APORTE (按月 + 收货方)
//   Sell-Out    : CLIENTE | Cantidad sacos | Toneladas | APORTE 各基准列 (按客户)
// 红线: 总计行 = 明细贡献合计
// ==========================================

use crate::config::EngineConfig;
use crate::domain::sheet::{ContributionResult, SellOutPivot, SummaryRow, SummaryRowKind, SummarySheet};
use crate::domain::types::{month_name, ApplicationBasis};
use crate::engine::strategy::{Computation, SettlementStrategy};
use crate::engine::weight_band::WeightBandOutcome;
use std::collections::BTreeMap;

pub const SUMMARY_SHEET_NAME: &str = "Resumen";
pub const TOTAL_LABEL: &str = "Total";

pub struct SummaryAggregator;

impl SummaryAggregator {
    /// 按策略生成汇总表
    pub fn summarize(
        strategy: &SettlementStrategy,
        computation: &Computation,
        config: &EngineConfig,
    ) -> SummarySheet {
        match (strategy, computation) {
            (_, Computation::WeightBand { rows, outcome }) => {
                Self::weight_band(rows, outcome, config.weight_band_base_tonnage)
            }
            (_, Computation::SellOut { rows, pivot }) => Self::sell_out(rows, pivot),
            (SettlementStrategy::LogisticsCr | SettlementStrategy::LogisticsFluvial, c) => {
                Self::logistics(c.rows())
            }
            (SettlementStrategy::CommercialRecognition(_), c) => Self::commercial(c.rows()),
            (_, c) => Self::rebate(c.rows()),
        }
    }

    /// Rebate: 按月
    pub fn rebate(rows: &[ContributionResult]) -> SummarySheet {
        let groups = group_by(rows, |r| r.transaction.month, |r| {
            vec![r.transaction.weight, r.transaction.net_value, r.contribution()]
        });
        build(
            vec!["Mes Resumen"],
            vec!["Toneladas", "Dólares", "Importe NC"],
            groups.into_iter().map(|(m, v)| (vec![month_name(m)], v)).collect(),
        )
    }

    /// 区间规则: 按月 + 月均 / 基础吨位 / 超额吨位 / 达成百分比
    pub fn weight_band(
        rows: &[ContributionResult],
        outcome: &WeightBandOutcome,
        base_tonnage: f64,
    ) -> SummarySheet {
        let groups = group_by(rows, |r| r.transaction.month, |r| {
            vec![r.transaction.weight, r.transaction.net_value]
        });

        let mut sheet_rows: Vec<SummaryRow> = groups
            .into_iter()
            .map(|(m, values)| SummaryRow {
                kind: SummaryRowKind::Group,
                keys: vec![month_name(m)],
                values: values.into_iter().map(Some).collect(),
            })
            .collect();

        let derived = |label: &str, weight: f64, usd: Option<f64>| SummaryRow {
            kind: SummaryRowKind::Derived,
            keys: vec![label.to_string()],
            values: vec![Some(weight), usd],
        };
        sheet_rows.push(derived(
            "Promedio VN",
            outcome.mean_weight,
            Some(outcome.mean_net_value),
        ));
        sheet_rows.push(derived("Base", base_tonnage, None));
        sheet_rows.push(derived(
            "Tm excedentes",
            outcome.mean_weight - base_tonnage,
            None,
        ));
        sheet_rows.push(derived("%_Ganado", outcome.percentage_won, None));

        SummarySheet {
            name: SUMMARY_SHEET_NAME.to_string(),
            key_headers: vec!["Mes Resumen".to_string()],
            value_headers: vec!["Toneladas".to_string(), "Dólares".to_string()],
            rows: sheet_rows,
        }
    }

    /// 物流: 按收货方
    pub fn logistics(rows: &[ContributionResult]) -> SummarySheet {
        let groups = group_by(rows, |r| r.transaction.recipient_name.clone(), |r| {
            vec![r.transaction.weight, r.transaction.net_value, r.contribution()]
        });
        build(
            vec!["DESTINATARIO"],
            vec!["TMS", "USD", "APORTE"],
            groups.into_iter().map(|(k, v)| (vec![k], v)).collect(),
        )
    }

    /// 商业认定: 按 (月, 收货方)
    pub fn commercial(rows: &[ContributionResult]) -> SummarySheet {
        let groups = group_by(
            rows,
            |r| (r.transaction.month, r.transaction.recipient_name.clone()),
            |r| vec![r.transaction.weight, r.transaction.net_value, r.contribution()],
        );
        build(
            vec!["MES", "CLIENTE"],
            vec!["TMS", "USD", "APORTE"],
            groups
                .into_iter()
                .map(|((m, recipient), v)| (vec![month_name(m), recipient], v))
                .collect(),
        )
    }

    /// Sell-Out: 按客户,每个出现的基准一列贡献
    pub fn sell_out(rows: &[ContributionResult], pivot: &SellOutPivot) -> SummarySheet {
        let has_base = pivot.has(ApplicationBasis::BasePrice);
        let has_net = pivot.bases.iter().any(|b| *b != ApplicationBasis::BasePrice);

        let mut headers = vec!["Cantidad sacos", "Toneladas"];
        if has_base {
            headers.push("APORTE Bonif. P.Base");
        }
        if has_net {
            headers.push("APORTE Bonif. P.Neto");
        }

        let groups = group_by(rows, |r| r.transaction.client_name.clone(), |r| {
            let mut values = vec![r.transaction.billed_quantity, r.transaction.weight];
            if has_base {
                values.push(r.base_price_contribution.unwrap_or(0.0));
            }
            if has_net {
                values.push(r.net_value_contribution.unwrap_or(0.0));
            }
            values
        });

        build(
            vec!["CLIENTE"],
            headers,
            groups.into_iter().map(|(k, v)| (vec![k], v)).collect(),
        )
    }
}

/// 按键分组求和(键有序)
fn group_by<K, FK, FV>(rows: &[ContributionResult], key: FK, values: FV) -> BTreeMap<K, Vec<f64>>
where
    K: Ord,
    FK: Fn(&ContributionResult) -> K,
    FV: Fn(&ContributionResult) -> Vec<f64>,
{
    let mut groups: BTreeMap<K, Vec<f64>> = BTreeMap::new();
    for r in rows {
        let row_values = values(r);
        let sums = groups
            .entry(key(r))
            .or_insert_with(|| vec![0.0; row_values.len()]);
        for (sum, v) in sums.iter_mut().zip(row_values) {
            *sum += v;
        }
    }
    groups
}

/// 分组行 + 总计行
fn build(
    key_headers: Vec<&str>,
    value_headers: Vec<&str>,
    groups: Vec<(Vec<String>, Vec<f64>)>,
) -> SummarySheet {
    let mut totals = vec![0.0; value_headers.len()];
    let mut rows: Vec<SummaryRow> = Vec::with_capacity(groups.len() + 1);

    for (keys, values) in groups {
        for (t, v) in totals.iter_mut().zip(&values) {
            *t += v;
        }
        rows.push(SummaryRow {
            kind: SummaryRowKind::Group,
            keys,
            values: values.into_iter().map(Some).collect(),
        });
    }

    let mut total_keys = vec![String::new(); key_headers.len()];
    if let Some(first) = total_keys.first_mut() {
        *first = TOTAL_LABEL.to_string();
    }
    rows.push(SummaryRow {
        kind: SummaryRowKind::Total,
        keys: total_keys,
        values: totals.into_iter().map(Some).collect(),
    });

    SummarySheet {
        name: SUMMARY_SHEET_NAME.to_string(),
        key_headers: key_headers.into_iter().map(String::from).collect(),
        value_headers: value_headers.into_iter().map(String::from).collect(),
        rows,
    }
}
