// ==========================================
// 节点折扣结算引擎 - 交易台账过滤
// ==========================================
// 职责: 按节点 / 年 / 月份窗口截取参与结算的交易
// Sell-In: 节点名称 + 发票类型白名单
// Sell-Out: 节点编码 + 产品系列归一化为三字母代码
// ==========================================

use crate::domain::condition::{ConditionRecord, ValidatorValue};
use crate::domain::transaction::TransactionRecord;
use tracing::debug;

pub struct TransactionFilter;

impl TransactionFilter {
    /// Sell-In 销售台账过滤
    pub fn sell_in(
        sales: &[TransactionRecord],
        node: &str,
        year: i32,
        months: &[u32],
        invoice_classes: &[String],
    ) -> Vec<TransactionRecord> {
        let filtered: Vec<TransactionRecord> = sales
            .iter()
            .filter(|tx| {
                tx.node_name == node
                    && tx.year == year
                    && months.contains(&tx.month)
                    && invoice_classes.iter().any(|c| c == &tx.invoice_class)
            })
            .cloned()
            .collect();

        debug!(
            ledger_rows = sales.len(),
            filtered_rows = filtered.len(),
            ?months,
            "Sell-In 台账过滤完成"
        );
        filtered
    }

    /// Sell-Out 终端销售台账过滤(产品系列同时归一化)
    pub fn sell_out(
        sellout: &[TransactionRecord],
        node_code: &str,
        year: i32,
        months: &[u32],
    ) -> Vec<TransactionRecord> {
        let filtered: Vec<TransactionRecord> = sellout
            .iter()
            .filter(|tx| tx.node_code == node_code && tx.year == year && months.contains(&tx.month))
            .map(|tx| TransactionRecord {
                family: normalize_family(&tx.family),
                ..tx.clone()
            })
            .collect();

        debug!(
            ledger_rows = sellout.len(),
            filtered_rows = filtered.len(),
            ?months,
            "Sell-Out 台账过滤完成"
        );
        filtered
    }

    /// 物流 CR: 仅保留订单参考含自提标记的交易
    pub fn pickup_only(transactions: &[TransactionRecord], marker: &str) -> Vec<TransactionRecord> {
        transactions
            .iter()
            .filter(|tx| tx.order_reference.contains(marker))
            .cloned()
            .collect()
    }
}

/// 产品系列归一化: 取第二个词的前三个字母并大写; 只有一个词时取第一个词
///
/// "Nicovita Classic" → "CLA"
pub fn normalize_family(raw: &str) -> String {
    let mut words = raw.split_whitespace();
    let first = words.next().unwrap_or("");
    let word = words.next().unwrap_or(first);
    word.chars().take(3).collect::<String>().to_uppercase()
}

/// Sell-Out 条件目录的产品系列同样归一化,通配保持不变
pub fn normalize_condition_families(conditions: &[ConditionRecord]) -> Vec<ConditionRecord> {
    conditions
        .iter()
        .map(|c| match &c.family {
            ValidatorValue::Value(v) => ConditionRecord {
                family: ValidatorValue::Value(normalize_family(v)),
                ..c.clone()
            },
            ValidatorValue::Wildcard => c.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sale(node: &str, year: i32, month: u32, class: &str) -> TransactionRecord {
        TransactionRecord {
            year,
            month,
            node_name: node.to_string(),
            node_code: "10".to_string(),
            invoice_class: class.to_string(),
            family: "Nicovita Classic".to_string(),
            ..Default::default()
        }
    }

    fn classes() -> Vec<String> {
        vec!["ZF01".to_string(), "ZNC7".to_string()]
    }

    #[test]
    fn test_sell_in_filter() {
        let sales = vec![
            sale("NODO A", 2024, 3, "ZF01"),
            sale("NODO A", 2024, 3, "ZNC7"),
            sale("NODO A", 2024, 3, "ZF99"),
            sale("NODO A", 2023, 3, "ZF01"),
            sale("NODO A", 2024, 4, "ZF01"),
            sale("NODO B", 2024, 3, "ZF01"),
        ];
        let filtered = TransactionFilter::sell_in(&sales, "NODO A", 2024, &[2, 3], &classes());
        assert_eq!(filtered.len(), 2);
        // Sell-In 不归一化产品系列
        assert_eq!(filtered[0].family, "Nicovita Classic");
    }

    #[test]
    fn test_sell_out_filter_normalizes_family() {
        let sellout = vec![sale("X", 2024, 3, ""), sale("X", 2024, 5, "")];
        let filtered = TransactionFilter::sell_out(&sellout, "10", 2024, &[3]);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].family, "CLA");
        assert_eq!(sellout[0].family, "Nicovita Classic");
    }

    #[test]
    fn test_normalize_family() {
        assert_eq!(normalize_family("Nicovita Origin"), "ORI");
        assert_eq!(normalize_family("Salmofood"), "SAL");
        assert_eq!(normalize_family("  Nicovita   Ka "), "KA");
        assert_eq!(normalize_family(""), "");
    }

    #[test]
    fn test_pickup_only() {
        let mut a = sale("NODO A", 2024, 3, "ZF01");
        a.order_reference = "RECOGE PLANTA".to_string();
        let mut b = a.clone();
        b.order_reference = "ORD-123".to_string();
        let kept = TransactionFilter::pickup_only(&[a, b], "RECOGE");
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].order_reference, "RECOGE PLANTA");
    }
}
