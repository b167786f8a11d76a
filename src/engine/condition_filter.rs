// ==========================================
// 节点折扣结算引擎 - 条件目录过滤
// ==========================================
// 职责: 按 结算方向 + 节点 + 折扣类型 精确过滤条件目录
// 说明: 空结果不是错误,交由下游判定
// ==========================================

use crate::domain::condition::ConditionRecord;
use crate::domain::types::{DiscountType, Liquidation};
use tracing::debug;

pub struct ConditionFilter;

impl ConditionFilter {
    /// 过滤条件目录(等值匹配,返回新集合)
    pub fn filter(
        catalog: &[ConditionRecord],
        liquidation: Liquidation,
        node: &str,
        discount_type: DiscountType,
    ) -> Vec<ConditionRecord> {
        let filtered: Vec<ConditionRecord> = catalog
            .iter()
            .filter(|c| {
                c.liquidation == liquidation
                    && c.node_name == node
                    && c.discount_type == discount_type
            })
            .cloned()
            .collect();

        debug!(
            catalog_rows = catalog.len(),
            filtered_rows = filtered.len(),
            node,
            discount_type = %discount_type,
            "条件目录过滤完成"
        );
        filtered
    }

    /// Sell-Out: 节点名称 → 节点编码(取过滤后子集中的第一条)
    pub fn node_code(conditions: &[ConditionRecord]) -> Option<&str> {
        conditions.first().map(|c| c.node_code.as_str())
    }
}
