// ==========================================
// 节点折扣结算引擎 - 认定周期月份窗口
// ==========================================
// 规则: 以所选月份为终点,向前取周期长度个月(不跨年)
// 示例: 3 月 + 季度 → [1, 2, 3]; 1 月 + 季度 → [1]
// ==========================================

use crate::domain::condition::ConditionRecord;
use crate::domain::types::RecognitionPeriod;
use crate::engine::error::{EngineError, EngineResult};
use tracing::warn;

/// 计算月份窗口
pub fn month_window(period: RecognitionPeriod, selected_month: u32) -> EngineResult<Vec<u32>> {
    if !(1..=12).contains(&selected_month) {
        return Err(EngineError::InvalidRequest(format!(
            "月份超出范围: {}",
            selected_month
        )));
    }
    let first = selected_month.saturating_sub(period.months() - 1).max(1);
    Ok((first..=selected_month).collect())
}

/// 从条件子集读取认定周期
///
/// 标签不一致时取第一条并记录告警
pub fn resolve_period(conditions: &[ConditionRecord]) -> Option<RecognitionPeriod> {
    let first = conditions.first()?.period;
    if conditions.iter().any(|c| c.period != first) {
        warn!(
            period = %first,
            "条件子集认定周期不一致, 采用第一条"
        );
    }
    Some(first)
}

/// 月度明细表名: "Base MM.YYYY"
pub fn month_sheet_name(month: u32, year: i32) -> String {
    format!("Base {:02}.{}", month, year)
}
