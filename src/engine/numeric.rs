// ==========================================
// 节点折扣结算引擎 - 数值工具
// ==========================================
// 职责: 截断 / 四舍五入 / 安全除法
// 红线: 截断不得用四舍五入代替(与目录声明精度对账)
// ==========================================

/// 乘以 10^decimals 后距整数小于该值时视为整数,吸收二进制浮点误差
const SCALE_EPSILON: f64 = 1e-9;

/// 向零截断到 `decimals` 位小数
///
/// # 示例
/// ```
/// use settlement_engine::engine::numeric::trunc;
/// assert_eq!(trunc(10.8049, 3), 10.804);
/// assert_eq!(trunc(-1.2345, 2), -1.23);
/// ```
pub fn trunc(value: f64, decimals: u32) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let factor = 10_f64.powi(decimals as i32);
    let scaled = value * factor;
    let nearest = scaled.round();
    let truncated = if (scaled - nearest).abs() < SCALE_EPSILON {
        nearest
    } else {
        scaled.trunc()
    };
    truncated / factor
}

/// 四舍五入到 `decimals` 位小数
pub fn round_to(value: f64, decimals: u32) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let factor = 10_f64.powi(decimals as i32);
    (value * factor).round() / factor
}

/// 安全除法: 分母为 0 时返回 0
pub fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}
