// ==========================================
// 节点折扣结算引擎 - 领域类型定义
// ==========================================
// 职责: 结算方向 / 折扣类型 / 认定周期 / 计算基准 / 校验字段
// 约定: 目录与台账中的业务标签(西语)在此统一解析为枚举
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 结算方向 (Liquidation Direction)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Liquidation {
    SellIn,  // 工厂 → 分销商
    SellOut, // 分销商 → 终端客户
}

impl Liquidation {
    /// 从目录标签解析 ("Sell In" / "Sell Out")
    pub fn from_label(label: &str) -> Option<Self> {
        let normalized: String = label
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '-' && *c != '_')
            .collect::<String>()
            .to_uppercase();
        match normalized.as_str() {
            "SELLIN" | "SI" => Some(Liquidation::SellIn),
            "SELLOUT" | "SO" => Some(Liquidation::SellOut),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Liquidation::SellIn => "Sell In",
            Liquidation::SellOut => "Sell Out",
        }
    }
}

impl fmt::Display for Liquidation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

// ==========================================
// 折扣类型 (Discount Type)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiscountType {
    Rebate,
    LogisticsCr,
    LogisticsFluvial,
    CommercialRecognition,
    Other,
}

impl DiscountType {
    /// 从目录标签解析,未知标签归为 Other
    pub fn from_label(label: &str) -> Self {
        match label.trim() {
            "Rebate" => DiscountType::Rebate,
            "Logístico CR" | "Logistico CR" => DiscountType::LogisticsCr,
            "Logístico Fluvial" | "Logistico Fluvial" => DiscountType::LogisticsFluvial,
            "Reconocimiento Comercial" => DiscountType::CommercialRecognition,
            _ => DiscountType::Other,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DiscountType::Rebate => "Rebate",
            DiscountType::LogisticsCr => "Logístico CR",
            DiscountType::LogisticsFluvial => "Logístico Fluvial",
            DiscountType::CommercialRecognition => "Reconocimiento Comercial",
            DiscountType::Other => "Otro",
        }
    }

    /// 物流类折扣: 明细只输出所选月份
    pub fn is_logistics(&self) -> bool {
        matches!(self, DiscountType::LogisticsCr | DiscountType::LogisticsFluvial)
    }
}

impl fmt::Display for DiscountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

// ==========================================
// 认定周期 (Recognition Period)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecognitionPeriod {
    Monthly,
    Bimonthly,
    Quarterly,
}

impl RecognitionPeriod {
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim() {
            "Mensual" => Some(RecognitionPeriod::Monthly),
            "Bimensual" => Some(RecognitionPeriod::Bimonthly),
            "Trimestral" => Some(RecognitionPeriod::Quarterly),
            _ => None,
        }
    }

    /// 周期覆盖的月份数
    pub fn months(&self) -> u32 {
        match self {
            RecognitionPeriod::Monthly => 1,
            RecognitionPeriod::Bimonthly => 2,
            RecognitionPeriod::Quarterly => 3,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RecognitionPeriod::Monthly => "Mensual",
            RecognitionPeriod::Bimonthly => "Bimensual",
            RecognitionPeriod::Quarterly => "Trimestral",
        }
    }
}

impl fmt::Display for RecognitionPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

// ==========================================
// 计算基准 (Application Basis)
// ==========================================
// 映射: "Tonelada" → Weight, "Precio Base" → BasePrice, 其他 → NetValue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApplicationBasis {
    Weight,
    BasePrice,
    NetValue,
}

impl ApplicationBasis {
    pub fn from_label(label: &str) -> Self {
        match label.trim() {
            "Tonelada" => ApplicationBasis::Weight,
            "Precio Base" => ApplicationBasis::BasePrice,
            _ => ApplicationBasis::NetValue,
        }
    }

    /// Sell-Out 透视表中的奖励列名
    pub fn pivot_column(&self) -> &'static str {
        match self {
            ApplicationBasis::BasePrice => "Bonif. P.Base",
            _ => "Bonif. P.Neto",
        }
    }
}

impl fmt::Display for ApplicationBasis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApplicationBasis::Weight => write!(f, "WEIGHT"),
            ApplicationBasis::BasePrice => write!(f, "BASE_PRICE"),
            ApplicationBasis::NetValue => write!(f, "NET_VALUE"),
        }
    }
}

// ==========================================
// 校验字段 (Validator Field)
// ==========================================
// 红线: 展开顺序固定 client → recipient → stage → family → product
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidatorField {
    Client,
    Recipient,
    Stage,
    Family,
    Product,
}

impl ValidatorField {
    /// Sell-In 展开顺序
    pub const SELL_IN_ORDER: [ValidatorField; 5] = [
        ValidatorField::Client,
        ValidatorField::Recipient,
        ValidatorField::Stage,
        ValidatorField::Family,
        ValidatorField::Product,
    ];

    /// Sell-Out 展开顺序(台账无收货方维度)
    pub const SELL_OUT_ORDER: [ValidatorField; 4] = [
        ValidatorField::Client,
        ValidatorField::Stage,
        ValidatorField::Family,
        ValidatorField::Product,
    ];

    pub fn column(&self) -> &'static str {
        match self {
            ValidatorField::Client => "COD_ZDES",
            ValidatorField::Recipient => "COD_ZDEM",
            ValidatorField::Stage => "ETAPA",
            ValidatorField::Family => "FAMILIA",
            ValidatorField::Product => "COD_PRODUCTO",
        }
    }
}

impl fmt::Display for ValidatorField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.column())
    }
}

// ==========================================
// 西语月份名称 (汇总表使用)
// ==========================================
pub const MONTH_NAMES: [&str; 12] = [
    "Enero",
    "Febrero",
    "Marzo",
    "Abril",
    "Mayo",
    "Junio",
    "Julio",
    "Agosto",
    "Septiembre",
    "Octubre",
    "Noviembre",
    "Diciembre",
];

/// 月份编号 → 西语月份名称,越界时返回编号本身
pub fn month_name(month: u32) -> String {
    MONTH_NAMES
        .get((month as usize).wrapping_sub(1))
        .map(|name| name.to_string())
        .unwrap_or_else(|| month.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_liquidation_labels() {
        assert_eq!(Liquidation::from_label("Sell In"), Some(Liquidation::SellIn));
        assert_eq!(Liquidation::from_label("Sell Out"), Some(Liquidation::SellOut));
        assert_eq!(Liquidation::from_label("sell-out"), Some(Liquidation::SellOut));
        assert_eq!(Liquidation::from_label("otro"), None);
    }

    #[test]
    fn test_discount_type_labels() {
        assert_eq!(DiscountType::from_label("Logístico CR"), DiscountType::LogisticsCr);
        assert_eq!(
            DiscountType::from_label("Reconocimiento Comercial"),
            DiscountType::CommercialRecognition
        );
        assert_eq!(DiscountType::from_label("Desconocido"), DiscountType::Other);
        assert!(DiscountType::LogisticsFluvial.is_logistics());
        assert!(!DiscountType::Rebate.is_logistics());
    }

    #[test]
    fn test_basis_labels() {
        assert_eq!(ApplicationBasis::from_label("Tonelada"), ApplicationBasis::Weight);
        assert_eq!(ApplicationBasis::from_label("Precio Base"), ApplicationBasis::BasePrice);
        assert_eq!(ApplicationBasis::from_label("Valor Neto"), ApplicationBasis::NetValue);
        assert_eq!(ApplicationBasis::from_label("Precio Neto"), ApplicationBasis::NetValue);
    }

    #[test]
    fn test_month_name() {
        assert_eq!(month_name(1), "Enero");
        assert_eq!(month_name(12), "Diciembre");
        assert_eq!(month_name(13), "13");
        assert_eq!(month_name(0), "0");
    }
}
