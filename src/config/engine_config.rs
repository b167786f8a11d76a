// ==========================================
// 节点折扣结算引擎 - 引擎配置
// ==========================================
// 职责: 业务常量(通配标记 / 自提标记 / 区间规则节点 / 单价除数 ...)
// 说明: 所有字段可缺省,缺省值与现行业务口径一致
// ==========================================

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// 配置错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置文件读取失败 ({path}): {message}")]
    ReadError { path: String, message: String },

    #[error("配置格式错误: {0}")]
    ParseError(String),

    #[error("配置值无效 (key: {key}): {message}")]
    InvalidValue { key: String, message: String },
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// 视为通配的校验值
    #[serde(default = "default_wildcard_markers")]
    pub wildcard_markers: Vec<String>,

    /// 物流 CR: 订单参考需包含的自提标记
    #[serde(default = "default_pickup_marker")]
    pub pickup_marker: String,

    /// 使用重量区间规则的节点
    #[serde(default = "default_weight_band_node")]
    pub weight_band_node: String,

    /// 区间规则基础吨位
    #[serde(default = "default_weight_band_base_tonnage")]
    pub weight_band_base_tonnage: f64,

    /// Sell-In 参与结算的发票类型
    #[serde(default = "default_sell_in_invoice_classes")]
    pub sell_in_invoice_classes: Vec<String>,

    /// 单价除数(每吨袋数)
    #[serde(default = "default_unit_price_divisor")]
    pub unit_price_divisor: f64,

    /// 使用特殊除数的产品系列
    #[serde(default = "default_special_family")]
    pub special_family: String,

    #[serde(default = "default_special_family_divisor")]
    pub special_family_divisor: f64,
}

fn default_wildcard_markers() -> Vec<String> {
    vec!["All".to_string(), "Todo".to_string()]
}

fn default_pickup_marker() -> String {
    "RECOGE".to_string()
}

fn default_weight_band_node() -> String {
    "D. COPACIGULF".to_string()
}

fn default_weight_band_base_tonnage() -> f64 {
    8000.0
}

fn default_sell_in_invoice_classes() -> Vec<String> {
    vec!["ZF01".to_string(), "ZNC7".to_string()]
}

fn default_unit_price_divisor() -> f64 {
    40.0
}

fn default_special_family() -> String {
    "Nicovita Origin".to_string()
}

fn default_special_family_divisor() -> f64 {
    100.0
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            wildcard_markers: default_wildcard_markers(),
            pickup_marker: default_pickup_marker(),
            weight_band_node: default_weight_band_node(),
            weight_band_base_tonnage: default_weight_band_base_tonnage(),
            sell_in_invoice_classes: default_sell_in_invoice_classes(),
            unit_price_divisor: default_unit_price_divisor(),
            special_family: default_special_family(),
            special_family_divisor: default_special_family_divisor(),
        }
    }
}

impl EngineConfig {
    /// 从 JSON 字符串加载(缺省字段取默认值)
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// 从 JSON 文件加载
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_json_str(&raw)
    }

    /// 除数必须为正,否则单价无意义
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.unit_price_divisor <= 0.0 {
            return Err(ConfigError::InvalidValue {
                key: "unit_price_divisor".to_string(),
                message: format!("必须大于 0, 实际 {}", self.unit_price_divisor),
            });
        }
        if self.special_family_divisor <= 0.0 {
            return Err(ConfigError::InvalidValue {
                key: "special_family_divisor".to_string(),
                message: format!("必须大于 0, 实际 {}", self.special_family_divisor),
            });
        }
        if self.wildcard_markers.is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "wildcard_markers".to_string(),
                message: "至少需要一个通配标记".to_string(),
            });
        }
        Ok(())
    }

    /// 单价除数: 特殊系列使用专用除数
    pub fn divisor_for_family(&self, family: &str) -> f64 {
        if family == self.special_family {
            self.special_family_divisor
        } else {
            self.unit_price_divisor
        }
    }

    pub fn is_weight_band_node(&self, node: &str) -> bool {
        node == self.weight_band_node
    }
}
