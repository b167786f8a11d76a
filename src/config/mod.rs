// ==========================================
// 节点折扣结算引擎 - 配置层
// ==========================================
// 职责: 引擎业务常量,支持 JSON 覆写
// ==========================================

pub mod engine_config;

// 重导出核心配置
pub use engine_config::{ConfigError, EngineConfig};
