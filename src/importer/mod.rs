// ==========================================
// 节点折扣结算引擎 - 导入层
// ==========================================
// 职责: 已清洗表格 (CSV / XLSX) → 输入快照
// 红线: 不做清洗与业务校验; 引擎只接收快照
// ==========================================

pub mod error;
pub mod file_parser;
pub mod snapshot_loader;

// 重导出核心类型
pub use error::{ImportError, ImportResult};
pub use file_parser::{CsvParser, ExcelParser, FileParser, RawRecord, UniversalFileParser};
pub use snapshot_loader::SnapshotLoader;
