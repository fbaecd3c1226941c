// ==========================================
// 机队维修排程系统 - 导入层
// ==========================================
// 职责: 外部 CSV 快照导入（机队 / 备件库存）
// ==========================================

pub mod error;
pub mod file_parser;
pub mod fleet_importer;

pub use error::{ImportError, ImportResult};
pub use file_parser::{CsvParser, FileParser, RawRecord};
pub use fleet_importer::{FleetImporter, ImportSummary};
