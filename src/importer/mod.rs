// ==========================================
// 企业定额匹配系统 - 导入层
// ==========================================
// 职责: 外部表格文件 → 可信的导入行
// 流程: 文件解析 → 字段映射/校验 → 行级失败收集
// ==========================================

pub mod error;
pub mod file_parser;
pub mod row_mapper;
pub mod sheet_importer;

// 重导出核心类型
pub use error::{ImportError, ImportResult};
pub use file_parser::{parse_rows, RawRow};
pub use sheet_importer::{ParsedSheet, RowFailure, SheetImporter, SheetImporterImpl};
