// ==========================================
// 成本分解表校验 - 导入层
// ==========================================
// 职责: 外部输入 → 领域数据
// 支持: 上传文件读取、表格解析（Excel/ODS/CSV）、品牌参考数据 CSV
// ==========================================

// 模块声明
pub mod error;
pub mod file_source;
pub mod importer_trait;
pub mod reference_loader;
pub mod workbook_parser;

// 重导出核心类型
pub use error::{ImportError, ImportResult};
pub use file_source::{file_extension, TokioFileSource, UploadedFile, DEFAULT_MAX_FILE_SIZE};
pub use reference_loader::{CsvReferenceLoader, ReferenceTable};
pub use workbook_parser::{CsvParser, ExcelParser, UniversalWorkbookParser, SPREADSHEET_EXTENSIONS};

// 重导出 Trait 接口
pub use importer_trait::{FileSource, ReferenceLoader, WorkbookParser};
