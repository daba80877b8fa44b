// ==========================================
// 成本分解表校验 - 导入层错误类型
// ==========================================
// 工具: thiserror 派生宏
// 范围: 文件读取 / 表格解析 / 参考数据 / 规则与配置
// ==========================================

use thiserror::Error;

/// 导入层错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 文件相关错误 =====
    #[error("文件不存在: {0}")]
    FileNotFound(String),

    #[error("文件格式不支持: {0}（仅支持 .xlsx/.xlsm/.xls/.xlsb/.ods/.csv）")]
    UnsupportedFormat(String),

    #[error("文件读取失败: {0}")]
    FileReadError(String),

    #[error("文件过大: {file} ({size} 字节，上限 {limit} 字节)")]
    FileTooLarge { file: String, size: u64, limit: u64 },

    #[error("Excel 解析失败: {0}")]
    ExcelParseError(String),

    #[error("CSV 解析失败: {0}")]
    CsvParseError(String),

    #[error("工作簿没有任何工作表: {0}")]
    EmptyWorkbook(String),

    // ===== 参考数据错误 =====
    #[error("品牌 {brand} 参考数据缺失: {reason}")]
    MissingReferenceData { brand: String, reason: String },

    #[error("参考数据格式错误 ({source_name}, 行 {row}): {message}")]
    ReferenceDataFormat {
        source_name: String,
        row: usize,
        message: String,
    },

    // ===== 规则表错误 =====
    #[error("列字母无效: {0}")]
    InvalidColumn(String),

    #[error("单元格地址无效: {0}")]
    InvalidCellAddress(String),

    #[error("规则表配置错误 ({brand}): {message}")]
    RuleConfigError { brand: String, message: String },

    // ===== 配置错误 =====
    #[error("配置读取失败 (key: {key}): {message}")]
    ConfigReadError { key: String, message: String },

    #[error("配置值格式错误 (key: {key}, value: {value}): {message}")]
    ConfigValueError {
        key: String,
        value: String,
        message: String,
    },

    // ===== 通用错误 =====
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// 实现 From<std::io::Error>
impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => ImportError::FileNotFound(err.to_string()),
            _ => ImportError::FileReadError(err.to_string()),
        }
    }
}

// 实现 From<csv::Error>
impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::CsvParseError(err.to_string())
    }
}

// 实现 From<calamine::Error>
impl From<calamine::Error> for ImportError {
    fn from(err: calamine::Error) -> Self {
        ImportError::ExcelParseError(err.to_string())
    }
}

// 实现 From<serde_json::Error>
impl From<serde_json::Error> for ImportError {
    fn from(err: serde_json::Error) -> Self {
        ImportError::InternalError(format!("JSON 序列化失败: {}", err))
    }
}

impl ImportError {
    /// 是否为单文件级错误（批次中只影响该文件）
    pub fn is_file_level(&self) -> bool {
        matches!(
            self,
            ImportError::FileNotFound(_)
                | ImportError::UnsupportedFormat(_)
                | ImportError::FileReadError(_)
                | ImportError::FileTooLarge { .. }
                | ImportError::ExcelParseError(_)
                | ImportError::CsvParseError(_)
                | ImportError::EmptyWorkbook(_)
        )
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;
