// ==========================================
// 成本分解表校验 - API 层错误类型
// ==========================================
// 职责: 定义 API 层错误类型，转换导入层错误为用户可读的错误消息
// 红线: 单元格/区段异常不是错误（已体现在判定结果中）
//       只有品牌级（参考数据缺失）与调用级错误在此出现
// ==========================================

use crate::importer::error::ImportError;
use thiserror::Error;

/// API 层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 品牌错误
    // ==========================================
    #[error("未知品牌: {0}")]
    UnknownBrand(String),

    /// 参考数据缺失，整个品牌不可用（初始化时已记录）
    #[error("品牌不可用: {brand}（{reason}）")]
    BrandUnavailable { brand: String, reason: String },

    // ==========================================
    // 输入错误
    // ==========================================
    #[error("无效输入: {0}")]
    InvalidInput(String),

    // ==========================================
    // 导入 / 配置错误
    // ==========================================
    #[error("导入失败: {0}")]
    ImportError(String),

    #[error("配置错误: {0}")]
    ConfigError(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ==========================================
// 从 ImportError 转换
// ==========================================
impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        match err {
            ImportError::MissingReferenceData { brand, reason } => {
                ApiError::BrandUnavailable { brand, reason }
            }
            ImportError::ConfigReadError { .. } | ImportError::ConfigValueError { .. } => {
                ApiError::ConfigError(err.to_string())
            }
            ImportError::RuleConfigError { .. } => ApiError::ConfigError(err.to_string()),
            ImportError::InternalError(msg) => ApiError::InternalError(msg),
            ImportError::Other(err) => ApiError::Other(err),
            other => ApiError::ImportError(other.to_string()),
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
