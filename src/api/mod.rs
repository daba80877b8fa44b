// ==========================================
// 成本分解表校验 - API 层
// ==========================================
// 职责: 对外入口（品牌列表、批次校验）
// ==========================================

pub mod error;
pub mod validation_api;

pub use error::{ApiError, ApiResult};
pub use validation_api::ValidationApi;
