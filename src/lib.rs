// ==========================================
// 买方成本分解表校验 - 核心库
// ==========================================
// 技术栈: Rust + calamine + csv + tokio
// 系统定位: 规则表驱动的表格校验（品牌之间只有数据差异）
// 流程: 文件字节 → Workbook → 区段定位 → 归一化 + 判定 → 结构化结果
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "en");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 单元格、网格、规则表、结果
pub mod domain;

// 引擎层 - 定位、归一化、判定、编排
pub mod engine;

// 导入层 - 文件读取、表格解析、参考数据
pub mod importer;

// 配置层 - 系统配置、自定义规则表
pub mod config;

// 品牌规则表
pub mod brands;

// API 层 - 批次校验入口
pub mod api;

// 结果报表
pub mod report;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::{
    BatchReport, Cell, CellAddress, ColumnRef, FieldResult, FileOutcome, Grid, RuleSet,
    SectionResult, ValidationRun, Verdict, Workbook,
};

// 引擎
pub use engine::{RuleEvaluator, SectionLocator, ValidationRunner, ValueNormalizer};

// 导入
pub use importer::{ImportError, UploadedFile};

// 品牌
pub use brands::{BrandRegistry, BuiltinBrand};

// API
pub use api::{ApiError, ValidationApi};

// 配置
pub use config::ConfigManager;

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "BCBD Validator";
