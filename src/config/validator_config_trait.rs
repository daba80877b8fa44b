// ==========================================
// 成本分解表校验 - 校验配置读取 Trait
// ==========================================
// 职责: 定义校验流程所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use crate::importer::error::ImportResult;
use async_trait::async_trait;
use std::path::PathBuf;

// ==========================================
// ValidatorConfigReader Trait
// ==========================================
// 用途: 引擎精度、文件大小上限、参考数据/规则目录
// 实现者: ConfigManager
#[async_trait]
pub trait ValidatorConfigReader: Send + Sync {
    // ===== 比较精度 =====

    /// 数值规则默认小数位
    ///
    /// # 默认值
    /// - 2
    async fn get_default_decimals(&self) -> ImportResult<u32>;

    /// 百分比/区间规则默认小数位
    ///
    /// # 默认值
    /// - 3
    async fn get_percentage_decimals(&self) -> ImportResult<u32>;

    /// 内置品牌的轻微差异（恰好等于该差值时判 WARNING）
    ///
    /// # 默认值
    /// - 0.001
    async fn get_minor_difference_epsilon(&self) -> ImportResult<f64>;

    // ===== 文件 =====

    /// 上传文件大小上限（字节）
    ///
    /// # 默认值
    /// - 20 MiB
    async fn get_max_file_size_bytes(&self) -> ImportResult<u64>;

    /// 品牌参考数据 CSV 所在目录
    ///
    /// # 默认值
    /// - <系统配置目录>/bcbd-validator/reference
    async fn get_reference_dir(&self) -> ImportResult<PathBuf>;

    /// 自定义规则表 JSON 所在目录
    ///
    /// # 默认值
    /// - <系统配置目录>/bcbd-validator/rules
    async fn get_rules_dir(&self) -> ImportResult<PathBuf>;

    // ===== 报表 =====

    /// 报表语言
    ///
    /// # 默认值
    /// - en
    async fn get_locale(&self) -> ImportResult<String>;
}
