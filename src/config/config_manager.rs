// ==========================================
// 成本分解表校验 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、快照/恢复
// 存储: 内存 key-value，可从 JSON 对象文件加载
// 红线: 缺失或格式错误的配置回退默认值（记录 warn），不中断校验
// ==========================================

use crate::config::validator_config_trait::ValidatorConfigReader;
use crate::domain::rule::MAX_DECIMALS;
use crate::engine::evaluator::EvaluatorSettings;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::file_source::DEFAULT_MAX_FILE_SIZE;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::RwLock;
use tracing::{debug, warn};

/// 系统配置目录下的应用目录名
pub const APP_DIR_NAME: &str = "bcbd-validator";

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
#[derive(Debug, Default)]
pub struct ConfigManager {
    values: RwLock<HashMap<String, String>>,
}

impl ConfigManager {
    /// 创建空配置（全部取默认值）
    pub fn new() -> Self {
        Self::default()
    }

    /// 从 JSON 对象文件加载
    ///
    /// # 参数
    /// - path: JSON 文件路径，内容形如 {"default_decimals": 2, "locale": "zh-CN"}
    ///
    /// # 返回
    /// - Err(ConfigReadError): 文件不可读
    /// - Err(ConfigValueError): 不是 JSON 对象
    pub fn from_file(path: &Path) -> ImportResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| ImportError::ConfigReadError {
            key: path.display().to_string(),
            message: e.to_string(),
        })?;
        let manager = Self::from_json(&raw)?;
        debug!(path = %path.display(), "配置文件加载完成");
        Ok(manager)
    }

    /// 从 JSON 对象字符串加载（值可为字符串、数字或布尔）
    pub fn from_json(raw: &str) -> ImportResult<Self> {
        let manager = Self::new();
        manager.merge_json(raw)?;
        Ok(manager)
    }

    /// 设置单个配置项
    pub fn set(&self, key: &str, value: impl Into<String>) -> ImportResult<()> {
        let mut values = self.values.write().map_err(|e| lock_error(key, e))?;
        values.insert(key.to_string(), value.into());
        Ok(())
    }

    /// 读取配置值
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    pub fn get_config_value(&self, key: &str) -> ImportResult<Option<String>> {
        let values = self.values.read().map_err(|e| lock_error(key, e))?;
        Ok(values.get(key).cloned())
    }

    /// 读取配置值，带默认值
    fn get_config_or_default(&self, key: &str, default: &str) -> ImportResult<String> {
        Ok(self.get_config_value(key)?.unwrap_or_else(|| default.to_string()))
    }

    /// 读取并解析配置值；格式错误时记录 warn 并回退默认值
    fn get_parsed_or_default<T>(&self, key: &str, default: T) -> ImportResult<T>
    where
        T: FromStr + Copy + std::fmt::Display,
    {
        let Some(raw) = self.get_config_value(key)? else {
            return Ok(default);
        };
        match raw.trim().parse::<T>() {
            Ok(value) => Ok(value),
            Err(_) => {
                warn!(
                    config_key = key,
                    raw_value = %raw,
                    default = %default,
                    "配置值格式错误，使用默认值"
                );
                Ok(default)
            }
        }
    }

    /// 小数位配置；超过 MAX_DECIMALS 时回退默认值
    fn get_decimals_or_default(&self, key: &str, default: u32) -> ImportResult<u32> {
        let value = self.get_parsed_or_default(key, default)?;
        if value > MAX_DECIMALS {
            warn!(config_key = key, value, max = MAX_DECIMALS, "小数位超出上限，使用默认值");
            return Ok(default);
        }
        Ok(value)
    }

    /// 获取所有配置的快照（JSON 格式，按 key 排序）
    pub fn get_config_snapshot(&self) -> ImportResult<String> {
        let values = self.values.read().map_err(|e| lock_error("*", e))?;
        let sorted: BTreeMap<&String, &String> = values.iter().collect();
        Ok(serde_json::to_string(&sorted)?)
    }

    /// 从配置快照恢复配置（覆盖同名配置项）
    ///
    /// # 返回
    /// - Ok(usize): 恢复的配置项数量
    pub fn restore_config_from_snapshot(&self, snapshot_json: &str) -> ImportResult<usize> {
        self.merge_json(snapshot_json)
    }

    fn merge_json(&self, raw: &str) -> ImportResult<usize> {
        let parsed: Value = serde_json::from_str(raw).map_err(|e| ImportError::ConfigValueError {
            key: "*".to_string(),
            value: truncate(raw),
            message: e.to_string(),
        })?;
        let Value::Object(map) = parsed else {
            return Err(ImportError::ConfigValueError {
                key: "*".to_string(),
                value: truncate(raw),
                message: "配置必须是 JSON 对象".to_string(),
            });
        };

        let mut values = self.values.write().map_err(|e| lock_error("*", e))?;
        let mut count = 0;
        for (key, value) in map {
            let text = match value {
                Value::String(s) => s,
                Value::Null => continue,
                other => other.to_string(),
            };
            values.insert(key, text);
            count += 1;
        }
        Ok(count)
    }

    /// 引擎精度配置
    pub async fn evaluator_settings(&self) -> ImportResult<EvaluatorSettings> {
        Ok(EvaluatorSettings {
            default_decimals: self.get_default_decimals().await?,
            percentage_decimals: self.get_percentage_decimals().await?,
        })
    }

    fn app_dir(&self, key: &str, child: &str) -> ImportResult<PathBuf> {
        if let Some(custom) = self.get_config_value(key)? {
            if !custom.trim().is_empty() {
                return Ok(PathBuf::from(custom.trim()));
            }
        }
        let base = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        Ok(base.join(APP_DIR_NAME).join(child))
    }
}

fn lock_error<E: std::fmt::Display>(key: &str, err: E) -> ImportError {
    ImportError::ConfigReadError {
        key: key.to_string(),
        message: format!("锁获取失败: {}", err),
    }
}

fn truncate(raw: &str) -> String {
    raw.chars().take(64).collect()
}

// ==========================================
// ValidatorConfigReader Trait 实现
// ==========================================
#[async_trait]
impl ValidatorConfigReader for ConfigManager {
    // ===== 比较精度 =====

    async fn get_default_decimals(&self) -> ImportResult<u32> {
        self.get_decimals_or_default(config_keys::DEFAULT_DECIMALS, 2)
    }

    async fn get_percentage_decimals(&self) -> ImportResult<u32> {
        self.get_decimals_or_default(config_keys::PERCENTAGE_DECIMALS, 3)
    }

    async fn get_minor_difference_epsilon(&self) -> ImportResult<f64> {
        let value: f64 =
            self.get_parsed_or_default(config_keys::MINOR_DIFFERENCE_EPSILON, 0.001)?;
        if value.is_nan() || value <= 0.0 {
            warn!(value, "轻微差异必须大于 0，使用默认值 0.001");
            return Ok(0.001);
        }
        Ok(value)
    }

    // ===== 文件 =====

    async fn get_max_file_size_bytes(&self) -> ImportResult<u64> {
        self.get_parsed_or_default(config_keys::MAX_FILE_SIZE_BYTES, DEFAULT_MAX_FILE_SIZE)
    }

    async fn get_reference_dir(&self) -> ImportResult<PathBuf> {
        self.app_dir(config_keys::REFERENCE_DIR, "reference")
    }

    async fn get_rules_dir(&self) -> ImportResult<PathBuf> {
        self.app_dir(config_keys::RULES_DIR, "rules")
    }

    // ===== 报表 =====

    async fn get_locale(&self) -> ImportResult<String> {
        let value = self.get_config_or_default(config_keys::LOCALE, "en")?;
        Ok(value.trim().to_string())
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 比较精度
    pub const DEFAULT_DECIMALS: &str = "default_decimals";
    pub const PERCENTAGE_DECIMALS: &str = "percentage_decimals";
    pub const MINOR_DIFFERENCE_EPSILON: &str = "minor_difference_epsilon";

    // 文件
    pub const MAX_FILE_SIZE_BYTES: &str = "max_file_size_bytes";
    pub const REFERENCE_DIR: &str = "reference_dir";
    pub const RULES_DIR: &str = "rules_dir";

    // 报表
    pub const LOCALE: &str = "locale";
}
