// ==========================================
// 成本分解表校验 - 品牌规则表
// ==========================================
// 职责: 内置品牌规则表 + 品牌注册表（内置 + 自定义 JSON）
// 红线: 品牌之间只有数据差异，没有各自的校验逻辑
//       参考数据缺失只在初始化时报告一次，品牌标记为不可用
// ==========================================

pub mod burton;
pub mod foot_asylum;
pub mod mammut;
pub mod prana;
pub mod ride_store;

use crate::domain::cell::Cell;
use crate::domain::grid::{CellAddress, ColumnRef};
use crate::domain::rule::RuleSet;
use crate::engine::normalizer::ValueNormalizer;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::importer_trait::ReferenceLoader;
use crate::importer::reference_loader::{CsvReferenceLoader, ReferenceTable};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

// ==========================================
// BuiltinBrand - 内置品牌
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuiltinBrand {
    Burton,
    Mammut,
    RideStore,
    Prana,
    FootAsylum,
}

impl BuiltinBrand {
    pub const ALL: [BuiltinBrand; 5] = [
        BuiltinBrand::Burton,
        BuiltinBrand::Mammut,
        BuiltinBrand::RideStore,
        BuiltinBrand::Prana,
        BuiltinBrand::FootAsylum,
    ];

    /// 展示名称（同时作为规则表的 brand）
    pub fn title(&self) -> &'static str {
        match self {
            BuiltinBrand::Burton => "Burton",
            BuiltinBrand::Mammut => "Mammut",
            BuiltinBrand::RideStore => "Ride Store",
            BuiltinBrand::Prana => "Prana",
            BuiltinBrand::FootAsylum => "Foot Asylum",
        }
    }

    /// 构建规则表
    pub fn rules(&self, context: &BrandContext<'_>) -> ImportResult<RuleSet> {
        match self {
            BuiltinBrand::Burton => burton::rules(context),
            BuiltinBrand::Mammut => mammut::rules(context),
            BuiltinBrand::RideStore => ride_store::rules(context),
            BuiltinBrand::Prana => prana::rules(context),
            BuiltinBrand::FootAsylum => foot_asylum::rules(context),
        }
    }
}

impl std::str::FromStr for BuiltinBrand {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .trim()
            .to_lowercase()
            .chars()
            .filter(|c| c.is_alphanumeric())
            .collect();
        match key.as_str() {
            "burton" => Ok(BuiltinBrand::Burton),
            "mammut" => Ok(BuiltinBrand::Mammut),
            "ridestore" => Ok(BuiltinBrand::RideStore),
            "prana" => Ok(BuiltinBrand::Prana),
            "footasylum" => Ok(BuiltinBrand::FootAsylum),
            _ => Err(format!("未知品牌: {}", s)),
        }
    }
}

// ==========================================
// BrandContext - 构建规则表所需的外部输入
// ==========================================
pub struct BrandContext<'a> {
    /// 轻微差异（内置品牌统一使用）
    pub epsilon: f64,
    /// 参考数据目录
    pub reference_dir: PathBuf,
    pub loader: &'a dyn ReferenceLoader,
}

impl<'a> BrandContext<'a> {
    pub fn new(
        epsilon: f64,
        reference_dir: impl Into<PathBuf>,
        loader: &'a dyn ReferenceLoader,
    ) -> Self {
        Self {
            epsilon,
            reference_dir: reference_dir.into(),
            loader,
        }
    }

    /// 加载参考数据目录下的文件
    pub fn load_reference(&self, brand: &str, file_name: &str) -> ImportResult<ReferenceTable> {
        self.loader.load(brand, &self.reference_dir.join(file_name))
    }
}

/// 两列（标签, 值）带表头的参考数据加载器
pub fn label_value_loader() -> CsvReferenceLoader {
    CsvReferenceLoader::new(2, true)
}

// ==========================================
// 规则表辅助函数
// ==========================================

/// 列字母 → ColumnRef
pub fn col(letters: &str) -> ImportResult<ColumnRef> {
    ColumnRef::parse(letters).ok_or_else(|| ImportError::InvalidColumn(letters.to_string()))
}

/// A1 地址 → CellAddress
pub fn addr(a1: &str) -> ImportResult<CellAddress> {
    CellAddress::parse(a1).ok_or_else(|| ImportError::InvalidCellAddress(a1.to_string()))
}

/// 参考数据中必填的文本值
pub fn required_value(brand: &str, table: &ReferenceTable, label: &str) -> ImportResult<String> {
    table
        .value(label)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or_else(|| ImportError::MissingReferenceData {
            brand: brand.to_string(),
            reason: format!("缺少参考值: {}", label),
        })
}

/// 参考数据中必填的百分比值（"5%"、"5"、"0.05" 均返回 5）
pub fn required_percent(brand: &str, table: &ReferenceTable, label: &str) -> ImportResult<f64> {
    let raw = required_value(brand, table, label)?;
    ValueNormalizer::normalize_percentage(&Cell::from(raw.as_str()))
        .map(|fraction| ValueNormalizer::round_to(fraction * 100.0, 6))
        .ok_or_else(|| ImportError::MissingReferenceData {
            brand: brand.to_string(),
            reason: format!("参考值不是百分比: {} = {}", label, raw),
        })
}

// ==========================================
// BrandRegistry - 品牌注册表
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BrandSource {
    BuiltIn,
    Custom,
}

#[derive(Debug, Clone)]
pub enum BrandStatus {
    Available(RuleSet),
    /// 参考数据缺失或规则表错误
    Unavailable { reason: String },
}

#[derive(Debug, Clone)]
pub struct BrandEntry {
    pub name: String,
    pub source: BrandSource,
    pub status: BrandStatus,
}

impl BrandEntry {
    pub fn rules(&self) -> Option<&RuleSet> {
        match &self.status {
            BrandStatus::Available(rules) => Some(rules),
            BrandStatus::Unavailable { .. } => None,
        }
    }
}

/// 品牌列表展示用
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrandInfo {
    pub name: String,
    pub source: BrandSource,
    pub available: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct BrandRegistry {
    entries: Vec<BrandEntry>,
}

impl BrandRegistry {
    /// 初始化全部内置品牌
    ///
    /// 参考数据缺失的品牌记录为不可用（只在此处 warn 一次）
    pub fn builtin(context: &BrandContext<'_>) -> Self {
        let mut registry = Self::default();
        for brand in BuiltinBrand::ALL {
            let status = match brand.rules(context) {
                Ok(rules) => BrandStatus::Available(rules),
                Err(e) => {
                    warn!(brand = brand.title(), error = %e, "品牌不可用");
                    BrandStatus::Unavailable {
                        reason: e.to_string(),
                    }
                }
            };
            registry.entries.push(BrandEntry {
                name: brand.title().to_string(),
                source: BrandSource::BuiltIn,
                status,
            });
        }
        info!(
            brands = registry.entries.len(),
            unavailable = registry.entries.iter().filter(|e| e.rules().is_none()).count(),
            "内置品牌初始化完成"
        );
        registry
    }

    /// 内置品牌 + 目录中的自定义规则表
    pub fn load(context: &BrandContext<'_>, rules_dir: &Path) -> Self {
        let mut registry = Self::builtin(context);
        for rules in crate::config::rule_profile::load_rule_profiles(rules_dir) {
            registry.register(rules);
        }
        registry
    }

    /// 注册自定义规则表；同名品牌（忽略大小写）被覆盖
    pub fn register(&mut self, rules: RuleSet) {
        let entry = BrandEntry {
            name: rules.brand.clone(),
            source: BrandSource::Custom,
            status: BrandStatus::Available(rules),
        };
        match self.position(&entry.name) {
            Some(index) => {
                info!(brand = %entry.name, "自定义规则表覆盖同名品牌");
                self.entries[index] = entry;
            }
            None => self.entries.push(entry),
        }
    }

    pub fn get(&self, name: &str) -> Option<&BrandEntry> {
        self.position(name).map(|index| &self.entries[index])
    }

    pub fn entries(&self) -> &[BrandEntry] {
        &self.entries
    }

    pub fn list(&self) -> Vec<BrandInfo> {
        self.entries
            .iter()
            .map(|entry| BrandInfo {
                name: entry.name.clone(),
                source: entry.source,
                available: entry.rules().is_some(),
                reason: match &entry.status {
                    BrandStatus::Unavailable { reason } => Some(reason.clone()),
                    BrandStatus::Available(_) => None,
                },
            })
            .collect()
    }

    fn position(&self, name: &str) -> Option<usize> {
        let wanted = brand_key(name);
        self.entries.iter().position(|e| brand_key(&e.name) == wanted)
    }
}

/// 品牌名比较键：忽略大小写、空格与连字符
fn brand_key(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    pub(crate) fn write_reference_files(dir: &Path) {
        fs::write(
            dir.join(prana::REFERENCE_FILE),
            "Label,Value\nFactory,PT Ujump Indonesia\nCurrency,USD\n\
             Fabric Wastage,5%\nTrim Wastage,3\n",
        )
        .unwrap();
        fs::write(
            dir.join(foot_asylum::REFERENCE_FILE),
            "Code,Supplier\nFA01,Hanoi Garment Co, Ltd\nFA02,PT Ujump Indonesia\n",
        )
        .unwrap();
    }

    #[test]
    fn test_builtin_brand_from_str() {
        assert_eq!("ride store".parse::<BuiltinBrand>(), Ok(BuiltinBrand::RideStore));
        assert_eq!("Foot-Asylum".parse::<BuiltinBrand>(), Ok(BuiltinBrand::FootAsylum));
        assert!("Nike".parse::<BuiltinBrand>().is_err());
    }

    #[test]
    fn test_every_builtin_rule_set_validates() {
        let dir = TempDir::new().unwrap();
        write_reference_files(dir.path());
        let loader = label_value_loader();
        let context = BrandContext::new(0.001, dir.path(), &loader);

        for brand in BuiltinBrand::ALL {
            let rules = brand.rules(&context).unwrap();
            assert_eq!(rules.brand, brand.title());
            assert_eq!(rules.validate(), Ok(()), "{}", brand.title());
        }
    }

    #[test]
    fn test_missing_reference_data_marks_brand_unavailable() {
        let dir = TempDir::new().unwrap();
        let loader = label_value_loader();
        let context = BrandContext::new(0.001, dir.path(), &loader);
        let registry = BrandRegistry::builtin(&context);

        assert!(registry.get("burton").and_then(BrandEntry::rules).is_some());
        let prana = registry.get("Prana").unwrap();
        assert!(prana.rules().is_none());
        let info = registry.list();
        let prana_info = info.iter().find(|i| i.name == "Prana").unwrap();
        assert!(!prana_info.available);
        assert!(prana_info.reason.as_deref().unwrap_or("").contains("Prana"));
    }

    #[test]
    fn test_custom_rules_override_same_name() {
        let dir = TempDir::new().unwrap();
        let loader = label_value_loader();
        let context = BrandContext::new(0.001, dir.path(), &loader);
        let mut registry = BrandRegistry::builtin(&context);
        let count = registry.entries().len();

        registry.register(RuleSet::new("ride-store"));
        assert_eq!(registry.entries().len(), count);
        assert_eq!(registry.get("Ride Store").unwrap().source, BrandSource::Custom);

        registry.register(RuleSet::new("Patagonia"));
        assert_eq!(registry.entries().len(), count + 1);
    }

    #[test]
    fn test_required_percent_accepts_all_representations() {
        let table = ReferenceTable {
            headers: None,
            rows: vec![
                vec!["A".to_string(), "5%".to_string()],
                vec!["B".to_string(), "0.05".to_string()],
                vec!["C".to_string(), "5".to_string()],
            ],
        };
        for label in ["A", "B", "C"] {
            assert_eq!(required_percent("X", &table, label).unwrap(), 5.0);
        }
        assert!(required_percent("X", &table, "D").is_err());
    }
}
