// ==========================================
// 成本分解表校验 - 自定义规则表
// ==========================================
// 职责: 从 rules_dir 加载 JSON 规则表，转换为 RuleSet
// 红线: 单个文件格式错误只跳过该文件（记录 warn）
// ==========================================

use crate::domain::rule::RuleSet;
use crate::importer::error::{ImportError, ImportResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info, warn};

/// 自定义规则表（JSON 文件）
///
/// 存储位置：rules_dir 下的 *.json，一个文件一个品牌
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleProfile {
    /// 说明（可选）
    #[serde(default)]
    pub description: Option<String>,

    /// 是否启用（默认启用）
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// 规则表本体
    #[serde(flatten)]
    pub rules: RuleSet,
}

fn default_enabled() -> bool {
    true
}

/// 加载单个规则表文件，并做规则表自检
pub fn load_rule_profile(path: &Path) -> ImportResult<RuleProfile> {
    let raw = std::fs::read_to_string(path)?;
    let profile: RuleProfile =
        serde_json::from_str(&raw).map_err(|e| ImportError::RuleConfigError {
            brand: path.display().to_string(),
            message: e.to_string(),
        })?;

    profile
        .rules
        .validate()
        .map_err(|problems| ImportError::RuleConfigError {
            brand: profile.rules.brand.clone(),
            message: problems.join("; "),
        })?;

    Ok(profile)
}

/// 加载目录下全部已启用的规则表（按文件名排序）
///
/// 目录不存在时返回空；单个文件格式错误只记录 warn 并跳过
pub fn load_rule_profiles(dir: &Path) -> Vec<RuleSet> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            debug!(dir = %dir.display(), error = %e, "规则目录不可读，跳过自定义规则表");
            return Vec::new();
        }
    };

    let mut paths: Vec<_> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| {
            p.is_file()
                && p.extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|e| e.eq_ignore_ascii_case("json"))
        })
        .collect();
    paths.sort();

    let mut rule_sets = Vec::new();
    for path in paths {
        match load_rule_profile(&path) {
            Ok(profile) if profile.enabled => {
                info!(brand = %profile.rules.brand, path = %path.display(), "加载自定义规则表");
                rule_sets.push(profile.rules);
            }
            Ok(profile) => {
                debug!(brand = %profile.rules.brand, "规则表未启用，跳过");
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "规则表格式错误，跳过");
            }
        }
    }
    rule_sets
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::rule::{Expected, SheetScope};
    use std::fs;
    use tempfile::TempDir;

    const PROFILE: &str = r#"{
        "brand": "Patagonia",
        "description": "Fabric wastage only",
        "sheet_scope": "all",
        "sections": [{
            "name": "Fabrics",
            "marker_column": "A",
            "start": {"text": "FABRIC", "mode": "exact"},
            "end": {"text": "FABRIC TOTAL", "mode": "contains"},
            "fields": [{
                "column": "Q",
                "label": "Wastage",
                "expected": {"type": "percentage", "percent": 5},
                "minor_difference": 0.001
            }]
        }]
    }"#;

    #[test]
    fn test_load_profiles_skips_malformed_files() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("patagonia.json"), PROFILE).unwrap();
        fs::write(dir.path().join("broken.json"), "{ not json").unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let rule_sets = load_rule_profiles(dir.path());
        assert_eq!(rule_sets.len(), 1);

        let rules = &rule_sets[0];
        assert_eq!(rules.brand, "Patagonia");
        assert_eq!(rules.sheet_scope, SheetScope::All);
        assert_eq!(rules.sections[0].fields[0].check.expected, Expected::percent(5.0));
        assert_eq!(rules.sections[0].fields[0].column.letters(), "Q");
    }

    #[test]
    fn test_disabled_profile_is_skipped() {
        let dir = TempDir::new().unwrap();
        let disabled = PROFILE.replacen("\"brand\"", "\"enabled\": false, \"brand\"", 1);
        fs::write(dir.path().join("patagonia.json"), disabled).unwrap();
        assert!(load_rule_profiles(dir.path()).is_empty());
    }

    #[test]
    fn test_invalid_rules_are_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.json");
        fs::write(&path, r#"{"brand": "Empty"}"#).unwrap();
        assert!(matches!(
            load_rule_profile(&path),
            Err(ImportError::RuleConfigError { .. })
        ));
    }

    #[test]
    fn test_missing_dir_is_empty() {
        assert!(load_rule_profiles(Path::new("/no/such/rules")).is_empty());
    }
}
