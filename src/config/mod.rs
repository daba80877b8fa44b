// ==========================================
// 成本分解表校验 - 配置层
// ==========================================
// 职责: 系统配置管理 + 自定义规则表加载
// 存储: JSON 配置文件 / rules_dir 下的规则表 JSON
// ==========================================

pub mod config_manager;
pub mod rule_profile;
pub mod validator_config_trait;

// 重导出核心配置管理器
pub use config_manager::{config_keys, ConfigManager};
pub use rule_profile::{load_rule_profile, load_rule_profiles, RuleProfile};
pub use validator_config_trait::ValidatorConfigReader;
