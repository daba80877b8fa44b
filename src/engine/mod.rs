// ==========================================
// 成本分解表校验 - 引擎层
// ==========================================
// 职责: 区段定位、值归一化、规则判定、单文件校验编排
// 红线: 引擎只读网格，不做 IO；所有判定输出结构化结果
// ==========================================

pub mod evaluator;
pub mod locator;
pub mod normalizer;
pub mod runner;

// 重导出核心引擎
pub use evaluator::{Evaluation, EvaluatorSettings, RuleEvaluator};
pub use locator::{SectionLocation, SectionLocator};
pub use normalizer::ValueNormalizer;
pub use runner::{sheets_in_scope, ValidationRunner};
