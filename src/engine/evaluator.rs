// ==========================================
// 成本分解表校验 - 规则判定器 (RuleEvaluator)
// ==========================================
// 职责: 单元格实际值 vs 期望值 → VALID / INVALID / WARNING
// 红线: 空单元格一律 INVALID（不会是 WARNING）
//       无法解析一律 INVALID，不抛错（买方表格格式混乱是常态）
//       WARNING 仅在 |实际-期望| 恰好等于轻微差异时出现
// ==========================================

use crate::domain::cell::{Cell, NormalizedValue};
use crate::domain::result::{Reason, Verdict, EMPTY_DISPLAY};
use crate::domain::rule::{Check, Expected};
use crate::engine::normalizer::ValueNormalizer;

// ==========================================
// EvaluatorSettings - 默认比较精度
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvaluatorSettings {
    pub default_decimals: u32,    // 数值规则默认小数位
    pub percentage_decimals: u32, // 百分比/区间规则默认小数位
}

impl Default for EvaluatorSettings {
    fn default() -> Self {
        Self {
            default_decimals: 2,
            percentage_decimals: 3,
        }
    }
}

// ==========================================
// Evaluation - 单次判定输出（不含地址信息）
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub raw_actual: String,
    pub normalized_actual: Option<NormalizedValue>,
    pub expected: String,
    pub verdict: Verdict,
    pub reason: Option<Reason>,
}

impl Evaluation {
    fn new(cell: &Cell, check: &Check) -> Self {
        Self {
            raw_actual: cell.as_text().trim().to_string(),
            normalized_actual: None,
            expected: check.expected.describe(),
            verdict: Verdict::Invalid,
            reason: None,
        }
    }

    fn verdict(mut self, verdict: Verdict, reason: Option<Reason>) -> Self {
        self.verdict = verdict;
        self.reason = reason;
        self
    }

    fn normalized(mut self, value: NormalizedValue) -> Self {
        self.normalized_actual = Some(value);
        self
    }
}

// ==========================================
// RuleEvaluator
// ==========================================
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleEvaluator {
    settings: EvaluatorSettings,
}

impl RuleEvaluator {
    pub fn new(settings: EvaluatorSettings) -> Self {
        Self { settings }
    }

    /// 判定单个单元格
    pub fn evaluate(&self, cell: &Cell, check: &Check) -> Evaluation {
        let evaluation = Evaluation::new(cell, check);

        if cell.is_empty() {
            return Evaluation {
                raw_actual: EMPTY_DISPLAY.to_string(),
                ..evaluation
            }
            .verdict(Verdict::Invalid, Some(Reason::Empty));
        }

        match &check.expected {
            Expected::Text { value } => self.evaluate_text(cell, value, evaluation),
            Expected::OneOf { values } => self.evaluate_one_of(cell, values, evaluation),
            Expected::Number { value, tolerance } => {
                let decimals = check.decimals.unwrap_or(self.settings.default_decimals);
                match ValueNormalizer::normalize_numeric(cell) {
                    Some(actual) => compare_numeric(
                        actual,
                        *value,
                        *tolerance,
                        decimals,
                        check.minor_difference,
                        evaluation.normalized(NormalizedValue::Number(actual)),
                    ),
                    None => evaluation.verdict(Verdict::Invalid, Some(Reason::Unparseable)),
                }
            }
            Expected::Percentage { percent } => {
                let decimals = check.decimals.unwrap_or(self.settings.percentage_decimals);
                match ValueNormalizer::normalize_percentage(cell) {
                    Some(actual) => compare_numeric(
                        actual,
                        percent / 100.0,
                        0.0,
                        decimals,
                        check.minor_difference,
                        evaluation.normalized(NormalizedValue::Number(actual)),
                    ),
                    None => evaluation.verdict(Verdict::Invalid, Some(Reason::Unparseable)),
                }
            }
            Expected::Boolean { value } => match ValueNormalizer::normalize_boolean(cell) {
                Some(actual) if actual == *value => evaluation
                    .normalized(NormalizedValue::Bool(actual))
                    .verdict(Verdict::Valid, None),
                Some(actual) => evaluation
                    .normalized(NormalizedValue::Bool(actual))
                    .verdict(Verdict::Invalid, Some(Reason::Mismatch)),
                None => evaluation.verdict(Verdict::Invalid, Some(Reason::Unparseable)),
            },
            Expected::Range {
                min,
                max,
                percentage,
            } => {
                let (normalized, decimals) = if *percentage {
                    (
                        ValueNormalizer::normalize_percentage(cell),
                        check.decimals.unwrap_or(self.settings.percentage_decimals),
                    )
                } else {
                    (
                        ValueNormalizer::normalize_numeric(cell),
                        check.decimals.unwrap_or(self.settings.default_decimals),
                    )
                };
                match normalized {
                    Some(actual) => {
                        let rounded = ValueNormalizer::round_to(actual, decimals);
                        let lo = ValueNormalizer::round_to(*min, decimals);
                        let hi = ValueNormalizer::round_to(*max, decimals);
                        let evaluation = evaluation.normalized(NormalizedValue::Number(actual));
                        if lo <= rounded && rounded <= hi {
                            evaluation.verdict(Verdict::Valid, None)
                        } else {
                            evaluation.verdict(Verdict::Invalid, Some(Reason::OutOfRange))
                        }
                    }
                    None => evaluation.verdict(Verdict::Invalid, Some(Reason::Unparseable)),
                }
            }
        }
    }

    fn evaluate_text(&self, cell: &Cell, expected: &str, evaluation: Evaluation) -> Evaluation {
        let actual = ValueNormalizer::normalize_text(cell);
        let wanted = ValueNormalizer::normalize_text(&Cell::from(expected));
        match actual {
            Some(actual) => {
                let matched = Some(&actual) == wanted.as_ref();
                let evaluation = evaluation.normalized(NormalizedValue::Text(actual));
                if matched {
                    evaluation.verdict(Verdict::Valid, None)
                } else {
                    evaluation.verdict(Verdict::Invalid, Some(Reason::Mismatch))
                }
            }
            None => evaluation.verdict(Verdict::Invalid, Some(Reason::Unparseable)),
        }
    }

    fn evaluate_one_of(
        &self,
        cell: &Cell,
        values: &[String],
        evaluation: Evaluation,
    ) -> Evaluation {
        let actual = match ValueNormalizer::normalize_text(cell) {
            Some(actual) => actual,
            None => return evaluation.verdict(Verdict::Invalid, Some(Reason::Unparseable)),
        };
        let matched = values.iter().any(|v| {
            ValueNormalizer::normalize_text(&Cell::from(v.as_str())).as_deref()
                == Some(actual.as_str())
        });
        let evaluation = evaluation.normalized(NormalizedValue::Text(actual));
        if matched {
            evaluation.verdict(Verdict::Valid, None)
        } else {
            evaluation.verdict(Verdict::Invalid, Some(Reason::NotInList))
        }
    }
}

/// 数值比较：两侧按同一精度取整后判等
fn compare_numeric(
    actual: f64,
    expected: f64,
    tolerance: f64,
    decimals: u32,
    minor_difference: Option<f64>,
    evaluation: Evaluation,
) -> Evaluation {
    let a = ValueNormalizer::round_to(actual, decimals);
    let e = ValueNormalizer::round_to(expected, decimals);
    if a == e {
        return evaluation.verdict(Verdict::Valid, None);
    }

    let diff = ValueNormalizer::round_to((a - e).abs(), decimals);
    if tolerance > 0.0 && diff <= ValueNormalizer::round_to(tolerance, decimals) {
        return evaluation.verdict(Verdict::Valid, None);
    }

    match minor_difference {
        Some(eps) if diff == ValueNormalizer::round_to(eps, decimals) => {
            evaluation.verdict(Verdict::Warning, Some(Reason::MinorDifference))
        }
        _ => evaluation.verdict(Verdict::Invalid, Some(Reason::Mismatch)),
    }
}
