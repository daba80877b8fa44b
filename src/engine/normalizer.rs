// ==========================================
// 成本分解表校验 - 值归一化器 (ValueNormalizer)
// ==========================================
// 职责: 数值 / 百分比 / 布尔 / 文本 的归一化 + 精度取整
// 红线: 无法解析返回 None（不可当作 0）
//       归一化幂等：对已归一化的值再次归一化结果不变
// ==========================================

use crate::domain::cell::Cell;
use crate::domain::rule::MAX_DECIMALS;

/// 数值清洗时剥离的货币符号
const CURRENCY_SYMBOLS: [char; 5] = ['$', '€', '£', '¥', '₹'];

pub struct ValueNormalizer;

impl ValueNormalizer {
    /// 数值归一化：剥离货币符号、千分位逗号与空白后解析
    pub fn normalize_numeric(cell: &Cell) -> Option<f64> {
        match cell {
            Cell::Number(n) if n.is_finite() => Some(*n),
            Cell::Text(s) => parse_cleaned(&clean_numeric_text(s)),
            _ => None,
        }
    }

    /// 百分比归一化（规范形式为小数，5% → 0.05）
    ///
    /// # 规则
    /// 1. 以 % 结尾 → 除以 100
    /// 2. 数值 < 1 → 视为已是小数
    /// 3. 数值 >= 1 → 视为整数百分比，除以 100
    pub fn normalize_percentage(cell: &Cell) -> Option<f64> {
        match cell {
            Cell::Number(n) if n.is_finite() => Some(fraction_from_number(*n)),
            Cell::Text(s) => {
                let cleaned = clean_numeric_text(s);
                if let Some(stripped) = cleaned.strip_suffix('%') {
                    parse_cleaned(stripped).map(|v| v / 100.0)
                } else {
                    parse_cleaned(&cleaned).map(fraction_from_number)
                }
            }
            _ => None,
        }
    }

    /// 布尔归一化：原生布尔或 "TRUE"/"FALSE"（忽略大小写）
    pub fn normalize_boolean(cell: &Cell) -> Option<bool> {
        match cell {
            Cell::Bool(b) => Some(*b),
            Cell::Text(s) => match s.trim().to_uppercase().as_str() {
                "TRUE" => Some(true),
                "FALSE" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }

    /// 文本归一化：trim + 小写 + 去掉尾部冒号
    ///
    /// 表头常写作 "Factory:"，与 "FACTORY" 视为同一值
    pub fn normalize_text(cell: &Cell) -> Option<String> {
        if cell.is_empty() {
            return None;
        }
        let text = cell.as_text();
        let normalized = text
            .trim()
            .trim_end_matches(':')
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();
        Some(normalized)
    }

    /// 按小数位四舍五入（远离 0），小数位上限 MAX_DECIMALS
    pub fn round_to(value: f64, decimals: u32) -> f64 {
        let factor = 10f64.powi(decimals.min(MAX_DECIMALS) as i32);
        let scaled = value * factor;
        // 先按 1e-9 修正二进制误差，0.0449999999 视为 0.045
        let corrected = (scaled * 1e9).round() / 1e9;
        corrected.round() / factor
    }
}

fn clean_numeric_text(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace() && *c != ',' && !CURRENCY_SYMBOLS.contains(c))
        .collect()
}

fn parse_cleaned(cleaned: &str) -> Option<f64> {
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn fraction_from_number(value: f64) -> f64 {
    if value < 1.0 {
        value
    } else {
        value / 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn test_numeric_strips_currency_and_commas() {
        assert_eq!(
            ValueNormalizer::normalize_numeric(&Cell::from(" $1,234.50 ")),
            Some(1234.5)
        );
        assert_eq!(ValueNormalizer::normalize_numeric(&Cell::from("€ 0.35")), Some(0.35));
        assert_eq!(ValueNormalizer::normalize_numeric(&Cell::Number(2.0)), Some(2.0));
    }

    #[test]
    fn test_numeric_unparseable_is_none_not_zero() {
        assert_eq!(ValueNormalizer::normalize_numeric(&Cell::from("N/A")), None);
        assert_eq!(ValueNormalizer::normalize_numeric(&Cell::from("")), None);
        assert_eq!(ValueNormalizer::normalize_numeric(&Cell::Empty), None);
        assert_eq!(ValueNormalizer::normalize_numeric(&Cell::Bool(true)), None);
        assert_eq!(ValueNormalizer::normalize_numeric(&Cell::Number(f64::NAN)), None);
    }

    #[test]
    fn test_numeric_idempotent() {
        let inputs = [
            Cell::from("$1,000"),
            Cell::from("0.051"),
            Cell::Number(-3.25),
            Cell::from(" 42 "),
        ];
        for input in inputs {
            let once = ValueNormalizer::normalize_numeric(&input).unwrap();
            let twice = ValueNormalizer::normalize_numeric(&Cell::Number(once)).unwrap();
            assert_eq!(once, twice);
            let twice_text =
                ValueNormalizer::normalize_numeric(&Cell::Text(once.to_string())).unwrap();
            assert_eq!(once, twice_text);
        }
    }

    #[test]
    fn test_percentage_equivalence() {
        let a = ValueNormalizer::normalize_percentage(&Cell::from("5%")).unwrap();
        let b = ValueNormalizer::normalize_percentage(&Cell::Number(0.05)).unwrap();
        let c = ValueNormalizer::normalize_percentage(&Cell::Number(5.0)).unwrap();
        let d = ValueNormalizer::normalize_percentage(&Cell::from("5")).unwrap();
        assert!(approx(a, 0.05));
        assert!(approx(b, 0.05));
        assert!(approx(c, 0.05));
        assert!(approx(d, 0.05));
    }

    #[test]
    fn test_percentage_exactly_one_is_whole_percent() {
        // 1 被视为 1%（而非 100%），保持现有口径
        let v = ValueNormalizer::normalize_percentage(&Cell::Number(1.0)).unwrap();
        assert!(approx(v, 0.01));
    }

    #[test]
    fn test_percentage_fraction_is_idempotent() {
        let once = ValueNormalizer::normalize_percentage(&Cell::from("12.5%")).unwrap();
        let twice = ValueNormalizer::normalize_percentage(&Cell::Number(once)).unwrap();
        assert!(approx(once, 0.125));
        assert!(approx(once, twice));
    }

    #[test]
    fn test_boolean() {
        assert_eq!(ValueNormalizer::normalize_boolean(&Cell::from(" true ")), Some(true));
        assert_eq!(ValueNormalizer::normalize_boolean(&Cell::from("FALSE")), Some(false));
        assert_eq!(ValueNormalizer::normalize_boolean(&Cell::Bool(true)), Some(true));
        assert_eq!(ValueNormalizer::normalize_boolean(&Cell::from("yes")), None);
        assert_eq!(ValueNormalizer::normalize_boolean(&Cell::Number(1.0)), None);
    }

    #[test]
    fn test_text() {
        assert_eq!(
            ValueNormalizer::normalize_text(&Cell::from("Factory:")),
            Some("factory".to_string())
        );
        assert_eq!(
            ValueNormalizer::normalize_text(&Cell::from("PT  Ujump Indonesia ")),
            Some("pt ujump indonesia".to_string())
        );
        assert_eq!(ValueNormalizer::normalize_text(&Cell::from("  ")), None);
    }

    #[test]
    fn test_round_half_away_from_zero() {
        assert_eq!(ValueNormalizer::round_to(0.0455, 3), 0.046);
        assert_eq!(ValueNormalizer::round_to(-0.0455, 3), -0.046);
        assert_eq!(ValueNormalizer::round_to(1.005, 2), 1.01);
        assert_eq!(ValueNormalizer::round_to(0.051, 3), 0.051);
        assert_eq!(ValueNormalizer::round_to(2.5, 0), 3.0);
    }

    #[test]
    fn test_round_oversized_decimals_stays_finite() {
        assert!(approx(ValueNormalizer::round_to(0.05, 400), 0.05));
        assert!(approx(ValueNormalizer::round_to(1.25, u32::MAX), 1.25));
    }
}
