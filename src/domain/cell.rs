// ==========================================
// 成本分解表校验 - 单元格领域模型
// ==========================================
// 职责: 表格单元格原始值 + 归一化后的可比较值
// 红线: 同一逻辑字段在不同买方文件中类型不固定
//       (0.05 / "5%" / "5")，不得假设单元格类型
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// Cell - 单元格原始值
// ==========================================
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Cell {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
}

impl Cell {
    /// 空单元格判定（空白字符串同样视为空）
    pub fn is_empty(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// 以文本形式读取（数值按最短表示输出）
    pub fn as_text(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Text(s) => s.clone(),
            Cell::Number(n) => format_number(*n),
            Cell::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_text())
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::Text(value)
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

impl From<bool> for Cell {
    fn from(value: bool) -> Self {
        Cell::Bool(value)
    }
}

// ==========================================
// NormalizedValue - 归一化后的值
// ==========================================
// 用途: FieldResult 中展示归一化结果，便于对照
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum NormalizedValue {
    Text(String),
    Number(f64),
    Bool(bool),
}

impl NormalizedValue {
    /// 回写为单元格（用于幂等性校验）
    pub fn to_cell(&self) -> Cell {
        match self {
            NormalizedValue::Text(s) => Cell::Text(s.clone()),
            NormalizedValue::Number(n) => Cell::Number(*n),
            NormalizedValue::Bool(b) => Cell::Bool(*b),
        }
    }
}

impl fmt::Display for NormalizedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NormalizedValue::Text(s) => f.write_str(s),
            NormalizedValue::Number(n) => f.write_str(&format_number(*n)),
            NormalizedValue::Bool(b) => f.write_str(if *b { "TRUE" } else { "FALSE" }),
        }
    }
}

/// 数值展示：整数不带小数点，其余去掉尾部多余的 0
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        let s = format!("{:.6}", value);
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}
