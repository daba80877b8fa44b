// ==========================================
// 成本分解表校验 - 规则表模型
// ==========================================
// 职责: SectionRule / FieldRule / CellRule / RuleSet 定义
// 红线: 品牌差异只以数据(规则表)表达，不以继承表达
//       规则表可 JSON 序列化（列写字母，地址写 A1）
// ==========================================

use crate::domain::cell::format_number;
use crate::domain::grid::{CellAddress, ColumnRef};
use serde::{Deserialize, Serialize};

// ==========================================
// MatchMode / MarkerMatch - 标记匹配谓词
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    Exact,    // 全等
    Prefix,   // 前缀
    Contains, // 子串
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkerMatch {
    pub text: String,
    pub mode: MatchMode,
}

impl MarkerMatch {
    pub fn exact(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            mode: MatchMode::Exact,
        }
    }

    pub fn prefix(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            mode: MatchMode::Prefix,
        }
    }

    pub fn contains(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            mode: MatchMode::Contains,
        }
    }

    /// 判定单元格文本是否命中（两侧均 trim + 小写）
    pub fn matches(&self, value: &str) -> bool {
        let value = value.trim().to_lowercase();
        let marker = self.text.trim().to_lowercase();
        if value.is_empty() || marker.is_empty() {
            return false;
        }
        match self.mode {
            MatchMode::Exact => value == marker,
            MatchMode::Prefix => value.starts_with(&marker),
            MatchMode::Contains => value.contains(&marker),
        }
    }
}

// ==========================================
// Expected - 期望值
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Expected {
    /// 文本（忽略大小写与首尾空白）
    Text { value: String },
    /// 取值集合之一（供应商清单等）
    OneOf { values: Vec<String> },
    /// 数值（按精度取整后比较，tolerance 为绝对容差）
    Number {
        value: f64,
        #[serde(default)]
        tolerance: f64,
    },
    /// 百分比（percent=5 表示 5%，比较时统一为小数 0.05）
    Percentage { percent: f64 },
    /// 布尔（TRUE/FALSE 文本或原生布尔）
    Boolean { value: bool },
    /// 闭区间 [min, max]；percentage=true 时按百分比归一化实际值
    Range {
        min: f64,
        max: f64,
        #[serde(default)]
        percentage: bool,
    },
}

impl Expected {
    pub fn text(value: impl Into<String>) -> Self {
        Expected::Text {
            value: value.into(),
        }
    }

    pub fn number(value: f64) -> Self {
        Expected::Number {
            value,
            tolerance: 0.0,
        }
    }

    pub fn percent(percent: f64) -> Self {
        Expected::Percentage { percent }
    }

    pub fn one_of<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Expected::OneOf {
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// 只有数值类规则允许 WARNING
    pub fn supports_warning(&self) -> bool {
        matches!(self, Expected::Number { .. } | Expected::Percentage { .. })
    }

    /// 展示用期望值
    pub fn describe(&self) -> String {
        match self {
            Expected::Text { value } => value.clone(),
            Expected::OneOf { values } => values.join(" | "),
            Expected::Number { value, tolerance } => {
                if *tolerance > 0.0 {
                    format!("{} ± {}", format_number(*value), format_number(*tolerance))
                } else {
                    format_number(*value)
                }
            }
            Expected::Percentage { percent } => format!("{}%", format_number(*percent)),
            Expected::Boolean { value } => if *value { "TRUE" } else { "FALSE" }.to_string(),
            Expected::Range {
                min,
                max,
                percentage,
            } => {
                if *percentage {
                    format!(
                        "{}% - {}%",
                        format_number(min * 100.0),
                        format_number(max * 100.0)
                    )
                } else {
                    format!("{} - {}", format_number(*min), format_number(*max))
                }
            }
        }
    }
}

/// 比较精度上限（f64 有效位数）
pub const MAX_DECIMALS: u32 = 15;

// ==========================================
// Check - 单项校验（标签 + 期望 + 精度 + 轻微差异）
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Check {
    pub label: String,
    pub expected: Expected,
    /// 比较精度（小数位），缺省取配置默认值
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decimals: Option<u32>,
    /// 轻微差异：|实际-期望| 恰好等于该值时判 WARNING
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minor_difference: Option<f64>,
}

impl Check {
    pub fn new(label: impl Into<String>, expected: Expected) -> Self {
        Self {
            label: label.into(),
            expected,
            decimals: None,
            minor_difference: None,
        }
    }
}

// ==========================================
// FieldRule - 区段内按列校验
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldRule {
    pub column: ColumnRef,
    #[serde(flatten)]
    pub check: Check,
}

impl FieldRule {
    pub fn new(column: ColumnRef, label: impl Into<String>, expected: Expected) -> Self {
        Self {
            column,
            check: Check::new(label, expected),
        }
    }

    pub fn decimals(mut self, decimals: u32) -> Self {
        self.check.decimals = Some(decimals);
        self
    }

    pub fn warn_on(mut self, epsilon: f64) -> Self {
        self.check.minor_difference = Some(epsilon);
        self
    }
}

// ==========================================
// CellRule - 不依赖区段的固定单元格校验
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellRule {
    pub address: CellAddress,
    /// 目标 sheet；缺省为作用域内第一个 sheet
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sheet: Option<String>,
    #[serde(flatten)]
    pub check: Check,
}

impl CellRule {
    pub fn new(address: CellAddress, label: impl Into<String>, expected: Expected) -> Self {
        Self {
            address,
            sheet: None,
            check: Check::new(label, expected),
        }
    }

    pub fn on_sheet(mut self, sheet: impl Into<String>) -> Self {
        self.sheet = Some(sheet.into());
        self
    }

    pub fn decimals(mut self, decimals: u32) -> Self {
        self.check.decimals = Some(decimals);
        self
    }

    pub fn warn_on(mut self, epsilon: f64) -> Self {
        self.check.minor_difference = Some(epsilon);
        self
    }
}

// ==========================================
// ItemRule - 区段内特定条目的附加校验
// ==========================================
// 例: Trims 区段中 "Sewing Thread" 行额外校验单价
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemRule {
    pub item: MarkerMatch,
    pub fields: Vec<FieldRule>,
}

impl ItemRule {
    pub fn new(item: MarkerMatch) -> Self {
        Self {
            item,
            fields: Vec::new(),
        }
    }

    pub fn field(mut self, field: FieldRule) -> Self {
        self.fields.push(field);
        self
    }
}

// ==========================================
// SectionRule - 区段定位 + 区段内列规则
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionRule {
    pub name: String,
    /// 扫描标记的列（通常 A 或 B）
    pub marker_column: ColumnRef,
    pub start: MarkerMatch,
    pub end: MarkerMatch,
    /// 条目名称所在列（用于展示与 ItemRule 匹配）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_column: Option<ColumnRef>,
    #[serde(default)]
    pub fields: Vec<FieldRule>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<ItemRule>,
    /// 起始标记可与上一区段的结束标记同行
    #[serde(default)]
    pub starts_at_previous_end: bool,
}

impl SectionRule {
    pub fn new(
        name: impl Into<String>,
        marker_column: ColumnRef,
        start: MarkerMatch,
        end: MarkerMatch,
    ) -> Self {
        Self {
            name: name.into(),
            marker_column,
            start,
            end,
            label_column: None,
            fields: Vec::new(),
            items: Vec::new(),
            starts_at_previous_end: false,
        }
    }

    pub fn label_column(mut self, column: ColumnRef) -> Self {
        self.label_column = Some(column);
        self
    }

    pub fn field(mut self, field: FieldRule) -> Self {
        self.fields.push(field);
        self
    }

    pub fn item(mut self, item: ItemRule) -> Self {
        self.items.push(item);
        self
    }

    pub fn starts_at_previous_end(mut self) -> Self {
        self.starts_at_previous_end = true;
        self
    }
}

// ==========================================
// SheetScope - 规则作用的 sheet 范围
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SheetScope {
    #[default]
    First,
    Last,
    /// 每个 sheet 独立扫描
    All,
    Named(String),
}

// ==========================================
// RuleSet - 品牌规则表
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleSet {
    pub brand: String,
    #[serde(default)]
    pub sheet_scope: SheetScope,
    #[serde(default)]
    pub sections: Vec<SectionRule>,
    #[serde(default)]
    pub cells: Vec<CellRule>,
}

impl RuleSet {
    pub fn new(brand: impl Into<String>) -> Self {
        Self {
            brand: brand.into(),
            sheet_scope: SheetScope::First,
            sections: Vec::new(),
            cells: Vec::new(),
        }
    }

    pub fn scope(mut self, scope: SheetScope) -> Self {
        self.sheet_scope = scope;
        self
    }

    pub fn section(mut self, section: SectionRule) -> Self {
        self.sections.push(section);
        self
    }

    pub fn cell(mut self, cell: CellRule) -> Self {
        self.cells.push(cell);
        self
    }

    /// 规则表自检，返回全部问题描述
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut problems = Vec::new();

        if self.brand.trim().is_empty() {
            problems.push("品牌名称为空".to_string());
        }
        if self.sections.is_empty() && self.cells.is_empty() {
            problems.push(format!("{}: 规则表没有任何区段或单元格规则", self.brand));
        }

        for section in &self.sections {
            if section.start.text.trim().is_empty() || section.end.text.trim().is_empty() {
                problems.push(format!("区段 {}: 起止标记不能为空", section.name));
            }
            let item_fields = section.items.iter().flat_map(|i| i.fields.iter());
            for field in section.fields.iter().chain(item_fields) {
                let context = format!("{}/{}", section.name, field.check.label);
                check_problems(&context, &field.check, &mut problems);
            }
        }
        for cell in &self.cells {
            let context = format!("{}/{}", cell.address, cell.check.label);
            check_problems(&context, &cell.check, &mut problems);
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(problems)
        }
    }
}

fn check_problems(context: &str, check: &Check, problems: &mut Vec<String>) {
    if let Expected::Range { min, max, .. } = check.expected {
        if min > max {
            problems.push(format!("{}: 区间下限 {} 大于上限 {}", context, min, max));
        }
    }
    if let Expected::OneOf { values } = &check.expected {
        if values.is_empty() {
            problems.push(format!("{}: 取值集合为空", context));
        }
    }
    if let Some(decimals) = check.decimals {
        if decimals > MAX_DECIMALS {
            problems.push(format!(
                "{}: 小数位 {} 超出上限 {}",
                context, decimals, MAX_DECIMALS
            ));
        }
    }
    if let Some(eps) = check.minor_difference {
        if !check.expected.supports_warning() {
            problems.push(format!("{}: 只有数值类规则可以配置轻微差异", context));
        } else if eps.is_nan() || eps <= 0.0 {
            problems.push(format!("{}: 轻微差异必须大于 0", context));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn col(letters: &str) -> ColumnRef {
        ColumnRef::parse(letters).unwrap()
    }

    #[test]
    fn test_marker_modes() {
        assert!(MarkerMatch::exact("fabrics").matches("  FABRICS "));
        assert!(!MarkerMatch::exact("fabrics").matches("fabrics total"));
        assert!(MarkerMatch::prefix("Trims (").matches("TRIMS (per garment)"));
        assert!(!MarkerMatch::prefix("Trims (").matches("Total Trims ("));
        assert!(MarkerMatch::contains("FABRIC TOTAL").matches("Sub fabric total:"));
        assert!(!MarkerMatch::contains("x").matches("   "));
    }

    #[test]
    fn test_expected_describe() {
        assert_eq!(Expected::percent(5.0).describe(), "5%");
        assert_eq!(Expected::number(0.35).describe(), "0.35");
        assert_eq!(
            Expected::Range {
                min: 0.2,
                max: 0.35,
                percentage: true
            }
            .describe(),
            "20% - 35%"
        );
        assert_eq!(Expected::Boolean { value: true }.describe(), "TRUE");
    }

    #[test]
    fn test_rule_set_json_shape() {
        let json = r#"{
            "brand": "Custom",
            "sheet_scope": "all",
            "sections": [{
                "name": "Fabrics",
                "marker_column": "A",
                "start": {"text": "fabrics", "mode": "exact"},
                "end": {"text": "FABRIC TOTAL", "mode": "contains"},
                "fields": [{
                    "column": "Q",
                    "label": "Wastage",
                    "expected": {"type": "percentage", "percent": 5},
                    "minor_difference": 0.001
                }]
            }],
            "cells": [{
                "address": "E7",
                "label": "Factory",
                "expected": {"type": "text", "value": "PT Ujump Indonesia"}
            }]
        }"#;

        let rules: RuleSet = serde_json::from_str(json).unwrap();
        assert_eq!(rules.sheet_scope, SheetScope::All);
        assert_eq!(rules.sections[0].fields[0].column, col("Q"));
        assert_eq!(rules.sections[0].fields[0].check.minor_difference, Some(0.001));
        assert_eq!(rules.cells[0].address.to_a1(), "E7");
        assert!(rules.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_warning_on_text_rule() {
        let rules = RuleSet::new("Bad").cell(
            CellRule::new(CellAddress::new(0, 0), "Currency", Expected::text("USD")).warn_on(0.001),
        );
        let problems = rules.validate().unwrap_err();
        assert_eq!(problems.len(), 1);
    }

    #[test]
    fn test_validate_rejects_inverted_range() {
        let rules = RuleSet::new("Bad").section(
            SectionRule::new(
                "Margins",
                col("A"),
                MarkerMatch::exact("margin"),
                MarkerMatch::contains("total"),
            )
            .field(FieldRule::new(
                col("C"),
                "Margin",
                Expected::Range {
                    min: 0.5,
                    max: 0.1,
                    percentage: true,
                },
            )),
        );
        assert!(rules.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_oversized_decimals() {
        let rules = RuleSet::new("Bad").cell(
            CellRule::new(CellAddress::new(0, 0), "Price", Expected::number(0.35)).decimals(400),
        );
        let problems = rules.validate().unwrap_err();
        assert_eq!(problems.len(), 1);
        assert!(problems[0].contains("400"));

        let ok = RuleSet::new("Ok").cell(
            CellRule::new(CellAddress::new(0, 0), "Price", Expected::number(0.35))
                .decimals(MAX_DECIMALS),
        );
        assert!(ok.validate().is_ok());
    }
}
