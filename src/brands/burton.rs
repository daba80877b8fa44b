// ==========================================
// Burton - 成本分解表规则
// ==========================================
// 版式: 首个 sheet；A 列为区段标记，B 列为条目名称
// 区段: Fabrics → Trims → Packaging → Labels（按顺序链式定位）
// 附加: Trims 区段 "Sewing Thread" 行校验单价
// ==========================================

use super::{addr, col, BrandContext, BuiltinBrand};
use crate::domain::rule::{
    CellRule, Expected, FieldRule, ItemRule, MarkerMatch, RuleSet, SectionRule, SheetScope,
};
use crate::importer::error::ImportResult;

pub fn rules(context: &BrandContext<'_>) -> ImportResult<RuleSet> {
    let eps = context.epsilon;
    let marker = col("A")?;
    let label = col("B")?;
    let wastage = col("Q")?;

    let section = |name: &str, start: MarkerMatch, end: MarkerMatch, percent: f64| {
        SectionRule::new(name, marker, start, end)
            .label_column(label)
            .field(FieldRule::new(wastage, "Wastage", Expected::percent(percent)).warn_on(eps))
    };

    Ok(RuleSet::new(BuiltinBrand::Burton.title())
        .scope(SheetScope::First)
        .cell(CellRule::new(addr("C4")?, "Currency", Expected::text("USD")))
        .section(section(
            "Fabrics",
            MarkerMatch::exact("fabrics"),
            MarkerMatch::contains("fabric total"),
            5.0,
        ))
        .section(
            section(
                "Trims",
                MarkerMatch::prefix("trims ("),
                MarkerMatch::contains("trims total"),
                3.0,
            )
            .item(
                ItemRule::new(MarkerMatch::contains("sewing thread")).field(
                    FieldRule::new(col("P")?, "Unit Price", Expected::number(0.35)).decimals(2),
                ),
            ),
        )
        .section(section(
            "Packaging",
            MarkerMatch::exact("packaging"),
            MarkerMatch::contains("packaging total"),
            3.0,
        ))
        .section(section(
            "Labels",
            MarkerMatch::exact("labels"),
            MarkerMatch::contains("labels total"),
            2.0,
        )))
}
