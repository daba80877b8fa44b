// ==========================================
// Ride Store - 成本分解表规则
// ==========================================
// 版式: 一个款式一个 sheet，每个 sheet 独立扫描
// ==========================================

use super::{col, BrandContext, BuiltinBrand};
use crate::domain::rule::{Expected, FieldRule, MarkerMatch, RuleSet, SectionRule, SheetScope};
use crate::importer::error::ImportResult;

pub fn rules(context: &BrandContext<'_>) -> ImportResult<RuleSet> {
    let marker = col("A")?;
    let wastage = col("Q")?;

    Ok(RuleSet::new(BuiltinBrand::RideStore.title())
        .scope(SheetScope::All)
        .section(
            SectionRule::new(
                "Fabric",
                marker,
                MarkerMatch::exact("fabric"),
                MarkerMatch::contains("total"),
            )
            .field(
                FieldRule::new(wastage, "Wastage", Expected::percent(5.0))
                    .warn_on(context.epsilon),
            ),
        )
        .section(
            SectionRule::new(
                "Trims",
                marker,
                MarkerMatch::prefix("trim"),
                MarkerMatch::contains("total"),
            )
            .field(
                FieldRule::new(wastage, "Wastage", Expected::percent(3.0))
                    .warn_on(context.epsilon),
            ),
        ))
}
