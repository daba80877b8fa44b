// ==========================================
// Prana - 成本分解表规则
// ==========================================
// 期望值来自参考数据 prana.csv（Label,Value）
// 必填: Factory / Currency / Fabric Wastage / Trim Wastage
// ==========================================

use super::{addr, col, required_percent, required_value, BrandContext, BuiltinBrand};
use crate::domain::rule::{CellRule, Expected, FieldRule, MarkerMatch, RuleSet, SectionRule};
use crate::importer::error::ImportResult;

pub const REFERENCE_FILE: &str = "prana.csv";

pub fn rules(context: &BrandContext<'_>) -> ImportResult<RuleSet> {
    let brand = BuiltinBrand::Prana.title();
    let reference = context.load_reference(brand, REFERENCE_FILE)?;

    let factory = required_value(brand, &reference, "Factory")?;
    let currency = required_value(brand, &reference, "Currency")?;
    let fabric_wastage = required_percent(brand, &reference, "Fabric Wastage")?;
    let trim_wastage = required_percent(brand, &reference, "Trim Wastage")?;

    let marker = col("A")?;
    let wastage = col("O")?;

    Ok(RuleSet::new(brand)
        .cell(CellRule::new(addr("C5")?, "Factory", Expected::text(factory)))
        .cell(CellRule::new(addr("C6")?, "Currency", Expected::text(currency)))
        .section(
            SectionRule::new(
                "Fabrics",
                marker,
                MarkerMatch::exact("fabrics"),
                MarkerMatch::contains("total fabrics"),
            )
            .field(
                FieldRule::new(wastage, "Wastage", Expected::percent(fabric_wastage))
                    .warn_on(context.epsilon),
            ),
        )
        .section(
            SectionRule::new(
                "Trims",
                marker,
                MarkerMatch::exact("trims"),
                MarkerMatch::contains("total trims"),
            )
            .field(
                FieldRule::new(wastage, "Wastage", Expected::percent(trim_wastage))
                    .warn_on(context.epsilon),
            ),
        ))
}
