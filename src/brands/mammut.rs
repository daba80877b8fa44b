// ==========================================
// Mammut - 成本分解表规则
// ==========================================
// 版式: 首个 sheet；表头为固定单元格（工厂、币种、关税、毛利）
// 区段: B 列 "Material" ~ "Material Total"，K 列为损耗
// ==========================================

use super::{addr, col, BrandContext, BuiltinBrand};
use crate::domain::rule::{CellRule, Expected, FieldRule, MarkerMatch, RuleSet, SectionRule};
use crate::importer::error::ImportResult;

pub const FACTORY_NAME: &str = "PT Ujump Indonesia";

pub fn rules(context: &BrandContext<'_>) -> ImportResult<RuleSet> {
    Ok(RuleSet::new(BuiltinBrand::Mammut.title())
        .cell(CellRule::new(addr("D7")?, "Factory Label", Expected::text("FACTORY")))
        .cell(CellRule::new(addr("E7")?, "Factory", Expected::text(FACTORY_NAME)))
        .cell(CellRule::new(addr("E9")?, "Currency", Expected::text("USD")))
        .cell(
            CellRule::new(addr("E11")?, "Duty", Expected::percent(10.0))
                .warn_on(context.epsilon),
        )
        .cell(CellRule::new(
            addr("E13")?,
            "Margin",
            Expected::Range {
                min: 0.20,
                max: 0.35,
                percentage: true,
            },
        ))
        .section(
            SectionRule::new(
                "Material",
                col("B")?,
                MarkerMatch::exact("material"),
                MarkerMatch::contains("material total"),
            )
            .label_column(col("C")?)
            .field(
                FieldRule::new(col("K")?, "Wastage", Expected::percent(3.0))
                    .warn_on(context.epsilon),
            ),
        ))
}
