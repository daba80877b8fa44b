// ==========================================
// Foot Asylum - 成本分解表规则
// ==========================================
// 供应商必须在认可清单中（foot_asylum_suppliers.csv: Code,Supplier）
// 供应商名称常含逗号（"Co, Ltd"），由参考数据加载器折叠回同一列
// ==========================================

use super::{addr, col, BrandContext, BuiltinBrand};
use crate::domain::rule::{CellRule, Expected, FieldRule, MarkerMatch, RuleSet, SectionRule};
use crate::importer::error::{ImportError, ImportResult};

pub const REFERENCE_FILE: &str = "foot_asylum_suppliers.csv";

pub fn rules(context: &BrandContext<'_>) -> ImportResult<RuleSet> {
    let brand = BuiltinBrand::FootAsylum.title();
    let reference = context.load_reference(brand, REFERENCE_FILE)?;

    let suppliers: Vec<String> = reference
        .column(1)
        .into_iter()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();
    if suppliers.is_empty() {
        return Err(ImportError::MissingReferenceData {
            brand: brand.to_string(),
            reason: format!("{} 没有供应商", REFERENCE_FILE),
        });
    }

    Ok(RuleSet::new(brand)
        .cell(CellRule::new(addr("B4")?, "Supplier", Expected::one_of(suppliers)))
        .cell(CellRule::new(
            addr("F30")?,
            "Margin",
            Expected::Range {
                min: 0.25,
                max: 0.45,
                percentage: true,
            },
        ))
        .section(
            SectionRule::new(
                "Components",
                col("A")?,
                MarkerMatch::contains("component"),
                MarkerMatch::contains("total"),
            )
            .label_column(col("B")?)
            .field(
                FieldRule::new(col("H")?, "Wastage", Expected::percent(4.0))
                    .warn_on(context.epsilon),
            ),
        ))
}
