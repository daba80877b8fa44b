// ==========================================
// 成本分解表校验 - 校验执行器 (ValidationRunner)
// ==========================================
// 职责: 单文件校验编排
// 流程: 选 sheet → 链式定位区段 → 逐行取值 → 归一化 + 判定 → 汇总
// 红线: 区段未找到不终止本次校验，兄弟区段照常执行
//       目标列全部为空的行跳过（不计失败）
//       网格只读，不缓存，不跨文件共享状态
// ==========================================

use crate::domain::grid::{CellAddress, Grid, Sheet, Workbook};
use crate::domain::result::{FieldResult, RunSummary, SectionResult, ValidationRun};
use crate::domain::rule::{CellRule, Check, FieldRule, RuleSet, SectionRule, SheetScope};
use crate::engine::evaluator::{EvaluatorSettings, RuleEvaluator};
use crate::engine::locator::{SectionLocation, SectionLocator};
use chrono::Utc;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;


/// 工作簿为单网格时使用的 sheet 名称
const DEFAULT_SHEET_NAME: &str = "Sheet1";

// ==========================================
// ValidationRunner
// ==========================================
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidationRunner {
    evaluator: RuleEvaluator,
}

impl ValidationRunner {
    pub fn new(settings: EvaluatorSettings) -> Self {
        Self {
            evaluator: RuleEvaluator::new(settings),
        }
    }

    /// 校验整个工作簿
    ///
    /// # 参数
    /// - file_name: 上传文件名（仅用于输出）
    /// - workbook: 已解析的工作簿
    /// - rules: 品牌规则表
    ///
    /// # 返回
    /// - ValidationRun: 区段结果 + 固定单元格结果 + 汇总
    #[instrument(skip(self, workbook, rules), fields(brand = %rules.brand))]
    pub fn run(&self, file_name: &str, workbook: &Workbook, rules: &RuleSet) -> ValidationRun {
        let started_at = Utc::now();
        let timer = Instant::now();

        let in_scope = sheets_in_scope(workbook, &rules.sheet_scope);
        debug!(
            sheets = ?in_scope.iter().map(|s| s.name.as_str()).collect::<Vec<_>>(),
            "作用域内 sheet"
        );

        let mut sections = Vec::new();
        if in_scope.is_empty() {
            let missing = scope_label(&rules.sheet_scope);
            warn!(scope = %missing, "作用域内没有可用的 sheet");
            sections.extend(
                rules
                    .sections
                    .iter()
                    .map(|rule| SectionResult::not_found(&rule.name, &missing)),
            );
        }
        for sheet in &in_scope {
            sections.extend(self.evaluate_sections(&sheet.name, &sheet.grid, &rules.sections));
        }

        let default_sheet = in_scope.first().copied();
        let cell_results: Vec<FieldResult> = rules
            .cells
            .iter()
            .map(|rule| self.evaluate_cell_rule(workbook, default_sheet, rule))
            .collect();

        self.finish(file_name, &rules.brand, started_at, timer, sections, cell_results)
    }

    /// 校验单个网格（不区分 sheet 作用域）
    pub fn run_grid(&self, file_name: &str, grid: &Grid, rules: &RuleSet) -> ValidationRun {
        let started_at = Utc::now();
        let timer = Instant::now();

        let sections = self.evaluate_sections(DEFAULT_SHEET_NAME, grid, &rules.sections);
        let cell_results = rules
            .cells
            .iter()
            .map(|rule| self.evaluate_cell(DEFAULT_SHEET_NAME, grid, rule))
            .collect();

        self.finish(file_name, &rules.brand, started_at, timer, sections, cell_results)
    }

    /// 单个 sheet 内按声明顺序链式校验全部区段
    pub fn evaluate_sections(
        &self,
        sheet_name: &str,
        grid: &Grid,
        rules: &[SectionRule],
    ) -> Vec<SectionResult> {
        let locations = SectionLocator::locate_chain(grid, rules);
        rules
            .iter()
            .zip(locations)
            .map(|(rule, location)| self.evaluate_section(sheet_name, grid, rule, location))
            .collect()
    }

    fn evaluate_section(
        &self,
        sheet_name: &str,
        grid: &Grid,
        rule: &SectionRule,
        location: SectionLocation,
    ) -> SectionResult {
        let Some(data_rows) = location.data_rows() else {
            if location.start_row.is_some() {
                warn!(
                    sheet = %sheet_name,
                    section = %rule.name,
                    start_row = ?location.start_row.map(|r| r + 1),
                    "区段缺少结束标记"
                );
            } else {
                warn!(sheet = %sheet_name, section = %rule.name, "区段未找到");
            }
            return SectionResult {
                start_marker_row: location.start_row.map(|r| r + 1),
                ..SectionResult::not_found(&rule.name, sheet_name)
            };
        };

        let label_column = rule.label_column.unwrap_or(rule.marker_column).index();
        let mut field_results = Vec::new();

        for row in data_rows {
            let label_text = grid.cell(row, label_column).as_text();
            let item = Some(label_text.trim().to_string()).filter(|s| !s.is_empty());

            let applicable: Vec<&FieldRule> = rule
                .fields
                .iter()
                .chain(
                    rule.items
                        .iter()
                        .filter(|i| i.item.matches(&label_text))
                        .flat_map(|i| i.fields.iter()),
                )
                .collect();

            let carries_value = applicable
                .iter()
                .any(|f| !grid.cell(row, f.column.index()).is_empty());
            if !carries_value {
                continue;
            }

            for field in applicable {
                let address = CellAddress::new(row, field.column.index());
                let mut result =
                    self.field_result(sheet_name, grid, address, &field.check, Some(&rule.name));
                result.item = item.clone();
                field_results.push(result);
            }
        }

        debug!(
            sheet = %sheet_name,
            section = %rule.name,
            fields = field_results.len(),
            "区段校验完成"
        );

        SectionResult {
            name: rule.name.clone(),
            sheet: sheet_name.to_string(),
            found: true,
            start_marker_row: location.start_row.map(|r| r + 1),
            row_range: location.display_range(),
            field_results,
        }
    }

    fn evaluate_cell_rule(
        &self,
        workbook: &Workbook,
        default_sheet: Option<&Sheet>,
        rule: &CellRule,
    ) -> FieldResult {
        let target = match &rule.sheet {
            Some(name) => workbook.sheet(name),
            None => default_sheet,
        };
        match target {
            Some(sheet) => self.evaluate_cell(&sheet.name, &sheet.grid, rule),
            None => {
                // sheet 不存在时按空单元格判定
                let name = rule.sheet.as_deref().unwrap_or(DEFAULT_SHEET_NAME);
                self.evaluate_cell(name, &Grid::default(), rule)
            }
        }
    }

    fn evaluate_cell(&self, sheet_name: &str, grid: &Grid, rule: &CellRule) -> FieldResult {
        self.field_result(sheet_name, grid, rule.address, &rule.check, None)
    }

    fn field_result(
        &self,
        sheet_name: &str,
        grid: &Grid,
        address: CellAddress,
        check: &Check,
        section: Option<&str>,
    ) -> FieldResult {
        let evaluation = self.evaluator.evaluate(grid.cell_at(address), check);
        FieldResult {
            sheet: sheet_name.to_string(),
            section: section.map(str::to_string),
            label: check.label.clone(),
            item: None,
            address: address.to_a1(),
            raw_actual: evaluation.raw_actual,
            normalized_actual: evaluation.normalized_actual,
            expected: evaluation.expected,
            verdict: evaluation.verdict,
            reason: evaluation.reason,
        }
    }

    fn finish(
        &self,
        file_name: &str,
        brand: &str,
        started_at: chrono::DateTime<Utc>,
        timer: Instant,
        sections: Vec<SectionResult>,
        cell_results: Vec<FieldResult>,
    ) -> ValidationRun {
        let summary = RunSummary::from_results(&sections, &cell_results);
        let elapsed_ms = timer.elapsed().as_millis() as i64;

        info!(
            file = %file_name,
            valid = summary.valid,
            invalid = summary.invalid,
            warning = summary.warning,
            sections_found = summary.sections_found,
            sections_not_found = summary.sections_not_found,
            elapsed_ms,
            "文件校验完成"
        );

        ValidationRun {
            run_id: Uuid::new_v4().to_string(),
            file_name: file_name.to_string(),
            brand: brand.to_string(),
            started_at,
            elapsed_ms,
            sections,
            cell_results,
            summary,
        }
    }
}

/// 规则作用域内的 sheet（按工作簿顺序）
pub fn sheets_in_scope<'a>(workbook: &'a Workbook, scope: &SheetScope) -> Vec<&'a Sheet> {
    match scope {
        SheetScope::First => workbook.first().into_iter().collect(),
        SheetScope::Last => workbook.last().into_iter().collect(),
        SheetScope::All => workbook.sheets().iter().collect(),
        SheetScope::Named(name) => workbook.sheet(name).into_iter().collect(),
    }
}

fn scope_label(scope: &SheetScope) -> String {
    match scope {
        SheetScope::Named(name) => name.clone(),
        _ => DEFAULT_SHEET_NAME.to_string(),
    }
}
