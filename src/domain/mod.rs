// ==========================================
// 成本分解表校验 - 领域模型层
// ==========================================
// 职责: 单元格、网格、规则表、校验结果
// 红线: 不含 IO，不含判定逻辑
// ==========================================

pub mod cell;
pub mod grid;
pub mod result;
pub mod rule;

// 重导出核心类型
pub use cell::{format_number, Cell, NormalizedValue};
pub use grid::{
    column_letter_to_index, index_to_column_letter, CellAddress, ColumnRef, Grid, Sheet, Workbook,
};
pub use result::{
    BatchReport, BatchTotals, FieldResult, FileOutcome, Reason, RowRange, RunSummary,
    SectionResult, ValidationRun, Verdict, EMPTY_DISPLAY,
};
pub use rule::{
    CellRule, Check, Expected, FieldRule, ItemRule, MarkerMatch, MatchMode, RuleSet, SectionRule,
    SheetScope,
};
