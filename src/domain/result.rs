// ==========================================
// 成本分解表校验 - 校验结果模型
// ==========================================
// 职责: FieldResult / SectionResult / ValidationRun / BatchReport
// 红线: 结果为结构化值，不含 HTML；报表层只消费该结构
//       Verdict 仅三态，WARNING 只来自配置了轻微差异的规则
// ==========================================

use crate::domain::cell::NormalizedValue;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 空单元格的展示值
pub const EMPTY_DISPLAY: &str = "Empty";

// ==========================================
// Verdict - 判定结果
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    Valid,
    Invalid,
    Warning,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Valid => "VALID",
            Verdict::Invalid => "INVALID",
            Verdict::Warning => "WARNING",
        }
    }
}

// ==========================================
// Reason - 非 VALID 判定的原因
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reason {
    Empty,           // 单元格为空
    Unparseable,     // 无法归一化为期望类型
    Mismatch,        // 与期望值不一致
    MinorDifference, // 恰好等于轻微差异
    OutOfRange,      // 超出区间
    NotInList,       // 不在取值集合中
}

impl Reason {
    /// i18n 键
    pub fn message_key(&self) -> &'static str {
        match self {
            Reason::Empty => "reason.empty",
            Reason::Unparseable => "reason.unparseable",
            Reason::Mismatch => "reason.mismatch",
            Reason::MinorDifference => "reason.minor_difference",
            Reason::OutOfRange => "reason.out_of_range",
            Reason::NotInList => "reason.not_in_list",
        }
    }
}

// ==========================================
// FieldResult - 单个单元格的校验结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldResult {
    pub sheet: String,                             // sheet 名称
    pub section: Option<String>,                   // 所属区段（固定单元格规则为 None）
    pub label: String,                             // 规则标签
    pub item: Option<String>,                      // 条目名称（区段标签列）
    pub address: String,                           // 展示地址，如 "Q14"
    pub raw_actual: String,                        // 原始值（空单元格为 "Empty"）
    pub normalized_actual: Option<NormalizedValue>, // 归一化值（无法归一化为 None）
    pub expected: String,                          // 期望值展示
    pub verdict: Verdict,
    pub reason: Option<Reason>,                    // 非 VALID 时的原因
}

impl FieldResult {
    pub fn is_valid(&self) -> bool {
        self.verdict == Verdict::Valid
    }
}

// ==========================================
// RowRange - 区段数据行范围
// ==========================================
// 1 基展示口径：start 含（首个数据行），end 不含（结束标记行）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowRange {
    pub start: usize,
    pub end: usize,
}

impl RowRange {
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ==========================================
// SectionResult - 单个区段的校验结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionResult {
    pub name: String,
    pub sheet: String,
    pub found: bool,
    /// 起始标记行（1 基）；结束标记缺失时仍保留，用于提示截断
    pub start_marker_row: Option<usize>,
    /// 仅 found=true 时存在
    pub row_range: Option<RowRange>,
    pub field_results: Vec<FieldResult>,
}

impl SectionResult {
    pub fn not_found(name: impl Into<String>, sheet: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sheet: sheet.into(),
            found: false,
            start_marker_row: None,
            row_range: None,
            field_results: Vec::new(),
        }
    }

    /// 起始标记命中但结束标记缺失
    pub fn is_truncated(&self) -> bool {
        !self.found && self.start_marker_row.is_some()
    }
}

// ==========================================
// RunSummary - 单文件汇总
// ==========================================
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub valid: usize,
    pub invalid: usize,
    pub warning: usize,
    pub sections_found: usize,
    pub sections_not_found: usize,
}

impl RunSummary {
    pub fn from_results(sections: &[SectionResult], cells: &[FieldResult]) -> Self {
        let mut summary = RunSummary::default();

        for section in sections {
            if section.found {
                summary.sections_found += 1;
            } else {
                summary.sections_not_found += 1;
            }
        }

        let fields = sections
            .iter()
            .flat_map(|s| s.field_results.iter())
            .chain(cells.iter());
        for field in fields {
            match field.verdict {
                Verdict::Valid => summary.valid += 1,
                Verdict::Invalid => summary.invalid += 1,
                Verdict::Warning => summary.warning += 1,
            }
        }

        summary
    }

    pub fn total_fields(&self) -> usize {
        self.valid + self.invalid + self.warning
    }

    pub fn all_sections_found(&self) -> bool {
        self.sections_not_found == 0
    }

    /// 无 INVALID 且所有区段均已定位
    pub fn passed(&self) -> bool {
        self.invalid == 0 && self.all_sections_found()
    }
}

// ==========================================
// ValidationRun - 单个上传文件的完整输出
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationRun {
    pub run_id: String,
    pub file_name: String,
    pub brand: String,
    pub started_at: DateTime<Utc>,
    pub elapsed_ms: i64,
    pub sections: Vec<SectionResult>,
    pub cell_results: Vec<FieldResult>,
    pub summary: RunSummary,
}

impl ValidationRun {
    /// 全部 FieldResult（区段内 + 固定单元格），按声明顺序
    pub fn field_results(&self) -> impl Iterator<Item = &FieldResult> {
        self.sections
            .iter()
            .flat_map(|s| s.field_results.iter())
            .chain(self.cell_results.iter())
    }

    pub fn section(&self, name: &str) -> Option<&SectionResult> {
        self.sections.iter().find(|s| s.name == name)
    }
}

// ==========================================
// FileOutcome - 批次中单个文件的结果
// ==========================================
// 文件级读取/解析失败只影响该文件
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileOutcome {
    Completed(ValidationRun),
    Failed { file_name: String, error: String },
}

impl FileOutcome {
    pub fn file_name(&self) -> &str {
        match self {
            FileOutcome::Completed(run) => &run.file_name,
            FileOutcome::Failed { file_name, .. } => file_name,
        }
    }

    pub fn run(&self) -> Option<&ValidationRun> {
        match self {
            FileOutcome::Completed(run) => Some(run),
            FileOutcome::Failed { .. } => None,
        }
    }
}

// ==========================================
// BatchReport - 一次上传批次的结果
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    pub batch_id: String,
    pub brand: String,
    pub outcomes: Vec<FileOutcome>,
    pub totals: BatchTotals,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchTotals {
    pub files: usize,
    pub completed: usize,
    pub failed: usize,
    pub valid: usize,
    pub invalid: usize,
    pub warning: usize,
    pub sections_not_found: usize,
}

impl BatchTotals {
    pub fn from_outcomes(outcomes: &[FileOutcome]) -> Self {
        let mut totals = BatchTotals {
            files: outcomes.len(),
            ..Default::default()
        };
        for outcome in outcomes {
            match outcome {
                FileOutcome::Completed(run) => {
                    totals.completed += 1;
                    totals.valid += run.summary.valid;
                    totals.invalid += run.summary.invalid;
                    totals.warning += run.summary.warning;
                    totals.sections_not_found += run.summary.sections_not_found;
                }
                FileOutcome::Failed { .. } => totals.failed += 1,
            }
        }
        totals
    }
}
