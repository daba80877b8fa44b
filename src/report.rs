// ==========================================
// 成本分解表校验 - 结果报表
// ==========================================
// 职责: BatchReport → 纯文本摘要 / JSON
// 红线: 只消费结构化结果，不回读表格
// ==========================================

use crate::domain::result::{
    BatchReport, FieldResult, FileOutcome, Reason, SectionResult, ValidationRun, Verdict,
};
use crate::i18n::t_in;
use std::fmt::Write;

/// 渲染纯文本报表
///
/// # 参数
/// - report: 批次结果
/// - locale: 报表语言（"en" / "zh-CN"）
pub fn render_text(report: &BatchReport, locale: &str) -> String {
    let mut out = String::new();
    let totals = &report.totals;

    line(&mut out, 0, &t_in(locale, "report.title", &[("brand", &report.brand)]));
    line(&mut out, 0, &t_in(locale, "report.batch", &[("batch_id", &report.batch_id)]));
    line(
        &mut out,
        0,
        &t_in(
            locale,
            "report.totals",
            &[
                ("files", &totals.files.to_string()),
                ("completed", &totals.completed.to_string()),
                ("failed", &totals.failed.to_string()),
            ],
        ),
    );

    for outcome in &report.outcomes {
        out.push('\n');
        line(&mut out, 0, &t_in(locale, "report.file", &[("file", outcome.file_name())]));
        match outcome {
            FileOutcome::Completed(run) => render_run(&mut out, run, locale),
            FileOutcome::Failed { error, .. } => {
                line(&mut out, 1, &t_in(locale, "report.file_failed", &[("error", error)]));
            }
        }
    }

    out
}

fn render_run(out: &mut String, run: &ValidationRun, locale: &str) {
    for section in &run.sections {
        render_section(out, section, locale);
    }

    if !run.cell_results.is_empty() {
        line(out, 1, &t_in(locale, "report.cells", &[]));
        for field in &run.cell_results {
            line(out, 2, &field_line(field, locale));
        }
    }

    let summary = &run.summary;
    line(
        out,
        1,
        &t_in(
            locale,
            "report.summary",
            &[
                ("valid", &summary.valid.to_string()),
                ("invalid", &summary.invalid.to_string()),
                ("warning", &summary.warning.to_string()),
                ("not_found", &summary.sections_not_found.to_string()),
            ],
        ),
    );
}

fn render_section(out: &mut String, section: &SectionResult, locale: &str) {
    let heading = t_in(
        locale,
        "report.sheet_section",
        &[("section", &section.name), ("sheet", &section.sheet)],
    );

    if !section.found {
        let detail = match section.start_marker_row {
            Some(row) => t_in(locale, "report.truncated", &[("row", &row.to_string())]),
            None => t_in(locale, "report.not_found", &[]),
        };
        line(out, 1, &format!("{}: {}", heading, detail));
        return;
    }

    match section.row_range {
        Some(range) => {
            let rows = t_in(
                locale,
                "report.rows",
                &[("start", &range.start.to_string()), ("end", &range.end.to_string())],
            );
            line(out, 1, &format!("{} {}", heading, rows));
        }
        None => line(out, 1, &heading),
    }
    for field in &section.field_results {
        line(out, 2, &field_line(field, locale));
    }
}

fn field_line(field: &FieldResult, locale: &str) -> String {
    let verdict_key = match field.verdict {
        Verdict::Valid => "verdict.valid",
        Verdict::Invalid => "verdict.invalid",
        Verdict::Warning => "verdict.warning",
    };

    let value = if field.reason == Some(Reason::Empty) {
        t_in(locale, "report.empty_expected", &[("expected", &field.expected)])
    } else {
        t_in(
            locale,
            "report.actual_expected",
            &[("actual", &field.raw_actual), ("expected", &field.expected)],
        )
    };

    let mut text = format!("[{}] {}", t_in(locale, verdict_key, &[]), field.address);
    if let Some(item) = &field.item {
        let _ = write!(text, " {}", item);
    }
    let _ = write!(text, " {}: {}", field.label, value);
    if let Some(reason) = field.reason {
        let _ = write!(text, " ({})", t_in(locale, reason.message_key(), &[]));
    }
    text
}

fn line(out: &mut String, indent: usize, text: &str) {
    for _ in 0..indent {
        out.push_str("  ");
    }
    out.push_str(text);
    out.push('\n');
}

/// 批次结果序列化为 JSON（带缩进）
pub fn to_json(report: &BatchReport) -> serde_json::Result<String> {
    serde_json::to_string_pretty(report)
}
