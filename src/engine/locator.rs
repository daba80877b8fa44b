// ==========================================
// 成本分解表校验 - 区段定位器 (SectionLocator)
// ==========================================
// 职责: 在标记列中自上而下扫描起止标记，返回区段行范围
// 红线: 多区段必须单调链式定位（下一区段从上一区段结束行之后开始），
//       否则 "TOTAL" 之类的共享子串会把行错误归属到别的区段
// ==========================================

use crate::domain::grid::Grid;
use crate::domain::result::RowRange;
use crate::domain::rule::{MarkerMatch, SectionRule};
use tracing::debug;

// ==========================================
// SectionLocation - 定位结果（0 基行号）
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SectionLocation {
    pub found: bool,
    /// 起始标记行；结束标记缺失时仍保留（部分命中）
    pub start_row: Option<usize>,
    /// 结束标记行（不含）
    pub end_row: Option<usize>,
}

impl SectionLocation {
    /// 起止标记之间的数据行（两端均不含标记行）
    pub fn data_rows(&self) -> Option<std::ops::Range<usize>> {
        match (self.found, self.start_row, self.end_row) {
            (true, Some(start), Some(end)) => Some(start + 1..end),
            _ => None,
        }
    }

    /// 1 基展示口径的行范围
    pub fn display_range(&self) -> Option<RowRange> {
        self.data_rows().map(|rows| RowRange {
            start: rows.start + 1,
            end: rows.end + 1,
        })
    }
}

pub struct SectionLocator;

impl SectionLocator {
    /// 定位单个区段
    ///
    /// # 参数
    /// - grid: 只读网格
    /// - column: 扫描标记的列
    /// - start / end: 起止标记谓词
    /// - search_from: 起始扫描行（含）
    ///
    /// # 返回
    /// - found=true: 起止标记均命中
    /// - found=false, start_row=Some: 起始命中但至表尾无结束标记（区段截断）
    /// - found=false, start_row=None: 起始标记未命中
    pub fn find_section(
        grid: &Grid,
        column: usize,
        start: &MarkerMatch,
        end: &MarkerMatch,
        search_from: usize,
    ) -> SectionLocation {
        let rows = grid.row_count();

        let marker_at = |row: usize| grid.cell(row, column).as_text();

        let start_row = (search_from..rows).find(|&row| start.matches(&marker_at(row)));
        let Some(start_row) = start_row else {
            return SectionLocation::default();
        };

        let end_row = (start_row + 1..rows).find(|&row| end.matches(&marker_at(row)));

        SectionLocation {
            found: end_row.is_some(),
            start_row: Some(start_row),
            end_row,
        }
    }

    /// 按声明顺序链式定位多个区段
    ///
    /// 每个区段从上一区段结束行 + 1 开始扫描；
    /// `starts_at_previous_end` 的区段允许起始标记与上一结束标记同行。
    /// 截断区段（只命中起始标记）之后的区段从其起始行 + 1 开始。
    pub fn locate_chain(grid: &Grid, sections: &[SectionRule]) -> Vec<SectionLocation> {
        let mut locations = Vec::with_capacity(sections.len());
        let mut cursor = 0usize;
        let mut previous_end: Option<usize> = None;

        for rule in sections {
            let from = match (rule.starts_at_previous_end, previous_end) {
                (true, Some(end)) => end,
                _ => cursor,
            };

            let location = Self::find_section(
                grid,
                rule.marker_column.index(),
                &rule.start,
                &rule.end,
                from,
            );

            debug!(
                section = %rule.name,
                search_from = from,
                found = location.found,
                start_row = ?location.start_row,
                end_row = ?location.end_row,
                "区段定位"
            );

            match (location.start_row, location.end_row) {
                (_, Some(end)) => {
                    cursor = end + 1;
                    previous_end = Some(end);
                }
                (Some(start), None) => {
                    cursor = start + 1;
                    previous_end = None;
                }
                (None, None) => {}
            }

            locations.push(location);
        }

        locations
    }
}
