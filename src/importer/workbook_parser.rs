// ==========================================
// 成本分解表校验 - 表格解析器实现
// ==========================================
// 支持: Excel (.xlsx/.xlsm/.xls/.xlsb) / OpenDocument (.ods) / CSV (.csv)
// 输出: 按原顺序排列的 sheet 网格，单元格保持原始类型
// ==========================================

use crate::domain::cell::Cell;
use crate::domain::grid::{Grid, Sheet, Workbook};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::file_source::file_extension;
use crate::importer::importer_trait::WorkbookParser;
use calamine::{open_workbook_auto_from_rs, Data, Range, Reader};
use csv::ReaderBuilder;
use std::io::Cursor;
use std::path::Path;
use tracing::{debug, instrument};

/// calamine 可解析的扩展名
pub const SPREADSHEET_EXTENSIONS: [&str; 5] = ["xlsx", "xlsm", "xls", "xlsb", "ods"];

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

// ==========================================
// Excel Parser 实现
// ==========================================
pub struct ExcelParser;

impl WorkbookParser for ExcelParser {
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    fn parse(&self, file_name: &str, bytes: &[u8]) -> ImportResult<Workbook> {
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
            .map_err(|e| ImportError::ExcelParseError(format!("{}: {}", file_name, e)))?;

        let sheet_names = workbook.sheet_names();
        if sheet_names.is_empty() {
            return Err(ImportError::EmptyWorkbook(file_name.to_string()));
        }

        let mut sheets = Vec::with_capacity(sheet_names.len());
        for name in sheet_names {
            let range = workbook
                .worksheet_range(&name)
                .map_err(|e| {
                    ImportError::ExcelParseError(format!("{}/{}: {}", file_name, name, e))
                })?;
            let grid = range_to_grid(&range);
            debug!(
                sheet = %name,
                rows = grid.row_count(),
                cols = grid.column_count(),
                "sheet 解析完成"
            );
            sheets.push(Sheet { name, grid });
        }

        Ok(Workbook::new(sheets))
    }
}

/// calamine Range → Grid
///
/// Range 只覆盖已用区域，左上角不一定是 A1；此处补齐前导空行/空列，
/// 保证网格坐标与表格中的显示地址一致。
fn range_to_grid(range: &Range<Data>) -> Grid {
    let Some((start_row, start_col)) = range.start() else {
        return Grid::default();
    };
    let (start_row, start_col) = (start_row as usize, start_col as usize);

    let mut rows: Vec<Vec<Cell>> = vec![Vec::new(); start_row];
    for data_row in range.rows() {
        let mut row = vec![Cell::Empty; start_col];
        row.extend(data_row.iter().map(data_to_cell));
        rows.push(row);
    }
    Grid::new(rows)
}

fn data_to_cell(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Float(f) => Cell::Number(*f),
        Data::Bool(b) => Cell::Bool(*b),
        Data::String(s) if s.trim().is_empty() => Cell::Empty,
        Data::String(s) => Cell::Text(s.clone()),
        Data::DateTime(dt) => Cell::Number(dt.as_f64()),
        // ISO 日期/时长、公式错误值 (#DIV/0! 等) 按文本保留
        other => Cell::Text(other.to_string()),
    }
}

// ==========================================
// CSV Parser 实现
// ==========================================
// CSV 上传视为单 sheet，sheet 名为文件名主干
pub struct CsvParser;

impl WorkbookParser for CsvParser {
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    fn parse(&self, file_name: &str, bytes: &[u8]) -> ImportResult<Workbook> {
        let content = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);

        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true) // 允许行长度不一致
            .from_reader(content);

        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result
                .map_err(|e| ImportError::CsvParseError(format!("{}: {}", file_name, e)))?;
            rows.push(
                record
                    .iter()
                    .map(|field| {
                        if field.trim().is_empty() {
                            Cell::Empty
                        } else {
                            Cell::Text(field.to_string())
                        }
                    })
                    .collect(),
            );
        }

        let sheet_name = Path::new(file_name)
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "Sheet1".to_string());

        debug!(sheet = %sheet_name, rows = rows.len(), "CSV 解析完成");
        Ok(Workbook::single(sheet_name, Grid::new(rows)))
    }
}

// ==========================================
// 通用解析器（根据扩展名自动选择）
// ==========================================
pub struct UniversalWorkbookParser;

impl WorkbookParser for UniversalWorkbookParser {
    fn parse(&self, file_name: &str, bytes: &[u8]) -> ImportResult<Workbook> {
        let ext = file_extension(file_name);
        match ext.as_str() {
            "csv" => CsvParser.parse(file_name, bytes),
            e if SPREADSHEET_EXTENSIONS.contains(&e) => ExcelParser.parse(file_name, bytes),
            _ => Err(ImportError::UnsupportedFormat(if ext.is_empty() {
                file_name.to_string()
            } else {
                ext
            })),
        }
    }
}
