// ==========================================
// 导入层集成测试
// ==========================================
// 测试目标: xlsx / CSV 解析为网格，参考数据加载
// ==========================================


use bcbd_validator::domain::Cell;
use bcbd_validator::importer::{
    CsvReferenceLoader, ImportError, ReferenceLoader, UniversalWorkbookParser, WorkbookParser,
};
use std::fs;
use tempfile::TempDir;
use test_helpers::{csv_bytes, reference_dir, xlsx_bytes, Value};

// ==========================================
// 表格解析
// ==========================================

#[test]
fn test_xlsx_sheets_keep_order_and_addresses() {
    let bytes = xlsx_bytes(vec![
        ("Summary", vec![("C4", Value::Text("USD"))]),
        (
            "Costing",
            vec![("Q14", Value::Number(0.05)), ("B14", Value::Text("Shell"))],
        ),
    ]);

    let workbook = UniversalWorkbookParser.parse("cbd.xlsx", &bytes).unwrap();

    assert_eq!(workbook.sheet_names(), vec!["Summary", "Costing"]);
    let summary = workbook.sheet("Summary").unwrap();
    assert_eq!(summary.grid.cell(3, 2), &Cell::Text("USD".to_string()));
    assert_eq!(summary.grid.cell(0, 0), &Cell::Empty);

    let costing = workbook.sheet("Costing").unwrap();
    assert_eq!(costing.grid.cell(13, 16), &Cell::Number(0.05));
    assert_eq!(costing.grid.cell(13, 1).as_text(), "Shell");
}

#[test]
fn test_csv_is_single_sheet_named_after_file() {
    let bytes = csv_bytes(&[
        ("A1", Value::Text("Trims (per unit)")),
        ("B2", Value::Text("Hanoi Garment Co, Ltd")),
        ("Q2", Value::Text("3%")),
    ]);

    let workbook = UniversalWorkbookParser.parse("style-42.CSV", &bytes).unwrap();

    assert_eq!(workbook.sheet_names(), vec!["style-42"]);
    let grid = &workbook.first().unwrap().grid;
    assert_eq!(grid.cell(1, 1).as_text(), "Hanoi Garment Co, Ltd");
    assert_eq!(grid.cell(1, 16).as_text(), "3%");
    assert!(grid.cell(1, 0).is_empty());
}

#[test]
fn test_unsupported_and_corrupt_files() {
    assert!(matches!(
        UniversalWorkbookParser.parse("cbd.pdf", b"%PDF-1.4"),
        Err(ImportError::UnsupportedFormat(_))
    ));
    assert!(matches!(
        UniversalWorkbookParser.parse("cbd.xlsx", b"not a workbook"),
        Err(ImportError::ExcelParseError(_))
    ));
}

// ==========================================
// 参考数据
// ==========================================

#[test]
fn test_reference_files_load() {
    let dir = reference_dir();
    let loader = CsvReferenceLoader::new(2, true);

    let prana = loader.load("Prana", &dir.path().join("prana.csv")).unwrap();
    assert_eq!(prana.value("fabric wastage"), Some("5%"));
    assert_eq!(prana.len(), 4);

    // 供应商名称中的逗号并入最后一列
    let suppliers = loader
        .load("Foot Asylum", &dir.path().join("foot_asylum_suppliers.csv"))
        .unwrap();
    assert_eq!(
        suppliers.column(1),
        vec!["Hanoi Garment Co, Ltd", "PT Ujump Indonesia"]
    );
}

#[test]
fn test_missing_or_empty_reference_file() {
    let dir = TempDir::new().unwrap();
    let loader = CsvReferenceLoader::new(2, true);

    let missing = loader.load("Prana", &dir.path().join("prana.csv"));
    assert!(matches!(
        missing,
        Err(ImportError::MissingReferenceData { ref brand, .. }) if brand == "Prana"
    ));

    let header_only = dir.path().join("header.csv");
    fs::write(&header_only, "Label,Value\n").unwrap();
    assert!(matches!(
        loader.load("Prana", &header_only),
        Err(ImportError::MissingReferenceData { .. })
    ));
}
