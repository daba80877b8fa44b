// ==========================================
// 校验 API 集成测试
// ==========================================
// 测试目标: 批次校验（上传文件 / 本地路径），文件级失败隔离，
//           品牌未知 / 不可用，配置驱动初始化
// ==========================================


use bcbd_validator::brands::{label_value_loader, BrandContext, BrandRegistry, BrandSource};
use bcbd_validator::config::ConfigManager;
use bcbd_validator::domain::{FileOutcome, Verdict};
use bcbd_validator::engine::EvaluatorSettings;
use bcbd_validator::importer::DEFAULT_MAX_FILE_SIZE;
use bcbd_validator::report::{render_text, to_json};
use bcbd_validator::{ApiError, UploadedFile, ValidationApi};
use std::fs;
use tempfile::TempDir;
use test_helpers::{
    burton_cells, csv_bytes, csv_upload, mammut_cells, reference_dir, write_reference_files,
    xlsx_bytes, Value,
};

fn api_with_references(max_file_size: u64) -> (ValidationApi, TempDir) {
    let dir = reference_dir();
    let loader = label_value_loader();
    let context = BrandContext::new(0.001, dir.path(), &loader);
    let registry = BrandRegistry::builtin(&context);
    (
        ValidationApi::new(registry, EvaluatorSettings::default(), max_file_size),
        dir,
    )
}

// ==========================================
// 上传文件批次
// ==========================================

#[tokio::test]
async fn test_batch_isolates_file_failures() {
    bcbd_validator::logging::init_test();
    let (api, _dir) = api_with_references(DEFAULT_MAX_FILE_SIZE);
    let files = vec![
        csv_upload("burton_a.csv", &burton_cells()),
        UploadedFile::new("broken.xlsx", b"definitely not a zip".to_vec()),
        UploadedFile::new("notes.txt", b"hello".to_vec()),
        csv_upload("burton_b.csv", &burton_cells()),
    ];

    let report = api.validate_files("burton", files).await.unwrap();

    assert_eq!(report.brand, "Burton");
    let names: Vec<_> = report.outcomes.iter().map(FileOutcome::file_name).collect();
    assert_eq!(
        names,
        vec!["burton_a.csv", "broken.xlsx", "notes.txt", "burton_b.csv"]
    );
    assert!(report.outcomes[0].run().is_some());
    assert!(matches!(report.outcomes[1], FileOutcome::Failed { .. }));
    assert!(matches!(report.outcomes[2], FileOutcome::Failed { .. }));
    assert!(report.outcomes[3].run().is_some());

    assert_eq!(report.totals.files, 4);
    assert_eq!(report.totals.completed, 2);
    assert_eq!(report.totals.failed, 2);
    assert_eq!(report.totals.valid, 12);
    assert_eq!(report.totals.warning, 2);
    assert_eq!(report.totals.sections_not_found, 2);
}

#[tokio::test]
async fn test_unknown_brand_is_rejected_before_any_file() {
    let (api, _dir) = api_with_references(DEFAULT_MAX_FILE_SIZE);
    let result = api
        .validate_files("Nike", vec![csv_upload("a.csv", &burton_cells())])
        .await;
    assert!(matches!(result, Err(ApiError::UnknownBrand(name)) if name == "Nike"));
}

#[tokio::test]
async fn test_empty_batch_is_invalid_input() {
    let (api, _dir) = api_with_references(DEFAULT_MAX_FILE_SIZE);
    let result = api.validate_files("Burton", Vec::new()).await;
    assert!(matches!(result, Err(ApiError::InvalidInput(_))));

    let result = api.validate_paths("Burton", &[]).await;
    assert!(matches!(result, Err(ApiError::InvalidInput(_))));

    // 品牌检查优先
    let result = api.validate_files("Nike", Vec::new()).await;
    assert!(matches!(result, Err(ApiError::UnknownBrand(_))));
}

#[tokio::test]
async fn test_brand_without_reference_data_is_unavailable() {
    let empty = TempDir::new().unwrap();
    let loader = label_value_loader();
    let context = BrandContext::new(0.001, empty.path(), &loader);
    let api = ValidationApi::new(
        BrandRegistry::builtin(&context),
        EvaluatorSettings::default(),
        DEFAULT_MAX_FILE_SIZE,
    );

    let result = api
        .validate_files("Prana", vec![csv_upload("prana.csv", &[])])
        .await;
    assert!(matches!(result, Err(ApiError::BrandUnavailable { brand, .. }) if brand == "Prana"));

    // 其他品牌不受影响
    assert!(api.rules_for("Burton").is_ok());
    let unavailable: Vec<_> = api
        .brands()
        .into_iter()
        .filter(|b| !b.available)
        .map(|b| b.name)
        .collect();
    assert_eq!(unavailable, vec!["Prana", "Foot Asylum"]);
}

#[tokio::test]
async fn test_oversized_file_fails_alone() {
    let (api, _dir) = api_with_references(64);
    let small = UploadedFile::new("small.csv", b"Fabrics\n".to_vec());
    let large = csv_upload("large.csv", &burton_cells());

    let report = api.validate_files("Burton", vec![large, small]).await.unwrap();

    assert!(matches!(report.outcomes[0], FileOutcome::Failed { .. }));
    assert!(report.outcomes[1].run().is_some());
}

// ==========================================
// xlsx 端到端
// ==========================================

#[tokio::test]
async fn test_xlsx_multi_sheet_ride_store() {
    let (api, _dir) = api_with_references(DEFAULT_MAX_FILE_SIZE);
    let bytes = xlsx_bytes(vec![
        (
            "Style A",
            vec![
                ("A1", Value::Text("Fabric")),
                ("B2", Value::Text("Shell")),
                ("Q2", Value::Number(0.05)),
                ("A3", Value::Text("Total")),
                ("A4", Value::Text("Trims")),
                ("Q5", Value::Text("3%")),
                ("A6", Value::Text("Total")),
            ],
        ),
        (
            "Style B",
            vec![
                ("A1", Value::Text("Fabric")),
                ("Q2", Value::Number(6.0)),
                ("A3", Value::Text("Total")),
            ],
        ),
    ]);

    let report = api
        .validate_files("ride store", vec![UploadedFile::new("ride.xlsx", bytes)])
        .await
        .unwrap();

    let run = report.outcomes[0].run().unwrap();
    assert_eq!(run.sections.len(), 4);
    assert_eq!(run.summary.valid, 2);
    assert_eq!(run.summary.invalid, 1);
    assert_eq!(run.summary.sections_not_found, 1);

    let style_b = run
        .sections
        .iter()
        .find(|s| s.sheet == "Style B" && s.name == "Fabric")
        .unwrap();
    assert_eq!(style_b.field_results[0].raw_actual, "6");
    assert_eq!(style_b.field_results[0].verdict, Verdict::Invalid);
}

#[tokio::test]
async fn test_xlsx_with_offset_used_range() {
    // 数据从 B 列 / 第 7 行开始，地址仍按工作表绝对位置解析
    let (api, _dir) = api_with_references(DEFAULT_MAX_FILE_SIZE);
    let bytes = xlsx_bytes(vec![("Costing", mammut_cells())]);

    let report = api
        .validate_files("Mammut", vec![UploadedFile::new("mammut.xlsx", bytes)])
        .await
        .unwrap();

    let run = report.outcomes[0].run().unwrap();
    assert_eq!(run.summary.valid, 6);
    assert_eq!(run.summary.invalid, 1);
    let factory = run.cell_results.iter().find(|f| f.label == "Factory").unwrap();
    assert_eq!(factory.address, "E7");
    assert_eq!(factory.raw_actual, "PT Ujump Indonesia");
}

// ==========================================
// 本地路径
// ==========================================

#[tokio::test]
async fn test_validate_paths_reports_missing_file() {
    let (api, _dir) = api_with_references(DEFAULT_MAX_FILE_SIZE);
    let uploads = TempDir::new().unwrap();
    let present = uploads.path().join("burton.csv");
    fs::write(&present, csv_bytes(&burton_cells())).unwrap();
    let missing = uploads.path().join("missing.xlsx");

    let report = api
        .validate_paths("Burton", &[missing, present])
        .await
        .unwrap();

    assert_eq!(report.outcomes[0].file_name(), "missing.xlsx");
    assert!(matches!(report.outcomes[0], FileOutcome::Failed { .. }));
    assert_eq!(report.outcomes[1].file_name(), "burton.csv");
    assert_eq!(report.outcomes[1].run().unwrap().summary.valid, 6);
}

// ==========================================
// 配置驱动初始化
// ==========================================

const PATAGONIA: &str = r#"{
    "brand": "Patagonia",
    "sections": [{
        "name": "Fabrics",
        "marker_column": "A",
        "label_column": "B",
        "start": {"text": "FABRICS", "mode": "exact"},
        "end": {"text": "TOTAL", "mode": "contains"},
        "fields": [{
            "column": "C",
            "label": "Wastage",
            "expected": {"type": "percentage", "percent": 4}
        }]
    }]
}"#;

#[tokio::test]
async fn test_from_config_loads_custom_rules() {
    let references = TempDir::new().unwrap();
    write_reference_files(references.path());
    let rules = TempDir::new().unwrap();
    fs::write(rules.path().join("patagonia.json"), PATAGONIA).unwrap();

    let config = ConfigManager::from_json(
        &serde_json::json!({
            "reference_dir": references.path(),
            "rules_dir": rules.path(),
        })
        .to_string(),
    )
    .unwrap();
    let api = ValidationApi::from_config(&config).await.unwrap();

    let patagonia = api.brands().into_iter().find(|b| b.name == "Patagonia").unwrap();
    assert_eq!(patagonia.source, BrandSource::Custom);
    assert!(api.brands().iter().all(|b| b.available));

    let file = csv_upload(
        "patagonia.csv",
        &[
            ("A1", Value::Text("Fabrics")),
            ("B2", Value::Text("Fleece")),
            ("C2", Value::Text("4%")),
            ("A3", Value::Text("Total")),
        ],
    );
    let report = api.validate_files("patagonia", vec![file]).await.unwrap();
    assert_eq!(report.totals.valid, 1);
    let wastage = &report.outcomes[0].run().unwrap().sections[0].field_results[0];
    assert_eq!(wastage.item.as_deref(), Some("Fleece"));

    let text = render_text(&report, "en");
    assert!(text.contains("[VALID] C2 Fleece Wastage: 4% — Expected: 4%"));
    let json = to_json(&report).unwrap();
    assert!(json.contains("\"status\": \"completed\""));
}
