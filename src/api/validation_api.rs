// ==========================================
// 成本分解表校验 - 校验 API
// ==========================================
// 职责: 批次入口（品牌 + 多个上传文件 → BatchReport）
// 红线: 文件严格顺序处理，上一个文件完成后才开始下一个
//       单个文件读取/解析失败只影响该文件，批次继续
//       品牌不可用在批次开始前报告一次，不逐文件重复
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::brands::{label_value_loader, BrandContext, BrandInfo, BrandRegistry, BrandStatus};
use crate::config::{ConfigManager, ValidatorConfigReader};
use crate::domain::result::{BatchReport, BatchTotals, FileOutcome};
use crate::domain::rule::RuleSet;
use crate::engine::evaluator::EvaluatorSettings;
use crate::engine::runner::ValidationRunner;
use crate::importer::error::ImportResult;
use crate::importer::file_source::{TokioFileSource, UploadedFile};
use crate::importer::importer_trait::{FileSource, WorkbookParser};
use crate::importer::workbook_parser::UniversalWorkbookParser;
use futures::stream::{self, StreamExt};
use std::path::PathBuf;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

/// 校验 API
pub struct ValidationApi {
    registry: BrandRegistry,
    runner: ValidationRunner,
    parser: Box<dyn WorkbookParser>,
    file_source: Box<dyn FileSource>,
    max_file_size: u64,
}

impl ValidationApi {
    /// 创建新的 ValidationApi 实例
    ///
    /// # 参数
    /// - registry: 已初始化的品牌注册表
    /// - settings: 比较精度
    /// - max_file_size: 单文件大小上限（字节）
    pub fn new(registry: BrandRegistry, settings: EvaluatorSettings, max_file_size: u64) -> Self {
        Self {
            registry,
            runner: ValidationRunner::new(settings),
            parser: Box::new(UniversalWorkbookParser),
            file_source: Box::new(TokioFileSource::new(max_file_size)),
            max_file_size,
        }
    }

    /// 按配置初始化（内置品牌 + rules_dir 中的自定义规则表）
    pub async fn from_config(config: &ConfigManager) -> ApiResult<Self> {
        let settings = config.evaluator_settings().await?;
        let max_file_size = config.get_max_file_size_bytes().await?;
        let epsilon = config.get_minor_difference_epsilon().await?;
        let reference_dir = config.get_reference_dir().await?;
        let rules_dir = config.get_rules_dir().await?;

        let loader = label_value_loader();
        let context = BrandContext::new(epsilon, reference_dir, &loader);
        let registry = BrandRegistry::load(&context, &rules_dir);

        Ok(Self::new(registry, settings, max_file_size))
    }

    /// 替换表格解析器
    pub fn with_parser(mut self, parser: Box<dyn WorkbookParser>) -> Self {
        self.parser = parser;
        self
    }

    /// 替换文件读取器
    pub fn with_file_source(mut self, file_source: Box<dyn FileSource>) -> Self {
        self.file_source = file_source;
        self
    }

    pub fn registry(&self) -> &BrandRegistry {
        &self.registry
    }

    /// 品牌列表（含可用状态）
    pub fn brands(&self) -> Vec<BrandInfo> {
        self.registry.list()
    }

    /// 取品牌规则表
    ///
    /// # 返回
    /// - Err(UnknownBrand): 未注册
    /// - Err(BrandUnavailable): 参考数据缺失
    pub fn rules_for(&self, brand: &str) -> ApiResult<&RuleSet> {
        let entry = self
            .registry
            .get(brand)
            .ok_or_else(|| ApiError::UnknownBrand(brand.to_string()))?;
        match &entry.status {
            BrandStatus::Available(rules) => Ok(rules),
            BrandStatus::Unavailable { reason } => Err(ApiError::BrandUnavailable {
                brand: entry.name.clone(),
                reason: reason.clone(),
            }),
        }
    }

    /// 校验一批上传文件
    ///
    /// # 参数
    /// - brand: 品牌名称
    /// - files: 上传文件（名称 + 内容），按顺序处理
    ///
    /// # 返回
    /// - Ok(BatchReport): 每个文件一个 FileOutcome（成功或失败）
    /// - Err(ApiError): 品牌未知或不可用，或批次为空
    #[instrument(skip(self, files), fields(files = files.len()))]
    pub async fn validate_files(
        &self,
        brand: &str,
        files: Vec<UploadedFile>,
    ) -> ApiResult<BatchReport> {
        let rules = self.rules_for(brand)?;
        ensure_not_empty(files.len())?;

        let outcomes: Vec<FileOutcome> = stream::iter(files)
            .then(|file| async move { self.validate_upload(rules, &file) })
            .collect()
            .await;

        Ok(self.finish_batch(rules, outcomes))
    }

    /// 校验一批本地文件（异步读取是唯一的挂起点）
    #[instrument(skip(self, paths), fields(files = paths.len()))]
    pub async fn validate_paths(&self, brand: &str, paths: &[PathBuf]) -> ApiResult<BatchReport> {
        let rules = self.rules_for(brand)?;
        ensure_not_empty(paths.len())?;

        let outcomes: Vec<FileOutcome> = stream::iter(paths)
            .then(|path| async move {
                match self.file_source.read(path).await {
                    Ok(file) => self.validate_upload(rules, &file),
                    Err(e) => {
                        let file_name = path
                            .file_name()
                            .map(|n| n.to_string_lossy().to_string())
                            .unwrap_or_else(|| path.display().to_string());
                        warn!(file = %file_name, error = %e, "文件读取失败");
                        FileOutcome::Failed {
                            file_name,
                            error: e.to_string(),
                        }
                    }
                }
            })
            .collect()
            .await;

        Ok(self.finish_batch(rules, outcomes))
    }

    /// 校验单个上传文件（同步：解析 + 定位 + 判定）
    pub fn validate_upload(&self, rules: &RuleSet, file: &UploadedFile) -> FileOutcome {
        match self.run_upload(rules, file) {
            Ok(outcome) => outcome,
            Err(e) => {
                if e.is_file_level() {
                    warn!(file = %file.name, error = %e, "文件校验失败");
                } else {
                    error!(file = %file.name, error = %e, "文件校验内部错误");
                }
                FileOutcome::Failed {
                    file_name: file.name.clone(),
                    error: e.to_string(),
                }
            }
        }
    }

    fn run_upload(&self, rules: &RuleSet, file: &UploadedFile) -> ImportResult<FileOutcome> {
        file.ensure_within(self.max_file_size)?;
        let workbook = self.parser.parse(&file.name, &file.bytes)?;
        let run = self.runner.run(&file.name, &workbook, rules);
        Ok(FileOutcome::Completed(run))
    }

    fn finish_batch(&self, rules: &RuleSet, outcomes: Vec<FileOutcome>) -> BatchReport {
        let totals = BatchTotals::from_outcomes(&outcomes);
        info!(
            brand = %rules.brand,
            files = totals.files,
            completed = totals.completed,
            failed = totals.failed,
            valid = totals.valid,
            invalid = totals.invalid,
            warning = totals.warning,
            "批次校验完成"
        );
        BatchReport {
            batch_id: Uuid::new_v4().to_string(),
            brand: rules.brand.clone(),
            outcomes,
            totals,
        }
    }
}

fn ensure_not_empty(files: usize) -> ApiResult<()> {
    if files == 0 {
        return Err(ApiError::InvalidInput("批次中没有文件".to_string()));
    }
    Ok(())
}
