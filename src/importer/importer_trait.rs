// ==========================================
// 成本分解表校验 - 导入层 Trait
// ==========================================
// 职责: 定义文件读取 / 表格解析 / 参考数据加载接口（不包含实现）
// 红线: 解析结果为只读 Workbook，解析器不持有状态
// ==========================================

use crate::domain::grid::Workbook;
use crate::importer::error::ImportResult;
use crate::importer::file_source::UploadedFile;
use crate::importer::reference_loader::ReferenceTable;
use async_trait::async_trait;
use std::path::Path;

// ==========================================
// WorkbookParser Trait
// ==========================================
// 用途: 文件字节 → Workbook
// 实现者: ExcelParser, CsvParser, UniversalWorkbookParser
pub trait WorkbookParser: Send + Sync {
    /// 解析上传文件
    ///
    /// # 参数
    /// - file_name: 文件名（用于判断格式与 CSV sheet 命名）
    /// - bytes: 文件内容
    ///
    /// # 返回
    /// - Ok(Workbook): 按原顺序排列的 sheet
    /// - Err: 格式不支持 / 文件损坏 / 无工作表
    fn parse(&self, file_name: &str, bytes: &[u8]) -> ImportResult<Workbook>;
}

// ==========================================
// FileSource Trait
// ==========================================
// 用途: 一次性异步读取文件字节（唯一挂起点）
// 实现者: TokioFileSource
#[async_trait]
pub trait FileSource: Send + Sync {
    /// 读取文件
    ///
    /// # 返回
    /// - Ok(UploadedFile): 文件名 + 内容
    /// - Err: 文件不存在 / 读取失败 / 超出大小上限
    async fn read(&self, path: &Path) -> ImportResult<UploadedFile>;
}

// ==========================================
// ReferenceLoader Trait
// ==========================================
// 用途: 品牌参考数据（CSV）加载
// 实现者: CsvReferenceLoader
pub trait ReferenceLoader: Send + Sync {
    /// 加载参考数据
    ///
    /// # 参数
    /// - brand: 品牌名称（用于错误信息）
    /// - path: 参考数据文件路径
    ///
    /// # 返回
    /// - Ok(ReferenceTable): 已切分、已折叠多余逗号的行
    /// - Err(MissingReferenceData): 文件缺失或没有数据行
    fn load(&self, brand: &str, path: &Path) -> ImportResult<ReferenceTable>;
}
