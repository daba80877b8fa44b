// ==========================================
// 成本分解表校验 - 文件读取
// ==========================================
// 职责: 上传文件的名称 + 字节；异步一次性读取，带大小上限
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use crate::importer::importer_trait::FileSource;
use async_trait::async_trait;
use std::path::Path;
use tracing::{debug, instrument};

/// 默认文件大小上限（20 MiB）
pub const DEFAULT_MAX_FILE_SIZE: u64 = 20 * 1024 * 1024;

// ==========================================
// UploadedFile - 上传文件句柄
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    /// 小写扩展名（无扩展名时为空串）
    pub fn extension(&self) -> String {
        file_extension(&self.name)
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// 大小上限检查
    pub fn ensure_within(&self, limit: u64) -> ImportResult<()> {
        check_size(&self.name, self.size(), limit)
    }
}

/// 文件名的小写扩展名
pub fn file_extension(file_name: &str) -> String {
    Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

fn check_size(file: &str, size: u64, limit: u64) -> ImportResult<()> {
    if size > limit {
        return Err(ImportError::FileTooLarge {
            file: file.to_string(),
            size,
            limit,
        });
    }
    Ok(())
}

// ==========================================
// TokioFileSource - 基于 tokio::fs 的读取
// ==========================================
#[derive(Debug, Clone, Copy)]
pub struct TokioFileSource {
    max_bytes: u64,
}

impl Default for TokioFileSource {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_FILE_SIZE)
    }
}

impl TokioFileSource {
    pub fn new(max_bytes: u64) -> Self {
        Self { max_bytes }
    }
}

#[async_trait]
impl FileSource for TokioFileSource {
    #[instrument(skip(self), fields(path = %path.display()))]
    async fn read(&self, path: &Path) -> ImportResult<UploadedFile> {
        let display = path.display().to_string();
        let metadata = tokio::fs::metadata(path).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ImportError::FileNotFound(display.clone()),
            _ => ImportError::FileReadError(format!("{}: {}", display, e)),
        })?;
        if !metadata.is_file() {
            return Err(ImportError::FileReadError(format!("{} 不是文件", display)));
        }

        // 读取前先按元数据拦截，避免把超大文件整体读入内存
        check_size(&display, metadata.len(), self.max_bytes)?;

        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| ImportError::FileReadError(format!("{}: {}", display, e)))?;

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or(display);

        debug!(file = %name, size = bytes.len(), "文件读取完成");
        Ok(UploadedFile { name, bytes })
    }
}
