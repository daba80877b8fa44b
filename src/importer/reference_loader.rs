// ==========================================
// 成本分解表校验 - 参考数据加载
// ==========================================
// 职责: 读取品牌参考值 CSV（标签, 值, ...）
// 规则: 字段 trim；跳过空行；可选表头
//       字段数多于期望列数时，多余字段折叠回最后一列
//       （值本身含未加引号的逗号，如 "Knit, Dyed"）
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use crate::importer::importer_trait::ReferenceLoader;
use csv::{ReaderBuilder, Trim};
use std::io::Read;
use std::path::Path;
use tracing::{debug, warn};

// ==========================================
// ReferenceTable - 已切分的参考数据
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceTable {
    pub headers: Option<Vec<String>>,
    pub rows: Vec<Vec<String>>,
}

impl ReferenceTable {
    /// 按首列标签查找第二列的值（大小写不敏感）
    pub fn value(&self, label: &str) -> Option<&str> {
        let wanted = label.trim().to_lowercase();
        self.rows
            .iter()
            .find(|row| row.first().is_some_and(|l| l.trim().to_lowercase() == wanted))
            .and_then(|row| row.get(1))
            .map(String::as_str)
    }

    /// 第 i 列的全部值（缺失的列跳过）
    pub fn column(&self, index: usize) -> Vec<&str> {
        self.rows
            .iter()
            .filter_map(|row| row.get(index))
            .map(String::as_str)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// ==========================================
// CsvReferenceLoader
// ==========================================
#[derive(Debug, Clone, Copy)]
pub struct CsvReferenceLoader {
    columns: usize,
    has_header: bool,
}

impl CsvReferenceLoader {
    /// # 参数
    /// - columns: 期望列数（至少 1）
    /// - has_header: 首行是否为表头
    pub fn new(columns: usize, has_header: bool) -> Self {
        Self {
            columns: columns.max(1),
            has_header,
        }
    }

    /// 从任意 Reader 解析（source_name 仅用于错误信息）
    pub fn parse_reader<R: Read>(
        &self,
        source_name: &str,
        reader: R,
    ) -> ImportResult<ReferenceTable> {
        let mut csv_reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(reader);

        let mut table = ReferenceTable::default();
        for (index, result) in csv_reader.records().enumerate() {
            let record = result?;
            let fields: Vec<String> = record.iter().map(str::to_string).collect();

            if fields.iter().all(|f| f.is_empty()) {
                continue;
            }
            if self.has_header && table.headers.is_none() && table.rows.is_empty() {
                table.headers = Some(fields);
                continue;
            }

            let row = self.collapse(fields);
            if row.len() < self.columns {
                return Err(ImportError::ReferenceDataFormat {
                    source_name: source_name.to_string(),
                    row: index + 1,
                    message: format!("期望 {} 列，实际 {} 列", self.columns, row.len()),
                });
            }
            table.rows.push(row);
        }

        Ok(table)
    }

    /// 多余字段折叠回最后一列
    fn collapse(&self, mut fields: Vec<String>) -> Vec<String> {
        if fields.len() <= self.columns {
            return fields;
        }
        let surplus = fields.split_off(self.columns - 1);
        fields.push(surplus.join(", "));
        fields
    }
}

impl ReferenceLoader for CsvReferenceLoader {
    fn load(&self, brand: &str, path: &Path) -> ImportResult<ReferenceTable> {
        let missing = |reason: String| ImportError::MissingReferenceData {
            brand: brand.to_string(),
            reason,
        };

        let file = std::fs::File::open(path).map_err(|e| {
            warn!(brand = %brand, path = %path.display(), error = %e, "参考数据文件无法打开");
            missing(format!("{}: {}", path.display(), e))
        })?;

        let source_name = path.display().to_string();
        let table = self.parse_reader(&source_name, file)?;
        if table.is_empty() {
            return Err(missing(format!("{} 没有数据行", source_name)));
        }

        debug!(brand = %brand, rows = table.len(), "参考数据加载完成");
        Ok(table)
    }
}
