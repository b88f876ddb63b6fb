// ==========================================
// 企业定额匹配系统 - 表格导入器
// ==========================================
// 职责: 文件 → 已校验的导入行 + 行级失败清单
// 行级失败只收集不阻断；落库由 API 层编排（追加，不覆盖）
// ==========================================

use crate::domain::{ItemDraft, QuotaDraft};
use crate::importer::error::ImportError;
use crate::importer::file_parser::parse_rows;
use crate::importer::row_mapper::{map_item_row, map_quota_row};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

// ==========================================
// 解析结果
// ==========================================

/// 行级失败记录
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RowFailure {
    /// 数据区行号（从 1 起，不含表头）
    pub row: usize,
    pub reason: String,
}

/// 一个文件的解析结果：成功行 + 失败行
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedSheet<T> {
    pub rows: Vec<T>,
    pub failures: Vec<RowFailure>,
    pub total_rows: usize,
}

// ==========================================
// SheetImporter Trait
// ==========================================
#[async_trait]
pub trait SheetImporter: Send + Sync {
    /// 解析定额表
    async fn parse_quota_sheet<P: AsRef<Path> + Send>(
        &self,
        file_path: P,
    ) -> Result<ParsedSheet<QuotaDraft>, ImportError>;

    /// 解析清单表
    async fn parse_item_sheet<P: AsRef<Path> + Send>(
        &self,
        file_path: P,
    ) -> Result<ParsedSheet<ItemDraft>, ImportError>;

    /// 批量解析多个定额表（并发执行，单个文件失败不影响其他文件）
    async fn batch_parse_quota_sheets<P: AsRef<Path> + Send + Sync>(
        &self,
        file_paths: Vec<P>,
    ) -> Vec<Result<ParsedSheet<QuotaDraft>, String>>;
}

// ==========================================
// SheetImporterImpl
// ==========================================
pub struct SheetImporterImpl;

impl SheetImporterImpl {
    pub fn new() -> Self {
        Self
    }

    fn collect<T, F>(records: Vec<crate::importer::file_parser::RawRow>, mapper: F) -> ParsedSheet<T>
    where
        F: Fn(usize, &crate::importer::file_parser::RawRow) -> Result<T, ImportError>,
    {
        let total_rows = records.len();
        let mut rows = Vec::with_capacity(total_rows);
        let mut failures = Vec::new();

        for (idx, record) in records.iter().enumerate() {
            let row_no = idx + 1;
            match mapper(row_no, record) {
                Ok(row) => rows.push(row),
                Err(e) => failures.push(RowFailure {
                    row: row_no,
                    reason: e.to_string(),
                }),
            }
        }

        ParsedSheet {
            rows,
            failures,
            total_rows,
        }
    }
}

impl Default for SheetImporterImpl {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SheetImporter for SheetImporterImpl {
    async fn parse_quota_sheet<P: AsRef<Path> + Send>(
        &self,
        file_path: P,
    ) -> Result<ParsedSheet<QuotaDraft>, ImportError> {
        let records = parse_rows(file_path.as_ref())?;
        let sheet = Self::collect(records, map_quota_row);
        info!(
            ok = sheet.rows.len(),
            failed = sheet.failures.len(),
            "定额表解析完成"
        );
        Ok(sheet)
    }

    async fn parse_item_sheet<P: AsRef<Path> + Send>(
        &self,
        file_path: P,
    ) -> Result<ParsedSheet<ItemDraft>, ImportError> {
        let records = parse_rows(file_path.as_ref())?;
        let sheet = Self::collect(records, map_item_row);
        info!(
            ok = sheet.rows.len(),
            failed = sheet.failures.len(),
            "清单表解析完成"
        );
        Ok(sheet)
    }

    async fn batch_parse_quota_sheets<P: AsRef<Path> + Send + Sync>(
        &self,
        file_paths: Vec<P>,
    ) -> Vec<Result<ParsedSheet<QuotaDraft>, String>> {
        let tasks = file_paths.iter().map(|path| async move {
            self.parse_quota_sheet(path.as_ref())
                .await
                .map_err(|e| e.to_string())
        });

        futures::future::join_all(tasks).await
    }
}
