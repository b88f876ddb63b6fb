// ==========================================
// 企业定额匹配系统 - 导入 API
// ==========================================
// 职责: 编排"解析 → 行级校验 → 追加落库"的导入流程
// 导入只追加不覆盖；行级失败收集进响应，不致整批失败
// ==========================================

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::api::error::{ApiError, ApiResult};
use crate::importer::{RowFailure, SheetImporter, SheetImporterImpl};
use crate::repository::{ItemRepository, QuotaRepository, QuotaVersionRepository};

// ==========================================
// ImportApiResponse - 导入结果
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportApiResponse {
    /// 落库成功的行数
    pub imported: usize,
    /// 行级失败数
    pub failed: usize,
    /// 行级失败明细（行号 + 原因）
    pub failures: Vec<RowFailure>,
    /// 导入批次ID（用于日志追溯）
    pub batch_id: String,
    /// 导入耗时（毫秒）
    pub elapsed_ms: i64,
}

// ==========================================
// ImportApi - 导入 API
// ==========================================
pub struct ImportApi {
    importer: SheetImporterImpl,
    quota_repo: Arc<QuotaRepository>,
    item_repo: Arc<ItemRepository>,
    version_repo: Arc<QuotaVersionRepository>,
}

impl ImportApi {
    /// 创建新的ImportApi实例
    pub fn new(
        quota_repo: Arc<QuotaRepository>,
        item_repo: Arc<ItemRepository>,
        version_repo: Arc<QuotaVersionRepository>,
    ) -> Self {
        Self {
            importer: SheetImporterImpl::new(),
            quota_repo,
            item_repo,
            version_repo,
        }
    }

    /// 导入定额到指定版本（追加，不去重、不覆盖）
    pub async fn import_quotas<P: AsRef<Path> + Send>(
        &self,
        version_id: i64,
        file_path: P,
    ) -> ApiResult<ImportApiResponse> {
        if !self.version_repo.exists(version_id)? {
            return Err(ApiError::NotFound(format!(
                "QuotaVersion(id={})不存在",
                version_id
            )));
        }

        let started = Instant::now();
        let batch_id = Uuid::new_v4().to_string();

        let sheet = self.importer.parse_quota_sheet(file_path).await?;
        let imported = self.quota_repo.batch_insert(version_id, &sheet.rows)?;

        info!(
            batch_id = %batch_id,
            version_id,
            imported,
            failed = sheet.failures.len(),
            "定额导入完成"
        );

        Ok(ImportApiResponse {
            imported,
            failed: sheet.failures.len(),
            failures: sheet.failures,
            batch_id,
            elapsed_ms: started.elapsed().as_millis() as i64,
        })
    }

    /// 导入项目清单（追加；新行初始未匹配）
    pub async fn import_items<P: AsRef<Path> + Send>(
        &self,
        file_path: P,
    ) -> ApiResult<ImportApiResponse> {
        let started = Instant::now();
        let batch_id = Uuid::new_v4().to_string();

        let sheet = self.importer.parse_item_sheet(file_path).await?;
        let imported = self.item_repo.batch_insert(&sheet.rows)?;

        info!(
            batch_id = %batch_id,
            imported,
            failed = sheet.failures.len(),
            "清单导入完成"
        );

        Ok(ImportApiResponse {
            imported,
            failed: sheet.failures.len(),
            failures: sheet.failures,
            batch_id,
            elapsed_ms: started.elapsed().as_millis() as i64,
        })
    }
}
