// ==========================================
// 企业定额匹配系统 - 定额版本 API
// ==========================================
// 职责: 版本 CRUD；删除级联清除版本内定额
// 级联只作用于目录，已捕获价格快照的清单不被回溯修改
// ==========================================

use std::sync::Arc;

use chrono::Local;
use tracing::info;

use crate::api::error::{ApiError, ApiResult};
use crate::api::response::BatchOutcome;
use crate::domain::QuotaVersion;
use crate::repository::{QuotaRepository, QuotaVersionRepository};

// ==========================================
// VersionApi - 定额版本 API
// ==========================================
pub struct VersionApi {
    version_repo: Arc<QuotaVersionRepository>,
    quota_repo: Arc<QuotaRepository>,
}

impl VersionApi {
    /// 创建新的VersionApi实例
    pub fn new(
        version_repo: Arc<QuotaVersionRepository>,
        quota_repo: Arc<QuotaRepository>,
    ) -> Self {
        Self {
            version_repo,
            quota_repo,
        }
    }

    /// 版本列表（创建时间倒序）
    pub fn list_versions(&self) -> ApiResult<Vec<QuotaVersion>> {
        Ok(self.version_repo.list_all()?)
    }

    /// 单个版本
    pub fn get_version(&self, version_id: i64) -> ApiResult<QuotaVersion> {
        self.version_repo
            .find_by_id(version_id)?
            .ok_or_else(|| ApiError::NotFound(format!("QuotaVersion(id={})不存在", version_id)))
    }

    /// 版本内定额数量
    pub fn quota_count(&self, version_id: i64) -> ApiResult<i64> {
        self.get_version(version_id)?;
        Ok(self.quota_repo.count_by_version(version_id)?)
    }

    /// 创建版本（名称必填且全局唯一）
    pub fn create_version(
        &self,
        version_name: &str,
        description: Option<&str>,
    ) -> ApiResult<QuotaVersion> {
        let version_name = version_name.trim();
        if version_name.is_empty() {
            return Err(ApiError::InvalidInput("版本名称不能为空".to_string()));
        }
        if self.version_repo.find_by_name(version_name)?.is_some() {
            return Err(ApiError::InvalidInput("版本名称已存在".to_string()));
        }

        let version = self.version_repo.create(version_name, description)?;
        info!(version_id = version.id, version_name, "创建版本成功");
        Ok(version)
    }

    /// 更新版本（改名需查重；任一字段缺省则保持原值）
    pub fn update_version(
        &self,
        version_id: i64,
        version_name: Option<&str>,
        description: Option<&str>,
    ) -> ApiResult<QuotaVersion> {
        let mut version = self.get_version(version_id)?;

        if let Some(name) = version_name {
            let name = name.trim();
            if !name.is_empty() {
                if let Some(duplicate) = self.version_repo.find_by_name(name)? {
                    if duplicate.id != version_id {
                        return Err(ApiError::InvalidInput("版本名称已存在".to_string()));
                    }
                }
                version.version_name = name.to_string();
            }
        }
        if let Some(desc) = description {
            version.description = Some(desc.to_string());
        }
        version.update_time = Local::now().naive_local();

        self.version_repo.update(&version)?;
        Ok(version)
    }

    /// 删除版本（级联删除版本内定额）
    pub fn delete_version(&self, version_id: i64) -> ApiResult<()> {
        if !self.version_repo.delete(version_id)? {
            return Err(ApiError::NotFound(format!(
                "QuotaVersion(id={})不存在",
                version_id
            )));
        }
        info!(version_id, "删除版本成功（所属定额已级联清除）");
        Ok(())
    }

    /// 批量删除版本（逐条执行，单条失败不中断）
    pub fn batch_delete_versions(&self, version_ids: &[i64]) -> ApiResult<BatchOutcome> {
        let mut outcome = BatchOutcome::new();

        for &version_id in version_ids {
            match self.version_repo.delete(version_id) {
                Ok(true) => outcome.record_success(),
                Ok(false) => outcome.record_failure(version_id, "版本不存在"),
                Err(e) => outcome.record_failure(version_id, e.to_string()),
            }
        }

        info!(
            success = outcome.success_count,
            failed = outcome.fail_count,
            "批量删除版本完成"
        );
        Ok(outcome)
    }
}
