// ==========================================
// 企业定额匹配系统 - 定额目录 API
// ==========================================
// 职责: 定额 CRUD、版本内关键字检索
// 定额删除不回写既有快照（清单与关联上的价格保持）
// ==========================================

use std::sync::Arc;

use tracing::info;

use crate::api::error::{ApiError, ApiResult};
use crate::api::response::BatchOutcome;
use crate::domain::{Quota, QuotaDraft};
use crate::repository::{QuotaRepository, QuotaVersionRepository};

// ==========================================
// QuotaApi - 定额目录 API
// ==========================================
pub struct QuotaApi {
    quota_repo: Arc<QuotaRepository>,
    version_repo: Arc<QuotaVersionRepository>,
}

impl QuotaApi {
    /// 创建新的QuotaApi实例
    pub fn new(
        quota_repo: Arc<QuotaRepository>,
        version_repo: Arc<QuotaVersionRepository>,
    ) -> Self {
        Self {
            quota_repo,
            version_repo,
        }
    }

    // ==========================================
    // 查询接口
    // ==========================================

    /// 版本内关键字检索（编码/名称/特征，大小写不敏感子串）
    ///
    /// 空关键字返回空列表而非全部，避免误把检索当浏览
    pub fn search(&self, version_id: i64, keyword: &str) -> ApiResult<Vec<Quota>> {
        self.require_version(version_id)?;
        Ok(self.quota_repo.find_by_keyword(version_id, keyword)?)
    }

    /// 版本内全部定额
    pub fn list_by_version(&self, version_id: i64) -> ApiResult<Vec<Quota>> {
        self.require_version(version_id)?;
        Ok(self.quota_repo.list_by_version(version_id)?)
    }

    /// 单条定额
    pub fn get_quota(&self, quota_id: i64) -> ApiResult<Quota> {
        self.quota_repo
            .find_by_id(quota_id)?
            .ok_or_else(|| ApiError::NotFound(format!("Quota(id={})不存在", quota_id)))
    }

    // ==========================================
    // 变更接口
    // ==========================================

    /// 新增定额
    pub fn create_quota(&self, version_id: i64, draft: QuotaDraft) -> ApiResult<Quota> {
        self.require_version(version_id)?;
        Self::validate_name(&draft.quota_name)?;

        let quota = self.quota_repo.insert(version_id, &draft)?;
        info!(quota_id = quota.id, version_id, "新增定额成功");
        Ok(quota)
    }

    /// 更新定额（覆盖业务字段；归属版本不变）
    pub fn update_quota(&self, quota_id: i64, draft: QuotaDraft) -> ApiResult<Quota> {
        Self::validate_name(&draft.quota_name)?;

        let mut quota = self.get_quota(quota_id)?;
        quota.quota_code = draft.quota_code;
        quota.quota_name = draft.quota_name;
        quota.feature_value = draft.feature_value;
        quota.unit = draft.unit;
        quota.unit_price = draft.unit_price;
        quota.labor_cost = draft.labor_cost;
        quota.material_cost = draft.material_cost;
        quota.machine_cost = draft.machine_cost;
        quota.remark = draft.remark;

        self.quota_repo.update(&quota)?;
        Ok(quota)
    }

    /// 删除定额（已捕获快照的清单不受影响）
    pub fn delete_quota(&self, quota_id: i64) -> ApiResult<()> {
        if !self.quota_repo.delete(quota_id)? {
            return Err(ApiError::NotFound(format!("Quota(id={})不存在", quota_id)));
        }
        info!(quota_id, "删除定额成功");
        Ok(())
    }

    /// 批量删除定额（逐条执行，单条失败不中断）
    pub fn batch_delete_quotas(&self, quota_ids: &[i64]) -> ApiResult<BatchOutcome> {
        let mut outcome = BatchOutcome::new();

        for &quota_id in quota_ids {
            match self.quota_repo.delete(quota_id) {
                Ok(true) => outcome.record_success(),
                Ok(false) => outcome.record_failure(quota_id, "企业定额不存在"),
                Err(e) => outcome.record_failure(quota_id, e.to_string()),
            }
        }

        info!(
            success = outcome.success_count,
            failed = outcome.fail_count,
            "批量删除定额完成"
        );
        Ok(outcome)
    }

    // ==========================================
    // 内部辅助
    // ==========================================

    fn require_version(&self, version_id: i64) -> ApiResult<()> {
        if !self.version_repo.exists(version_id)? {
            return Err(ApiError::NotFound(format!(
                "QuotaVersion(id={})不存在",
                version_id
            )));
        }
        Ok(())
    }

    fn validate_name(quota_name: &str) -> ApiResult<()> {
        if quota_name.trim().is_empty() {
            return Err(ApiError::InvalidInput("定额名称不能为空".to_string()));
        }
        Ok(())
    }
}
