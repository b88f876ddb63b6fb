// ==========================================
// 企业定额匹配系统 - 匹配 API
// ==========================================
// 职责: 封装匹配引擎的自动匹配与人工操作
// 版本ID显式传入，无隐式"当前选中版本"
// ==========================================

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::error::ApiResult;
use crate::domain::{Item, ItemQuotaLink};
use crate::engine::{MatchPolicy, MatchRunReport, MatchingEngine};

// ==========================================
// MatchRunResponse - 自动匹配响应
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchRunResponse {
    pub matched_count: usize,
    pub report: MatchRunReport,
}

// ==========================================
// DetachResponse - 摘除关联响应
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetachResponse {
    /// 摘除后剩余关联数
    pub remaining: usize,
    /// 是否因删空回退为未匹配
    pub reverted_to_unmatched: bool,
}

// ==========================================
// MatchApi - 匹配 API
// ==========================================
pub struct MatchApi {
    engine: Arc<MatchingEngine>,
}

impl MatchApi {
    /// 创建新的MatchApi实例
    pub fn new(engine: Arc<MatchingEngine>) -> Self {
        Self { engine }
    }

    /// 对指定版本执行自动匹配
    ///
    /// policy 缺省使用默认匹配键策略（编码+特征，无编码退回名称+特征，去空白）
    pub fn run_match(
        &self,
        version_id: i64,
        policy: Option<MatchPolicy>,
    ) -> ApiResult<MatchRunResponse> {
        let policy = policy.unwrap_or_default();
        let report = self.engine.run_match(version_id, &policy)?;

        Ok(MatchRunResponse {
            matched_count: report.matched,
            report,
        })
    }

    /// 人工单选定额
    pub fn select_quota(&self, item_id: i64, quota_id: i64) -> ApiResult<Item> {
        let item = self.engine.select_quota(item_id, quota_id)?;
        info!(item_id, quota_id, "人工单选定额成功");
        Ok(item)
    }

    /// 人工直接定价
    pub fn set_manual_price(&self, item_id: i64, unit_price: Decimal) -> ApiResult<Item> {
        let item = self.engine.set_manual_price(item_id, unit_price)?;
        info!(item_id, %unit_price, "人工定价成功");
        Ok(item)
    }

    /// 挂接定额（多定额）
    pub fn attach_quota(&self, item_id: i64, quota_id: i64) -> ApiResult<ItemQuotaLink> {
        let link = self.engine.attach_quota(item_id, quota_id)?;
        info!(item_id, quota_id, link_id = link.id, "挂接定额成功");
        Ok(link)
    }

    /// 摘除关联
    pub fn detach_quota(&self, item_id: i64, link_id: i64) -> ApiResult<DetachResponse> {
        let remaining = self.engine.detach_quota(item_id, link_id)?;
        Ok(DetachResponse {
            remaining,
            reverted_to_unmatched: remaining == 0,
        })
    }

    /// 清空清单的全部关联
    ///
    /// # 返回
    /// - `Ok(removed)`: 被移除的关联数（重复调用返回 0，幂等）
    pub fn clear_quotas(&self, item_id: i64) -> ApiResult<usize> {
        let removed = self.engine.clear_quotas(item_id)?;
        Ok(removed)
    }
}
