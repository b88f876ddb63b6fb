// ==========================================
// 企业定额匹配系统 - 清单 API
// ==========================================
// 职责: 清单 CRUD、字段级部分更新、关联查询
// 合价在读取时由计价引擎推导，列表返回展示精度
// ==========================================

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::error::{ApiError, ApiResult};
use crate::api::response::BatchOutcome;
use crate::domain::{Item, ItemDraft, ItemPatch, ItemQuotaLink};
use crate::engine::PricingAggregator;
use crate::repository::{ItemQuotaRepository, ItemRepository};

// ==========================================
// ItemWithPrice - 清单 + 派生价格
// ==========================================
/// 用于前端展示的清单完整信息（实体 + 派生价格，展示精度）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemWithPrice {
    #[serde(flatten)]
    pub item: Item,
    pub effective_unit_price: Decimal,
    pub total_price: Decimal,
}

// ==========================================
// ItemApi - 清单 API
// ==========================================
pub struct ItemApi {
    item_repo: Arc<ItemRepository>,
    link_repo: Arc<ItemQuotaRepository>,
    pricing: PricingAggregator,
}

impl ItemApi {
    /// 创建新的ItemApi实例
    pub fn new(item_repo: Arc<ItemRepository>, link_repo: Arc<ItemQuotaRepository>) -> Self {
        Self {
            item_repo,
            link_repo,
            pricing: PricingAggregator::new(),
        }
    }

    // ==========================================
    // 查询接口
    // ==========================================

    /// 清单列表（含派生的生效单价与合价）
    pub fn list_items(&self) -> ApiResult<Vec<ItemWithPrice>> {
        let items = self.item_repo.list_all()?;

        let mut result = Vec::with_capacity(items.len());
        for item in items {
            let links = self.link_repo.list_by_item(item.id)?;
            result.push(self.with_price(item, &links));
        }
        Ok(result)
    }

    /// 单条清单（含派生价格）
    pub fn get_item(&self, item_id: i64) -> ApiResult<ItemWithPrice> {
        let item = self.require_item(item_id)?;
        let links = self.link_repo.list_by_item(item_id)?;
        Ok(self.with_price(item.item, &links))
    }

    /// 清单的多定额关联（挂接顺序）
    pub fn item_quotas(&self, item_id: i64) -> ApiResult<Vec<ItemQuotaLink>> {
        self.require_item(item_id)?;
        Ok(self.link_repo.list_by_item(item_id)?)
    }

    // ==========================================
    // 变更接口
    // ==========================================

    /// 新增清单（默认未匹配；除名称外字段均可留空）
    pub fn create_item(&self, draft: ItemDraft) -> ApiResult<Item> {
        Self::validate_name(&draft.item_name)?;
        Self::validate_quantity(&draft.quantity)?;

        let item = self.item_repo.insert(&draft)?;
        info!(item_id = item.id, "新增清单成功");
        Ok(item)
    }

    /// 字段级部分更新（只更新传入的字段）
    ///
    /// 匹配状态不在此处修改；工程量变化后合价随读取自动刷新
    pub fn update_item(&self, item_id: i64, patch: ItemPatch) -> ApiResult<ItemWithPrice> {
        let mut item = self.require_item(item_id)?.item;

        if let Some(item_name) = patch.item_name {
            Self::validate_name(&item_name)?;
            item.item_name = item_name;
        }
        if let Some(quantity) = patch.quantity {
            Self::validate_quantity(&Some(quantity))?;
            item.quantity = Some(quantity);
        }
        if let Some(item_code) = patch.item_code {
            item.item_code = Some(item_code);
        }
        if let Some(feature_value) = patch.feature_value {
            item.feature_value = Some(feature_value);
        }
        if let Some(unit) = patch.unit {
            item.unit = Some(unit);
        }
        if let Some(remark) = patch.remark {
            item.remark = Some(remark);
        }

        self.item_repo.update(&item)?;
        let links = self.link_repo.list_by_item(item_id)?;
        Ok(self.with_price(item, &links))
    }

    /// 删除清单（关联级联删除）
    pub fn delete_item(&self, item_id: i64) -> ApiResult<()> {
        if !self.item_repo.delete(item_id)? {
            return Err(ApiError::NotFound(format!("Item(id={})不存在", item_id)));
        }
        info!(item_id, "删除清单成功");
        Ok(())
    }

    /// 批量删除清单（逐条执行，单条失败不中断）
    pub fn batch_delete_items(&self, item_ids: &[i64]) -> ApiResult<BatchOutcome> {
        let mut outcome = BatchOutcome::new();

        for &item_id in item_ids {
            match self.item_repo.delete(item_id) {
                Ok(true) => outcome.record_success(),
                Ok(false) => outcome.record_failure(item_id, "项目清单不存在"),
                Err(e) => outcome.record_failure(item_id, e.to_string()),
            }
        }

        info!(
            success = outcome.success_count,
            failed = outcome.fail_count,
            "批量删除清单完成"
        );
        Ok(outcome)
    }

    /// 清空全部清单（保留定额目录）
    pub fn clear_all_items(&self) -> ApiResult<usize> {
        let removed = self.item_repo.delete_all()?;
        info!(removed, "已清理所有项目清单数据（定额目录保留）");
        Ok(removed)
    }

    // ==========================================
    // 内部辅助
    // ==========================================

    fn with_price(&self, item: Item, links: &[ItemQuotaLink]) -> ItemWithPrice {
        let effective = self.pricing.effective_price(&item, links);
        let total = self.pricing.total_price(&item, links);
        ItemWithPrice {
            effective_unit_price: self.pricing.present(effective),
            total_price: self.pricing.present(total),
            item,
        }
    }

    fn require_item(&self, item_id: i64) -> ApiResult<ItemWithPrice> {
        let item = self
            .item_repo
            .find_by_id(item_id)?
            .ok_or_else(|| ApiError::NotFound(format!("Item(id={})不存在", item_id)))?;
        let links = self.link_repo.list_by_item(item_id)?;
        Ok(self.with_price(item, &links))
    }

    fn validate_name(item_name: &str) -> ApiResult<()> {
        if item_name.trim().is_empty() {
            return Err(ApiError::InvalidInput("清单名称不能为空".to_string()));
        }
        Ok(())
    }

    fn validate_quantity(quantity: &Option<Decimal>) -> ApiResult<()> {
        if let Some(q) = quantity {
            if *q < Decimal::ZERO {
                return Err(ApiError::InvalidInput(format!("工程量不能为负数: {}", q)));
            }
        }
        Ok(())
    }
}
