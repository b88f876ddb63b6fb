// ==========================================
// 企业定额匹配系统 - 导出 API
// ==========================================
// 职责: 计价结果与定额目录的 CSV 导出
// 金额仅在此边界舍入到 2 位小数；合计行在末尾
// ==========================================

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::info;

use crate::api::error::{ApiError, ApiResult};
use crate::domain::Item;
use crate::engine::PricingAggregator;
use crate::repository::{
    ItemQuotaRepository, ItemRepository, QuotaRepository, QuotaVersionRepository,
};

// ==========================================
// ExportApi - 导出 API
// ==========================================
pub struct ExportApi {
    item_repo: Arc<ItemRepository>,
    link_repo: Arc<ItemQuotaRepository>,
    quota_repo: Arc<QuotaRepository>,
    version_repo: Arc<QuotaVersionRepository>,
    pricing: PricingAggregator,
}

impl ExportApi {
    /// 创建新的ExportApi实例
    pub fn new(
        item_repo: Arc<ItemRepository>,
        link_repo: Arc<ItemQuotaRepository>,
        quota_repo: Arc<QuotaRepository>,
        version_repo: Arc<QuotaVersionRepository>,
    ) -> Self {
        Self {
            item_repo,
            link_repo,
            quota_repo,
            version_repo,
            pricing: PricingAggregator::new(),
        }
    }

    /// 导出计价结果（CSV 字节流，末行为合计）
    ///
    /// 未匹配清单合价按 0 计入合计，不阻断导出
    pub fn export_priced_items(&self) -> ApiResult<Vec<u8>> {
        let items = self.item_repo.list_all()?;

        let mut writer = csv::Writer::from_writer(Vec::new());
        writer
            .write_record([
                "清单编码",
                "清单名称",
                "项目特征",
                "单位",
                "工程量",
                "匹配状态",
                "定额编码",
                "定额名称",
                "生效单价",
                "合价",
            ])
            .map_err(|e| ApiError::InternalError(e.to_string()))?;

        let mut totals: Vec<Decimal> = Vec::with_capacity(items.len());
        for item in &items {
            let links = self.link_repo.list_by_item(item.id)?;
            let effective = self.pricing.effective_price(item, &links);
            let total = self.pricing.total_price(item, &links);
            totals.push(total);

            let quantity_cell = Self::text_or_empty(item.quantity);
            let matched_name_cell = Self::matched_name_cell(item, links.len());
            let effective_cell = self.pricing.present(effective).to_string();
            let total_cell = self.pricing.present(total).to_string();

            writer
                .write_record([
                    item.item_code.as_deref().unwrap_or(""),
                    item.item_name.as_str(),
                    item.feature_value.as_deref().unwrap_or(""),
                    item.unit.as_deref().unwrap_or(""),
                    quantity_cell.as_str(),
                    item.match_status.as_str(),
                    item.matched_quota_code.as_deref().unwrap_or(""),
                    matched_name_cell.as_str(),
                    effective_cell.as_str(),
                    total_cell.as_str(),
                ])
                .map_err(|e| ApiError::InternalError(e.to_string()))?;
        }

        let grand_total_cell = self.pricing.present(self.pricing.grand_total(totals)).to_string();
        writer
            .write_record([
                "合计",
                "",
                "",
                "",
                "",
                "",
                "",
                "",
                "",
                grand_total_cell.as_str(),
            ])
            .map_err(|e| ApiError::InternalError(e.to_string()))?;

        let bytes = writer
            .into_inner()
            .map_err(|e| ApiError::InternalError(e.to_string()))?;
        info!(items = items.len(), "计价结果导出完成");
        Ok(bytes)
    }

    /// 导出版本内定额目录（CSV 字节流）
    pub fn export_quotas(&self, version_id: i64) -> ApiResult<Vec<u8>> {
        if !self.version_repo.exists(version_id)? {
            return Err(ApiError::NotFound(format!(
                "QuotaVersion(id={})不存在",
                version_id
            )));
        }

        let quotas = self.quota_repo.list_by_version(version_id)?;

        let mut writer = csv::Writer::from_writer(Vec::new());
        writer
            .write_record([
                "定额编码",
                "定额名称",
                "项目特征",
                "单位",
                "综合单价",
                "人工费",
                "材料费",
                "机械费",
                "备注",
            ])
            .map_err(|e| ApiError::InternalError(e.to_string()))?;

        for quota in &quotas {
            let unit_price_cell = Self::text_or_empty(quota.unit_price);
            let labor_cell = Self::text_or_empty(quota.labor_cost);
            let material_cell = Self::text_or_empty(quota.material_cost);
            let machine_cell = Self::text_or_empty(quota.machine_cost);

            writer
                .write_record([
                    quota.quota_code.as_deref().unwrap_or(""),
                    quota.quota_name.as_str(),
                    quota.feature_value.as_deref().unwrap_or(""),
                    quota.unit.as_deref().unwrap_or(""),
                    unit_price_cell.as_str(),
                    labor_cell.as_str(),
                    material_cell.as_str(),
                    machine_cell.as_str(),
                    quota.remark.as_deref().unwrap_or(""),
                ])
                .map_err(|e| ApiError::InternalError(e.to_string()))?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| ApiError::InternalError(e.to_string()))?;
        info!(version_id, quotas = quotas.len(), "定额目录导出完成");
        Ok(bytes)
    }

    fn text_or_empty(value: Option<Decimal>) -> String {
        value.map(|d| d.to_string()).unwrap_or_default()
    }

    /// 定额名称列：多定额时展示关联数摘要
    fn matched_name_cell(item: &Item, link_count: usize) -> String {
        if link_count > 0 {
            format!("多定额({}条)", link_count)
        } else {
            item.matched_quota_name.clone().unwrap_or_default()
        }
    }
}
