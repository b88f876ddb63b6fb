// ==========================================
// 企业定额匹配系统 - 清单定额关联
// ==========================================
// 多定额匹配的关联记录，挂接时对定额做价格快照
// 快照是复制而非引用：定额后续修改/删除不回写已有关联
// ==========================================

use crate::domain::quota::Quota;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ==========================================
// ItemQuotaLink - 清单-定额关联（价格快照）
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemQuotaLink {
    pub id: i64,                             // 关联ID
    pub item_id: i64,                        // 清单ID
    pub quota_id: i64,                       // 定额ID（仅作去重键，非外键）
    pub quota_code: Option<String>,          // 编码快照
    pub quota_name: Option<String>,          // 名称快照
    pub quota_feature_value: Option<String>, // 特征快照
    pub unit_price: Option<Decimal>,         // 单价快照
    pub sort_order: i32,                     // 挂接顺序
}

impl ItemQuotaLink {
    /// 按当前定额内容生成快照（ID 由数据库生成）
    pub fn snapshot_of(item_id: i64, quota: &Quota, sort_order: i32) -> Self {
        Self {
            id: 0,
            item_id,
            quota_id: quota.id,
            quota_code: quota.quota_code.clone(),
            quota_name: Some(quota.quota_name.clone()),
            quota_feature_value: quota.feature_value.clone(),
            unit_price: quota.unit_price,
            sort_order,
        }
    }
}
