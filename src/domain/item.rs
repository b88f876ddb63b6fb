// ==========================================
// 企业定额匹配系统 - 项目清单领域模型
// ==========================================
// 匹配状态与快照字段的一致性规则:
// - MATCHED/MANUAL ⇔ 恰有单定额引用且无关联
// - MULTI          ⇔ 至少一条关联且单定额字段清空
// - UNMATCHED      ⇔ 无引用且无关联
// 状态迁移只通过本文件的辅助方法完成，避免散落的字段赋值
// ==========================================

use crate::domain::quota::Quota;
use crate::domain::types::MatchStatus;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ==========================================
// Item - 项目清单行
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    pub id: i64,                       // 清单ID
    pub item_code: Option<String>,     // 清单编码
    pub item_name: String,             // 清单名称（必填）
    pub feature_value: Option<String>, // 项目特征
    pub unit: Option<String>,          // 计量单位
    pub quantity: Option<Decimal>,     // 工程量（≥ 0）
    pub remark: Option<String>,        // 备注

    // ===== 匹配状态 =====
    pub match_status: MatchStatus,

    // ===== 单定额快照（仅 MATCHED/MANUAL 有效）=====
    pub matched_quota_id: Option<i64>,
    pub matched_quota_code: Option<String>,
    pub matched_quota_name: Option<String>,
    pub matched_quota_feature_value: Option<String>,
    pub matched_unit_price: Option<Decimal>,
}

impl Item {
    /// 套用单定额匹配结果（自动或人工），快照定额字段
    pub fn apply_single_match(&mut self, quota: &Quota, status: MatchStatus) {
        debug_assert!(status.has_single_quota_fields());
        self.matched_quota_id = Some(quota.id);
        self.matched_quota_code = quota.quota_code.clone();
        self.matched_quota_name = Some(quota.quota_name.clone());
        self.matched_quota_feature_value = quota.feature_value.clone();
        self.matched_unit_price = quota.unit_price;
        self.match_status = status;
    }

    /// 人工直接定价：价格权威，清除目录引用
    pub fn apply_manual_price(&mut self, price: Decimal) {
        self.matched_quota_id = None;
        self.matched_quota_code = None;
        self.matched_quota_name = None;
        self.matched_quota_feature_value = None;
        self.matched_unit_price = Some(price);
        self.match_status = MatchStatus::Manual;
    }

    /// 清空全部匹配信息，回到未匹配
    pub fn clear_match(&mut self) {
        self.matched_quota_id = None;
        self.matched_quota_code = None;
        self.matched_quota_name = None;
        self.matched_quota_feature_value = None;
        self.matched_unit_price = None;
        self.match_status = MatchStatus::Unmatched;
    }

    /// 进入多定额状态：单定额字段清空，价格由关联汇总
    pub fn enter_multi(&mut self) {
        self.matched_quota_id = None;
        self.matched_quota_code = None;
        self.matched_quota_name = None;
        self.matched_quota_feature_value = None;
        self.matched_unit_price = None;
        self.match_status = MatchStatus::Multi;
    }
}

// ==========================================
// ItemDraft - 待入库的清单行
// ==========================================
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ItemDraft {
    pub item_code: Option<String>,
    pub item_name: String,
    pub feature_value: Option<String>,
    pub unit: Option<String>,
    pub quantity: Option<Decimal>,
    pub remark: Option<String>,
}

// ==========================================
// ItemPatch - 字段级部分更新
// ==========================================
// Some(v) 表示更新该字段；None 表示保持原值
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ItemPatch {
    pub item_code: Option<String>,
    pub item_name: Option<String>,
    pub feature_value: Option<String>,
    pub unit: Option<String>,
    pub quantity: Option<Decimal>,
    pub remark: Option<String>,
}
