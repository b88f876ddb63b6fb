// ==========================================
// 企业定额匹配系统 - 定额目录领域模型
// ==========================================
// QuotaVersion: 命名的目录快照，定额归属其一
// Quota: 带价目的定额条目
// ==========================================

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ==========================================
// QuotaVersion - 定额版本
// ==========================================
// 用途: 目录快照管理，匹配时显式选择一个版本（无隐式"最新"）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuotaVersion {
    pub id: i64,                     // 版本ID
    pub version_name: String,        // 版本名称（唯一）
    pub description: Option<String>, // 描述
    pub create_time: NaiveDateTime,  // 创建时间
    pub update_time: NaiveDateTime,  // 更新时间
}

// ==========================================
// Quota - 企业定额
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quota {
    pub id: i64,                        // 定额ID
    pub version_id: i64,                // 归属版本
    pub quota_code: Option<String>,     // 定额编码（版本内不要求唯一）
    pub quota_name: String,             // 定额名称（必填）
    pub feature_value: Option<String>,  // 项目特征
    pub unit: Option<String>,           // 计量单位
    pub unit_price: Option<Decimal>,    // 综合单价
    pub labor_cost: Option<Decimal>,    // 人工费
    pub material_cost: Option<Decimal>, // 材料费
    pub machine_cost: Option<Decimal>,  // 机械费
    pub remark: Option<String>,         // 备注
}

// ==========================================
// QuotaDraft - 待入库的定额行
// ==========================================
// 用途: 新建/批量导入时的输入，ID 由数据库生成
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuotaDraft {
    pub quota_code: Option<String>,
    pub quota_name: String,
    pub feature_value: Option<String>,
    pub unit: Option<String>,
    pub unit_price: Option<Decimal>,
    pub labor_cost: Option<Decimal>,
    pub material_cost: Option<Decimal>,
    pub machine_cost: Option<Decimal>,
    pub remark: Option<String>,
}
