// ==========================================
// 企业定额匹配系统 - 行字段映射
// ==========================================
// 阶段 1: 原始行记录 → QuotaDraft / ItemDraft
// 表头按别名匹配（中文表头与下划线英文列名均可）；
// 金额/数量空串视为缺省，非法数字按行收集失败不阻断整批
// ==========================================

use crate::domain::{ItemDraft, QuotaDraft};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::file_parser::RawRow;
use rust_decimal::Decimal;
use std::str::FromStr;

/// 定额表列别名
const QUOTA_CODE: &[&str] = &["定额编码", "quota_code"];
const QUOTA_NAME: &[&str] = &["定额名称", "quota_name"];
const QUOTA_FEATURE: &[&str] = &["项目特征", "feature_value"];
const QUOTA_UNIT: &[&str] = &["单位", "unit"];
const QUOTA_UNIT_PRICE: &[&str] = &["综合单价", "单价", "unit_price"];
const QUOTA_LABOR: &[&str] = &["人工费", "labor_cost"];
const QUOTA_MATERIAL: &[&str] = &["材料费", "material_cost"];
const QUOTA_MACHINE: &[&str] = &["机械费", "machine_cost"];
const QUOTA_REMARK: &[&str] = &["备注", "remark"];

/// 清单表列别名
const ITEM_CODE: &[&str] = &["清单编码", "项目编码", "item_code"];
const ITEM_NAME: &[&str] = &["清单名称", "项目名称", "item_name"];
const ITEM_FEATURE: &[&str] = &["项目特征", "feature_value"];
const ITEM_UNIT: &[&str] = &["单位", "unit"];
const ITEM_QUANTITY: &[&str] = &["工程量", "数量", "quantity"];
const ITEM_REMARK: &[&str] = &["备注", "remark"];

/// 定额行映射（row 为数据区行号，从 1 起，用于失败定位）
pub fn map_quota_row(row: usize, record: &RawRow) -> ImportResult<QuotaDraft> {
    let quota_name = required_text(row, record, QUOTA_NAME, "定额名称")?;

    Ok(QuotaDraft {
        quota_code: optional_text(record, QUOTA_CODE),
        quota_name,
        feature_value: optional_text(record, QUOTA_FEATURE),
        unit: optional_text(record, QUOTA_UNIT),
        unit_price: optional_decimal(row, record, QUOTA_UNIT_PRICE, "单价")?,
        labor_cost: optional_decimal(row, record, QUOTA_LABOR, "人工费")?,
        material_cost: optional_decimal(row, record, QUOTA_MATERIAL, "材料费")?,
        machine_cost: optional_decimal(row, record, QUOTA_MACHINE, "机械费")?,
        remark: optional_text(record, QUOTA_REMARK),
    })
}

/// 清单行映射
pub fn map_item_row(row: usize, record: &RawRow) -> ImportResult<ItemDraft> {
    let item_name = required_text(row, record, ITEM_NAME, "清单名称")?;
    let quantity = optional_decimal(row, record, ITEM_QUANTITY, "工程量")?;

    if let Some(q) = quantity {
        if q < Decimal::ZERO {
            return Err(ImportError::FieldValueError {
                row,
                field: "工程量".to_string(),
                message: format!("不能为负数: {}", q),
            });
        }
    }

    Ok(ItemDraft {
        item_code: optional_text(record, ITEM_CODE),
        item_name,
        feature_value: optional_text(record, ITEM_FEATURE),
        unit: optional_text(record, ITEM_UNIT),
        quantity,
        remark: optional_text(record, ITEM_REMARK),
    })
}

/// 按别名取列值（首个非空命中）
fn lookup<'a>(record: &'a RawRow, aliases: &[&str]) -> Option<&'a str> {
    aliases
        .iter()
        .filter_map(|alias| record.get(*alias))
        .map(|v| v.trim())
        .find(|v| !v.is_empty())
}

fn optional_text(record: &RawRow, aliases: &[&str]) -> Option<String> {
    lookup(record, aliases).map(|v| v.to_string())
}

fn required_text(
    row: usize,
    record: &RawRow,
    aliases: &[&str],
    field: &str,
) -> ImportResult<String> {
    lookup(record, aliases)
        .map(|v| v.to_string())
        .ok_or_else(|| ImportError::MissingField {
            row,
            field: field.to_string(),
        })
}

fn optional_decimal(
    row: usize,
    record: &RawRow,
    aliases: &[&str],
    field: &str,
) -> ImportResult<Option<Decimal>> {
    match lookup(record, aliases) {
        None => Ok(None),
        Some(raw) => Decimal::from_str(raw).map(Some).map_err(|e| {
            ImportError::TypeConversionError {
                row,
                field: field.to_string(),
                message: format!("{}: {}", raw, e),
            }
        }),
    }
}
