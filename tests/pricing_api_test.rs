// ==========================================
// 计价与清单 API 测试
// ==========================================
// 测试范围:
// 1. 各匹配状态下的生效单价与合价推导
// 2. 清单 CRUD 校验与字段级更新后的价格刷新
// 3. 批量删除的部分成功汇总
// 4. 计价导出（含合计行）
// ==========================================


use quota_match::api::ApiError;
use quota_match::domain::{ItemDraft, ItemPatch, MatchStatus};
use test_helpers::*;

#[test]
fn test_multi_quota_pricing_rollup() {
    let (_tmp, state) = create_test_state();
    let version = seed_version(&state, "V1");
    let q1 = seed_quota(&state, version.id, Some("AZ-001"), "砖基础", None, "5.00");
    let q2 = seed_quota(&state, version.id, Some("AZ-002"), "垫层", None, "7.50");
    let item = seed_item(&state, None, "组合项", None, "10");

    state.match_api.attach_quota(item.id, q1.id).unwrap();
    state.match_api.attach_quota(item.id, q2.id).unwrap();

    let row = state.item_api.get_item(item.id).unwrap();
    assert_eq!(row.effective_unit_price, dec("12.50"));
    assert_eq!(row.total_price, dec("125.00"));
}

#[test]
fn test_unmatched_prices_are_zero() {
    let (_tmp, state) = create_test_state();
    let item = seed_item(&state, None, "未匹配项", None, "100");

    let row = state.item_api.get_item(item.id).unwrap();
    assert_eq!(row.item.match_status, MatchStatus::Unmatched);
    assert_eq!(row.effective_unit_price, dec("0"));
    assert_eq!(row.total_price, dec("0"));
}

#[test]
fn test_manual_price_drives_total() {
    let (_tmp, state) = create_test_state();
    let item = seed_item(&state, None, "人工定价项", None, "3");

    state.match_api.set_manual_price(item.id, dec("12.345")).unwrap();

    let row = state.item_api.get_item(item.id).unwrap();
    // 全精度计算 3 × 12.345 = 37.035，展示边界舍入到 37.04（银行家舍入）
    assert_eq!(row.total_price, dec("37.04"));
}

#[test]
fn test_create_item_validation() {
    let (_tmp, state) = create_test_state();

    let empty_name = state.item_api.create_item(ItemDraft {
        item_name: "   ".to_string(),
        ..Default::default()
    });
    assert!(matches!(empty_name, Err(ApiError::InvalidInput(_))));

    let negative_quantity = state.item_api.create_item(ItemDraft {
        item_name: "清单".to_string(),
        quantity: Some(dec("-1")),
        ..Default::default()
    });
    assert!(matches!(negative_quantity, Err(ApiError::InvalidInput(_))));

    // 除名称外允许留空
    let minimal = state.item_api.create_item(ItemDraft {
        item_name: "仅名称".to_string(),
        ..Default::default()
    });
    assert!(minimal.is_ok());
}

#[test]
fn test_patch_quantity_refreshes_total() {
    let (_tmp, state) = create_test_state();
    let version = seed_version(&state, "V1");
    let quota = seed_quota(&state, version.id, Some("AZ-001"), "砖基础", None, "100");
    let item = seed_item(&state, None, "砖基础", None, "1");
    state.match_api.select_quota(item.id, quota.id).unwrap();

    let row = state
        .item_api
        .update_item(
            item.id,
            ItemPatch {
                quantity: Some(dec("2.5")),
                ..Default::default()
            },
        )
        .unwrap();

    assert_eq!(row.item.quantity, Some(dec("2.5")));
    assert_eq!(row.total_price, dec("250.00"));

    // 非法补丁被整体拒绝
    let bad = state.item_api.update_item(
        item.id,
        ItemPatch {
            item_name: Some("".to_string()),
            ..Default::default()
        },
    );
    assert!(matches!(bad, Err(ApiError::InvalidInput(_))));
}

#[test]
fn test_patch_keeps_unspecified_fields() {
    let (_tmp, state) = create_test_state();
    let item = seed_item(&state, Some("BM-01"), "原名称", Some("原特征"), "1");

    let row = state
        .item_api
        .update_item(
            item.id,
            ItemPatch {
                remark: Some("复核过".to_string()),
                ..Default::default()
            },
        )
        .unwrap();

    assert_eq!(row.item.item_code.as_deref(), Some("BM-01"));
    assert_eq!(row.item.item_name, "原名称");
    assert_eq!(row.item.feature_value.as_deref(), Some("原特征"));
    assert_eq!(row.item.remark.as_deref(), Some("复核过"));
}

#[test]
fn test_batch_delete_partial_success() {
    let (_tmp, state) = create_test_state();
    let a = seed_item(&state, None, "清单A", None, "1");
    let b = seed_item(&state, None, "清单B", None, "1");

    let outcome = state
        .item_api
        .batch_delete_items(&[a.id, 9999, b.id])
        .unwrap();

    assert_eq!(outcome.success_count, 2);
    assert_eq!(outcome.fail_count, 1);
    assert_eq!(outcome.failures[0].id, 9999);
    assert!(state.item_api.list_items().unwrap().is_empty());
}

#[test]
fn test_delete_item_cascades_links() {
    let (_tmp, state) = create_test_state();
    let version = seed_version(&state, "V1");
    let quota = seed_quota(&state, version.id, Some("AZ-001"), "砖基础", None, "100");
    let item = seed_item(&state, None, "砖基础", None, "1");
    state.match_api.attach_quota(item.id, quota.id).unwrap();

    state.item_api.delete_item(item.id).unwrap();

    assert!(matches!(
        state.item_api.item_quotas(item.id),
        Err(ApiError::NotFound(_))
    ));
}

#[test]
fn test_export_priced_items_with_grand_total() {
    let (_tmp, state) = create_test_state();
    let version = seed_version(&state, "V1");
    let q1 = seed_quota(&state, version.id, Some("AZ-001"), "砖基础", None, "5.00");
    let q2 = seed_quota(&state, version.id, Some("AZ-002"), "垫层", None, "7.50");

    // MULTI 项: 10 × 12.50 = 125.00
    let multi = seed_item(&state, None, "组合项", None, "10");
    state.match_api.attach_quota(multi.id, q1.id).unwrap();
    state.match_api.attach_quota(multi.id, q2.id).unwrap();

    // 未匹配项计 0，不阻断合计
    seed_item(&state, None, "未匹配项", None, "50");

    let bytes = state.export_api.export_priced_items().unwrap();
    let text = String::from_utf8(bytes).unwrap();
    let lines: Vec<&str> = text.lines().collect();

    assert!(lines[0].contains("清单名称"));
    assert!(lines[0].contains("合价"));
    // 数据两行 + 表头 + 合计
    assert_eq!(lines.len(), 4);
    let last = lines.last().unwrap();
    assert!(last.starts_with("合计"));
    assert!(last.ends_with("125.00"));
}

#[test]
fn test_clear_all_items_keeps_catalog() {
    let (_tmp, state) = create_test_state();
    let version = seed_version(&state, "V1");
    seed_quota(&state, version.id, Some("AZ-001"), "砖基础", None, "100");
    seed_item(&state, None, "清单A", None, "1");
    seed_item(&state, None, "清单B", None, "1");

    let removed = state.item_api.clear_all_items().unwrap();
    assert_eq!(removed, 2);
    assert!(state.item_api.list_items().unwrap().is_empty());
    assert_eq!(state.quota_api.list_by_version(version.id).unwrap().len(), 1);
}
