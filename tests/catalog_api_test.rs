// ==========================================
// 定额目录与版本管理测试
// ==========================================
// 测试范围:
// 1. 版本 CRUD、重名约束、批量删除部分成功
// 2. 版本删除级联清除定额，但不回溯清单快照
// 3. 关键字检索（空关键字/大小写/版本作用域）
// ==========================================


use quota_match::api::ApiError;
use quota_match::domain::MatchStatus;
use test_helpers::*;

#[test]
fn test_version_create_requires_unique_name() {
    let (_tmp, state) = create_test_state();

    seed_version(&state, "2026年第一版");
    let duplicate = state.version_api.create_version("2026年第一版", None);
    assert!(matches!(duplicate, Err(ApiError::InvalidInput(_))));

    let blank = state.version_api.create_version("   ", None);
    assert!(matches!(blank, Err(ApiError::InvalidInput(_))));
}

#[test]
fn test_version_update_checks_rename_conflicts() {
    let (_tmp, state) = create_test_state();
    let v1 = seed_version(&state, "V1");
    let v2 = seed_version(&state, "V2");

    // 与他版本重名：拒绝
    let conflict = state.version_api.update_version(v2.id, Some("V1"), None);
    assert!(matches!(conflict, Err(ApiError::InvalidInput(_))));

    // 改自己的名字与描述：允许（含与自身同名）
    let updated = state
        .version_api
        .update_version(v1.id, Some("V1"), Some("修订说明"))
        .unwrap();
    assert_eq!(updated.version_name, "V1");
    assert_eq!(updated.description.as_deref(), Some("修订说明"));

    let renamed = state
        .version_api
        .update_version(v2.id, Some("V2-final"), None)
        .unwrap();
    assert_eq!(renamed.version_name, "V2-final");
}

#[test]
fn test_versions_listed_newest_first() {
    let (_tmp, state) = create_test_state();
    let v1 = seed_version(&state, "V1");
    let v2 = seed_version(&state, "V2");

    let versions = state.version_api.list_versions().unwrap();
    assert_eq!(versions.len(), 2);
    // 同秒创建时按 id 倒序兜底
    assert_eq!(versions[0].id, v2.id);
    assert_eq!(versions[1].id, v1.id);
}

#[test]
fn test_delete_version_cascades_quotas() {
    let (_tmp, state) = create_test_state();
    let version = seed_version(&state, "V1");
    let quota = seed_quota(&state, version.id, Some("AZ-001"), "砖基础", None, "100");
    seed_quota(&state, version.id, Some("AZ-002"), "垫层", None, "50");

    state.version_api.delete_version(version.id).unwrap();

    assert!(matches!(
        state.version_api.get_version(version.id),
        Err(ApiError::NotFound(_))
    ));
    assert!(matches!(
        state.quota_api.get_quota(quota.id),
        Err(ApiError::NotFound(_))
    ));
    // 版本作用域的查询一并失效
    assert!(matches!(
        state.quota_api.list_by_version(version.id),
        Err(ApiError::NotFound(_))
    ));
}

#[test]
fn test_delete_version_keeps_item_snapshots() {
    let (_tmp, state) = create_test_state();
    let version = seed_version(&state, "V1");
    let quota = seed_quota(&state, version.id, Some("AZ-001"), "砖基础", Some("M5"), "428.70");
    let single = seed_item(&state, Some("AZ-001"), "砖基础", Some("M5"), "2");
    let multi = seed_item(&state, None, "组合项", None, "1");

    state.match_api.run_match(version.id, None).unwrap();
    state.match_api.attach_quota(multi.id, quota.id).unwrap();

    state.version_api.delete_version(version.id).unwrap();

    // 单定额快照不被目录删除回溯
    let single = reload_item(&state, single.id);
    assert_eq!(single.match_status, MatchStatus::Matched);
    assert_eq!(single.matched_unit_price, Some(dec("428.70")));

    // 关联快照同样保持
    let links = state.item_api.item_quotas(multi.id).unwrap();
    assert_eq!(links.len(), 1);
    assert_eq!(links[0].unit_price, Some(dec("428.70")));
}

#[test]
fn test_batch_delete_versions_partial_success() {
    let (_tmp, state) = create_test_state();
    let v1 = seed_version(&state, "V1");
    let v2 = seed_version(&state, "V2");

    let outcome = state
        .version_api
        .batch_delete_versions(&[v1.id, 777, v2.id])
        .unwrap();

    assert_eq!(outcome.success_count, 2);
    assert_eq!(outcome.fail_count, 1);
    assert_eq!(outcome.failures[0].id, 777);
    assert!(state.version_api.list_versions().unwrap().is_empty());
}

#[test]
fn test_keyword_search_rules() {
    let (_tmp, state) = create_test_state();
    let v1 = seed_version(&state, "V1");
    let v2 = seed_version(&state, "V2");
    seed_quota(&state, v1.id, Some("AZ-001"), "砖基础", Some("M5水泥砂浆"), "100");
    seed_quota(&state, v1.id, Some("BK-300"), "Brick Wall", None, "50");
    seed_quota(&state, v2.id, Some("AZ-001"), "砖基础", None, "120");

    // 空关键字 → 空结果（不是"全部"）
    assert!(state.quota_api.search(v1.id, "").unwrap().is_empty());
    assert!(state.quota_api.search(v1.id, "   ").unwrap().is_empty());

    // 大小写不敏感子串，可命中编码/名称/特征
    assert_eq!(state.quota_api.search(v1.id, "brick").unwrap().len(), 1);
    assert_eq!(state.quota_api.search(v1.id, "az-").unwrap().len(), 1);
    assert_eq!(state.quota_api.search(v1.id, "水泥").unwrap().len(), 1);

    // 作用域限定在指定版本
    assert_eq!(state.quota_api.search(v2.id, "az-001").unwrap().len(), 1);

    // 未知版本
    assert!(matches!(
        state.quota_api.search(999, "az"),
        Err(ApiError::NotFound(_))
    ));
}

#[test]
fn test_quota_crud_validation() {
    let (_tmp, state) = create_test_state();
    let version = seed_version(&state, "V1");

    // 名称必填
    let blank = state.quota_api.create_quota(
        version.id,
        quota_match::domain::QuotaDraft {
            quota_name: " ".to_string(),
            ..Default::default()
        },
    );
    assert!(matches!(blank, Err(ApiError::InvalidInput(_))));

    // 编码在版本内不要求唯一
    seed_quota(&state, version.id, Some("AZ-001"), "砖基础A", None, "1");
    seed_quota(&state, version.id, Some("AZ-001"), "砖基础B", None, "2");
    assert_eq!(state.quota_api.list_by_version(version.id).unwrap().len(), 2);

    // 未知版本入库拒绝
    let orphan = state.quota_api.create_quota(
        404,
        quota_match::domain::QuotaDraft {
            quota_name: "孤儿定额".to_string(),
            ..Default::default()
        },
    );
    assert!(matches!(orphan, Err(ApiError::NotFound(_))));
}

#[test]
fn test_batch_delete_quotas_partial_success() {
    let (_tmp, state) = create_test_state();
    let version = seed_version(&state, "V1");
    let q1 = seed_quota(&state, version.id, Some("AZ-001"), "砖基础", None, "1");
    let q2 = seed_quota(&state, version.id, Some("AZ-002"), "垫层", None, "2");

    let outcome = state
        .quota_api
        .batch_delete_quotas(&[q1.id, 555, q2.id])
        .unwrap();

    assert_eq!(outcome.success_count, 2);
    assert_eq!(outcome.fail_count, 1);
    assert_eq!(outcome.failures[0].reason, "企业定额不存在");
    assert_eq!(state.version_api.quota_count(version.id).unwrap(), 0);
}
