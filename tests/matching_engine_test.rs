// ==========================================
// 自动匹配引擎测试
// ==========================================
// 测试范围:
// 1. 精确键匹配（编码+特征 / 名称退回）
// 2. 歧义与零命中一律保持未匹配
// 3. 人工决策粘滞，MATCHED 可刷新
// 4. 匹配键策略开关
// ==========================================


use quota_match::api::ApiError;
use quota_match::domain::MatchStatus;
use quota_match::engine::MatchPolicy;
use test_helpers::*;

#[test]
fn test_unique_code_match_sets_snapshot() {
    let (_tmp, state) = create_test_state();
    let version = seed_version(&state, "V1");
    let quota = seed_quota(
        &state,
        version.id,
        Some("AZ-001"),
        "砖基础",
        Some("M5水泥砂浆"),
        "428.70",
    );
    let item = seed_item(&state, Some("AZ-001"), "砖基础", Some("M5水泥砂浆"), "10");

    let run = state.match_api.run_match(version.id, None).unwrap();
    assert_eq!(run.matched_count, 1);

    let item = reload_item(&state, item.id);
    assert_eq!(item.match_status, MatchStatus::Matched);
    assert_eq!(item.matched_quota_id, Some(quota.id));
    assert_eq!(item.matched_quota_code.as_deref(), Some("AZ-001"));
    assert_eq!(item.matched_unit_price, Some(dec("428.70")));
}

#[test]
fn test_ambiguous_candidates_stay_unmatched() {
    let (_tmp, state) = create_test_state();
    let version = seed_version(&state, "V1");
    // 同编码同特征的两条定额：歧义，不得猜测
    seed_quota(&state, version.id, Some("AZ-001"), "砖基础A", Some("M5"), "100");
    seed_quota(&state, version.id, Some("AZ-001"), "砖基础B", Some("M5"), "200");
    let item = seed_item(&state, Some("AZ-001"), "砖基础", Some("M5"), "1");

    let run = state.match_api.run_match(version.id, None).unwrap();
    assert_eq!(run.matched_count, 0);
    assert_eq!(run.report.ambiguous, 1);

    let item = reload_item(&state, item.id);
    assert_eq!(item.match_status, MatchStatus::Unmatched);
    assert_eq!(item.matched_quota_id, None);
}

#[test]
fn test_zero_hit_is_normal_outcome() {
    let (_tmp, state) = create_test_state();
    let version = seed_version(&state, "V1");
    seed_quota(&state, version.id, Some("AZ-001"), "砖基础", Some("M5"), "100");
    let item = seed_item(&state, Some("ZZ-404"), "幕墙", None, "3");

    let run = state.match_api.run_match(version.id, None).unwrap();
    assert_eq!(run.report.unmatched, 1);
    assert_eq!(reload_item(&state, item.id).match_status, MatchStatus::Unmatched);
}

#[test]
fn test_name_fallback_when_code_absent() {
    let (_tmp, state) = create_test_state();
    let version = seed_version(&state, "V1");
    let quota = seed_quota(&state, version.id, Some("AZ-003"), "土方开挖", Some("三类土"), "18.60");
    let item = seed_item(&state, None, "土方开挖", Some("三类土"), "120");

    state.match_api.run_match(version.id, None).unwrap();

    let item = reload_item(&state, item.id);
    assert_eq!(item.match_status, MatchStatus::Matched);
    assert_eq!(item.matched_quota_id, Some(quota.id));
}

#[test]
fn test_name_fallback_can_be_disabled() {
    let (_tmp, state) = create_test_state();
    let version = seed_version(&state, "V1");
    seed_quota(&state, version.id, Some("AZ-003"), "土方开挖", Some("三类土"), "18.60");
    let item = seed_item(&state, None, "土方开挖", Some("三类土"), "120");

    let policy = MatchPolicy {
        name_fallback: false,
        trim_keys: true,
    };
    let run = state.match_api.run_match(version.id, Some(policy)).unwrap();

    assert_eq!(run.matched_count, 0);
    assert_eq!(reload_item(&state, item.id).match_status, MatchStatus::Unmatched);
}

#[test]
fn test_trim_keys_normalization_only() {
    let (_tmp, state) = create_test_state();
    let version = seed_version(&state, "V1");
    seed_quota(&state, version.id, Some(" AZ-001 "), "砖基础", Some("M5"), "100");
    let matched = seed_item(&state, Some("AZ-001"), "砖基础", Some("M5 "), "1");
    // 大小写不同不是空白问题，必须保持不命中
    let cased = seed_item(&state, Some("az-001"), "砖基础", Some("M5"), "1");

    state.match_api.run_match(version.id, None).unwrap();

    assert_eq!(reload_item(&state, matched.id).match_status, MatchStatus::Matched);
    assert_eq!(reload_item(&state, cased.id).match_status, MatchStatus::Unmatched);
}

#[test]
fn test_manual_and_multi_are_sticky() {
    let (_tmp, state) = create_test_state();
    let version = seed_version(&state, "V1");
    let quota = seed_quota(&state, version.id, Some("AZ-001"), "砖基础", Some("M5"), "100");

    // MANUAL: 人工定价后重跑不得覆盖
    let manual_item = seed_item(&state, Some("AZ-001"), "砖基础", Some("M5"), "2");
    state.match_api.set_manual_price(manual_item.id, dec("9.90")).unwrap();

    // MULTI: 挂接定额后重跑不得覆盖
    let multi_item = seed_item(&state, Some("AZ-001"), "砖基础", Some("M5"), "3");
    state.match_api.attach_quota(multi_item.id, quota.id).unwrap();

    let run = state.match_api.run_match(version.id, None).unwrap();
    assert_eq!(run.report.skipped, 2);

    let manual_item = reload_item(&state, manual_item.id);
    assert_eq!(manual_item.match_status, MatchStatus::Manual);
    assert_eq!(manual_item.matched_unit_price, Some(dec("9.90")));

    let multi_item = reload_item(&state, multi_item.id);
    assert_eq!(multi_item.match_status, MatchStatus::Multi);
}

#[test]
fn test_matched_state_is_refreshable() {
    let (_tmp, state) = create_test_state();
    let version = seed_version(&state, "V1");
    let quota = seed_quota(&state, version.id, Some("AZ-001"), "砖基础", Some("M5"), "100");
    let item = seed_item(&state, Some("AZ-001"), "砖基础", Some("M5"), "1");

    state.match_api.run_match(version.id, None).unwrap();
    assert_eq!(reload_item(&state, item.id).match_status, MatchStatus::Matched);

    // 目录里唯一命中被删除后重跑：MATCHED 刷新回未匹配
    state.quota_api.delete_quota(quota.id).unwrap();
    state.match_api.run_match(version.id, None).unwrap();

    let item = reload_item(&state, item.id);
    assert_eq!(item.match_status, MatchStatus::Unmatched);
    assert_eq!(item.matched_quota_id, None);
    assert_eq!(item.matched_unit_price, None);
}

#[test]
fn test_run_match_unknown_version() {
    let (_tmp, state) = create_test_state();
    let result = state.match_api.run_match(404, None);
    assert!(matches!(result, Err(ApiError::NotFound(_))));
}

#[test]
fn test_rematch_refreshes_to_new_unique_hit() {
    let (_tmp, state) = create_test_state();
    let version = seed_version(&state, "V1");
    let old_quota = seed_quota(&state, version.id, Some("AZ-001"), "砖基础", Some("M5"), "100");
    let item = seed_item(&state, Some("AZ-001"), "砖基础", Some("M5"), "1");

    state.match_api.run_match(version.id, None).unwrap();
    assert_eq!(reload_item(&state, item.id).matched_quota_id, Some(old_quota.id));

    // 换价重导：删旧增新，重跑后快照指向新定额
    state.quota_api.delete_quota(old_quota.id).unwrap();
    let new_quota = seed_quota(&state, version.id, Some("AZ-001"), "砖基础", Some("M5"), "150");
    state.match_api.run_match(version.id, None).unwrap();

    let item = reload_item(&state, item.id);
    assert_eq!(item.matched_quota_id, Some(new_quota.id));
    assert_eq!(item.matched_unit_price, Some(dec("150")));
}
