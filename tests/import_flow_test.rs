// ==========================================
// 表格导入流程测试
// ==========================================
// 测试范围:
// 1. CSV 导入定额/清单（追加语义、行级失败收集）
// 2. 重复导入不去重（与目录语义一致）
// 3. 导入 → 自动匹配 → 计价导出 的端到端链路
// ==========================================


use quota_match::api::ApiError;
use quota_match::domain::MatchStatus;
use std::io::Write;
use tempfile::NamedTempFile;
use test_helpers::*;

fn write_csv(lines: &[&str]) -> NamedTempFile {
    let mut file = NamedTempFile::with_suffix(".csv").unwrap();
    for line in lines {
        writeln!(file, "{}", line).unwrap();
    }
    file.flush().unwrap();
    file
}

#[tokio::test]
async fn test_import_quotas_appends_rows() {
    let (_tmp, state) = create_test_state();
    let version = seed_version(&state, "V1");

    let file = write_csv(&[
        "定额编码,定额名称,项目特征,单位,综合单价",
        "AZ-001,砖基础,M5水泥砂浆,m3,428.70",
        "AZ-002,混凝土垫层,C15,m3,512.35",
    ]);

    let resp = state
        .import_api
        .import_quotas(version.id, file.path())
        .await
        .unwrap();
    assert_eq!(resp.imported, 2);
    assert_eq!(resp.failed, 0);
    assert!(!resp.batch_id.is_empty());

    // 再导一次：追加，不去重、不覆盖
    let resp = state
        .import_api
        .import_quotas(version.id, file.path())
        .await
        .unwrap();
    assert_eq!(resp.imported, 2);
    assert_eq!(state.version_api.quota_count(version.id).unwrap(), 4);
}

#[tokio::test]
async fn test_import_quotas_collects_row_failures() {
    let (_tmp, state) = create_test_state();
    let version = seed_version(&state, "V1");

    let file = write_csv(&[
        "定额编码,定额名称,综合单价",
        "AZ-001,砖基础,428.70",
        "AZ-002,,100",        // 缺名称
        "AZ-003,垫层,abc",    // 单价非数字
        "AZ-004,钢筋制安,5830",
    ]);

    let resp = state
        .import_api
        .import_quotas(version.id, file.path())
        .await
        .unwrap();

    assert_eq!(resp.imported, 2);
    assert_eq!(resp.failed, 2);
    let failed_rows: Vec<usize> = resp.failures.iter().map(|f| f.row).collect();
    assert_eq!(failed_rows, vec![2, 3]);
    assert_eq!(state.version_api.quota_count(version.id).unwrap(), 2);
}

#[tokio::test]
async fn test_import_quotas_unknown_version() {
    let (_tmp, state) = create_test_state();
    let file = write_csv(&["定额名称", "砖基础"]);

    let result = state.import_api.import_quotas(404, file.path()).await;
    assert!(matches!(result, Err(ApiError::NotFound(_))));
}

#[tokio::test]
async fn test_import_rejects_unsupported_format() {
    let (_tmp, state) = create_test_state();
    let version = seed_version(&state, "V1");
    let file = NamedTempFile::with_suffix(".docx").unwrap();

    let result = state.import_api.import_quotas(version.id, file.path()).await;
    assert!(matches!(result, Err(ApiError::ImportError(_))));
}

#[tokio::test]
async fn test_import_items_start_unmatched() {
    let (_tmp, state) = create_test_state();

    let file = write_csv(&[
        "清单编码,清单名称,项目特征,单位,工程量",
        "AZ-001,砖基础,M5水泥砂浆,m3,36.5",
        ",装饰吊顶,轻钢龙骨,m2,-3", // 负工程量：行级失败
    ]);

    let resp = state.import_api.import_items(file.path()).await.unwrap();
    assert_eq!(resp.imported, 1);
    assert_eq!(resp.failed, 1);

    let items = state.item_api.list_items().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].item.match_status, MatchStatus::Unmatched);
    assert_eq!(items[0].item.quantity, Some(dec("36.5")));
}

#[tokio::test]
async fn test_batch_parse_tolerates_single_file_failure() {
    use quota_match::importer::{SheetImporter, SheetImporterImpl};

    let good = write_csv(&["定额名称,综合单价", "砖基础,1"]);
    let bad = NamedTempFile::with_suffix(".docx").unwrap();

    let importer = SheetImporterImpl::new();
    let results = importer
        .batch_parse_quota_sheets(vec![good.path(), bad.path()])
        .await;

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].as_ref().unwrap().rows.len(), 1);
    assert!(results[1].is_err());
}

#[tokio::test]
async fn test_import_match_export_end_to_end() {
    let (_tmp, state) = create_test_state();
    let version = seed_version(&state, "目录2026");

    let quota_file = write_csv(&[
        "定额编码,定额名称,项目特征,单位,综合单价",
        "AZ-001,砖基础,M5水泥砂浆,m3,400.00",
        "AZ-003,土方开挖,三类土,m3,20.00",
    ]);
    let item_file = write_csv(&[
        "清单编码,清单名称,项目特征,单位,工程量",
        "AZ-001,砖基础,M5水泥砂浆,m3,2",
        "AZ-003,土方开挖,三类土,m3,10",
        "XX-999,幕墙,玻璃,m2,5",
    ]);

    state
        .import_api
        .import_quotas(version.id, quota_file.path())
        .await
        .unwrap();
    state
        .import_api
        .import_items(item_file.path())
        .await
        .unwrap();

    let run = state.match_api.run_match(version.id, None).unwrap();
    assert_eq!(run.matched_count, 2);
    assert_eq!(run.report.unmatched, 1);

    // 2×400 + 10×20 + 0 = 1000.00
    let bytes = state.export_api.export_priced_items().unwrap();
    let text = String::from_utf8(bytes).unwrap();
    let last = text.lines().last().unwrap();
    assert!(last.starts_with("合计"));
    assert!(last.ends_with("1000.00"));
}

#[tokio::test]
async fn test_export_quota_catalog() {
    let (_tmp, state) = create_test_state();
    let version = seed_version(&state, "V1");
    seed_quota(&state, version.id, Some("AZ-001"), "砖基础", Some("M5"), "428.70");

    let bytes = state.export_api.export_quotas(version.id).unwrap();
    let text = String::from_utf8(bytes).unwrap();

    assert!(text.lines().next().unwrap().contains("定额编码"));
    assert!(text.contains("AZ-001"));
    assert!(text.contains("428.70"));

    assert!(matches!(
        state.export_api.export_quotas(999),
        Err(ApiError::NotFound(_))
    ));
}
