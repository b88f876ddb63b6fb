// ==========================================
// 企业定额匹配系统 - 演示数据种子
// ==========================================
// 用途: 在本地库中生成一套小型目录与清单，
//       跑一轮自动匹配并打印统计，便于联调/演示
// ==========================================

use quota_match::app::{get_default_db_path, AppState};
use quota_match::domain::{ItemDraft, QuotaDraft};
use rust_decimal::Decimal;
use std::str::FromStr;

fn main() -> anyhow::Result<()> {
    quota_match::logging::init();

    let db_path = get_default_db_path();
    println!("使用数据库: {}", db_path);
    let app = AppState::new(db_path)?;

    // 1. 演示版本（已存在则直接复用）
    let version = match app.version_api.create_version("演示版本2026", Some("种子数据")) {
        Ok(v) => v,
        Err(_) => app
            .version_api
            .list_versions()?
            .into_iter()
            .find(|v| v.version_name == "演示版本2026")
            .expect("演示版本应当存在"),
    };
    println!("定额版本: {} (id={})", version.version_name, version.id);

    // 2. 目录定额
    let quotas = [
        ("AZ-001", "砖基础", "M5水泥砂浆", "m3", "428.70"),
        ("AZ-002", "混凝土垫层", "C15", "m3", "512.35"),
        ("AZ-003", "土方开挖", "三类土,深2m内", "m3", "18.60"),
        ("AZ-004", "钢筋制安", "HRB400 Φ12", "t", "5830.00"),
    ];
    for (code, name, feature, unit, price) in quotas {
        app.quota_api.create_quota(
            version.id,
            QuotaDraft {
                quota_code: Some(code.to_string()),
                quota_name: name.to_string(),
                feature_value: Some(feature.to_string()),
                unit: Some(unit.to_string()),
                unit_price: Some(Decimal::from_str(price)?),
                ..Default::default()
            },
        )?;
    }
    println!("已写入定额 {} 条", quotas.len());

    // 3. 清单（两条可精确命中，一条无对应定额）
    let items = [
        ("AZ-001", "砖基础", "M5水泥砂浆", "m3", "36.5"),
        ("AZ-003", "土方开挖", "三类土,深2m内", "m3", "120"),
        ("XX-999", "装饰吊顶", "轻钢龙骨", "m2", "88"),
    ];
    for (code, name, feature, unit, quantity) in items {
        app.item_api.create_item(ItemDraft {
            item_code: Some(code.to_string()),
            item_name: name.to_string(),
            feature_value: Some(feature.to_string()),
            unit: Some(unit.to_string()),
            quantity: Some(Decimal::from_str(quantity)?),
            ..Default::default()
        })?;
    }
    println!("已写入清单 {} 条", items.len());

    // 4. 自动匹配 + 计价列表
    let run = app.match_api.run_match(version.id, None)?;
    println!(
        "自动匹配完成: 命中 {} / 歧义 {} / 未命中 {} / 跳过 {}",
        run.report.matched, run.report.ambiguous, run.report.unmatched, run.report.skipped
    );

    for row in app.item_api.list_items()? {
        println!(
            "  [{}] {} 状态={} 单价={} 合价={}",
            row.item.id,
            row.item.item_name,
            row.item.match_status,
            row.effective_unit_price,
            row.total_price
        );
    }

    Ok(())
}
