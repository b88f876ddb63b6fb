// ==========================================
// 企业定额匹配系统 - 主入口
// ==========================================
// 库模式系统：外层 shell（HTTP/桌面端）经 AppState 接入；
// 此入口负责初始化数据库与日志后待命
// ==========================================

use quota_match::app::{get_default_db_path, AppState};

fn main() {
    // 初始化日志系统
    quota_match::logging::init();

    tracing::info!("==================================================");
    tracing::info!("{} - 清单定额匹配与计价", quota_match::APP_NAME);
    tracing::info!("系统版本: {}", quota_match::VERSION);
    tracing::info!("==================================================");

    // 获取数据库路径
    let db_path = get_default_db_path();
    tracing::info!("使用数据库: {}", db_path);

    // 创建AppState
    tracing::info!("正在初始化AppState...");
    let app_state = match AppState::new(db_path) {
        Ok(state) => state,
        Err(e) => {
            tracing::error!("无法初始化AppState: {}", e);
            std::process::exit(1);
        }
    };

    match app_state.version_api.list_versions() {
        Ok(versions) => {
            tracing::info!("AppState初始化成功，当前定额版本数: {}", versions.len());
        }
        Err(e) => {
            tracing::error!("数据库自检失败: {}", e);
            std::process::exit(1);
        }
    }

    println!("数据库就绪: {}", app_state.db_path);
    println!("库模式接入: use quota_match::app::AppState;");
    println!("演示数据: cargo run --bin seed_demo_catalog");
}
