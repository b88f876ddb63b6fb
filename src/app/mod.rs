// ==========================================
// 企业定额匹配系统 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// 单连接 + Mutex：每个变更操作持锁执行单事务，
// 同一清单上的并发请求天然串行
// ==========================================

use std::sync::{Arc, Mutex};

use crate::api::{ExportApi, ImportApi, ItemApi, MatchApi, QuotaApi, VersionApi};
use crate::db;
use crate::engine::MatchingEngine;
use crate::repository::{
    ItemQuotaRepository, ItemRepository, QuotaRepository, QuotaVersionRepository,
};

/// 应用状态
///
/// 包含所有API实例和共享资源，外层 shell 以此为入口
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 定额版本API
    pub version_api: Arc<VersionApi>,

    /// 定额目录API
    pub quota_api: Arc<QuotaApi>,

    /// 项目清单API
    pub item_api: Arc<ItemApi>,

    /// 匹配API
    pub match_api: Arc<MatchApi>,

    /// 导入API
    pub import_api: Arc<ImportApi>,

    /// 导出API
    pub export_api: Arc<ExportApi>,
}

impl AppState {
    /// 打开数据库并装配全部仓储/引擎/API
    pub fn new(db_path: impl Into<String>) -> anyhow::Result<Self> {
        let db_path = db_path.into();

        let conn = db::open_sqlite_connection(&db_path)?;
        db::init_schema(&conn)?;
        let conn = Arc::new(Mutex::new(conn));

        // 仓储层
        let version_repo = Arc::new(QuotaVersionRepository::new(conn.clone()));
        let quota_repo = Arc::new(QuotaRepository::new(conn.clone()));
        let item_repo = Arc::new(ItemRepository::new(conn.clone()));
        let link_repo = Arc::new(ItemQuotaRepository::new(conn));

        // 引擎层
        let engine = Arc::new(MatchingEngine::new(
            item_repo.clone(),
            quota_repo.clone(),
            version_repo.clone(),
            link_repo.clone(),
        ));

        // API层
        let version_api = Arc::new(VersionApi::new(version_repo.clone(), quota_repo.clone()));
        let quota_api = Arc::new(QuotaApi::new(quota_repo.clone(), version_repo.clone()));
        let item_api = Arc::new(ItemApi::new(item_repo.clone(), link_repo.clone()));
        let match_api = Arc::new(MatchApi::new(engine));
        let import_api = Arc::new(ImportApi::new(
            quota_repo.clone(),
            item_repo.clone(),
            version_repo.clone(),
        ));
        let export_api = Arc::new(ExportApi::new(
            item_repo,
            link_repo,
            quota_repo,
            version_repo,
        ));

        Ok(Self {
            db_path,
            version_api,
            quota_api,
            item_api,
            match_api,
            import_api,
            export_api,
        })
    }
}

/// 默认数据库路径（用户数据目录；不可用时退回当前目录）
pub fn get_default_db_path() -> String {
    match dirs::data_dir() {
        Some(data_dir) => {
            let app_dir = data_dir.join("quota-match");
            if let Err(e) = std::fs::create_dir_all(&app_dir) {
                tracing::warn!("创建数据目录失败，退回当前目录: {}", e);
                return "quota_match.db".to_string();
            }
            app_dir.join("quota_match.db").display().to_string()
        }
        None => "quota_match.db".to_string(),
    }
}
