// ==========================================
// 企业定额匹配系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 清单定额匹配与计价（人工最终控制权）
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 匹配状态机与计价规则
pub mod engine;

// 导入层 - 外部表格数据
pub mod importer;

// 数据库基础设施（连接初始化/PRAGMA/建表统一）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// 应用层 - 装配入口
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::{Item, ItemDraft, ItemPatch, ItemQuotaLink, MatchStatus, Quota, QuotaDraft, QuotaVersion};

// 引擎
pub use engine::{MatchPolicy, MatchRunReport, MatchingEngine, PricingAggregator};

// API
pub use api::{ExportApi, ImportApi, ItemApi, MatchApi, QuotaApi, VersionApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "企业定额匹配系统";
