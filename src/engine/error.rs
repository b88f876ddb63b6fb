// ==========================================
// 企业定额匹配系统 - 引擎层错误类型
// ==========================================
// 工具: thiserror 派生宏
// ==========================================

use crate::repository::error::RepositoryError;
use thiserror::Error;

/// 引擎层错误类型
#[derive(Error, Debug)]
pub enum EngineError {
    // ===== 校验错误 =====
    #[error("记录未找到: {entity} with id={id}")]
    NotFound { entity: String, id: String },

    #[error("价格非法: {0}")]
    InvalidPrice(String),

    // ===== 状态机错误 =====
    #[error("定额已挂接: item_id={item_id}, quota_id={quota_id}")]
    AlreadyAttached { item_id: i64, quota_id: i64 },

    #[error("该版本的自动匹配正在进行: version_id={version_id}")]
    MatchRunInProgress { version_id: i64 },

    // ===== 数据访问错误 =====
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Result 类型别名
pub type EngineResult<T> = Result<T, EngineError>;
