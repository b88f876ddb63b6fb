// ==========================================
// 企业定额匹配系统 - 数据仓储层
// ==========================================
// 职责: 提供数据访问接口,屏蔽数据库细节
// 约束: 所有查询使用参数化,防止 SQL 注入
// 红线: Repository 不含业务逻辑
// ==========================================

pub mod error;
pub mod item_repo;
pub mod link_repo;
pub mod quota_repo;
pub mod version_repo;

// 重导出核心仓储
pub use error::{RepositoryError, RepositoryResult};
pub use item_repo::ItemRepository;
pub use link_repo::ItemQuotaRepository;
pub use quota_repo::QuotaRepository;
pub use version_repo::QuotaVersionRepository;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use rusqlite::types::Type;
use rusqlite::Row;
use std::str::FromStr;

/// 时间戳的库内文本格式
pub(crate) const TIMESTAMP_FMT: &str = "%Y-%m-%d %H:%M:%S";

/// 金额/数量列以 TEXT 存储（全精度），写入时序列化
pub(crate) fn decimal_to_sql(value: &Option<Decimal>) -> Option<String> {
    value.map(|d| d.to_string())
}

/// 读取 TEXT 金额/数量列；空串视为 NULL
pub(crate) fn decimal_from_row(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<Decimal>> {
    let raw: Option<String> = row.get(idx)?;
    match raw {
        None => Ok(None),
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => Decimal::from_str(s.trim())
            .map(Some)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))),
    }
}

/// 读取时间戳列
pub(crate) fn timestamp_from_row(row: &Row<'_>, idx: usize) -> rusqlite::Result<NaiveDateTime> {
    let raw: String = row.get(idx)?;
    NaiveDateTime::parse_from_str(&raw, TIMESTAMP_FMT)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// 读取匹配状态列
pub(crate) fn match_status_from_row(
    row: &Row<'_>,
    idx: usize,
) -> rusqlite::Result<crate::domain::MatchStatus> {
    let raw: String = row.get(idx)?;
    crate::domain::MatchStatus::parse(&raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            Type::Text,
            format!("非法匹配状态: {}", raw).into(),
        )
    })
}
