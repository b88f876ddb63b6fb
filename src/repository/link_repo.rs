// ==========================================
// 企业定额匹配系统 - 清单定额关联仓储
// ==========================================
// 只读侧入口；涉及清单状态的写操作经由 ItemRepository
// 的聚合事务完成（attach_link / detach_link / replace_links_with_state）
// ==========================================

use crate::domain::ItemQuotaLink;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::decimal_from_row;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex};

// ==========================================
// ItemQuotaRepository - 关联仓储
// ==========================================
pub struct ItemQuotaRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ItemQuotaRepository {
    /// 创建新的ItemQuotaRepository实例
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 按ID查询关联
    pub fn find_by_id(&self, link_id: i64) -> RepositoryResult<Option<ItemQuotaLink>> {
        let conn = self.get_conn()?;

        let link = conn
            .query_row(
                &format!("{} WHERE id = ?", Self::SELECT_BASE),
                params![link_id],
                Self::map_row,
            )
            .optional()?;

        Ok(link)
    }

    /// 查询清单的全部关联（挂接顺序）
    pub fn list_by_item(&self, item_id: i64) -> RepositoryResult<Vec<ItemQuotaLink>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(&format!(
            "{} WHERE item_id = ? ORDER BY sort_order, id",
            Self::SELECT_BASE
        ))?;

        let links = stmt
            .query_map(params![item_id], Self::map_row)?
            .collect::<Result<Vec<ItemQuotaLink>, _>>()?;

        Ok(links)
    }

    /// 该清单是否已挂接某定额
    pub fn exists(&self, item_id: i64, quota_id: i64) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;

        let found: Option<i64> = conn
            .query_row(
                "SELECT id FROM project_item_quota WHERE item_id = ? AND quota_id = ? LIMIT 1",
                params![item_id, quota_id],
                |row| row.get(0),
            )
            .optional()?;

        Ok(found.is_some())
    }

    /// 清单的关联数量
    pub fn count_by_item(&self, item_id: i64) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;

        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM project_item_quota WHERE item_id = ?",
            params![item_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    const SELECT_BASE: &'static str = r#"SELECT id, item_id, quota_id, quota_code, quota_name,
                      quota_feature_value, unit_price, sort_order
               FROM project_item_quota"#;

    /// 行映射
    fn map_row(row: &Row<'_>) -> rusqlite::Result<ItemQuotaLink> {
        Ok(ItemQuotaLink {
            id: row.get(0)?,
            item_id: row.get(1)?,
            quota_id: row.get(2)?,
            quota_code: row.get(3)?,
            quota_name: row.get(4)?,
            quota_feature_value: row.get(5)?,
            unit_price: decimal_from_row(row, 6)?,
            sort_order: row.get(7)?,
        })
    }
}
