// ==========================================
// 企业定额匹配系统 - 项目清单仓储
// ==========================================
// 清单聚合 = project_item 行 + 其 project_item_quota 关联。
// 涉及两表的状态迁移（挂接/摘除/清空/单选）在此以单事务落库，
// 保证"先校验后写入、要么全写要么不写"。
// 红线: Repository 不含业务逻辑——写什么状态由引擎决定，这里只负责原子落库
// ==========================================

use crate::domain::{Item, ItemDraft, ItemQuotaLink, MatchStatus};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::{decimal_from_row, decimal_to_sql, match_status_from_row};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex};

// ==========================================
// ItemRepository - 项目清单仓储
// ==========================================
pub struct ItemRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ItemRepository {
    /// 创建新的ItemRepository实例
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 新增清单行（初始未匹配）
    pub fn insert(&self, draft: &ItemDraft) -> RepositoryResult<Item> {
        let conn = self.get_conn()?;

        conn.execute(
            r#"INSERT INTO project_item (
                    item_code, item_name, feature_value, unit, quantity, remark, match_status
                ) VALUES (?, ?, ?, ?, ?, ?, ?)"#,
            params![
                &draft.item_code,
                &draft.item_name,
                &draft.feature_value,
                &draft.unit,
                decimal_to_sql(&draft.quantity),
                &draft.remark,
                MatchStatus::Unmatched.as_str(),
            ],
        )?;

        Ok(Item {
            id: conn.last_insert_rowid(),
            item_code: draft.item_code.clone(),
            item_name: draft.item_name.clone(),
            feature_value: draft.feature_value.clone(),
            unit: draft.unit.clone(),
            quantity: draft.quantity,
            remark: draft.remark.clone(),
            match_status: MatchStatus::Unmatched,
            matched_quota_id: None,
            matched_quota_code: None,
            matched_quota_name: None,
            matched_quota_feature_value: None,
            matched_unit_price: None,
        })
    }

    /// 批量追加清单行（导入，事务化）
    pub fn batch_insert(&self, drafts: &[ItemDraft]) -> RepositoryResult<usize> {
        if drafts.is_empty() {
            return Ok(0);
        }

        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        {
            let mut stmt = tx.prepare(
                r#"INSERT INTO project_item (
                        item_code, item_name, feature_value, unit, quantity, remark, match_status
                    ) VALUES (?, ?, ?, ?, ?, ?, ?)"#,
            )?;

            for draft in drafts {
                stmt.execute(params![
                    &draft.item_code,
                    &draft.item_name,
                    &draft.feature_value,
                    &draft.unit,
                    decimal_to_sql(&draft.quantity),
                    &draft.remark,
                    MatchStatus::Unmatched.as_str(),
                ])?;
            }
        }

        tx.commit()?;
        Ok(drafts.len())
    }

    /// 按ID查询清单
    pub fn find_by_id(&self, item_id: i64) -> RepositoryResult<Option<Item>> {
        let conn = self.get_conn()?;

        let item = conn
            .query_row(
                &format!("{} WHERE id = ?", Self::SELECT_BASE),
                params![item_id],
                Self::map_row,
            )
            .optional()?;

        Ok(item)
    }

    /// 查询全部清单（稳定插入顺序）
    pub fn list_all(&self) -> RepositoryResult<Vec<Item>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(&format!("{} ORDER BY id", Self::SELECT_BASE))?;

        let items = stmt
            .query_map([], Self::map_row)?
            .collect::<Result<Vec<Item>, _>>()?;

        Ok(items)
    }

    /// 整行更新（基础字段 + 匹配状态）
    pub fn update(&self, item: &Item) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        Self::exec_update(&conn, item)
    }

    /// 批量更新匹配状态（自动匹配结果落库，单事务）
    pub fn batch_update(&self, items: &[Item]) -> RepositoryResult<usize> {
        if items.is_empty() {
            return Ok(0);
        }

        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;
        for item in items {
            Self::exec_update(&tx, item)?;
        }
        tx.commit()?;
        Ok(items.len())
    }

    /// 删除清单（外键级联删除其关联）
    pub fn delete(&self, item_id: i64) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;

        let affected = conn.execute("DELETE FROM project_item WHERE id = ?", params![item_id])?;
        Ok(affected > 0)
    }

    /// 清空全部清单（保留定额目录；关联级联删除）
    pub fn delete_all(&self) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;

        let affected = conn.execute("DELETE FROM project_item", [])?;
        Ok(affected)
    }

    // ==========================================
    // 清单聚合的原子状态迁移（两表单事务）
    // ==========================================

    /// 挂接定额：插入快照关联 + 落库清单新状态
    ///
    /// sort_order 在事务内按现有关联数生成；(item_id, quota_id) 重复时
    /// 由唯一约束拒绝并返回 UniqueConstraintViolation
    ///
    /// # 返回
    /// - `Ok(ItemQuotaLink)`: 含数据库生成的ID与顺序号
    pub fn attach_link(
        &self,
        item: &Item,
        link: &ItemQuotaLink,
    ) -> RepositoryResult<ItemQuotaLink> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        tx.execute(
            r#"INSERT INTO project_item_quota (
                    item_id, quota_id, quota_code, quota_name, quota_feature_value,
                    unit_price, sort_order
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6,
                    (SELECT COUNT(*) FROM project_item_quota WHERE item_id = ?1))"#,
            params![
                link.item_id,
                link.quota_id,
                &link.quota_code,
                &link.quota_name,
                &link.quota_feature_value,
                decimal_to_sql(&link.unit_price),
            ],
        )?;

        let link_id = tx.last_insert_rowid();
        let sort_order: i32 = tx.query_row(
            "SELECT sort_order FROM project_item_quota WHERE id = ?",
            params![link_id],
            |row| row.get(0),
        )?;

        Self::exec_update(&tx, item)?;
        tx.commit()?;

        Ok(ItemQuotaLink {
            id: link_id,
            sort_order,
            ..link.clone()
        })
    }

    /// 摘除关联：删除指定关联；若删空则落库 `item_if_empty` 的回退状态
    ///
    /// # 返回
    /// - `Ok(remaining)`: 摘除后剩余关联数
    pub fn detach_link(
        &self,
        item_id: i64,
        link_id: i64,
        item_if_empty: &Item,
    ) -> RepositoryResult<usize> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        let affected = tx.execute(
            "DELETE FROM project_item_quota WHERE id = ? AND item_id = ?",
            params![link_id, item_id],
        )?;
        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "ItemQuotaLink".to_string(),
                id: link_id.to_string(),
            });
        }

        let remaining: i64 = tx.query_row(
            "SELECT COUNT(*) FROM project_item_quota WHERE item_id = ?",
            params![item_id],
            |row| row.get(0),
        )?;

        if remaining == 0 {
            Self::exec_update(&tx, item_if_empty)?;
        }

        tx.commit()?;
        Ok(remaining as usize)
    }

    /// 清空关联并落库清单新状态（单选/人工定价/清空操作共用）
    ///
    /// # 返回
    /// - `Ok(removed)`: 被删除的关联数（可为 0，幂等）
    pub fn replace_links_with_state(&self, item: &Item) -> RepositoryResult<usize> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        let removed = tx.execute(
            "DELETE FROM project_item_quota WHERE item_id = ?",
            params![item.id],
        )?;
        Self::exec_update(&tx, item)?;

        tx.commit()?;
        Ok(removed)
    }

    /// UPDATE 语句共用实现（Connection 与 Transaction 均可调用）
    fn exec_update(conn: &Connection, item: &Item) -> RepositoryResult<()> {
        let affected = conn.execute(
            r#"UPDATE project_item
               SET item_code = ?, item_name = ?, feature_value = ?, unit = ?,
                   quantity = ?, remark = ?, match_status = ?,
                   matched_quota_id = ?, matched_quota_code = ?, matched_quota_name = ?,
                   matched_quota_feature_value = ?, matched_unit_price = ?
               WHERE id = ?"#,
            params![
                &item.item_code,
                &item.item_name,
                &item.feature_value,
                &item.unit,
                decimal_to_sql(&item.quantity),
                &item.remark,
                item.match_status.as_str(),
                item.matched_quota_id,
                &item.matched_quota_code,
                &item.matched_quota_name,
                &item.matched_quota_feature_value,
                decimal_to_sql(&item.matched_unit_price),
                item.id,
            ],
        )?;

        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Item".to_string(),
                id: item.id.to_string(),
            });
        }
        Ok(())
    }

    const SELECT_BASE: &'static str = r#"SELECT id, item_code, item_name, feature_value, unit, quantity, remark,
                      match_status, matched_quota_id, matched_quota_code,
                      matched_quota_name, matched_quota_feature_value, matched_unit_price
               FROM project_item"#;

    /// 行映射
    fn map_row(row: &Row<'_>) -> rusqlite::Result<Item> {
        Ok(Item {
            id: row.get(0)?,
            item_code: row.get(1)?,
            item_name: row.get(2)?,
            feature_value: row.get(3)?,
            unit: row.get(4)?,
            quantity: decimal_from_row(row, 5)?,
            remark: row.get(6)?,
            match_status: match_status_from_row(row, 7)?,
            matched_quota_id: row.get(8)?,
            matched_quota_code: row.get(9)?,
            matched_quota_name: row.get(10)?,
            matched_quota_feature_value: row.get(11)?,
            matched_unit_price: decimal_from_row(row, 12)?,
        })
    }
}
