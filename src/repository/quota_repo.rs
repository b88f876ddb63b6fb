// ==========================================
// 企业定额匹配系统 - 企业定额仓储
// ==========================================
// 目录查询均以版本为作用域；批量导入只追加不覆盖
// ==========================================

use crate::domain::{Quota, QuotaDraft};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::{decimal_from_row, decimal_to_sql};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex};

// ==========================================
// QuotaRepository - 企业定额仓储
// ==========================================
pub struct QuotaRepository {
    conn: Arc<Mutex<Connection>>,
}

impl QuotaRepository {
    /// 创建新的QuotaRepository实例
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 新增单条定额
    pub fn insert(&self, version_id: i64, draft: &QuotaDraft) -> RepositoryResult<Quota> {
        let conn = self.get_conn()?;

        conn.execute(
            r#"INSERT INTO enterprise_quota (
                    version_id, quota_code, quota_name, feature_value, unit,
                    unit_price, labor_cost, material_cost, machine_cost, remark
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
            params![
                version_id,
                &draft.quota_code,
                &draft.quota_name,
                &draft.feature_value,
                &draft.unit,
                decimal_to_sql(&draft.unit_price),
                decimal_to_sql(&draft.labor_cost),
                decimal_to_sql(&draft.material_cost),
                decimal_to_sql(&draft.machine_cost),
                &draft.remark,
            ],
        )?;

        Ok(Self::from_draft(conn.last_insert_rowid(), version_id, draft))
    }

    /// 批量追加定额（导入；不去重、不覆盖，事务化）
    ///
    /// # 返回
    /// - `Ok(count)`: 插入成功的记录数
    pub fn batch_insert(&self, version_id: i64, drafts: &[QuotaDraft]) -> RepositoryResult<usize> {
        if drafts.is_empty() {
            return Ok(0);
        }

        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        {
            let mut stmt = tx.prepare(
                r#"INSERT INTO enterprise_quota (
                        version_id, quota_code, quota_name, feature_value, unit,
                        unit_price, labor_cost, material_cost, machine_cost, remark
                    ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
            )?;

            for draft in drafts {
                stmt.execute(params![
                    version_id,
                    &draft.quota_code,
                    &draft.quota_name,
                    &draft.feature_value,
                    &draft.unit,
                    decimal_to_sql(&draft.unit_price),
                    decimal_to_sql(&draft.labor_cost),
                    decimal_to_sql(&draft.material_cost),
                    decimal_to_sql(&draft.machine_cost),
                    &draft.remark,
                ])?;
            }
        }

        tx.commit()?;
        Ok(drafts.len())
    }

    /// 按ID查询定额
    pub fn find_by_id(&self, quota_id: i64) -> RepositoryResult<Option<Quota>> {
        let conn = self.get_conn()?;

        let quota = conn
            .query_row(
                &format!("{} WHERE id = ?", Self::SELECT_BASE),
                params![quota_id],
                Self::map_row,
            )
            .optional()?;

        Ok(quota)
    }

    /// 查询版本内全部定额（稳定插入顺序）
    pub fn list_by_version(&self, version_id: i64) -> RepositoryResult<Vec<Quota>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(&format!(
            "{} WHERE version_id = ? ORDER BY id",
            Self::SELECT_BASE
        ))?;

        let quotas = stmt
            .query_map(params![version_id], Self::map_row)?
            .collect::<Result<Vec<Quota>, _>>()?;

        Ok(quotas)
    }

    /// 版本内关键字检索：编码/名称/特征的大小写不敏感子串匹配
    ///
    /// 空关键字返回空结果（强制显式查询，不等价于"全部"）
    pub fn find_by_keyword(&self, version_id: i64, keyword: &str) -> RepositoryResult<Vec<Quota>> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return Ok(Vec::new());
        }

        // LIKE 通配符按字面匹配
        let escaped = keyword
            .to_lowercase()
            .replace('\\', "\\\\")
            .replace('%', "\\%")
            .replace('_', "\\_");
        let pattern = format!("%{}%", escaped);

        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            r#"{} WHERE version_id = ?1
                 AND (lower(coalesce(quota_code, ''))    LIKE ?2 ESCAPE '\'
                   OR lower(quota_name)                  LIKE ?2 ESCAPE '\'
                   OR lower(coalesce(feature_value, '')) LIKE ?2 ESCAPE '\')
               ORDER BY id"#,
            Self::SELECT_BASE
        ))?;

        let quotas = stmt
            .query_map(params![version_id, &pattern], Self::map_row)?
            .collect::<Result<Vec<Quota>, _>>()?;

        Ok(quotas)
    }

    /// 更新定额（整行覆盖；不改归属版本）
    pub fn update(&self, quota: &Quota) -> RepositoryResult<()> {
        let conn = self.get_conn()?;

        let affected = conn.execute(
            r#"UPDATE enterprise_quota
               SET quota_code = ?, quota_name = ?, feature_value = ?, unit = ?,
                   unit_price = ?, labor_cost = ?, material_cost = ?, machine_cost = ?,
                   remark = ?
               WHERE id = ?"#,
            params![
                &quota.quota_code,
                &quota.quota_name,
                &quota.feature_value,
                &quota.unit,
                decimal_to_sql(&quota.unit_price),
                decimal_to_sql(&quota.labor_cost),
                decimal_to_sql(&quota.material_cost),
                decimal_to_sql(&quota.machine_cost),
                &quota.remark,
                quota.id,
            ],
        )?;

        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Quota".to_string(),
                id: quota.id.to_string(),
            });
        }
        Ok(())
    }

    /// 删除定额（不回写已有清单/关联上的快照）
    pub fn delete(&self, quota_id: i64) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;

        let affected = conn.execute(
            "DELETE FROM enterprise_quota WHERE id = ?",
            params![quota_id],
        )?;
        Ok(affected > 0)
    }

    /// 版本内定额数量
    pub fn count_by_version(&self, version_id: i64) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;

        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM enterprise_quota WHERE version_id = ?",
            params![version_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    const SELECT_BASE: &'static str = r#"SELECT id, version_id, quota_code, quota_name, feature_value, unit,
                      unit_price, labor_cost, material_cost, machine_cost, remark
               FROM enterprise_quota"#;

    /// 行映射
    fn map_row(row: &Row<'_>) -> rusqlite::Result<Quota> {
        Ok(Quota {
            id: row.get(0)?,
            version_id: row.get(1)?,
            quota_code: row.get(2)?,
            quota_name: row.get(3)?,
            feature_value: row.get(4)?,
            unit: row.get(5)?,
            unit_price: decimal_from_row(row, 6)?,
            labor_cost: decimal_from_row(row, 7)?,
            material_cost: decimal_from_row(row, 8)?,
            machine_cost: decimal_from_row(row, 9)?,
            remark: row.get(10)?,
        })
    }

    fn from_draft(id: i64, version_id: i64, draft: &QuotaDraft) -> Quota {
        Quota {
            id,
            version_id,
            quota_code: draft.quota_code.clone(),
            quota_name: draft.quota_name.clone(),
            feature_value: draft.feature_value.clone(),
            unit: draft.unit.clone(),
            unit_price: draft.unit_price,
            labor_cost: draft.labor_cost,
            material_cost: draft.material_cost,
            machine_cost: draft.machine_cost,
            remark: draft.remark.clone(),
        }
    }
}
