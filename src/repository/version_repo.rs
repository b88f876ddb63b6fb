// ==========================================
// 企业定额匹配系统 - 定额版本仓储
// ==========================================
// 版本删除依赖外键级联清除所属定额；
// 已有清单快照不受目录删除影响（快照是复制）
// ==========================================

use crate::domain::QuotaVersion;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::{timestamp_from_row, TIMESTAMP_FMT};
use chrono::Local;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex};

// ==========================================
// QuotaVersionRepository - 定额版本仓储
// ==========================================
pub struct QuotaVersionRepository {
    conn: Arc<Mutex<Connection>>,
}

impl QuotaVersionRepository {
    /// 创建新的QuotaVersionRepository实例
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 创建版本
    ///
    /// # 返回
    /// - `Ok(QuotaVersion)`: 含数据库生成的ID与时间戳
    pub fn create(
        &self,
        version_name: &str,
        description: Option<&str>,
    ) -> RepositoryResult<QuotaVersion> {
        let conn = self.get_conn()?;
        let now = Local::now().naive_local();
        let now_text = now.format(TIMESTAMP_FMT).to_string();

        conn.execute(
            r#"INSERT INTO quota_version (version_name, description, create_time, update_time)
               VALUES (?, ?, ?, ?)"#,
            params![version_name, description, &now_text, &now_text],
        )?;

        Ok(QuotaVersion {
            id: conn.last_insert_rowid(),
            version_name: version_name.to_string(),
            description: description.map(|s| s.to_string()),
            create_time: now,
            update_time: now,
        })
    }

    /// 按ID查询版本
    pub fn find_by_id(&self, version_id: i64) -> RepositoryResult<Option<QuotaVersion>> {
        let conn = self.get_conn()?;

        let version = conn
            .query_row(
                r#"SELECT id, version_name, description, create_time, update_time
                   FROM quota_version WHERE id = ?"#,
                params![version_id],
                Self::map_row,
            )
            .optional()?;

        Ok(version)
    }

    /// 按名称查询版本（用于重名检查）
    pub fn find_by_name(&self, version_name: &str) -> RepositoryResult<Option<QuotaVersion>> {
        let conn = self.get_conn()?;

        let version = conn
            .query_row(
                r#"SELECT id, version_name, description, create_time, update_time
                   FROM quota_version WHERE version_name = ?"#,
                params![version_name],
                Self::map_row,
            )
            .optional()?;

        Ok(version)
    }

    /// 查询所有版本（创建时间倒序）
    pub fn list_all(&self) -> RepositoryResult<Vec<QuotaVersion>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"SELECT id, version_name, description, create_time, update_time
               FROM quota_version
               ORDER BY create_time DESC, id DESC"#,
        )?;

        let versions = stmt
            .query_map([], Self::map_row)?
            .collect::<Result<Vec<QuotaVersion>, _>>()?;

        Ok(versions)
    }

    /// 更新版本（调用方负责重名检查与 update_time 刷新）
    pub fn update(&self, version: &QuotaVersion) -> RepositoryResult<()> {
        let conn = self.get_conn()?;

        let affected = conn.execute(
            r#"UPDATE quota_version
               SET version_name = ?, description = ?, update_time = ?
               WHERE id = ?"#,
            params![
                &version.version_name,
                &version.description,
                version.update_time.format(TIMESTAMP_FMT).to_string(),
                version.id,
            ],
        )?;

        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "QuotaVersion".to_string(),
                id: version.id.to_string(),
            });
        }
        Ok(())
    }

    /// 删除版本（外键级联删除所属定额）
    ///
    /// # 返回
    /// - `Ok(true)`: 删除成功
    /// - `Ok(false)`: 版本不存在
    pub fn delete(&self, version_id: i64) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;

        let affected = conn.execute(
            "DELETE FROM quota_version WHERE id = ?",
            params![version_id],
        )?;
        Ok(affected > 0)
    }

    /// 版本是否存在
    pub fn exists(&self, version_id: i64) -> RepositoryResult<bool> {
        Ok(self.find_by_id(version_id)?.is_some())
    }

    /// 行映射
    fn map_row(row: &Row<'_>) -> rusqlite::Result<QuotaVersion> {
        Ok(QuotaVersion {
            id: row.get(0)?,
            version_name: row.get(1)?,
            description: row.get(2)?,
            create_time: timestamp_from_row(row, 3)?,
            update_time: timestamp_from_row(row, 4)?,
        })
    }
}
