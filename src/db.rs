// ==========================================
// 企业定额匹配系统 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为，避免“部分模块外键开启/部分不开启”
// - 统一 busy_timeout，减少并发写入时的偶发 busy 错误
// - 提供幂等的建表入口，供应用启动与测试共用
// ==========================================

use rusqlite::Connection;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - foreign_keys 需要“每个连接”单独开启（级联删除依赖它）
/// - busy_timeout 需要“每个连接”单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 初始化数据库表结构（幂等）
///
/// 表：
/// - quota_version      定额版本（目录快照）
/// - enterprise_quota   企业定额（属于某个版本，版本删除时级联）
/// - project_item       项目清单（含匹配状态与单定额快照字段）
/// - project_item_quota 清单-定额关联（多定额，价格快照；清单删除时级联）
///
/// 约束：
/// - project_item_quota 对 (item_id, quota_id) 唯一，重复挂接在库层也会被拒绝
/// - 关联不对 enterprise_quota 建外键：快照语义要求定额删除后关联仍然有效
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS quota_version (
            id           INTEGER PRIMARY KEY AUTOINCREMENT,
            version_name TEXT NOT NULL UNIQUE,
            description  TEXT,
            create_time  TEXT NOT NULL,
            update_time  TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS enterprise_quota (
            id            INTEGER PRIMARY KEY AUTOINCREMENT,
            version_id    INTEGER NOT NULL REFERENCES quota_version(id) ON DELETE CASCADE,
            quota_code    TEXT,
            quota_name    TEXT NOT NULL,
            feature_value TEXT,
            unit          TEXT,
            unit_price    TEXT,
            labor_cost    TEXT,
            material_cost TEXT,
            machine_cost  TEXT,
            remark        TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_quota_version_id
            ON enterprise_quota(version_id);

        CREATE TABLE IF NOT EXISTS project_item (
            id                          INTEGER PRIMARY KEY AUTOINCREMENT,
            item_code                   TEXT,
            item_name                   TEXT NOT NULL,
            feature_value               TEXT,
            unit                        TEXT,
            quantity                    TEXT,
            remark                      TEXT,
            match_status                TEXT NOT NULL DEFAULT 'UNMATCHED',
            matched_quota_id            INTEGER,
            matched_quota_code          TEXT,
            matched_quota_name          TEXT,
            matched_quota_feature_value TEXT,
            matched_unit_price          TEXT
        );

        CREATE TABLE IF NOT EXISTS project_item_quota (
            id                  INTEGER PRIMARY KEY AUTOINCREMENT,
            item_id             INTEGER NOT NULL REFERENCES project_item(id) ON DELETE CASCADE,
            quota_id            INTEGER NOT NULL,
            quota_code          TEXT,
            quota_name          TEXT,
            quota_feature_value TEXT,
            unit_price          TEXT,
            sort_order          INTEGER NOT NULL DEFAULT 0,
            UNIQUE(item_id, quota_id)
        );

        CREATE INDEX IF NOT EXISTS idx_item_quota_item_id
            ON project_item_quota(item_id);
        "#,
    )?;
    Ok(())
}
