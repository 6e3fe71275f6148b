// ==========================================
// Bullet Points - SQLite 连接初始化与 EAV 建表
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为
// - 统一 busy_timeout，减少并发写入时的偶发 busy 错误
// - 提供 EAV schema 的幂等建表
// ==========================================

use crate::domain::BackendType;
use rusqlite::Connection;
use rusqlite::OptionalExtension;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 当前代码所期望的 schema_version
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - foreign_keys 需要“每个连接”单独开启
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

/// 初始化 EAV schema（幂等）
///
/// 表结构:
/// - eav_attribute: 属性定义（编码/标签/存储类型）
/// - catalog_entity: 实体主表（static 属性即此表的列）
/// - catalog_category / catalog_category_entity: 类目与成员关系
/// - catalog_entity_{varchar,text,int,decimal,datetime}: 按存储类型分表的属性值
/// - config_kv: 配置
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS eav_attribute (
            attribute_id INTEGER PRIMARY KEY,
            attribute_code TEXT NOT NULL UNIQUE,
            frontend_label TEXT NOT NULL DEFAULT '',
            backend_type TEXT NOT NULL
                CHECK (backend_type IN ('static', 'varchar', 'text', 'int', 'decimal', 'datetime'))
        );

        CREATE TABLE IF NOT EXISTS catalog_entity (
            entity_id INTEGER PRIMARY KEY,
            sku TEXT NOT NULL UNIQUE,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS catalog_category (
            category_id INTEGER PRIMARY KEY,
            name TEXT NOT NULL DEFAULT ''
        );

        CREATE TABLE IF NOT EXISTS catalog_category_entity (
            category_id INTEGER NOT NULL REFERENCES catalog_category(category_id) ON DELETE CASCADE,
            entity_id INTEGER NOT NULL REFERENCES catalog_entity(entity_id) ON DELETE CASCADE,
            position INTEGER NOT NULL DEFAULT 0,
            PRIMARY KEY (category_id, entity_id)
        );

        CREATE TABLE IF NOT EXISTS config_kv (
            scope_id TEXT NOT NULL,
            key TEXT NOT NULL,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL DEFAULT (datetime('now')),
            PRIMARY KEY (scope_id, key)
        );
        "#,
    )?;

    for backend in BackendType::ALL {
        let Some(table) = backend.value_table() else {
            continue;
        };
        conn.execute_batch(&format!(
            r#"
            CREATE TABLE IF NOT EXISTS {table} (
                value_id INTEGER PRIMARY KEY AUTOINCREMENT,
                attribute_id INTEGER NOT NULL REFERENCES eav_attribute(attribute_id) ON DELETE CASCADE,
                scope_id INTEGER NOT NULL DEFAULT 0,
                entity_id INTEGER NOT NULL REFERENCES catalog_entity(entity_id) ON DELETE CASCADE,
                value {column_type},
                UNIQUE (attribute_id, scope_id, entity_id)
            );
            CREATE INDEX IF NOT EXISTS idx_{table}_entity ON {table} (entity_id, attribute_id);
            "#,
            table = table,
            column_type = backend.column_type(),
        ))?;
    }

    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        [CURRENT_SCHEMA_VERSION],
    )?;

    Ok(())
}

/// 读取 schema_version（若表不存在则返回 None）
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> = conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}
