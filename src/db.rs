// ==========================================
// 机队维修排程系统 - SQLite 连接与建表
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为（外键 + busy_timeout）
// - 统一建表入口（幂等，CREATE TABLE IF NOT EXISTS）
// - 默认数据库路径（环境变量 > 用户数据目录 > 当前目录）
// ==========================================

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 当前代码所期望的 schema_version
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

/// 数据库路径覆写环境变量
pub const DB_PATH_ENV: &str = "FLEET_PLANNER_DB_PATH";

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS fleet (
    aircraft_id TEXT PRIMARY KEY,
    flight_hours INTEGER NOT NULL,
    maint_interval_hours INTEGER NOT NULL CHECK (maint_interval_hours > 0),
    last_maintenance_date TEXT,
    hours_since_last_maintenance INTEGER NOT NULL,
    hours_until_due INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS parts_inventory (
    part_id TEXT PRIMARY KEY,
    description TEXT NOT NULL,
    lead_time_days INTEGER NOT NULL,
    unit_cost REAL NOT NULL CHECK (unit_cost >= 0),
    quantity_on_hand INTEGER NOT NULL CHECK (quantity_on_hand >= 0)
);

CREATE TABLE IF NOT EXISTS maintenance_records (
    record_id INTEGER PRIMARY KEY AUTOINCREMENT,
    run_id TEXT,
    aircraft_id TEXT NOT NULL REFERENCES fleet(aircraft_id),
    start_day INTEGER NOT NULL,
    duration INTEGER NOT NULL,
    schedule_start TEXT NOT NULL,
    schedule_end TEXT NOT NULL,
    part_id TEXT REFERENCES parts_inventory(part_id),
    part_quantity INTEGER NOT NULL DEFAULT 0,
    cost REAL NOT NULL DEFAULT 0,
    status TEXT NOT NULL DEFAULT 'SCHEDULED'
);

CREATE INDEX IF NOT EXISTS idx_maintenance_records_start
    ON maintenance_records(schedule_start);

CREATE TABLE IF NOT EXISTS config_kv (
    scope_id TEXT NOT NULL DEFAULT 'global',
    key TEXT NOT NULL,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL DEFAULT (datetime('now')),
    PRIMARY KEY (scope_id, key)
);

CREATE TABLE IF NOT EXISTS plan_run (
    run_id TEXT PRIMARY KEY,
    created_at TEXT NOT NULL,
    anchor_date TEXT NOT NULL,
    objective INTEGER NOT NULL,
    solve_status TEXT NOT NULL,
    task_count INTEGER NOT NULL,
    unresourced_count INTEGER NOT NULL,
    config_snapshot_json TEXT
);

CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);
"#;

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：foreign_keys 与 busy_timeout 都需要"每个连接"单独配置
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

/// 建表（幂等）并登记 schema_version
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)?;
    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        [CURRENT_SCHEMA_VERSION],
    )?;

    match read_schema_version(conn)? {
        Some(v) if v > CURRENT_SCHEMA_VERSION => {
            warn!(
                db_version = v,
                expected = CURRENT_SCHEMA_VERSION,
                "数据库版本高于程序版本"
            );
        }
        v => info!(schema_version = ?v, "数据库表结构就绪"),
    }
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

    let v: Option<i64> =
        conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}

/// 获取默认数据库路径
///
/// # 返回
/// - FLEET_PLANNER_DB_PATH 非空时直接使用
/// - 否则: 用户数据目录/fleet-maint-planner/fleet_maintenance.db
/// - 取不到用户数据目录时: ./fleet_maintenance.db
pub fn default_db_path() -> String {
    if let Ok(path) = std::env::var(DB_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./fleet_maintenance.db");
    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("fleet-maint-planner");
        // 目录创建失败时回退到当前目录
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("fleet_maintenance.db");
        }
    }
    path.to_string_lossy().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        configure_sqlite_connection(&conn).unwrap();
        assert_eq!(read_schema_version(&conn).unwrap(), None);

        init_schema(&conn).unwrap();
        init_schema(&conn).unwrap();
        assert_eq!(read_schema_version(&conn).unwrap(), Some(CURRENT_SCHEMA_VERSION));

        let tables: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name IN \
                 ('fleet','parts_inventory','maintenance_records','config_kv','plan_run')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(tables, 5);
    }

    #[test]
    fn test_foreign_keys_enforced() {
        let conn = Connection::open_in_memory().unwrap();
        configure_sqlite_connection(&conn).unwrap();
        init_schema(&conn).unwrap();

        let result = conn.execute(
            "INSERT INTO maintenance_records (aircraft_id, start_day, duration, schedule_start, schedule_end) \
             VALUES ('AIR-9999', 0, 1, '2026-01-01', '2026-01-02')",
            [],
        );
        assert!(result.is_err());
    }
}
