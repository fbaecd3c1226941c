// ==========================================
// 机队维修排程系统 - 机队数据仓储
// ==========================================
// 职责: fleet 表读写（机队快照提供者）
// 红线: Repository 不含业务逻辑
// ==========================================

use crate::domain::aircraft::Aircraft;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex, MutexGuard};

const SELECT_COLUMNS: &str = r#"
    SELECT aircraft_id, flight_hours, maint_interval_hours, last_maintenance_date,
           hours_since_last_maintenance, hours_until_due
    FROM fleet
"#;

// ==========================================
// FleetRepository - 机队仓储
// ==========================================
pub struct FleetRepository {
    conn: Arc<Mutex<Connection>>,
}

impl FleetRepository {
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = crate::db::open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn map_row(row: &Row<'_>) -> rusqlite::Result<Aircraft> {
        Ok(Aircraft {
            aircraft_id: row.get(0)?,
            flight_hours: row.get(1)?,
            maint_interval_hours: row.get(2)?,
            last_maintenance_date: row
                .get::<_, Option<String>>(3)?
                .and_then(|s| NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok()),
            hours_since_last_maintenance: row.get(4)?,
            hours_until_due: row.get(5)?,
        })
    }

    /// 查询全部飞机（按 aircraft_id 排序，保证机队顺序稳定）
    pub fn find_all(&self) -> RepositoryResult<Vec<Aircraft>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!("{} ORDER BY aircraft_id", SELECT_COLUMNS))?;
        let fleet = stmt
            .query_map([], Self::map_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(fleet)
    }

    pub fn find_by_id(&self, aircraft_id: &str) -> RepositoryResult<Option<Aircraft>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!("{} WHERE aircraft_id = ?1", SELECT_COLUMNS))?;
        Ok(stmt.query_row(params![aircraft_id], Self::map_row).optional()?)
    }

    pub fn count(&self) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let n: i64 = conn.query_row("SELECT COUNT(*) FROM fleet", [], |row| row.get(0))?;
        Ok(n as usize)
    }

    /// 整表替换（单事务）
    ///
    /// 说明：已有维修记录引用旧机队，一并清除
    pub fn replace_all(&self, fleet: &[Aircraft]) -> RepositoryResult<usize> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        tx.execute("DELETE FROM maintenance_records", [])?;
        tx.execute("DELETE FROM fleet", [])?;
        {
            let mut stmt = tx.prepare(
                r#"INSERT INTO fleet (
                        aircraft_id, flight_hours, maint_interval_hours, last_maintenance_date,
                        hours_since_last_maintenance, hours_until_due
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)"#,
            )?;
            for aircraft in fleet {
                stmt.execute(params![
                    aircraft.aircraft_id,
                    aircraft.flight_hours,
                    aircraft.maint_interval_hours,
                    aircraft
                        .last_maintenance_date
                        .map(|d| d.format("%Y-%m-%d").to_string()),
                    aircraft.hours_since_last_maintenance,
                    aircraft.hours_until_due,
                ])?;
            }
        }

        tx.commit()?;
        Ok(fleet.len())
    }
}
