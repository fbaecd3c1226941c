// ==========================================
// 机队维修排程系统 - 维修记录仓储
// ==========================================
// 职责: maintenance_records 表读写（排程持久化协作者）
// 红线: 排程整体替换，单事务完成，不出现部分排程
// ==========================================

use crate::domain::task::MaintenanceTask;
use crate::domain::types::TaskStatus;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::NaiveDate;
use rusqlite::types::Type;
use rusqlite::{params, Connection, Row, Transaction};
use std::sync::{Arc, Mutex, MutexGuard};

fn parse_date(row: &Row<'_>, idx: usize) -> rusqlite::Result<NaiveDate> {
    let raw: String = row.get(idx)?;
    NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

// ==========================================
// MaintenanceRecordRepository - 维修记录仓储
// ==========================================
pub struct MaintenanceRecordRepository {
    conn: Arc<Mutex<Connection>>,
}

impl MaintenanceRecordRepository {
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

    fn map_row(row: &Row<'_>) -> rusqlite::Result<MaintenanceTask> {
        let status_raw: String = row.get(10)?;
        let status = status_raw.parse::<TaskStatus>().map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(10, Type::Text, e.into())
        })?;
        Ok(MaintenanceTask {
            aircraft_id: row.get(0)?,
            start_day: row.get(1)?,
            duration: row.get(2)?,
            schedule_start: parse_date(row, 3)?,
            schedule_end: parse_date(row, 4)?,
            part_id: row.get(5)?,
            part_quantity: row.get(6)?,
            cost: row.get(7)?,
            status,
        })
    }

    /// 用新排程整体替换维修记录（单事务）
    ///
    /// # 参数
    /// - run_id: 排程运行ID
    /// - tasks: 排程任务（任一插入失败则整体回滚）
    pub fn replace_schedule(
        &self,
        run_id: &str,
        tasks: &[MaintenanceTask],
    ) -> RepositoryResult<usize> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;
        let count = Self::replace_schedule_tx(&tx, run_id, tasks)?;
        tx.commit()?;
        Ok(count)
    }

    /// 在调用方事务内替换排程（不提交）
    pub fn replace_schedule_tx(
        tx: &Transaction,
        run_id: &str,
        tasks: &[MaintenanceTask],
    ) -> RepositoryResult<usize> {
        tx.execute("DELETE FROM maintenance_records", [])?;
        let mut stmt = tx.prepare(
            r#"INSERT INTO maintenance_records (
                    run_id, aircraft_id, start_day, duration, schedule_start, schedule_end,
                    part_id, part_quantity, cost, status
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)"#,
        )?;
        for task in tasks {
            stmt.execute(params![
                run_id,
                task.aircraft_id,
                task.start_day,
                task.duration,
                task.schedule_start.format("%Y-%m-%d").to_string(),
                task.schedule_end.format("%Y-%m-%d").to_string(),
                task.part_id,
                task.part_quantity,
                task.cost,
                task.status.to_string(),
            ])?;
        }
        Ok(tasks.len())
    }

    /// 查询全部维修记录（按开工日期、记录ID排序）
    pub fn find_all(&self) -> RepositoryResult<Vec<MaintenanceTask>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT aircraft_id, start_day, duration, schedule_start, schedule_end,
                   part_id, part_quantity, cost, run_id, record_id, status
            FROM maintenance_records
            ORDER BY schedule_start, record_id
            "#,
        )?;
        let tasks = stmt
            .query_map([], Self::map_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(tasks)
    }

    /// 当前排程所属运行ID（无记录时 None）
    pub fn current_run_id(&self) -> RepositoryResult<Option<String>> {
        let conn = self.get_conn()?;
        let run_id: Option<String> = conn.query_row(
            "SELECT MAX(run_id) FROM maintenance_records",
            [],
            |row| row.get(0),
        )?;
        Ok(run_id)
    }
}
