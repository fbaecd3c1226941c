// ==========================================
// 机队维修排程系统 - 排程运行记录仓储
// ==========================================
// 职责: plan_run 表读写
// ==========================================

use crate::domain::plan_run::PlanRun;
use crate::domain::types::SolveStatus;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction};
use std::sync::{Arc, Mutex, MutexGuard};

const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ==========================================
// PlanRunRepository - 排程运行记录仓储
// ==========================================
pub struct PlanRunRepository {
    conn: Arc<Mutex<Connection>>,
}

impl PlanRunRepository {
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

    fn map_row(row: &Row<'_>) -> rusqlite::Result<PlanRun> {
        let conversion = |idx: usize, e: Box<dyn std::error::Error + Send + Sync>| {
            rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, e)
        };

        let created_at: String = row.get(1)?;
        let anchor_date: String = row.get(2)?;
        let solve_status: String = row.get(4)?;
        let task_count: i64 = row.get(5)?;
        let unresourced_count: i64 = row.get(6)?;

        Ok(PlanRun {
            run_id: row.get(0)?,
            created_at: NaiveDateTime::parse_from_str(&created_at, DATETIME_FORMAT)
                .map_err(|e| conversion(1, Box::new(e)))?,
            anchor_date: NaiveDate::parse_from_str(&anchor_date, "%Y-%m-%d")
                .map_err(|e| conversion(2, Box::new(e)))?,
            objective: row.get(3)?,
            solve_status: solve_status
                .parse::<SolveStatus>()
                .map_err(|e| conversion(4, e.into()))?,
            task_count: task_count.max(0) as usize,
            unresourced_count: unresourced_count.max(0) as usize,
            config_snapshot_json: row.get(7)?,
        })
    }

    pub fn insert(&self, run: &PlanRun) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        Self::insert_on(&conn, run)
    }

    /// 在调用方事务内写入运行记录（不提交）
    pub fn insert_tx(tx: &Transaction, run: &PlanRun) -> RepositoryResult<()> {
        Self::insert_on(tx, run)
    }

    fn insert_on(conn: &Connection, run: &PlanRun) -> RepositoryResult<()> {
        conn.execute(
            r#"
            INSERT INTO plan_run (
                run_id, created_at, anchor_date, objective, solve_status,
                task_count, unresourced_count, config_snapshot_json
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                run.run_id,
                run.created_at.format(DATETIME_FORMAT).to_string(),
                run.anchor_date.format("%Y-%m-%d").to_string(),
                run.objective,
                run.solve_status.to_string(),
                run.task_count as i64,
                run.unresourced_count as i64,
                run.config_snapshot_json,
            ],
        )?;
        Ok(())
    }

    pub fn find_by_id(&self, run_id: &str) -> RepositoryResult<Option<PlanRun>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT run_id, created_at, anchor_date, objective, solve_status,
                   task_count, unresourced_count, config_snapshot_json
            FROM plan_run
            WHERE run_id = ?1
            "#,
        )?;
        Ok(stmt.query_row(params![run_id], Self::map_row).optional()?)
    }

    /// 最近一次运行
    pub fn find_latest(&self) -> RepositoryResult<Option<PlanRun>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT run_id, created_at, anchor_date, objective, solve_status,
                   task_count, unresourced_count, config_snapshot_json
            FROM plan_run
            ORDER BY created_at DESC, rowid DESC
            LIMIT 1
            "#,
        )?;
        Ok(stmt.query_row([], Self::map_row).optional()?)
    }
}
