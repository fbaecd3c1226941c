// ==========================================
// 机队维修排程系统 - 备件库存仓储
// ==========================================
// 职责: parts_inventory 表读写（库存快照提供者）
// 说明: 排程运行不会自动回写库存，update_quantities 由调用方显式调用
// ==========================================

use crate::domain::part::Part;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, Row, Transaction};
use std::sync::{Arc, Mutex, MutexGuard};

// ==========================================
// PartsInventoryRepository - 备件库存仓储
// ==========================================
pub struct PartsInventoryRepository {
    conn: Arc<Mutex<Connection>>,
}

impl PartsInventoryRepository {
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

    fn map_row(row: &Row<'_>) -> rusqlite::Result<Part> {
        Ok(Part {
            part_id: row.get(0)?,
            description: row.get(1)?,
            lead_time_days: row.get(2)?,
            unit_cost: row.get(3)?,
            quantity_on_hand: row.get(4)?,
        })
    }

    /// 查询全部备件（按 part_id 排序）
    pub fn find_all(&self) -> RepositoryResult<Vec<Part>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT part_id, description, lead_time_days, unit_cost, quantity_on_hand
            FROM parts_inventory
            ORDER BY part_id
            "#,
        )?;
        let parts = stmt
            .query_map([], Self::map_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(parts)
    }

    /// 整表替换（单事务）
    ///
    /// 说明：维修记录引用备件，一并清除
    pub fn replace_all(&self, parts: &[Part]) -> RepositoryResult<usize> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        tx.execute("DELETE FROM maintenance_records", [])?;
        tx.execute("DELETE FROM parts_inventory", [])?;
        {
            let mut stmt = tx.prepare(
                r#"INSERT INTO parts_inventory (
                        part_id, description, lead_time_days, unit_cost, quantity_on_hand
                    ) VALUES (?1, ?2, ?3, ?4, ?5)"#,
            )?;
            for part in parts {
                stmt.execute(params![
                    part.part_id,
                    part.description,
                    part.lead_time_days,
                    part.unit_cost,
                    part.quantity_on_hand,
                ])?;
            }
        }

        tx.commit()?;
        Ok(parts.len())
    }

    /// 回写在库数量（单事务；任一备件不存在则整体回滚）
    pub fn update_quantities(&self, parts: &[Part]) -> RepositoryResult<usize> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;
        let count = Self::update_quantities_tx(&tx, parts)?;
        tx.commit()?;
        Ok(count)
    }

    /// 在调用方事务内回写在库数量（不提交）
    pub fn update_quantities_tx(tx: &Transaction, parts: &[Part]) -> RepositoryResult<usize> {
        let mut stmt =
            tx.prepare("UPDATE parts_inventory SET quantity_on_hand = ?1 WHERE part_id = ?2")?;
        for part in parts {
            let affected = stmt.execute(params![part.quantity_on_hand, part.part_id])?;
            if affected == 0 {
                return Err(RepositoryError::NotFound {
                    entity: "Part".to_string(),
                    id: part.part_id.clone(),
                });
            }
        }
        Ok(parts.len())
    }
}
