// ==========================================
// 机队维修排程系统 - 配置管理器
// ==========================================
// 职责: 从 config_kv 表加载排程参数，缺省项回落默认值
// 存储: config_kv 表 (key-value + scope)，本系统仅使用 'global'
// ==========================================

use crate::config::planning_config::PlanningConfig;
use crate::db::open_sqlite_connection;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::json;
use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> RepositoryResult<Self> {
        {
            let conn_guard = conn
                .lock()
                .map_err(|e| RepositoryError::LockError(e.to_string()))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    pub fn get_global_config_value(&self, key: &str) -> RepositoryResult<Option<String>> {
        let conn = self.get_conn()?;
        let value = conn
            .query_row(
                "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    /// 写入配置值（存在则覆盖）
    pub fn set_value(&self, key: &str, value: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO config_kv (scope_id, key, value, updated_at)
            VALUES ('global', ?1, ?2, datetime('now'))
            ON CONFLICT(scope_id, key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
            params![key, value],
        )?;
        debug!(key, value, "配置已更新");
        Ok(())
    }

    /// 读取并解析单个配置项，不存在时返回默认值
    ///
    /// pending 为尚未落库的 (key, value)，命中时优先于表中的值
    fn parse_or<T>(
        &self,
        key: &str,
        default: T,
        pending: Option<(&str, &str)>,
    ) -> RepositoryResult<T>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        let raw = match pending {
            Some((pending_key, value)) if pending_key == key => Some(value.to_string()),
            _ => self.get_global_config_value(key)?,
        };
        match raw {
            Some(raw) => raw.trim().parse::<T>().map_err(|e| {
                RepositoryError::field_value(key, format!("无法解析 '{}': {}", raw, e))
            }),
            None => Ok(default),
        }
    }

    fn build_planning_config(
        &self,
        pending: Option<(&str, &str)>,
    ) -> RepositoryResult<PlanningConfig> {
        use config_keys::*;

        let d = PlanningConfig::default();
        Ok(PlanningConfig {
            horizon_days: self.parse_or(HORIZON_DAYS, d.horizon_days, pending)?,
            min_duration_days: self.parse_or(MIN_DURATION_DAYS, d.min_duration_days, pending)?,
            max_duration_days: self.parse_or(MAX_DURATION_DAYS, d.max_duration_days, pending)?,
            crew_capacity: self.parse_or(CREW_CAPACITY, d.crew_capacity, pending)?,
            time_limit_seconds: self.parse_or(TIME_LIMIT_SECONDS, d.time_limit_seconds, pending)?,
            search_parallelism: self.parse_or(SEARCH_PARALLELISM, d.search_parallelism, pending)?,
            allocation_seed: self.parse_or(ALLOCATION_SEED, d.allocation_seed, pending)?,
        })
    }

    /// 加载排程配置
    ///
    /// 未配置的键回落到 PlanningConfig::default()；不做业务校验（由 validate 负责）
    pub fn load_planning_config(&self) -> RepositoryResult<PlanningConfig> {
        self.build_planning_config(None)
    }

    /// 校验后写入单个排程参数
    ///
    /// 先以新值合并出候选配置并 validate，通过后才落库；
    /// 未知键、无法解析的值、校验失败均不写入
    ///
    /// # 返回
    /// - Ok(PlanningConfig): 写入后的有效配置
    pub fn update_planning_value(
        &self,
        key: &str,
        value: &str,
    ) -> RepositoryResult<PlanningConfig> {
        if !config_keys::ALL.contains(&key) {
            return Err(RepositoryError::ValidationError(format!(
                "未知配置键: {}（可用: {}）",
                key,
                config_keys::ALL.join(", ")
            )));
        }

        let value = value.trim();
        let candidate = self.build_planning_config(Some((key, value)))?;
        candidate
            .validate()
            .map_err(|e| RepositoryError::ValidationError(e.to_string()))?;

        self.set_value(key, value)?;
        Ok(candidate)
    }

    /// 将排程配置整体写回 config_kv
    pub fn save_planning_config(&self, config: &PlanningConfig) -> RepositoryResult<()> {
        self.set_value(config_keys::HORIZON_DAYS, &config.horizon_days.to_string())?;
        self.set_value(config_keys::MIN_DURATION_DAYS, &config.min_duration_days.to_string())?;
        self.set_value(config_keys::MAX_DURATION_DAYS, &config.max_duration_days.to_string())?;
        self.set_value(config_keys::CREW_CAPACITY, &config.crew_capacity.to_string())?;
        self.set_value(config_keys::TIME_LIMIT_SECONDS, &config.time_limit_seconds.to_string())?;
        self.set_value(config_keys::SEARCH_PARALLELISM, &config.search_parallelism.to_string())?;
        self.set_value(config_keys::ALLOCATION_SEED, &config.allocation_seed.to_string())?;
        Ok(())
    }

    /// 获取所有 global 配置的 JSON 快照（随排程运行记录保存）
    pub fn get_config_snapshot(&self) -> RepositoryResult<String> {
        let conn = self.get_conn()?;

        let mut stmt = conn
            .prepare("SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut config_map: BTreeMap<String, String> = BTreeMap::new();
        for row in rows {
            let (key, value) = row?;
            config_map.insert(key, value);
        }

        serde_json::to_string(&json!(config_map)).map_err(|e| RepositoryError::Other(e.into()))
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    pub const HORIZON_DAYS: &str = "planning/horizon_days";
    pub const MIN_DURATION_DAYS: &str = "planning/min_duration_days";
    pub const MAX_DURATION_DAYS: &str = "planning/max_duration_days";
    pub const CREW_CAPACITY: &str = "planning/crew_capacity";
    pub const TIME_LIMIT_SECONDS: &str = "planning/time_limit_seconds";
    pub const SEARCH_PARALLELISM: &str = "planning/search_parallelism";
    pub const ALLOCATION_SEED: &str = "planning/allocation_seed"; // 备件消耗抽样种子

    pub const ALL: [&str; 7] = [
        HORIZON_DAYS,
        MIN_DURATION_DAYS,
        MAX_DURATION_DAYS,
        CREW_CAPACITY,
        TIME_LIMIT_SECONDS,
        SEARCH_PARALLELISM,
        ALLOCATION_SEED,
    ];
}
