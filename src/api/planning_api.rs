// ==========================================
// 机队维修排程系统 - 排程 API
// ==========================================
// 职责: 串联 仓储 → 引擎 → 仓储，供 CLI 调用
// 流程(run_plan):
//   读取配置 → 读取机队/库存快照 → 编排器 →
//   [单事务: 整体替换排程 → 写运行记录 → (可选) 回写库存]
// 红线: 引擎失败或任一写入失败时不留下任何数据
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::{ConfigManager, PlanningConfig};
use crate::db::{configure_sqlite_connection, init_schema, open_sqlite_connection};
use crate::domain::plan_run::PlanRun;
use crate::engine::orchestrator::{PlanResult, PlanningOrchestrator};
use crate::importer::file_parser::CsvParser;
use crate::importer::fleet_importer::{FleetImporter, ImportSummary};
use crate::report::ScheduleSummary;
use crate::repository::{
    FleetRepository, MaintenanceRecordRepository, PartsInventoryRepository, PlanRunRepository,
};
use chrono::{Local, NaiveDate};
use rusqlite::Connection;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{info, instrument, warn};

// ==========================================
// PlanOptions - 运行选项
// ==========================================
#[derive(Debug, Clone, Copy, Default)]
pub struct PlanOptions {
    pub write_back_inventory: bool, // 分配后的库存是否回写 parts_inventory
}

// ==========================================
// PlanRunReport - 运行结果
// ==========================================
#[derive(Debug, Clone)]
pub struct PlanRunReport {
    pub run: PlanRun,
    pub result: PlanResult,
    pub config: PlanningConfig,
}

// ==========================================
// PlanningApi - 排程 API
// ==========================================
pub struct PlanningApi {
    conn: Arc<Mutex<Connection>>,
    fleet_repo: FleetRepository,
    parts_repo: PartsInventoryRepository,
    maintenance_repo: MaintenanceRecordRepository,
    plan_run_repo: PlanRunRepository,
    config_manager: ConfigManager,
    importer: FleetImporter<CsvParser>,
}

impl PlanningApi {
    /// 打开数据库并确保表结构存在
    pub fn open(db_path: &str) -> ApiResult<Self> {
        info!("打开数据库: {}", db_path);
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| ApiError::DatabaseConnectionError(e.to_string()))?;
        init_schema(&conn).map_err(|e| ApiError::DatabaseError(e.to_string()))?;
        Self::from_connection(Arc::new(Mutex::new(conn)))
    }

    /// 从已有连接创建（各仓储共享同一连接）
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> ApiResult<Self> {
        {
            let guard = conn
                .lock()
                .map_err(|e| ApiError::DatabaseConnectionError(e.to_string()))?;
            configure_sqlite_connection(&guard)
                .map_err(|e| ApiError::DatabaseError(e.to_string()))?;
        }

        Ok(Self {
            fleet_repo: FleetRepository::from_connection(conn.clone()),
            parts_repo: PartsInventoryRepository::from_connection(conn.clone()),
            maintenance_repo: MaintenanceRecordRepository::from_connection(conn.clone()),
            plan_run_repo: PlanRunRepository::from_connection(conn.clone()),
            config_manager: ConfigManager::from_connection(conn.clone())?,
            importer: FleetImporter::csv(),
            conn,
        })
    }

    pub fn config_manager(&self) -> &ConfigManager {
        &self.config_manager
    }

    // ==========================================
    // 导入
    // ==========================================

    pub fn import_fleet_csv(&self, path: &Path) -> ApiResult<ImportSummary> {
        Ok(self.importer.import_fleet(path, &self.fleet_repo)?)
    }

    pub fn import_parts_csv(&self, path: &Path) -> ApiResult<ImportSummary> {
        Ok(self.importer.import_parts(path, &self.parts_repo)?)
    }

    // ==========================================
    // 排程
    // ==========================================

    /// 读取有效配置（config_kv 覆写 + 默认值）
    pub fn load_config(&self) -> ApiResult<PlanningConfig> {
        Ok(self.config_manager.load_planning_config()?)
    }

    /// 校验后更新单个排程参数（未知键或校验失败不写入）
    pub fn update_config(&self, key: &str, value: &str) -> ApiResult<PlanningConfig> {
        Ok(self.config_manager.update_planning_value(key, value)?)
    }

    /// 执行一次排程运行并持久化
    ///
    /// # 参数
    /// - anchor_date: 锚定日（start_day=0）
    /// - options: 运行选项
    ///
    /// # 返回
    /// - Ok(PlanRunReport)
    /// - Err(InvalidConfig / Infeasible): 未写入任何数据
    #[instrument(skip(self), fields(anchor_date = %anchor_date))]
    pub fn run_plan(&self, anchor_date: NaiveDate, options: PlanOptions) -> ApiResult<PlanRunReport> {
        let config = self.load_config()?;
        let fleet = self.fleet_repo.find_all()?;
        let inventory = self.parts_repo.find_all()?;

        if fleet.is_empty() {
            warn!("机队为空，将生成空排程");
        }

        let orchestrator = PlanningOrchestrator::new(config.clone());
        let result = orchestrator.plan(&fleet, &inventory, anchor_date)?;

        let run = PlanRun {
            run_id: result.run_id.clone(),
            created_at: Local::now().naive_local(),
            anchor_date,
            objective: result.objective,
            solve_status: result.solve_status,
            task_count: result.tasks.len(),
            unresourced_count: result.unresourced_count(),
            config_snapshot_json: serde_json::to_string(&config).ok(),
        };
        self.persist_run(&run, &result, options)?;

        info!(
            run_id = %run.run_id,
            objective = run.objective,
            status = %run.solve_status,
            task_count = run.task_count,
            unresourced = run.unresourced_count,
            "排程运行已保存"
        );

        Ok(PlanRunReport {
            run,
            result,
            config,
        })
    }

    /// 排程、运行记录、库存回写在同一事务内提交
    fn persist_run(
        &self,
        run: &PlanRun,
        result: &PlanResult,
        options: PlanOptions,
    ) -> ApiResult<()> {
        let mut conn = self
            .conn
            .lock()
            .map_err(|e| ApiError::DatabaseConnectionError(e.to_string()))?;
        let tx = conn
            .transaction()
            .map_err(|e| ApiError::DatabaseTransactionError(e.to_string()))?;

        MaintenanceRecordRepository::replace_schedule_tx(&tx, &run.run_id, &result.tasks)?;
        PlanRunRepository::insert_tx(&tx, run)?;
        if options.write_back_inventory {
            PartsInventoryRepository::update_quantities_tx(&tx, &result.remaining_inventory)?;
        }

        tx.commit()
            .map_err(|e| ApiError::DatabaseTransactionError(e.to_string()))?;
        if options.write_back_inventory {
            info!(run_id = %run.run_id, "库存已回写");
        }
        Ok(())
    }

    // ==========================================
    // 查询
    // ==========================================

    /// 当前排程汇总
    pub fn schedule_summary(&self, upcoming_limit: usize) -> ApiResult<ScheduleSummary> {
        let tasks = self.maintenance_repo.find_all()?;
        Ok(ScheduleSummary::from_tasks(&tasks, upcoming_limit))
    }

    pub fn latest_run(&self) -> ApiResult<Option<PlanRun>> {
        Ok(self.plan_run_repo.find_latest()?)
    }
}
