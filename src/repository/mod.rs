// ==========================================
// 机队维修排程系统 - 数据仓储层
// ==========================================
// 职责: SQLite 数据访问
// 红线: Repository 不含业务逻辑
// ==========================================

pub mod error;
pub mod fleet_repo;
pub mod maintenance_repo;
pub mod parts_repo;
pub mod plan_run_repo;

pub use error::{RepositoryError, RepositoryResult};
pub use fleet_repo::FleetRepository;
pub use maintenance_repo::MaintenanceRecordRepository;
pub use parts_repo::PartsInventoryRepository;
pub use plan_run_repo::PlanRunRepository;
