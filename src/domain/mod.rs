// ==========================================
// 机队维修排程系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod aircraft;
pub mod part;
pub mod plan_run;
pub mod task;
pub mod types;

// 重导出核心类型
pub use aircraft::Aircraft;
pub use part::Part;
pub use plan_run::PlanRun;
pub use task::MaintenanceTask;
pub use types::{PlanStage, SolveStatus, TaskStatus};
