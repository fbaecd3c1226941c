// ==========================================
// 机队维修排程系统 - API 层
// ==========================================
// 职责: 组合仓储与引擎，对外提供用例级接口
// ==========================================

pub mod error;
pub mod planning_api;

pub use error::{ApiError, ApiResult};
pub use planning_api::{PlanOptions, PlanRunReport, PlanningApi};
