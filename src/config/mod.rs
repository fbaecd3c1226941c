// ==========================================
// 机队维修排程系统 - 配置层
// ==========================================
// 职责: 排程参数默认值、校验、数据库覆写
// 存储: config_kv 表 (scope_id = 'global')
// ==========================================

pub mod config_manager;
pub mod planning_config;

pub use config_manager::{config_keys, ConfigManager};
pub use planning_config::PlanningConfig;
