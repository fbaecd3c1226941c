// ==========================================
// 机队维修排程系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 流水线: 建模 → 产能约束搜索 → 备件分配 → 排程输出
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 排程算法
pub mod engine;

// 导入层 - 外部数据
pub mod importer;

// 配置层 - 排程参数
pub mod config;

// API 层 - 用例接口
pub mod api;

// 模拟数据
pub mod simulation;

// 汇总报表
pub mod report;

// 数据库基础设施（连接初始化/建表）
pub mod db;

// 日志系统
pub mod logging;

// ==========================================
// 重导出核心类型
// ==========================================

pub use domain::{Aircraft, MaintenanceTask, Part, PlanRun, PlanStage, SolveStatus, TaskStatus};

pub use config::{ConfigManager, PlanningConfig};

pub use engine::{
    CapacitySearchEngine, PartAllocator, PlanResult, PlanningError, PlanningOrchestrator,
    PlanningResult, ScheduleEmitter, ScheduleModelBuilder, UrgencyEngine,
};

pub use api::{ApiError, ApiResult, PlanOptions, PlanningApi};

pub use report::ScheduleSummary;

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "机队维修排程系统";
