// ==========================================
// 机队维修排程系统 - 引擎层
// ==========================================
// 流水线: 建模 → 求解 → 备件分配 → 输出
// 红线: Engine 不拼 SQL，不读写数据库
// ==========================================

pub mod emitter;
pub mod error;
pub mod model_builder;
pub mod orchestrator;
pub mod part_allocator;
pub mod search;
pub mod urgency;

// 重导出核心引擎
pub use emitter::ScheduleEmitter;
pub use error::{PlanningError, PlanningResult};
pub use model_builder::{AircraftVars, Assignment, IntDomain, ScheduleModel, ScheduleModelBuilder};
pub use orchestrator::{PlanResult, PlanningOrchestrator};
pub use part_allocator::{AllocationOutcome, PartAllocation, PartAllocator};
pub use search::{CapacitySearchEngine, SearchOutcome};
pub use urgency::UrgencyEngine;
