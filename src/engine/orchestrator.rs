// ==========================================
// 机队维修排程系统 - 引擎编排器
// ==========================================
// 用途: 串联四个阶段
//   Built → Solved → Allocated → Emitted
// 失败: 仅 配置错误 / 不可行 两种致命错误，无重试
// 红线: 流水线全部成功后才产出任务列表，不产生部分排程
// ==========================================

use crate::config::PlanningConfig;
use crate::domain::aircraft::Aircraft;
use crate::domain::part::Part;
use crate::domain::task::MaintenanceTask;
use crate::domain::types::{PlanStage, SolveStatus};
use crate::engine::emitter::ScheduleEmitter;
use crate::engine::error::PlanningResult;
use crate::engine::model_builder::ScheduleModelBuilder;
use crate::engine::part_allocator::PartAllocator;
use crate::engine::search::CapacitySearchEngine;
use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::Duration;
use tracing::{info, instrument};
use uuid::Uuid;

// ==========================================
// PlanResult - 一次排程运行的结果
// ==========================================
#[derive(Debug, Clone)]
pub struct PlanResult {
    pub run_id: String,
    pub anchor_date: NaiveDate,
    pub tasks: Vec<MaintenanceTask>,   // 按输入机队顺序
    pub remaining_inventory: Vec<Part>, // 分配后的库存工作副本（是否回写由调用方决定）
    pub objective: i64,
    pub solve_status: SolveStatus,
    pub nodes_explored: u64,
    pub solve_elapsed: Duration,
    pub stage: PlanStage,
}

impl PlanResult {
    pub fn unresourced_count(&self) -> usize {
        self.tasks.iter().filter(|t| t.is_unresourced()).count()
    }
}

// ==========================================
// PlanningOrchestrator - 引擎编排器
// ==========================================
pub struct PlanningOrchestrator {
    config: PlanningConfig,
    builder: ScheduleModelBuilder,
    search: CapacitySearchEngine,
}

impl PlanningOrchestrator {
    /// 创建编排器
    ///
    /// # 参数
    /// - config: 排程配置（在 plan 时校验）
    pub fn new(config: PlanningConfig) -> Self {
        Self {
            search: CapacitySearchEngine::from_config(&config),
            builder: ScheduleModelBuilder::new(),
            config,
        }
    }

    pub fn config(&self) -> &PlanningConfig {
        &self.config
    }

    /// 执行完整排程流程
    ///
    /// # 参数
    /// - fleet: 机队快照
    /// - inventory: 库存快照（只读）
    /// - anchor_date: 锚定日，start_day=0 对应此日期
    ///
    /// # 返回
    /// - Ok(PlanResult): stage = Emitted
    /// - Err(ConfigError / InfeasibleSchedule)
    #[instrument(skip(self, fleet, inventory), fields(
        aircraft_count = fleet.len(),
        part_types = inventory.len(),
        anchor_date = %anchor_date
    ))]
    pub fn plan(
        &self,
        fleet: &[Aircraft],
        inventory: &[Part],
        anchor_date: NaiveDate,
    ) -> PlanningResult<PlanResult> {
        let run_id = Uuid::new_v4().to_string();
        info!(run_id = %run_id, "开始排程运行");

        // ==========================================
        // 阶段1: 建模
        // ==========================================
        let model = self.builder.build(fleet, &self.config)?;
        info!(run_id = %run_id, stage = %PlanStage::Built, "模型构建完成");

        // ==========================================
        // 阶段2: 求解
        // ==========================================
        let outcome = self.search.solve(&model)?;
        info!(
            run_id = %run_id,
            stage = %PlanStage::Solved,
            objective = outcome.objective,
            status = %outcome.status,
            nodes = outcome.nodes_explored,
            "求解完成"
        );

        // ==========================================
        // 阶段3: 备件分配（顺序执行）
        // ==========================================
        let mut allocator = PartAllocator::new(StdRng::seed_from_u64(self.config.allocation_seed));
        let allocation = allocator.allocate(fleet.len(), inventory);
        info!(
            run_id = %run_id,
            stage = %PlanStage::Allocated,
            unresourced = allocation.unresourced_count(),
            "备件分配完成"
        );

        // ==========================================
        // 阶段4: 输出
        // ==========================================
        let emitter = ScheduleEmitter::new(anchor_date);
        let tasks = emitter.emit(fleet, &outcome.assignments, &allocation.allocations);
        info!(
            run_id = %run_id,
            stage = %PlanStage::Emitted,
            task_count = tasks.len(),
            "排程输出完成"
        );

        Ok(PlanResult {
            run_id,
            anchor_date,
            tasks,
            remaining_inventory: allocation.remaining_inventory,
            objective: outcome.objective,
            solve_status: outcome.status,
            nodes_explored: outcome.nodes_explored,
            solve_elapsed: outcome.elapsed,
            stage: PlanStage::Emitted,
        })
    }
}
