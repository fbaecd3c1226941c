// ==========================================
// 机队维修排程系统 - 排程输出器
// ==========================================
// 职责: (start_day, duration) → 绝对日期，生成 MaintenanceTask 列表
// 锚定日: 排程生成当日（由调用方传入，便于复现）
// 红线: 不做额外校验，上游阶段已保证约束
// ==========================================

use crate::domain::aircraft::Aircraft;
use crate::domain::task::MaintenanceTask;
use crate::domain::types::TaskStatus;
use crate::engine::model_builder::Assignment;
use crate::engine::part_allocator::PartAllocation;
use chrono::{Duration, NaiveDate};

// ==========================================
// ScheduleEmitter - 排程输出器
// ==========================================
pub struct ScheduleEmitter {
    anchor_date: NaiveDate,
}

impl ScheduleEmitter {
    pub fn new(anchor_date: NaiveDate) -> Self {
        Self { anchor_date }
    }

    pub fn anchor_date(&self) -> NaiveDate {
        self.anchor_date
    }

    /// 生成维修任务（顺序与输入机队一致）
    ///
    /// 三个切片按下标一一对应
    pub fn emit(
        &self,
        fleet: &[Aircraft],
        assignments: &[Assignment],
        allocations: &[PartAllocation],
    ) -> Vec<MaintenanceTask> {
        fleet
            .iter()
            .zip(assignments)
            .zip(allocations)
            .map(|((aircraft, assignment), allocation)| {
                let start_offset = i64::from(assignment.start_day);
                let end_offset = start_offset + i64::from(assignment.duration);
                MaintenanceTask {
                    aircraft_id: aircraft.aircraft_id.clone(),
                    start_day: assignment.start_day,
                    duration: assignment.duration,
                    schedule_start: self.anchor_date + Duration::days(start_offset),
                    schedule_end: self.anchor_date + Duration::days(end_offset),
                    part_id: allocation.part_id.clone(),
                    part_quantity: allocation.part_quantity,
                    cost: allocation.cost,
                    status: TaskStatus::Scheduled,
                }
            })
            .collect()
    }
}
