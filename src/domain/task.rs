// ==========================================
// 机队维修排程系统 - 维修任务领域模型
// ==========================================
// 红线: 任务创建后不可变，一机一任务
// 用途: 排程输出，交由持久化/报表协作方原样消费
// ==========================================

use crate::domain::types::TaskStatus;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// MaintenanceTask - 维修任务
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaintenanceTask {
    pub aircraft_id: String,        // 飞机编号

    // ===== 排程信息 =====
    pub start_day: u32,             // 相对锚定日的开工日 [0, horizon)
    pub duration: u32,              // 工期 (天) [min, max]
    pub schedule_start: NaiveDate,  // 开工日期 = anchor + start_day
    pub schedule_end: NaiveDate,    // 完工日期 = anchor + start_day + duration

    // ===== 备件分配 =====
    pub part_id: Option<String>,    // 分配备件 (无库存时为 None)
    pub part_quantity: u32,         // 消耗数量
    pub cost: f64,                  // 备件成本 = unit_cost × part_quantity

    pub status: TaskStatus,         // 任务状态 (排程输出恒为 SCHEDULED)
}

impl MaintenanceTask {
    /// 是否为无备件任务（库存耗尽导致）
    pub fn is_unresourced(&self) -> bool {
        self.part_id.is_none()
    }

    /// 判断任务是否占用指定相对日
    pub fn occupies_day(&self, day: u32) -> bool {
        self.start_day <= day && self.start_day + self.duration > day
    }
}
