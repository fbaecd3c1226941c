// ==========================================
// 机队维修排程系统 - 排程运行记录
// ==========================================
// 用途: 每次排程运行的审计记录（plan_run 表）
// ==========================================

use crate::domain::types::SolveStatus;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

// ==========================================
// PlanRun - 排程运行记录
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanRun {
    pub run_id: String,                       // UUID v4
    pub created_at: NaiveDateTime,            // 运行时间
    pub anchor_date: NaiveDate,               // 锚定日
    pub objective: i64,                       // Σ start_day × weight
    pub solve_status: SolveStatus,            // OPTIMAL / FEASIBLE
    pub task_count: usize,                    // 任务数
    pub unresourced_count: usize,             // 无备件任务数
    pub config_snapshot_json: Option<String>, // 运行时配置快照
}
