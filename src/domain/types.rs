// ==========================================
// 机队维修排程系统 - 领域类型定义
// ==========================================
// 序列化格式: SCREAMING_SNAKE_CASE (与数据库一致)
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ==========================================
// 维修任务状态 (Task Status)
// ==========================================
// 排程器只产出 SCHEDULED；其余状态由下游系统回写
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    Scheduled,  // 已排程
    InProgress, // 执行中
    Completed,  // 已完成
    Cancelled,  // 已取消
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskStatus::Scheduled => write!(f, "SCHEDULED"),
            TaskStatus::InProgress => write!(f, "IN_PROGRESS"),
            TaskStatus::Completed => write!(f, "COMPLETED"),
            TaskStatus::Cancelled => write!(f, "CANCELLED"),
        }
    }
}

impl FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "SCHEDULED" => Ok(TaskStatus::Scheduled),
            "IN_PROGRESS" => Ok(TaskStatus::InProgress),
            "COMPLETED" => Ok(TaskStatus::Completed),
            "CANCELLED" => Ok(TaskStatus::Cancelled),
            other => Err(format!("未知任务状态: {}", other)),
        }
    }
}

// ==========================================
// 求解状态 (Solve Status)
// ==========================================
// Optimal: 搜索在时间预算内完成，最优性已证明
// Feasible: 时间预算耗尽，返回当前最好解
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SolveStatus {
    Optimal,
    Feasible,
}

impl fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolveStatus::Optimal => write!(f, "OPTIMAL"),
            SolveStatus::Feasible => write!(f, "FEASIBLE"),
        }
    }
}

impl FromStr for SolveStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "OPTIMAL" => Ok(SolveStatus::Optimal),
            "FEASIBLE" => Ok(SolveStatus::Feasible),
            other => Err(format!("未知求解状态: {}", other)),
        }
    }
}

// ==========================================
// 排程运行阶段 (Plan Stage)
// ==========================================
// 单向流水线: Built → Solved → Allocated → Emitted
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlanStage {
    Built,
    Solved,
    Allocated,
    Emitted,
}

impl fmt::Display for PlanStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanStage::Built => write!(f, "BUILT"),
            PlanStage::Solved => write!(f, "SOLVED"),
            PlanStage::Allocated => write!(f, "ALLOCATED"),
            PlanStage::Emitted => write!(f, "EMITTED"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_status_round_trip_through_display() {
        for status in [
            TaskStatus::Scheduled,
            TaskStatus::InProgress,
            TaskStatus::Completed,
            TaskStatus::Cancelled,
        ] {
            let parsed: TaskStatus = status.to_string().parse().unwrap();
            assert_eq!(parsed, status);
        }
        assert!("DONE".parse::<TaskStatus>().is_err());
    }

    #[test]
    fn test_task_status_serde_matches_db_format() {
        let json = serde_json::to_string(&TaskStatus::Scheduled).unwrap();
        assert_eq!(json, "\"SCHEDULED\"");
    }

    #[test]
    fn test_plan_stage_ordering() {
        assert!(PlanStage::Built < PlanStage::Solved);
        assert!(PlanStage::Solved < PlanStage::Allocated);
        assert!(PlanStage::Allocated < PlanStage::Emitted);
    }
}
