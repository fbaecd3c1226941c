// ==========================================
// 机队维修排程系统 - 排程汇总报表
// ==========================================
// 输入: 维修任务列表（排程输出或 maintenance_records）
// 输出: KPI 汇总 + 控制台文本渲染
// ==========================================

use crate::domain::task::MaintenanceTask;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::fmt::Write as _;

/// 默认展示的近期任务数
pub const DEFAULT_UPCOMING_LIMIT: usize = 10;

// ==========================================
// ScheduleSummary - 排程汇总
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduleSummary {
    pub total_tasks: usize,
    pub unique_aircraft: usize,
    pub total_parts: u64,
    pub total_cost: f64,
    pub unresourced_tasks: usize,
    pub parts_usage: BTreeMap<String, u64>,      // part_id → 消耗件数
    pub cost_per_aircraft: BTreeMap<String, f64>, // aircraft_id → 成本
    pub upcoming: Vec<MaintenanceTask>,           // 按开工日期排序的前 N 项
}

impl ScheduleSummary {
    /// 由任务列表计算汇总
    ///
    /// # 参数
    /// - tasks: 维修任务
    /// - upcoming_limit: 近期任务展示条数
    pub fn from_tasks(tasks: &[MaintenanceTask], upcoming_limit: usize) -> Self {
        let mut aircraft = HashSet::new();
        let mut parts_usage: BTreeMap<String, u64> = BTreeMap::new();
        let mut cost_per_aircraft: BTreeMap<String, f64> = BTreeMap::new();
        let mut total_parts = 0u64;
        let mut total_cost = 0.0;

        for task in tasks {
            aircraft.insert(task.aircraft_id.as_str());
            total_parts += u64::from(task.part_quantity);
            total_cost += task.cost;
            *cost_per_aircraft.entry(task.aircraft_id.clone()).or_default() += task.cost;
            if let Some(part_id) = &task.part_id {
                *parts_usage.entry(part_id.clone()).or_default() += u64::from(task.part_quantity);
            }
        }

        // 稳定排序：同日开工保持输入顺序
        let mut upcoming = tasks.to_vec();
        upcoming.sort_by_key(|t| t.schedule_start);
        upcoming.truncate(upcoming_limit);

        Self {
            total_tasks: tasks.len(),
            unique_aircraft: aircraft.len(),
            total_parts,
            total_cost,
            unresourced_tasks: tasks.iter().filter(|t| t.is_unresourced()).count(),
            parts_usage,
            cost_per_aircraft,
            upcoming,
        }
    }

    /// 控制台文本渲染
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        if self.total_tasks == 0 {
            out.push_str("暂无维修记录，请先执行 plan\n");
            return out;
        }

        let _ = writeln!(out, "--- 维修排程汇总 ---");
        let _ = writeln!(out, "维修任务总数: {}", self.total_tasks);
        let _ = writeln!(out, "涉及飞机数:   {}", self.unique_aircraft);
        let _ = writeln!(out, "备件总件数:   {}", self.total_parts);
        let _ = writeln!(out, "预估总成本:   {:.2}", self.total_cost);
        let _ = writeln!(out, "无备件任务:   {}", self.unresourced_tasks);

        if !self.parts_usage.is_empty() {
            let _ = writeln!(out, "\n备件消耗:");
            for (part_id, qty) in &self.parts_usage {
                let _ = writeln!(out, "  {:<12} {:>6}", part_id, qty);
            }
        }

        let _ = writeln!(out, "\n近期 {} 项任务:", self.upcoming.len());
        let _ = writeln!(
            out,
            "  {:<10} {:<10} {:<10} {:<10} {:>4} {:>10} {}",
            "飞机", "开工", "完工", "备件", "数量", "成本", "状态"
        );
        for t in &self.upcoming {
            let _ = writeln!(
                out,
                "  {:<10} {:<10} {:<10} {:<10} {:>4} {:>10.2} {}",
                t.aircraft_id,
                t.schedule_start.format("%Y-%m-%d"),
                t.schedule_end.format("%Y-%m-%d"),
                t.part_id.as_deref().unwrap_or("-"),
                t.part_quantity,
                t.cost,
                t.status
            );
        }
        out
    }
}
