// ==========================================
// 机队维修排程系统 - 排程模型构建器
// ==========================================
// 输入: 机队快照 + PlanningConfig
// 输出: ScheduleModel
//
// 决策变量（每架飞机）:
// - start_day ∈ [0, horizon_days - 1]
// - duration  ∈ [min_duration_days, max_duration_days]
// - occupies(a, d), d ∈ [0, horizon_days)
//
// 关联约束（双向）:
//   occupies(a,d) ⇔ start_day(a) ≤ d ∧ start_day(a) + duration(a) > d
// 容量约束:
//   ∀d: Σ_a occupies(a,d) ≤ crew_capacity
// 目标:
//   min Σ_a start_day(a) × weight(a)
// ==========================================

use crate::config::PlanningConfig;
use crate::domain::aircraft::Aircraft;
use crate::engine::error::PlanningResult;
use crate::engine::urgency::UrgencyEngine;
use serde::{Deserialize, Serialize};
use std::ops::Range;
use tracing::{debug, instrument};

// ==========================================
// IntDomain - 整数闭区间域
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntDomain {
    pub lo: u32,
    pub hi: u32,
}

impl IntDomain {
    pub fn new(lo: u32, hi: u32) -> Self {
        Self { lo, hi }
    }

    pub fn contains(&self, value: u32) -> bool {
        self.lo <= value && value <= self.hi
    }
}

// ==========================================
// AircraftVars - 单机决策变量
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AircraftVars {
    pub fleet_index: usize,     // 在输入机队中的位置
    pub aircraft_id: String,
    pub hours_until_due: i64,
    pub weight: i64,            // 目标函数系数
    pub start_day: IntDomain,
    pub duration: IntDomain,
}

/// 单机取值（开工日 + 工期）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub start_day: u32,
    pub duration: u32,
}

// ==========================================
// ScheduleModel - 排程模型
// ==========================================
#[derive(Debug, Clone)]
pub struct ScheduleModel {
    horizon_days: u32,
    crew_capacity: u32,
    max_hours_until_due: i64,
    vars: Vec<AircraftVars>,
}

impl ScheduleModel {
    pub fn horizon_days(&self) -> u32 {
        self.horizon_days
    }

    pub fn crew_capacity(&self) -> u32 {
        self.crew_capacity
    }

    pub fn max_hours_until_due(&self) -> i64 {
        self.max_hours_until_due
    }

    pub fn vars(&self) -> &[AircraftVars] {
        &self.vars
    }

    pub fn aircraft_count(&self) -> usize {
        self.vars.len()
    }

    /// occupies(a,d) 的定义
    pub fn occupies(assignment: Assignment, day: u32) -> bool {
        assignment.start_day <= day && assignment.start_day + assignment.duration > day
    }

    /// 视界内被占用的日区间 [start, min(start+duration, horizon))
    pub fn occupied_days(&self, assignment: Assignment) -> Range<u32> {
        let end = assignment
            .start_day
            .saturating_add(assignment.duration)
            .min(self.horizon_days);
        assignment.start_day.min(end)..end
    }

    /// occupies 布尔矩阵（飞机 × 日），按关联约束求值
    pub fn occupancy_matrix(&self, assignments: &[Assignment]) -> Vec<Vec<bool>> {
        assignments
            .iter()
            .map(|&a| {
                (0..self.horizon_days)
                    .map(|d| Self::occupies(a, d))
                    .collect()
            })
            .collect()
    }

    /// 每日在修飞机数
    pub fn daily_load(&self, assignments: &[Assignment]) -> Vec<u32> {
        let mut load = vec![0u32; self.horizon_days as usize];
        for &a in assignments {
            for d in self.occupied_days(a) {
                load[d as usize] += 1;
            }
        }
        load
    }

    /// 目标值 Σ start_day × weight
    pub fn objective(&self, assignments: &[Assignment]) -> i64 {
        self.vars
            .iter()
            .zip(assignments)
            .map(|(v, a)| v.weight * i64::from(a.start_day))
            .sum()
    }

    /// 单班组可容纳的最多任务数（最短工期、视界末端截断）
    ///
    /// 开工日取 0, L, 2L, ... ≤ horizon-1
    pub fn max_tasks_per_crew(&self) -> usize {
        let min_duration = self
            .vars
            .first()
            .map(|v| v.duration.lo)
            .unwrap_or(1)
            .max(1);
        ((self.horizon_days.saturating_sub(1) / min_duration) + 1) as usize
    }

    /// 全视界可容纳任务数上界（区间图 C 着色）
    pub fn packing_upper_bound(&self) -> usize {
        self.max_tasks_per_crew() * self.crew_capacity as usize
    }

    /// 校验取值是否满足全部约束
    ///
    /// 检查项:
    /// 1) 数量与变量一致
    /// 2) 开工日/工期落在域内
    /// 3) occupies 矩阵与关联约束双向一致
    /// 4) 每日容量
    pub fn verify(
        &self,
        assignments: &[Assignment],
        occupancy: &[Vec<bool>],
    ) -> Result<(), String> {
        if assignments.len() != self.vars.len() || occupancy.len() != self.vars.len() {
            return Err(format!(
                "取值数量不一致: vars={}, assignments={}, occupancy_rows={}",
                self.vars.len(),
                assignments.len(),
                occupancy.len()
            ));
        }

        let mut load = vec![0u32; self.horizon_days as usize];
        for ((var, &a), row) in self.vars.iter().zip(assignments).zip(occupancy) {
            if !var.start_day.contains(a.start_day) {
                return Err(format!(
                    "{}: start_day={} 超出域 [{}, {}]",
                    var.aircraft_id, a.start_day, var.start_day.lo, var.start_day.hi
                ));
            }
            if !var.duration.contains(a.duration) {
                return Err(format!(
                    "{}: duration={} 超出域 [{}, {}]",
                    var.aircraft_id, a.duration, var.duration.lo, var.duration.hi
                ));
            }
            if row.len() != self.horizon_days as usize {
                return Err(format!(
                    "{}: occupies 行长度 {} 不等于视界",
                    var.aircraft_id,
                    row.len()
                ));
            }
            for (d, &on) in row.iter().enumerate() {
                let linked = Self::occupies(a, d as u32);
                if on != linked {
                    return Err(format!(
                        "{}: 第 {} 天 occupies={} 与 start={}, duration={} 不一致",
                        var.aircraft_id, d, on, a.start_day, a.duration
                    ));
                }
                if on {
                    load[d] += 1;
                }
            }
        }

        if let Some((day, &n)) = load
            .iter()
            .enumerate()
            .find(|&(_, &n)| n > self.crew_capacity)
        {
            return Err(format!(
                "第 {} 天在修 {} 架，超出班组容量 {}",
                day, n, self.crew_capacity
            ));
        }
        Ok(())
    }
}

// ==========================================
// ScheduleModelBuilder - 模型构建器
// ==========================================
pub struct ScheduleModelBuilder {
    urgency: UrgencyEngine,
}

impl ScheduleModelBuilder {
    pub fn new() -> Self {
        Self {
            urgency: UrgencyEngine::new(),
        }
    }

    /// 构建排程模型
    ///
    /// 配置非法时返回 ConfigError（求解前即失败）
    #[instrument(skip(self, fleet, config), fields(
        aircraft_count = fleet.len(),
        horizon_days = config.horizon_days,
        crew_capacity = config.crew_capacity
    ))]
    pub fn build(
        &self,
        fleet: &[Aircraft],
        config: &PlanningConfig,
    ) -> PlanningResult<ScheduleModel> {
        config.validate()?;

        let max_hours_until_due = self.urgency.max_hours_until_due(fleet);
        let weights = self.urgency.evaluate_batch(fleet);

        let start_domain = IntDomain::new(0, config.horizon_days - 1);
        let duration_domain = IntDomain::new(config.min_duration_days, config.max_duration_days);

        let vars: Vec<AircraftVars> = fleet
            .iter()
            .zip(weights)
            .enumerate()
            .map(|(idx, (aircraft, weight))| AircraftVars {
                fleet_index: idx,
                aircraft_id: aircraft.aircraft_id.clone(),
                hours_until_due: aircraft.hours_until_due,
                weight,
                start_day: start_domain,
                duration: duration_domain,
            })
            .collect();

        debug!(
            max_hours_until_due,
            occupancy_vars = vars.len() * config.horizon_days as usize,
            "排程模型构建完成"
        );

        Ok(ScheduleModel {
            horizon_days: config.horizon_days,
            crew_capacity: config.crew_capacity,
            max_hours_until_due,
            vars,
        })
    }
}

impl Default for ScheduleModelBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::error::PlanningError;

    fn fleet(dues: &[i64]) -> Vec<Aircraft> {
        dues.iter()
            .enumerate()
            .map(|(i, &due)| Aircraft {
                aircraft_id: format!("AIR-{}", 1001 + i),
                flight_hours: 1000,
                maint_interval_hours: 1000,
                last_maintenance_date: None,
                hours_since_last_maintenance: 1000 - due,
                hours_until_due: due,
            })
            .collect()
    }

    fn config(horizon: u32, min: u32, max: u32, capacity: u32) -> PlanningConfig {
        PlanningConfig {
            horizon_days: horizon,
            min_duration_days: min,
            max_duration_days: max,
            crew_capacity: capacity,
            ..PlanningConfig::default()
        }
    }

    #[test]
    fn test_build_domains_and_weights() {
        let builder = ScheduleModelBuilder::new();
        let model = builder.build(&fleet(&[10, 500, 50]), &config(30, 1, 2, 2)).unwrap();

        assert_eq!(model.aircraft_count(), 3);
        assert_eq!(model.max_hours_until_due(), 500);
        let weights: Vec<i64> = model.vars().iter().map(|v| v.weight).collect();
        assert_eq!(weights, vec![98, 1, 90]);
        for v in model.vars() {
            assert_eq!(v.start_day, IntDomain::new(0, 29));
            assert_eq!(v.duration, IntDomain::new(1, 2));
        }
    }

    #[test]
    fn test_build_rejects_duration_beyond_horizon() {
        let builder = ScheduleModelBuilder::new();
        let err = builder.build(&fleet(&[10]), &config(2, 3, 3, 1)).unwrap_err();
        assert!(matches!(err, PlanningError::ConfigError { .. }));
    }

    #[test]
    fn test_occupancy_linking_is_bidirectional() {
        let builder = ScheduleModelBuilder::new();
        let model = builder.build(&fleet(&[10, 20]), &config(5, 1, 3, 2)).unwrap();
        let assignments = vec![
            Assignment {
                start_day: 1,
                duration: 2,
            },
            Assignment {
                start_day: 4,
                duration: 3,
            },
        ];
        let occupancy = model.occupancy_matrix(&assignments);
        assert_eq!(occupancy[0], vec![false, true, true, false, false]);
        // 视界末端截断
        assert_eq!(occupancy[1], vec![false, false, false, false, true]);
        assert!(model.verify(&assignments, &occupancy).is_ok());

        // 任一方向不一致都应被拒绝
        let mut extra = occupancy.clone();
        extra[0][3] = true;
        assert!(model.verify(&assignments, &extra).is_err());
        let mut missing = occupancy.clone();
        missing[0][1] = false;
        assert!(model.verify(&assignments, &missing).is_err());
    }

    #[test]
    fn test_verify_detects_capacity_violation() {
        let builder = ScheduleModelBuilder::new();
        let model = builder.build(&fleet(&[10, 20]), &config(5, 1, 2, 1)).unwrap();
        let assignments = vec![
            Assignment {
                start_day: 0,
                duration: 2,
            },
            Assignment {
                start_day: 1,
                duration: 1,
            },
        ];
        let occupancy = model.occupancy_matrix(&assignments);
        let err = model.verify(&assignments, &occupancy).unwrap_err();
        assert!(err.contains("超出班组容量"), "{}", err);
        assert_eq!(model.daily_load(&assignments), vec![1, 2, 0, 0, 0]);
    }

    #[test]
    fn test_verify_detects_domain_violation() {
        let builder = ScheduleModelBuilder::new();
        let model = builder.build(&fleet(&[10]), &config(5, 2, 3, 1)).unwrap();
        let assignments = vec![Assignment {
            start_day: 0,
            duration: 1,
        }];
        let occupancy = model.occupancy_matrix(&assignments);
        assert!(model.verify(&assignments, &occupancy).is_err());
    }

    #[test]
    fn test_packing_upper_bound() {
        let builder = ScheduleModelBuilder::new();
        // H=5, L=2: 开工日 0,2,4 → 3 架/班组
        let model = builder.build(&fleet(&[10]), &config(5, 2, 2, 2)).unwrap();
        assert_eq!(model.max_tasks_per_crew(), 3);
        assert_eq!(model.packing_upper_bound(), 6);
        // H=3, L=1: 3 架/班组
        let model = builder.build(&fleet(&[10]), &config(3, 1, 1, 1)).unwrap();
        assert_eq!(model.packing_upper_bound(), 3);
    }

    #[test]
    fn test_objective() {
        let builder = ScheduleModelBuilder::new();
        let model = builder.build(&fleet(&[10, 500, 50]), &config(30, 1, 2, 2)).unwrap();
        let assignments = vec![
            Assignment {
                start_day: 0,
                duration: 1,
            },
            Assignment {
                start_day: 3,
                duration: 1,
            },
            Assignment {
                start_day: 1,
                duration: 1,
            },
        ];
        // 98×0 + 1×3 + 90×1
        assert_eq!(model.objective(&assignments), 93);
    }
}
