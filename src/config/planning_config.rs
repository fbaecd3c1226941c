// ==========================================
// 机队维修排程系统 - 排程参数
// ==========================================
// 默认值与原排程脚本保持一致:
// 30 天视界 / 工期 1~2 天 / 2 个机组班组 / 30 秒 / 8 个搜索线程
// ==========================================

use crate::engine::error::{PlanningError, PlanningResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_HORIZON_DAYS: u32 = 30;
pub const DEFAULT_MIN_DURATION_DAYS: u32 = 1;
pub const DEFAULT_MAX_DURATION_DAYS: u32 = 2;
pub const DEFAULT_CREW_CAPACITY: u32 = 2;
pub const DEFAULT_TIME_LIMIT_SECONDS: f64 = 30.0;
pub const DEFAULT_SEARCH_PARALLELISM: usize = 8;
pub const DEFAULT_ALLOCATION_SEED: u64 = 42;

// ==========================================
// PlanningConfig - 排程参数
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanningConfig {
    pub horizon_days: u32,         // 排程视界 (天)
    pub min_duration_days: u32,    // 最短工期
    pub max_duration_days: u32,    // 最长工期
    pub crew_capacity: u32,        // 单日最多在修飞机数
    pub time_limit_seconds: f64,   // 求解时间预算
    pub search_parallelism: usize, // 搜索线程数
    pub allocation_seed: u64,      // 备件消耗抽样种子
}

impl Default for PlanningConfig {
    fn default() -> Self {
        Self {
            horizon_days: DEFAULT_HORIZON_DAYS,
            min_duration_days: DEFAULT_MIN_DURATION_DAYS,
            max_duration_days: DEFAULT_MAX_DURATION_DAYS,
            crew_capacity: DEFAULT_CREW_CAPACITY,
            time_limit_seconds: DEFAULT_TIME_LIMIT_SECONDS,
            search_parallelism: DEFAULT_SEARCH_PARALLELISM,
            allocation_seed: DEFAULT_ALLOCATION_SEED,
        }
    }
}

impl PlanningConfig {
    /// 校验参数（求解前调用，失败即返回 ConfigError）
    ///
    /// 规则:
    /// 1) horizon_days > 0
    /// 2) 1 <= min_duration_days <= max_duration_days <= horizon_days
    /// 3) crew_capacity >= 1
    /// 4) time_limit_seconds 为正有限数
    /// 5) search_parallelism >= 1
    pub fn validate(&self) -> PlanningResult<()> {
        if self.horizon_days == 0 {
            return Err(PlanningError::config("horizon_days", "排程视界必须大于 0"));
        }
        if self.min_duration_days == 0 {
            return Err(PlanningError::config(
                "min_duration_days",
                "最短工期必须至少 1 天",
            ));
        }
        if self.min_duration_days > self.max_duration_days {
            return Err(PlanningError::config(
                "min_duration_days",
                format!(
                    "最短工期 {} 大于最长工期 {}",
                    self.min_duration_days, self.max_duration_days
                ),
            ));
        }
        if self.max_duration_days > self.horizon_days {
            return Err(PlanningError::config(
                "max_duration_days",
                format!(
                    "最长工期 {} 超出排程视界 {}",
                    self.max_duration_days, self.horizon_days
                ),
            ));
        }
        if self.crew_capacity == 0 {
            return Err(PlanningError::config("crew_capacity", "班组容量必须至少为 1"));
        }
        if !self.time_limit_seconds.is_finite() || self.time_limit_seconds <= 0.0 {
            return Err(PlanningError::config(
                "time_limit_seconds",
                format!("时间预算必须为正数，实际 {}", self.time_limit_seconds),
            ));
        }
        if self.search_parallelism == 0 {
            return Err(PlanningError::config(
                "search_parallelism",
                "搜索线程数必须至少为 1",
            ));
        }
        Ok(())
    }

    /// 时间预算
    pub fn time_limit(&self) -> Duration {
        Duration::from_secs_f64(self.time_limit_seconds.max(0.0))
    }
}
