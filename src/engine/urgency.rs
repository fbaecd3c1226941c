// ==========================================
// 机队维修排程系统 - 紧迫度权重引擎
// ==========================================
// 规则:
//   weight(a) = max(1, round((max_due - due(a)) / max_due × 100))
//   max_due = 本次运行全体飞机 hours_until_due 最大值
//             (机队为空或全为 0 时取 1，避免除零)
// 距到期越近 → 权重越大 → 目标函数越倾向于提前开工
// ==========================================

use crate::domain::aircraft::Aircraft;
use tracing::instrument;

/// 权重下限
pub const MIN_WEIGHT: i64 = 1;
/// 归一化刻度
pub const WEIGHT_SCALE: f64 = 100.0;

// ==========================================
// UrgencyEngine - 紧迫度权重引擎
// ==========================================
pub struct UrgencyEngine {
    // 无状态引擎
}

impl UrgencyEngine {
    /// 创建新的紧迫度权重引擎
    pub fn new() -> Self {
        Self {}
    }

    /// 计算归一化基准 max_hours_until_due
    pub fn max_hours_until_due(&self, fleet: &[Aircraft]) -> i64 {
        let max = fleet.iter().map(|a| a.hours_until_due).max().unwrap_or(0);
        if max <= 0 {
            1
        } else {
            max
        }
    }

    /// 单机权重
    pub fn weight_for(&self, hours_until_due: i64, max_hours_until_due: i64) -> i64 {
        let max = max_hours_until_due.max(1) as f64;
        let ratio = (max - hours_until_due as f64) / max;
        let weight = (ratio * WEIGHT_SCALE).round() as i64;
        weight.max(MIN_WEIGHT)
    }

    /// 批量计算权重（顺序与输入机队一致）
    #[instrument(skip(self, fleet), fields(count = fleet.len()))]
    pub fn evaluate_batch(&self, fleet: &[Aircraft]) -> Vec<i64> {
        let max = self.max_hours_until_due(fleet);
        fleet
            .iter()
            .map(|a| self.weight_for(a.hours_until_due, max))
            .collect()
    }
}

impl Default for UrgencyEngine {
    fn default() -> Self {
        Self::new()
    }
}
