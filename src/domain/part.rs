// ==========================================
// 机队维修排程系统 - 备件库存领域模型
// ==========================================
// 红线: 排程运行只修改库存的私有工作副本，不回写源记录
// ==========================================

use serde::{Deserialize, Serialize};

// ==========================================
// Part - 备件库存记录
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Part {
    pub part_id: String,       // 备件编号 (PART-###)
    pub description: String,   // 描述
    pub lead_time_days: i64,   // 补货提前期 (天)
    pub unit_cost: f64,        // 单价 (>= 0)
    pub quantity_on_hand: u32, // 在库数量
}

impl Part {
    /// 是否有可用库存
    pub fn in_stock(&self) -> bool {
        self.quantity_on_hand > 0
    }

    /// 库存总价值
    pub fn stock_value(&self) -> f64 {
        self.unit_cost * f64::from(self.quantity_on_hand)
    }
}
