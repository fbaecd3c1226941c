// ==========================================
// 机队维修排程系统 - 飞机领域模型
// ==========================================
// 红线: 一次排程运行内飞机数据只读
// 派生字段:
// - hours_since_last_maintenance = flight_hours mod maint_interval_hours
// - hours_until_due = maint_interval_hours - hours_since_last_maintenance
// ==========================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// Aircraft - 飞机快照
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Aircraft {
    pub aircraft_id: String,                  // 飞机编号 (AIR-####)
    pub flight_hours: i64,                    // 累计飞行小时
    pub maint_interval_hours: i64,            // 维修间隔 (小时)
    pub last_maintenance_date: Option<NaiveDate>, // 上次维修日期
    pub hours_since_last_maintenance: i64,    // 派生: 距上次维修小时
    pub hours_until_due: i64,                 // 派生: 距下次到期小时
}

impl Aircraft {
    /// 由累计飞行小时与维修间隔派生维修指标
    ///
    /// # 返回
    /// - Some(Aircraft): 派生成功
    /// - None: 维修间隔非正，无法派生
    pub fn from_flight_hours(
        aircraft_id: impl Into<String>,
        flight_hours: i64,
        maint_interval_hours: i64,
        last_maintenance_date: Option<NaiveDate>,
    ) -> Option<Self> {
        if maint_interval_hours <= 0 {
            return None;
        }

        // rem_euclid: 飞行小时异常为负时也落在 [0, interval)
        let since = flight_hours.rem_euclid(maint_interval_hours);
        Some(Self {
            aircraft_id: aircraft_id.into(),
            flight_hours,
            maint_interval_hours,
            last_maintenance_date,
            hours_since_last_maintenance: since,
            hours_until_due: maint_interval_hours - since,
        })
    }

    /// 派生字段是否与飞行小时/间隔一致
    pub fn has_consistent_metrics(&self) -> bool {
        if self.maint_interval_hours <= 0 {
            return false;
        }
        let since = self.flight_hours.rem_euclid(self.maint_interval_hours);
        self.hours_since_last_maintenance == since
            && self.hours_until_due == self.maint_interval_hours - since
    }
}
