// ==========================================
// 机队维修排程系统 - 引擎层错误类型
// ==========================================
// 工具: thiserror 派生宏
// 红线: 两类致命错误均不自动重试，由调用方调整后重新提交
// ==========================================

use thiserror::Error;

/// 排程引擎错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlanningError {
    // ===== 配置错误（求解前检出） =====
    #[error("排程配置无效 (field={field}): {message}")]
    ConfigError {
        field: String,
        message: String,
    },

    // ===== 不可行（求解阶段） =====
    #[error(
        "未找到可行排程: aircraft_count={aircraft_count}, horizon_days={horizon_days}, crew_capacity={crew_capacity} ({reason})"
    )]
    InfeasibleSchedule {
        aircraft_count: usize,
        horizon_days: u32,
        crew_capacity: u32,
        reason: String,
    },

    // ===== 基础设施 =====
    #[error("搜索线程池初始化失败: {0}")]
    WorkerPool(String),

    // 求解器给出的解未通过约束校验，属于引擎缺陷而非输入问题
    #[error("排程引擎内部错误: {0}")]
    InternalError(String),
}

impl PlanningError {
    /// 构造配置错误
    pub fn config(field: &str, message: impl Into<String>) -> Self {
        PlanningError::ConfigError {
            field: field.to_string(),
            message: message.into(),
        }
    }

    /// 是否为配置错误
    pub fn is_config_error(&self) -> bool {
        matches!(self, PlanningError::ConfigError { .. })
    }

    /// 是否为引擎内部错误
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            PlanningError::InternalError(_) | PlanningError::WorkerPool(_)
        )
    }

    /// 是否为不可行错误
    pub fn is_infeasible(&self) -> bool {
        matches!(self, PlanningError::InfeasibleSchedule { .. })
    }
}

/// Result 类型别名
pub type PlanningResult<T> = Result<T, PlanningError>;
