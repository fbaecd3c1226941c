// ==========================================
// 机队维修排程系统 - 备件分配引擎
// ==========================================
// 输入: 求解后的任务（按输入机队顺序） + 库存快照
// 输出: 每架飞机的备件分配 + 分配后的库存工作副本
// ==========================================
// 规则:
// 1) 工作副本按在库数量降序（稳定排序）
// 2) 轮转游标，从游标处向后查找有货备件，回绕，最多探测 len 次
// 3) 找到: 消耗量 ~ U[1, min(3, 在库)]，扣减工作副本，游标移到其后
// 4) 未找到: 任务无备件 (part_id=None, quantity=0, cost=0)，不视为错误
// 红线: 严格顺序执行；工作副本私有，不与调用方库存共享
// ==========================================

use crate::domain::part::Part;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// 单任务最多消耗件数
pub const MAX_UNITS_PER_TASK: u32 = 3;

// ==========================================
// PartAllocation - 单任务分配结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartAllocation {
    pub part_id: Option<String>,
    pub part_quantity: u32,
    pub cost: f64,
}

impl PartAllocation {
    /// 无备件分配
    pub fn unresourced() -> Self {
        Self {
            part_id: None,
            part_quantity: 0,
            cost: 0.0,
        }
    }
}

// ==========================================
// AllocationOutcome - 批量分配结果
// ==========================================
#[derive(Debug, Clone)]
pub struct AllocationOutcome {
    pub allocations: Vec<PartAllocation>, // 与任务一一对应
    pub remaining_inventory: Vec<Part>,   // 分配后的工作副本（降序排列）
}

impl AllocationOutcome {
    pub fn unresourced_count(&self) -> usize {
        self.allocations.iter().filter(|a| a.part_id.is_none()).count()
    }
}

// ==========================================
// PartAllocator - 备件分配引擎
// ==========================================
// 随机源由构造函数注入；同种子两次运行分配结果一致
pub struct PartAllocator<R: Rng> {
    rng: R,
}

impl<R: Rng> PartAllocator<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// 为 task_count 个任务依次分配备件
    ///
    /// # 参数
    /// - task_count: 任务数（调用方保证与机队顺序一致）
    /// - inventory: 调用方库存（只读，内部复制）
    #[instrument(skip(self, inventory), fields(part_types = inventory.len()))]
    pub fn allocate(&mut self, task_count: usize, inventory: &[Part]) -> AllocationOutcome {
        let mut working: Vec<Part> = inventory.to_vec();
        working.sort_by(|a, b| b.quantity_on_hand.cmp(&a.quantity_on_hand));

        let len = working.len();
        let mut cursor = 0usize;
        let mut allocations = Vec::with_capacity(task_count);

        for task_idx in 0..task_count {
            let allocation = match Self::find_in_stock(&working, cursor) {
                Some(idx) => {
                    let part = &mut working[idx];
                    let upper = part.quantity_on_hand.min(MAX_UNITS_PER_TASK);
                    let quantity = self.rng.random_range(1..=upper);
                    part.quantity_on_hand -= quantity;
                    cursor = (idx + 1) % len;

                    PartAllocation {
                        part_id: Some(part.part_id.clone()),
                        part_quantity: quantity,
                        cost: part.unit_cost * f64::from(quantity),
                    }
                }
                None => {
                    debug!(task_idx, "库存耗尽，任务无备件");
                    PartAllocation::unresourced()
                }
            };
            allocations.push(allocation);
        }

        AllocationOutcome {
            allocations,
            remaining_inventory: working,
        }
    }

    /// 从游标开始回绕查找有货备件，最多探测 len 次
    fn find_in_stock(working: &[Part], cursor: usize) -> Option<usize> {
        let len = working.len();
        (0..len)
            .map(|probe| (cursor + probe) % len)
            .find(|&idx| working[idx].in_stock())
    }
}
