// ==========================================
// 机队维修排程系统 - 容量约束搜索引擎
// ==========================================
// 输入: ScheduleModel
// 输出: 每架飞机 (start_day, duration) + 目标值 + 求解状态
// ==========================================
// 算法: 分支定界 (DFS)
// - 分支顺序: 权重降序，同权重按机队下标升序
// - 取值顺序: 开工日升序
// - 工期: 取域下界。工期不进入目标函数，且同一开工日下较长工期
//         占用的日集合是较短工期的超集，故下界工期支配其余取值
// - 对称破除: 相邻同权重飞机（同域）开工日不递减
// - 下界: 剩余飞机按开工日排序后第 j 架的最早可能开工日 t_j，
//         权重降序依次配给 t_1 <= t_2 <= ...
//         t_j 由两类容量给出: 截至 d 日的空余班组位数，
//         以及 [0, d+L) 内空余班组日数 / min(L, H-d)
// - 初始解: 沿分支顺序首次下潜（最早可行开工），即贪心列表排程；
//           开始求解时预算已耗尽则不做
// - 解校验失败视为引擎内部错误
// - 并行: 首架飞机的每个开工日作为一棵子树交给 rayon 线程池，
//         共享全局最优目标值用于剪枝
// - 时间预算: 超时即停止，返回当前最好解 (FEASIBLE)
// ==========================================

use crate::config::PlanningConfig;
use crate::domain::types::SolveStatus;
use crate::engine::error::{PlanningError, PlanningResult};
use crate::engine::model_builder::{Assignment, ScheduleModel};
use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};

/// 每隔多少个节点检查一次时间预算
const DEADLINE_CHECK_INTERVAL: u64 = 256;

// ==========================================
// SearchOutcome - 求解结果
// ==========================================
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub assignments: Vec<Assignment>,   // 按输入机队顺序
    pub occupancy: Vec<Vec<bool>>,      // occupies(a, d)
    pub objective: i64,
    pub status: SolveStatus,
    pub nodes_explored: u64,
    pub elapsed: Duration,
}

// ==========================================
// CapacitySearchEngine - 搜索引擎
// ==========================================
pub struct CapacitySearchEngine {
    time_limit: Duration,
    parallelism: usize,
}

impl CapacitySearchEngine {
    pub fn new(time_limit: Duration, parallelism: usize) -> Self {
        Self {
            time_limit,
            parallelism: parallelism.max(1),
        }
    }

    pub fn from_config(config: &PlanningConfig) -> Self {
        Self::new(config.time_limit(), config.search_parallelism)
    }

    /// 求解（阻塞调用，最长 time_limit）
    ///
    /// # 返回
    /// - Ok(SearchOutcome): 找到可行解（OPTIMAL 或 FEASIBLE）
    /// - Err(InfeasibleSchedule): 不可行或预算内无解
    #[instrument(skip(self, model), fields(
        aircraft_count = model.aircraft_count(),
        horizon_days = model.horizon_days(),
        crew_capacity = model.crew_capacity(),
        parallelism = self.parallelism
    ))]
    pub fn solve(&self, model: &ScheduleModel) -> PlanningResult<SearchOutcome> {
        let started = Instant::now();
        let n = model.aircraft_count();

        if n == 0 {
            return Ok(SearchOutcome {
                assignments: Vec::new(),
                occupancy: Vec::new(),
                objective: 0,
                status: SolveStatus::Optimal,
                nodes_explored: 0,
                elapsed: started.elapsed(),
            });
        }

        // 1. 容量上界预检：任务数超过可容纳上界则必然不可行
        let upper_bound = model.packing_upper_bound();
        if n > upper_bound {
            warn!(n, upper_bound, "任务数超过视界容量上界");
            return Err(self.infeasible(
                model,
                format!("至多可容纳 {} 个维修任务，实际 {} 架飞机", upper_bound, n),
            ));
        }

        let ctx = SearchContext::new(model, started + self.time_limit);

        // 2. 贪心初始解
        let greedy = if ctx.deadline_reached() {
            None
        } else {
            ctx.greedy()
        };
        if let Some((cost, _)) = &greedy {
            ctx.global_best.fetch_min(*cost, Ordering::SeqCst);
            debug!(objective = *cost, "贪心初始解");
        }

        // 3. 并行分支定界
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.parallelism)
            .build()
            .map_err(|e| PlanningError::WorkerPool(e.to_string()))?;

        let root_results: Vec<RootResult> = pool.install(|| {
            (0..model.horizon_days())
                .into_par_iter()
                .map(|root_start| {
                    let mut worker = Worker::new(&ctx);
                    worker.search_root(root_start);
                    RootResult {
                        root_start,
                        best: worker.best,
                        nodes: worker.nodes,
                    }
                })
                .collect()
        });

        let nodes_explored: u64 = root_results.iter().map(|r| r.nodes).sum();
        let timed_out = ctx.timed_out.load(Ordering::SeqCst);

        // 4. 汇总: 目标值最小者胜；同目标按搜索顺序（首架开工日小者，分支定界结果先于贪心）
        let mut candidates: Vec<(i64, u32, u8, Vec<u32>)> = root_results
            .into_iter()
            .filter_map(|r| r.best.map(|(cost, starts)| (cost, r.root_start, 0u8, starts)))
            .collect();
        if let Some((cost, starts)) = greedy {
            let root_start = starts.first().copied().unwrap_or(0);
            candidates.push((cost, root_start, 1u8, starts));
        }
        let best = candidates
            .into_iter()
            .min_by(|a, b| (a.0, a.1, a.2).cmp(&(b.0, b.1, b.2)));

        let (objective, starts) = match best {
            Some((cost, _, _, starts)) => (cost, starts),
            None => {
                let reason = if timed_out {
                    format!("时间预算 {:?} 内未找到可行解", self.time_limit)
                } else {
                    "搜索空间已穷尽".to_string()
                };
                return Err(self.infeasible(model, reason));
            }
        };

        let assignments = ctx.to_fleet_order(&starts);
        let occupancy = verified_occupancy(model, &assignments)?;

        let status = if timed_out {
            SolveStatus::Feasible
        } else {
            SolveStatus::Optimal
        };

        let elapsed = started.elapsed();
        info!(
            objective,
            status = %status,
            nodes_explored,
            elapsed_ms = elapsed.as_millis() as u64,
            "求解完成"
        );

        Ok(SearchOutcome {
            assignments,
            occupancy,
            objective,
            status,
            nodes_explored,
            elapsed,
        })
    }

    fn infeasible(&self, model: &ScheduleModel, reason: String) -> PlanningError {
        PlanningError::InfeasibleSchedule {
            aircraft_count: model.aircraft_count(),
            horizon_days: model.horizon_days(),
            crew_capacity: model.crew_capacity(),
            reason,
        }
    }
}

/// 生成 occupancy 矩阵并校验全部约束
fn verified_occupancy(
    model: &ScheduleModel,
    assignments: &[Assignment],
) -> PlanningResult<Vec<Vec<bool>>> {
    let occupancy = model.occupancy_matrix(assignments);
    model
        .verify(assignments, &occupancy)
        .map_err(|reason| PlanningError::InternalError(format!("解校验失败: {}", reason)))?;
    Ok(occupancy)
}

struct RootResult {
    root_start: u32,
    best: Option<(i64, Vec<u32>)>,
    nodes: u64,
}

// ==========================================
// SearchContext - 各线程共享的只读数据 + 全局最优
// ==========================================
struct SearchContext<'m> {
    model: &'m ScheduleModel,
    order: Vec<usize>,          // 分支位置 → 变量下标
    weights: Vec<i64>,          // 按分支顺序（降序）
    durations: Vec<u32>,        // 按分支顺序，取工期下界
    tied_with_prev: Vec<bool>,  // 与前一位置可互换（同权重同域）
    min_duration: u32,          // 下界计算用的最短工期
    deadline: Instant,
    global_best: AtomicI64,
    timed_out: AtomicBool,
}

impl<'m> SearchContext<'m> {
    fn new(model: &'m ScheduleModel, deadline: Instant) -> Self {
        let vars = model.vars();
        let mut order: Vec<usize> = (0..vars.len()).collect();
        order.sort_by(|&a, &b| {
            vars[b]
                .weight
                .cmp(&vars[a].weight)
                .then(vars[a].fleet_index.cmp(&vars[b].fleet_index))
        });

        let weights = order.iter().map(|&i| vars[i].weight).collect();
        let durations: Vec<u32> = order.iter().map(|&i| vars[i].duration.lo).collect();
        let min_duration = durations.iter().copied().min().unwrap_or(1).max(1);
        let tied_with_prev = order
            .iter()
            .enumerate()
            .map(|(k, &i)| {
                k > 0 && {
                    let prev = &vars[order[k - 1]];
                    let cur = &vars[i];
                    prev.weight == cur.weight
                        && prev.start_day == cur.start_day
                        && prev.duration == cur.duration
                }
            })
            .collect();

        Self {
            model,
            order,
            weights,
            durations,
            tied_with_prev,
            min_duration,
            deadline,
            global_best: AtomicI64::new(i64::MAX),
            timed_out: AtomicBool::new(false),
        }
    }

    fn len(&self) -> usize {
        self.order.len()
    }

    fn start_upper(&self) -> u32 {
        self.model.horizon_days()
    }

    fn deadline_reached(&self) -> bool {
        if self.timed_out.load(Ordering::Relaxed) {
            return true;
        }
        if Instant::now() >= self.deadline {
            self.timed_out.store(true, Ordering::SeqCst);
            return true;
        }
        false
    }

    /// 沿分支顺序取最早可行开工日
    fn greedy(&self) -> Option<(i64, Vec<u32>)> {
        let mut state = LoadState::new(self.model);
        let mut starts = Vec::with_capacity(self.len());
        let mut cost = 0i64;

        for k in 0..self.len() {
            let lo = if self.tied_with_prev[k] { starts[k - 1] } else { 0 };
            let duration = self.durations[k];
            let start = (lo..self.start_upper()).find(|&s| state.fits(s, duration))?;
            state.place(start, duration);
            starts.push(start);
            cost += self.weights[k] * i64::from(start);
        }
        Some((cost, starts))
    }

    /// 分支顺序的开工日 → 机队顺序的取值
    fn to_fleet_order(&self, starts: &[u32]) -> Vec<Assignment> {
        let mut assignments = vec![
            Assignment {
                start_day: 0,
                duration: 0,
            };
            self.len()
        ];
        for (k, &var_idx) in self.order.iter().enumerate() {
            let fleet_index = self.model.vars()[var_idx].fleet_index;
            assignments[fleet_index] = Assignment {
                start_day: starts[k],
                duration: self.durations[k],
            };
        }
        assignments
    }
}

// ==========================================
// LoadState - 每日在修数
// ==========================================
struct LoadState {
    load: Vec<u32>,
    horizon: u32,
    capacity: u32,
}

impl LoadState {
    fn new(model: &ScheduleModel) -> Self {
        Self {
            load: vec![0; model.horizon_days() as usize],
            horizon: model.horizon_days(),
            capacity: model.crew_capacity(),
        }
    }

    fn days(&self, start: u32, duration: u32) -> std::ops::Range<usize> {
        let end = start.saturating_add(duration).min(self.horizon);
        start as usize..end as usize
    }

    fn fits(&self, start: u32, duration: u32) -> bool {
        self.load[self.days(start, duration)]
            .iter()
            .all(|&n| n < self.capacity)
    }

    fn place(&mut self, start: u32, duration: u32) {
        let range = self.days(start, duration);
        for n in &mut self.load[range] {
            *n += 1;
        }
    }

    fn remove(&mut self, start: u32, duration: u32) {
        let range = self.days(start, duration);
        for n in &mut self.load[range] {
            *n -= 1;
        }
    }

    /// 剩余飞机的目标下界
    ///
    /// cap(d) 为开工日不晚于 d 的剩余飞机数上限，取以下两者较小值:
    /// - [0, d] 内空余班组位数（每架需开工日当天一个空位）
    /// - [0, min(d+L, H)) 内空余班组日数 / min(L, H-d)
    ///   （开工日 s <= d 的任务在该区间内至少占用 min(L, H-d) 个班组日）
    ///
    /// 开工日排序后第 j 架不早于 min{d : cap(d) >= j}，权重降序依次配给。
    /// 容量不足以容纳全部剩余飞机时返回 None（该节点不可行）
    fn lower_bound(&self, remaining_weights: &[i64], min_duration: u32) -> Option<i64> {
        let horizon = self.horizon as usize;
        let duration = min_duration.max(1) as usize;

        // prefix[x] = [0, x) 内空余班组日数
        let mut prefix = vec![0u64; horizon + 1];
        for (day, &used) in self.load.iter().enumerate() {
            prefix[day + 1] = prefix[day] + u64::from(self.capacity.saturating_sub(used));
        }

        let mut bound = 0i64;
        let mut placed = 0usize;
        for day in 0..horizon {
            if placed == remaining_weights.len() {
                break;
            }
            let by_start = prefix[day + 1];
            let span = duration.min(horizon - day);
            let by_days = prefix[(day + duration).min(horizon)] / span as u64;
            let cap = by_start.min(by_days).min(remaining_weights.len() as u64) as usize;
            while placed < cap {
                bound += remaining_weights[placed] * day as i64;
                placed += 1;
            }
        }

        if placed == remaining_weights.len() {
            Some(bound)
        } else {
            None
        }
    }
}

// ==========================================
// Worker - 单棵子树的分支定界
// ==========================================
struct Worker<'c, 'm> {
    ctx: &'c SearchContext<'m>,
    state: LoadState,
    starts: Vec<u32>,
    best: Option<(i64, Vec<u32>)>,
    nodes: u64,
}

impl<'c, 'm> Worker<'c, 'm> {
    fn new(ctx: &'c SearchContext<'m>) -> Self {
        Self {
            ctx,
            state: LoadState::new(ctx.model),
            starts: vec![0; ctx.len()],
            best: None,
            nodes: 0,
        }
    }

    /// 剪枝判定
    ///
    /// - 严格劣于全局最优 → 剪
    /// - 不优于本子树已知最好解 → 剪（子树内只接受严格改进）
    fn pruned(&self, bound: i64) -> bool {
        if bound > self.ctx.global_best.load(Ordering::Relaxed) {
            return true;
        }
        matches!(&self.best, Some((cost, _)) if bound >= *cost)
    }

    fn search_root(&mut self, root_start: u32) {
        if self.ctx.deadline_reached() {
            return;
        }
        self.branch(0, 0, root_start..=root_start);
    }

    fn dfs(&mut self, k: usize, cost: i64) {
        if k == self.ctx.len() {
            self.record(cost);
            return;
        }

        self.nodes += 1;
        if self.nodes % DEADLINE_CHECK_INTERVAL == 0 && self.ctx.deadline_reached() {
            return;
        }
        if self.ctx.timed_out.load(Ordering::Relaxed) {
            return;
        }

        let lo = if self.ctx.tied_with_prev[k] {
            self.starts[k - 1]
        } else {
            0
        };
        self.branch(k, cost, lo..=self.ctx.start_upper() - 1);
    }

    fn branch(&mut self, k: usize, cost: i64, candidates: std::ops::RangeInclusive<u32>) {
        let weight = self.ctx.weights[k];
        let duration = self.ctx.durations[k];

        for start in candidates {
            let next_cost = cost + weight * i64::from(start);
            // 开工日递增时 next_cost 单调不减
            if self.pruned(next_cost) {
                break;
            }
            if !self.state.fits(start, duration) {
                continue;
            }

            self.state.place(start, duration);
            let bound = self
                .state
                .lower_bound(&self.ctx.weights[k + 1..], self.ctx.min_duration)
                .map(|lb| next_cost + lb);
            if let Some(bound) = bound {
                if !self.pruned(bound) {
                    self.starts[k] = start;
                    self.dfs(k + 1, next_cost);
                }
            }
            self.state.remove(start, duration);

            if self.ctx.timed_out.load(Ordering::Relaxed) {
                return;
            }
        }
    }

    fn record(&mut self, cost: i64) {
        let improved = match &self.best {
            Some((best, _)) => cost < *best,
            None => true,
        };
        if improved {
            self.best = Some((cost, self.starts.clone()));
            self.ctx.global_best.fetch_min(cost, Ordering::SeqCst);
        }
    }
}
