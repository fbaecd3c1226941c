// ==========================================
// 排程流水线场景测试
// ==========================================
// 测试目标: 建模 → 搜索 → 备件分配 → 输出 的端到端行为
// 覆盖: 典型场景 A-E + 持久化流程
// ==========================================


use fleet_maint_planner::api::{PlanOptions, PlanningApi};
use fleet_maint_planner::config::config_keys;
use fleet_maint_planner::engine::PlanningError;
use fleet_maint_planner::repository::{
    FleetRepository, MaintenanceRecordRepository, PartsInventoryRepository,
};
use fleet_maint_planner::{
    logging, PlanStage, PlanningConfig, PlanningOrchestrator, SolveStatus, TaskStatus,
};
use std::collections::HashSet;
use test_helpers::{anchor_date, config, fleet_from_due, part};

/// 断言每日在修飞机数不超过产能
fn assert_capacity_respected(
    tasks: &[fleet_maint_planner::MaintenanceTask],
    horizon: u32,
    capacity: u32,
) {
    for day in 0..horizon {
        let load = tasks.iter().filter(|t| t.occupies_day(day)).count() as u32;
        assert!(load <= capacity, "day {} load {} > capacity {}", day, load, capacity);
    }
}

// ==========================================
// 场景 A: 紧迫飞机优先
// ==========================================
#[test]
fn test_scenario_a_most_urgent_first() {
    logging::init_test();
    println!("\n=== 场景 A: horizon=30, capacity=2, due=[10, 500, 50] ===");

    let fleet = fleet_from_due(&[10, 500, 50]);
    let result = PlanningOrchestrator::new(config(30, 2))
        .plan(&fleet, &[], anchor_date())
        .expect("场景 A 应可行");

    let starts: Vec<u32> = result.tasks.iter().map(|t| t.start_day).collect();
    println!("开工日: {:?}, 目标值: {}", starts, result.objective);

    // 最紧迫的飞机开工日最小
    assert!(starts[0] <= starts[1]);
    assert!(starts[0] <= starts[2]);
    assert_eq!(starts[0], 0);
    assert_eq!(starts[2], 0);
    // 两个机位被占用后，最不紧迫的飞机顺延一天 → 目标值 = 1 × 1
    assert_eq!(starts[1], 1);
    assert_eq!(result.objective, 1);
    assert_eq!(result.solve_status, SolveStatus::Optimal);
    assert_capacity_respected(&result.tasks, 30, 2);
}

// ==========================================
// 场景 B: 单机位满排
// ==========================================
#[test]
fn test_scenario_b_single_crew_one_per_day() {
    logging::init_test();
    println!("\n=== 场景 B: horizon=5, capacity=1, 5 架飞机 ===");

    let fleet = fleet_from_due(&[300, 120, 800, 45, 600]);
    let result = PlanningOrchestrator::new(config(5, 1))
        .plan(&fleet, &[], anchor_date())
        .expect("场景 B 应可行");

    for day in 0..5 {
        let load = result.tasks.iter().filter(|t| t.occupies_day(day)).count();
        assert_eq!(load, 1, "day {} 应恰好一架在修", day);
    }
    assert!(result.tasks.iter().all(|t| t.duration == 1));

    // 开工顺序与紧迫度一致: due 45 → 120 → 300 → 600 → 800
    let starts: Vec<u32> = result.tasks.iter().map(|t| t.start_day).collect();
    assert_eq!(starts, vec![2, 1, 4, 0, 3]);
}

// ==========================================
// 场景 C: 无库存
// ==========================================
#[test]
fn test_scenario_c_empty_inventory_unresourced() {
    logging::init_test();
    println!("\n=== 场景 C: 0 种备件 ===");

    let fleet = fleet_from_due(&[10, 200, 400, 600]);
    let result = PlanningOrchestrator::new(config(10, 2))
        .plan(&fleet, &[], anchor_date())
        .unwrap();

    assert_eq!(result.tasks.len(), 4);
    for task in &result.tasks {
        assert!(task.part_id.is_none());
        assert_eq!(task.part_quantity, 0);
        assert_eq!(task.cost, 0.0);
        assert_eq!(task.status, TaskStatus::Scheduled);
    }
    assert_eq!(result.unresourced_count(), 4);
    assert_eq!(result.stage, PlanStage::Emitted);
}

// ==========================================
// 场景 D: 配置不可行
// ==========================================
#[test]
fn test_scenario_d_config_error_before_solving() {
    logging::init_test();
    println!("\n=== 场景 D: horizon=2, min_duration=3 ===");

    let bad = PlanningConfig {
        horizon_days: 2,
        min_duration_days: 3,
        max_duration_days: 3,
        ..config(2, 1)
    };
    let err = PlanningOrchestrator::new(bad)
        .plan(&fleet_from_due(&[10]), &[], anchor_date())
        .unwrap_err();
    println!("错误: {}", err);
    assert!(matches!(err, PlanningError::ConfigError { .. }));

    // 最短 > 最长 同样在求解前失败
    let inverted = PlanningConfig {
        min_duration_days: 3,
        max_duration_days: 2,
        ..config(10, 1)
    };
    let err = PlanningOrchestrator::new(inverted)
        .plan(&fleet_from_due(&[10]), &[], anchor_date())
        .unwrap_err();
    assert!(err.is_config_error());
}

// ==========================================
// 场景 E: 容量不足
// ==========================================
#[test]
fn test_scenario_e_infeasible_over_capacity() {
    logging::init_test();
    println!("\n=== 场景 E: horizon=3, capacity=1, 10 架飞机 ===");

    let fleet = fleet_from_due(&[10, 20, 30, 40, 50, 60, 70, 80, 90, 100]);
    let err = PlanningOrchestrator::new(config(3, 1))
        .plan(&fleet, &[], anchor_date())
        .unwrap_err();
    println!("错误: {}", err);
    match err {
        PlanningError::InfeasibleSchedule {
            aircraft_count,
            horizon_days,
            crew_capacity,
            ..
        } => {
            assert_eq!(aircraft_count, 10);
            assert_eq!(horizon_days, 3);
            assert_eq!(crew_capacity, 1);
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

// ==========================================
// 备件分配: 稀缺库存 + 可复现
// ==========================================
#[test]
fn test_scarce_inventory_is_reproducible() {
    logging::init_test();

    let fleet = fleet_from_due(&[15, 90, 240, 330, 480, 510, 720, 900]);
    let inventory = vec![part("PART-101", 3, 250.0), part("PART-102", 4, 80.5)];

    let orchestrator = PlanningOrchestrator::new(config(8, 2));
    let a = orchestrator.plan(&fleet, &inventory, anchor_date()).unwrap();
    let b = orchestrator.plan(&fleet, &inventory, anchor_date()).unwrap();

    let strip = |r: &fleet_maint_planner::PlanResult| {
        r.tasks
            .iter()
            .map(|t| (t.start_day, t.part_id.clone(), t.part_quantity))
            .collect::<Vec<_>>()
    };
    assert_eq!(strip(&a), strip(&b));

    // 总库存 7 件，消耗不超过库存
    let consumed: u32 = a.tasks.iter().map(|t| t.part_quantity).sum();
    assert!(consumed <= 7);
    let remaining: u32 = a.remaining_inventory.iter().map(|p| p.quantity_on_hand).sum();
    assert_eq!(consumed + remaining, 7);
    for task in a.tasks.iter().filter(|t| t.is_unresourced()) {
        assert_eq!(task.part_quantity, 0);
        assert_eq!(task.cost, 0.0);
    }
    // 调用方库存不变
    assert_eq!(inventory[0].quantity_on_hand, 3);
    assert_capacity_respected(&a.tasks, 8, 2);
}

// ==========================================
// 持久化流程
// ==========================================
#[test]
fn test_plan_persists_schedule_and_run() {
    logging::init_test();
    println!("\n=== 持久化: 排程 → maintenance_records + plan_run ===");

    let (_temp_file, db_path) = test_helpers::create_test_db().unwrap();
    let conn = test_helpers::shared_conn(&db_path);
    FleetRepository::from_connection(conn.clone())
        .replace_all(&fleet_from_due(&[10, 500, 50, 250]))
        .unwrap();
    PartsInventoryRepository::from_connection(conn.clone())
        .replace_all(&[part("PART-101", 20, 100.0)])
        .unwrap();

    let api = PlanningApi::from_connection(conn).unwrap();
    api.update_config(config_keys::TIME_LIMIT_SECONDS, "10").unwrap();
    // 非法值与未知键均不落库
    assert!(api.update_config(config_keys::CREW_CAPACITY, "0").is_err());
    assert!(api.update_config("planning/horizon", "14").is_err());
    assert_eq!(api.load_config().unwrap().crew_capacity, 2);

    let report = api
        .run_plan(anchor_date(), PlanOptions::default())
        .unwrap();
    assert_eq!(report.run.task_count, 4);
    assert_eq!(report.run.solve_status, SolveStatus::Optimal);

    let latest = api.latest_run().unwrap().expect("应有运行记录");
    assert_eq!(latest.run_id, report.run.run_id);
    let snapshot: PlanningConfig =
        serde_json::from_str(latest.config_snapshot_json.as_deref().unwrap()).unwrap();
    assert_eq!(snapshot.time_limit_seconds, 10.0);

    let summary = api.schedule_summary(10).unwrap();
    assert_eq!(summary.total_tasks, 4);
    assert_eq!(summary.unique_aircraft, 4);
    let ids: HashSet<String> = summary.upcoming.iter().map(|t| t.aircraft_id.clone()).collect();
    assert_eq!(ids.len(), 4);

    // 未开启回写时库存不变
    let parts = PartsInventoryRepository::new(&db_path).unwrap().find_all().unwrap();
    assert_eq!(parts[0].quantity_on_hand, 20);
}

#[test]
fn test_write_back_inventory_and_infeasible_keeps_previous_schedule() {
    logging::init_test();

    let (_temp_file, db_path) = test_helpers::create_test_db().unwrap();
    let conn = test_helpers::shared_conn(&db_path);
    FleetRepository::from_connection(conn.clone())
        .replace_all(&fleet_from_due(&[10, 20, 30]))
        .unwrap();
    PartsInventoryRepository::from_connection(conn.clone())
        .replace_all(&[part("PART-101", 9, 10.0)])
        .unwrap();

    let api = PlanningApi::from_connection(conn).unwrap();
    let report = api
        .run_plan(
            anchor_date(),
            PlanOptions {
                write_back_inventory: true,
            },
        )
        .unwrap();
    let consumed: u32 = report.result.tasks.iter().map(|t| t.part_quantity).sum();
    let parts = PartsInventoryRepository::new(&db_path).unwrap().find_all().unwrap();
    assert_eq!(parts[0].quantity_on_hand, 9 - consumed);

    // 将产能/视界收紧到不可行：失败且不覆盖已有排程
    api.config_manager().set_value(config_keys::HORIZON_DAYS, "1").unwrap();
    api.config_manager().set_value(config_keys::MAX_DURATION_DAYS, "1").unwrap();
    api.config_manager().set_value(config_keys::CREW_CAPACITY, "1").unwrap();
    let err = api
        .run_plan(anchor_date(), PlanOptions::default())
        .unwrap_err();
    assert!(err.is_infeasible());

    let summary = api.schedule_summary(10).unwrap();
    assert_eq!(summary.total_tasks, 3);
    assert_eq!(
        api.latest_run().unwrap().unwrap().run_id,
        report.run.run_id
    );
}

#[test]
fn test_failed_write_rolls_back_whole_run() {
    logging::init_test();
    println!("\n=== 持久化: 任一写入失败则整体回滚 ===");

    let (_temp_file, db_path) = test_helpers::create_test_db().unwrap();
    let conn = test_helpers::shared_conn(&db_path);
    FleetRepository::from_connection(conn.clone())
        .replace_all(&fleet_from_due(&[10, 500, 50]))
        .unwrap();
    PartsInventoryRepository::from_connection(conn.clone())
        .replace_all(&[part("PART-101", 9, 10.0)])
        .unwrap();

    let api = PlanningApi::from_connection(conn.clone()).unwrap();
    let first = api.run_plan(anchor_date(), PlanOptions::default()).unwrap();

    // 库存回写被拒绝 → 新排程与运行记录都不应落库
    conn.lock()
        .unwrap()
        .execute_batch(
            "CREATE TRIGGER reject_stock_update BEFORE UPDATE ON parts_inventory \
             BEGIN SELECT RAISE(ABORT, 'stock locked'); END;",
        )
        .unwrap();
    let err = api
        .run_plan(
            anchor_date(),
            PlanOptions {
                write_back_inventory: true,
            },
        )
        .unwrap_err();
    println!("错误: {}", err);

    let maintenance = MaintenanceRecordRepository::from_connection(conn.clone());
    assert_eq!(
        maintenance.current_run_id().unwrap().as_deref(),
        Some(first.run.run_id.as_str())
    );
    assert_eq!(maintenance.find_all().unwrap().len(), 3);
    assert_eq!(api.latest_run().unwrap().unwrap().run_id, first.run.run_id);

    // 运行记录写入被拒绝 → 同样保持上一轮排程
    conn.lock()
        .unwrap()
        .execute_batch(
            "DROP TRIGGER reject_stock_update; \
             CREATE TRIGGER reject_run_insert BEFORE INSERT ON plan_run \
             BEGIN SELECT RAISE(ABORT, 'runs locked'); END;",
        )
        .unwrap();
    assert!(api.run_plan(anchor_date(), PlanOptions::default()).is_err());
    assert_eq!(
        maintenance.current_run_id().unwrap().as_deref(),
        Some(first.run.run_id.as_str())
    );

    let parts = PartsInventoryRepository::from_connection(conn).find_all().unwrap();
    assert_eq!(parts[0].quantity_on_hand, 9);
}
