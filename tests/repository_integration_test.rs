// ==========================================
// Repository 层集成测试
// ==========================================
// 测试目标: 机队/库存/维修记录/运行记录 的持久化行为
// ==========================================


use chrono::NaiveDate;
use fleet_maint_planner::config::{config_keys, ConfigManager};
use fleet_maint_planner::domain::PlanRun;
use fleet_maint_planner::repository::{
    FleetRepository, MaintenanceRecordRepository, PartsInventoryRepository, PlanRunRepository,
    RepositoryError,
};
use fleet_maint_planner::{logging, MaintenanceTask, SolveStatus, TaskStatus};
use test_helpers::{anchor_date, fleet_from_due, part};

fn task(
    aircraft_id: &str,
    start_day: u32,
    part_id: Option<&str>,
    qty: u32,
    cost: f64,
) -> MaintenanceTask {
    let anchor = anchor_date();
    MaintenanceTask {
        aircraft_id: aircraft_id.to_string(),
        start_day,
        duration: 2,
        schedule_start: anchor + chrono::Duration::days(i64::from(start_day)),
        schedule_end: anchor + chrono::Duration::days(i64::from(start_day) + 2),
        part_id: part_id.map(|p| p.to_string()),
        part_quantity: qty,
        cost,
        status: TaskStatus::Scheduled,
    }
}

#[test]
fn test_fleet_and_parts_round_trip() {
    logging::init_test();
    println!("\n=== 测试: 机队/库存读写 ===");

    let (_temp_file, db_path) = test_helpers::create_test_db().unwrap();
    let conn = test_helpers::shared_conn(&db_path);
    let fleet_repo = FleetRepository::from_connection(conn.clone());
    let parts_repo = PartsInventoryRepository::from_connection(conn);

    let mut fleet = fleet_from_due(&[10, 500, 50]);
    fleet[1].last_maintenance_date = NaiveDate::from_ymd_opt(2025, 11, 20);
    assert_eq!(fleet_repo.replace_all(&fleet).unwrap(), 3);
    assert_eq!(fleet_repo.find_all().unwrap(), fleet);
    assert_eq!(fleet_repo.count().unwrap(), 3);
    assert_eq!(
        fleet_repo.find_by_id("AIR-1002").unwrap().unwrap().hours_until_due,
        500
    );
    assert!(fleet_repo.find_by_id("AIR-9999").unwrap().is_none());

    // 整表替换
    fleet_repo.replace_all(&fleet[..1]).unwrap();
    assert_eq!(fleet_repo.count().unwrap(), 1);

    let parts = vec![part("PART-101", 12, 99.99), part("PART-102", 0, 1500.0)];
    parts_repo.replace_all(&parts).unwrap();
    assert_eq!(parts_repo.find_all().unwrap(), parts);
}

#[test]
fn test_update_quantities_is_all_or_nothing() {
    logging::init_test();

    let (_temp_file, db_path) = test_helpers::create_test_db().unwrap();
    let parts_repo = PartsInventoryRepository::new(&db_path).unwrap();
    parts_repo
        .replace_all(&[part("PART-101", 10, 5.0), part("PART-102", 10, 5.0)])
        .unwrap();

    let mut updated = vec![part("PART-101", 4, 5.0), part("PART-999", 1, 5.0)];
    let err = parts_repo.update_quantities(&updated).unwrap_err();
    assert!(matches!(err, RepositoryError::NotFound { .. }));
    // 回滚: PART-101 未被修改
    assert_eq!(parts_repo.find_all().unwrap()[0].quantity_on_hand, 10);

    updated.truncate(1);
    parts_repo.update_quantities(&updated).unwrap();
    assert_eq!(parts_repo.find_all().unwrap()[0].quantity_on_hand, 4);
}

#[test]
fn test_replace_schedule_transactional() {
    logging::init_test();
    println!("\n=== 测试: 排程整体替换 ===");

    let (_temp_file, db_path) = test_helpers::create_test_db().unwrap();
    let conn = test_helpers::shared_conn(&db_path);
    FleetRepository::from_connection(conn.clone())
        .replace_all(&fleet_from_due(&[10, 500, 50]))
        .unwrap();
    PartsInventoryRepository::from_connection(conn.clone())
        .replace_all(&[part("PART-101", 12, 100.0)])
        .unwrap();
    let repo = MaintenanceRecordRepository::from_connection(conn);

    let first = vec![
        task("AIR-1002", 3, None, 0, 0.0),
        task("AIR-1001", 0, Some("PART-101"), 2, 200.0),
    ];
    repo.replace_schedule("run-1", &first).unwrap();

    let stored = repo.find_all().unwrap();
    assert_eq!(stored.len(), 2);
    // 按开工日期排序
    assert_eq!(stored[0], first[1]);
    assert_eq!(stored[1], first[0]);
    assert_eq!(repo.current_run_id().unwrap().as_deref(), Some("run-1"));

    // 第二批含未知飞机 → 外键失败 → 整体回滚
    let bad = vec![
        task("AIR-1003", 1, None, 0, 0.0),
        task("AIR-4040", 2, None, 0, 0.0),
    ];
    let err = repo.replace_schedule("run-2", &bad).unwrap_err();
    assert!(matches!(err, RepositoryError::ForeignKeyViolation(_)));
    assert_eq!(repo.find_all().unwrap(), vec![first[1].clone(), first[0].clone()]);
    assert_eq!(repo.current_run_id().unwrap().as_deref(), Some("run-1"));

    // 空排程合法
    repo.replace_schedule("run-3", &[]).unwrap();
    assert!(repo.find_all().unwrap().is_empty());
}

#[test]
fn test_plan_run_round_trip() {
    logging::init_test();

    let (_temp_file, db_path) = test_helpers::create_test_db().unwrap();
    let repo = PlanRunRepository::new(&db_path).unwrap();
    assert!(repo.find_latest().unwrap().is_none());

    let created_at = NaiveDate::from_ymd_opt(2026, 3, 2)
        .unwrap()
        .and_hms_opt(8, 30, 0)
        .unwrap();
    let older = PlanRun {
        run_id: "run-a".to_string(),
        created_at,
        anchor_date: anchor_date(),
        objective: 93,
        solve_status: SolveStatus::Optimal,
        task_count: 3,
        unresourced_count: 1,
        config_snapshot_json: Some("{\"horizon_days\":30}".to_string()),
    };
    let newer = PlanRun {
        run_id: "run-b".to_string(),
        created_at: created_at + chrono::Duration::minutes(5),
        solve_status: SolveStatus::Feasible,
        config_snapshot_json: None,
        ..older.clone()
    };
    repo.insert(&older).unwrap();
    repo.insert(&newer).unwrap();

    assert_eq!(repo.find_by_id("run-a").unwrap(), Some(older.clone()));
    assert_eq!(repo.find_latest().unwrap(), Some(newer));

    // 主键重复
    let err = repo.insert(&older).unwrap_err();
    assert!(matches!(err, RepositoryError::UniqueConstraintViolation(_)));
}

#[test]
fn test_config_manager_on_file_db() {
    logging::init_test();

    let (_temp_file, db_path) = test_helpers::create_test_db().unwrap();
    let manager = ConfigManager::new(&db_path).unwrap();
    manager.set_value(config_keys::SEARCH_PARALLELISM, "2").unwrap();

    // 另一连接可见
    let other = ConfigManager::new(&db_path).unwrap();
    assert_eq!(other.load_planning_config().unwrap().search_parallelism, 2);
    assert_eq!(
        other.get_global_config_value(config_keys::SEARCH_PARALLELISM).unwrap().as_deref(),
        Some("2")
    );
}
