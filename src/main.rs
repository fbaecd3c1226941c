// ==========================================
// 机队维修排程系统 - 命令行入口
// ==========================================
// 用法:
//   fleet-maint-planner init-db
//   fleet-maint-planner generate [输出目录] [种子] [飞机数] [备件数]
//   fleet-maint-planner ingest <fleet.csv> <parts_inventory.csv>
//   fleet-maint-planner plan [--anchor YYYY-MM-DD] [--write-back]
//   fleet-maint-planner report [近期任务条数]
//   fleet-maint-planner config [key value]
// 数据库: FLEET_PLANNER_DB_PATH 或 用户数据目录/fleet-maint-planner/fleet_maintenance.db
// ==========================================

use anyhow::{anyhow, bail, Context, Result};
use chrono::{Local, NaiveDate};
use fleet_maint_planner::db::default_db_path;
use fleet_maint_planner::report::DEFAULT_UPCOMING_LIMIT;
use fleet_maint_planner::simulation::{
    SampleDataGenerator, DEFAULT_AIRCRAFT_COUNT, DEFAULT_PART_COUNT, DEFAULT_SEED,
};
use fleet_maint_planner::{logging, PlanOptions, PlanningApi, APP_NAME, VERSION};
use std::path::PathBuf;

const USAGE: &str =
    "用法: fleet-maint-planner <init-db|generate|ingest|plan|report|config> [参数...]";

fn main() -> Result<()> {
    logging::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(command) = args.first() else {
        println!("{} v{}", APP_NAME, VERSION);
        println!("{}", USAGE);
        return Ok(());
    };
    let rest = &args[1..];

    let db_path = default_db_path();
    tracing::info!("使用数据库: {}", db_path);

    match command.as_str() {
        "init-db" => {
            PlanningApi::open(&db_path)?;
            println!("数据库已初始化: {}", db_path);
        }
        "generate" => cmd_generate(rest)?,
        "ingest" => cmd_ingest(&db_path, rest)?,
        "plan" => cmd_plan(&db_path, rest)?,
        "report" => cmd_report(&db_path, rest)?,
        "config" => cmd_config(&db_path, rest)?,
        other => bail!("未知命令: {}\n{}", other, USAGE),
    }
    Ok(())
}

fn parse_arg<T: std::str::FromStr>(args: &[String], idx: usize, default: T) -> Result<T> {
    match args.get(idx) {
        Some(raw) => raw
            .parse::<T>()
            .map_err(|_| anyhow!("参数 {} 无法解析: {}", idx + 1, raw)),
        None => Ok(default),
    }
}

fn cmd_generate(args: &[String]) -> Result<()> {
    let out_dir = args
        .first()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("assets"));
    let seed = parse_arg(args, 1, DEFAULT_SEED)?;
    let aircraft = parse_arg(args, 2, DEFAULT_AIRCRAFT_COUNT)?;
    let parts = parse_arg(args, 3, DEFAULT_PART_COUNT)?;

    let today = Local::now().date_naive();
    let (n_aircraft, n_parts) = SampleDataGenerator::new(seed, today)
        .write_csv_files(&out_dir, aircraft, parts)
        .context("生成模拟数据失败")?;
    println!(
        "已生成 {} 架飞机、{} 种备件 → {}",
        n_aircraft,
        n_parts,
        out_dir.display()
    );
    Ok(())
}

fn cmd_ingest(db_path: &str, args: &[String]) -> Result<()> {
    let (Some(fleet_csv), Some(parts_csv)) = (args.first(), args.get(1)) else {
        bail!("用法: fleet-maint-planner ingest <fleet.csv> <parts_inventory.csv>");
    };

    let api = PlanningApi::open(db_path)?;
    let fleet = api.import_fleet_csv(&PathBuf::from(fleet_csv))?;
    let parts = api.import_parts_csv(&PathBuf::from(parts_csv))?;
    println!(
        "导入完成: 飞机 {} 架（派生列重算 {} 行），备件 {} 种",
        fleet.imported, fleet.recomputed_rows, parts.imported
    );
    Ok(())
}

fn cmd_plan(db_path: &str, args: &[String]) -> Result<()> {
    let mut anchor = Local::now().date_naive();
    let mut options = PlanOptions::default();

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--write-back" => options.write_back_inventory = true,
            "--anchor" => {
                let raw = iter.next().ok_or_else(|| anyhow!("--anchor 缺少日期"))?;
                anchor = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                    .with_context(|| format!("锚定日格式错误: {}", raw))?;
            }
            other => bail!("未知参数: {}", other),
        }
    }

    let api = PlanningApi::open(db_path)?;
    let report = api.run_plan(anchor, options)?;
    println!(
        "排程完成: run_id={} status={} objective={} 任务 {} 项（无备件 {} 项）",
        report.run.run_id,
        report.run.solve_status,
        report.run.objective,
        report.run.task_count,
        report.run.unresourced_count
    );
    println!();
    print!(
        "{}",
        api.schedule_summary(DEFAULT_UPCOMING_LIMIT)?.render_text()
    );
    Ok(())
}

fn cmd_report(db_path: &str, args: &[String]) -> Result<()> {
    let limit = parse_arg(args, 0, DEFAULT_UPCOMING_LIMIT)?;
    let api = PlanningApi::open(db_path)?;
    if let Some(run) = api.latest_run()? {
        println!(
            "最近运行: {} ({}) anchor={} status={}",
            run.run_id,
            run.created_at.format("%Y-%m-%d %H:%M:%S"),
            run.anchor_date,
            run.solve_status
        );
    }
    print!("{}", api.schedule_summary(limit)?.render_text());
    Ok(())
}

fn cmd_config(db_path: &str, args: &[String]) -> Result<()> {
    let api = PlanningApi::open(db_path)?;
    match (args.first(), args.get(1)) {
        (Some(key), Some(value)) => {
            let config = api
                .update_config(key, value)
                .with_context(|| format!("配置未写入: {} = {}", key, value))?;
            println!("{} = {}", key, value.trim());
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        (None, None) => {
            let config = api.load_config()?;
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        _ => bail!("用法: fleet-maint-planner config [key value]"),
    }
    Ok(())
}
