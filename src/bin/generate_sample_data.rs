// ==========================================
// 模拟数据生成工具
// ==========================================
// 用法: generate_sample_data [输出目录] [种子] [飞机数] [备件数]
// 输出: <输出目录>/fleet.csv, <输出目录>/parts_inventory.csv
// ==========================================

use anyhow::{Context, Result};
use chrono::Local;
use fleet_maint_planner::logging;
use fleet_maint_planner::simulation::{
    SampleDataGenerator, DEFAULT_AIRCRAFT_COUNT, DEFAULT_PART_COUNT, DEFAULT_SEED, FLEET_FILE,
    PARTS_FILE,
};
use std::path::PathBuf;

fn main() -> Result<()> {
    logging::init();

    let out_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("assets"));

    let seed = std::env::args()
        .nth(2)
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(DEFAULT_SEED);

    let aircraft_count = std::env::args()
        .nth(3)
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(DEFAULT_AIRCRAFT_COUNT);

    let part_count = std::env::args()
        .nth(4)
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(DEFAULT_PART_COUNT);

    let mut generator = SampleDataGenerator::new(seed, Local::now().date_naive());
    generator
        .write_csv_files(&out_dir, aircraft_count, part_count)
        .with_context(|| format!("写入 {} 失败", out_dir.display()))?;

    println!("Generated: {}", out_dir.join(FLEET_FILE).display());
    println!("Generated: {}", out_dir.join(PARTS_FILE).display());
    Ok(())
}
