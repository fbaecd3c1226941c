// ==========================================
// 机队维修排程系统 - 模拟数据生成器
// ==========================================
// 用途: 生成机队 / 备件库存样例数据（CSV），用于演示与联调
// 随机源: StdRng + 固定种子，同种子输出完全一致
// ==========================================
// 取值范围（左闭右开）:
//   flight_hours          [500, 5000)
//   maint_interval_hours  [400, 1200)
//   距上次维修天数         [1, 400)
//   lead_time_days        [1, 30)
//   unit_cost             [100, 5000) 保留两位小数
//   quantity_on_hand      [5, 50)
// ==========================================

use crate::domain::aircraft::Aircraft;
use crate::domain::part::Part;
use crate::importer::error::ImportResult;
use chrono::{Duration, NaiveDate};
use csv::Writer;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::path::Path;
use tracing::info;

pub const DEFAULT_SEED: u64 = 42;
pub const DEFAULT_AIRCRAFT_COUNT: usize = 50;
pub const DEFAULT_PART_COUNT: usize = 20;

/// 机队文件名
pub const FLEET_FILE: &str = "fleet.csv";
/// 库存文件名
pub const PARTS_FILE: &str = "parts_inventory.csv";

// ==========================================
// SampleDataGenerator - 模拟数据生成器
// ==========================================
pub struct SampleDataGenerator {
    rng: StdRng,
    today: NaiveDate,
}

impl SampleDataGenerator {
    /// # 参数
    /// - seed: 随机种子
    /// - today: 计算 last_maintenance_date 的基准日
    pub fn new(seed: u64, today: NaiveDate) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            today,
        }
    }

    /// 生成机队（AIR-1001 起连续编号）
    pub fn generate_fleet(&mut self, count: usize) -> Vec<Aircraft> {
        (0..count)
            .filter_map(|i| {
                let flight_hours = self.rng.random_range(500..5000i64);
                let interval = self.rng.random_range(400..1200i64);
                let days_since = self.rng.random_range(1..400i64);
                let last_date = self.today - Duration::days(days_since);
                Aircraft::from_flight_hours(
                    format!("AIR-{}", 1001 + i),
                    flight_hours,
                    interval,
                    Some(last_date),
                )
            })
            .collect()
    }

    /// 生成备件库存（PART-101 起连续编号）
    pub fn generate_parts(&mut self, count: usize) -> Vec<Part> {
        (0..count)
            .map(|i| {
                let lead_time_days = self.rng.random_range(1..30i64);
                let unit_cost = (self.rng.random_range(100.0..5000.0f64) * 100.0).round() / 100.0;
                let quantity_on_hand = self.rng.random_range(5..50u32);
                Part {
                    part_id: format!("PART-{}", 101 + i),
                    description: format!("critical part {}", i),
                    lead_time_days,
                    unit_cost,
                    quantity_on_hand,
                }
            })
            .collect()
    }

    /// 生成并写出两个 CSV 文件
    ///
    /// # 返回
    /// (飞机数, 备件数)
    pub fn write_csv_files(
        &mut self,
        output_dir: &Path,
        aircraft_count: usize,
        part_count: usize,
    ) -> ImportResult<(usize, usize)> {
        std::fs::create_dir_all(output_dir)?;

        let fleet = self.generate_fleet(aircraft_count);
        let parts = self.generate_parts(part_count);

        write_records(&output_dir.join(FLEET_FILE), &fleet)?;
        write_records(&output_dir.join(PARTS_FILE), &parts)?;

        info!(
            dir = %output_dir.display(),
            aircraft = fleet.len(),
            parts = parts.len(),
            "模拟数据已生成"
        );
        Ok((fleet.len(), parts.len()))
    }
}

fn write_records<T: Serialize>(path: &Path, records: &[T]) -> ImportResult<()> {
    let mut writer = Writer::from_path(path)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::importer::fleet_importer::FleetImporter;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 6, 1).unwrap()
    }

    #[test]
    fn test_generated_values_within_ranges() {
        let mut generator = SampleDataGenerator::new(DEFAULT_SEED, today());
        let fleet = generator.generate_fleet(200);
        assert_eq!(fleet.len(), 200);
        assert_eq!(fleet[0].aircraft_id, "AIR-1001");
        for a in &fleet {
            assert!((500..5000).contains(&a.flight_hours));
            assert!((400..1200).contains(&a.maint_interval_hours));
            assert!(a.has_consistent_metrics());
            let days = (today() - a.last_maintenance_date.unwrap()).num_days();
            assert!((1..400).contains(&days));
        }

        let parts = generator.generate_parts(100);
        assert_eq!(parts[0].part_id, "PART-101");
        for p in &parts {
            assert!((1..30).contains(&p.lead_time_days));
            assert!(p.unit_cost >= 100.0 && p.unit_cost <= 5000.0);
            assert_eq!((p.unit_cost * 100.0).round() / 100.0, p.unit_cost);
            assert!((5..50).contains(&p.quantity_on_hand));
        }
    }

    #[test]
    fn test_same_seed_same_data() {
        let a = SampleDataGenerator::new(7, today()).generate_fleet(10);
        let b = SampleDataGenerator::new(7, today()).generate_fleet(10);
        let c = SampleDataGenerator::new(8, today()).generate_fleet(10);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_written_files_import_cleanly() {
        let dir = tempfile::tempdir().unwrap();
        let mut generator = SampleDataGenerator::new(DEFAULT_SEED, today());
        let (n_aircraft, n_parts) = generator.write_csv_files(dir.path(), 12, 5).unwrap();
        assert_eq!((n_aircraft, n_parts), (12, 5));

        let importer = FleetImporter::csv();
        let (fleet, summary) = importer.parse_fleet(&dir.path().join(FLEET_FILE)).unwrap();
        assert_eq!(fleet.len(), 12);
        assert_eq!(summary.recomputed_rows, 0);
        let (parts, _) = importer.parse_parts(&dir.path().join(PARTS_FILE)).unwrap();
        assert_eq!(parts.len(), 5);
    }
}
