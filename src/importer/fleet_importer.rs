// ==========================================
// 机队维修排程系统 - 机队/库存 CSV 导入
// ==========================================
// 流程: 解析 CSV → 字段映射与类型转换 → 校验 → 整表替换落库
// 规则:
// 1) 派生列 (hours_since_last_maintenance / hours_until_due) 一律由
//    flight_hours 与 maint_interval_hours 重算；文件中的值仅用于比对告警
// 2) 任一行校验失败即整体失败（带行号），不做部分导入
// ==========================================

use crate::domain::aircraft::Aircraft;
use crate::domain::part::Part;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::file_parser::{CsvParser, FileParser};
use crate::repository::fleet_repo::FleetRepository;
use crate::repository::parts_repo::PartsInventoryRepository;
use chrono::NaiveDate;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::str::FromStr;
use tracing::{info, instrument, warn};

// ==========================================
// 字段名常量
// ==========================================
pub mod columns {
    pub const AIRCRAFT_ID: &str = "aircraft_id";
    pub const FLIGHT_HOURS: &str = "flight_hours";
    pub const MAINT_INTERVAL_HOURS: &str = "maint_interval_hours";
    pub const LAST_MAINTENANCE_DATE: &str = "last_maintenance_date";
    pub const HOURS_SINCE_LAST_MAINTENANCE: &str = "hours_since_last_maintenance";
    pub const HOURS_UNTIL_DUE: &str = "hours_until_due";

    pub const PART_ID: &str = "part_id";
    pub const DESCRIPTION: &str = "description";
    pub const LEAD_TIME_DAYS: &str = "lead_time_days";
    pub const UNIT_COST: &str = "unit_cost";
    pub const QUANTITY_ON_HAND: &str = "quantity_on_hand";
}

// ==========================================
// ImportSummary - 导入结果摘要
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSummary {
    pub total_rows: usize,
    pub imported: usize,
    pub recomputed_rows: usize, // 派生列与文件不一致、已重算的行数
}

// ==========================================
// 行级字段读取
// ==========================================
fn required<'a>(
    row: usize,
    record: &'a HashMap<String, String>,
    field: &str,
) -> ImportResult<&'a str> {
    match record.get(field).map(|s| s.as_str()) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ImportError::MissingField {
            row,
            field: field.to_string(),
        }),
    }
}

fn optional<'a>(record: &'a HashMap<String, String>, field: &str) -> Option<&'a str> {
    record
        .get(field)
        .map(|s| s.as_str())
        .filter(|v| !v.is_empty())
}

fn parse_number<T>(row: usize, field: &str, raw: &str) -> ImportResult<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse::<T>().map_err(|e| ImportError::TypeConversionError {
        row,
        field: field.to_string(),
        message: format!("'{}': {}", raw, e),
    })
}

/// 整数字段兼容 "1234.0" 写法
fn parse_whole(row: usize, field: &str, raw: &str) -> ImportResult<i64> {
    if let Ok(v) = raw.parse::<i64>() {
        return Ok(v);
    }
    let f: f64 = parse_number(row, field, raw)?;
    if f.is_finite() && f.fract() == 0.0 {
        Ok(f as i64)
    } else {
        Err(ImportError::TypeConversionError {
            row,
            field: field.to_string(),
            message: format!("'{}' 不是整数", raw),
        })
    }
}

fn range_error(row: usize, field: &str, value: f64, message: &str) -> ImportError {
    ImportError::ValueRangeError {
        row,
        field: field.to_string(),
        value,
        message: message.to_string(),
    }
}

// ==========================================
// FleetImporter - 导入器
// ==========================================
pub struct FleetImporter<P: FileParser> {
    parser: P,
}

impl FleetImporter<CsvParser> {
    pub fn csv() -> Self {
        Self { parser: CsvParser }
    }
}

impl<P: FileParser> FleetImporter<P> {
    pub fn new(parser: P) -> Self {
        Self { parser }
    }

    /// 解析机队文件
    pub fn parse_fleet(&self, path: &Path) -> ImportResult<(Vec<Aircraft>, ImportSummary)> {
        let records = self.parser.parse_to_raw_records(path)?;
        let total_rows = records.len();
        let mut seen = HashSet::new();
        let mut fleet = Vec::with_capacity(total_rows);
        let mut recomputed_rows = 0;

        for (row, record) in &records {
            let (aircraft, recomputed) = Self::map_aircraft(*row, record)?;
            if !seen.insert(aircraft.aircraft_id.clone()) {
                return Err(ImportError::DuplicateKey {
                    row: *row,
                    id: aircraft.aircraft_id,
                });
            }
            if recomputed {
                recomputed_rows += 1;
            }
            fleet.push(aircraft);
        }

        let imported = fleet.len();
        Ok((
            fleet,
            ImportSummary {
                total_rows,
                imported,
                recomputed_rows,
            },
        ))
    }

    fn map_aircraft(
        row: usize,
        record: &HashMap<String, String>,
    ) -> ImportResult<(Aircraft, bool)> {
        use columns::*;

        let aircraft_id = required(row, record, AIRCRAFT_ID)?.to_string();
        let flight_hours = parse_whole(row, FLIGHT_HOURS, required(row, record, FLIGHT_HOURS)?)?;
        let interval = parse_whole(
            row,
            MAINT_INTERVAL_HOURS,
            required(row, record, MAINT_INTERVAL_HOURS)?,
        )?;

        if flight_hours < 0 {
            return Err(range_error(row, FLIGHT_HOURS, flight_hours as f64, "不能为负"));
        }
        if interval <= 0 {
            return Err(range_error(row, MAINT_INTERVAL_HOURS, interval as f64, "必须大于 0"));
        }

        let last_maintenance_date = match optional(record, LAST_MAINTENANCE_DATE) {
            Some(raw) => Some(NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
                ImportError::DateFormatError {
                    row,
                    field: LAST_MAINTENANCE_DATE.to_string(),
                    value: raw.to_string(),
                }
            })?),
            None => None,
        };

        let aircraft = Aircraft::from_flight_hours(
            &aircraft_id,
            flight_hours,
            interval,
            last_maintenance_date,
        )
        .ok_or_else(|| range_error(row, MAINT_INTERVAL_HOURS, interval as f64, "必须大于 0"))?;

        // 文件中的派生列仅作比对
        let mut recomputed = false;
        for (field, derived) in [
            (HOURS_SINCE_LAST_MAINTENANCE, aircraft.hours_since_last_maintenance),
            (HOURS_UNTIL_DUE, aircraft.hours_until_due),
        ] {
            if let Some(raw) = optional(record, field) {
                let given = parse_whole(row, field, raw)?;
                if given != derived {
                    warn!(
                        row,
                        field,
                        given,
                        derived,
                        aircraft_id = %aircraft_id,
                        "派生列与飞行小时不一致，已重算"
                    );
                    recomputed = true;
                }
            }
        }

        Ok((aircraft, recomputed))
    }

    /// 解析库存文件
    pub fn parse_parts(&self, path: &Path) -> ImportResult<(Vec<Part>, ImportSummary)> {
        let records = self.parser.parse_to_raw_records(path)?;
        let total_rows = records.len();
        let mut seen = HashSet::new();
        let mut parts = Vec::with_capacity(total_rows);

        for (row, record) in &records {
            let part = Self::map_part(*row, record)?;
            if !seen.insert(part.part_id.clone()) {
                return Err(ImportError::DuplicateKey {
                    row: *row,
                    id: part.part_id,
                });
            }
            parts.push(part);
        }

        let imported = parts.len();
        Ok((
            parts,
            ImportSummary {
                total_rows,
                imported,
                recomputed_rows: 0,
            },
        ))
    }

    fn map_part(row: usize, record: &HashMap<String, String>) -> ImportResult<Part> {
        use columns::*;

        let part_id = required(row, record, PART_ID)?.to_string();
        let description = optional(record, DESCRIPTION).unwrap_or_default().to_string();
        let lead_time_days =
            parse_whole(row, LEAD_TIME_DAYS, required(row, record, LEAD_TIME_DAYS)?)?;
        let unit_cost: f64 = parse_number(row, UNIT_COST, required(row, record, UNIT_COST)?)?;
        let quantity = parse_whole(row, QUANTITY_ON_HAND, required(row, record, QUANTITY_ON_HAND)?)?;

        if lead_time_days < 0 {
            return Err(range_error(row, LEAD_TIME_DAYS, lead_time_days as f64, "不能为负"));
        }
        if !unit_cost.is_finite() || unit_cost < 0.0 {
            return Err(range_error(row, UNIT_COST, unit_cost, "不能为负"));
        }
        if quantity < 0 {
            return Err(range_error(row, QUANTITY_ON_HAND, quantity as f64, "不能为负"));
        }
        let quantity_on_hand = u32::try_from(quantity)
            .map_err(|_| range_error(row, QUANTITY_ON_HAND, quantity as f64, "超出上限"))?;

        Ok(Part {
            part_id,
            description,
            lead_time_days,
            unit_cost,
            quantity_on_hand,
        })
    }

    /// 导入机队文件并整表替换 fleet
    #[instrument(skip(self, repo), fields(path = %path.display()))]
    pub fn import_fleet(&self, path: &Path, repo: &FleetRepository) -> ImportResult<ImportSummary> {
        let (fleet, summary) = self.parse_fleet(path)?;
        repo.replace_all(&fleet)?;
        info!(
            imported = summary.imported,
            recomputed = summary.recomputed_rows,
            "机队导入完成"
        );
        Ok(summary)
    }

    /// 导入库存文件并整表替换 parts_inventory
    #[instrument(skip(self, repo), fields(path = %path.display()))]
    pub fn import_parts(
        &self,
        path: &Path,
        repo: &PartsInventoryRepository,
    ) -> ImportResult<ImportSummary> {
        let (parts, summary) = self.parse_parts(path)?;
        repo.replace_all(&parts)?;
        info!(imported = summary.imported, "库存导入完成");
        Ok(summary)
    }
}
