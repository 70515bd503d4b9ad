use std::sync::Arc;

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect};
use serde::Serialize;
use tracing::{info, instrument};
use utoipa::ToSchema;

use crate::config::StorageAccrual;
use crate::db::DbPool;
use crate::entities::{stage_entrance, stage_entrance_part_number};
use crate::errors::ServiceError;
use crate::services::{costs, load_rate_tables, rate_for};

/// Exit-date placeholder shown while a record has not left the yard.
pub const NO_EXIT_SENTINEL: &str = "Sin salir";
/// Entry-date placeholder for records missing one.
pub const NO_ENTRY_SENTINEL: &str = "N/A";

const DATE_FORMAT: &str = "%d-%m-%Y";

const MONTH_NAMES_ES: [&str; 12] = [
    "Enero",
    "Febrero",
    "Marzo",
    "Abril",
    "Mayo",
    "Junio",
    "Julio",
    "Agosto",
    "Septiembre",
    "Octubre",
    "Noviembre",
    "Diciembre",
];

/// Localized name for a month in `1..=12`.
pub fn month_name(month: u32) -> &'static str {
    MONTH_NAMES_ES[(month - 1) as usize]
}

/// One entrance inside a monthly report, fully resolved: formatted dates,
/// storage duration and the three cost components.
#[derive(Debug, Serialize, ToSchema)]
pub struct MonthlyReportRecord {
    pub id: i32,
    pub folio: i32,
    /// Lines rendered as `"PN(qty), PN(qty)"`.
    pub part_numbers: String,
    pub pallets: i32,
    pub entry_date: String,
    pub exit_date: String,
    pub days_in_storage: i64,
    pub entrance_cost: Decimal,
    pub exit_cost: Decimal,
    pub storage_cost: Decimal,
    pub total_cost: Decimal,
    pub status: String,
}

/// Aggregated monthly report. All fields are resolved at construction;
/// consumers never re-derive values.
#[derive(Debug, Serialize, ToSchema)]
pub struct MonthlyReport {
    pub year: i32,
    pub month: u32,
    pub month_name: String,
    pub total_records: usize,
    pub total_pallets: i64,
    pub active_records: usize,
    pub completed_records: usize,
    pub total_entrance_cost: Decimal,
    pub total_exit_cost: Decimal,
    pub total_storage_cost: Decimal,
    pub total_general_cost: Decimal,
    pub records: Vec<MonthlyReportRecord>,
}

impl MonthlyReport {
    fn empty(year: i32, month: u32) -> Self {
        Self {
            year,
            month,
            month_name: month_name(month).to_string(),
            total_records: 0,
            total_pallets: 0,
            active_records: 0,
            completed_records: 0,
            total_entrance_cost: Decimal::ZERO,
            total_exit_cost: Decimal::ZERO,
            total_storage_cost: Decimal::ZERO,
            total_general_cost: Decimal::ZERO,
            records: Vec::new(),
        }
    }
}

/// A (year, month) pair that has report data.
#[derive(Debug, Serialize, ToSchema)]
pub struct AvailableReport {
    pub year: i32,
    pub month: u32,
    pub month_name: String,
}

/// Builds monthly cost reports over stage entrances.
pub struct ReportService {
    db: Arc<DbPool>,
}

impl ReportService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    /// Build the report for one calendar month.
    ///
    /// Validates the period before touching storage; a month without data
    /// yields a zero-valued shell rather than an error. `now` is the
    /// request's clock snapshot and drives every cost computation.
    #[instrument(skip(self))]
    pub async fn build_monthly_report(
        &self,
        year: i32,
        month: u32,
        policy: StorageAccrual,
        now: NaiveDateTime,
    ) -> Result<MonthlyReport, ServiceError> {
        if !(1..=12).contains(&month) {
            return Err(ServiceError::ValidationError(
                "month must be between 1 and 12".to_string(),
            ));
        }
        if !(2000..=2100).contains(&year) {
            return Err(ServiceError::ValidationError(
                "year must be between 2000 and 2100".to_string(),
            ));
        }

        let period_start = NaiveDate::from_ymd_opt(year, month, 1)
            .ok_or_else(|| {
                ServiceError::ValidationError(format!("invalid period {year}-{month:02}"))
            })?
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let period_end = last_day_of_month(year, month).and_hms_opt(23, 59, 59).unwrap();

        let db = &*self.db;
        let rows = stage_entrance::Entity::find()
            .filter(stage_entrance::Column::EntryDate.is_not_null())
            .filter(stage_entrance::Column::EntryDate.gte(period_start))
            .filter(stage_entrance::Column::EntryDate.lte(period_end))
            .order_by_asc(stage_entrance::Column::EntryDate)
            .find_with_related(stage_entrance_part_number::Entity)
            .all(db)
            .await?;

        if rows.is_empty() {
            return Ok(MonthlyReport::empty(year, month));
        }

        let rates = load_rate_tables(db).await?;

        let mut records = Vec::with_capacity(rows.len());
        let mut total_pallets: i64 = 0;
        let mut active_records = 0;
        let mut completed_records = 0;
        let mut total_entrance_cost = Decimal::ZERO;
        let mut total_exit_cost = Decimal::ZERO;
        let mut total_storage_cost = Decimal::ZERO;

        for (se, lines) in rows {
            let entrance_rate = rate_for(&rates.entrance_fees, se.id_entrance_fee);
            let storage_rate = rate_for(&rates.storage_rates, se.id_storage_cost);

            let days_in_storage = costs::days_in_storage(se.entry_date, se.exit_date, now);
            let entrance_cost = costs::entrance_cost(entrance_rate);
            let exit_cost = costs::exit_cost(entrance_rate, se.exit_date.is_some());
            let storage_cost = costs::storage_cost(
                policy,
                se.entry_date,
                se.exit_date,
                storage_rate,
                se.platforms,
                period_end,
                now,
            );
            let total_cost = costs::total_cost(entrance_cost, exit_cost, storage_cost);

            total_pallets += i64::from(se.platforms);
            if se.exit_date.is_some() {
                completed_records += 1;
            } else {
                active_records += 1;
            }
            total_entrance_cost += entrance_cost;
            total_exit_cost += exit_cost;
            total_storage_cost += storage_cost;

            let part_numbers = lines
                .iter()
                .map(|line| format!("{}({})", line.part_number, line.quantity))
                .collect::<Vec<_>>()
                .join(", ");

            records.push(MonthlyReportRecord {
                id: se.id,
                folio: se.folio.unwrap_or(0),
                part_numbers,
                pallets: se.platforms,
                entry_date: se
                    .entry_date
                    .map(|d| d.format(DATE_FORMAT).to_string())
                    .unwrap_or_else(|| NO_ENTRY_SENTINEL.to_string()),
                exit_date: se
                    .exit_date
                    .map(|d| d.format(DATE_FORMAT).to_string())
                    .unwrap_or_else(|| NO_EXIT_SENTINEL.to_string()),
                days_in_storage,
                entrance_cost,
                exit_cost,
                storage_cost,
                total_cost,
                status: if se.exit_date.is_some() {
                    "Completed".to_string()
                } else {
                    "Active".to_string()
                },
            });
        }

        let report = MonthlyReport {
            year,
            month,
            month_name: month_name(month).to_string(),
            total_records: records.len(),
            total_pallets,
            active_records,
            completed_records,
            total_entrance_cost,
            total_exit_cost,
            total_storage_cost,
            total_general_cost: total_entrance_cost + total_exit_cost + total_storage_cost,
            records,
        };

        info!(
            year,
            month,
            records = report.total_records,
            "monthly report built"
        );
        Ok(report)
    }

    /// Distinct (year, month) pairs that have data, newest first.
    #[instrument(skip(self))]
    pub async fn available_reports(&self) -> Result<Vec<AvailableReport>, ServiceError> {
        let db = &*self.db;
        let stamps: Vec<NaiveDateTime> = stage_entrance::Entity::find()
            .select_only()
            .column(stage_entrance::Column::CreatedAt)
            .into_tuple()
            .all(db)
            .await?;

        let mut pairs: Vec<(i32, u32)> = stamps
            .into_iter()
            .map(|stamp| (stamp.year(), stamp.month()))
            .collect();
        pairs.sort_unstable();
        pairs.dedup();
        pairs.reverse();

        Ok(pairs
            .into_iter()
            .map(|(year, month)| AvailableReport {
                year,
                month,
                month_name: month_name(month).to_string(),
            })
            .collect())
    }
}

fn last_day_of_month(year: i32, month: u32) -> NaiveDate {
    let first_of_next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    first_of_next
        .and_then(|d| d.pred_opt())
        .expect("month in 1..=12 always has a last day")
}
