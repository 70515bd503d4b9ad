//! Tabular export sink: renders a monthly report as a CSV artifact with a
//! summary block followed by a detail table.

use csv::WriterBuilder;

use crate::errors::ServiceError;
use crate::services::reports::MonthlyReport;

/// Column headers of the detail table.
pub const DETAIL_HEADERS: [&str; 12] = [
    "ID",
    "Folio",
    "Part numbers",
    "Pallets",
    "Entry date",
    "Exit date",
    "Days in storage",
    "Entrance cost",
    "Exit cost",
    "Storage cost",
    "Total cost",
    "Status",
];

/// Render a report to CSV bytes.
///
/// The artifact carries a summary block (metric, value) first, then a blank
/// row, then the detail table. Column sums of the detail costs equal the
/// report's aggregate totals.
pub fn render_monthly_report(report: &MonthlyReport) -> Result<Vec<u8>, ServiceError> {
    let mut writer = WriterBuilder::new().flexible(true).from_writer(Vec::new());

    let summary: [[String; 2]; 9] = [
        [
            "Monthly report".to_string(),
            format!("{} {}", report.month_name, report.year),
        ],
        ["Total records".to_string(), report.total_records.to_string()],
        ["Total pallets".to_string(), report.total_pallets.to_string()],
        [
            "Active records".to_string(),
            report.active_records.to_string(),
        ],
        [
            "Completed records".to_string(),
            report.completed_records.to_string(),
        ],
        [
            "Total entrance cost".to_string(),
            report.total_entrance_cost.to_string(),
        ],
        [
            "Total exit cost".to_string(),
            report.total_exit_cost.to_string(),
        ],
        [
            "Total storage cost".to_string(),
            report.total_storage_cost.to_string(),
        ],
        [
            "Total general cost".to_string(),
            report.total_general_cost.to_string(),
        ],
    ];
    for row in &summary {
        writer.write_record(row).map_err(export_error)?;
    }

    writer.write_record([""]).map_err(export_error)?;
    writer.write_record(DETAIL_HEADERS).map_err(export_error)?;

    for record in &report.records {
        writer
            .write_record([
                record.id.to_string(),
                record.folio.to_string(),
                record.part_numbers.clone(),
                record.pallets.to_string(),
                record.entry_date.clone(),
                record.exit_date.clone(),
                record.days_in_storage.to_string(),
                record.entrance_cost.to_string(),
                record.exit_cost.to_string(),
                record.storage_cost.to_string(),
                record.total_cost.to_string(),
                record.status.clone(),
            ])
            .map_err(export_error)?;
    }

    writer
        .into_inner()
        .map_err(|err| ServiceError::ExportError(err.to_string()))
}

fn export_error(err: csv::Error) -> ServiceError {
    ServiceError::ExportError(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::reports::MonthlyReportRecord;
    use csv::ReaderBuilder;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::str::FromStr;

    fn record(
        id: i32,
        entrance: Decimal,
        exit: Decimal,
        storage: Decimal,
    ) -> MonthlyReportRecord {
        MonthlyReportRecord {
            id,
            folio: 100 + id,
            part_numbers: format!("PN-{id}(4)"),
            pallets: 2,
            entry_date: "01-03-2025".to_string(),
            exit_date: "Sin salir".to_string(),
            days_in_storage: 3,
            entrance_cost: entrance,
            exit_cost: exit,
            storage_cost: storage,
            total_cost: entrance + exit + storage,
            status: "Active".to_string(),
        }
    }

    #[test]
    fn detail_column_sums_match_report_totals() {
        let records = vec![
            record(1, dec!(67.50), dec!(0), dec!(266)),
            record(2, dec!(67.50), dec!(67.50), dec!(0)),
        ];
        let report = MonthlyReport {
            year: 2025,
            month: 3,
            month_name: "Marzo".to_string(),
            total_records: 2,
            total_pallets: 4,
            active_records: 2,
            completed_records: 0,
            total_entrance_cost: dec!(135.00),
            total_exit_cost: dec!(67.50),
            total_storage_cost: dec!(266),
            total_general_cost: dec!(468.50),
            records,
        };

        let bytes = render_monthly_report(&report).unwrap();
        let mut reader = ReaderBuilder::new()
            .flexible(true)
            .has_headers(false)
            .from_reader(bytes.as_slice());

        let mut in_details = false;
        let mut entrance_sum = Decimal::ZERO;
        let mut exit_sum = Decimal::ZERO;
        let mut storage_sum = Decimal::ZERO;
        let mut total_sum = Decimal::ZERO;
        for result in reader.records() {
            let row = result.unwrap();
            if row.get(0) == Some("ID") {
                in_details = true;
                continue;
            }
            if !in_details {
                continue;
            }
            entrance_sum += Decimal::from_str(row.get(7).unwrap()).unwrap();
            exit_sum += Decimal::from_str(row.get(8).unwrap()).unwrap();
            storage_sum += Decimal::from_str(row.get(9).unwrap()).unwrap();
            total_sum += Decimal::from_str(row.get(10).unwrap()).unwrap();
        }

        assert_eq!(entrance_sum, report.total_entrance_cost);
        assert_eq!(exit_sum, report.total_exit_cost);
        assert_eq!(storage_sum, report.total_storage_cost);
        assert_eq!(total_sum, report.total_general_cost);
    }

    #[test]
    fn summary_block_precedes_detail_table() {
        let report = MonthlyReport {
            year: 2025,
            month: 1,
            month_name: "Enero".to_string(),
            total_records: 0,
            total_pallets: 0,
            active_records: 0,
            completed_records: 0,
            total_entrance_cost: Decimal::ZERO,
            total_exit_cost: Decimal::ZERO,
            total_storage_cost: Decimal::ZERO,
            total_general_cost: Decimal::ZERO,
            records: Vec::new(),
        };

        let bytes = render_monthly_report(&report).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let summary_pos = text.find("Monthly report").unwrap();
        let header_pos = text.find("ID,Folio").unwrap();
        assert!(summary_pos < header_pos);
        assert!(text.contains("Enero 2025"));
    }
}
