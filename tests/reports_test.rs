mod common;

use axum::http::{header, Method, StatusCode};
use chrono::{Datelike, NaiveDate, Utc};
use csv::ReaderBuilder;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::{json, Value};
use std::str::FromStr;

use common::{read_bytes, read_json, TestApp};
use stagetrack_api::config::StorageAccrual;
use stagetrack_api::services::reports::month_name;

fn money(value: &Value) -> Decimal {
    Decimal::from_str(value.as_str().expect("money field is a string")).expect("decimal parses")
}

#[tokio::test]
async fn out_of_range_periods_fail_validation() {
    let app = TestApp::new().await;

    let response = app
        .request(Method::GET, "/api/v1/reports/monthly/2025/13", None)
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = read_json(response).await;
    assert!(body["message"]
        .as_str()
        .unwrap()
        .contains("between 1 and 12"));

    let response = app
        .request(Method::GET, "/api/v1/reports/monthly/1999/5", None)
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = read_json(response).await;
    assert!(body["message"]
        .as_str()
        .unwrap()
        .contains("between 2000 and 2100"));
}

#[tokio::test]
async fn empty_period_yields_zero_shell() {
    let app = TestApp::new().await;

    let response = app
        .request(Method::GET, "/api/v1/reports/monthly/2024/5", None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let report = read_json(response).await;

    assert_eq!(report["total_records"], 0);
    assert_eq!(report["total_pallets"], 0);
    assert_eq!(report["active_records"], 0);
    assert_eq!(report["completed_records"], 0);
    assert_eq!(money(&report["total_general_cost"]), Decimal::ZERO);
    assert!(report["records"].as_array().unwrap().is_empty());
    assert_eq!(report["month_name"], "Mayo");
}

#[tokio::test]
async fn monthly_report_computes_costs_and_formats_dates() {
    let app = TestApp::new().await;
    // Past period, still open: with end-of-period accrual the storage fee is
    // charged once per pallet.
    app.seed_entrance(300, "2024-02-03T08:00:00", 2, &[("X1", 3), ("Y2", 2)])
        .await;

    let response = app
        .request(Method::GET, "/api/v1/reports/monthly/2024/2", None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let report = read_json(response).await;

    assert_eq!(report["year"], 2024);
    assert_eq!(report["month"], 2);
    assert_eq!(report["month_name"], "Febrero");
    assert_eq!(report["total_records"], 1);
    assert_eq!(report["total_pallets"], 2);
    assert_eq!(report["active_records"], 1);
    assert_eq!(report["completed_records"], 0);
    assert_eq!(money(&report["total_entrance_cost"]), dec!(67.50));
    assert_eq!(money(&report["total_exit_cost"]), Decimal::ZERO);
    assert_eq!(money(&report["total_storage_cost"]), dec!(266));
    assert_eq!(money(&report["total_general_cost"]), dec!(333.50));

    let record = &report["records"][0];
    assert_eq!(record["folio"], 300);
    assert_eq!(record["entry_date"], "03-02-2024");
    assert_eq!(record["exit_date"], "Sin salir");
    assert_eq!(record["status"], "Active");
    assert_eq!(record["part_numbers"], "X1(3), Y2(2)");
    assert!(record["days_in_storage"].as_i64().unwrap() > 0);
}

#[tokio::test]
async fn exited_records_pay_exit_fee_but_no_period_storage() {
    let app = TestApp::new().await;
    app.seed_entrance(301, "2024-02-10T09:00:00", 1, &[("Z9", 5)])
        .await;

    let payload = json!({"items": [{"folio": 301, "quantity": 1}]});
    let response = app
        .request(Method::POST, "/api/v1/entrances/exits/batch", Some(payload))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .request(Method::GET, "/api/v1/reports/monthly/2024/2", None)
        .await;
    let report = read_json(response).await;

    assert_eq!(report["completed_records"], 1);
    assert_eq!(report["active_records"], 0);
    assert_eq!(money(&report["total_exit_cost"]), dec!(67.50));
    assert_eq!(money(&report["total_storage_cost"]), Decimal::ZERO);
    let record = &report["records"][0];
    assert_eq!(record["status"], "Completed");
    assert_ne!(record["exit_date"], "Sin salir");
}

#[tokio::test]
async fn accrual_policy_changes_storage_cost() {
    let app = TestApp::new().await;
    app.seed_entrance(300, "2024-02-03T08:00:00", 2, &[("X1", 3)])
        .await;

    let now = NaiveDate::from_ymd_opt(2024, 3, 10)
        .unwrap()
        .and_hms_opt(8, 0, 0)
        .unwrap();

    let end_of_period = app
        .state
        .services
        .reports
        .build_monthly_report(2024, 2, StorageAccrual::EndOfPeriod, now)
        .await
        .unwrap();
    assert_eq!(end_of_period.total_storage_cost, dec!(266));

    let continuous = app
        .state
        .services
        .reports
        .build_monthly_report(2024, 2, StorageAccrual::Continuous, now)
        .await
        .unwrap();
    // 36 days x 133 x 2 pallets
    assert_eq!(continuous.total_storage_cost, dec!(9576));
    assert_eq!(continuous.records[0].days_in_storage, 36);
}

#[tokio::test]
async fn download_is_404_without_data_and_csv_sums_match_with_data() {
    let app = TestApp::new().await;

    let response = app
        .request(Method::GET, "/api/v1/reports/monthly/2024/2/download", None)
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    app.seed_entrance(300, "2024-02-03T08:00:00", 2, &[("X1", 3)])
        .await;
    app.seed_entrance(301, "2024-02-10T09:00:00", 1, &[("Z9", 5)])
        .await;
    let payload = json!({"items": [{"folio": 301, "quantity": 1}]});
    app.request(Method::POST, "/api/v1/entrances/exits/batch", Some(payload))
        .await;

    let response = app
        .request(Method::GET, "/api/v1/reports/monthly/2024/2", None)
        .await;
    let report = read_json(response).await;

    let response = app
        .request(Method::GET, "/api/v1/reports/monthly/2024/2/download", None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(content_type.starts_with("text/csv"));
    let disposition = response
        .headers()
        .get(header::CONTENT_DISPOSITION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.contains("Febrero"));

    let bytes = read_bytes(response).await;
    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .has_headers(false)
        .from_reader(bytes.as_slice());

    let mut in_details = false;
    let mut entrance_sum = Decimal::ZERO;
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
        storage_sum += Decimal::from_str(row.get(9).unwrap()).unwrap();
        total_sum += Decimal::from_str(row.get(10).unwrap()).unwrap();
    }

    assert_eq!(entrance_sum, money(&report["total_entrance_cost"]));
    assert_eq!(storage_sum, money(&report["total_storage_cost"]));
    assert_eq!(total_sum, money(&report["total_general_cost"]));
}

#[tokio::test]
async fn available_reports_lists_periods_with_data() {
    let app = TestApp::new().await;

    let response = app
        .request(Method::GET, "/api/v1/reports/available", None)
        .await;
    let list = read_json(response).await;
    assert!(list.as_array().unwrap().is_empty());

    app.seed_entrance(300, "2024-02-03T08:00:00", 2, &[("X1", 3)])
        .await;

    let response = app
        .request(Method::GET, "/api/v1/reports/available", None)
        .await;
    let list = read_json(response).await;
    let list = list.as_array().unwrap();
    assert_eq!(list.len(), 1);

    // Periods come from record creation time, so today's period shows up.
    let today = Utc::now().naive_utc();
    assert_eq!(list[0]["year"], today.year());
    assert_eq!(list[0]["month"], today.month());
    assert_eq!(list[0]["month_name"], month_name(today.month()));
}
