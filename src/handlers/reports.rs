use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
};
use chrono::Utc;
use std::sync::Arc;
use tracing::info;

use crate::{
    errors::ApiError,
    handlers::common::{map_service_error, success_response},
    services::export,
    services::reports::month_name,
    AppState,
};

#[utoipa::path(
    get,
    path = "/api/v1/reports/available",
    responses(
        (status = 200, description = "Periods that have report data, newest first", body = [crate::services::reports::AvailableReport])
    ),
    tag = "reports"
)]
pub async fn available_reports(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let reports = state
        .services
        .reports
        .available_reports()
        .await
        .map_err(map_service_error)?;
    Ok(success_response(reports))
}

#[utoipa::path(
    get,
    path = "/api/v1/reports/monthly/{year}/{month}",
    params(
        ("year" = i32, Path, description = "Report year"),
        ("month" = u32, Path, description = "Report month (1-12)")
    ),
    responses(
        (status = 200, description = "Monthly cost report", body = crate::services::reports::MonthlyReport),
        (status = 400, description = "Period out of range", body = crate::errors::ErrorResponse)
    ),
    tag = "reports"
)]
pub async fn monthly_report(
    State(state): State<Arc<AppState>>,
    Path((year, month)): Path<(i32, u32)>,
) -> Result<impl IntoResponse, ApiError> {
    let now = Utc::now().naive_utc();
    let report = state
        .services
        .reports
        .build_monthly_report(year, month, state.config.report.storage_accrual, now)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(report))
}

#[utoipa::path(
    get,
    path = "/api/v1/reports/monthly/{year}/{month}/download",
    params(
        ("year" = i32, Path, description = "Report year"),
        ("month" = u32, Path, description = "Report month (1-12)")
    ),
    responses(
        (status = 200, description = "CSV file download", body = String, content_type = "text/csv"),
        (status = 400, description = "Period out of range", body = crate::errors::ErrorResponse),
        (status = 404, description = "No data for the period", body = crate::errors::ErrorResponse)
    ),
    tag = "reports"
)]
pub async fn download_monthly_report(
    State(state): State<Arc<AppState>>,
    Path((year, month)): Path<(i32, u32)>,
) -> Result<impl IntoResponse, ApiError> {
    let now = Utc::now().naive_utc();
    let report = state
        .services
        .reports
        .build_monthly_report(year, month, state.config.report.storage_accrual, now)
        .await
        .map_err(map_service_error)?;

    if report.total_records == 0 {
        return Err(ApiError::NotFound(
            "no data found for the report".to_string(),
        ));
    }

    let bytes = export::render_monthly_report(&report).map_err(map_service_error)?;
    let filename = format!("monthly_report_{}_{}.csv", month_name(month), year);
    info!(year, month, size = bytes.len(), "report exported");

    let headers = [
        (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{filename}\""),
        ),
    ];
    Ok((headers, bytes).into_response())
}
