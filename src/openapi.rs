use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Stagetrack API",
        version = "0.1.0",
        description = r#"
# Staging-Yard Tracking API

Tracks inbound pallet entrances in a warehouse staging yard, processes
partial and full exits against them, and produces monthly cost reports
(entrance fee + storage fee + exit fee) as JSON or CSV downloads.

## Error Handling

Errors use HTTP status codes (400/404/500) with a JSON body carrying a
human-readable message. Validation failures additionally carry a
field -> messages map.
"#
    ),
    tags(
        (name = "entrances", description = "Stage entrance intake, search, and exit processing"),
        (name = "reports", description = "Monthly cost reports and downloads")
    ),
    paths(
        // Entrances
        crate::handlers::entrances::list_entrances,
        crate::handlers::entrances::get_entrance,
        crate::handlers::entrances::search_by_part_number,
        crate::handlers::entrances::search_by_folio,
        crate::handlers::entrances::create_entrance,
        crate::handlers::entrances::update_entrance,
        crate::handlers::entrances::update_exits,
        crate::handlers::entrances::process_exit_batch,
        crate::handlers::entrances::delete_entrance,

        // Reports
        crate::handlers::reports::available_reports,
        crate::handlers::reports::monthly_report,
        crate::handlers::reports::download_monthly_report,
    ),
    components(
        schemas(
            // Entrance types
            crate::services::entrances::EntranceInput,
            crate::services::entrances::PartNumberInput,
            crate::services::entrances::EntranceSummary,
            crate::services::entrances::EntranceDetail,
            crate::services::entrances::PartNumberLine,
            crate::services::entrances::PartNumberLineDetail,
            crate::services::entrances::PartNumberSearchGroup,
            crate::services::entrances::PartNumberFolioEntry,
            crate::services::entrances::FolioSearchResponse,
            crate::services::entrances::FolioGroup,
            crate::services::entrances::FolioEntranceEntry,
            crate::services::entrances::AccumulatedPartNumber,
            crate::handlers::entrances::StageExitsRequest,
            crate::handlers::entrances::ExitBatchRequest,

            // Exit processing types
            crate::services::exits::ExitItem,
            crate::services::exits::ExitOutcome,
            crate::services::exits::ExitBatchOutcome,

            // Report types
            crate::services::reports::MonthlyReport,
            crate::services::reports::MonthlyReportRecord,
            crate::services::reports::AvailableReport,

            // Common types
            crate::handlers::common::MutationResponse,
            crate::errors::ErrorResponse
        )
    )
)]
pub struct ApiDoc;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi())
}
