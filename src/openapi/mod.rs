use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "K9 Operations API",
        version = "0.3.0",
        description = r#"
# K9 Operations Reporting API

Operational reports over veterinary visits, training sessions, feeding logs
and health checkups.

## Unified reports

`GET /api/v1/reports/{report_type}` serves every report type with the same
parameters: `range_type` (daily, weekly, monthly, custom), `date_from`,
`date_to`, `project_id`, `dog_id`, `employee_id`, `page`, `per_page`,
`show_kpis` and `format` (json, html, pdf).

The old fixed-range URLs `/api/v1/reports/veterinary/daily` and
`/api/v1/reports/veterinary/weekly` answer with a 302 to the unified endpoint.

## Authentication

Report endpoints require a JWT bearer token:

```
Authorization: Bearer <your-jwt-token>
```

## Localization

Pass `?lang=ar` or an `Accept-Language` header for Arabic titles, labels and
error messages.
        "#
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    tags(
        (name = "reports", description = "Operational reports"),
        (name = "Health", description = "Health check endpoints")
    ),
    paths(
        crate::handlers::reports::get_report,
        crate::handlers::reports::list_report_types,
        crate::handlers::reports::list_report_projects,
        crate::handlers::reports::legacy_veterinary_daily,
        crate::handlers::reports::legacy_veterinary_weekly,
    ),
    components(
        schemas(
            crate::reports::ReportDocument,
            crate::reports::ReportType,
            crate::reports::RangeType,
            crate::reports::DateRange,
            crate::reports::OutputFormat,
            crate::reports::AppliedFilters,
            crate::reports::ColumnSpec,
            crate::reports::Pagination,
            crate::reports::Kpi,
            crate::reports::KpiBucket,
            crate::i18n::Locale,
            crate::services::ReportTypeSummary,
            crate::services::ProjectSummary,
            crate::errors::ErrorResponse,
        )
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDocV1;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDocV1::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}
