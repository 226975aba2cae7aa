use super::common::{
    attachment_response, found_response, html_response, map_service_error, success_response,
};
use crate::{
    auth::{AuthRouterExt, AuthUser},
    errors::{ApiError, ErrorResponse},
    handlers::AppState,
    i18n::Locale,
    reports::{
        legacy::{redirect_location, LegacyRoute},
        render::{pdf_filename, render_html},
        OutputFormat, ReportDocument, ReportQuery,
    },
    services::{ProjectSummary, ReportTypeSummary},
};
use axum::{
    extract::{Path, Query, RawQuery, State},
    response::Response,
    routing::get,
    Router,
};
use metrics::counter;
use serde::Deserialize;
use tracing::info;
use utoipa::IntoParams;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ProjectsQuery {
    /// veterinary | training | feeding | checkup
    pub report_type: Option<String>,
}

/// Unified report endpoint
#[utoipa::path(
    get,
    path = "/api/v1/reports/{report_type}",
    params(
        ("report_type" = String, Path, description = "veterinary | training | feeding | checkup"),
        ReportQuery,
        ("lang" = Option<String>, Query, description = "en | ar; the last value wins when repeated"),
        ("Accept-Language" = Option<String>, Header, description = "Used when `lang` is absent")
    ),
    responses(
        (status = 200, description = "Report as JSON, HTML or a PDF attachment", body = ReportDocument),
        (status = 400, description = "Invalid parameters", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "No permission for the report, project or export", body = ErrorResponse),
        (status = 404, description = "Unknown report type", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "reports"
)]
pub async fn get_report(
    State(state): State<AppState>,
    Path(segment): Path<String>,
    RawQuery(raw_query): RawQuery,
    locale: Locale,
    user: AuthUser,
) -> Result<Response, ApiError> {
    let service = &state.reports;
    let report_type = service
        .report_type(&segment, locale)
        .map_err(map_service_error)?;
    let query = ReportQuery::from_query_string(raw_query.as_deref());
    let request = service
        .normalize(report_type, &query, locale)
        .map_err(map_service_error)?;

    let document = service
        .generate(&user, report_type, &request, locale)
        .await
        .map_err(map_service_error)?;

    match request.format {
        OutputFormat::Json => Ok(success_response(document)),
        OutputFormat::Html => Ok(html_response(render_html(&document))),
        OutputFormat::Pdf => {
            let bytes = service.render_pdf(&document).map_err(map_service_error)?;
            info!(
                report_type = %report_type,
                bytes = bytes.len(),
                "Exported report as PDF"
            );
            Ok(attachment_response(
                bytes,
                "application/pdf",
                &pdf_filename(&document),
            ))
        }
    }
}

/// Report types the caller can open
#[utoipa::path(
    get,
    path = "/api/v1/reports",
    responses(
        (status = 200, description = "Readable report types", body = Vec<ReportTypeSummary>),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "reports"
)]
pub async fn list_report_types(
    State(state): State<AppState>,
    locale: Locale,
    user: AuthUser,
) -> Result<Response, ApiError> {
    let types = state
        .reports
        .readable_report_types(&user, locale)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(types))
}

/// Projects in the caller's scope for one report type
#[utoipa::path(
    get,
    path = "/api/v1/reports/projects",
    params(ProjectsQuery),
    responses(
        (status = 200, description = "Projects the caller may filter by", body = Vec<ProjectSummary>),
        (status = 400, description = "Missing report_type", body = ErrorResponse),
        (status = 403, description = "No permission for the report", body = ErrorResponse),
        (status = 404, description = "Unknown report type", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "reports"
)]
pub async fn list_report_projects(
    State(state): State<AppState>,
    Query(params): Query<ProjectsQuery>,
    locale: Locale,
    user: AuthUser,
) -> Result<Response, ApiError> {
    let segment = params
        .report_type
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::BadRequest {
            message: "report_type is required".to_string(),
            error_code: Some("MISSING_REPORT_TYPE".to_string()),
        })?;

    let report_type = state
        .reports
        .report_type(segment, locale)
        .map_err(map_service_error)?;
    let projects = state
        .reports
        .projects_in_scope(&user, report_type, locale)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(projects))
}

/// Legacy daily veterinary report, redirected to the unified endpoint
#[utoipa::path(
    get,
    path = "/api/v1/reports/veterinary/daily",
    params(("date" = Option<String>, Query, description = "Day to report, YYYY-MM-DD; defaults to today")),
    responses(
        (status = 302, description = "Redirect to /api/v1/reports/veterinary"),
        (status = 400, description = "Malformed date", body = ErrorResponse)
    ),
    tag = "reports"
)]
pub async fn legacy_veterinary_daily(
    State(state): State<AppState>,
    RawQuery(raw_query): RawQuery,
    locale: Locale,
) -> Result<Response, ApiError> {
    legacy_redirect(&state, LegacyRoute::Daily, raw_query.as_deref(), locale)
}

/// Legacy weekly veterinary report, redirected to the unified endpoint
#[utoipa::path(
    get,
    path = "/api/v1/reports/veterinary/weekly",
    params(
        ("week_start" = Option<String>, Query, description = "First day of the week, YYYY-MM-DD"),
        ("date" = Option<String>, Query, description = "Any day of the Monday-Sunday week to report")
    ),
    responses(
        (status = 302, description = "Redirect to /api/v1/reports/veterinary"),
        (status = 400, description = "Malformed date", body = ErrorResponse)
    ),
    tag = "reports"
)]
pub async fn legacy_veterinary_weekly(
    State(state): State<AppState>,
    RawQuery(raw_query): RawQuery,
    locale: Locale,
) -> Result<Response, ApiError> {
    legacy_redirect(&state, LegacyRoute::Weekly, raw_query.as_deref(), locale)
}

fn legacy_redirect(
    state: &AppState,
    route: LegacyRoute,
    raw_query: Option<&str>,
    locale: Locale,
) -> Result<Response, ApiError> {
    let location = redirect_location(
        route,
        raw_query,
        state.reports.today(),
        &state.config.public_base_path,
    )
    .map_err(|e| map_service_error(e.into_service_error(locale)))?;

    counter!("k9ops_reports.legacy_redirects", 1, "route" => route.to_string());
    info!(route = %route, location = %location, "Redirecting legacy report URL");

    found_response(&location)
}

/// Creates the router for report endpoints
pub fn report_routes() -> Router<AppState> {
    let unified = Router::new()
        .route("/reports", get(list_report_types))
        .route("/reports/projects", get(list_report_projects))
        .route("/reports/:report_type", get(get_report))
        .with_auth();

    // The redirect target enforces authentication
    let legacy = Router::new()
        .route("/reports/veterinary/daily", get(legacy_veterinary_daily))
        .route("/reports/veterinary/weekly", get(legacy_veterinary_weekly));

    unified.merge(legacy)
}
