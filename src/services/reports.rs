use std::sync::Arc;
use std::time::Instant;

use chrono::NaiveDate;
use metrics::{counter, histogram};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};
use utoipa::ToSchema;

use crate::{
    auth::AuthUser,
    db::DbPool,
    entities::project,
    errors::ServiceError,
    i18n::Locale,
    reports::{
        render::{BasicPdfRenderer, PdfRenderer},
        scope::UserGrants,
        sources::{source_for, PageRequest, ReportFilter},
        AppliedFilters, Clock, OutputFormat, Pagination, ProjectScope, ReportDocument, ReportError,
        ReportLimits, ReportQuery, ReportRequest, ReportType, SystemClock,
    },
};

/// A report type the caller can open.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ReportTypeSummary {
    pub report_type: ReportType,
    pub title: String,
    /// Unified endpoint path, relative to the API base
    pub path: String,
}

/// A project the caller may pick when filtering a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ProjectSummary {
    pub id: i32,
    pub code: String,
    pub name: String,
    pub status: String,
}

/// Service for generating the unified operational reports
#[derive(Debug, Clone)]
pub struct ReportService {
    db_pool: Arc<DbPool>,
    clock: Arc<dyn Clock>,
    limits: ReportLimits,
    pdf: Arc<dyn PdfRenderer>,
}

impl ReportService {
    /// Creates a new report service instance
    pub fn new(db_pool: Arc<DbPool>, limits: ReportLimits) -> Self {
        Self {
            db_pool,
            clock: Arc::new(SystemClock),
            limits,
            pdf: Arc::new(BasicPdfRenderer),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_pdf_renderer(mut self, pdf: Arc<dyn PdfRenderer>) -> Self {
        self.pdf = pdf;
        self
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    fn reject(&self, report_type: Option<ReportType>, err: ReportError, locale: Locale) -> ServiceError {
        counter!(
            "k9ops_reports.rejected",
            1,
            "report_type" => report_type.map(|rt| rt.slug()).unwrap_or("unknown"),
            "reason" => err.reason()
        );
        debug!(reason = err.reason(), error = %err, "Report request rejected");
        err.into_service_error(locale)
    }

    /// Validates raw query parameters against today's date and the configured limits.
    pub fn normalize(
        &self,
        report_type: ReportType,
        query: &ReportQuery,
        locale: Locale,
    ) -> Result<ReportRequest, ServiceError> {
        query
            .normalize(self.today(), &self.limits)
            .map_err(|e| self.reject(Some(report_type), e, locale))
    }

    /// Resolves the `:report_type` path segment.
    pub fn report_type(&self, segment: &str, locale: Locale) -> Result<ReportType, ServiceError> {
        ReportType::from_segment(segment).map_err(|e| self.reject(None, e, locale))
    }

    /// Generates one report: scope resolution, row count, page (or export)
    /// fetch and optional KPIs.
    #[instrument(
        skip(self, user, request),
        fields(
            user_id = user.user_id,
            report_type = %report_type,
            range_type = %request.range.range_type,
            format = %request.format
        )
    )]
    pub async fn generate(
        &self,
        user: &AuthUser,
        report_type: ReportType,
        request: &ReportRequest,
        locale: Locale,
    ) -> Result<ReportDocument, ServiceError> {
        let started = Instant::now();
        let db = &*self.db_pool;

        let grants = UserGrants::load(db, user).await?;
        let scope = match grants.resolve_scope(report_type, request.project_id) {
            Ok(scope) => scope,
            Err(err) => {
                warn!(user_id = user.user_id, reason = err.reason(), "Report access denied");
                return Err(self.reject(Some(report_type), err, locale));
            }
        };

        if request.format == OutputFormat::Pdf && !grants.can_export(&scope) {
            warn!(user_id = user.user_id, "Report export denied");
            return Err(self.reject(Some(report_type), ReportError::ExportForbidden, locale));
        }

        let filter = ReportFilter {
            range: request.range,
            scope: scope.clone(),
            dog_id: request.dog_id,
            employee_id: request.employee_id,
        };
        let source = source_for(report_type);

        let total = source
            .count(db, &filter)
            .await
            .map_err(ServiceError::db_error)?;

        let (rows, pagination) = match request.format {
            OutputFormat::Pdf => {
                let rows = source
                    .fetch(
                        db,
                        &filter,
                        PageRequest::All {
                            limit: self.limits.export_max_rows,
                        },
                    )
                    .await
                    .map_err(ServiceError::db_error)?;
                if (rows.len() as u64) < total {
                    warn!(
                        total,
                        exported = rows.len(),
                        "Report export truncated at the row limit"
                    );
                }
                let pagination = Pagination::single_page(total, rows.len() as u64);
                (rows, pagination)
            }
            OutputFormat::Json | OutputFormat::Html => {
                let pagination = Pagination::new(request.page, request.per_page, total);
                let rows = if pagination.offset() >= total {
                    Vec::new()
                } else {
                    source
                        .fetch(
                            db,
                            &filter,
                            PageRequest::Page {
                                page: request.page,
                                per_page: request.per_page,
                            },
                        )
                        .await
                        .map_err(ServiceError::db_error)?
                };
                (rows, pagination)
            }
        };

        let kpis = if request.show_kpis {
            Some(
                source
                    .kpis(db, &filter, locale)
                    .await
                    .map_err(ServiceError::db_error)?,
            )
        } else {
            None
        };

        let document = ReportDocument {
            report_type,
            title: report_type.title(locale).to_string(),
            locale,
            range: request.range,
            filters: AppliedFilters {
                project_id: request.project_id,
                project_ids: scope.project_ids().map(|ids| ids.iter().copied().collect()),
                dog_id: request.dog_id,
                employee_id: request.employee_id,
            },
            columns: source.columns(locale),
            rows,
            pagination,
            kpis,
            generated_at: self.clock.now(),
        };

        let elapsed = started.elapsed();
        counter!(
            "k9ops_reports.generated",
            1,
            "report_type" => report_type.slug(),
            "format" => request.format.to_string()
        );
        histogram!("k9ops_reports.duration", elapsed, "report_type" => report_type.slug());
        info!(
            total,
            returned = document.rows.len(),
            elapsed_ms = elapsed.as_millis() as u64,
            "Report generated"
        );

        Ok(document)
    }

    /// Renders a generated document through the configured PDF backend.
    pub fn render_pdf(&self, document: &ReportDocument) -> Result<Vec<u8>, ServiceError> {
        self.pdf.render(document)
    }

    /// Report types the user can open on at least one project.
    #[instrument(skip(self, user), fields(user_id = user.user_id))]
    pub async fn readable_report_types(
        &self,
        user: &AuthUser,
        locale: Locale,
    ) -> Result<Vec<ReportTypeSummary>, ServiceError> {
        let grants = UserGrants::load(&*self.db_pool, user).await?;
        Ok(grants
            .readable_report_types()
            .into_iter()
            .map(|rt| ReportTypeSummary {
                report_type: rt,
                title: rt.title(locale).to_string(),
                path: format!("/reports/{}", rt.slug()),
            })
            .collect())
    }

    /// Projects the user may pick for a report type, ordered by name.
    #[instrument(skip(self, user), fields(user_id = user.user_id))]
    pub async fn projects_in_scope(
        &self,
        user: &AuthUser,
        report_type: ReportType,
        locale: Locale,
    ) -> Result<Vec<ProjectSummary>, ServiceError> {
        let db = &*self.db_pool;
        let grants = UserGrants::load(db, user).await?;
        let scope = match grants.resolve_scope(report_type, None) {
            Ok(scope) => scope,
            Err(err) => return Err(self.reject(Some(report_type), err, locale)),
        };

        let mut query = project::Entity::find()
            .order_by_asc(project::Column::Name)
            .order_by_asc(project::Column::Id);
        if let ProjectScope::Projects(ids) = &scope {
            query = query.filter(project::Column::Id.is_in(ids.iter().copied()));
        }

        let projects = query.all(db).await.map_err(ServiceError::db_error)?;
        Ok(projects
            .into_iter()
            .map(|p| ProjectSummary {
                id: p.id,
                code: p.code,
                name: p.name,
                status: p.status,
            })
            .collect())
    }
}
