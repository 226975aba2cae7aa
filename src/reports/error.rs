use axum::http::StatusCode;
use chrono::NaiveDate;
use thiserror::Error;

use crate::errors::ServiceError;
use crate::i18n::Locale;

/// Everything that can go wrong while turning a report request into a
/// report, short of the database failing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReportError {
    #[error("unknown report type '{0}'")]
    UnknownReportType(String),

    #[error("unknown range_type '{0}'")]
    UnknownRangeType(String),

    #[error("unknown format '{0}'")]
    UnknownFormat(String),

    #[error("{field} must be an integer, got '{value}'")]
    InvalidInteger { field: &'static str, value: String },

    #[error("{field} must be a positive integer")]
    NotPositive { field: &'static str },

    #[error("{field} must be a date in YYYY-MM-DD format, got '{value}'")]
    InvalidDate { field: &'static str, value: String },

    #[error("{field} must be a boolean, got '{value}'")]
    InvalidBoolean { field: &'static str, value: String },

    #[error("{field} is required for a custom range")]
    MissingBound { field: &'static str },

    #[error("date_from {from} is after date_to {to}")]
    InvertedRange { from: NaiveDate, to: NaiveDate },

    #[error("custom range spans {days} days, the maximum is {max}")]
    RangeTooLong { days: i64, max: i64 },

    #[error("a daily range covers a single day, got {from}..{to}")]
    DailyMismatch { from: NaiveDate, to: NaiveDate },

    #[error("a weekly range covers exactly 7 days, got {from}..{to}")]
    WeeklyMismatch { from: NaiveDate, to: NaiveDate },

    #[error("a monthly range must stay within one month, got {from}..{to}")]
    MonthlyMismatch { from: NaiveDate, to: NaiveDate },

    #[error("date is outside the supported calendar")]
    DateOutOfRange,

    #[error("no permission to view {report} reports")]
    ReportForbidden { report: &'static str },

    #[error("no access to project {0}")]
    ProjectForbidden(i32),

    #[error("no permission to export reports")]
    ExportForbidden,
}

impl ReportError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::UnknownReportType(_) => StatusCode::NOT_FOUND,
            Self::ReportForbidden { .. } | Self::ProjectForbidden(_) | Self::ExportForbidden => {
                StatusCode::FORBIDDEN
            }
            _ => StatusCode::BAD_REQUEST,
        }
    }

    /// Short machine-readable reason, used for metrics labels.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::UnknownReportType(_) => "unknown_report_type",
            Self::UnknownRangeType(_) => "unknown_range_type",
            Self::UnknownFormat(_) => "unknown_format",
            Self::InvalidInteger { .. } | Self::NotPositive { .. } => "invalid_integer",
            Self::InvalidDate { .. } | Self::DateOutOfRange => "invalid_date",
            Self::InvalidBoolean { .. } => "invalid_boolean",
            Self::MissingBound { .. } => "missing_bound",
            Self::InvertedRange { .. } => "inverted_range",
            Self::RangeTooLong { .. } => "range_too_long",
            Self::DailyMismatch { .. } | Self::WeeklyMismatch { .. } | Self::MonthlyMismatch { .. } => {
                "range_mismatch"
            }
            Self::ReportForbidden { .. } => "report_forbidden",
            Self::ProjectForbidden(_) => "project_forbidden",
            Self::ExportForbidden => "export_forbidden",
        }
    }

    /// User-facing message in the requested locale.
    pub fn localized(&self, locale: Locale) -> String {
        match locale {
            Locale::En => self.to_string(),
            Locale::Ar => self.arabic(),
        }
    }

    fn arabic(&self) -> String {
        match self {
            Self::UnknownReportType(t) => format!("نوع التقرير '{}' غير معروف", t),
            Self::UnknownRangeType(t) => format!("نوع الفترة '{}' غير معروف", t),
            Self::UnknownFormat(f) => format!("صيغة الإخراج '{}' غير معروفة", f),
            Self::InvalidInteger { field, value } => {
                format!("يجب أن يكون {} رقماً صحيحاً، القيمة المرسلة '{}'", field, value)
            }
            Self::NotPositive { field } => format!("يجب أن يكون {} رقماً موجباً", field),
            Self::InvalidDate { field, value } => format!(
                "يجب أن يكون {} تاريخاً بصيغة YYYY-MM-DD، القيمة المرسلة '{}'",
                field, value
            ),
            Self::InvalidBoolean { field, value } => {
                format!("قيمة {} غير صالحة: '{}'", field, value)
            }
            Self::MissingBound { field } => format!("الحقل {} مطلوب للفترة المخصصة", field),
            Self::InvertedRange { from, to } => format!(
                "تاريخ البداية {} بعد تاريخ النهاية {}",
                from, to
            ),
            Self::RangeTooLong { days, max } => format!(
                "الفترة المخصصة تمتد {} يوماً، والحد الأقصى {} يوماً",
                days, max
            ),
            Self::DailyMismatch { from, to } => {
                format!("التقرير اليومي يغطي يوماً واحداً فقط ({} - {})", from, to)
            }
            Self::WeeklyMismatch { from, to } => {
                format!("التقرير الأسبوعي يغطي سبعة أيام بالضبط ({} - {})", from, to)
            }
            Self::MonthlyMismatch { from, to } => {
                format!("التقرير الشهري يجب أن يكون ضمن شهر واحد ({} - {})", from, to)
            }
            Self::DateOutOfRange => "التاريخ خارج النطاق المدعوم".to_string(),
            Self::ReportForbidden { .. } => "ليس لديك صلاحية لعرض هذا التقرير".to_string(),
            Self::ProjectForbidden(id) => format!("ليس لديك صلاحية على المشروع رقم {}", id),
            Self::ExportForbidden => "ليس لديك صلاحية لتصدير التقارير".to_string(),
        }
    }

    /// Converts into the application error, carrying the localized message.
    pub fn into_service_error(self, locale: Locale) -> ServiceError {
        let message = self.localized(locale);
        match self.status_code() {
            StatusCode::NOT_FOUND => ServiceError::NotFound(message),
            StatusCode::FORBIDDEN => ServiceError::Forbidden(message),
            _ => ServiceError::BadRequest(message),
        }
    }
}

impl From<ReportError> for ServiceError {
    fn from(err: ReportError) -> Self {
        err.into_service_error(Locale::default())
    }
}
