use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator};
use utoipa::ToSchema;

use super::error::ReportError;
use crate::auth::consts;
use crate::i18n::{Locale, Msg};

/// The report families served by the unified endpoint.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    AsRefStr,
    EnumString,
    EnumIter,
    ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ReportType {
    Veterinary,
    Training,
    Feeding,
    Checkup,
}

impl ReportType {
    /// Resolves the `:report_type` path segment.
    pub fn from_segment(segment: &str) -> Result<Self, ReportError> {
        segment
            .parse()
            .map_err(|_| ReportError::UnknownReportType(segment.to_string()))
    }

    pub fn all() -> impl Iterator<Item = ReportType> {
        ReportType::iter()
    }

    pub fn slug(&self) -> &'static str {
        match self {
            ReportType::Veterinary => "veterinary",
            ReportType::Training => "training",
            ReportType::Feeding => "feeding",
            ReportType::Checkup => "checkup",
        }
    }

    pub fn read_permission(&self) -> &'static str {
        match self {
            ReportType::Veterinary => consts::REPORTS_VETERINARY_READ,
            ReportType::Training => consts::REPORTS_TRAINING_READ,
            ReportType::Feeding => consts::REPORTS_FEEDING_READ,
            ReportType::Checkup => consts::REPORTS_CHECKUP_READ,
        }
    }

    pub fn title(&self, locale: Locale) -> &'static str {
        let msg = match self {
            ReportType::Veterinary => Msg::VeterinaryTitle,
            ReportType::Training => Msg::TrainingTitle,
            ReportType::Feeding => Msg::FeedingTitle,
            ReportType::Checkup => Msg::CheckupTitle,
        };
        locale.text(msg)
    }
}
