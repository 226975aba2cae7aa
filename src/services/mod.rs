// Analytics and Reporting
pub mod reports;

pub use reports::{ProjectSummary, ReportService, ReportTypeSummary};
