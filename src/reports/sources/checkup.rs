use async_trait::async_trait;
use sea_orm::{DatabaseConnection, DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect};
use serde_json::{json, Value};
use std::collections::HashSet;

use super::{
    average, load_rows, referenced_ids, FilterColumns, NameLookup, PageRequest, ReportFilter,
    ReportSource,
};
use crate::entities::checkup_log::{self, Column, Entity as CheckupLog, STATUS_CRITICAL, STATUS_NORMAL};
use crate::i18n::{Locale, Msg};
use crate::reports::document::{ColumnSpec, Kpi, KpiValue};
use crate::reports::kinds::ReportType;

#[derive(Debug, Clone, Copy, Default)]
pub struct CheckupSource;

fn filter_columns() -> FilterColumns<Column> {
    FilterColumns {
        date: Column::CheckDate,
        project: Column::ProjectId,
        dog: Column::DogId,
        staff: Column::ExaminerId,
    }
}

fn status_is(status: &str, expected: &str) -> bool {
    status.trim().eq_ignore_ascii_case(expected)
}

#[async_trait]
impl ReportSource for CheckupSource {
    fn report_type(&self) -> ReportType {
        ReportType::Checkup
    }

    fn columns(&self, locale: Locale) -> Vec<ColumnSpec> {
        [
            ("date", Msg::Date),
            ("dog", Msg::Dog),
            ("dog_code", Msg::DogCode),
            ("project", Msg::Project),
            ("examiner", Msg::Examiner),
            ("temperature_c", Msg::Temperature),
            ("heart_rate", Msg::HeartRate),
            ("weight_kg", Msg::WeightKg),
            ("overall_status", Msg::Status),
            ("notes", Msg::Notes),
        ]
        .into_iter()
        .map(|(key, msg)| ColumnSpec::new(key, locale.text(msg)))
        .collect()
    }

    async fn count(&self, db: &DatabaseConnection, filter: &ReportFilter) -> Result<u64, DbErr> {
        CheckupLog::find()
            .filter(filter.condition(filter_columns()))
            .count(db)
            .await
    }

    async fn fetch(
        &self,
        db: &DatabaseConnection,
        filter: &ReportFilter,
        page: PageRequest,
    ) -> Result<Vec<Value>, DbErr> {
        let select = CheckupLog::find()
            .filter(filter.condition(filter_columns()))
            .order_by_asc(Column::CheckDate)
            .order_by_asc(Column::Id);
        let checkups: Vec<checkup_log::Model> = load_rows(db, select, page).await?;

        let (dogs, examiners, projects) =
            referenced_ids(&checkups, |c| (c.dog_id, c.examiner_id, c.project_id));
        let names = NameLookup::load(db, dogs, examiners, projects).await?;

        Ok(checkups
            .iter()
            .map(|c| {
                json!({
                    "id": c.id,
                    "date": c.check_date,
                    "dog_id": c.dog_id,
                    "dog": names.dog_name(c.dog_id),
                    "dog_code": names.dog_code(c.dog_id),
                    "project_id": c.project_id,
                    "project": names.project(c.project_id),
                    "examiner_id": c.examiner_id,
                    "examiner": names.employee(c.examiner_id),
                    "temperature_c": c.temperature_c,
                    "heart_rate": c.heart_rate,
                    "weight_kg": c.weight_kg,
                    "overall_status": c.overall_status,
                    "notes": c.notes,
                })
            })
            .collect())
    }

    async fn kpis(
        &self,
        db: &DatabaseConnection,
        filter: &ReportFilter,
        locale: Locale,
    ) -> Result<Vec<Kpi>, DbErr> {
        let rows: Vec<(i32, String, Option<f64>)> = CheckupLog::find()
            .select_only()
            .column(Column::DogId)
            .column(Column::OverallStatus)
            .column(Column::TemperatureC)
            .filter(filter.condition(filter_columns()))
            .into_tuple()
            .all(db)
            .await?;

        let abnormal = rows
            .iter()
            .filter(|(_, status, _)| !status_is(status, STATUS_NORMAL))
            .count() as u64;
        let critical = rows
            .iter()
            .filter(|(_, status, _)| status_is(status, STATUS_CRITICAL))
            .count() as u64;
        let temperatures: Vec<f64> = rows.iter().filter_map(|(_, _, t)| *t).collect();
        let dogs: HashSet<i32> = rows.iter().map(|(dog, _, _)| *dog).collect();

        Ok(vec![
            Kpi::new(
                "checkups",
                locale.text(Msg::Checkups),
                KpiValue::Count(rows.len() as u64),
            ),
            Kpi::new(
                "abnormal_findings",
                locale.text(Msg::AbnormalFindings),
                KpiValue::Count(abnormal),
            ),
            Kpi::new(
                "critical_findings",
                locale.text(Msg::CriticalFindings),
                KpiValue::Count(critical),
            ),
            Kpi::new(
                "avg_temperature_c",
                locale.text(Msg::AvgTemperature),
                KpiValue::Number(average(
                    temperatures.iter().sum(),
                    temperatures.len() as u64,
                )),
            ),
            Kpi::new(
                "distinct_dogs",
                locale.text(Msg::DistinctDogs),
                KpiValue::Count(dogs.len() as u64),
            ),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_comparison_ignores_case_and_padding() {
        assert!(status_is(" Normal ", STATUS_NORMAL));
        assert!(status_is("CRITICAL", STATUS_CRITICAL));
        assert!(!status_is("attention", STATUS_NORMAL));
    }
}
