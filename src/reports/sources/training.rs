use async_trait::async_trait;
use sea_orm::{DatabaseConnection, DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect};
use serde_json::{json, Value};
use std::collections::HashSet;

use super::{
    average, breakdown, load_rows, referenced_ids, round2, FilterColumns, NameLookup, PageRequest,
    ReportFilter, ReportSource,
};
use crate::entities::training_activity::{self, Column, Entity as TrainingActivity};
use crate::i18n::{Locale, Msg};
use crate::reports::document::{ColumnSpec, Kpi, KpiValue};
use crate::reports::kinds::ReportType;

#[derive(Debug, Clone, Copy, Default)]
pub struct TrainingSource;

fn filter_columns() -> FilterColumns<Column> {
    FilterColumns {
        date: Column::SessionDate,
        project: Column::ProjectId,
        dog: Column::DogId,
        staff: Column::TrainerId,
    }
}

#[async_trait]
impl ReportSource for TrainingSource {
    fn report_type(&self) -> ReportType {
        ReportType::Training
    }

    fn columns(&self, locale: Locale) -> Vec<ColumnSpec> {
        [
            ("date", Msg::Date),
            ("dog", Msg::Dog),
            ("dog_code", Msg::DogCode),
            ("project", Msg::Project),
            ("trainer", Msg::Trainer),
            ("category", Msg::Category),
            ("duration_minutes", Msg::DurationMinutes),
            ("success_rating", Msg::SuccessRating),
            ("notes", Msg::Notes),
        ]
        .into_iter()
        .map(|(key, msg)| ColumnSpec::new(key, locale.text(msg)))
        .collect()
    }

    async fn count(&self, db: &DatabaseConnection, filter: &ReportFilter) -> Result<u64, DbErr> {
        TrainingActivity::find()
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
        let select = TrainingActivity::find()
            .filter(filter.condition(filter_columns()))
            .order_by_asc(Column::SessionDate)
            .order_by_asc(Column::Id);
        let sessions: Vec<training_activity::Model> = load_rows(db, select, page).await?;

        let (dogs, trainers, projects) =
            referenced_ids(&sessions, |s| (s.dog_id, s.trainer_id, s.project_id));
        let names = NameLookup::load(db, dogs, trainers, projects).await?;

        Ok(sessions
            .iter()
            .map(|s| {
                json!({
                    "id": s.id,
                    "date": s.session_date,
                    "dog_id": s.dog_id,
                    "dog": names.dog_name(s.dog_id),
                    "dog_code": names.dog_code(s.dog_id),
                    "project_id": s.project_id,
                    "project": names.project(s.project_id),
                    "trainer_id": s.trainer_id,
                    "trainer": names.employee(s.trainer_id),
                    "category": s.category,
                    "duration_minutes": s.duration_minutes,
                    "success_rating": s.success_rating,
                    "notes": s.notes,
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
        let rows: Vec<(i32, String, i32, Option<i32>)> = TrainingActivity::find()
            .select_only()
            .column(Column::DogId)
            .column(Column::Category)
            .column(Column::DurationMinutes)
            .column(Column::SuccessRating)
            .filter(filter.condition(filter_columns()))
            .into_tuple()
            .all(db)
            .await?;

        let minutes: i64 = rows.iter().map(|(_, _, m, _)| i64::from(*m)).sum();
        let ratings: Vec<i32> = rows.iter().filter_map(|(_, _, _, r)| *r).collect();
        let rating_sum: f64 = ratings.iter().map(|r| f64::from(*r)).sum();
        let dogs: HashSet<i32> = rows.iter().map(|(dog, _, _, _)| *dog).collect();

        Ok(vec![
            Kpi::new(
                "sessions",
                locale.text(Msg::Sessions),
                KpiValue::Count(rows.len() as u64),
            ),
            Kpi::new(
                "total_hours",
                locale.text(Msg::TotalHours),
                KpiValue::Number(Some(round2(minutes as f64 / 60.0))),
            ),
            Kpi::new(
                "avg_success_rating",
                locale.text(Msg::AvgSuccessRating),
                KpiValue::Number(average(rating_sum, ratings.len() as u64)),
            ),
            Kpi::new(
                "distinct_dogs",
                locale.text(Msg::DistinctDogs),
                KpiValue::Count(dogs.len() as u64),
            ),
            Kpi::new(
                "sessions_by_category",
                locale.text(Msg::SessionsByCategory),
                KpiValue::Breakdown(breakdown(rows.iter().map(|(_, c, _, _)| c.as_str()))),
            ),
        ])
    }
}
