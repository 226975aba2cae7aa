use async_trait::async_trait;
use chrono::NaiveDate;
use sea_orm::{DatabaseConnection, DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect};
use serde_json::{json, Value};
use std::collections::HashSet;

use super::{
    average, load_rows, referenced_ids, round2, FilterColumns, NameLookup, PageRequest,
    ReportFilter, ReportSource,
};
use crate::entities::feeding_log::{self, Column, Entity as FeedingLog};
use crate::i18n::{Locale, Msg};
use crate::reports::document::{ColumnSpec, Kpi, KpiValue};
use crate::reports::kinds::ReportType;

#[derive(Debug, Clone, Copy, Default)]
pub struct FeedingSource;

fn filter_columns() -> FilterColumns<Column> {
    FilterColumns {
        date: Column::LogDate,
        project: Column::ProjectId,
        dog: Column::DogId,
        staff: Column::RecorderId,
    }
}

#[async_trait]
impl ReportSource for FeedingSource {
    fn report_type(&self) -> ReportType {
        ReportType::Feeding
    }

    fn columns(&self, locale: Locale) -> Vec<ColumnSpec> {
        [
            ("date", Msg::Date),
            ("dog", Msg::Dog),
            ("dog_code", Msg::DogCode),
            ("project", Msg::Project),
            ("recorder", Msg::Recorder),
            ("meal_type", Msg::MealType),
            ("food_type", Msg::FoodType),
            ("quantity_grams", Msg::QuantityGrams),
            ("water_ml", Msg::WaterMl),
            ("notes", Msg::Notes),
        ]
        .into_iter()
        .map(|(key, msg)| ColumnSpec::new(key, locale.text(msg)))
        .collect()
    }

    async fn count(&self, db: &DatabaseConnection, filter: &ReportFilter) -> Result<u64, DbErr> {
        FeedingLog::find()
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
        let select = FeedingLog::find()
            .filter(filter.condition(filter_columns()))
            .order_by_asc(Column::LogDate)
            .order_by_asc(Column::Id);
        let meals: Vec<feeding_log::Model> = load_rows(db, select, page).await?;

        let (dogs, recorders, projects) =
            referenced_ids(&meals, |m| (m.dog_id, m.recorder_id, m.project_id));
        let names = NameLookup::load(db, dogs, recorders, projects).await?;

        Ok(meals
            .iter()
            .map(|m| {
                json!({
                    "id": m.id,
                    "date": m.log_date,
                    "dog_id": m.dog_id,
                    "dog": names.dog_name(m.dog_id),
                    "dog_code": names.dog_code(m.dog_id),
                    "project_id": m.project_id,
                    "project": names.project(m.project_id),
                    "recorder_id": m.recorder_id,
                    "recorder": names.employee(m.recorder_id),
                    "meal_type": m.meal_type,
                    "food_type": m.food_type,
                    "quantity_grams": m.quantity_grams,
                    "water_ml": m.water_ml,
                    "notes": m.notes,
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
        let rows: Vec<(i32, NaiveDate, i32, Option<i32>)> = FeedingLog::find()
            .select_only()
            .column(Column::DogId)
            .column(Column::LogDate)
            .column(Column::QuantityGrams)
            .column(Column::WaterMl)
            .filter(filter.condition(filter_columns()))
            .into_tuple()
            .all(db)
            .await?;

        let grams: i64 = rows.iter().map(|(_, _, g, _)| i64::from(*g)).sum();
        let water_ml: i64 = rows
            .iter()
            .filter_map(|(_, _, _, w)| *w)
            .map(i64::from)
            .sum();
        let dogs: HashSet<i32> = rows.iter().map(|(dog, _, _, _)| *dog).collect();
        let dog_days: HashSet<(i32, NaiveDate)> =
            rows.iter().map(|(dog, day, _, _)| (*dog, *day)).collect();

        Ok(vec![
            Kpi::new(
                "meals_logged",
                locale.text(Msg::MealsLogged),
                KpiValue::Count(rows.len() as u64),
            ),
            Kpi::new(
                "total_food_kg",
                locale.text(Msg::TotalFoodKg),
                KpiValue::Number(Some(round2(grams as f64 / 1000.0))),
            ),
            Kpi::new(
                "total_water_l",
                locale.text(Msg::TotalWaterL),
                KpiValue::Number(Some(round2(water_ml as f64 / 1000.0))),
            ),
            Kpi::new(
                "distinct_dogs",
                locale.text(Msg::DistinctDogs),
                KpiValue::Count(dogs.len() as u64),
            ),
            Kpi::new(
                "avg_food_per_dog_day_g",
                locale.text(Msg::AvgFoodPerDogDay),
                KpiValue::Number(average(grams as f64, dog_days.len() as u64)),
            ),
        ])
    }
}
