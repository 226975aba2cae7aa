use async_trait::async_trait;
use sea_orm::{DatabaseConnection, DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect};
use serde_json::{json, Value};
use std::collections::HashSet;

use super::{
    breakdown, load_rows, referenced_ids, round2, FilterColumns, NameLookup, PageRequest,
    ReportFilter, ReportSource,
};
use crate::entities::veterinary_visit::{self, Column, Entity as VeterinaryVisit, VISIT_TYPE_EMERGENCY};
use crate::i18n::{Locale, Msg};
use crate::reports::document::{ColumnSpec, Kpi, KpiValue};
use crate::reports::kinds::ReportType;

#[derive(Debug, Clone, Copy, Default)]
pub struct VeterinarySource;

fn filter_columns() -> FilterColumns<Column> {
    FilterColumns {
        date: Column::VisitDate,
        project: Column::ProjectId,
        dog: Column::DogId,
        staff: Column::VetId,
    }
}

#[async_trait]
impl ReportSource for VeterinarySource {
    fn report_type(&self) -> ReportType {
        ReportType::Veterinary
    }

    fn columns(&self, locale: Locale) -> Vec<ColumnSpec> {
        [
            ("date", Msg::Date),
            ("dog", Msg::Dog),
            ("dog_code", Msg::DogCode),
            ("project", Msg::Project),
            ("veterinarian", Msg::Veterinarian),
            ("visit_type", Msg::VisitType),
            ("diagnosis", Msg::Diagnosis),
            ("treatment", Msg::Treatment),
            ("cost", Msg::Cost),
        ]
        .into_iter()
        .map(|(key, msg)| ColumnSpec::new(key, locale.text(msg)))
        .collect()
    }

    async fn count(&self, db: &DatabaseConnection, filter: &ReportFilter) -> Result<u64, DbErr> {
        VeterinaryVisit::find()
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
        let select = VeterinaryVisit::find()
            .filter(filter.condition(filter_columns()))
            .order_by_asc(Column::VisitDate)
            .order_by_asc(Column::Id);
        let visits: Vec<veterinary_visit::Model> = load_rows(db, select, page).await?;

        let (dogs, vets, projects) =
            referenced_ids(&visits, |v| (v.dog_id, v.vet_id, v.project_id));
        let names = NameLookup::load(db, dogs, vets, projects).await?;

        Ok(visits
            .iter()
            .map(|v| {
                json!({
                    "id": v.id,
                    "date": v.visit_date,
                    "dog_id": v.dog_id,
                    "dog": names.dog_name(v.dog_id),
                    "dog_code": names.dog_code(v.dog_id),
                    "project_id": v.project_id,
                    "project": names.project(v.project_id),
                    "vet_id": v.vet_id,
                    "veterinarian": names.employee(v.vet_id),
                    "visit_type": v.visit_type,
                    "diagnosis": v.diagnosis,
                    "treatment": v.treatment,
                    "cost": v.cost,
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
        let rows: Vec<(i32, String, Option<f64>)> = VeterinaryVisit::find()
            .select_only()
            .column(Column::DogId)
            .column(Column::VisitType)
            .column(Column::Cost)
            .filter(filter.condition(filter_columns()))
            .into_tuple()
            .all(db)
            .await?;

        let emergencies = rows
            .iter()
            .filter(|(_, kind, _)| kind.trim().eq_ignore_ascii_case(VISIT_TYPE_EMERGENCY))
            .count() as u64;
        let dogs: HashSet<i32> = rows.iter().map(|(dog, _, _)| *dog).collect();
        let total_cost: f64 = rows.iter().filter_map(|(_, _, cost)| *cost).sum();

        Ok(vec![
            Kpi::new(
                "total_visits",
                locale.text(Msg::TotalVisits),
                KpiValue::Count(rows.len() as u64),
            ),
            Kpi::new(
                "emergency_visits",
                locale.text(Msg::EmergencyVisits),
                KpiValue::Count(emergencies),
            ),
            Kpi::new(
                "distinct_dogs",
                locale.text(Msg::DistinctDogs),
                KpiValue::Count(dogs.len() as u64),
            ),
            Kpi::new(
                "total_cost",
                locale.text(Msg::TotalCost),
                KpiValue::Number(Some(round2(total_cost))),
            ),
            Kpi::new(
                "visits_by_type",
                locale.text(Msg::VisitsByType),
                KpiValue::Breakdown(breakdown(rows.iter().map(|(_, kind, _)| kind.as_str()))),
            ),
        ])
    }
}
