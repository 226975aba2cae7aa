//! Per-report data access: filtered counts, ordered pages and KPIs.

use async_trait::async_trait;
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QuerySelect, Select,
};
use serde_json::Value;
use std::collections::{BTreeSet, HashMap};

use super::document::{ColumnSpec, Kpi, KpiBucket};
use super::kinds::ReportType;
use super::range::DateRange;
use super::scope::ProjectScope;
use crate::entities::{dog, employee, project};
use crate::i18n::Locale;

mod checkup;
mod feeding;
mod training;
mod veterinary;

pub use checkup::CheckupSource;
pub use feeding::FeedingSource;
pub use training::TrainingSource;
pub use veterinary::VeterinarySource;

/// What rows a report covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportFilter {
    pub range: DateRange,
    pub scope: ProjectScope,
    pub dog_id: Option<i32>,
    /// Matched against the responsible staff column of the report
    pub employee_id: Option<i32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageRequest {
    /// 1-based page
    Page { page: u64, per_page: u64 },
    /// Every row up to `limit`, for file exports
    All { limit: u64 },
}

#[async_trait]
pub trait ReportSource: Send + Sync {
    fn report_type(&self) -> ReportType;

    fn columns(&self, locale: Locale) -> Vec<ColumnSpec>;

    async fn count(&self, db: &DatabaseConnection, filter: &ReportFilter) -> Result<u64, DbErr>;

    /// Rows ordered by date then id, as objects keyed by column key.
    async fn fetch(
        &self,
        db: &DatabaseConnection,
        filter: &ReportFilter,
        page: PageRequest,
    ) -> Result<Vec<Value>, DbErr>;

    /// Indicators over the whole filtered range.
    async fn kpis(
        &self,
        db: &DatabaseConnection,
        filter: &ReportFilter,
        locale: Locale,
    ) -> Result<Vec<Kpi>, DbErr>;
}

static VETERINARY: VeterinarySource = VeterinarySource;
static TRAINING: TrainingSource = TrainingSource;
static FEEDING: FeedingSource = FeedingSource;
static CHECKUP: CheckupSource = CheckupSource;

pub fn source_for(report_type: ReportType) -> &'static dyn ReportSource {
    match report_type {
        ReportType::Veterinary => &VETERINARY,
        ReportType::Training => &TRAINING,
        ReportType::Feeding => &FEEDING,
        ReportType::Checkup => &CHECKUP,
    }
}

/// Columns of one activity table that filtering needs.
pub(crate) struct FilterColumns<C> {
    pub date: C,
    pub project: C,
    pub dog: C,
    pub staff: C,
}

impl ReportFilter {
    pub(crate) fn condition<C: ColumnTrait>(&self, cols: FilterColumns<C>) -> Condition {
        let mut cond = Condition::all().add(
            cols.date
                .between(self.range.date_from, self.range.date_to),
        );
        if let ProjectScope::Projects(ids) = &self.scope {
            cond = cond.add(cols.project.is_in(ids.iter().copied()));
        }
        cond.add_option(self.dog_id.map(|id| cols.dog.eq(id)))
            .add_option(self.employee_id.map(|id| cols.staff.eq(id)))
    }
}

/// Runs `select` for one page, or for every row up to the export cap.
pub(crate) async fn load_rows<E>(
    db: &DatabaseConnection,
    select: Select<E>,
    page: PageRequest,
) -> Result<Vec<E::Model>, DbErr>
where
    E: EntityTrait,
{
    let (offset, limit) = match page {
        PageRequest::Page { page, per_page } => {
            (page.saturating_sub(1).saturating_mul(per_page), per_page)
        }
        PageRequest::All { limit } => (0, limit),
    };
    select.offset(offset).limit(limit).all(db).await
}

/// Display names for the ids referenced by a page of rows.
#[derive(Debug, Default)]
pub(crate) struct NameLookup {
    dogs: HashMap<i32, (String, String)>,
    employees: HashMap<i32, String>,
    projects: HashMap<i32, String>,
}

impl NameLookup {
    pub async fn load(
        db: &DatabaseConnection,
        dog_ids: BTreeSet<i32>,
        employee_ids: BTreeSet<i32>,
        project_ids: BTreeSet<i32>,
    ) -> Result<Self, DbErr> {
        let mut lookup = NameLookup::default();

        if !dog_ids.is_empty() {
            lookup.dogs = dog::Entity::find()
                .filter(dog::Column::Id.is_in(dog_ids))
                .all(db)
                .await?
                .into_iter()
                .map(|d| (d.id, (d.code, d.name)))
                .collect();
        }
        if !employee_ids.is_empty() {
            lookup.employees = employee::Entity::find()
                .filter(employee::Column::Id.is_in(employee_ids))
                .all(db)
                .await?
                .into_iter()
                .map(|e| (e.id, e.full_name))
                .collect();
        }
        if !project_ids.is_empty() {
            lookup.projects = project::Entity::find()
                .filter(project::Column::Id.is_in(project_ids))
                .all(db)
                .await?
                .into_iter()
                .map(|p| (p.id, p.name))
                .collect();
        }

        Ok(lookup)
    }

    pub fn dog_name(&self, id: i32) -> Option<&str> {
        self.dogs.get(&id).map(|(_, name)| name.as_str())
    }

    pub fn dog_code(&self, id: i32) -> Option<&str> {
        self.dogs.get(&id).map(|(code, _)| code.as_str())
    }

    pub fn employee(&self, id: Option<i32>) -> Option<&str> {
        id.and_then(|id| self.employees.get(&id)).map(String::as_str)
    }

    pub fn project(&self, id: Option<i32>) -> Option<&str> {
        id.and_then(|id| self.projects.get(&id)).map(String::as_str)
    }
}

/// Collects the ids a page references so names can be loaded in three queries.
pub(crate) fn referenced_ids<'a, T: 'a>(
    rows: impl IntoIterator<Item = &'a T>,
    refs: impl Fn(&T) -> (i32, Option<i32>, Option<i32>),
) -> (BTreeSet<i32>, BTreeSet<i32>, BTreeSet<i32>) {
    let mut dogs = BTreeSet::new();
    let mut staff = BTreeSet::new();
    let mut projects = BTreeSet::new();
    for row in rows {
        let (dog_id, staff_id, project_id) = refs(row);
        dogs.insert(dog_id);
        staff.extend(staff_id);
        projects.extend(project_id);
    }
    (dogs, staff, projects)
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub(crate) fn average(sum: f64, n: u64) -> Option<f64> {
    (n > 0).then(|| round2(sum / n as f64))
}

/// Counts per key, most frequent first, ties by key.
pub(crate) fn breakdown<'a>(keys: impl IntoIterator<Item = &'a str>) -> Vec<KpiBucket> {
    let mut counts: HashMap<&str, u64> = HashMap::new();
    for key in keys {
        *counts.entry(key).or_default() += 1;
    }
    let mut buckets: Vec<KpiBucket> = counts
        .into_iter()
        .map(|(key, count)| KpiBucket {
            key: key.to_string(),
            count,
        })
        .collect();
    buckets.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.key.cmp(&b.key)));
    buckets
}
