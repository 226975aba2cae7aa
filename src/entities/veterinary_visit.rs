use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Visit types recorded by the clinic. Stored as free text so new kinds
/// don't need a migration; `emergency` feeds the emergency KPI.
pub const VISIT_TYPE_EMERGENCY: &str = "emergency";

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "veterinary_visits")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub dog_id: i32,
    pub vet_id: Option<i32>,
    pub project_id: Option<i32>,
    pub visit_date: NaiveDate,
    pub visit_type: String,
    pub diagnosis: Option<String>,
    pub treatment: Option<String>,
    #[sea_orm(column_type = "Double", nullable)]
    pub cost: Option<f64>,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::dog::Entity",
        from = "Column::DogId",
        to = "super::dog::Column::Id"
    )]
    Dog,
    #[sea_orm(
        belongs_to = "super::employee::Entity",
        from = "Column::VetId",
        to = "super::employee::Column::Id"
    )]
    Vet,
    #[sea_orm(
        belongs_to = "super::project::Entity",
        from = "Column::ProjectId",
        to = "super::project::Column::Id"
    )]
    Project,
}

impl Related<super::dog::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Dog.def()
    }
}

impl Related<super::employee::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Vet.def()
    }
}

impl Related<super::project::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Project.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
