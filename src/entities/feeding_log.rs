use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "feeding_logs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub dog_id: i32,
    pub recorder_id: Option<i32>,
    pub project_id: Option<i32>,
    pub log_date: NaiveDate,
    pub meal_type: String,
    pub food_type: String,
    pub quantity_grams: i32,
    pub water_ml: Option<i32>,
    pub notes: Option<String>,
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
        from = "Column::RecorderId",
        to = "super::employee::Column::Id"
    )]
    Recorder,
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
        Relation::Recorder.def()
    }
}

impl Related<super::project::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Project.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
