use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

pub const STATUS_NORMAL: &str = "normal";
pub const STATUS_CRITICAL: &str = "critical";

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "checkup_logs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub dog_id: i32,
    pub examiner_id: Option<i32>,
    pub project_id: Option<i32>,
    pub check_date: NaiveDate,
    #[sea_orm(column_type = "Double", nullable)]
    pub temperature_c: Option<f64>,
    pub heart_rate: Option<i32>,
    #[sea_orm(column_type = "Double", nullable)]
    pub weight_kg: Option<f64>,
    /// `normal`, `attention` or `critical`
    pub overall_status: String,
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
        from = "Column::ExaminerId",
        to = "super::employee::Column::Id"
    )]
    Examiner,
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
        Relation::Examiner.def()
    }
}

impl Related<super::project::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Project.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
