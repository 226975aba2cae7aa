use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240301_000001_create_access_tables::Migration),
            Box::new(m20240301_000002_create_staff_and_dogs::Migration),
            Box::new(m20240301_000003_create_activity_logs::Migration),
            Box::new(m20240301_000004_create_report_indexes::Migration),
        ]
    }
}

mod m20240301_000001_create_access_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000001_create_access_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Users::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Users::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(Users::Username)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Users::FullName).string().not_null())
                        .col(ColumnDef::new(Users::Role).string().not_null())
                        .col(
                            ColumnDef::new(Users::Active)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(Users::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Projects::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Projects::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(Projects::Code)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Projects::Name).string().not_null())
                        .col(ColumnDef::new(Projects::Status).string().not_null())
                        .col(ColumnDef::new(Projects::StartDate).date().not_null())
                        .col(ColumnDef::new(Projects::EndDate).date().null())
                        .col(
                            ColumnDef::new(Projects::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(ProjectAssignments::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ProjectAssignments::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(ProjectAssignments::ProjectId)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ProjectAssignments::UserId)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ProjectAssignments::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_project_assignments_project")
                                .from(ProjectAssignments::Table, ProjectAssignments::ProjectId)
                                .to(Projects::Table, Projects::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_project_assignments_user")
                                .from(ProjectAssignments::Table, ProjectAssignments::UserId)
                                .to(Users::Table, Users::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(UserPermissions::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(UserPermissions::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(UserPermissions::UserId).integer().not_null())
                        .col(ColumnDef::new(UserPermissions::ProjectId).integer().null())
                        .col(
                            ColumnDef::new(UserPermissions::Permission)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(UserPermissions::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_user_permissions_user")
                                .from(UserPermissions::Table, UserPermissions::UserId)
                                .to(Users::Table, Users::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_user_permissions_project")
                                .from(UserPermissions::Table, UserPermissions::ProjectId)
                                .to(Projects::Table, Projects::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(UserPermissions::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(ProjectAssignments::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Projects::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Users::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub enum Users {
        Table,
        Id,
        Username,
        FullName,
        Role,
        Active,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    pub enum Projects {
        Table,
        Id,
        Code,
        Name,
        Status,
        StartDate,
        EndDate,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    enum ProjectAssignments {
        Table,
        Id,
        ProjectId,
        UserId,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    enum UserPermissions {
        Table,
        Id,
        UserId,
        ProjectId,
        Permission,
        CreatedAt,
    }
}

mod m20240301_000002_create_staff_and_dogs {
    use super::m20240301_000001_create_access_tables::Projects;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000002_create_staff_and_dogs"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Employees::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Employees::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Employees::EmployeeCode).string().not_null())
                        .col(ColumnDef::new(Employees::FullName).string().not_null())
                        .col(ColumnDef::new(Employees::Role).string().not_null())
                        .col(ColumnDef::new(Employees::ProjectId).integer().null())
                        .col(
                            ColumnDef::new(Employees::Active)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_employees_project")
                                .from(Employees::Table, Employees::ProjectId)
                                .to(Projects::Table, Projects::Id)
                                .on_delete(ForeignKeyAction::SetNull),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Dogs::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Dogs::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Dogs::Code).string().not_null())
                        .col(ColumnDef::new(Dogs::Name).string().not_null())
                        .col(ColumnDef::new(Dogs::Breed).string().not_null())
                        .col(ColumnDef::new(Dogs::Gender).string().not_null())
                        .col(ColumnDef::new(Dogs::BirthDate).date().null())
                        .col(ColumnDef::new(Dogs::ProjectId).integer().null())
                        .col(ColumnDef::new(Dogs::Status).string().not_null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_dogs_project")
                                .from(Dogs::Table, Dogs::ProjectId)
                                .to(Projects::Table, Projects::Id)
                                .on_delete(ForeignKeyAction::SetNull),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Dogs::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Employees::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub enum Employees {
        Table,
        Id,
        EmployeeCode,
        FullName,
        Role,
        ProjectId,
        Active,
    }

    #[derive(DeriveIden)]
    pub enum Dogs {
        Table,
        Id,
        Code,
        Name,
        Breed,
        Gender,
        BirthDate,
        ProjectId,
        Status,
    }
}

mod m20240301_000003_create_activity_logs {
    use super::m20240301_000001_create_access_tables::Projects;
    use super::m20240301_000002_create_staff_and_dogs::{Dogs, Employees};
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000003_create_activity_logs"
        }
    }

    /// Every activity table shares the same id, dog, staff and project columns.
    fn activity_table<T, C>(table: T, staff_col: C, fk_prefix: &str) -> TableCreateStatement
    where
        T: Iden + Copy + 'static,
        C: Iden + Copy + 'static,
    {
        Table::create()
            .table(table)
            .if_not_exists()
            .col(
                ColumnDef::new(Shared::Id)
                    .integer()
                    .not_null()
                    .auto_increment()
                    .primary_key(),
            )
            .col(ColumnDef::new(Shared::DogId).integer().not_null())
            .col(ColumnDef::new(staff_col).integer().null())
            .col(ColumnDef::new(Shared::ProjectId).integer().null())
            .col(
                ColumnDef::new(Shared::CreatedAt)
                    .timestamp_with_time_zone()
                    .not_null(),
            )
            .foreign_key(
                ForeignKey::create()
                    .name(format!("fk_{}_dog", fk_prefix))
                    .from(table, Shared::DogId)
                    .to(Dogs::Table, Dogs::Id)
                    .on_delete(ForeignKeyAction::Cascade),
            )
            .foreign_key(
                ForeignKey::create()
                    .name(format!("fk_{}_staff", fk_prefix))
                    .from(table, staff_col)
                    .to(Employees::Table, Employees::Id)
                    .on_delete(ForeignKeyAction::SetNull),
            )
            .foreign_key(
                ForeignKey::create()
                    .name(format!("fk_{}_project", fk_prefix))
                    .from(table, Shared::ProjectId)
                    .to(Projects::Table, Projects::Id)
                    .on_delete(ForeignKeyAction::SetNull),
            )
            .to_owned()
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    activity_table(
                        VeterinaryVisits::Table,
                        VeterinaryVisits::VetId,
                        "veterinary_visits",
                    )
                    .col(ColumnDef::new(VeterinaryVisits::VisitDate).date().not_null())
                    .col(ColumnDef::new(VeterinaryVisits::VisitType).string().not_null())
                    .col(ColumnDef::new(VeterinaryVisits::Diagnosis).text().null())
                    .col(ColumnDef::new(VeterinaryVisits::Treatment).text().null())
                    .col(ColumnDef::new(VeterinaryVisits::Cost).double().null())
                    .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    activity_table(
                        TrainingActivities::Table,
                        TrainingActivities::TrainerId,
                        "training_activities",
                    )
                    .col(
                        ColumnDef::new(TrainingActivities::SessionDate)
                            .date()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TrainingActivities::Category)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TrainingActivities::DurationMinutes)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(TrainingActivities::SuccessRating)
                            .integer()
                            .null(),
                    )
                    .col(ColumnDef::new(TrainingActivities::Notes).text().null())
                    .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    activity_table(FeedingLogs::Table, FeedingLogs::RecorderId, "feeding_logs")
                        .col(ColumnDef::new(FeedingLogs::LogDate).date().not_null())
                        .col(ColumnDef::new(FeedingLogs::MealType).string().not_null())
                        .col(ColumnDef::new(FeedingLogs::FoodType).string().not_null())
                        .col(
                            ColumnDef::new(FeedingLogs::QuantityGrams)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(FeedingLogs::WaterMl).integer().null())
                        .col(ColumnDef::new(FeedingLogs::Notes).text().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    activity_table(CheckupLogs::Table, CheckupLogs::ExaminerId, "checkup_logs")
                        .col(ColumnDef::new(CheckupLogs::CheckDate).date().not_null())
                        .col(ColumnDef::new(CheckupLogs::TemperatureC).double().null())
                        .col(ColumnDef::new(CheckupLogs::HeartRate).integer().null())
                        .col(ColumnDef::new(CheckupLogs::WeightKg).double().null())
                        .col(
                            ColumnDef::new(CheckupLogs::OverallStatus)
                                .string()
                                .not_null(),
                        )
                        .col(ColumnDef::new(CheckupLogs::Notes).text().null())
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(CheckupLogs::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(FeedingLogs::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(TrainingActivities::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(VeterinaryVisits::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden, Clone, Copy)]
    enum Shared {
        Id,
        DogId,
        ProjectId,
        CreatedAt,
    }

    #[derive(DeriveIden, Clone, Copy)]
    pub enum VeterinaryVisits {
        Table,
        VetId,
        VisitDate,
        VisitType,
        Diagnosis,
        Treatment,
        Cost,
    }

    #[derive(DeriveIden, Clone, Copy)]
    pub enum TrainingActivities {
        Table,
        TrainerId,
        SessionDate,
        Category,
        DurationMinutes,
        SuccessRating,
        Notes,
    }

    #[derive(DeriveIden, Clone, Copy)]
    pub enum FeedingLogs {
        Table,
        RecorderId,
        LogDate,
        MealType,
        FoodType,
        QuantityGrams,
        WaterMl,
        Notes,
    }

    #[derive(DeriveIden, Clone, Copy)]
    pub enum CheckupLogs {
        Table,
        ExaminerId,
        CheckDate,
        TemperatureC,
        HeartRate,
        WeightKg,
        OverallStatus,
        Notes,
    }
}

mod m20240301_000004_create_report_indexes {
    use super::m20240301_000003_create_activity_logs::{
        CheckupLogs, FeedingLogs, TrainingActivities, VeterinaryVisits,
    };
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000004_create_report_indexes"
        }
    }

    #[derive(DeriveIden, Clone, Copy)]
    enum Shared {
        ProjectId,
    }

    async fn date_project_index<T, C>(
        manager: &SchemaManager<'_>,
        name: &str,
        table: T,
        date_col: C,
    ) -> Result<(), DbErr>
    where
        T: Iden + Copy + 'static,
        C: Iden + Copy + 'static,
    {
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name(name)
                    .table(table)
                    .col(date_col)
                    .col(Shared::ProjectId)
                    .to_owned(),
            )
            .await
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            date_project_index(
                manager,
                "idx_veterinary_visits_date_project",
                VeterinaryVisits::Table,
                VeterinaryVisits::VisitDate,
            )
            .await?;
            date_project_index(
                manager,
                "idx_training_activities_date_project",
                TrainingActivities::Table,
                TrainingActivities::SessionDate,
            )
            .await?;
            date_project_index(
                manager,
                "idx_feeding_logs_date_project",
                FeedingLogs::Table,
                FeedingLogs::LogDate,
            )
            .await?;
            date_project_index(
                manager,
                "idx_checkup_logs_date_project",
                CheckupLogs::Table,
                CheckupLogs::CheckDate,
            )
            .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            for (name, table) in [
                ("idx_veterinary_visits_date_project", "veterinary_visits"),
                ("idx_training_activities_date_project", "training_activities"),
                ("idx_feeding_logs_date_project", "feeding_logs"),
                ("idx_checkup_logs_date_project", "checkup_logs"),
            ] {
                manager
                    .drop_index(Index::drop().name(name).table(Alias::new(table)).to_owned())
                    .await?;
            }
            Ok(())
        }
    }
}
