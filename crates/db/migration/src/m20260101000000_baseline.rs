use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::DatabaseBackend;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create().if_not_exists()
                    .table(Users::Table)
                    .col(
                        ColumnDef::new(Users::Id)
                            .string_len(36)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Users::Email).string_len(255))
                    .col(ColumnDef::new(Users::Username).string_len(50))
                    .col(ColumnDef::new(Users::FullName).string_len(100))
                    .col(ColumnDef::new(Users::Institution).string_len(200))
                    .col(ColumnDef::new(Users::FieldOfStudy).string_len(100))
                    .col(
                        ColumnDef::new(Users::DailyGoalHours)
                            .double()
                            .not_null()
                            .default(Expr::val(2.0)),
                    )
                    .col(
                        ColumnDef::new(Users::PreferredFocusMode)
                            .string_len(32)
                            .not_null()
                            .default(Expr::val("pomodoro")),
                    )
                    .col(
                        ColumnDef::new(Users::XpPoints)
                            .big_integer()
                            .not_null()
                            .default(Expr::val(0)),
                    )
                    .col(
                        ColumnDef::new(Users::Level)
                            .integer()
                            .not_null()
                            .default(Expr::val(1)),
                    )
                    .col(
                        ColumnDef::new(Users::CurrentStreak)
                            .integer()
                            .not_null()
                            .default(Expr::val(0)),
                    )
                    .col(
                        ColumnDef::new(Users::LongestStreak)
                            .integer()
                            .not_null()
                            .default(Expr::val(0)),
                    )
                    .col(timestamp_col(Users::CreatedAt))
                    .col(timestamp_col(Users::UpdatedAt))
                    .col(ColumnDef::new(Users::LastLogin).timestamp())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_users_email")
                    .table(Users::Table)
                    .col(Users::Email)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_users_username")
                    .table(Users::Table)
                    .col(Users::Username)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create().if_not_exists()
                    .table(StudySessions::Table)
                    .col(pk_id_col(manager, StudySessions::Id))
                    .col(ColumnDef::new(StudySessions::Title).string_len(200).not_null())
                    .col(ColumnDef::new(StudySessions::Description).text())
                    .col(ColumnDef::new(StudySessions::ScheduledStart).timestamp().not_null())
                    .col(ColumnDef::new(StudySessions::ScheduledEnd).timestamp().not_null())
                    .col(ColumnDef::new(StudySessions::ActualStart).timestamp())
                    .col(ColumnDef::new(StudySessions::ActualEnd).timestamp())
                    .col(
                        ColumnDef::new(StudySessions::FocusMode)
                            .string_len(32)
                            .not_null()
                            .default(Expr::val("pomodoro")),
                    )
                    .col(ColumnDef::new(StudySessions::FocusScore).double())
                    .col(ColumnDef::new(StudySessions::UserId).string_len(36).not_null())
                    .col(timestamp_col(StudySessions::CreatedAt))
                    .col(timestamp_col(StudySessions::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_study_sessions_user_id")
                            .from(StudySessions::Table, StudySessions::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_study_sessions_user_id")
                    .table(StudySessions::Table)
                    .col(StudySessions::UserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create().if_not_exists()
                    .table(Tasks::Table)
                    .col(pk_id_col(manager, Tasks::Id))
                    .col(ColumnDef::new(Tasks::Title).string_len(255).not_null())
                    .col(ColumnDef::new(Tasks::Description).text())
                    .col(ColumnDef::new(Tasks::DetailedInstructions).text())
                    .col(
                        ColumnDef::new(Tasks::Priority)
                            .integer()
                            .not_null()
                            .default(Expr::val(2)),
                    )
                    .col(
                        ColumnDef::new(Tasks::Status)
                            .string_len(32)
                            .not_null()
                            .default(Expr::val("todo")),
                    )
                    .col(
                        ColumnDef::new(Tasks::Difficulty)
                            .string_len(20)
                            .not_null()
                            .default(Expr::val("medium")),
                    )
                    .col(ColumnDef::new(Tasks::EstimatedMinutes).integer())
                    .col(ColumnDef::new(Tasks::ActualMinutes).integer())
                    .col(ColumnDef::new(Tasks::DueDate).date())
                    .col(
                        ColumnDef::new(Tasks::IsRecurring)
                            .boolean()
                            .not_null()
                            .default(Expr::val(false)),
                    )
                    .col(ColumnDef::new(Tasks::RecurrenceRule).string_len(100))
                    .col(
                        ColumnDef::new(Tasks::AiGenerated)
                            .boolean()
                            .not_null()
                            .default(Expr::val(false)),
                    )
                    .col(ColumnDef::new(Tasks::AiFeedback).text())
                    .col(ColumnDef::new(Tasks::OwnerId).string_len(36).not_null())
                    .col(ColumnDef::new(Tasks::ParentTaskId).big_integer())
                    .col(ColumnDef::new(Tasks::StudySessionId).big_integer())
                    .col(timestamp_col(Tasks::CreatedAt))
                    .col(timestamp_col(Tasks::UpdatedAt))
                    .col(ColumnDef::new(Tasks::CompletedAt).timestamp())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tasks_owner_id")
                            .from(Tasks::Table, Tasks::OwnerId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tasks_parent_task_id")
                            .from(Tasks::Table, Tasks::ParentTaskId)
                            .to(Tasks::Table, Tasks::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tasks_study_session_id")
                            .from(Tasks::Table, Tasks::StudySessionId)
                            .to(StudySessions::Table, StudySessions::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_tasks_owner_id")
                    .table(Tasks::Table)
                    .col(Tasks::OwnerId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_tasks_owner_id_status")
                    .table(Tasks::Table)
                    .col(Tasks::OwnerId)
                    .col(Tasks::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_tasks_due_date")
                    .table(Tasks::Table)
                    .col(Tasks::DueDate)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create().if_not_exists()
                    .table(Tags::Table)
                    .col(pk_id_col(manager, Tags::Id))
                    .col(ColumnDef::new(Tags::Name).string_len(50).not_null())
                    .col(
                        ColumnDef::new(Tags::Color)
                            .string_len(7)
                            .not_null()
                            .default(Expr::val("#3B82F6")),
                    )
                    .col(ColumnDef::new(Tags::UserId).string_len(36))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tags_user_id")
                            .from(Tags::Table, Tags::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_tags_user_id_name")
                    .table(Tags::Table)
                    .col(Tags::UserId)
                    .col(Tags::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create().if_not_exists()
                    .table(TaskTags::Table)
                    .col(pk_id_col(manager, TaskTags::Id))
                    .col(ColumnDef::new(TaskTags::TaskId).big_integer().not_null())
                    .col(ColumnDef::new(TaskTags::TagId).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_task_tags_task_id")
                            .from(TaskTags::Table, TaskTags::TaskId)
                            .to(Tasks::Table, Tasks::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_task_tags_tag_id")
                            .from(TaskTags::Table, TaskTags::TagId)
                            .to(Tags::Table, Tags::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_task_tags_task_id_tag_id")
                    .table(TaskTags::Table)
                    .col(TaskTags::TaskId)
                    .col(TaskTags::TagId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TaskTags::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Tags::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Tasks::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(StudySessions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}

fn pk_id_col<T: Iden>(manager: &SchemaManager, col: T) -> ColumnDef {
    let mut col = ColumnDef::new(col);
    match manager.get_database_backend() {
        DatabaseBackend::Sqlite => {
            col.integer();
        }
        _ => {
            col.big_integer();
        }
    }
    col.not_null().auto_increment().primary_key().to_owned()
}

fn timestamp_col<T: Iden>(col: T) -> ColumnDef {
    ColumnDef::new(col)
        .timestamp()
        .not_null()
        .default(Expr::current_timestamp())
        .to_owned()
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
    Email,
    Username,
    FullName,
    Institution,
    FieldOfStudy,
    DailyGoalHours,
    PreferredFocusMode,
    XpPoints,
    Level,
    CurrentStreak,
    LongestStreak,
    CreatedAt,
    UpdatedAt,
    LastLogin,
}

#[derive(Iden)]
enum Tasks {
    Table,
    Id,
    Title,
    Description,
    DetailedInstructions,
    Priority,
    Status,
    Difficulty,
    EstimatedMinutes,
    ActualMinutes,
    DueDate,
    IsRecurring,
    RecurrenceRule,
    AiGenerated,
    AiFeedback,
    OwnerId,
    ParentTaskId,
    StudySessionId,
    CreatedAt,
    UpdatedAt,
    CompletedAt,
}

#[derive(Iden)]
enum Tags {
    Table,
    Id,
    Name,
    Color,
    UserId,
}

#[derive(Iden)]
enum TaskTags {
    Table,
    Id,
    TaskId,
    TagId,
}

#[derive(Iden)]
enum StudySessions {
    Table,
    Id,
    Title,
    Description,
    ScheduledStart,
    ScheduledEnd,
    ActualStart,
    ActualEnd,
    FocusMode,
    FocusScore,
    UserId,
    CreatedAt,
    UpdatedAt,
}
