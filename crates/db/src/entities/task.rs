use sea_orm::entity::prelude::*;

use crate::types::{Difficulty, TaskPriority, TaskStatus};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "tasks")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub detailed_instructions: Option<String>,
    pub priority: TaskPriority,
    pub status: TaskStatus,
    pub difficulty: Difficulty,
    pub estimated_minutes: Option<i32>,
    pub actual_minutes: Option<i32>,
    pub due_date: Option<Date>,
    pub is_recurring: bool,
    pub recurrence_rule: Option<String>,
    pub ai_generated: bool,
    pub ai_feedback: Option<String>,
    pub owner_id: String,
    pub parent_task_id: Option<i64>,
    pub study_session_id: Option<i64>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
    pub completed_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
