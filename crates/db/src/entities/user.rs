use sea_orm::entity::prelude::*;

use crate::types::FocusMode;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub email: Option<String>,
    pub username: Option<String>,
    pub full_name: Option<String>,
    pub institution: Option<String>,
    pub field_of_study: Option<String>,
    pub daily_goal_hours: f64,
    pub preferred_focus_mode: FocusMode,
    pub xp_points: i64,
    pub level: i32,
    pub current_streak: i32,
    pub longest_streak: i32,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
    pub last_login: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
