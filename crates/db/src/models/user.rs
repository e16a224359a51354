use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, Set,
};
use serde::{Deserialize, Serialize};

use crate::entities::user;
use crate::types::FocusMode;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
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
    pub created_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateProfile {
    pub username: Option<String>,
    pub full_name: Option<String>,
    pub institution: Option<String>,
    pub field_of_study: Option<String>,
    pub daily_goal_hours: Option<f64>,
    pub preferred_focus_mode: Option<FocusMode>,
}

impl User {
    fn from_model(model: user::Model) -> Self {
        Self {
            id: model.id,
            email: model.email,
            username: model.username,
            full_name: model.full_name,
            institution: model.institution,
            field_of_study: model.field_of_study,
            daily_goal_hours: model.daily_goal_hours,
            preferred_focus_mode: model.preferred_focus_mode,
            xp_points: model.xp_points,
            level: model.level,
            current_streak: model.current_streak,
            longest_streak: model.longest_streak,
            created_at: model.created_at,
            last_login: model.last_login,
        }
    }

    pub async fn find_by_id<C: ConnectionTrait>(db: &C, id: &str) -> Result<Option<Self>, DbErr> {
        let record = user::Entity::find_by_id(id).one(db).await?;
        Ok(record.map(Self::from_model))
    }

    /// Fetches the user row for an authenticated identity, provisioning it on
    /// first sight. Existing rows get `last_login` refreshed.
    pub async fn find_or_create<C: ConnectionTrait>(
        db: &C,
        id: &str,
        email: Option<&str>,
        full_name: Option<&str>,
    ) -> Result<Self, DbErr> {
        if let Some(existing) = user::Entity::find_by_id(id).one(db).await? {
            let mut active: user::ActiveModel = existing.into();
            active.last_login = Set(Some(Utc::now()));
            let updated = active.update(db).await?;
            return Ok(Self::from_model(updated));
        }
        let now = Utc::now();
        let active = user::ActiveModel {
            id: Set(id.to_string()),
            email: Set(email.map(str::to_string)),
            full_name: Set(full_name.map(str::to_string)),
            created_at: Set(now),
            updated_at: Set(now),
            last_login: Set(Some(now)),
            ..Default::default()
        };
        let created = active.insert(db).await?;
        Ok(Self::from_model(created))
    }

    pub async fn update_profile<C: ConnectionTrait>(
        db: &C,
        id: &str,
        data: &UpdateProfile,
    ) -> Result<Option<Self>, DbErr> {
        let Some(existing) = user::Entity::find_by_id(id).one(db).await? else {
            return Ok(None);
        };
        let mut active: user::ActiveModel = existing.into();
        if let Some(username) = &data.username {
            active.username = Set(Some(username.clone()));
        }
        if let Some(full_name) = &data.full_name {
            active.full_name = Set(Some(full_name.clone()));
        }
        if let Some(institution) = &data.institution {
            active.institution = Set(Some(institution.clone()));
        }
        if let Some(field_of_study) = &data.field_of_study {
            active.field_of_study = Set(Some(field_of_study.clone()));
        }
        if let Some(hours) = data.daily_goal_hours {
            active.daily_goal_hours = Set(hours);
        }
        if let Some(mode) = data.preferred_focus_mode {
            active.preferred_focus_mode = Set(mode);
        }
        active.updated_at = Set(Utc::now());
        let updated = active.update(db).await?;
        Ok(Some(Self::from_model(updated)))
    }

    /// Adds earned XP to the running total and recomputes the stored level
    /// (one level per 100 XP, starting at 1).
    pub async fn add_xp<C: ConnectionTrait>(db: &C, id: &str, xp: i64) -> Result<Self, DbErr> {
        let existing = user::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| DbErr::RecordNotFound(format!("user {id} not found")))?;
        let total = existing.xp_points + xp;
        let mut active: user::ActiveModel = existing.into();
        active.xp_points = Set(total);
        active.level = Set((total / 100) as i32 + 1);
        active.updated_at = Set(Utc::now());
        let updated = active.update(db).await?;
        Ok(Self::from_model(updated))
    }

    pub async fn delete<C: ConnectionTrait>(db: &C, id: &str) -> Result<bool, DbErr> {
        let result = user::Entity::delete_many()
            .filter(user::Column::Id.eq(id))
            .exec(db)
            .await?;
        Ok(result.rows_affected > 0)
    }
}
