use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Set,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::entities::study_session;
use crate::types::FocusMode;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Database(#[from] DbErr),
    #[error("study session not found")]
    NotFound,
    #[error("{0}")]
    Validation(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudySession {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub scheduled_start: DateTime<Utc>,
    pub scheduled_end: DateTime<Utc>,
    pub actual_start: Option<DateTime<Utc>>,
    pub actual_end: Option<DateTime<Utc>>,
    pub focus_mode: FocusMode,
    pub focus_score: Option<f64>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreateStudySession {
    pub title: String,
    pub description: Option<String>,
    pub scheduled_start: DateTime<Utc>,
    pub scheduled_end: DateTime<Utc>,
    #[serde(default)]
    pub focus_mode: FocusMode,
}

impl StudySession {
    fn from_model(model: study_session::Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            description: model.description,
            scheduled_start: model.scheduled_start,
            scheduled_end: model.scheduled_end,
            actual_start: model.actual_start,
            actual_end: model.actual_end,
            focus_mode: model.focus_mode,
            focus_score: model.focus_score,
            created_at: model.created_at,
        }
    }

    pub async fn create<C: ConnectionTrait>(
        db: &C,
        user_id: &str,
        data: &CreateStudySession,
    ) -> Result<Self, SessionError> {
        if data.title.trim().is_empty() {
            return Err(SessionError::Validation("title must not be empty".into()));
        }
        if data.scheduled_end <= data.scheduled_start {
            return Err(SessionError::Validation(
                "scheduled_end must be after scheduled_start".into(),
            ));
        }
        let now = Utc::now();
        let active = study_session::ActiveModel {
            title: Set(data.title.trim().to_string()),
            description: Set(data.description.clone()),
            scheduled_start: Set(data.scheduled_start),
            scheduled_end: Set(data.scheduled_end),
            focus_mode: Set(data.focus_mode),
            user_id: Set(user_id.to_string()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        let created = active.insert(db).await?;
        Ok(Self::from_model(created))
    }

    pub async fn find_by_id<C: ConnectionTrait>(
        db: &C,
        id: i64,
        user_id: &str,
    ) -> Result<Option<Self>, DbErr> {
        let record = study_session::Entity::find_by_id(id)
            .filter(study_session::Column::UserId.eq(user_id))
            .one(db)
            .await?;
        Ok(record.map(Self::from_model))
    }

    pub async fn find_by_user<C: ConnectionTrait>(
        db: &C,
        user_id: &str,
    ) -> Result<Vec<Self>, DbErr> {
        let records = study_session::Entity::find()
            .filter(study_session::Column::UserId.eq(user_id))
            .order_by_desc(study_session::Column::ScheduledStart)
            .all(db)
            .await?;
        Ok(records.into_iter().map(Self::from_model).collect())
    }

    pub async fn start<C: ConnectionTrait>(
        db: &C,
        id: i64,
        user_id: &str,
    ) -> Result<Self, SessionError> {
        let record = study_session::Entity::find_by_id(id)
            .filter(study_session::Column::UserId.eq(user_id))
            .one(db)
            .await?
            .ok_or(SessionError::NotFound)?;
        let mut active: study_session::ActiveModel = record.into();
        active.actual_start = Set(Some(Utc::now()));
        active.updated_at = Set(Utc::now());
        let updated = active.update(db).await?;
        Ok(Self::from_model(updated))
    }

    /// Closes out a session: stamps `actual_end` and scores focus as the
    /// fraction of the scheduled window actually spent, capped at 1.0.
    /// A session never started counts from its scheduled start.
    pub async fn finish<C: ConnectionTrait>(
        db: &C,
        id: i64,
        user_id: &str,
    ) -> Result<Self, SessionError> {
        let record = study_session::Entity::find_by_id(id)
            .filter(study_session::Column::UserId.eq(user_id))
            .one(db)
            .await?
            .ok_or(SessionError::NotFound)?;
        let now = Utc::now();
        let started = record.actual_start.unwrap_or(record.scheduled_start);
        let scheduled_secs = (record.scheduled_end - record.scheduled_start).num_seconds().max(1);
        let actual_secs = (now - started).num_seconds().max(0);
        let score = (actual_secs as f64 / scheduled_secs as f64).min(1.0);
        let mut active: study_session::ActiveModel = record.into();
        active.actual_start = Set(Some(started));
        active.actual_end = Set(Some(now));
        active.focus_score = Set(Some(score));
        active.updated_at = Set(now);
        let updated = active.update(db).await?;
        Ok(Self::from_model(updated))
    }

    pub async fn delete<C: ConnectionTrait>(
        db: &C,
        id: i64,
        user_id: &str,
    ) -> Result<bool, DbErr> {
        let result = study_session::Entity::delete_many()
            .filter(study_session::Column::Id.eq(id))
            .filter(study_session::Column::UserId.eq(user_id))
            .exec(db)
            .await?;
        Ok(result.rows_affected > 0)
    }
}
