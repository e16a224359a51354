use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::sea_query::Condition;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::entities::task;
use crate::models::tag::{Tag, TaskTag};
use crate::types::{Difficulty, TaskPriority, TaskStatus};

pub const TITLE_MAX_LEN: usize = 255;

#[derive(Debug, Error)]
pub enum TaskError {
    #[error(transparent)]
    Database(#[from] DbErr),
    #[error("task not found")]
    NotFound,
    #[error("{0}")]
    Validation(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub detailed_instructions: Option<String>,
    pub priority: TaskPriority,
    pub status: TaskStatus,
    pub difficulty: Difficulty,
    pub estimated_minutes: Option<i32>,
    pub actual_minutes: Option<i32>,
    pub due_date: Option<NaiveDate>,
    pub is_recurring: bool,
    pub recurrence_rule: Option<String>,
    pub ai_generated: bool,
    pub ai_feedback: Option<String>,
    pub parent_task_id: Option<i64>,
    pub study_session_id: Option<i64>,
    pub tags: Vec<Tag>,
    pub is_completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateTask {
    pub title: String,
    pub description: Option<String>,
    #[serde(default)]
    pub priority: TaskPriority,
    #[serde(default)]
    pub difficulty: Difficulty,
    pub estimated_minutes: Option<i32>,
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub is_recurring: bool,
    pub recurrence_rule: Option<String>,
    pub parent_task_id: Option<i64>,
    pub study_session_id: Option<i64>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Partial update where an absent field means "leave alone" and an explicit
/// `null` means "clear". Nullable columns use the double-`Option` pattern to
/// tell the two apart.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct UpdateTask {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    pub priority: Option<TaskPriority>,
    pub status: Option<TaskStatus>,
    pub difficulty: Option<Difficulty>,
    #[serde(default, deserialize_with = "double_option")]
    pub estimated_minutes: Option<Option<i32>>,
    #[serde(default, deserialize_with = "double_option")]
    pub actual_minutes: Option<Option<i32>>,
    #[serde(default, deserialize_with = "double_option")]
    pub due_date: Option<Option<NaiveDate>>,
    pub is_recurring: Option<bool>,
    #[serde(default, deserialize_with = "double_option")]
    pub recurrence_rule: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub ai_feedback: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub parent_task_id: Option<Option<i64>>,
    #[serde(default, deserialize_with = "double_option")]
    pub study_session_id: Option<Option<i64>>,
    pub tags: Option<Vec<String>>,
}

fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct TaskFilter {
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub search: Option<String>,
}

impl Task {
    async fn from_model<C: ConnectionTrait>(db: &C, model: task::Model) -> Result<Self, DbErr> {
        let tags = Tag::find_by_task(db, model.id).await?;
        Ok(Self {
            id: model.id,
            title: model.title,
            description: model.description,
            detailed_instructions: model.detailed_instructions,
            priority: model.priority,
            status: model.status.clone(),
            difficulty: model.difficulty,
            estimated_minutes: model.estimated_minutes,
            actual_minutes: model.actual_minutes,
            due_date: model.due_date,
            is_recurring: model.is_recurring,
            recurrence_rule: model.recurrence_rule,
            ai_generated: model.ai_generated,
            ai_feedback: model.ai_feedback,
            parent_task_id: model.parent_task_id,
            study_session_id: model.study_session_id,
            tags,
            is_completed: model.status == TaskStatus::Done,
            created_at: model.created_at,
            updated_at: model.updated_at,
            completed_at: model.completed_at,
        })
    }

    fn validate_title(title: &str) -> Result<String, TaskError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(TaskError::Validation("title must not be empty".into()));
        }
        if title.chars().count() > TITLE_MAX_LEN {
            return Err(TaskError::Validation(format!(
                "title must be at most {TITLE_MAX_LEN} characters"
            )));
        }
        Ok(title.to_string())
    }

    fn validate_minutes(minutes: Option<i32>, field: &str) -> Result<(), TaskError> {
        if let Some(m) = minutes
            && m <= 0
        {
            return Err(TaskError::Validation(format!("{field} must be positive")));
        }
        Ok(())
    }

    async fn find_owned_model<C: ConnectionTrait>(
        db: &C,
        id: i64,
        owner_id: &str,
    ) -> Result<Option<task::Model>, DbErr> {
        task::Entity::find_by_id(id)
            .filter(task::Column::OwnerId.eq(owner_id))
            .one(db)
            .await
    }

    /// Rejects a parent assignment that is missing, owned by someone else,
    /// or would make the subtask graph cyclic.
    async fn validate_parent<C: ConnectionTrait>(
        db: &C,
        task_id: Option<i64>,
        parent_id: i64,
        owner_id: &str,
    ) -> Result<(), TaskError> {
        if task_id == Some(parent_id) {
            return Err(TaskError::Validation("task cannot be its own parent".into()));
        }
        let mut current = Self::find_owned_model(db, parent_id, owner_id)
            .await?
            .ok_or_else(|| TaskError::Validation("parent task not found".into()))?;
        while let Some(ancestor_id) = current.parent_task_id {
            if task_id == Some(ancestor_id) {
                return Err(TaskError::Validation(
                    "parent assignment would create a cycle".into(),
                ));
            }
            match Self::find_owned_model(db, ancestor_id, owner_id).await? {
                Some(model) => current = model,
                None => break,
            }
        }
        Ok(())
    }

    pub async fn create<C: ConnectionTrait>(
        db: &C,
        owner_id: &str,
        data: &CreateTask,
    ) -> Result<Self, TaskError> {
        let title = Self::validate_title(&data.title)?;
        Self::validate_minutes(data.estimated_minutes, "estimated_minutes")?;
        if let Some(parent_id) = data.parent_task_id {
            Self::validate_parent(db, None, parent_id, owner_id).await?;
        }
        let now = Utc::now();
        let active = task::ActiveModel {
            title: Set(title),
            description: Set(data.description.clone()),
            priority: Set(data.priority),
            status: Set(TaskStatus::Todo),
            difficulty: Set(data.difficulty),
            estimated_minutes: Set(data.estimated_minutes),
            due_date: Set(data.due_date),
            is_recurring: Set(data.is_recurring),
            recurrence_rule: Set(data.recurrence_rule.clone()),
            owner_id: Set(owner_id.to_string()),
            parent_task_id: Set(data.parent_task_id),
            study_session_id: Set(data.study_session_id),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        let created = active.insert(db).await?;
        let tags = Tag::resolve(db, owner_id, &data.tags).await?;
        let tag_ids: Vec<i64> = tags.iter().map(|t| t.id).collect();
        TaskTag::associate(db, created.id, &tag_ids).await?;
        Ok(Self::from_model(db, created).await?)
    }

    pub async fn find_by_id<C: ConnectionTrait>(
        db: &C,
        id: i64,
        owner_id: &str,
    ) -> Result<Option<Self>, DbErr> {
        match Self::find_owned_model(db, id, owner_id).await? {
            Some(model) => Ok(Some(Self::from_model(db, model).await?)),
            None => Ok(None),
        }
    }

    /// Filtered page of the owner's tasks plus the total count of the
    /// filtered set. Text search matches title or description.
    pub async fn search<C: ConnectionTrait>(
        db: &C,
        owner_id: &str,
        filter: &TaskFilter,
        skip: u64,
        limit: u64,
    ) -> Result<(Vec<Self>, u64), DbErr> {
        let mut query = task::Entity::find().filter(task::Column::OwnerId.eq(owner_id));
        if let Some(status) = &filter.status {
            query = query.filter(task::Column::Status.eq(status.clone()));
        }
        if let Some(priority) = filter.priority {
            query = query.filter(task::Column::Priority.eq(priority));
        }
        if let Some(needle) = filter.search.as_deref().map(str::trim)
            && !needle.is_empty()
        {
            query = query.filter(
                Condition::any()
                    .add(task::Column::Title.contains(needle))
                    .add(task::Column::Description.contains(needle)),
            );
        }
        let total = query.clone().count(db).await?;
        let records = query
            .order_by_desc(task::Column::DueDate)
            .order_by_desc(task::Column::Priority)
            .order_by_asc(task::Column::Id)
            .offset(skip)
            .limit(limit)
            .all(db)
            .await?;
        let mut tasks = Vec::with_capacity(records.len());
        for model in records {
            tasks.push(Self::from_model(db, model).await?);
        }
        Ok((tasks, total))
    }

    pub async fn update<C: ConnectionTrait>(
        db: &C,
        id: i64,
        owner_id: &str,
        data: &UpdateTask,
    ) -> Result<Self, TaskError> {
        let existing = Self::find_owned_model(db, id, owner_id)
            .await?
            .ok_or(TaskError::NotFound)?;
        let was_done = existing.status == TaskStatus::Done;
        let mut active: task::ActiveModel = existing.into();

        if let Some(title) = &data.title {
            active.title = Set(Self::validate_title(title)?);
        }
        if let Some(description) = &data.description {
            active.description = Set(description.clone());
        }
        if let Some(priority) = data.priority {
            active.priority = Set(priority);
        }
        if let Some(difficulty) = data.difficulty {
            active.difficulty = Set(difficulty);
        }
        if let Some(estimated) = data.estimated_minutes {
            Self::validate_minutes(estimated, "estimated_minutes")?;
            active.estimated_minutes = Set(estimated);
        }
        if let Some(actual) = data.actual_minutes {
            Self::validate_minutes(actual, "actual_minutes")?;
            active.actual_minutes = Set(actual);
        }
        if let Some(due_date) = data.due_date {
            active.due_date = Set(due_date);
        }
        if let Some(is_recurring) = data.is_recurring {
            active.is_recurring = Set(is_recurring);
        }
        if let Some(rule) = &data.recurrence_rule {
            active.recurrence_rule = Set(rule.clone());
        }
        if let Some(feedback) = &data.ai_feedback {
            active.ai_feedback = Set(feedback.clone());
        }
        if let Some(parent) = data.parent_task_id {
            if let Some(parent_id) = parent {
                Self::validate_parent(db, Some(id), parent_id, owner_id).await?;
            }
            active.parent_task_id = Set(parent);
        }
        if let Some(session) = data.study_session_id {
            active.study_session_id = Set(session);
        }
        if let Some(status) = &data.status {
            active.status = Set(status.clone());
            match (was_done, status == &TaskStatus::Done) {
                (false, true) => active.completed_at = Set(Some(Utc::now())),
                (true, false) => active.completed_at = Set(None),
                _ => {}
            }
        }
        active.updated_at = Set(Utc::now());
        let updated = active.update(db).await?;

        if let Some(names) = &data.tags {
            TaskTag::delete_by_task(db, id).await?;
            let tags = Tag::resolve(db, owner_id, names).await?;
            let tag_ids: Vec<i64> = tags.iter().map(|t| t.id).collect();
            TaskTag::associate(db, id, &tag_ids).await?;
        }
        Ok(Self::from_model(db, updated).await?)
    }

    /// Marks the task done, stamping `completed_at` and recording actual
    /// time spent. Completing an already-done task changes nothing.
    pub async fn complete<C: ConnectionTrait>(
        db: &C,
        id: i64,
        owner_id: &str,
        actual_minutes: Option<i32>,
    ) -> Result<Self, TaskError> {
        Self::validate_minutes(actual_minutes, "actual_minutes")?;
        let existing = Self::find_owned_model(db, id, owner_id)
            .await?
            .ok_or(TaskError::NotFound)?;
        if existing.status == TaskStatus::Done {
            return Ok(Self::from_model(db, existing).await?);
        }
        let mut active: task::ActiveModel = existing.into();
        active.status = Set(TaskStatus::Done);
        active.completed_at = Set(Some(Utc::now()));
        if actual_minutes.is_some() {
            active.actual_minutes = Set(actual_minutes);
        }
        active.updated_at = Set(Utc::now());
        let updated = active.update(db).await?;
        Ok(Self::from_model(db, updated).await?)
    }

    /// Deletes the task. Subtasks and tag links go with it via FK cascade.
    pub async fn delete<C: ConnectionTrait>(
        db: &C,
        id: i64,
        owner_id: &str,
    ) -> Result<bool, DbErr> {
        let result = task::Entity::delete_many()
            .filter(task::Column::Id.eq(id))
            .filter(task::Column::OwnerId.eq(owner_id))
            .exec(db)
            .await?;
        Ok(result.rows_affected > 0)
    }

    pub async fn find_overdue<C: ConnectionTrait>(
        db: &C,
        owner_id: &str,
    ) -> Result<Vec<Self>, DbErr> {
        let today = Utc::now().date_naive();
        let records = task::Entity::find()
            .filter(task::Column::OwnerId.eq(owner_id))
            .filter(task::Column::DueDate.lt(today))
            .filter(task::Column::Status.ne(TaskStatus::Done))
            .order_by_asc(task::Column::DueDate)
            .all(db)
            .await?;
        let mut tasks = Vec::with_capacity(records.len());
        for model in records {
            tasks.push(Self::from_model(db, model).await?);
        }
        Ok(tasks)
    }

    pub async fn find_by_priority<C: ConnectionTrait>(
        db: &C,
        owner_id: &str,
        priority: TaskPriority,
    ) -> Result<Vec<Self>, DbErr> {
        let records = task::Entity::find()
            .filter(task::Column::OwnerId.eq(owner_id))
            .filter(task::Column::Priority.eq(priority))
            .filter(task::Column::Status.ne(TaskStatus::Done))
            .order_by_asc(task::Column::DueDate)
            .all(db)
            .await?;
        let mut tasks = Vec::with_capacity(records.len());
        for model in records {
            tasks.push(Self::from_model(db, model).await?);
        }
        Ok(tasks)
    }

    pub async fn completed_count<C: ConnectionTrait>(
        db: &C,
        owner_id: &str,
    ) -> Result<u64, DbErr> {
        task::Entity::find()
            .filter(task::Column::OwnerId.eq(owner_id))
            .filter(task::Column::Status.eq(TaskStatus::Done))
            .count(db)
            .await
    }

    /// Attaches an AI-produced breakdown note and flags the task as
    /// AI-enriched.
    pub async fn set_breakdown_note<C: ConnectionTrait>(
        db: &C,
        id: i64,
        note: &str,
    ) -> Result<(), DbErr> {
        let Some(existing) = task::Entity::find_by_id(id).one(db).await? else {
            return Ok(());
        };
        let mut active: task::ActiveModel = existing.into();
        active.detailed_instructions = Set(Some(note.to_string()));
        active.ai_generated = Set(true);
        active.updated_at = Set(Utc::now());
        active.update(db).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DbService;
    use crate::models::user::User;
    use serde_json::json;

    async fn setup() -> DbService {
        let db = DbService::new_in_memory().await.unwrap();
        User::find_or_create(&db.conn, "u1", None, None).await.unwrap();
        User::find_or_create(&db.conn, "u2", None, None).await.unwrap();
        db
    }

    fn create_payload(title: &str) -> CreateTask {
        CreateTask {
            title: title.to_string(),
            description: None,
            priority: TaskPriority::Medium,
            difficulty: Difficulty::Medium,
            estimated_minutes: None,
            due_date: None,
            is_recurring: false,
            recurrence_rule: None,
            parent_task_id: None,
            study_session_id: None,
            tags: Vec::new(),
        }
    }

    #[tokio::test]
    async fn create_rejects_blank_and_oversized_titles() {
        let db = setup().await;
        let err = Task::create(&db.conn, "u1", &create_payload("   "))
            .await
            .unwrap_err();
        assert!(matches!(err, TaskError::Validation(_)));
        let long = "x".repeat(TITLE_MAX_LEN + 1);
        let err = Task::create(&db.conn, "u1", &create_payload(&long))
            .await
            .unwrap_err();
        assert!(matches!(err, TaskError::Validation(_)));
    }

    #[tokio::test]
    async fn pagination_pages_are_disjoint_and_total_is_stable() {
        let db = setup().await;
        for i in 0..5 {
            Task::create(&db.conn, "u1", &create_payload(&format!("task {i}")))
                .await
                .unwrap();
        }
        let filter = TaskFilter::default();
        let (page1, total1) = Task::search(&db.conn, "u1", &filter, 0, 2).await.unwrap();
        let (page2, total2) = Task::search(&db.conn, "u1", &filter, 2, 2).await.unwrap();
        assert_eq!(total1, 5);
        assert_eq!(total2, 5);
        let ids1: Vec<i64> = page1.iter().map(|t| t.id).collect();
        assert!(page2.iter().all(|t| !ids1.contains(&t.id)));
    }

    #[tokio::test]
    async fn tasks_are_invisible_to_other_owners() {
        let db = setup().await;
        let task = Task::create(&db.conn, "u1", &create_payload("secret"))
            .await
            .unwrap();
        assert!(Task::find_by_id(&db.conn, task.id, "u2").await.unwrap().is_none());
        assert!(!Task::delete(&db.conn, task.id, "u2").await.unwrap());
        let (page, total) = Task::search(&db.conn, "u2", &TaskFilter::default(), 0, 50)
            .await
            .unwrap();
        assert!(page.is_empty());
        assert_eq!(total, 0);
    }

    #[tokio::test]
    async fn completed_at_tracks_done_status() {
        let db = setup().await;
        let task = Task::create(&db.conn, "u1", &create_payload("finish me"))
            .await
            .unwrap();
        assert!(task.completed_at.is_none());
        let done = Task::complete(&db.conn, task.id, "u1", Some(30)).await.unwrap();
        assert!(done.completed_at.is_some());
        assert_eq!(done.actual_minutes, Some(30));
        let reopened = Task::update(
            &db.conn,
            task.id,
            "u1",
            &UpdateTask {
                status: Some(TaskStatus::Todo),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert!(reopened.completed_at.is_none());
        assert!(!reopened.is_completed);
    }

    #[tokio::test]
    async fn complete_is_idempotent_on_timestamps() {
        let db = setup().await;
        let task = Task::create(&db.conn, "u1", &create_payload("once"))
            .await
            .unwrap();
        let first = Task::complete(&db.conn, task.id, "u1", None).await.unwrap();
        let second = Task::complete(&db.conn, task.id, "u1", Some(99)).await.unwrap();
        assert_eq!(first.completed_at, second.completed_at);
        assert_eq!(second.actual_minutes, None);
    }

    #[tokio::test]
    async fn update_distinguishes_null_from_absent() {
        let db = setup().await;
        let mut payload = create_payload("desc");
        payload.description = Some("keep or clear".to_string());
        payload.estimated_minutes = Some(45);
        let task = Task::create(&db.conn, "u1", &payload).await.unwrap();

        let absent: UpdateTask = serde_json::from_value(json!({"title": "renamed"})).unwrap();
        let updated = Task::update(&db.conn, task.id, "u1", &absent).await.unwrap();
        assert_eq!(updated.description.as_deref(), Some("keep or clear"));
        assert_eq!(updated.estimated_minutes, Some(45));

        let nulled: UpdateTask = serde_json::from_value(json!({"description": null})).unwrap();
        let updated = Task::update(&db.conn, task.id, "u1", &nulled).await.unwrap();
        assert!(updated.description.is_none());
        assert_eq!(updated.estimated_minutes, Some(45));
    }

    #[tokio::test]
    async fn parent_must_exist_and_cycles_are_rejected() {
        let db = setup().await;
        let mut orphan = create_payload("orphan");
        orphan.parent_task_id = Some(9999);
        assert!(matches!(
            Task::create(&db.conn, "u1", &orphan).await,
            Err(TaskError::Validation(_))
        ));

        let parent = Task::create(&db.conn, "u1", &create_payload("parent"))
            .await
            .unwrap();
        let mut child_payload = create_payload("child");
        child_payload.parent_task_id = Some(parent.id);
        let child = Task::create(&db.conn, "u1", &child_payload).await.unwrap();

        let cycle = UpdateTask {
            parent_task_id: Some(Some(child.id)),
            ..Default::default()
        };
        assert!(matches!(
            Task::update(&db.conn, parent.id, "u1", &cycle).await,
            Err(TaskError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn deleting_a_parent_cascades_to_subtasks() {
        let db = setup().await;
        let parent = Task::create(&db.conn, "u1", &create_payload("parent"))
            .await
            .unwrap();
        let mut child_payload = create_payload("child");
        child_payload.parent_task_id = Some(parent.id);
        let child = Task::create(&db.conn, "u1", &child_payload).await.unwrap();

        assert!(Task::delete(&db.conn, parent.id, "u1").await.unwrap());
        assert!(Task::find_by_id(&db.conn, child.id, "u1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn breakdown_note_on_missing_task_is_a_no_op() {
        let db = setup().await;
        assert!(Task::set_breakdown_note(&db.conn, 404, "- step (5 min)")
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn search_matches_title_or_description() {
        let db = setup().await;
        let mut a = create_payload("Linear algebra notes");
        a.tags = vec!["math".to_string()];
        Task::create(&db.conn, "u1", &a).await.unwrap();
        let mut b = create_payload("Essay draft");
        b.description = Some("cover algebra of sets".to_string());
        Task::create(&db.conn, "u1", &b).await.unwrap();
        Task::create(&db.conn, "u1", &create_payload("Chemistry lab"))
            .await
            .unwrap();

        let filter = TaskFilter {
            search: Some("algebra".to_string()),
            ..Default::default()
        };
        let (hits, total) = Task::search(&db.conn, "u1", &filter, 0, 50).await.unwrap();
        assert_eq!(total, 2);
        assert_eq!(hits.len(), 2);
    }

    #[tokio::test]
    async fn update_stores_and_clears_ai_feedback() {
        let db = setup().await;
        let task = Task::create(&db.conn, "u1", &create_payload("review me"))
            .await
            .unwrap();
        assert!(task.ai_feedback.is_none());

        let patch: UpdateTask =
            serde_json::from_value(json!({"ai_feedback": "split this into two tasks"})).unwrap();
        let updated = Task::update(&db.conn, task.id, "u1", &patch).await.unwrap();
        assert_eq!(
            updated.ai_feedback.as_deref(),
            Some("split this into two tasks")
        );

        let absent: UpdateTask = serde_json::from_value(json!({"title": "renamed"})).unwrap();
        let updated = Task::update(&db.conn, task.id, "u1", &absent).await.unwrap();
        assert_eq!(
            updated.ai_feedback.as_deref(),
            Some("split this into two tasks")
        );

        let cleared: UpdateTask = serde_json::from_value(json!({"ai_feedback": null})).unwrap();
        let updated = Task::update(&db.conn, task.id, "u1", &cleared).await.unwrap();
        assert!(updated.ai_feedback.is_none());
    }

    #[tokio::test]
    async fn overdue_requires_past_due_date_and_open_status() {
        let db = setup().await;
        let today = Utc::now().date_naive();
        let yesterday = today.pred_opt().unwrap();

        let mut due_yesterday = create_payload("late");
        due_yesterday.due_date = Some(yesterday);
        let late = Task::create(&db.conn, "u1", &due_yesterday).await.unwrap();

        let mut due_today = create_payload("due today");
        due_today.due_date = Some(today);
        Task::create(&db.conn, "u1", &due_today).await.unwrap();

        let mut done_late = create_payload("late but done");
        done_late.due_date = Some(yesterday);
        let done = Task::create(&db.conn, "u1", &done_late).await.unwrap();
        Task::complete(&db.conn, done.id, "u1", None).await.unwrap();

        Task::create(&db.conn, "u1", &create_payload("no due date"))
            .await
            .unwrap();

        let overdue = Task::find_overdue(&db.conn, "u1").await.unwrap();
        let ids: Vec<i64> = overdue.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![late.id]);
    }

    #[tokio::test]
    async fn priority_view_excludes_done_and_orders_by_due_date() {
        let db = setup().await;
        let today = Utc::now().date_naive();

        let mut later = create_payload("later");
        later.priority = TaskPriority::High;
        later.due_date = today.checked_add_days(chrono::Days::new(7));
        let later = Task::create(&db.conn, "u1", &later).await.unwrap();

        let mut sooner = create_payload("sooner");
        sooner.priority = TaskPriority::High;
        sooner.due_date = today.checked_add_days(chrono::Days::new(1));
        let sooner = Task::create(&db.conn, "u1", &sooner).await.unwrap();

        let mut finished = create_payload("finished");
        finished.priority = TaskPriority::High;
        let finished = Task::create(&db.conn, "u1", &finished).await.unwrap();
        Task::complete(&db.conn, finished.id, "u1", None).await.unwrap();

        let mut low = create_payload("low");
        low.priority = TaskPriority::Low;
        Task::create(&db.conn, "u1", &low).await.unwrap();

        let high = Task::find_by_priority(&db.conn, "u1", TaskPriority::High)
            .await
            .unwrap();
        let ids: Vec<i64> = high.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![sooner.id, later.id]);
    }

    #[tokio::test]
    async fn update_replaces_tag_set() {
        let db = setup().await;
        let mut payload = create_payload("tagged");
        payload.tags = vec!["alpha".to_string(), "beta".to_string()];
        let task = Task::create(&db.conn, "u1", &payload).await.unwrap();
        assert_eq!(task.tags.len(), 2);

        let patch = UpdateTask {
            tags: Some(vec!["Beta".to_string(), "gamma".to_string()]),
            ..Default::default()
        };
        let updated = Task::update(&db.conn, task.id, "u1", &patch).await.unwrap();
        let mut names: Vec<&str> = updated.tags.iter().map(|t| t.name.as_str()).collect();
        names.sort();
        assert_eq!(names, vec!["beta", "gamma"]);
    }
}
