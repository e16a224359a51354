use db::models::task::{CreateTask, Task, TaskError, UpdateTask};
use db::types::TaskStatus;
use db::{DatabaseConnection, TransactionTrait};
use serde::Serialize;
use tracing::debug;

use crate::services::ai::AiService;
use crate::services::gamification::{self, Reward};

/// Descriptions shorter than this are not worth a breakdown call.
pub const AI_BREAKDOWN_MIN_DESCRIPTION: usize = 50;
const AI_BREAKDOWN_MAX_LINES: usize = 3;

#[derive(Debug, Clone, Serialize)]
pub struct CompletionOutcome {
    pub task: Task,
    pub xp_awarded: i64,
    pub achievements_unlocked: Vec<String>,
}

/// Task workflows that span the repository, the gamification rules, and the
/// AI enrichment step.
#[derive(Clone)]
pub struct TaskService {
    ai: AiService,
}

impl TaskService {
    pub fn new(ai: AiService) -> Self {
        Self { ai }
    }

    /// Creates the task and its tag links atomically, then tries a
    /// best-effort AI breakdown for substantial descriptions. Enrichment
    /// failure never fails the create.
    pub async fn create(
        &self,
        db: &DatabaseConnection,
        owner_id: &str,
        data: &CreateTask,
    ) -> Result<Task, TaskError> {
        let txn = db.begin().await.map_err(TaskError::Database)?;
        let task = match Task::create(&txn, owner_id, data).await {
            Ok(task) => {
                txn.commit().await.map_err(TaskError::Database)?;
                task
            }
            Err(error) => {
                txn.rollback().await.map_err(TaskError::Database)?;
                return Err(error);
            }
        };

        // The task is committed; enrichment storage failures must not turn
        // a successful create into an error response.
        if let Some(note) = self.breakdown_note(&task).await {
            match Task::set_breakdown_note(db, task.id, &note).await {
                Ok(()) => match Task::find_by_id(db, task.id, owner_id).await {
                    Ok(Some(enriched)) => return Ok(enriched),
                    Ok(None) => {}
                    Err(error) => {
                        debug!(%error, task_id = task.id, "failed to reload enriched task");
                    }
                },
                Err(error) => {
                    debug!(%error, task_id = task.id, "failed to store breakdown note");
                }
            }
        }
        Ok(task)
    }

    async fn breakdown_note(&self, task: &Task) -> Option<String> {
        let description = task.description.as_deref()?;
        if description.chars().count() <= AI_BREAKDOWN_MIN_DESCRIPTION {
            return None;
        }
        match self
            .ai
            .try_breakdown(&task.title, Some(description), task.estimated_minutes)
            .await
        {
            Ok(subtasks) if !subtasks.is_empty() => {
                let note = subtasks
                    .iter()
                    .take(AI_BREAKDOWN_MAX_LINES)
                    .map(|s| format!("- {} ({} min)", s.title, s.estimated_minutes))
                    .collect::<Vec<_>>()
                    .join("\n");
                Some(note)
            }
            Ok(_) => None,
            Err(error) => {
                debug!(%error, task_id = task.id, "skipping AI breakdown");
                None
            }
        }
    }

    /// Marks a task done and computes its reward. Completing a task that is
    /// already done returns it unchanged with no reward.
    pub async fn complete(
        &self,
        db: &DatabaseConnection,
        id: i64,
        owner_id: &str,
        actual_minutes: Option<i32>,
    ) -> Result<CompletionOutcome, TaskError> {
        let existing = Task::find_by_id(db, id, owner_id)
            .await?
            .ok_or(TaskError::NotFound)?;
        if existing.status == TaskStatus::Done {
            return Ok(CompletionOutcome {
                task: existing,
                xp_awarded: 0,
                achievements_unlocked: Vec::new(),
            });
        }
        let task = Task::complete(db, id, owner_id, actual_minutes).await?;
        let completed_count = Task::completed_count(db, owner_id).await?;
        let reward = gamification::compute_reward(&task, completed_count);
        Ok(CompletionOutcome {
            task,
            xp_awarded: reward.xp,
            achievements_unlocked: reward.achievements,
        })
    }

    /// Applies a partial update. A status change into done routes through
    /// the same reward rules as an explicit completion.
    pub async fn update(
        &self,
        db: &DatabaseConnection,
        id: i64,
        owner_id: &str,
        data: &UpdateTask,
    ) -> Result<(Task, Option<Reward>), TaskError> {
        let existing = Task::find_by_id(db, id, owner_id)
            .await?
            .ok_or(TaskError::NotFound)?;
        let becomes_done = existing.status != TaskStatus::Done
            && data.status.as_ref() == Some(&TaskStatus::Done);
        if let Some(next) = &data.status
            && next.rank() < existing.status.rank()
        {
            debug!(
                task_id = id,
                from = %existing.status,
                to = %next,
                "task moved backwards"
            );
        }

        let task = Task::update(db, id, owner_id, data).await?;
        if !becomes_done {
            return Ok((task, None));
        }
        let completed_count = Task::completed_count(db, owner_id).await?;
        let reward = gamification::compute_reward(&task, completed_count);
        Ok((task, Some(reward)))
    }
}
