use sea_orm::sea_query::{Expr, ExprTrait, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, Set,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::entities::{tag, task_tag};

pub const DEFAULT_TAG_COLOR: &str = "#3B82F6";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tag {
    pub id: i64,
    pub name: String,
    pub color: String,
}

impl Tag {
    fn from_model(model: tag::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            color: model.color,
        }
    }

    /// Maps free-form tag names to tag rows owned by `user_id`, creating any
    /// that do not exist yet. Names are trimmed, empty entries skipped, and
    /// duplicates within one call collapse case-insensitively so the first
    /// spelling wins. Lookup against existing rows is case-insensitive too,
    /// so "Rust" and "rust" resolve to the same row.
    pub async fn resolve<C: ConnectionTrait>(
        db: &C,
        user_id: &str,
        names: &[String],
    ) -> Result<Vec<Self>, DbErr> {
        let mut seen = HashSet::new();
        let mut resolved = Vec::new();
        for raw in names {
            let name = raw.trim();
            if name.is_empty() {
                continue;
            }
            if !seen.insert(name.to_lowercase()) {
                continue;
            }
            let existing = tag::Entity::find()
                .filter(tag::Column::UserId.eq(user_id))
                .filter(
                    Expr::expr(Func::lower(Expr::col(tag::Column::Name))).eq(name.to_lowercase()),
                )
                .one(db)
                .await?;
            let model = match existing {
                Some(model) => model,
                None => {
                    let active = tag::ActiveModel {
                        name: Set(name.to_string()),
                        color: Set(DEFAULT_TAG_COLOR.to_string()),
                        user_id: Set(Some(user_id.to_string())),
                        ..Default::default()
                    };
                    active.insert(db).await?
                }
            };
            resolved.push(Self::from_model(model));
        }
        Ok(resolved)
    }

    pub async fn find_by_task<C: ConnectionTrait>(db: &C, task_id: i64) -> Result<Vec<Self>, DbErr> {
        let links = task_tag::Entity::find()
            .filter(task_tag::Column::TaskId.eq(task_id))
            .all(db)
            .await?;
        let tag_ids: Vec<i64> = links.into_iter().map(|link| link.tag_id).collect();
        if tag_ids.is_empty() {
            return Ok(Vec::new());
        }
        let records = tag::Entity::find()
            .filter(tag::Column::Id.is_in(tag_ids))
            .all(db)
            .await?;
        Ok(records.into_iter().map(Self::from_model).collect())
    }
}

pub struct TaskTag;

impl TaskTag {
    pub async fn associate<C: ConnectionTrait>(
        db: &C,
        task_id: i64,
        tag_ids: &[i64],
    ) -> Result<(), DbErr> {
        let mut seen = HashSet::new();
        for &tag_id in tag_ids {
            if !seen.insert(tag_id) {
                continue;
            }
            let active = task_tag::ActiveModel {
                task_id: Set(task_id),
                tag_id: Set(tag_id),
                ..Default::default()
            };
            active.insert(db).await?;
        }
        Ok(())
    }

    pub async fn delete_by_task<C: ConnectionTrait>(db: &C, task_id: i64) -> Result<(), DbErr> {
        task_tag::Entity::delete_many()
            .filter(task_tag::Column::TaskId.eq(task_id))
            .exec(db)
            .await?;
        Ok(())
    }
}
