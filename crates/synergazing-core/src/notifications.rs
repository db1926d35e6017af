//! Stored in-app notifications

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use sea_orm::sea_query::Expr;
use serde::Serialize;
use synergazing_db::entities::{notification, notification::NotificationKind};
use tracing::debug;
use uuid::Uuid;

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

use crate::error::{ServiceError, ServiceResult};
use crate::notify::{NotificationEvent, Notifier, NotifyError};

/// [`Notifier`] that stores each event as a notification row for its recipient
#[derive(Clone)]
pub struct DbNotifier {
    db: DatabaseConnection,
}

impl DbNotifier {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl Notifier for DbNotifier {
    async fn notify(&self, event: &NotificationEvent) -> Result<(), NotifyError> {
        notification::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(event.recipient()),
            project_id: Set(Some(event.project_id())),
            kind: Set(event.kind()),
            title: Set(event.title()),
            message: Set(event.message()),
            is_read: Set(false),
            data: Set(Some(event.data().to_string())),
            created_at: Set(Utc::now()),
        }
        .insert(&self.db)
        .await?;
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct NotificationView {
    pub id: Uuid,
    pub project_id: Option<Uuid>,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub is_read: bool,
    #[cfg_attr(feature = "openapi", schema(value_type = Object))]
    pub data: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

impl From<notification::Model> for NotificationView {
    fn from(model: notification::Model) -> Self {
        Self {
            id: model.id,
            project_id: model.project_id,
            kind: model.kind,
            title: model.title,
            message: model.message,
            is_read: model.is_read,
            data: model
                .data
                .and_then(|raw| serde_json::from_str(&raw).ok()),
            created_at: model.created_at,
        }
    }
}

/// Per-user notification inbox
#[derive(Clone)]
pub struct NotificationService {
    db: DatabaseConnection,
}

impl NotificationService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Newest first
    pub async fn list(&self, user_id: Uuid, unread_only: bool) -> ServiceResult<Vec<NotificationView>> {
        let mut query =
            notification::Entity::find().filter(notification::Column::UserId.eq(user_id));
        if unread_only {
            query = query.filter(notification::Column::IsRead.eq(false));
        }

        Ok(query
            .order_by_desc(notification::Column::CreatedAt)
            .all(&self.db)
            .await?
            .into_iter()
            .map(NotificationView::from)
            .collect())
    }

    pub async fn unread_count(&self, user_id: Uuid) -> ServiceResult<u64> {
        Ok(notification::Entity::find()
            .filter(notification::Column::UserId.eq(user_id))
            .filter(notification::Column::IsRead.eq(false))
            .count(&self.db)
            .await?)
    }

    async fn owned(&self, id: Uuid, user_id: Uuid) -> ServiceResult<notification::Model> {
        notification::Entity::find_by_id(id)
            .filter(notification::Column::UserId.eq(user_id))
            .one(&self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Notification"))
    }

    pub async fn mark_read(&self, id: Uuid, user_id: Uuid) -> ServiceResult<NotificationView> {
        let model = self.owned(id, user_id).await?;
        if model.is_read {
            return Ok(model.into());
        }

        let mut active: notification::ActiveModel = model.into();
        active.is_read = Set(true);
        Ok(active.update(&self.db).await?.into())
    }

    /// Returns how many notifications changed
    pub async fn mark_all_read(&self, user_id: Uuid) -> ServiceResult<u64> {
        let result = notification::Entity::update_many()
            .col_expr(notification::Column::IsRead, Expr::value(true))
            .filter(notification::Column::UserId.eq(user_id))
            .filter(notification::Column::IsRead.eq(false))
            .exec(&self.db)
            .await?;

        debug!(
            "Marked {} notifications read for user {}",
            result.rows_affected, user_id
        );
        Ok(result.rows_affected)
    }

    pub async fn delete(&self, id: Uuid, user_id: Uuid) -> ServiceResult<()> {
        let model = self.owned(id, user_id).await?;
        notification::Entity::delete_by_id(model.id)
            .exec(&self.db)
            .await?;
        Ok(())
    }
}
