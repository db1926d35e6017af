//! Notification entity for in-app user notifications

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// What happened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// Someone applied to one of the recipient's projects
    #[sea_orm(string_value = "user_registered")]
    UserRegistered,

    #[sea_orm(string_value = "user_accepted")]
    UserAccepted,

    #[sea_orm(string_value = "user_rejected")]
    UserRejected,

    #[sea_orm(string_value = "invitation_received")]
    InvitationReceived,

    #[sea_orm(string_value = "role_assigned")]
    RoleAssigned,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "notifications")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Recipient
    pub user_id: Uuid,

    /// Project the notification is about, if any. Kept after the project
    /// is deleted.
    pub project_id: Option<Uuid>,

    pub kind: NotificationKind,

    pub title: String,

    #[sea_orm(column_type = "Text")]
    pub message: String,

    pub is_read: bool,

    /// Extra structured payload (JSON text)
    #[sea_orm(column_type = "Text", nullable)]
    pub data: Option<String>,

    pub created_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
