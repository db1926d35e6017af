//! ProjectMember entity: a user bound to a project through one role

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Membership state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "lowercase")]
pub enum MemberStatus {
    /// Seeded by the creator or invited, awaiting the user's answer
    #[sea_orm(string_value = "invited")]
    Invited,

    /// Active member
    #[sea_orm(string_value = "accepted")]
    Accepted,

    /// Invitation turned down
    #[sea_orm(string_value = "declined")]
    Declined,
}

impl MemberStatus {
    /// Whether a member in this state occupies team capacity
    pub fn holds_slot(self) -> bool {
        matches!(self, Self::Invited | Self::Accepted)
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "project_members")]
pub struct Model {
    /// Member UUID (primary key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub project_id: Uuid,

    pub user_id: Uuid,

    pub project_role_id: Uuid,

    pub status: MemberStatus,

    /// What the creator expects from this member
    #[sea_orm(column_type = "Text", nullable)]
    pub role_description: Option<String>,

    pub created_at: ChronoDateTimeUtc,
    pub updated_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::project::Entity",
        from = "Column::ProjectId",
        to = "super::project::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Project,

    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    User,

    #[sea_orm(
        belongs_to = "super::project_role::Entity",
        from = "Column::ProjectRoleId",
        to = "super::project_role::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    ProjectRole,
}

impl Related<super::project::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Project.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::project_role::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProjectRole.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
