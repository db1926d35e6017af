//! ProjectApplication entity: a user's request to fill a role

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Application state; everything except `Pending` is terminal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    #[sea_orm(string_value = "pending")]
    Pending,

    #[sea_orm(string_value = "accepted")]
    Accepted,

    #[sea_orm(string_value = "rejected")]
    Rejected,

    #[sea_orm(string_value = "withdrawn")]
    Withdrawn,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "project_applications")]
pub struct Model {
    /// Application UUID (primary key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub project_id: Uuid,

    /// Applicant
    pub user_id: Uuid,

    /// Role applied for. Not a foreign key: applications outlive the
    /// stage-4 role replacement.
    pub project_role_id: Uuid,

    pub status: ApplicationStatus,

    #[sea_orm(column_type = "Text")]
    pub why_interested: String,

    #[sea_orm(column_type = "Text")]
    pub skills_experience: String,

    #[sea_orm(column_type = "Text")]
    pub contribution: String,

    pub applied_at: ChronoDateTimeUtc,

    pub reviewed_at: Option<ChronoDateTimeUtc>,

    pub reviewed_by: Option<Uuid>,

    #[sea_orm(column_type = "Text", nullable)]
    pub review_notes: Option<String>,

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

impl ActiveModelBehavior for ActiveModel {}
