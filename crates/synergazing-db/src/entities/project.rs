//! Project entity: the aggregate root built up by the five-stage wizard

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Publication state of a project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "lowercase")]
pub enum ProjectStatus {
    /// Still being set up (stages 1-4)
    #[sea_orm(string_value = "draft")]
    Draft,

    /// Stage 5 completed, visible to everyone
    #[sea_orm(string_value = "published")]
    Published,

    /// Finished project (reserved)
    #[sea_orm(string_value = "completed")]
    Completed,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "projects")]
pub struct Model {
    /// Project UUID (primary key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Owner of the project, immutable after creation
    pub creator_id: Uuid,

    // Stage 1
    pub title: String,
    pub project_type: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub picture_url: Option<String>,

    /// Workflow state
    pub status: ProjectStatus,

    /// Highest wizard stage completed (1..=5), never decreases
    pub completion_stage: i32,

    // Stage 2
    pub duration: Option<String>,
    /// Team size budget shared by seeded members and open role slots
    pub total_team: i32,
    pub start_date: Option<ChronoDateTimeUtc>,
    pub end_date: Option<ChronoDateTimeUtc>,
    pub location: Option<String>,
    pub budget: Option<String>,
    pub registration_deadline: Option<ChronoDateTimeUtc>,

    // Stage 3
    pub time_commitment: Option<String>,

    pub created_at: ChronoDateTimeUtc,
    pub updated_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Project belongs to its creator
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::CreatorId",
        to = "super::user::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Creator,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Creator.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
