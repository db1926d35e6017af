//! Timeline milestone attached to a project, with per-project progress

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Progress of a milestone within one project
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum,
)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum TimelineStatus {
    #[default]
    #[sea_orm(string_value = "not-started")]
    #[serde(rename = "not-started")]
    NotStarted,

    #[sea_orm(string_value = "in-progress")]
    #[serde(rename = "in-progress")]
    InProgress,

    #[sea_orm(string_value = "done")]
    #[serde(rename = "done")]
    Done,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "project_timelines")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub project_id: Uuid,

    #[sea_orm(primary_key, auto_increment = false)]
    pub timeline_id: Uuid,

    pub status: TimelineStatus,

    /// Order in which the creator listed the milestone
    pub position: i32,
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
        belongs_to = "super::timeline::Entity",
        from = "Column::TimelineId",
        to = "super::timeline::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Timeline,
}

impl Related<super::project::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Project.def()
    }
}

impl Related<super::timeline::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Timeline.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
