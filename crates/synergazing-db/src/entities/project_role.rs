//! ProjectRole entity: a recruitable position on a project (stage 4)

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "project_roles")]
pub struct Model {
    /// Role UUID (primary key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Owning project
    pub project_id: Uuid,

    /// Role name, unique within the project
    pub name: String,

    /// Open positions left on this role
    ///
    /// Decremented when a member takes the role through an accepted
    /// application or an invitation, incremented when the slot is released.
    pub slots_available: i32,

    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,

    pub created_at: ChronoDateTimeUtc,
    pub updated_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Role belongs to a project
    #[sea_orm(
        belongs_to = "super::project::Entity",
        from = "Column::ProjectId",
        to = "super::project::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Project,
}

impl Related<super::project::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Project.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
