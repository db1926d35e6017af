//! Skills required by a recruitable role

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "project_role_skills")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub project_role_id: Uuid,

    #[sea_orm(primary_key, auto_increment = false)]
    pub skill_id: Uuid,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::project_role::Entity",
        from = "Column::ProjectRoleId",
        to = "super::project_role::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    ProjectRole,

    #[sea_orm(
        belongs_to = "super::skill::Entity",
        from = "Column::SkillId",
        to = "super::skill::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Skill,
}

impl Related<super::project_role::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProjectRole.def()
    }
}

impl Related<super::skill::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Skill.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
