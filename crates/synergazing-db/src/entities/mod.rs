//! Database entities

pub mod benefit;
pub mod notification;
pub mod project;
pub mod project_application;
pub mod project_benefit;
pub mod project_condition;
pub mod project_member;
pub mod project_member_skill;
pub mod project_required_skill;
pub mod project_role;
pub mod project_role_skill;
pub mod project_tag;
pub mod project_timeline;
pub mod skill;
pub mod tag;
pub mod timeline;
pub mod user;
pub mod user_skill;

pub use benefit::Entity as Benefit;
pub use notification::Entity as Notification;
pub use project::Entity as Project;
pub use project_application::Entity as ProjectApplication;
pub use project_benefit::Entity as ProjectBenefit;
pub use project_condition::Entity as ProjectCondition;
pub use project_member::Entity as ProjectMember;
pub use project_member_skill::Entity as ProjectMemberSkill;
pub use project_required_skill::Entity as ProjectRequiredSkill;
pub use project_role::Entity as ProjectRole;
pub use project_role_skill::Entity as ProjectRoleSkill;
pub use project_tag::Entity as ProjectTag;
pub use project_timeline::Entity as ProjectTimeline;
pub use skill::Entity as Skill;
pub use tag::Entity as Tag;
pub use timeline::Entity as Timeline;
pub use user::Entity as User;
pub use user_skill::Entity as UserSkill;

pub mod prelude {
    pub use super::benefit::Entity as Benefit;
    pub use super::notification::Entity as Notification;
    pub use super::project::Entity as Project;
    pub use super::project_application::Entity as ProjectApplication;
    pub use super::project_benefit::Entity as ProjectBenefit;
    pub use super::project_condition::Entity as ProjectCondition;
    pub use super::project_member::Entity as ProjectMember;
    pub use super::project_member_skill::Entity as ProjectMemberSkill;
    pub use super::project_required_skill::Entity as ProjectRequiredSkill;
    pub use super::project_role::Entity as ProjectRole;
    pub use super::project_role_skill::Entity as ProjectRoleSkill;
    pub use super::project_tag::Entity as ProjectTag;
    pub use super::project_timeline::Entity as ProjectTimeline;
    pub use super::skill::Entity as Skill;
    pub use super::tag::Entity as Tag;
    pub use super::timeline::Entity as Timeline;
    pub use super::user::Entity as User;
    pub use super::user_skill::Entity as UserSkill;
}
