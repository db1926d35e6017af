//! Five-stage project wizard
//!
//! Every stage runs in one transaction: the project row is loaded under an
//! exclusive lock, ownership and stage order are checked, input is validated,
//! and only then are rows written. Any error rolls the whole stage back.
//! `completion_stage` only ever moves forward; re-running an earlier stage on
//! a later project keeps its stage and publication status.

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    QueryFilter, QuerySelect, Set, TransactionTrait,
};
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use synergazing_db::entities::{
    benefit, project,
    project::ProjectStatus,
    project_application, project_benefit, project_condition, project_member,
    project_member::MemberStatus,
    project_member_skill, project_required_skill, project_role, project_role_skill, project_tag,
    project_timeline,
    project_timeline::TimelineStatus,
    skill, tag, timeline, user,
};
use tracing::{debug, info};
use uuid::Uuid;

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

use crate::capacity::{check_allocation, TeamCapacity};
use crate::catalog::{catalog_key, find_or_create_all};
use crate::error::{ServiceError, ServiceResult};
use crate::notify::{NotificationEvent, Outbox};
use crate::views::{load_project_view, ProjectView};

/// Highest wizard stage
pub const FINAL_STAGE: i32 = 5;

#[derive(Debug, Clone, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct Stage1Input {
    pub title: String,
    pub project_type: String,
    pub description: String,
    /// Reference returned by the file store, if a picture was uploaded
    pub picture_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct Stage2Input {
    pub duration: Option<String>,
    pub total_team: i32,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub location: Option<String>,
    pub budget: Option<String>,
    pub registration_deadline: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct Stage3Input {
    pub time_commitment: String,
    pub required_skills: Vec<String>,
    #[serde(default)]
    pub conditions: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct RoleInput {
    pub name: String,
    pub slots_available: i32,
    pub description: Option<String>,
    #[serde(default)]
    pub skill_names: Vec<String>,
}

/// A user placed directly on the team by the creator, identified by user name
#[derive(Debug, Clone, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct MemberInput {
    pub name: String,
    pub role_name: String,
    pub role_description: Option<String>,
    #[serde(default)]
    pub skill_names: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct Stage4Input {
    #[serde(default)]
    pub roles: Vec<RoleInput>,
    #[serde(default)]
    pub members: Vec<MemberInput>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct Stage5Input {
    pub benefits: Vec<String>,
    #[serde(default)]
    pub timeline: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

fn required(value: &str, field: &str) -> ServiceResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(ServiceError::validation(format!("{} is required", field)))
    } else {
        Ok(trimmed.to_string())
    }
}

fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Load a project for a stage write: row locked, caller must be the creator,
/// and the previous stage must be complete.
async fn load_for_stage(
    txn: &DatabaseTransaction,
    project_id: Uuid,
    caller: Uuid,
    stage: i32,
) -> ServiceResult<project::Model> {
    let project = load_owned(txn, project_id, caller).await?;

    if project.completion_stage < stage - 1 {
        debug!(
            "Rejected stage {} for project {} at stage {}",
            stage, project_id, project.completion_stage
        );
        return Err(ServiceError::StageSequence {
            stage,
            current: project.completion_stage,
        });
    }

    Ok(project)
}

/// Lock a project row and require `caller` to be its creator
pub(crate) async fn load_owned(
    txn: &DatabaseTransaction,
    project_id: Uuid,
    caller: Uuid,
) -> ServiceResult<project::Model> {
    let project = project::Entity::find_by_id(project_id)
        .lock_exclusive()
        .one(txn)
        .await?
        .ok_or_else(|| ServiceError::not_found("Project"))?;

    if project.creator_id != caller {
        return Err(ServiceError::unauthorized(
            "Only the project creator can modify this project",
        ));
    }

    Ok(project)
}

async fn advance(
    txn: &DatabaseTransaction,
    project: project::Model,
    stage: i32,
    apply: impl FnOnce(&mut project::ActiveModel),
) -> ServiceResult<project::Model> {
    let next_stage = project.completion_stage.max(stage);
    let mut active: project::ActiveModel = project.into();
    apply(&mut active);
    active.completion_stage = Set(next_stage);
    active.updated_at = Set(Utc::now());
    Ok(active.update(txn).await?)
}

/// Drives a project through the five creation stages
#[derive(Clone)]
pub struct ProjectWizard {
    db: DatabaseConnection,
    outbox: Outbox,
}

impl ProjectWizard {
    pub fn new(db: DatabaseConnection, outbox: Outbox) -> Self {
        Self { db, outbox }
    }

    /// Stage 1: create a draft project owned by `creator_id`
    pub async fn create_stage1(
        &self,
        creator_id: Uuid,
        input: Stage1Input,
    ) -> ServiceResult<ProjectView> {
        let title = required(&input.title, "Title")?;
        let project_type = required(&input.project_type, "Project type")?;
        let description = required(&input.description, "Description")?;

        if user::Entity::find_by_id(creator_id)
            .one(&self.db)
            .await?
            .is_none()
        {
            return Err(ServiceError::not_found("User"));
        }

        let now = Utc::now();
        let project = project::ActiveModel {
            id: Set(Uuid::new_v4()),
            creator_id: Set(creator_id),
            title: Set(title),
            project_type: Set(project_type),
            description: Set(description),
            picture_url: Set(optional(input.picture_url)),
            status: Set(ProjectStatus::Draft),
            completion_stage: Set(1),
            duration: Set(None),
            total_team: Set(0),
            start_date: Set(None),
            end_date: Set(None),
            location: Set(None),
            budget: Set(None),
            registration_deadline: Set(None),
            time_commitment: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await?;

        info!("Project {} created by user {}", project.id, creator_id);
        load_project_view(&self.db, project).await
    }

    /// Stage 2: schedule, location, budget, and team size
    pub async fn update_stage2(
        &self,
        project_id: Uuid,
        caller: Uuid,
        input: Stage2Input,
    ) -> ServiceResult<ProjectView> {
        let txn = self.db.begin().await?;
        let project = load_for_stage(&txn, project_id, caller, 2).await?;

        if input.total_team < 1 {
            return Err(ServiceError::validation("Total team must be at least 1"));
        }
        if input.end_date < input.start_date {
            return Err(ServiceError::validation(
                "End date cannot be before start date",
            ));
        }

        // Shrinking the team below what stage 4 already allocated would
        // leave remaining_team negative.
        let roles = project_role::Entity::find()
            .filter(project_role::Column::ProjectId.eq(project.id))
            .all(&txn)
            .await?;
        let members = project_member::Entity::find()
            .filter(project_member::Column::ProjectId.eq(project.id))
            .all(&txn)
            .await?;
        let allocated = TeamCapacity::from_rows(input.total_team, &members, &roles);
        if allocated.is_over_budget() {
            return Err(ServiceError::Capacity(format!(
                "Total team cannot be {}: {} places are already allocated",
                input.total_team,
                allocated.allocated()
            )));
        }

        let project = advance(&txn, project, 2, |active| {
            active.duration = Set(optional(input.duration));
            active.total_team = Set(input.total_team);
            active.start_date = Set(Some(input.start_date));
            active.end_date = Set(Some(input.end_date));
            active.location = Set(optional(input.location));
            active.budget = Set(optional(input.budget));
            active.registration_deadline = Set(Some(input.registration_deadline));
        })
        .await?;

        txn.commit().await?;
        info!("Project {} completed stage 2", project_id);
        load_project_view(&self.db, project).await
    }

    /// Stage 3: time commitment, required skills, and conditions (both replaced wholesale)
    pub async fn update_stage3(
        &self,
        project_id: Uuid,
        caller: Uuid,
        input: Stage3Input,
    ) -> ServiceResult<ProjectView> {
        let txn = self.db.begin().await?;
        let project = load_for_stage(&txn, project_id, caller, 3).await?;

        let time_commitment = required(&input.time_commitment, "Time commitment")?;
        if !input
            .required_skills
            .iter()
            .any(|name| catalog_key(name).is_some())
        {
            return Err(ServiceError::validation(
                "At least one required skill is needed",
            ));
        }

        let skills = find_or_create_all::<skill::Entity, _>(&txn, &input.required_skills).await?;

        project_required_skill::Entity::delete_many()
            .filter(project_required_skill::Column::ProjectId.eq(project.id))
            .exec(&txn)
            .await?;
        for entry in &skills {
            project_required_skill::ActiveModel {
                project_id: Set(project.id),
                skill_id: Set(entry.id),
            }
            .insert(&txn)
            .await?;
        }

        project_condition::Entity::delete_many()
            .filter(project_condition::Column::ProjectId.eq(project.id))
            .exec(&txn)
            .await?;
        let conditions = input
            .conditions
            .iter()
            .map(|c| c.trim())
            .filter(|c| !c.is_empty());
        for (position, description) in conditions.enumerate() {
            project_condition::ActiveModel {
                id: Set(Uuid::new_v4()),
                project_id: Set(project.id),
                position: Set(position as i32),
                description: Set(description.to_string()),
            }
            .insert(&txn)
            .await?;
        }

        let project = advance(&txn, project, 3, |active| {
            active.time_commitment = Set(Some(time_commitment));
        })
        .await?;

        txn.commit().await?;
        info!(
            "Project {} completed stage 3 with {} required skills",
            project_id,
            skills.len()
        );
        load_project_view(&self.db, project).await
    }

    /// Stage 4: replace every role and member of the team
    ///
    /// Seeded members start as `invited` and each receives an invitation
    /// notification once the stage commits.
    pub async fn update_stage4(
        &self,
        project_id: Uuid,
        caller: Uuid,
        input: Stage4Input,
    ) -> ServiceResult<ProjectView> {
        let txn = self.db.begin().await?;
        let project = load_for_stage(&txn, project_id, caller, 4).await?;

        // Validate roles
        let mut role_keys = HashSet::new();
        for role in &input.roles {
            let name = required(&role.name, "Role name")?;
            if role.slots_available < 0 {
                return Err(ServiceError::validation(format!(
                    "Role '{}' cannot have negative slots",
                    name
                )));
            }
            if !role_keys.insert(name.to_lowercase()) {
                return Err(ServiceError::validation(format!(
                    "Role '{}' is listed more than once",
                    name
                )));
            }
        }

        // Resolve members before touching anything
        let mut seeded = Vec::with_capacity(input.members.len());
        let mut seeded_users = HashSet::new();
        for member in &input.members {
            let name = required(&member.name, "Member name")?;
            let role_name = required(&member.role_name, "Member role")?;

            if !role_keys.contains(&role_name.to_lowercase()) {
                return Err(ServiceError::NotFound(format!(
                    "Role '{}' for member '{}' not found",
                    role_name, name
                )));
            }

            let user = user::Entity::find()
                .filter(user::Column::Name.eq(name.as_str()))
                .one(&txn)
                .await?
                .ok_or_else(|| ServiceError::NotFound(format!("User '{}' not found", name)))?;

            if !seeded_users.insert(user.id) {
                return Err(ServiceError::validation(format!(
                    "User '{}' is listed more than once",
                    name
                )));
            }
            seeded.push((user, role_name.to_lowercase(), member));
        }

        let slots: Vec<i32> = input.roles.iter().map(|r| r.slots_available).collect();
        let capacity = check_allocation(project.total_team, seeded.len(), &slots)?;

        // Wholesale replacement of the previous team
        let old_members: Vec<Uuid> = project_member::Entity::find()
            .filter(project_member::Column::ProjectId.eq(project.id))
            .all(&txn)
            .await?
            .into_iter()
            .map(|m| m.id)
            .collect();
        if !old_members.is_empty() {
            project_member_skill::Entity::delete_many()
                .filter(project_member_skill::Column::ProjectMemberId.is_in(old_members))
                .exec(&txn)
                .await?;
        }
        project_member::Entity::delete_many()
            .filter(project_member::Column::ProjectId.eq(project.id))
            .exec(&txn)
            .await?;

        let old_roles: Vec<Uuid> = project_role::Entity::find()
            .filter(project_role::Column::ProjectId.eq(project.id))
            .all(&txn)
            .await?
            .into_iter()
            .map(|r| r.id)
            .collect();
        if !old_roles.is_empty() {
            project_role_skill::Entity::delete_many()
                .filter(project_role_skill::Column::ProjectRoleId.is_in(old_roles))
                .exec(&txn)
                .await?;
        }
        project_role::Entity::delete_many()
            .filter(project_role::Column::ProjectId.eq(project.id))
            .exec(&txn)
            .await?;

        let now = Utc::now();
        let mut roles_by_key: HashMap<String, project_role::Model> = HashMap::new();
        for role in &input.roles {
            let created = project_role::ActiveModel {
                id: Set(Uuid::new_v4()),
                project_id: Set(project.id),
                name: Set(role.name.trim().to_string()),
                slots_available: Set(role.slots_available),
                description: Set(optional(role.description.clone())),
                created_at: Set(now),
                updated_at: Set(now),
            }
            .insert(&txn)
            .await?;

            for entry in find_or_create_all::<skill::Entity, _>(&txn, &role.skill_names).await? {
                project_role_skill::ActiveModel {
                    project_role_id: Set(created.id),
                    skill_id: Set(entry.id),
                }
                .insert(&txn)
                .await?;
            }

            roles_by_key.insert(created.name.to_lowercase(), created);
        }

        let mut events = Vec::with_capacity(seeded.len());
        for (user, role_key, member) in seeded {
            let role = roles_by_key
                .get(&role_key)
                .ok_or_else(|| ServiceError::not_found("Role"))?;

            let created = project_member::ActiveModel {
                id: Set(Uuid::new_v4()),
                project_id: Set(project.id),
                user_id: Set(user.id),
                project_role_id: Set(role.id),
                status: Set(MemberStatus::Invited),
                role_description: Set(optional(member.role_description.clone())),
                created_at: Set(now),
                updated_at: Set(now),
            }
            .insert(&txn)
            .await?;

            for entry in find_or_create_all::<skill::Entity, _>(&txn, &member.skill_names).await?
            {
                project_member_skill::ActiveModel {
                    project_member_id: Set(created.id),
                    skill_id: Set(entry.id),
                }
                .insert(&txn)
                .await?;
            }

            if user.id != project.creator_id {
                events.push(NotificationEvent::InvitationReceived {
                    invitee_id: user.id,
                    project_id: project.id,
                    project_title: project.title.clone(),
                    role_name: role.name.clone(),
                });
            }
        }

        let project = advance(&txn, project, 4, |_| {}).await?;

        txn.commit().await?;
        self.outbox.publish(events);
        info!(
            "Project {} completed stage 4: {} roles, {} seeded members, {} places remaining",
            project_id,
            input.roles.len(),
            capacity.filled_team,
            capacity.remaining_team
        );
        load_project_view(&self.db, project).await
    }

    /// Stage 5: benefits, timeline, and tags; publishes the project
    pub async fn update_stage5(
        &self,
        project_id: Uuid,
        caller: Uuid,
        input: Stage5Input,
    ) -> ServiceResult<ProjectView> {
        let txn = self.db.begin().await?;
        let project = load_for_stage(&txn, project_id, caller, FINAL_STAGE).await?;

        if !input.benefits.iter().any(|name| catalog_key(name).is_some()) {
            return Err(ServiceError::validation("At least one benefit is required"));
        }

        let benefits = find_or_create_all::<benefit::Entity, _>(&txn, &input.benefits).await?;
        project_benefit::Entity::delete_many()
            .filter(project_benefit::Column::ProjectId.eq(project.id))
            .exec(&txn)
            .await?;
        for entry in &benefits {
            project_benefit::ActiveModel {
                project_id: Set(project.id),
                benefit_id: Set(entry.id),
            }
            .insert(&txn)
            .await?;
        }

        let milestones = find_or_create_all::<timeline::Entity, _>(&txn, &input.timeline).await?;
        project_timeline::Entity::delete_many()
            .filter(project_timeline::Column::ProjectId.eq(project.id))
            .exec(&txn)
            .await?;
        for (position, entry) in milestones.iter().enumerate() {
            project_timeline::ActiveModel {
                project_id: Set(project.id),
                timeline_id: Set(entry.id),
                status: Set(TimelineStatus::NotStarted),
                position: Set(position as i32),
            }
            .insert(&txn)
            .await?;
        }

        let tags = find_or_create_all::<tag::Entity, _>(&txn, &input.tags).await?;
        project_tag::Entity::delete_many()
            .filter(project_tag::Column::ProjectId.eq(project.id))
            .exec(&txn)
            .await?;
        for entry in &tags {
            project_tag::ActiveModel {
                project_id: Set(project.id),
                tag_id: Set(entry.id),
            }
            .insert(&txn)
            .await?;
        }

        let project = advance(&txn, project, FINAL_STAGE, |active| {
            active.status = Set(ProjectStatus::Published);
        })
        .await?;

        txn.commit().await?;
        info!("Project {} published", project_id);
        load_project_view(&self.db, project).await
    }

    /// Delete a project and everything it owns
    pub async fn delete_project(&self, project_id: Uuid, caller: Uuid) -> ServiceResult<()> {
        let txn = self.db.begin().await?;
        let project = load_owned(&txn, project_id, caller).await?;

        let member_ids: Vec<Uuid> = project_member::Entity::find()
            .filter(project_member::Column::ProjectId.eq(project.id))
            .all(&txn)
            .await?
            .into_iter()
            .map(|m| m.id)
            .collect();
        if !member_ids.is_empty() {
            project_member_skill::Entity::delete_many()
                .filter(project_member_skill::Column::ProjectMemberId.is_in(member_ids))
                .exec(&txn)
                .await?;
        }
        project_member::Entity::delete_many()
            .filter(project_member::Column::ProjectId.eq(project.id))
            .exec(&txn)
            .await?;

        let role_ids: Vec<Uuid> = project_role::Entity::find()
            .filter(project_role::Column::ProjectId.eq(project.id))
            .all(&txn)
            .await?
            .into_iter()
            .map(|r| r.id)
            .collect();
        if !role_ids.is_empty() {
            project_role_skill::Entity::delete_many()
                .filter(project_role_skill::Column::ProjectRoleId.is_in(role_ids))
                .exec(&txn)
                .await?;
        }
        project_role::Entity::delete_many()
            .filter(project_role::Column::ProjectId.eq(project.id))
            .exec(&txn)
            .await?;

        project_application::Entity::delete_many()
            .filter(project_application::Column::ProjectId.eq(project.id))
            .exec(&txn)
            .await?;
        project_required_skill::Entity::delete_many()
            .filter(project_required_skill::Column::ProjectId.eq(project.id))
            .exec(&txn)
            .await?;
        project_condition::Entity::delete_many()
            .filter(project_condition::Column::ProjectId.eq(project.id))
            .exec(&txn)
            .await?;
        project_tag::Entity::delete_many()
            .filter(project_tag::Column::ProjectId.eq(project.id))
            .exec(&txn)
            .await?;
        project_benefit::Entity::delete_many()
            .filter(project_benefit::Column::ProjectId.eq(project.id))
            .exec(&txn)
            .await?;
        project_timeline::Entity::delete_many()
            .filter(project_timeline::Column::ProjectId.eq(project.id))
            .exec(&txn)
            .await?;

        project::Entity::delete_by_id(project.id).exec(&txn).await?;

        txn.commit().await?;
        info!("Project {} deleted by user {}", project_id, caller);
        Ok(())
    }

    /// Set the progress of one timeline milestone
    pub async fn update_timeline_status(
        &self,
        project_id: Uuid,
        timeline_id: Uuid,
        caller: Uuid,
        status: TimelineStatus,
    ) -> ServiceResult<ProjectView> {
        let txn = self.db.begin().await?;
        let project = load_owned(&txn, project_id, caller).await?;

        let entry = project_timeline::Entity::find_by_id((project.id, timeline_id))
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::not_found("Timeline entry"))?;

        let mut active: project_timeline::ActiveModel = entry.into();
        active.status = Set(status);
        active.update(&txn).await?;

        txn.commit().await?;
        debug!(
            "Timeline {} of project {} set to {:?}",
            timeline_id, project_id, status
        );
        load_project_view(&self.db, project).await
    }
}
