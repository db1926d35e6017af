//! Application and invitation lifecycle
//!
//! Applications: `pending -> accepted | rejected | withdrawn`, all terminal.
//! Invitations live on the member row: `invited -> accepted | declined`.
//!
//! Role slots are accounted on the locked role row. Accepting an application
//! or creating an invitation takes one open slot; declining an invitation or
//! removing a member who held a place gives it back. Check and write happen
//! in the same transaction so concurrent accepts cannot overbook a role.

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use synergazing_db::entities::{
    project,
    project::ProjectStatus,
    project_application,
    project_application::ApplicationStatus,
    project_member,
    project_member::MemberStatus,
    project_member_skill, project_role, user,
};
use tracing::{debug, info};
use uuid::Uuid;

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

use crate::error::{ServiceError, ServiceResult};
use crate::notify::{NotificationEvent, Outbox};
use crate::views::{is_team_member, load_team, MemberView, UserSummary};
use crate::wizard::load_owned;

#[derive(Debug, Clone, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct ApplyInput {
    pub project_role_id: Uuid,
    pub why_interested: String,
    pub skills_experience: String,
    pub contribution: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum ReviewAction {
    Accept,
    Reject,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum InvitationResponse {
    Accept,
    Decline,
}

#[derive(Debug, Clone, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct InviteInput {
    pub user_id: Uuid,
    pub project_role_id: Uuid,
    pub role_description: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct ApplicationView {
    pub id: Uuid,
    pub project_id: Uuid,
    pub project_title: String,
    pub project_role_id: Uuid,
    /// `None` once the role was replaced by a later stage-4 submission
    pub role_name: Option<String>,
    pub applicant: UserSummary,
    pub status: ApplicationStatus,
    pub why_interested: String,
    pub skills_experience: String,
    pub contribution: String,
    pub applied_at: DateTime<Utc>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub reviewed_by: Option<Uuid>,
    pub review_notes: Option<String>,
}

/// A pending invitation addressed to the current user
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct InvitationView {
    pub member_id: Uuid,
    pub project_id: Uuid,
    pub project_title: String,
    pub project_role_id: Uuid,
    pub role_name: String,
    pub role_description: Option<String>,
    pub invited_at: DateTime<Utc>,
}

fn motivation(value: &str, field: &str) -> ServiceResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(ServiceError::validation(format!("{} is required", field)))
    } else {
        Ok(trimmed.to_string())
    }
}

async fn locked_role(
    txn: &DatabaseTransaction,
    project_id: Uuid,
    role_id: Uuid,
) -> ServiceResult<Option<project_role::Model>> {
    Ok(project_role::Entity::find_by_id(role_id)
        .filter(project_role::Column::ProjectId.eq(project_id))
        .lock_exclusive()
        .one(txn)
        .await?)
}

async fn adjust_slots(
    txn: &DatabaseTransaction,
    role: project_role::Model,
    delta: i32,
) -> ServiceResult<project_role::Model> {
    let slots = role.slots_available.saturating_add(delta);
    let mut active: project_role::ActiveModel = role.into();
    active.slots_available = Set(slots);
    active.updated_at = Set(Utc::now());
    Ok(active.update(txn).await?)
}

async fn membership<C: ConnectionTrait>(
    conn: &C,
    project_id: Uuid,
    user_id: Uuid,
) -> ServiceResult<Option<project_member::Model>> {
    Ok(project_member::Entity::find()
        .filter(project_member::Column::ProjectId.eq(project_id))
        .filter(project_member::Column::UserId.eq(user_id))
        .one(conn)
        .await?)
}

async fn application_views<C: ConnectionTrait>(
    conn: &C,
    applications: Vec<project_application::Model>,
) -> ServiceResult<Vec<ApplicationView>> {
    if applications.is_empty() {
        return Ok(Vec::new());
    }

    let project_ids: Vec<Uuid> = applications.iter().map(|a| a.project_id).collect();
    let role_ids: Vec<Uuid> = applications.iter().map(|a| a.project_role_id).collect();
    let user_ids: Vec<Uuid> = applications.iter().map(|a| a.user_id).collect();

    let projects: HashMap<Uuid, String> = project::Entity::find()
        .filter(project::Column::Id.is_in(project_ids))
        .all(conn)
        .await?
        .into_iter()
        .map(|p| (p.id, p.title))
        .collect();
    let roles: HashMap<Uuid, String> = project_role::Entity::find()
        .filter(project_role::Column::Id.is_in(role_ids))
        .all(conn)
        .await?
        .into_iter()
        .map(|r| (r.id, r.name))
        .collect();
    let users: HashMap<Uuid, UserSummary> = user::Entity::find()
        .filter(user::Column::Id.is_in(user_ids))
        .all(conn)
        .await?
        .into_iter()
        .map(|u| (u.id, UserSummary::from(u)))
        .collect();

    Ok(applications
        .into_iter()
        .map(|a| ApplicationView {
            project_title: projects.get(&a.project_id).cloned().unwrap_or_default(),
            role_name: roles.get(&a.project_role_id).cloned(),
            applicant: users.get(&a.user_id).cloned().unwrap_or(UserSummary {
                id: a.user_id,
                name: String::new(),
            }),
            id: a.id,
            project_id: a.project_id,
            project_role_id: a.project_role_id,
            status: a.status,
            why_interested: a.why_interested,
            skills_experience: a.skills_experience,
            contribution: a.contribution,
            applied_at: a.applied_at,
            reviewed_at: a.reviewed_at,
            reviewed_by: a.reviewed_by,
            review_notes: a.review_notes,
        })
        .collect())
}

async fn member_view<C: ConnectionTrait>(
    conn: &C,
    project: &project::Model,
    member_id: Uuid,
) -> ServiceResult<MemberView> {
    load_team(conn, project.id, project.total_team)
        .await?
        .members
        .into_iter()
        .find(|m| m.id == member_id)
        .ok_or_else(|| ServiceError::not_found("Member"))
}

/// Applications, invitations, and team membership changes
#[derive(Clone)]
pub struct MembershipService {
    db: DatabaseConnection,
    outbox: Outbox,
}

impl MembershipService {
    pub fn new(db: DatabaseConnection, outbox: Outbox) -> Self {
        Self { db, outbox }
    }

    /// Submit a pending application for a role on a published project
    pub async fn apply(
        &self,
        user_id: Uuid,
        project_id: Uuid,
        input: ApplyInput,
    ) -> ServiceResult<ApplicationView> {
        let txn = self.db.begin().await?;

        // Locking the project serializes applications to it, which keeps
        // the one-live-application-per-user check race free.
        let project = project::Entity::find_by_id(project_id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::not_found("Project"))?;

        if project.status != ProjectStatus::Published {
            return Err(ServiceError::validation(
                "Project is not open for applications",
            ));
        }
        if project
            .registration_deadline
            .is_some_and(|deadline| Utc::now() >= deadline)
        {
            return Err(ServiceError::validation(
                "Registration deadline has passed",
            ));
        }

        let role = project_role::Entity::find_by_id(input.project_role_id)
            .filter(project_role::Column::ProjectId.eq(project.id))
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::not_found("Role"))?;

        let existing = project_application::Entity::find()
            .filter(project_application::Column::ProjectId.eq(project.id))
            .filter(project_application::Column::UserId.eq(user_id))
            .filter(project_application::Column::Status.ne(ApplicationStatus::Withdrawn))
            .one(&txn)
            .await?;
        if existing.is_some() {
            return Err(ServiceError::conflict(
                "You have already applied to this project",
            ));
        }

        if membership(&txn, project.id, user_id)
            .await?
            .is_some_and(|m| m.status.holds_slot())
        {
            return Err(ServiceError::conflict(
                "You are already a member of this project",
            ));
        }
        if project.creator_id == user_id {
            return Err(ServiceError::conflict(
                "You cannot apply to your own project",
            ));
        }

        let why_interested = motivation(&input.why_interested, "Why interested")?;
        let skills_experience = motivation(&input.skills_experience, "Skills and experience")?;
        let contribution = motivation(&input.contribution, "Contribution")?;

        let applicant = user::Entity::find_by_id(user_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::not_found("User"))?;

        let now = Utc::now();
        let application = project_application::ActiveModel {
            id: Set(Uuid::new_v4()),
            project_id: Set(project.id),
            user_id: Set(user_id),
            project_role_id: Set(role.id),
            status: Set(ApplicationStatus::Pending),
            why_interested: Set(why_interested),
            skills_experience: Set(skills_experience),
            contribution: Set(contribution),
            applied_at: Set(now),
            reviewed_at: Set(None),
            reviewed_by: Set(None),
            review_notes: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;

        info!(
            "User {} applied to project {} for role {}",
            user_id, project.id, role.name
        );
        self.outbox.publish(vec![NotificationEvent::ApplicationSubmitted {
            creator_id: project.creator_id,
            project_id: project.id,
            project_title: project.title.clone(),
            application_id: application.id,
            applicant_name: applicant.name,
            role_name: role.name,
        }]);

        self.single_view(application).await
    }

    /// Accept or reject a pending application (project creator only)
    pub async fn review(
        &self,
        application_id: Uuid,
        reviewer: Uuid,
        action: ReviewAction,
        notes: Option<String>,
    ) -> ServiceResult<ApplicationView> {
        let txn = self.db.begin().await?;

        let application = project_application::Entity::find_by_id(application_id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::not_found("Application"))?;

        let project = project::Entity::find_by_id(application.project_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::not_found("Project"))?;
        if project.creator_id != reviewer {
            return Err(ServiceError::unauthorized(
                "Only the project creator can review applications",
            ));
        }
        if application.status != ApplicationStatus::Pending {
            return Err(ServiceError::conflict(
                "Application has already been reviewed or withdrawn",
            ));
        }

        let event = match action {
            ReviewAction::Accept => {
                let role = locked_role(&txn, project.id, application.project_role_id)
                    .await?
                    .ok_or_else(|| ServiceError::NotFound("Role no longer exists".to_string()))?;

                if role.slots_available <= 0 {
                    return Err(ServiceError::Capacity(format!(
                        "No more slots available for role '{}'",
                        role.name
                    )));
                }

                let now = Utc::now();
                match membership(&txn, project.id, application.user_id).await? {
                    Some(existing) if existing.status.holds_slot() => {
                        return Err(ServiceError::conflict(
                            "Applicant is already a member of this project",
                        ));
                    }
                    Some(declined) => {
                        let mut active: project_member::ActiveModel = declined.into();
                        active.project_role_id = Set(role.id);
                        active.status = Set(MemberStatus::Accepted);
                        active.role_description = Set(None);
                        active.updated_at = Set(now);
                        active.update(&txn).await?;
                    }
                    None => {
                        project_member::ActiveModel {
                            id: Set(Uuid::new_v4()),
                            project_id: Set(project.id),
                            user_id: Set(application.user_id),
                            project_role_id: Set(role.id),
                            status: Set(MemberStatus::Accepted),
                            role_description: Set(None),
                            created_at: Set(now),
                            updated_at: Set(now),
                        }
                        .insert(&txn)
                        .await?;
                    }
                }

                let role = adjust_slots(&txn, role, -1).await?;
                NotificationEvent::ApplicationAccepted {
                    applicant_id: application.user_id,
                    project_id: project.id,
                    project_title: project.title.clone(),
                    application_id: application.id,
                    role_name: role.name,
                }
            }
            ReviewAction::Reject => NotificationEvent::ApplicationRejected {
                applicant_id: application.user_id,
                project_id: project.id,
                project_title: project.title.clone(),
                application_id: application.id,
            },
        };

        let mut active: project_application::ActiveModel = application.into();
        active.status = Set(match action {
            ReviewAction::Accept => ApplicationStatus::Accepted,
            ReviewAction::Reject => ApplicationStatus::Rejected,
        });
        active.reviewed_at = Set(Some(Utc::now()));
        active.reviewed_by = Set(Some(reviewer));
        active.review_notes = Set(notes
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty()));
        active.updated_at = Set(Utc::now());
        let application = active.update(&txn).await?;

        txn.commit().await?;

        info!(
            "Application {} {:?} by {}",
            application.id, application.status, reviewer
        );
        self.outbox.publish(vec![event]);

        self.single_view(application).await
    }

    /// Withdraw one's own pending application
    pub async fn withdraw(
        &self,
        application_id: Uuid,
        user_id: Uuid,
    ) -> ServiceResult<ApplicationView> {
        let txn = self.db.begin().await?;

        let application = project_application::Entity::find_by_id(application_id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::not_found("Application"))?;

        if application.user_id != user_id {
            return Err(ServiceError::unauthorized(
                "You can only withdraw your own applications",
            ));
        }
        if application.status != ApplicationStatus::Pending {
            return Err(ServiceError::conflict(
                "Only pending applications can be withdrawn",
            ));
        }

        let mut active: project_application::ActiveModel = application.into();
        active.status = Set(ApplicationStatus::Withdrawn);
        active.updated_at = Set(Utc::now());
        let application = active.update(&txn).await?;

        txn.commit().await?;
        info!("Application {} withdrawn", application.id);

        self.single_view(application).await
    }

    /// Invite a user straight into a role (project creator only)
    pub async fn invite(
        &self,
        project_id: Uuid,
        inviter: Uuid,
        input: InviteInput,
    ) -> ServiceResult<MemberView> {
        let txn = self.db.begin().await?;
        let project = load_owned(&txn, project_id, inviter).await?;

        let role = locked_role(&txn, project.id, input.project_role_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Role"))?;

        let invitee = user::Entity::find_by_id(input.user_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::not_found("User"))?;
        if invitee.id == project.creator_id {
            return Err(ServiceError::conflict(
                "The project creator cannot be invited",
            ));
        }

        if membership(&txn, project.id, invitee.id).await?.is_some() {
            return Err(ServiceError::conflict(
                "User already has a membership record for this project",
            ));
        }

        let pending = project_application::Entity::find()
            .filter(project_application::Column::ProjectId.eq(project.id))
            .filter(project_application::Column::UserId.eq(invitee.id))
            .filter(project_application::Column::Status.eq(ApplicationStatus::Pending))
            .one(&txn)
            .await?;
        if pending.is_some() {
            return Err(ServiceError::conflict(
                "User has a pending application for this project",
            ));
        }

        if role.slots_available <= 0 {
            return Err(ServiceError::Capacity(format!(
                "No more slots available for role '{}'",
                role.name
            )));
        }

        let now = Utc::now();
        let member = project_member::ActiveModel {
            id: Set(Uuid::new_v4()),
            project_id: Set(project.id),
            user_id: Set(invitee.id),
            project_role_id: Set(role.id),
            status: Set(MemberStatus::Invited),
            role_description: Set(input
                .role_description
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty())),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;

        let role = adjust_slots(&txn, role, -1).await?;

        txn.commit().await?;

        info!(
            "User {} invited to project {} as {}",
            invitee.id, project.id, role.name
        );
        self.outbox.publish(vec![NotificationEvent::InvitationReceived {
            invitee_id: invitee.id,
            project_id: project.id,
            project_title: project.title.clone(),
            role_name: role.name,
        }]);

        member_view(&self.db, &project, member.id).await
    }

    /// Accept or decline one's own pending invitation
    pub async fn respond_to_invitation(
        &self,
        project_id: Uuid,
        user_id: Uuid,
        response: InvitationResponse,
    ) -> ServiceResult<MemberView> {
        let txn = self.db.begin().await?;

        let member = project_member::Entity::find()
            .filter(project_member::Column::ProjectId.eq(project_id))
            .filter(project_member::Column::UserId.eq(user_id))
            .filter(project_member::Column::Status.eq(MemberStatus::Invited))
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::not_found("Invitation"))?;

        let project = project::Entity::find_by_id(project_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::not_found("Project"))?;

        let role = locked_role(&txn, project.id, member.project_role_id).await?;
        let member_id = member.id;

        let mut active: project_member::ActiveModel = member.into();
        active.updated_at = Set(Utc::now());
        let mut events = Vec::new();
        match response {
            InvitationResponse::Accept => {
                active.status = Set(MemberStatus::Accepted);
                if let Some(role) = &role {
                    events.push(NotificationEvent::RoleAssigned {
                        user_id,
                        project_id: project.id,
                        project_title: project.title.clone(),
                        role_name: role.name.clone(),
                    });
                }
            }
            InvitationResponse::Decline => {
                active.status = Set(MemberStatus::Declined);
                if let Some(role) = role {
                    adjust_slots(&txn, role, 1).await?;
                }
            }
        }
        active.update(&txn).await?;

        txn.commit().await?;

        info!(
            "User {} answered invitation to project {}: {:?}",
            user_id, project_id, response
        );
        self.outbox.publish(events);

        member_view(&self.db, &project, member_id).await
    }

    /// Remove a member from the team (project creator only)
    pub async fn remove_member(
        &self,
        project_id: Uuid,
        target_user: Uuid,
        caller: Uuid,
    ) -> ServiceResult<()> {
        let txn = self.db.begin().await?;
        let project = load_owned(&txn, project_id, caller).await?;

        if target_user == project.creator_id {
            return Err(ServiceError::validation(
                "The project creator cannot be removed from the team",
            ));
        }

        let member = membership(&txn, project.id, target_user)
            .await?
            .ok_or_else(|| ServiceError::not_found("Member"))?;

        let role = if member.status.holds_slot() {
            locked_role(&txn, project.id, member.project_role_id).await?
        } else {
            None
        };

        project_member_skill::Entity::delete_many()
            .filter(project_member_skill::Column::ProjectMemberId.eq(member.id))
            .exec(&txn)
            .await?;
        project_member::Entity::delete_by_id(member.id)
            .exec(&txn)
            .await?;

        if let Some(role) = role {
            adjust_slots(&txn, role, 1).await?;
        }

        txn.commit().await?;
        info!("User {} removed from project {}", target_user, project_id);
        Ok(())
    }

    /// Applications of one project, newest first (project creator only)
    pub async fn project_applications(
        &self,
        project_id: Uuid,
        caller: Uuid,
        status: Option<ApplicationStatus>,
    ) -> ServiceResult<Vec<ApplicationView>> {
        let project = project::Entity::find_by_id(project_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Project"))?;
        if project.creator_id != caller {
            return Err(ServiceError::unauthorized(
                "Only the project creator can view applications",
            ));
        }

        let mut query = project_application::Entity::find()
            .filter(project_application::Column::ProjectId.eq(project.id));
        if let Some(status) = status {
            query = query.filter(project_application::Column::Status.eq(status));
        }

        let applications = query
            .order_by_desc(project_application::Column::AppliedAt)
            .all(&self.db)
            .await?;
        application_views(&self.db, applications).await
    }

    /// One application, visible to the applicant and the project creator
    pub async fn application(
        &self,
        application_id: Uuid,
        caller: Uuid,
    ) -> ServiceResult<ApplicationView> {
        let application = project_application::Entity::find_by_id(application_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Application"))?;

        if application.user_id != caller {
            let project = project::Entity::find_by_id(application.project_id)
                .one(&self.db)
                .await?
                .ok_or_else(|| ServiceError::not_found("Project"))?;
            if project.creator_id != caller {
                return Err(ServiceError::unauthorized(
                    "You are not allowed to view this application",
                ));
            }
        }

        self.single_view(application).await
    }

    /// The caller's own applications, newest first
    pub async fn user_applications(&self, user_id: Uuid) -> ServiceResult<Vec<ApplicationView>> {
        let applications = project_application::Entity::find()
            .filter(project_application::Column::UserId.eq(user_id))
            .order_by_desc(project_application::Column::AppliedAt)
            .all(&self.db)
            .await?;
        application_views(&self.db, applications).await
    }

    /// Invitations still waiting for the caller's answer
    pub async fn user_invitations(&self, user_id: Uuid) -> ServiceResult<Vec<InvitationView>> {
        let invitations = project_member::Entity::find()
            .filter(project_member::Column::UserId.eq(user_id))
            .filter(project_member::Column::Status.eq(MemberStatus::Invited))
            .order_by_desc(project_member::Column::CreatedAt)
            .find_also_related(project::Entity)
            .all(&self.db)
            .await?;

        let role_ids: Vec<Uuid> = invitations.iter().map(|(m, _)| m.project_role_id).collect();
        let roles: HashMap<Uuid, String> = if role_ids.is_empty() {
            HashMap::new()
        } else {
            project_role::Entity::find()
                .filter(project_role::Column::Id.is_in(role_ids))
                .all(&self.db)
                .await?
                .into_iter()
                .map(|r| (r.id, r.name))
                .collect()
        };

        Ok(invitations
            .into_iter()
            .map(|(member, project)| InvitationView {
                member_id: member.id,
                project_id: member.project_id,
                project_title: project.map(|p| p.title).unwrap_or_default(),
                project_role_id: member.project_role_id,
                role_name: roles
                    .get(&member.project_role_id)
                    .cloned()
                    .unwrap_or_default(),
                role_description: member.role_description,
                invited_at: member.created_at,
            })
            .collect())
    }

    /// Team of a project. Public once published; otherwise creator and members only.
    pub async fn project_members(
        &self,
        project_id: Uuid,
        caller: Option<Uuid>,
    ) -> ServiceResult<Vec<MemberView>> {
        let project = project::Entity::find_by_id(project_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Project"))?;

        let visible = match caller {
            _ if project.status != ProjectStatus::Draft => true,
            Some(caller) if caller == project.creator_id => true,
            Some(caller) => is_team_member(&self.db, project.id, caller).await?,
            None => false,
        };
        if !visible {
            debug!("Member list of draft project {} hidden", project.id);
            return Err(ServiceError::not_found("Project"));
        }

        Ok(load_team(&self.db, project.id, project.total_team)
            .await?
            .members)
    }

    async fn single_view(
        &self,
        application: project_application::Model,
    ) -> ServiceResult<ApplicationView> {
        application_views(&self.db, vec![application])
            .await?
            .pop()
            .ok_or_else(|| ServiceError::not_found("Application"))
    }
}
