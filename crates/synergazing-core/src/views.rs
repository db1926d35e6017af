//! Read-side projections of the project aggregate and the access-filtered queries over them

use chrono::{DateTime, Utc};
use sea_orm::{
    ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder,
};
use serde::Serialize;
use std::collections::HashMap;
use synergazing_db::entities::{
    benefit, project,
    project::ProjectStatus,
    project_benefit, project_condition, project_member,
    project_member::MemberStatus,
    project_member_skill, project_required_skill, project_role, project_role_skill, project_tag,
    project_timeline,
    project_timeline::TimelineStatus,
    skill, tag, timeline, user,
};
use uuid::Uuid;

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

use crate::capacity::TeamCapacity;
use crate::catalog::{list_all, CatalogEntity, CatalogEntry};
use crate::error::{ServiceError, ServiceResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct UserSummary {
    pub id: Uuid,
    pub name: String,
}

impl From<user::Model> for UserSummary {
    fn from(user: user::Model) -> Self {
        Self {
            id: user.id,
            name: user.name,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct ConditionView {
    pub id: Uuid,
    pub position: i32,
    pub description: String,
}

#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct RoleView {
    pub id: Uuid,
    pub name: String,
    /// Open positions left
    pub slots_available: i32,
    pub description: Option<String>,
    pub skills: Vec<CatalogEntry>,
    /// Members currently holding this role (invited or accepted)
    pub members: i32,
}

#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct MemberView {
    pub id: Uuid,
    pub user: UserSummary,
    pub role_id: Uuid,
    pub role_name: String,
    pub status: MemberStatus,
    pub role_description: Option<String>,
    pub skills: Vec<CatalogEntry>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct TimelineEntryView {
    pub id: Uuid,
    pub name: String,
    pub status: TimelineStatus,
    pub position: i32,
}

/// Full project as returned by every project endpoint
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct ProjectView {
    pub id: Uuid,
    pub creator: UserSummary,
    pub title: String,
    pub project_type: String,
    pub description: String,
    pub picture_url: Option<String>,
    pub status: ProjectStatus,
    pub completion_stage: i32,
    pub duration: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub location: Option<String>,
    pub budget: Option<String>,
    pub registration_deadline: Option<DateTime<Utc>>,
    pub time_commitment: Option<String>,
    pub required_skills: Vec<CatalogEntry>,
    pub conditions: Vec<ConditionView>,
    pub roles: Vec<RoleView>,
    pub members: Vec<MemberView>,
    pub benefits: Vec<CatalogEntry>,
    pub tags: Vec<CatalogEntry>,
    pub timeline: Vec<TimelineEntryView>,
    #[serde(flatten)]
    pub capacity: TeamCapacity,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Capacity breakdown of one project
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct TeamCapacityView {
    #[serde(flatten)]
    pub capacity: TeamCapacity,
    pub members: Vec<MemberView>,
    pub roles: Vec<RoleView>,
}

pub(crate) struct Team {
    pub roles: Vec<RoleView>,
    pub members: Vec<MemberView>,
    pub capacity: TeamCapacity,
}

pub(crate) async fn load_team<C: ConnectionTrait>(
    conn: &C,
    project_id: Uuid,
    total_team: i32,
) -> ServiceResult<Team> {
    let roles = project_role::Entity::find()
        .filter(project_role::Column::ProjectId.eq(project_id))
        .order_by_asc(project_role::Column::Name)
        .all(conn)
        .await?;

    let members = project_member::Entity::find()
        .filter(project_member::Column::ProjectId.eq(project_id))
        .order_by_asc(project_member::Column::CreatedAt)
        .find_also_related(user::Entity)
        .all(conn)
        .await?;

    let member_rows: Vec<project_member::Model> = members.iter().map(|(m, _)| m.clone()).collect();
    let capacity = TeamCapacity::from_rows(total_team, &member_rows, &roles);

    let mut role_skills = role_skill_map(conn, roles.iter().map(|r| r.id).collect()).await?;
    let mut member_skills =
        member_skill_map(conn, member_rows.iter().map(|m| m.id).collect()).await?;
    let role_names: HashMap<Uuid, String> =
        roles.iter().map(|r| (r.id, r.name.clone())).collect();

    let role_views = roles
        .into_iter()
        .map(|role| RoleView {
            members: member_rows
                .iter()
                .filter(|m| m.project_role_id == role.id && m.status.holds_slot())
                .count() as i32,
            skills: role_skills.remove(&role.id).unwrap_or_default(),
            id: role.id,
            name: role.name,
            slots_available: role.slots_available,
            description: role.description,
        })
        .collect();

    let member_views = members
        .into_iter()
        .map(|(member, user)| MemberView {
            user: user.map(UserSummary::from).unwrap_or(UserSummary {
                id: member.user_id,
                name: String::new(),
            }),
            role_name: role_names
                .get(&member.project_role_id)
                .cloned()
                .unwrap_or_default(),
            skills: member_skills.remove(&member.id).unwrap_or_default(),
            id: member.id,
            role_id: member.project_role_id,
            status: member.status,
            role_description: member.role_description,
            created_at: member.created_at,
        })
        .collect();

    Ok(Team {
        roles: role_views,
        members: member_views,
        capacity,
    })
}

async fn role_skill_map<C: ConnectionTrait>(
    conn: &C,
    role_ids: Vec<Uuid>,
) -> ServiceResult<HashMap<Uuid, Vec<CatalogEntry>>> {
    if role_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows = project_role_skill::Entity::find()
        .filter(project_role_skill::Column::ProjectRoleId.is_in(role_ids))
        .find_also_related(skill::Entity)
        .all(conn)
        .await?;

    Ok(group_entries(
        rows.into_iter()
            .filter_map(|(link, s)| s.map(|s| (link.project_role_id, skill::Entity::to_entry(s)))),
    ))
}

async fn member_skill_map<C: ConnectionTrait>(
    conn: &C,
    member_ids: Vec<Uuid>,
) -> ServiceResult<HashMap<Uuid, Vec<CatalogEntry>>> {
    if member_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows = project_member_skill::Entity::find()
        .filter(project_member_skill::Column::ProjectMemberId.is_in(member_ids))
        .find_also_related(skill::Entity)
        .all(conn)
        .await?;

    Ok(group_entries(rows.into_iter().filter_map(|(link, s)| {
        s.map(|s| (link.project_member_id, skill::Entity::to_entry(s)))
    })))
}

fn group_entries(
    rows: impl Iterator<Item = (Uuid, CatalogEntry)>,
) -> HashMap<Uuid, Vec<CatalogEntry>> {
    let mut grouped: HashMap<Uuid, Vec<CatalogEntry>> = HashMap::new();
    for (owner, entry) in rows {
        grouped.entry(owner).or_default().push(entry);
    }
    for entries in grouped.values_mut() {
        entries.sort_by(|a, b| a.name.cmp(&b.name));
    }
    grouped
}

fn sorted(mut entries: Vec<CatalogEntry>) -> Vec<CatalogEntry> {
    entries.sort_by(|a, b| a.name.cmp(&b.name));
    entries
}

pub(crate) async fn load_project_view<C: ConnectionTrait>(
    conn: &C,
    project: project::Model,
) -> ServiceResult<ProjectView> {
    let creator = user::Entity::find_by_id(project.creator_id)
        .one(conn)
        .await?
        .map(UserSummary::from)
        .unwrap_or(UserSummary {
            id: project.creator_id,
            name: String::new(),
        });

    let required_skills = project_required_skill::Entity::find()
        .filter(project_required_skill::Column::ProjectId.eq(project.id))
        .find_also_related(skill::Entity)
        .all(conn)
        .await?
        .into_iter()
        .filter_map(|(_, s)| s.map(skill::Entity::to_entry))
        .collect();

    let conditions = project_condition::Entity::find()
        .filter(project_condition::Column::ProjectId.eq(project.id))
        .order_by_asc(project_condition::Column::Position)
        .all(conn)
        .await?
        .into_iter()
        .map(|c| ConditionView {
            id: c.id,
            position: c.position,
            description: c.description,
        })
        .collect();

    let tags = project_tag::Entity::find()
        .filter(project_tag::Column::ProjectId.eq(project.id))
        .find_also_related(tag::Entity)
        .all(conn)
        .await?
        .into_iter()
        .filter_map(|(_, t)| t.map(tag::Entity::to_entry))
        .collect();

    let benefits = project_benefit::Entity::find()
        .filter(project_benefit::Column::ProjectId.eq(project.id))
        .find_also_related(benefit::Entity)
        .all(conn)
        .await?
        .into_iter()
        .filter_map(|(_, b)| b.map(benefit::Entity::to_entry))
        .collect();

    let timeline = project_timeline::Entity::find()
        .filter(project_timeline::Column::ProjectId.eq(project.id))
        .order_by_asc(project_timeline::Column::Position)
        .find_also_related(timeline::Entity)
        .all(conn)
        .await?
        .into_iter()
        .filter_map(|(link, t)| {
            t.map(|t| TimelineEntryView {
                id: t.id,
                name: t.name,
                status: link.status,
                position: link.position,
            })
        })
        .collect();

    let team = load_team(conn, project.id, project.total_team).await?;

    Ok(ProjectView {
        id: project.id,
        creator,
        title: project.title,
        project_type: project.project_type,
        description: project.description,
        picture_url: project.picture_url,
        status: project.status,
        completion_stage: project.completion_stage,
        duration: project.duration,
        start_date: project.start_date,
        end_date: project.end_date,
        location: project.location,
        budget: project.budget,
        registration_deadline: project.registration_deadline,
        time_commitment: project.time_commitment,
        required_skills: sorted(required_skills),
        conditions,
        roles: team.roles,
        members: team.members,
        benefits: sorted(benefits),
        tags: sorted(tags),
        timeline,
        capacity: team.capacity,
        created_at: project.created_at,
        updated_at: project.updated_at,
    })
}

/// Whether `user_id` currently belongs to the project's team
pub(crate) async fn is_team_member<C: ConnectionTrait>(
    conn: &C,
    project_id: Uuid,
    user_id: Uuid,
) -> ServiceResult<bool> {
    let membership = project_member::Entity::find()
        .filter(project_member::Column::ProjectId.eq(project_id))
        .filter(project_member::Column::UserId.eq(user_id))
        .one(conn)
        .await?;

    Ok(membership.is_some_and(|m| m.status.holds_slot()))
}

/// Access-filtered project reads
#[derive(Clone)]
pub struct ProjectQueries {
    db: DatabaseConnection,
}

impl ProjectQueries {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Projects the caller created or currently belongs to
    pub async fn user_projects(&self, caller: Uuid) -> ServiceResult<Vec<ProjectView>> {
        let member_of = self
            .member_project_ids(caller, &[MemberStatus::Invited, MemberStatus::Accepted])
            .await?;

        let mut condition = Condition::any().add(project::Column::CreatorId.eq(caller));
        if !member_of.is_empty() {
            condition = condition.add(project::Column::Id.is_in(member_of));
        }

        self.views(condition).await
    }

    pub async fn created_projects(&self, caller: Uuid) -> ServiceResult<Vec<ProjectView>> {
        self.views(Condition::all().add(project::Column::CreatorId.eq(caller)))
            .await
    }

    /// Projects where the caller is an accepted member
    pub async fn member_projects(&self, caller: Uuid) -> ServiceResult<Vec<ProjectView>> {
        let ids = self
            .member_project_ids(caller, &[MemberStatus::Accepted])
            .await?;
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        self.views(
            Condition::all()
                .add(project::Column::Id.is_in(ids))
                .add(project::Column::CreatorId.ne(caller)),
        )
        .await
    }

    /// One project, visible to its creator and current members
    pub async fn user_project(&self, caller: Uuid, project_id: Uuid) -> ServiceResult<ProjectView> {
        let project = self.visible_project(caller, project_id).await?;
        load_project_view(&self.db, project).await
    }

    /// Public listing; drafts are never shown
    pub async fn published_projects(&self) -> ServiceResult<Vec<ProjectView>> {
        self.views(Condition::all().add(project::Column::Status.ne(ProjectStatus::Draft)))
            .await
    }

    pub async fn public_project(&self, project_id: Uuid) -> ServiceResult<ProjectView> {
        let project = project::Entity::find_by_id(project_id)
            .filter(project::Column::Status.ne(ProjectStatus::Draft))
            .one(&self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Project"))?;

        load_project_view(&self.db, project).await
    }

    pub async fn team_capacity(
        &self,
        caller: Uuid,
        project_id: Uuid,
    ) -> ServiceResult<TeamCapacityView> {
        let project = self.visible_project(caller, project_id).await?;
        let team = load_team(&self.db, project.id, project.total_team).await?;

        Ok(TeamCapacityView {
            capacity: team.capacity,
            members: team.members,
            roles: team.roles,
        })
    }

    /// The whole skill catalog, alphabetically
    pub async fn skills(&self) -> ServiceResult<Vec<CatalogEntry>> {
        list_all::<skill::Entity, _>(&self.db).await
    }

    async fn visible_project(&self, caller: Uuid, project_id: Uuid) -> ServiceResult<project::Model> {
        let project = project::Entity::find_by_id(project_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Project"))?;

        if project.creator_id == caller || is_team_member(&self.db, project.id, caller).await? {
            Ok(project)
        } else {
            Err(ServiceError::not_found("Project"))
        }
    }

    async fn member_project_ids(
        &self,
        user_id: Uuid,
        statuses: &[MemberStatus],
    ) -> ServiceResult<Vec<Uuid>> {
        let rows = project_member::Entity::find()
            .filter(project_member::Column::UserId.eq(user_id))
            .filter(project_member::Column::Status.is_in(statuses.iter().copied()))
            .all(&self.db)
            .await?;

        Ok(rows.into_iter().map(|m| m.project_id).collect())
    }

    async fn views(&self, condition: Condition) -> ServiceResult<Vec<ProjectView>> {
        let projects = project::Entity::find()
            .filter(condition)
            .order_by_desc(project::Column::CreatedAt)
            .all(&self.db)
            .await?;

        let mut views = Vec::with_capacity(projects.len());
        for project in projects {
            views.push(load_project_view(&self.db, project).await?);
        }
        Ok(views)
    }
}
