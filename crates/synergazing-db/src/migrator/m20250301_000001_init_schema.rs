//! Initial schema: users, catalogs, and the project aggregate

use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ============================================================
        // 1. Users
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(User::Table)
                    .if_not_exists()
                    .col(uuid(User::Id).primary_key())
                    .col(string_len(User::Name, 255).not_null().unique_key())
                    .col(string_len(User::Email, 255).not_null().unique_key())
                    .col(string_len(User::PasswordHash, 255).not_null())
                    .col(
                        timestamp_with_time_zone(User::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(User::UpdatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // ============================================================
        // 2. Catalogs (skills, tags, benefits, timelines)
        // ============================================================
        create_catalog(manager, Skill::Table).await?;
        create_catalog(manager, Tag::Table).await?;
        create_catalog(manager, Benefit::Table).await?;
        create_catalog(manager, Timeline::Table).await?;

        // ============================================================
        // 3. Projects
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(Project::Table)
                    .if_not_exists()
                    .col(uuid(Project::Id).primary_key())
                    .col(uuid(Project::CreatorId).not_null())
                    .col(string_len(Project::Title, 255).not_null())
                    .col(string_len(Project::ProjectType, 100).not_null())
                    .col(text(Project::Description).not_null())
                    .col(string_len_null(Project::PictureUrl, 512))
                    .col(
                        string_len(Project::Status, 32)
                            .not_null()
                            .default("draft"),
                    )
                    .col(integer(Project::CompletionStage).not_null().default(1))
                    .col(string_len_null(Project::Duration, 100))
                    .col(integer(Project::TotalTeam).not_null().default(0))
                    .col(timestamp_with_time_zone_null(Project::StartDate))
                    .col(timestamp_with_time_zone_null(Project::EndDate))
                    .col(string_len_null(Project::Location, 255))
                    .col(string_len_null(Project::Budget, 100))
                    .col(timestamp_with_time_zone_null(Project::RegistrationDeadline))
                    .col(string_len_null(Project::TimeCommitment, 100))
                    .col(
                        timestamp_with_time_zone(Project::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(Project::UpdatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(&mut cascade_fk(
                        "fk_projects_creator_id",
                        Project::Table,
                        Project::CreatorId,
                        User::Table,
                        User::Id,
                    ))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_projects_creator_id")
                    .table(Project::Table)
                    .col(Project::CreatorId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_projects_status")
                    .table(Project::Table)
                    .col(Project::Status)
                    .to_owned(),
            )
            .await?;

        // ============================================================
        // 4. Stage 3: conditions and required skills
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(ProjectCondition::Table)
                    .if_not_exists()
                    .col(uuid(ProjectCondition::Id).primary_key())
                    .col(uuid(ProjectCondition::ProjectId).not_null())
                    .col(integer(ProjectCondition::Position).not_null())
                    .col(text(ProjectCondition::Description).not_null())
                    .foreign_key(&mut cascade_fk(
                        "fk_project_conditions_project_id",
                        ProjectCondition::Table,
                        ProjectCondition::ProjectId,
                        Project::Table,
                        Project::Id,
                    ))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ProjectRequiredSkill::Table)
                    .if_not_exists()
                    .col(uuid(ProjectRequiredSkill::ProjectId).not_null())
                    .col(uuid(ProjectRequiredSkill::SkillId).not_null())
                    .primary_key(
                        Index::create()
                            .col(ProjectRequiredSkill::ProjectId)
                            .col(ProjectRequiredSkill::SkillId),
                    )
                    .foreign_key(&mut cascade_fk(
                        "fk_project_required_skills_project_id",
                        ProjectRequiredSkill::Table,
                        ProjectRequiredSkill::ProjectId,
                        Project::Table,
                        Project::Id,
                    ))
                    .foreign_key(&mut cascade_fk(
                        "fk_project_required_skills_skill_id",
                        ProjectRequiredSkill::Table,
                        ProjectRequiredSkill::SkillId,
                        Skill::Table,
                        Catalog::Id,
                    ))
                    .to_owned(),
            )
            .await?;

        // ============================================================
        // 5. Stage 4: roles and members
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(ProjectRole::Table)
                    .if_not_exists()
                    .col(uuid(ProjectRole::Id).primary_key())
                    .col(uuid(ProjectRole::ProjectId).not_null())
                    .col(string_len(ProjectRole::Name, 255).not_null())
                    .col(integer(ProjectRole::SlotsAvailable).not_null().default(0))
                    .col(text_null(ProjectRole::Description))
                    .col(
                        timestamp_with_time_zone(ProjectRole::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(ProjectRole::UpdatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(&mut cascade_fk(
                        "fk_project_roles_project_id",
                        ProjectRole::Table,
                        ProjectRole::ProjectId,
                        Project::Table,
                        Project::Id,
                    ))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_project_roles_project_id")
                    .table(ProjectRole::Table)
                    .col(ProjectRole::ProjectId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ProjectRoleSkill::Table)
                    .if_not_exists()
                    .col(uuid(ProjectRoleSkill::ProjectRoleId).not_null())
                    .col(uuid(ProjectRoleSkill::SkillId).not_null())
                    .primary_key(
                        Index::create()
                            .col(ProjectRoleSkill::ProjectRoleId)
                            .col(ProjectRoleSkill::SkillId),
                    )
                    .foreign_key(&mut cascade_fk(
                        "fk_project_role_skills_role_id",
                        ProjectRoleSkill::Table,
                        ProjectRoleSkill::ProjectRoleId,
                        ProjectRole::Table,
                        ProjectRole::Id,
                    ))
                    .foreign_key(&mut cascade_fk(
                        "fk_project_role_skills_skill_id",
                        ProjectRoleSkill::Table,
                        ProjectRoleSkill::SkillId,
                        Skill::Table,
                        Catalog::Id,
                    ))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ProjectMember::Table)
                    .if_not_exists()
                    .col(uuid(ProjectMember::Id).primary_key())
                    .col(uuid(ProjectMember::ProjectId).not_null())
                    .col(uuid(ProjectMember::UserId).not_null())
                    .col(uuid(ProjectMember::ProjectRoleId).not_null())
                    .col(
                        string_len(ProjectMember::Status, 32)
                            .not_null()
                            .default("invited"),
                    )
                    .col(text_null(ProjectMember::RoleDescription))
                    .col(
                        timestamp_with_time_zone(ProjectMember::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(ProjectMember::UpdatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(&mut cascade_fk(
                        "fk_project_members_project_id",
                        ProjectMember::Table,
                        ProjectMember::ProjectId,
                        Project::Table,
                        Project::Id,
                    ))
                    .foreign_key(&mut cascade_fk(
                        "fk_project_members_user_id",
                        ProjectMember::Table,
                        ProjectMember::UserId,
                        User::Table,
                        User::Id,
                    ))
                    .foreign_key(&mut cascade_fk(
                        "fk_project_members_role_id",
                        ProjectMember::Table,
                        ProjectMember::ProjectRoleId,
                        ProjectRole::Table,
                        ProjectRole::Id,
                    ))
                    .to_owned(),
            )
            .await?;

        // One membership row per (project, user)
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_project_members_project_user")
                    .table(ProjectMember::Table)
                    .col(ProjectMember::ProjectId)
                    .col(ProjectMember::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_project_members_user_id")
                    .table(ProjectMember::Table)
                    .col(ProjectMember::UserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ProjectMemberSkill::Table)
                    .if_not_exists()
                    .col(uuid(ProjectMemberSkill::ProjectMemberId).not_null())
                    .col(uuid(ProjectMemberSkill::SkillId).not_null())
                    .primary_key(
                        Index::create()
                            .col(ProjectMemberSkill::ProjectMemberId)
                            .col(ProjectMemberSkill::SkillId),
                    )
                    .foreign_key(&mut cascade_fk(
                        "fk_project_member_skills_member_id",
                        ProjectMemberSkill::Table,
                        ProjectMemberSkill::ProjectMemberId,
                        ProjectMember::Table,
                        ProjectMember::Id,
                    ))
                    .foreign_key(&mut cascade_fk(
                        "fk_project_member_skills_skill_id",
                        ProjectMemberSkill::Table,
                        ProjectMemberSkill::SkillId,
                        Skill::Table,
                        Catalog::Id,
                    ))
                    .to_owned(),
            )
            .await?;

        // ============================================================
        // 6. Stage 5: tags, benefits, timeline
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(ProjectTag::Table)
                    .if_not_exists()
                    .col(uuid(ProjectTag::ProjectId).not_null())
                    .col(uuid(ProjectTag::TagId).not_null())
                    .primary_key(
                        Index::create()
                            .col(ProjectTag::ProjectId)
                            .col(ProjectTag::TagId),
                    )
                    .foreign_key(&mut cascade_fk(
                        "fk_project_tags_project_id",
                        ProjectTag::Table,
                        ProjectTag::ProjectId,
                        Project::Table,
                        Project::Id,
                    ))
                    .foreign_key(&mut cascade_fk(
                        "fk_project_tags_tag_id",
                        ProjectTag::Table,
                        ProjectTag::TagId,
                        Tag::Table,
                        Catalog::Id,
                    ))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ProjectBenefit::Table)
                    .if_not_exists()
                    .col(uuid(ProjectBenefit::ProjectId).not_null())
                    .col(uuid(ProjectBenefit::BenefitId).not_null())
                    .primary_key(
                        Index::create()
                            .col(ProjectBenefit::ProjectId)
                            .col(ProjectBenefit::BenefitId),
                    )
                    .foreign_key(&mut cascade_fk(
                        "fk_project_benefits_project_id",
                        ProjectBenefit::Table,
                        ProjectBenefit::ProjectId,
                        Project::Table,
                        Project::Id,
                    ))
                    .foreign_key(&mut cascade_fk(
                        "fk_project_benefits_benefit_id",
                        ProjectBenefit::Table,
                        ProjectBenefit::BenefitId,
                        Benefit::Table,
                        Catalog::Id,
                    ))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ProjectTimeline::Table)
                    .if_not_exists()
                    .col(uuid(ProjectTimeline::ProjectId).not_null())
                    .col(uuid(ProjectTimeline::TimelineId).not_null())
                    .col(
                        string_len(ProjectTimeline::Status, 32)
                            .not_null()
                            .default("not-started"),
                    )
                    .col(integer(ProjectTimeline::Position).not_null().default(0))
                    .primary_key(
                        Index::create()
                            .col(ProjectTimeline::ProjectId)
                            .col(ProjectTimeline::TimelineId),
                    )
                    .foreign_key(&mut cascade_fk(
                        "fk_project_timelines_project_id",
                        ProjectTimeline::Table,
                        ProjectTimeline::ProjectId,
                        Project::Table,
                        Project::Id,
                    ))
                    .foreign_key(&mut cascade_fk(
                        "fk_project_timelines_timeline_id",
                        ProjectTimeline::Table,
                        ProjectTimeline::TimelineId,
                        Timeline::Table,
                        Catalog::Id,
                    ))
                    .to_owned(),
            )
            .await?;

        // ============================================================
        // 7. Applications
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(ProjectApplication::Table)
                    .if_not_exists()
                    .col(uuid(ProjectApplication::Id).primary_key())
                    .col(uuid(ProjectApplication::ProjectId).not_null())
                    .col(uuid(ProjectApplication::UserId).not_null())
                    .col(uuid(ProjectApplication::ProjectRoleId).not_null())
                    .col(
                        string_len(ProjectApplication::Status, 32)
                            .not_null()
                            .default("pending"),
                    )
                    .col(text(ProjectApplication::WhyInterested).not_null())
                    .col(text(ProjectApplication::SkillsExperience).not_null())
                    .col(text(ProjectApplication::Contribution).not_null())
                    .col(
                        timestamp_with_time_zone(ProjectApplication::AppliedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(timestamp_with_time_zone_null(ProjectApplication::ReviewedAt))
                    .col(uuid_null(ProjectApplication::ReviewedBy))
                    .col(text_null(ProjectApplication::ReviewNotes))
                    .col(
                        timestamp_with_time_zone(ProjectApplication::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(ProjectApplication::UpdatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(&mut cascade_fk(
                        "fk_project_applications_project_id",
                        ProjectApplication::Table,
                        ProjectApplication::ProjectId,
                        Project::Table,
                        Project::Id,
                    ))
                    .foreign_key(&mut cascade_fk(
                        "fk_project_applications_user_id",
                        ProjectApplication::Table,
                        ProjectApplication::UserId,
                        User::Table,
                        User::Id,
                    ))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_project_applications_project_user")
                    .table(ProjectApplication::Table)
                    .col(ProjectApplication::ProjectId)
                    .col(ProjectApplication::UserId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Children first
        for table in [
            ProjectApplication::Table.into_iden(),
            ProjectTimeline::Table.into_iden(),
            ProjectBenefit::Table.into_iden(),
            ProjectTag::Table.into_iden(),
            ProjectMemberSkill::Table.into_iden(),
            ProjectMember::Table.into_iden(),
            ProjectRoleSkill::Table.into_iden(),
            ProjectRole::Table.into_iden(),
            ProjectRequiredSkill::Table.into_iden(),
            ProjectCondition::Table.into_iden(),
            Project::Table.into_iden(),
            Timeline::Table.into_iden(),
            Benefit::Table.into_iden(),
            Tag::Table.into_iden(),
            Skill::Table.into_iden(),
            User::Table.into_iden(),
        ] {
            manager
                .drop_table(Table::drop().table(table).to_owned())
                .await?;
        }

        Ok(())
    }
}

async fn create_catalog<T>(manager: &SchemaManager<'_>, table: T) -> Result<(), DbErr>
where
    T: IntoIden + Clone + 'static,
{
    manager
        .create_table(
            Table::create()
                .table(table)
                .if_not_exists()
                .col(uuid(Catalog::Id).primary_key())
                .col(string_len(Catalog::Name, 255).not_null())
                .col(string_len(Catalog::NameKey, 255).not_null().unique_key())
                .col(
                    timestamp_with_time_zone(Catalog::CreatedAt)
                        .not_null()
                        .default(Expr::current_timestamp()),
                )
                .col(
                    timestamp_with_time_zone(Catalog::UpdatedAt)
                        .not_null()
                        .default(Expr::current_timestamp()),
                )
                .to_owned(),
        )
        .await
}

fn cascade_fk<T, C, R, P>(
    name: &str,
    table: T,
    column: C,
    ref_table: R,
    ref_column: P,
) -> ForeignKeyCreateStatement
where
    T: IntoTableRef,
    C: IntoIden,
    R: IntoTableRef,
    P: IntoIden,
{
    ForeignKey::create()
        .name(name)
        .from(table, column)
        .to(ref_table, ref_column)
        .on_delete(ForeignKeyAction::Cascade)
        .on_update(ForeignKeyAction::Cascade)
        .to_owned()
}

// Table identifiers

#[derive(DeriveIden)]
enum User {
    #[sea_orm(iden = "users")]
    Table,
    Id,
    Name,
    Email,
    PasswordHash,
    CreatedAt,
    UpdatedAt,
}

/// Columns shared by the four catalog tables
#[derive(DeriveIden)]
enum Catalog {
    Id,
    Name,
    NameKey,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden, Clone)]
enum Skill {
    #[sea_orm(iden = "skills")]
    Table,
}

#[derive(DeriveIden, Clone)]
enum Tag {
    #[sea_orm(iden = "tags")]
    Table,
}

#[derive(DeriveIden, Clone)]
enum Benefit {
    #[sea_orm(iden = "benefits")]
    Table,
}

#[derive(DeriveIden, Clone)]
enum Timeline {
    #[sea_orm(iden = "timelines")]
    Table,
}

#[derive(DeriveIden)]
enum Project {
    #[sea_orm(iden = "projects")]
    Table,
    Id,
    CreatorId,
    Title,
    ProjectType,
    Description,
    PictureUrl,
    Status,
    CompletionStage,
    Duration,
    TotalTeam,
    StartDate,
    EndDate,
    Location,
    Budget,
    RegistrationDeadline,
    TimeCommitment,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum ProjectCondition {
    #[sea_orm(iden = "project_conditions")]
    Table,
    Id,
    ProjectId,
    Position,
    Description,
}

#[derive(DeriveIden)]
enum ProjectRequiredSkill {
    #[sea_orm(iden = "project_required_skills")]
    Table,
    ProjectId,
    SkillId,
}

#[derive(DeriveIden)]
enum ProjectRole {
    #[sea_orm(iden = "project_roles")]
    Table,
    Id,
    ProjectId,
    Name,
    SlotsAvailable,
    Description,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum ProjectRoleSkill {
    #[sea_orm(iden = "project_role_skills")]
    Table,
    ProjectRoleId,
    SkillId,
}

#[derive(DeriveIden)]
enum ProjectMember {
    #[sea_orm(iden = "project_members")]
    Table,
    Id,
    ProjectId,
    UserId,
    ProjectRoleId,
    Status,
    RoleDescription,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum ProjectMemberSkill {
    #[sea_orm(iden = "project_member_skills")]
    Table,
    ProjectMemberId,
    SkillId,
}

#[derive(DeriveIden)]
enum ProjectTag {
    #[sea_orm(iden = "project_tags")]
    Table,
    ProjectId,
    TagId,
}

#[derive(DeriveIden)]
enum ProjectBenefit {
    #[sea_orm(iden = "project_benefits")]
    Table,
    ProjectId,
    BenefitId,
}

#[derive(DeriveIden)]
enum ProjectTimeline {
    #[sea_orm(iden = "project_timelines")]
    Table,
    ProjectId,
    TimelineId,
    Status,
    Position,
}

#[derive(DeriveIden)]
enum ProjectApplication {
    #[sea_orm(iden = "project_applications")]
    Table,
    Id,
    ProjectId,
    UserId,
    ProjectRoleId,
    Status,
    WhyInterested,
    SkillsExperience,
    Contribution,
    AppliedAt,
    ReviewedAt,
    ReviewedBy,
    ReviewNotes,
    CreatedAt,
    UpdatedAt,
}
