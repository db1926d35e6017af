//! Profile skills with proficiency

use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(UserSkill::Table)
                    .if_not_exists()
                    .col(uuid(UserSkill::UserId))
                    .col(uuid(UserSkill::SkillId))
                    .col(
                        integer(UserSkill::Proficiency).check(
                            Expr::col(UserSkill::Proficiency)
                                .gte(0)
                                .and(Expr::col(UserSkill::Proficiency).lte(100)),
                        ),
                    )
                    .col(
                        timestamp_with_time_zone(UserSkill::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(UserSkill::UpdatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .primary_key(
                        Index::create()
                            .col(UserSkill::UserId)
                            .col(UserSkill::SkillId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_skills_user_id")
                            .from(UserSkill::Table, UserSkill::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_skills_skill_id")
                            .from(UserSkill::Table, UserSkill::SkillId)
                            .to(Skill::Table, Skill::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(UserSkill::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum UserSkill {
    #[sea_orm(iden = "user_skills")]
    Table,
    UserId,
    SkillId,
    Proficiency,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum User {
    #[sea_orm(iden = "users")]
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Skill {
    #[sea_orm(iden = "skills")]
    Table,
    Id,
}
