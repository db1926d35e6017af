//! User registration, credential checks, and profile skills

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use synergazing_auth::{check_password_policy, hash_password, verify_password, PasswordError};
use synergazing_db::entities::{skill, user, user_skill};
use tracing::{debug, info, warn};
use uuid::Uuid;

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

use crate::catalog::{catalog_key, find_or_create};
use crate::error::{ServiceError, ServiceResult};

pub const MAX_PROFICIENCY: i32 = 100;

/// Public account data
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct Account {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub created_at: chrono::DateTime<Utc>,
}

impl From<user::Model> for Account {
    fn from(user: user::Model) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            created_at: user.created_at,
        }
    }
}

/// One entry of a profile skill list
#[derive(Debug, Clone, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct SkillInput {
    pub name: String,
    /// 0 to 100 inclusive
    pub proficiency: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct UserSkillView {
    pub skill_id: Uuid,
    pub name: String,
    pub proficiency: i32,
}

impl From<PasswordError> for ServiceError {
    fn from(e: PasswordError) -> Self {
        match e {
            PasswordError::TooShort => ServiceError::Validation(e.to_string()),
            _ => ServiceError::Internal(e.to_string()),
        }
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[derive(Clone)]
pub struct AccountService {
    db: DatabaseConnection,
}

impl AccountService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Create an account. Names and emails are unique; emails compare
    /// case-insensitively.
    pub async fn register(&self, name: &str, email: &str, password: &str) -> ServiceResult<Account> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ServiceError::validation("Name is required"));
        }
        let email = normalize_email(email);
        if email.is_empty() || !email.contains('@') {
            return Err(ServiceError::validation("A valid email is required"));
        }
        check_password_policy(password)?;

        let password_hash = hash_password(password)?;

        let txn = self.db.begin().await?;

        let taken = user::Entity::find()
            .filter(
                sea_orm::Condition::any()
                    .add(user::Column::Email.eq(email.as_str()))
                    .add(user::Column::Name.eq(name)),
            )
            .one(&txn)
            .await?;
        if let Some(existing) = taken {
            return Err(if existing.email == email {
                ServiceError::conflict("Email is already registered")
            } else {
                ServiceError::conflict("Name is already taken")
            });
        }

        let now = Utc::now();
        let user = user::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            email: Set(email),
            password_hash: Set(password_hash),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;

        info!("Registered user {} ({})", user.id, user.email);
        Ok(user.into())
    }

    /// Check an email/password pair. Unknown email and wrong password are
    /// indistinguishable to the caller.
    pub async fn authenticate(&self, email: &str, password: &str) -> ServiceResult<Account> {
        let email = normalize_email(email);

        let Some(user) = user::Entity::find()
            .filter(user::Column::Email.eq(email.as_str()))
            .one(&self.db)
            .await?
        else {
            warn!("Login attempt for unknown email {}", email);
            return Err(ServiceError::InvalidCredentials);
        };

        if !verify_password(password, &user.password_hash)? {
            warn!("Failed login for user {}", user.id);
            return Err(ServiceError::InvalidCredentials);
        }

        Ok(user.into())
    }

    pub async fn find(&self, user_id: Uuid) -> ServiceResult<Account> {
        user::Entity::find_by_id(user_id)
            .one(&self.db)
            .await?
            .map(Account::from)
            .ok_or_else(|| ServiceError::not_found("User"))
    }

    /// Replace the user's profile skills with `skills`. Names resolve through
    /// the shared skill catalog; the list must be non-empty and free of
    /// case-insensitive duplicates.
    pub async fn update_skills(
        &self,
        user_id: Uuid,
        skills: Vec<SkillInput>,
    ) -> ServiceResult<Vec<UserSkillView>> {
        if skills.is_empty() {
            return Err(ServiceError::validation("At least one skill is required"));
        }

        let mut seen = HashSet::new();
        for input in &skills {
            let key = catalog_key(&input.name)
                .ok_or_else(|| ServiceError::validation("Skill name cannot be empty"))?;
            if !(0..=MAX_PROFICIENCY).contains(&input.proficiency) {
                return Err(ServiceError::validation(format!(
                    "Proficiency must be between 0 and {} for skill: {}",
                    MAX_PROFICIENCY,
                    input.name.trim()
                )));
            }
            if !seen.insert(key) {
                return Err(ServiceError::validation(format!(
                    "Skill '{}' is listed more than once",
                    input.name.trim()
                )));
            }
        }

        let txn = self.db.begin().await?;

        ensure_user(&txn, user_id).await?;

        user_skill::Entity::delete_many()
            .filter(user_skill::Column::UserId.eq(user_id))
            .exec(&txn)
            .await?;

        let now = Utc::now();
        for input in &skills {
            let entry = find_or_create::<skill::Entity, _>(&txn, &input.name).await?;
            user_skill::ActiveModel {
                user_id: Set(user_id),
                skill_id: Set(entry.id),
                proficiency: Set(input.proficiency),
                created_at: Set(now),
                updated_at: Set(now),
            }
            .insert(&txn)
            .await?;
        }

        txn.commit().await?;

        info!("Updated {} profile skills for user {}", skills.len(), user_id);
        self.skills(user_id).await
    }

    /// Profile skills, alphabetically by skill name
    pub async fn skills(&self, user_id: Uuid) -> ServiceResult<Vec<UserSkillView>> {
        ensure_user(&self.db, user_id).await?;

        let rows = user_skill::Entity::find()
            .filter(user_skill::Column::UserId.eq(user_id))
            .find_also_related(skill::Entity)
            .order_by_asc(skill::Column::Name)
            .all(&self.db)
            .await?;

        Ok(rows
            .into_iter()
            .filter_map(|(row, skill)| {
                skill.map(|skill| UserSkillView {
                    skill_id: row.skill_id,
                    name: skill.name,
                    proficiency: row.proficiency,
                })
            })
            .collect())
    }

    /// Drop one skill from the profile, matched case-insensitively by name
    pub async fn remove_skill(&self, user_id: Uuid, name: &str) -> ServiceResult<()> {
        let key =
            catalog_key(name).ok_or_else(|| ServiceError::validation("Skill name cannot be empty"))?;

        let skill = skill::Entity::find()
            .filter(skill::Column::NameKey.eq(key.as_str()))
            .one(&self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Skill"))?;

        let result = user_skill::Entity::delete_many()
            .filter(user_skill::Column::UserId.eq(user_id))
            .filter(user_skill::Column::SkillId.eq(skill.id))
            .exec(&self.db)
            .await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!(
                "User does not have skill '{}'",
                skill.name
            )));
        }

        debug!("Removed skill {} from user {}", skill.id, user_id);
        Ok(())
    }
}

async fn ensure_user<C: ConnectionTrait>(conn: &C, user_id: Uuid) -> ServiceResult<()> {
    user::Entity::find_by_id(user_id)
        .one(conn)
        .await?
        .map(|_| ())
        .ok_or_else(|| ServiceError::not_found("User"))
}
