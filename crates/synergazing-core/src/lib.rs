//! Synergazing domain services
//!
//! Everything that changes project state goes through one of the services
//! bundled in [`Services`]:
//!
//! - [`ProjectWizard`]: the five-stage project builder
//! - [`ProjectQueries`]: access-filtered project reads
//! - [`MembershipService`]: applications, invitations, and team changes
//! - [`AccountService`]: registration, credential checks, and profile skills
//! - [`NotificationService`]: the per-user notification inbox
//!
//! Each mutation runs in a single database transaction. Notification events
//! are published to the [`Outbox`] after commit and delivered asynchronously.

pub mod accounts;
pub mod capacity;
pub mod catalog;
pub mod error;
pub mod membership;
pub mod notifications;
pub mod notify;
pub mod views;
pub mod wizard;

pub use accounts::{Account, AccountService, SkillInput, UserSkillView};
pub use capacity::{check_allocation, TeamCapacity};
pub use catalog::{catalog_key, CatalogEntry};
pub use error::{ServiceError, ServiceResult};
pub use membership::{
    ApplicationView, ApplyInput, InvitationResponse, InvitationView, InviteInput,
    MembershipService, ReviewAction,
};
pub use notifications::{DbNotifier, NotificationService, NotificationView};
pub use notify::{
    spawn_dispatcher, NotificationEvent, Notifier, NotifyError, Outbox, DEFAULT_QUEUE_CAPACITY,
};
pub use views::{
    ConditionView, MemberView, ProjectQueries, ProjectView, RoleView, TeamCapacityView,
    TimelineEntryView, UserSummary,
};
pub use wizard::{
    MemberInput, ProjectWizard, RoleInput, Stage1Input, Stage2Input, Stage3Input, Stage4Input,
    Stage5Input, FINAL_STAGE,
};

use sea_orm::DatabaseConnection;

/// All domain services over one connection pool
#[derive(Clone)]
pub struct Services {
    pub wizard: ProjectWizard,
    pub queries: ProjectQueries,
    pub membership: MembershipService,
    pub accounts: AccountService,
    pub notifications: NotificationService,
}

impl Services {
    pub fn new(db: DatabaseConnection, outbox: Outbox) -> Self {
        Self {
            wizard: ProjectWizard::new(db.clone(), outbox.clone()),
            queries: ProjectQueries::new(db.clone()),
            membership: MembershipService::new(db.clone(), outbox),
            accounts: AccountService::new(db.clone()),
            notifications: NotificationService::new(db),
        }
    }
}
