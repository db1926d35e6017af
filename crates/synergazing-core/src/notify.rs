//! Best-effort notifications for lifecycle transitions
//!
//! Services collect [`NotificationEvent`]s while their transaction runs and
//! hand them to the [`Outbox`] only after a successful commit. A dispatcher
//! task drains the outbox and delivers each event through a [`Notifier`].
//! Delivery failures are logged and dropped; they never reach the caller.

use async_trait::async_trait;
use sea_orm::DbErr;
use serde_json::json;
use std::sync::Arc;
use synergazing_db::entities::notification::NotificationKind;
use thiserror::Error;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use uuid::Uuid;

/// Default bound of the outbox channel
pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;

#[derive(Debug, Clone, PartialEq)]
pub enum NotificationEvent {
    /// A user applied to a role; goes to the project creator
    ApplicationSubmitted {
        creator_id: Uuid,
        project_id: Uuid,
        project_title: String,
        application_id: Uuid,
        applicant_name: String,
        role_name: String,
    },
    ApplicationAccepted {
        applicant_id: Uuid,
        project_id: Uuid,
        project_title: String,
        application_id: Uuid,
        role_name: String,
    },
    ApplicationRejected {
        applicant_id: Uuid,
        project_id: Uuid,
        project_title: String,
        application_id: Uuid,
    },
    InvitationReceived {
        invitee_id: Uuid,
        project_id: Uuid,
        project_title: String,
        role_name: String,
    },
    /// The user accepted an invitation and now holds the role
    RoleAssigned {
        user_id: Uuid,
        project_id: Uuid,
        project_title: String,
        role_name: String,
    },
}

impl NotificationEvent {
    pub fn recipient(&self) -> Uuid {
        match self {
            Self::ApplicationSubmitted { creator_id, .. } => *creator_id,
            Self::ApplicationAccepted { applicant_id, .. }
            | Self::ApplicationRejected { applicant_id, .. } => *applicant_id,
            Self::InvitationReceived { invitee_id, .. } => *invitee_id,
            Self::RoleAssigned { user_id, .. } => *user_id,
        }
    }

    pub fn project_id(&self) -> Uuid {
        match self {
            Self::ApplicationSubmitted { project_id, .. }
            | Self::ApplicationAccepted { project_id, .. }
            | Self::ApplicationRejected { project_id, .. }
            | Self::InvitationReceived { project_id, .. }
            | Self::RoleAssigned { project_id, .. } => *project_id,
        }
    }

    pub fn kind(&self) -> NotificationKind {
        match self {
            Self::ApplicationSubmitted { .. } => NotificationKind::UserRegistered,
            Self::ApplicationAccepted { .. } => NotificationKind::UserAccepted,
            Self::ApplicationRejected { .. } => NotificationKind::UserRejected,
            Self::InvitationReceived { .. } => NotificationKind::InvitationReceived,
            Self::RoleAssigned { .. } => NotificationKind::RoleAssigned,
        }
    }

    pub fn title(&self) -> String {
        match self {
            Self::ApplicationSubmitted { .. } => "New application".to_string(),
            Self::ApplicationAccepted { .. } => "Application accepted".to_string(),
            Self::ApplicationRejected { .. } => "Application rejected".to_string(),
            Self::InvitationReceived { .. } => "Project invitation".to_string(),
            Self::RoleAssigned { .. } => "Role assigned".to_string(),
        }
    }

    pub fn message(&self) -> String {
        match self {
            Self::ApplicationSubmitted {
                project_title,
                applicant_name,
                role_name,
                ..
            } => format!(
                "{} applied for the {} role in \"{}\"",
                applicant_name, role_name, project_title
            ),
            Self::ApplicationAccepted {
                project_title,
                role_name,
                ..
            } => format!(
                "Your application for {} in \"{}\" was accepted",
                role_name, project_title
            ),
            Self::ApplicationRejected { project_title, .. } => {
                format!("Your application to \"{}\" was not accepted", project_title)
            }
            Self::InvitationReceived {
                project_title,
                role_name,
                ..
            } => format!(
                "You were invited to join \"{}\" as {}",
                project_title, role_name
            ),
            Self::RoleAssigned {
                project_title,
                role_name,
                ..
            } => format!("You are now {} in \"{}\"", role_name, project_title),
        }
    }

    /// Structured payload stored alongside the rendered message
    pub fn data(&self) -> serde_json::Value {
        match self {
            Self::ApplicationSubmitted {
                application_id,
                role_name,
                ..
            }
            | Self::ApplicationAccepted {
                application_id,
                role_name,
                ..
            } => json!({ "application_id": application_id, "role_name": role_name }),
            Self::ApplicationRejected { application_id, .. } => {
                json!({ "application_id": application_id })
            }
            Self::InvitationReceived { role_name, .. } | Self::RoleAssigned { role_name, .. } => {
                json!({ "role_name": role_name })
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Failed to store notification: {0}")]
    Database(#[from] DbErr),

    #[error("Notification rejected: {0}")]
    Rejected(String),
}

/// Delivery channel for notification events
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, event: &NotificationEvent) -> Result<(), NotifyError>;
}

/// Post-commit queue of notification events
#[derive(Clone, Default)]
pub struct Outbox {
    tx: Option<mpsc::Sender<NotificationEvent>>,
}

impl Outbox {
    /// Bounded outbox plus the receiving end for a dispatcher
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<NotificationEvent>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx: Some(tx) }, rx)
    }

    /// Outbox that discards every event
    pub fn disabled() -> Self {
        Self { tx: None }
    }

    /// Queue committed events. Never blocks and never fails.
    pub fn publish(&self, events: Vec<NotificationEvent>) {
        let Some(tx) = &self.tx else {
            return;
        };

        for event in events {
            match tx.try_send(event) {
                Ok(()) => {}
                Err(TrySendError::Full(event)) => {
                    warn!(
                        "Notification queue full, dropping {:?} for user {}",
                        event.kind(),
                        event.recipient()
                    );
                }
                Err(TrySendError::Closed(event)) => {
                    warn!(
                        "Notification dispatcher stopped, dropping {:?} for user {}",
                        event.kind(),
                        event.recipient()
                    );
                }
            }
        }
    }
}

/// Drain `rx` into `notifier` until every [`Outbox`] clone is dropped
pub fn spawn_dispatcher(
    mut rx: mpsc::Receiver<NotificationEvent>,
    notifier: Arc<dyn Notifier>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            match notifier.notify(&event).await {
                Ok(()) => debug!(
                    "Delivered {:?} notification to user {}",
                    event.kind(),
                    event.recipient()
                ),
                Err(e) => warn!(
                    "Failed to deliver {:?} notification to user {}: {}",
                    event.kind(),
                    event.recipient(),
                    e
                ),
            }
        }
        debug!("Notification dispatcher stopped");
    })
}
