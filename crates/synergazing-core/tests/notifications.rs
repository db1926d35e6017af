mod common;

use common::*;
use std::sync::Arc;
use std::time::Duration;
use synergazing_core::{
    spawn_dispatcher, ApplyInput, DbNotifier, NotificationEvent, NotificationService, Notifier,
    Outbox, ServiceError, Services,
};
use synergazing_db::entities::notification::NotificationKind;
use uuid::Uuid;

fn rejected(recipient: Uuid) -> NotificationEvent {
    NotificationEvent::ApplicationRejected {
        applicant_id: recipient,
        project_id: Uuid::new_v4(),
        project_title: "Open Source Telescope".to_string(),
        application_id: Uuid::new_v4(),
    }
}

#[tokio::test]
async fn test_db_notifier_stores_row_for_recipient() {
    let h = setup().await;
    let bob = create_user(&h.db, "Bob").await;

    DbNotifier::new(h.db.clone())
        .notify(&rejected(bob))
        .await
        .unwrap();

    let service = NotificationService::new(h.db.clone());
    let inbox = service.list(bob, false).await.unwrap();
    assert_eq!(inbox.len(), 1);
    assert_eq!(inbox[0].kind, NotificationKind::UserRejected);
    assert!(!inbox[0].is_read);
    assert!(inbox[0].data.as_ref().unwrap().get("application_id").is_some());
}

#[tokio::test]
async fn test_inbox_read_flags() {
    let h = setup().await;
    let bob = create_user(&h.db, "Bob").await;
    let eve = create_user(&h.db, "Eve").await;
    let notifier = DbNotifier::new(h.db.clone());
    for _ in 0..3 {
        notifier.notify(&rejected(bob)).await.unwrap();
    }

    let service = &h.services.notifications;
    assert_eq!(service.unread_count(bob).await.unwrap(), 3);

    let first = service.list(bob, true).await.unwrap()[0].id;
    assert!(matches!(
        service.mark_read(first, eve).await,
        Err(ServiceError::NotFound(_))
    ));
    let read = service.mark_read(first, bob).await.unwrap();
    assert!(read.is_read);
    assert_eq!(service.unread_count(bob).await.unwrap(), 2);

    assert_eq!(service.mark_all_read(bob).await.unwrap(), 2);
    assert_eq!(service.unread_count(bob).await.unwrap(), 0);
    assert!(service.list(bob, true).await.unwrap().is_empty());

    assert!(matches!(
        service.delete(first, eve).await,
        Err(ServiceError::NotFound(_))
    ));
    service.delete(first, bob).await.unwrap();
    assert_eq!(service.list(bob, false).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_dispatcher_delivers_committed_events() {
    let db = synergazing_db::connect("sqlite::memory:").await.unwrap();
    synergazing_db::migrate(&db).await.unwrap();

    let (outbox, rx) = Outbox::channel(16);
    let services = Services::new(db.clone(), outbox);
    let dispatcher = spawn_dispatcher(rx, Arc::new(DbNotifier::new(db.clone())));

    let creator = create_user(&db, "Alice").await;
    let bob = create_user(&db, "Bob").await;
    let project_id = published_project(&services, creator, 4, vec![role("Backend", 2)]).await;
    let backend = services
        .queries
        .public_project(project_id)
        .await
        .unwrap()
        .roles[0]
        .id;

    services
        .membership
        .apply(
            bob,
            project_id,
            ApplyInput {
                project_role_id: backend,
                why_interested: "Stars".to_string(),
                skills_experience: "Rust".to_string(),
                contribution: "Drivers".to_string(),
            },
        )
        .await
        .unwrap();

    // Dropping every outbox sender lets the dispatcher drain and exit.
    drop(services);
    tokio::time::timeout(Duration::from_secs(5), dispatcher)
        .await
        .unwrap()
        .unwrap();

    let inbox = NotificationService::new(db.clone())
        .list(creator, false)
        .await
        .unwrap();
    assert_eq!(inbox.len(), 1);
    assert_eq!(inbox[0].kind, NotificationKind::UserRegistered);
    assert_eq!(inbox[0].project_id, Some(project_id));
}
