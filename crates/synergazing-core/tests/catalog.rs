mod common;

use chrono::Utc;
use common::*;
use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use synergazing_core::catalog::{find_or_create, find_or_create_all};
use synergazing_db::entities::{skill, tag};
use uuid::Uuid;

#[tokio::test]
async fn test_concurrent_lookups_share_one_row() {
    let h = setup().await;

    let (a, b, c) = tokio::join!(
        find_or_create::<skill::Entity, _>(&h.db, "Rust"),
        find_or_create::<skill::Entity, _>(&h.db, "rust"),
        find_or_create::<skill::Entity, _>(&h.db, " RUST "),
    );
    let (a, b, c) = (a.unwrap(), b.unwrap(), c.unwrap());

    assert_eq!(a.id, b.id);
    assert_eq!(b.id, c.id);

    let rows = skill::Entity::find().all(&h.db).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].name_key, "rust");
}

#[tokio::test]
async fn test_existing_row_is_returned_for_other_casing() {
    let h = setup().await;
    let now = Utc::now();
    let existing = tag::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set("Open Source".to_string()),
        name_key: Set("open source".to_string()),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&h.db)
    .await
    .unwrap();

    let entry = find_or_create::<tag::Entity, _>(&h.db, "  OPEN SOURCE").await.unwrap();
    assert_eq!(entry.id, existing.id);
    assert_eq!(entry.name, "Open Source");
}

#[tokio::test]
async fn test_blank_name_is_rejected() {
    let h = setup().await;

    let err = find_or_create::<skill::Entity, _>(&h.db, "   ").await.unwrap_err();
    assert!(matches!(err, synergazing_core::ServiceError::Validation(_)));
}

#[tokio::test]
async fn test_batch_skips_blanks_and_duplicates() {
    let h = setup().await;

    let names = vec![
        "Go".to_string(),
        "".to_string(),
        "go".to_string(),
        "Rust".to_string(),
    ];
    let entries = find_or_create_all::<skill::Entity, _>(&h.db, &names).await.unwrap();

    let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["Go", "Rust"]);
}
