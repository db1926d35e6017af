mod common;

use common::*;
use sea_orm::EntityTrait;
use synergazing_core::{NotificationEvent, ServiceError, Stage5Input};
use synergazing_db::entities::{
    project::ProjectStatus, project_member::MemberStatus, project_timeline::TimelineStatus, skill,
};

#[tokio::test]
async fn test_wizard_happy_path_publishes_project() {
    let h = setup().await;
    let creator = create_user(&h.db, "Alice").await;

    let project = h.services.wizard.create_stage1(creator, stage1()).await.unwrap();
    assert_eq!(project.status, ProjectStatus::Draft);
    assert_eq!(project.completion_stage, 1);
    assert_eq!(project.creator.id, creator);

    let project = h
        .services
        .wizard
        .update_stage2(project.id, creator, stage2(5))
        .await
        .unwrap();
    assert_eq!(project.completion_stage, 2);
    assert_eq!(project.capacity.total_team, 5);
    assert_eq!(project.capacity.remaining_team, 5);

    let project = h
        .services
        .wizard
        .update_stage3(project.id, creator, stage3())
        .await
        .unwrap();
    assert_eq!(project.required_skills.len(), 2);
    assert_eq!(project.conditions.len(), 1);

    let project = h
        .services
        .wizard
        .update_stage4(
            project.id,
            creator,
            stage4(vec![role("Backend", 2), role("Frontend", 1)], Vec::new()),
        )
        .await
        .unwrap();
    assert_eq!(project.roles.len(), 2);
    assert_eq!(project.capacity.total_role_slots, 3);
    assert_eq!(project.capacity.remaining_team, 2);

    let project = h
        .services
        .wizard
        .update_stage5(project.id, creator, stage5())
        .await
        .unwrap();
    assert_eq!(project.status, ProjectStatus::Published);
    assert_eq!(project.completion_stage, 5);
    assert_eq!(project.benefits.len(), 1);
    assert_eq!(project.tags.len(), 1);
    assert_eq!(project.timeline.len(), 2);
    assert_eq!(project.timeline[0].name, "Kickoff");
    assert_eq!(project.timeline[0].status, TimelineStatus::NotStarted);
}

#[tokio::test]
async fn test_stage_out_of_order_is_rejected() {
    let h = setup().await;
    let creator = create_user(&h.db, "Alice").await;

    let project = h.services.wizard.create_stage1(creator, stage1()).await.unwrap();

    let err = h
        .services
        .wizard
        .update_stage3(project.id, creator, stage3())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::StageSequence {
            stage: 3,
            current: 1
        }
    ));

    let view = h.services.queries.user_project(creator, project.id).await.unwrap();
    assert_eq!(view.completion_stage, 1);
    assert!(view.required_skills.is_empty());
}

#[tokio::test]
async fn test_stage1_requires_title() {
    let h = setup().await;
    let creator = create_user(&h.db, "Alice").await;

    let mut input = stage1();
    input.title = "   ".to_string();
    let err = h.services.wizard.create_stage1(creator, input).await.unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));
}

#[tokio::test]
async fn test_stage2_rejects_end_before_start() {
    let h = setup().await;
    let creator = create_user(&h.db, "Alice").await;
    let project = h.services.wizard.create_stage1(creator, stage1()).await.unwrap();

    let mut input = stage2(4);
    input.end_date = input.start_date - chrono::Duration::days(1);
    let err = h
        .services
        .wizard
        .update_stage2(project.id, creator, input)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));
}

#[tokio::test]
async fn test_stage_write_by_non_creator_has_no_effect() {
    let h = setup().await;
    let creator = create_user(&h.db, "Alice").await;
    let intruder = create_user(&h.db, "Mallory").await;
    let project = h.services.wizard.create_stage1(creator, stage1()).await.unwrap();

    let err = h
        .services
        .wizard
        .update_stage2(project.id, intruder, stage2(10))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Unauthorized(_)));

    let view = h.services.queries.user_project(creator, project.id).await.unwrap();
    assert_eq!(view.completion_stage, 1);
    assert_eq!(view.capacity.total_team, 0);
}

#[tokio::test]
async fn test_stage4_over_capacity_is_rejected() {
    let h = setup().await;
    let creator = create_user(&h.db, "Alice").await;
    let _bob = create_user(&h.db, "Bob").await;

    let project = h.services.wizard.create_stage1(creator, stage1()).await.unwrap();
    h.services
        .wizard
        .update_stage2(project.id, creator, stage2(3))
        .await
        .unwrap();
    h.services
        .wizard
        .update_stage3(project.id, creator, stage3())
        .await
        .unwrap();

    let err = h
        .services
        .wizard
        .update_stage4(
            project.id,
            creator,
            stage4(vec![role("Backend", 3)], vec![member("Bob", "Backend")]),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Capacity(_)));

    let view = h.services.queries.user_project(creator, project.id).await.unwrap();
    assert_eq!(view.completion_stage, 3);
    assert!(view.roles.is_empty());
    assert!(view.members.is_empty());
}

#[tokio::test]
async fn test_stage4_rejects_empty_allocation() {
    let h = setup().await;
    let creator = create_user(&h.db, "Alice").await;

    let project = h.services.wizard.create_stage1(creator, stage1()).await.unwrap();
    h.services
        .wizard
        .update_stage2(project.id, creator, stage2(3))
        .await
        .unwrap();
    h.services
        .wizard
        .update_stage3(project.id, creator, stage3())
        .await
        .unwrap();

    let err = h
        .services
        .wizard
        .update_stage4(project.id, creator, stage4(vec![role("Backend", 0)], Vec::new()))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Capacity(_)));
}

#[tokio::test]
async fn test_stage4_extreme_slot_counts_are_rejected() {
    let h = setup().await;
    let creator = create_user(&h.db, "Alice").await;

    let project = h.services.wizard.create_stage1(creator, stage1()).await.unwrap();
    h.services
        .wizard
        .update_stage2(project.id, creator, stage2(2))
        .await
        .unwrap();
    h.services
        .wizard
        .update_stage3(project.id, creator, stage3())
        .await
        .unwrap();

    let err = h
        .services
        .wizard
        .update_stage4(
            project.id,
            creator,
            stage4(
                vec![role("Backend", i32::MAX), role("Frontend", i32::MAX)],
                Vec::new(),
            ),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Capacity(_)));

    let err = h
        .services
        .wizard
        .update_stage4(project.id, creator, stage4(vec![role("Backend", 3)], Vec::new()))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Capacity(_)));

    let view = h.services.queries.user_project(creator, project.id).await.unwrap();
    assert_eq!(view.completion_stage, 3);
    assert!(view.roles.is_empty());
}

#[tokio::test]
async fn test_stage4_seeds_members_and_notifies_them() {
    let mut h = setup().await;
    let creator = create_user(&h.db, "Alice").await;
    let bob = create_user(&h.db, "Bob").await;

    let project = h.services.wizard.create_stage1(creator, stage1()).await.unwrap();
    h.services
        .wizard
        .update_stage2(project.id, creator, stage2(4))
        .await
        .unwrap();
    h.services
        .wizard
        .update_stage3(project.id, creator, stage3())
        .await
        .unwrap();
    drain(&mut h.events);

    let view = h
        .services
        .wizard
        .update_stage4(
            project.id,
            creator,
            stage4(vec![role("Backend", 2)], vec![member("Bob", "backend")]),
        )
        .await
        .unwrap();

    assert_eq!(view.members.len(), 1);
    assert_eq!(view.members[0].user.id, bob);
    assert_eq!(view.members[0].status, MemberStatus::Invited);
    assert_eq!(view.members[0].role_name, "Backend");
    assert_eq!(view.capacity.filled_team, 1);
    assert_eq!(view.capacity.remaining_team, 1);

    let events = drain(&mut h.events);
    assert_eq!(events.len(), 1);
    assert!(matches!(
        &events[0],
        NotificationEvent::InvitationReceived { invitee_id, .. } if *invitee_id == bob
    ));
}

#[tokio::test]
async fn test_stage4_unknown_member_fails_without_changes() {
    let h = setup().await;
    let creator = create_user(&h.db, "Alice").await;

    let project = h.services.wizard.create_stage1(creator, stage1()).await.unwrap();
    h.services
        .wizard
        .update_stage2(project.id, creator, stage2(4))
        .await
        .unwrap();
    h.services
        .wizard
        .update_stage3(project.id, creator, stage3())
        .await
        .unwrap();

    let err = h
        .services
        .wizard
        .update_stage4(
            project.id,
            creator,
            stage4(vec![role("Backend", 2)], vec![member("Nobody", "Backend")]),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
}

#[tokio::test]
async fn test_stage4_resubmission_replaces_team() {
    let h = setup().await;
    let creator = create_user(&h.db, "Alice").await;
    let project_id = published_project(&h.services, creator, 5, vec![role("Backend", 2)]).await;

    let view = h
        .services
        .wizard
        .update_stage4(project_id, creator, stage4(vec![role("Design", 1)], Vec::new()))
        .await
        .unwrap();

    assert_eq!(view.roles.len(), 1);
    assert_eq!(view.roles[0].name, "Design");
    assert_eq!(view.status, ProjectStatus::Published);
    assert_eq!(view.completion_stage, 5);
}

#[tokio::test]
async fn test_stage2_cannot_shrink_below_allocation() {
    let h = setup().await;
    let creator = create_user(&h.db, "Alice").await;
    let project_id = published_project(&h.services, creator, 5, vec![role("Backend", 4)]).await;

    let err = h
        .services
        .wizard
        .update_stage2(project_id, creator, stage2(3))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Capacity(_)));

    let view = h
        .services
        .wizard
        .update_stage2(project_id, creator, stage2(4))
        .await
        .unwrap();
    assert_eq!(view.capacity.remaining_team, 0);
}

#[tokio::test]
async fn test_stage5_requires_benefit() {
    let h = setup().await;
    let creator = create_user(&h.db, "Alice").await;

    let project = h.services.wizard.create_stage1(creator, stage1()).await.unwrap();
    h.services
        .wizard
        .update_stage2(project.id, creator, stage2(3))
        .await
        .unwrap();
    h.services
        .wizard
        .update_stage3(project.id, creator, stage3())
        .await
        .unwrap();
    h.services
        .wizard
        .update_stage4(project.id, creator, stage4(vec![role("Backend", 1)], Vec::new()))
        .await
        .unwrap();

    let err = h
        .services
        .wizard
        .update_stage5(
            project.id,
            creator,
            Stage5Input {
                benefits: vec!["  ".to_string()],
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));
}

#[tokio::test]
async fn test_catalog_names_are_shared_case_insensitively() {
    let h = setup().await;
    let alice = create_user(&h.db, "Alice").await;
    let bob = create_user(&h.db, "Bob").await;

    let first = h.services.wizard.create_stage1(alice, stage1()).await.unwrap();
    h.services
        .wizard
        .update_stage2(first.id, alice, stage2(3))
        .await
        .unwrap();
    let first = h
        .services
        .wizard
        .update_stage3(first.id, alice, stage3())
        .await
        .unwrap();

    let second = h.services.wizard.create_stage1(bob, stage1()).await.unwrap();
    h.services
        .wizard
        .update_stage2(second.id, bob, stage2(3))
        .await
        .unwrap();
    let mut input = stage3();
    input.required_skills = vec![" rust ".to_string(), "RUST".to_string()];
    let second = h
        .services
        .wizard
        .update_stage3(second.id, bob, input)
        .await
        .unwrap();

    assert_eq!(second.required_skills.len(), 1);
    let rust = first
        .required_skills
        .iter()
        .find(|s| s.name == "Rust")
        .unwrap();
    assert_eq!(second.required_skills[0].id, rust.id);
    assert_eq!(second.required_skills[0].name, "Rust");

    let all = skill::Entity::find().all(&h.db).await.unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(h.services.queries.skills().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_timeline_status_update() {
    let h = setup().await;
    let creator = create_user(&h.db, "Alice").await;
    let project_id = published_project(&h.services, creator, 3, vec![role("Backend", 1)]).await;

    let view = h.services.queries.public_project(project_id).await.unwrap();
    let kickoff = view.timeline[0].id;

    let view = h
        .services
        .wizard
        .update_timeline_status(project_id, kickoff, creator, TimelineStatus::Done)
        .await
        .unwrap();
    assert_eq!(view.timeline[0].status, TimelineStatus::Done);
    assert_eq!(view.timeline[1].status, TimelineStatus::NotStarted);
}

#[tokio::test]
async fn test_delete_project_removes_it_from_listings() {
    let h = setup().await;
    let creator = create_user(&h.db, "Alice").await;
    let intruder = create_user(&h.db, "Mallory").await;
    let project_id = published_project(&h.services, creator, 3, vec![role("Backend", 1)]).await;

    let err = h
        .services
        .wizard
        .delete_project(project_id, intruder)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Unauthorized(_)));

    h.services.wizard.delete_project(project_id, creator).await.unwrap();

    assert!(h.services.queries.published_projects().await.unwrap().is_empty());
    let err = h.services.queries.public_project(project_id).await.unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
}

#[tokio::test]
async fn test_drafts_are_not_public() {
    let h = setup().await;
    let creator = create_user(&h.db, "Alice").await;
    let stranger = create_user(&h.db, "Eve").await;
    let draft = h.services.wizard.create_stage1(creator, stage1()).await.unwrap();

    assert!(h.services.queries.published_projects().await.unwrap().is_empty());
    assert!(h.services.queries.public_project(draft.id).await.is_err());
    assert!(h.services.queries.user_project(stranger, draft.id).await.is_err());

    let mine = h.services.queries.user_projects(creator).await.unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(h.services.queries.created_projects(creator).await.unwrap().len(), 1);
}
