#![allow(dead_code)]

use chrono::{Duration, Utc};
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use synergazing_core::{
    MemberInput, Outbox, RoleInput, Services, Stage1Input, Stage2Input, Stage3Input, Stage4Input,
    Stage5Input,
};
use synergazing_db::entities::user;
use tokio::sync::mpsc;
use uuid::Uuid;

pub struct Harness {
    pub db: DatabaseConnection,
    pub services: Services,
    pub events: mpsc::Receiver<synergazing_core::NotificationEvent>,
}

pub async fn setup() -> Harness {
    let db = synergazing_db::connect("sqlite::memory:").await.unwrap();
    synergazing_db::migrate(&db).await.unwrap();

    let (outbox, events) = Outbox::channel(64);
    let services = Services::new(db.clone(), outbox);

    Harness {
        db,
        services,
        events,
    }
}

pub async fn create_user(db: &DatabaseConnection, name: &str) -> Uuid {
    let now = Utc::now();
    user::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name.to_string()),
        email: Set(format!("{}@example.com", name.to_lowercase())),
        password_hash: Set("unused".to_string()),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await
    .unwrap()
    .id
}

pub fn stage1() -> Stage1Input {
    Stage1Input {
        title: "Open Source Telescope".to_string(),
        project_type: "hackathon".to_string(),
        description: "Build a telescope control system".to_string(),
        picture_url: None,
    }
}

pub fn stage2(total_team: i32) -> Stage2Input {
    let now = Utc::now();
    Stage2Input {
        duration: Some("3 months".to_string()),
        total_team,
        start_date: now + Duration::days(30),
        end_date: now + Duration::days(120),
        location: Some("Remote".to_string()),
        budget: None,
        registration_deadline: now + Duration::days(20),
    }
}

pub fn stage3() -> Stage3Input {
    Stage3Input {
        time_commitment: "10 hours/week".to_string(),
        required_skills: vec!["Rust".to_string(), "Embedded".to_string()],
        conditions: vec!["Weekly sync".to_string()],
    }
}

pub fn role(name: &str, slots: i32) -> RoleInput {
    RoleInput {
        name: name.to_string(),
        slots_available: slots,
        description: None,
        skill_names: vec!["Rust".to_string()],
    }
}

pub fn member(name: &str, role_name: &str) -> MemberInput {
    MemberInput {
        name: name.to_string(),
        role_name: role_name.to_string(),
        role_description: None,
        skill_names: Vec::new(),
    }
}

pub fn stage4(roles: Vec<RoleInput>, members: Vec<MemberInput>) -> Stage4Input {
    Stage4Input { roles, members }
}

pub fn stage5() -> Stage5Input {
    Stage5Input {
        benefits: vec!["Certificate".to_string()],
        timeline: vec!["Kickoff".to_string(), "Demo day".to_string()],
        tags: vec!["astronomy".to_string()],
    }
}

/// Run all five stages; returns the project id
pub async fn published_project(
    services: &Services,
    creator: Uuid,
    total_team: i32,
    roles: Vec<RoleInput>,
) -> Uuid {
    let project = services.wizard.create_stage1(creator, stage1()).await.unwrap();
    services
        .wizard
        .update_stage2(project.id, creator, stage2(total_team))
        .await
        .unwrap();
    services
        .wizard
        .update_stage3(project.id, creator, stage3())
        .await
        .unwrap();
    services
        .wizard
        .update_stage4(project.id, creator, stage4(roles, Vec::new()))
        .await
        .unwrap();
    services
        .wizard
        .update_stage5(project.id, creator, stage5())
        .await
        .unwrap();
    project.id
}

/// Drain whatever is currently queued in the outbox
pub fn drain(rx: &mut mpsc::Receiver<synergazing_core::NotificationEvent>) -> Vec<synergazing_core::NotificationEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}
