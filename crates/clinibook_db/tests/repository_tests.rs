//! Integration tests for the SQL repositories against a SQLite file database.
//!
//! A temp file is used instead of `sqlite::memory:` because every pooled
//! connection would otherwise see its own empty in-memory database.

use chrono::NaiveDate;
use clinibook_common::models::{AppointmentType, ProviderStatus};
use clinibook_db::{
    AppointmentRepository, DbClient, DbError, NewAppointment, NewProvider, NewUser,
    ProviderRepository, SqlAppointmentRepository, SqlProviderRepository, SqlUserRepository,
    UserRepository,
};
use tempfile::TempDir;
use uuid::Uuid;

async fn setup() -> (TempDir, DbClient) {
    let dir = TempDir::new().expect("temp dir");
    let db_path = dir.path().join("clinibook_test.db");
    let url = format!("sqlite://{}", db_path.display());
    let client = DbClient::from_url(&url).await.expect("db client");
    (dir, client)
}

fn new_appointment(provider_id: Uuid, user_id: Uuid, date: NaiveDate, time: &str) -> NewAppointment {
    NewAppointment {
        date,
        time: time.to_string(),
        kind: AppointmentType::Online,
        reason: "Initial consultation".to_string(),
        user_id,
        provider_id,
    }
}

#[tokio::test]
async fn appointment_insert_and_find_round_trip() {
    let (_dir, client) = setup().await;
    let repo = SqlAppointmentRepository::new(client);
    repo.init_schema().await.expect("schema");

    let provider_id = Uuid::new_v4();
    let user_id = Uuid::new_v4();
    let date = NaiveDate::from_ymd_opt(2099, 6, 15).unwrap();

    let created = repo
        .insert(new_appointment(provider_id, user_id, date, "09:50"))
        .await
        .expect("insert");

    assert!(!created.confirmed);
    assert!(!created.cancelled);
    assert_eq!(created.google_event_id, None);

    let found = repo
        .find_by_id(created.id)
        .await
        .expect("find")
        .expect("some");
    assert_eq!(found.date, date);
    assert_eq!(found.time, "09:50");
    assert_eq!(found.kind, AppointmentType::Online);
    assert_eq!(found.user_id, user_id);
    assert_eq!(found.provider_id, provider_id);
    assert_eq!(found.created_at, created.created_at);
}

#[tokio::test]
async fn duplicate_active_slot_is_rejected() {
    let (_dir, client) = setup().await;
    let repo = SqlAppointmentRepository::new(client);
    repo.init_schema().await.expect("schema");

    let provider_id = Uuid::new_v4();
    let date = NaiveDate::from_ymd_opt(2099, 6, 15).unwrap();

    repo.insert(new_appointment(provider_id, Uuid::new_v4(), date, "10:40"))
        .await
        .expect("first insert");

    let err = repo
        .insert(new_appointment(provider_id, Uuid::new_v4(), date, "10:40"))
        .await
        .expect_err("second insert must fail");

    assert!(matches!(err, DbError::UniqueViolation(_)), "got {err:?}");
}

#[tokio::test]
async fn cancelled_appointment_frees_its_slot() {
    let (_dir, client) = setup().await;
    let repo = SqlAppointmentRepository::new(client);
    repo.init_schema().await.expect("schema");

    let provider_id = Uuid::new_v4();
    let date = NaiveDate::from_ymd_opt(2099, 6, 15).unwrap();

    let mut first = repo
        .insert(new_appointment(provider_id, Uuid::new_v4(), date, "11:30"))
        .await
        .expect("insert");

    first.cancelled = true;
    repo.update(first).await.expect("cancel");

    // The slot is free again once the occupant is cancelled.
    repo.insert(new_appointment(provider_id, Uuid::new_v4(), date, "11:30"))
        .await
        .expect("rebook freed slot");
}

#[tokio::test]
async fn same_slot_different_provider_is_allowed() {
    let (_dir, client) = setup().await;
    let repo = SqlAppointmentRepository::new(client);
    repo.init_schema().await.expect("schema");

    let date = NaiveDate::from_ymd_opt(2099, 6, 15).unwrap();

    repo.insert(new_appointment(Uuid::new_v4(), Uuid::new_v4(), date, "14:00"))
        .await
        .expect("first provider");
    repo.insert(new_appointment(Uuid::new_v4(), Uuid::new_v4(), date, "14:00"))
        .await
        .expect("second provider");
}

#[tokio::test]
async fn upcoming_and_past_split_on_today() {
    let (_dir, client) = setup().await;
    let repo = SqlAppointmentRepository::new(client);
    repo.init_schema().await.expect("schema");

    let provider_id = Uuid::new_v4();
    let user_id = Uuid::new_v4();
    let today = NaiveDate::from_ymd_opt(2099, 6, 15).unwrap();
    let yesterday = today.pred_opt().unwrap();
    let tomorrow = today.succ_opt().unwrap();

    repo.insert(new_appointment(provider_id, user_id, yesterday, "09:00"))
        .await
        .expect("past");
    repo.insert(new_appointment(provider_id, user_id, today, "09:00"))
        .await
        .expect("today");
    repo.insert(new_appointment(provider_id, user_id, tomorrow, "09:00"))
        .await
        .expect("future");

    let upcoming = repo.find_upcoming(today).await.expect("upcoming");
    assert_eq!(upcoming.len(), 1);
    assert_eq!(upcoming[0].date, tomorrow);

    let past = repo.find_past(today).await.expect("past");
    assert_eq!(past.len(), 1);
    assert_eq!(past[0].date, yesterday);
}

#[tokio::test]
async fn find_active_slot_honors_exclusion() {
    let (_dir, client) = setup().await;
    let repo = SqlAppointmentRepository::new(client);
    repo.init_schema().await.expect("schema");

    let provider_id = Uuid::new_v4();
    let date = NaiveDate::from_ymd_opt(2099, 6, 15).unwrap();

    let created = repo
        .insert(new_appointment(provider_id, Uuid::new_v4(), date, "15:40"))
        .await
        .expect("insert");

    let occupant = repo
        .find_active_slot(provider_id, date, "15:40", None)
        .await
        .expect("lookup");
    assert_eq!(occupant.map(|a| a.id), Some(created.id));

    // A record does not conflict with itself on the update path.
    let excluded = repo
        .find_active_slot(provider_id, date, "15:40", Some(created.id))
        .await
        .expect("lookup");
    assert!(excluded.is_none());
}

#[tokio::test]
async fn delete_removes_the_record() {
    let (_dir, client) = setup().await;
    let repo = SqlAppointmentRepository::new(client);
    repo.init_schema().await.expect("schema");

    let created = repo
        .insert(new_appointment(
            Uuid::new_v4(),
            Uuid::new_v4(),
            NaiveDate::from_ymd_opt(2099, 6, 15).unwrap(),
            "16:30",
        ))
        .await
        .expect("insert");

    assert!(repo.delete(created.id).await.expect("delete"));
    assert!(!repo.delete(created.id).await.expect("second delete"));
    assert!(repo.find_by_id(created.id).await.expect("find").is_none());
}

#[tokio::test]
async fn provider_lifecycle_and_uniqueness() {
    let (_dir, client) = setup().await;
    let repo = SqlProviderRepository::new(client);
    repo.init_schema().await.expect("schema");

    let created = repo
        .insert(NewProvider {
            first_name: "Ana".to_string(),
            last_name: "Ruiz".to_string(),
            email: "ana@example.com".to_string(),
            phone: None,
            specialty: Some("Clinical psychology".to_string()),
            description: None,
            calendar_id: "ana@group.calendar.google.com".to_string(),
            key_path: None,
        })
        .await
        .expect("insert");
    assert_eq!(created.status, ProviderStatus::Active);

    let err = repo
        .insert(NewProvider {
            first_name: "Other".to_string(),
            last_name: "Person".to_string(),
            email: "ana@example.com".to_string(),
            phone: None,
            specialty: None,
            description: None,
            calendar_id: "other@group.calendar.google.com".to_string(),
            key_path: None,
        })
        .await
        .expect_err("duplicate email must fail");
    assert!(matches!(err, DbError::UniqueViolation(_)), "got {err:?}");

    let deactivated = repo
        .set_status(created.id, ProviderStatus::Inactive)
        .await
        .expect("deactivate");
    assert_eq!(deactivated.status, ProviderStatus::Inactive);

    // Deactivated providers drop out of the active listing but stay findable.
    assert!(repo.find_active().await.expect("active").is_empty());
    assert!(repo
        .find_by_id(created.id)
        .await
        .expect("find")
        .is_some());
}

#[tokio::test]
async fn user_round_trip_and_unique_email() {
    let (_dir, client) = setup().await;
    let repo = SqlUserRepository::new(client);
    repo.init_schema().await.expect("schema");

    let created = repo
        .insert(NewUser {
            first_name: "Mia".to_string(),
            last_name: "Koch".to_string(),
            email: "mia@example.com".to_string(),
            phone: Some("+41790000000".to_string()),
        })
        .await
        .expect("insert");

    let found = repo
        .find_by_id(created.id)
        .await
        .expect("find")
        .expect("some");
    assert_eq!(found.email, "mia@example.com");
    assert_eq!(found.phone.as_deref(), Some("+41790000000"));

    let err = repo
        .insert(NewUser {
            first_name: "Mia".to_string(),
            last_name: "Other".to_string(),
            email: "mia@example.com".to_string(),
            phone: None,
        })
        .await
        .expect_err("duplicate email must fail");
    assert!(matches!(err, DbError::UniqueViolation(_)), "got {err:?}");
}

#[tokio::test]
async fn concurrent_inserts_for_same_slot_yield_one_winner() {
    let (_dir, client) = setup().await;
    let repo = std::sync::Arc::new(SqlAppointmentRepository::new(client));
    repo.init_schema().await.expect("schema");

    let provider_id = Uuid::new_v4();
    let date = NaiveDate::from_ymd_opt(2099, 6, 15).unwrap();

    let mut handles = Vec::new();
    for _ in 0..4 {
        let repo = repo.clone();
        handles.push(tokio::spawn(async move {
            repo.insert(new_appointment(provider_id, Uuid::new_v4(), date, "17:20"))
                .await
        }));
    }

    let mut successes = 0;
    let mut conflicts = 0;
    for handle in handles {
        match handle.await.expect("join") {
            Ok(_) => successes += 1,
            Err(DbError::UniqueViolation(_)) => conflicts += 1,
            Err(other) => panic!("unexpected error: {other:?}"),
        }
    }

    assert_eq!(successes, 1);
    assert_eq!(conflicts, 3);
}
