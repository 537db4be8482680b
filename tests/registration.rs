mod common;

use std::sync::Arc;

use pizzaria_api::{
    db::{create_pool, orm_from_pool, run_migrations},
    dto::auth::RegisterRequest,
    error::AppError,
    models::Role,
    realtime::EventHub,
    services::auth_service,
    state::AppState,
};
use uuid::Uuid;

use common::{FakeGateway, database_url, test_config};

async fn setup_state(database_url: &str) -> anyhow::Result<AppState> {
    let pool = create_pool(database_url).await?;
    run_migrations(&pool).await?;
    Ok(AppState {
        orm: orm_from_pool(&pool),
        pool,
        config: Arc::new(test_config(database_url)),
        payments: Arc::new(FakeGateway::default()),
        events: EventHub::default(),
    })
}

fn request(email: &str) -> RegisterRequest {
    RegisterRequest {
        name: "Joana Lima".into(),
        email: email.into(),
        password: "secret123".into(),
        phone: None,
    }
}

fn is_email_taken(result: &Result<impl Sized, AppError>) -> bool {
    matches!(result, Err(AppError::BadRequest(message)) if message == "Email is already taken")
}

#[tokio::test]
async fn duplicate_email_is_rejected_case_insensitively() -> anyhow::Result<()> {
    let Some(database_url) = database_url() else {
        eprintln!("Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run registration tests.");
        return Ok(());
    };
    let state = setup_state(&database_url).await?;
    let email = format!("joana-{}@example.com", Uuid::new_v4().simple());

    let created = auth_service::register_user(&state, request(&email))
        .await?
        .data
        .expect("profile");
    assert_eq!(created.roles, vec![Role::Customer]);
    assert_eq!(created.profile.email, email);

    let again = auth_service::register_user(&state, request(&email.to_uppercase())).await;
    assert!(is_email_taken(&again));
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn racing_registrations_leave_one_account() -> anyhow::Result<()> {
    let Some(database_url) = database_url() else {
        eprintln!("Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run registration tests.");
        return Ok(());
    };
    let state = setup_state(&database_url).await?;
    let email = format!("race-{}@example.com", Uuid::new_v4().simple());

    let (first, second) = tokio::join!(
        auth_service::register_user(&state, request(&email)),
        auth_service::register_user(&state, request(&email)),
    );

    let created = [first.is_ok(), second.is_ok()]
        .into_iter()
        .filter(|ok| *ok)
        .count();
    assert_eq!(created, 1, "exactly one registration wins");
    assert!(first.is_ok() || is_email_taken(&first));
    assert!(second.is_ok() || is_email_taken(&second));

    let (accounts,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users WHERE email = $1")
        .bind(email.as_str())
        .fetch_one(&state.pool)
        .await?;
    assert_eq!(accounts, 1);
    Ok(())
}
