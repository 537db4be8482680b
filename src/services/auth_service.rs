use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use password_hash::rand_core::OsRng;
use uuid::Uuid;

use crate::{
    audit,
    config::AppConfig,
    db::DbPool,
    dto::auth::{Claims, LoginRequest, LoginResponse, MeResponse, RegisterRequest},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Profile, Role},
    response::{ApiResponse, Meta},
    state::AppState,
};

const MIN_PASSWORD_CHARS: usize = 6;

#[derive(sqlx::FromRow)]
struct Credentials {
    id: Uuid,
    password_hash: String,
}

pub async fn register_user(
    state: &AppState,
    payload: RegisterRequest,
) -> AppResult<ApiResponse<MeResponse>> {
    let RegisterRequest {
        name,
        email,
        password,
        phone,
    } = payload;
    let name = name.trim().to_string();
    let email = email.trim().to_lowercase();
    let phone = phone
        .map(|phone| phone.trim().to_string())
        .filter(|phone| !phone.is_empty());

    if name.is_empty() {
        return Err(AppError::BadRequest("Name is required".into()));
    }
    if !email.contains('@') {
        return Err(AppError::BadRequest("Email is invalid".into()));
    }
    if password.chars().count() < MIN_PASSWORD_CHARS {
        return Err(AppError::BadRequest(
            "Password must have at least 6 characters".into(),
        ));
    }

    let exist: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM users WHERE email = $1")
        .bind(email.as_str())
        .fetch_optional(&state.pool)
        .await?;
    if exist.is_some() {
        return Err(email_taken());
    }

    let password_hash = hash_password(&password)?;
    let id = Uuid::new_v4();

    let mut tx = state.pool.begin().await?;
    sqlx::query("INSERT INTO users (id, email, password_hash) VALUES ($1, $2, $3)")
        .bind(id)
        .bind(email.as_str())
        .bind(password_hash)
        .execute(&mut *tx)
        .await
        .map_err(|err| {
            // A concurrent registration won the race for this email.
            if err
                .as_database_error()
                .is_some_and(|db| db.is_unique_violation())
            {
                email_taken()
            } else {
                AppError::from(err)
            }
        })?;
    let profile: Profile = sqlx::query_as(
        r#"
        INSERT INTO profiles (id, name, email, phone)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(name.as_str())
    .bind(email.as_str())
    .bind(phone)
    .fetch_one(&mut *tx)
    .await?;
    sqlx::query("INSERT INTO user_roles (id, user_id, role) VALUES ($1, $2, $3)")
        .bind(Uuid::new_v4())
        .bind(id)
        .bind(Role::Customer.as_str())
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    audit::record(
        &state.orm,
        Some(id),
        "user_register",
        "users",
        serde_json::json!({ "user_id": id }),
    )
    .await;

    Ok(ApiResponse::success(
        "User created",
        MeResponse {
            profile,
            roles: vec![Role::Customer],
        },
        None,
    ))
}

fn email_taken() -> AppError {
    AppError::BadRequest("Email is already taken".to_string())
}

pub async fn login_user(
    state: &AppState,
    payload: LoginRequest,
) -> AppResult<ApiResponse<LoginResponse>> {
    let LoginRequest { email, password } = payload;
    let user: Option<Credentials> =
        sqlx::query_as("SELECT id, password_hash FROM users WHERE email = $1")
            .bind(email.trim().to_lowercase())
            .fetch_optional(&state.pool)
            .await?;

    let user = match user {
        Some(u) => u,
        None => return Err(AppError::BadRequest("Invalid email or password".into())),
    };

    let parsed_hash = PasswordHash::new(&user.password_hash)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Invalid password hash")))?;

    let argon2 = Argon2::default();
    if argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_err()
    {
        return Err(AppError::BadRequest("Invalid email or password".into()));
    }

    let roles = load_roles(&state.pool, user.id).await?;
    let token = issue_token(&state.config, user.id, roles.clone())?;

    audit::record(
        &state.orm,
        Some(user.id),
        "user_login",
        "users",
        serde_json::json!({ "user_id": user.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Logged in",
        LoginResponse {
            token: format!("Bearer {}", token),
            roles,
        },
        Some(Meta::empty()),
    ))
}

pub async fn me(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<MeResponse>> {
    let profile = fetch_profile(&state.pool, user.user_id).await?;
    let roles = load_roles(&state.pool, user.user_id).await?;
    Ok(ApiResponse::success(
        "OK",
        MeResponse { profile, roles },
        Some(Meta::empty()),
    ))
}

/// Sign a token for `user_id`. Roles are fixed until the next login.
pub fn issue_token(config: &AppConfig, user_id: Uuid, roles: Vec<Role>) -> AppResult<String> {
    let expiration = Utc::now()
        .checked_add_signed(Duration::hours(config.jwt_ttl_hours))
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to set expiration")))?;

    let claims = Claims {
        sub: user_id.to_string(),
        roles,
        exp: expiration.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))
}

pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))
}

pub async fn load_roles(pool: &DbPool, user_id: Uuid) -> AppResult<Vec<Role>> {
    let rows: Vec<(String,)> =
        sqlx::query_as("SELECT role FROM user_roles WHERE user_id = $1 ORDER BY created_at")
            .bind(user_id)
            .fetch_all(pool)
            .await?;

    Ok(rows
        .into_iter()
        .filter_map(|(role,)| match role.parse::<Role>() {
            Ok(role) => Some(role),
            Err(err) => {
                tracing::warn!(%user_id, error = %err, "ignoring stored role");
                None
            }
        })
        .collect())
}

pub async fn fetch_profile(pool: &DbPool, user_id: Uuid) -> AppResult<Profile> {
    sqlx::query_as::<_, Profile>("SELECT * FROM profiles WHERE id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await?
        .ok_or(AppError::NotFound)
}
