use chrono::Utc;
use sea_orm::sea_query::LockType;
use sea_orm::{ActiveModelTrait, ConnectionTrait, EntityTrait, QuerySelect, Set, TransactionTrait};

use crate::{
    audit,
    entity::restaurant_settings::{
        ActiveModel as SettingsActive, Entity as RestaurantSettings, Model as SettingsModel,
    },
    error::AppResult,
    middleware::auth::{AuthUser, ensure_staff},
    models::RestaurantStatus,
    realtime::ChangeEvent,
    response::{ApiResponse, Meta},
    state::AppState,
};

const SETTINGS_ID: i32 = 1;

impl From<SettingsModel> for RestaurantStatus {
    fn from(model: SettingsModel) -> Self {
        RestaurantStatus {
            is_open: model.is_open,
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

/// The settings row, created open when the table is empty.
async fn load_settings<C: ConnectionTrait>(conn: &C, lock: bool) -> AppResult<SettingsModel> {
    let mut finder = RestaurantSettings::find_by_id(SETTINGS_ID);
    if lock {
        finder = finder.lock(LockType::Update);
    }
    if let Some(settings) = finder.one(conn).await? {
        return Ok(settings);
    }

    tracing::warn!("restaurant settings row missing, creating it open");
    let settings = SettingsActive {
        id: Set(SETTINGS_ID),
        is_open: Set(true),
        updated_at: Set(Utc::now().into()),
    }
    .insert(conn)
    .await?;
    Ok(settings)
}

pub async fn is_open<C: ConnectionTrait>(conn: &C) -> AppResult<bool> {
    Ok(load_settings(conn, false).await?.is_open)
}

pub async fn get_status(state: &AppState) -> AppResult<ApiResponse<RestaurantStatus>> {
    let settings = load_settings(&state.orm, false).await?;
    Ok(ApiResponse::success(
        "Restaurant status",
        RestaurantStatus::from(settings),
        Some(Meta::empty()),
    ))
}

pub async fn set_status(
    state: &AppState,
    user: &AuthUser,
    is_open: bool,
) -> AppResult<ApiResponse<RestaurantStatus>> {
    ensure_staff(user)?;
    apply(state, user, |_| is_open).await
}

pub async fn toggle_status(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<RestaurantStatus>> {
    ensure_staff(user)?;
    apply(state, user, |current| !current).await
}

async fn apply(
    state: &AppState,
    user: &AuthUser,
    next: impl FnOnce(bool) -> bool,
) -> AppResult<ApiResponse<RestaurantStatus>> {
    let txn = state.orm.begin().await?;
    let settings = load_settings(&txn, true).await?;
    let is_open = next(settings.is_open);

    let mut active: SettingsActive = settings.into();
    active.is_open = Set(is_open);
    active.updated_at = Set(Utc::now().into());
    let settings = active.update(&txn).await?;
    txn.commit().await?;

    tracing::info!(is_open, user_id = %user.user_id, "restaurant status changed");
    audit::record(
        &state.orm,
        Some(user.user_id),
        "restaurant_status",
        "restaurant_settings",
        serde_json::json!({ "is_open": is_open }),
    )
    .await;
    state.events.publish(ChangeEvent::RestaurantStatus { is_open });

    let message = if is_open {
        "Restaurant is open"
    } else {
        "Restaurant is closed"
    };
    Ok(ApiResponse::success(
        message,
        RestaurantStatus::from(settings),
        Some(Meta::empty()),
    ))
}
