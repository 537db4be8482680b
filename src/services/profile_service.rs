use chrono::Utc;
use sea_orm::{ActiveModelTrait, ConnectionTrait, EntityTrait, Set};
use uuid::Uuid;

use crate::{
    audit,
    checkout::normalize_address,
    dto::profile::UpdateProfileRequest,
    entity::profiles::{ActiveModel as ProfileActive, Entity as Profiles, Model as ProfileModel},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Address, Profile},
    response::{ApiResponse, Meta},
    services::auth_service::fetch_profile,
    state::AppState,
};

pub async fn get_profile(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<Profile>> {
    let profile = fetch_profile(&state.pool, user.user_id).await?;
    Ok(ApiResponse::success("OK", profile, Some(Meta::empty())))
}

pub async fn update_profile(
    state: &AppState,
    user: &AuthUser,
    payload: UpdateProfileRequest,
) -> AppResult<ApiResponse<Profile>> {
    let existing = find_profile(&state.orm, user.user_id).await?;

    let mut active: ProfileActive = existing.into();
    if let Some(name) = payload.name {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::BadRequest("Name is required".into()));
        }
        active.name = Set(name);
    }
    if let Some(phone) = payload.phone {
        let phone = phone.trim().to_string();
        active.phone = Set((!phone.is_empty()).then_some(phone));
    }
    active.updated_at = Set(Utc::now().into());
    let profile = active.update(&state.orm).await?;

    audit::record(
        &state.orm,
        Some(user.user_id),
        "profile_update",
        "profiles",
        serde_json::json!({ "user_id": user.user_id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Profile updated",
        Profile::from(profile),
        Some(Meta::empty()),
    ))
}

pub async fn update_address(
    state: &AppState,
    user: &AuthUser,
    payload: Address,
) -> AppResult<ApiResponse<Profile>> {
    let address = normalize_address(&payload)?;
    let profile = save_address(&state.orm, user.user_id, &address).await?;

    audit::record(
        &state.orm,
        Some(user.user_id),
        "address_update",
        "profiles",
        serde_json::json!({ "user_id": user.user_id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Address updated",
        profile,
        Some(Meta::empty()),
    ))
}

/// Overwrite every address field. Runs inside the checkout transaction too.
pub async fn save_address<C: ConnectionTrait>(
    conn: &C,
    user_id: Uuid,
    address: &Address,
) -> AppResult<Profile> {
    let existing = find_profile(conn, user_id).await?;

    let mut active: ProfileActive = existing.into();
    active.street = Set(Some(address.street.clone()));
    active.number = Set(Some(address.number.clone()));
    active.complement = Set(address.complement.clone());
    active.neighborhood = Set(Some(address.neighborhood.clone()));
    active.city = Set((!address.city.is_empty()).then(|| address.city.clone()));
    active.cep = Set(Some(address.cep.clone()));
    active.updated_at = Set(Utc::now().into());

    Ok(active.update(conn).await?.into())
}

async fn find_profile<C: ConnectionTrait>(conn: &C, user_id: Uuid) -> AppResult<ProfileModel> {
    Profiles::find_by_id(user_id)
        .one(conn)
        .await?
        .ok_or(AppError::NotFound)
}
