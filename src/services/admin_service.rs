use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use uuid::Uuid;

use crate::{
    audit,
    dto::admin::{RoleRequest, UserRoles as UserRolesView},
    entity::{
        user_roles::{ActiveModel as RoleActive, Column as RoleCol, Entity as UserRoles},
        users::Entity as Users,
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::Role,
    response::{ApiResponse, Meta},
    state::AppState,
};

async fn ensure_user_exists(state: &AppState, user_id: Uuid) -> AppResult<()> {
    if Users::find_by_id(user_id).one(&state.orm).await?.is_none() {
        return Err(AppError::NotFound);
    }
    Ok(())
}

async fn roles_of(state: &AppState, user_id: Uuid) -> AppResult<Vec<Role>> {
    let rows = UserRoles::find()
        .filter(RoleCol::UserId.eq(user_id))
        .order_by_asc(RoleCol::CreatedAt)
        .all(&state.orm)
        .await?;

    Ok(rows
        .into_iter()
        .filter_map(|row| row.role.parse::<Role>().ok())
        .collect())
}

pub async fn list_roles(
    state: &AppState,
    user: &AuthUser,
    user_id: Uuid,
) -> AppResult<ApiResponse<UserRolesView>> {
    ensure_admin(user)?;
    ensure_user_exists(state, user_id).await?;

    let roles = roles_of(state, user_id).await?;
    Ok(ApiResponse::success(
        "Roles",
        UserRolesView { user_id, roles },
        Some(Meta::empty()),
    ))
}

/// Grant a role. Granting one the user already has changes nothing.
pub async fn assign_role(
    state: &AppState,
    user: &AuthUser,
    user_id: Uuid,
    payload: RoleRequest,
) -> AppResult<ApiResponse<UserRolesView>> {
    ensure_admin(user)?;
    ensure_user_exists(state, user_id).await?;

    let existing = UserRoles::find()
        .filter(RoleCol::UserId.eq(user_id))
        .filter(RoleCol::Role.eq(payload.role.as_str()))
        .one(&state.orm)
        .await?;

    if existing.is_none() {
        RoleActive {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            role: Set(payload.role.as_str().to_string()),
            created_at: NotSet,
        }
        .insert(&state.orm)
        .await?;

        tracing::info!(%user_id, role = %payload.role, admin_id = %user.user_id, "role assigned");
        audit::record(
            &state.orm,
            Some(user.user_id),
            "role_assign",
            "user_roles",
            serde_json::json!({ "user_id": user_id, "role": payload.role }),
        )
        .await;
    }

    let roles = roles_of(state, user_id).await?;
    Ok(ApiResponse::success(
        "Role assigned",
        UserRolesView { user_id, roles },
        Some(Meta::empty()),
    ))
}

pub async fn revoke_role(
    state: &AppState,
    user: &AuthUser,
    user_id: Uuid,
    role: Role,
) -> AppResult<ApiResponse<UserRolesView>> {
    ensure_admin(user)?;
    if user_id == user.user_id && role == Role::Admin {
        return Err(AppError::BadRequest(
            "Admins cannot revoke their own admin role".into(),
        ));
    }
    ensure_user_exists(state, user_id).await?;

    let result = UserRoles::delete_many()
        .filter(RoleCol::UserId.eq(user_id))
        .filter(RoleCol::Role.eq(role.as_str()))
        .exec(&state.orm)
        .await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    tracing::info!(%user_id, %role, admin_id = %user.user_id, "role revoked");
    audit::record(
        &state.orm,
        Some(user.user_id),
        "role_revoke",
        "user_roles",
        serde_json::json!({ "user_id": user_id, "role": role }),
    )
    .await;

    let roles = roles_of(state, user_id).await?;
    Ok(ApiResponse::success(
        "Role revoked",
        UserRolesView { user_id, roles },
        Some(Meta::empty()),
    ))
}
