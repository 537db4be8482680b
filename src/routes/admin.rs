use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{delete, get, post, put},
};
use uuid::Uuid;

use crate::{
    dto::{
        admin::{RoleRequest, UserRoles},
        menu::{CreateExtraRequest, CreateMenuItemRequest, MenuItemList, UpdateMenuItemRequest},
    },
    error::AppResult,
    middleware::auth::{AuthUser, ensure_admin},
    models::{Extra, MenuItem, Role},
    response::ApiResponse,
    routes::params::MenuQuery,
    services::{admin_service, menu_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/menu/items", get(list_menu_items).post(create_menu_item))
        .route(
            "/menu/items/{id}",
            put(update_menu_item).delete(delete_menu_item),
        )
        .route("/menu/extras", post(create_extra))
        .route("/menu/extras/{id}", delete(delete_extra))
        .route("/users/{id}/roles", get(list_roles).post(assign_role))
        .route("/users/{id}/roles/{role}", delete(revoke_role))
}

#[utoipa::path(
    get,
    path = "/api/admin/menu/items",
    params(MenuQuery),
    responses(
        (status = 200, description = "All menu items, unavailable included", body = ApiResponse<MenuItemList>),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_menu_items(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<MenuQuery>,
) -> AppResult<Json<ApiResponse<MenuItemList>>> {
    ensure_admin(&user)?;
    let resp = menu_service::list_items(&state, query, true).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/admin/menu/items",
    request_body = CreateMenuItemRequest,
    responses(
        (status = 200, description = "Create menu item", body = ApiResponse<MenuItem>),
        (status = 400, description = "Invalid pricing for the kind"),
        (status = 403, description = "Forbidden"),
        (status = 409, description = "Name already used"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn create_menu_item(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateMenuItemRequest>,
) -> AppResult<Json<ApiResponse<MenuItem>>> {
    let resp = menu_service::create_item(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/admin/menu/items/{id}",
    params(
        ("id" = Uuid, Path, description = "Menu item ID")
    ),
    request_body = UpdateMenuItemRequest,
    responses(
        (status = 200, description = "Updated menu item", body = ApiResponse<MenuItem>),
        (status = 400, description = "Invalid pricing for the kind"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn update_menu_item(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateMenuItemRequest>,
) -> AppResult<Json<ApiResponse<MenuItem>>> {
    let resp = menu_service::update_item(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/admin/menu/items/{id}",
    params(
        ("id" = Uuid, Path, description = "Menu item ID")
    ),
    responses(
        (status = 200, description = "Deleted menu item", body = ApiResponse<serde_json::Value>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn delete_menu_item(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = menu_service::delete_item(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/admin/menu/extras",
    request_body = CreateExtraRequest,
    responses(
        (status = 200, description = "Create crust or add-on", body = ApiResponse<Extra>),
        (status = 403, description = "Forbidden"),
        (status = 409, description = "Name already used"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn create_extra(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateExtraRequest>,
) -> AppResult<Json<ApiResponse<Extra>>> {
    let resp = menu_service::create_extra(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/admin/menu/extras/{id}",
    params(
        ("id" = Uuid, Path, description = "Extra ID")
    ),
    responses(
        (status = 200, description = "Deleted extra", body = ApiResponse<serde_json::Value>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn delete_extra(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = menu_service::delete_extra(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/users/{id}/roles",
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "Roles of a user", body = ApiResponse<UserRoles>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_roles(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<UserRoles>>> {
    let resp = admin_service::list_roles(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/admin/users/{id}/roles",
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    request_body = RoleRequest,
    responses(
        (status = 200, description = "Grant a role", body = ApiResponse<UserRoles>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn assign_role(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<RoleRequest>,
) -> AppResult<Json<ApiResponse<UserRoles>>> {
    let resp = admin_service::assign_role(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/admin/users/{id}/roles/{role}",
    params(
        ("id" = Uuid, Path, description = "User ID"),
        ("role" = Role, Path, description = "Role to revoke")
    ),
    responses(
        (status = 200, description = "Revoke a role", body = ApiResponse<UserRoles>),
        (status = 400, description = "Admins cannot revoke their own admin role"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn revoke_role(
    State(state): State<AppState>,
    user: AuthUser,
    Path((id, role)): Path<(Uuid, Role)>,
) -> AppResult<Json<ApiResponse<UserRoles>>> {
    let resp = admin_service::revoke_role(&state, &user, id, role).await?;
    Ok(Json(resp))
}
