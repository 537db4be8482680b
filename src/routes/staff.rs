use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, patch, post, put},
};
use uuid::Uuid;

use crate::{
    dto::staff::{
        RestaurantStatusRequest, StaffOrderList, StaffOrderView, StaffStats,
        UpdateOrderStatusRequest,
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::RestaurantStatus,
    response::ApiResponse,
    routes::params::StaffOrderQuery,
    services::{restaurant_service, staff_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/orders", get(list_orders))
        .route("/orders/{id}", get(get_order))
        .route("/orders/{id}/status", patch(update_order_status))
        .route("/stats", get(stats))
        .route("/restaurant", put(set_restaurant_status))
        .route("/restaurant/toggle", post(toggle_restaurant_status))
}

#[utoipa::path(
    get,
    path = "/api/staff/orders",
    params(StaffOrderQuery),
    responses(
        (status = 200, description = "Orders for the kitchen panel", body = ApiResponse<StaffOrderList>),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Staff"
)]
pub async fn list_orders(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<StaffOrderQuery>,
) -> AppResult<Json<ApiResponse<StaffOrderList>>> {
    let resp = staff_service::list_orders(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/staff/orders/{id}",
    params(
        ("id" = Uuid, Path, description = "Order ID")
    ),
    responses(
        (status = 200, description = "Any order", body = ApiResponse<StaffOrderView>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Staff"
)]
pub async fn get_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<StaffOrderView>>> {
    let resp = staff_service::get_order(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/staff/orders/{id}/status",
    params(
        ("id" = Uuid, Path, description = "Order ID")
    ),
    request_body = UpdateOrderStatusRequest,
    responses(
        (status = 200, description = "Advance order status", body = ApiResponse<StaffOrderView>),
        (status = 400, description = "Transition not allowed"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Staff"
)]
pub async fn update_order_status(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateOrderStatusRequest>,
) -> AppResult<Json<ApiResponse<StaffOrderView>>> {
    let resp = staff_service::update_status(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/staff/stats",
    responses(
        (status = 200, description = "Order counters", body = ApiResponse<StaffStats>),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Staff"
)]
pub async fn stats(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<StaffStats>>> {
    let resp = staff_service::stats(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/staff/restaurant",
    request_body = RestaurantStatusRequest,
    responses(
        (status = 200, description = "Open or close the restaurant", body = ApiResponse<RestaurantStatus>),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Staff"
)]
pub async fn set_restaurant_status(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<RestaurantStatusRequest>,
) -> AppResult<Json<ApiResponse<RestaurantStatus>>> {
    let resp = restaurant_service::set_status(&state, &user, payload.is_open).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/staff/restaurant/toggle",
    responses(
        (status = 200, description = "Flip the open flag", body = ApiResponse<RestaurantStatus>),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Staff"
)]
pub async fn toggle_restaurant_status(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<RestaurantStatus>>> {
    let resp = restaurant_service::toggle_status(&state, &user).await?;
    Ok(Json(resp))
}
