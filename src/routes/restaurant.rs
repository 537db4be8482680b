use axum::{Json, Router, extract::State, routing::get};

use crate::{
    error::AppResult, models::RestaurantStatus, response::ApiResponse,
    services::restaurant_service, state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/status", get(get_status))
}

#[utoipa::path(
    get,
    path = "/api/restaurant/status",
    responses(
        (status = 200, description = "Whether orders are accepted", body = ApiResponse<RestaurantStatus>)
    ),
    tag = "Restaurant"
)]
pub async fn get_status(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<RestaurantStatus>>> {
    let resp = restaurant_service::get_status(&state).await?;
    Ok(Json(resp))
}
