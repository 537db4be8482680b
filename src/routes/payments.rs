use axum::{
    Json, Router,
    extract::{Query, State},
    routing::post,
};
use serde_json::Value;

use crate::{
    dto::payments::{CheckPaymentRequest, PaymentCheck, WebhookAck},
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    routes::params::WebhookQuery,
    services::payment_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/pix/check", post(check_pix_payment))
        .route("/webhook", post(webhook))
}

#[utoipa::path(
    post,
    path = "/api/payments/pix/check",
    request_body = CheckPaymentRequest,
    responses(
        (status = 200, description = "Provider status of a PIX billing", body = ApiResponse<PaymentCheck>),
        (status = 404, description = "No order with this billing"),
        (status = 502, description = "Payment provider error"),
    ),
    security(("bearer_auth" = [])),
    tag = "Payments"
)]
pub async fn check_pix_payment(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CheckPaymentRequest>,
) -> AppResult<Json<ApiResponse<PaymentCheck>>> {
    let resp = payment_service::check_pix_payment(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/payments/webhook",
    params(WebhookQuery),
    request_body = Value,
    responses(
        (status = 200, description = "Callback accepted", body = ApiResponse<WebhookAck>),
        (status = 401, description = "Invalid webhook secret"),
        (status = 404, description = "No order with this billing"),
    ),
    security(()),
    tag = "Payments"
)]
pub async fn webhook(
    State(state): State<AppState>,
    Query(query): Query<WebhookQuery>,
    Json(payload): Json<Value>,
) -> AppResult<Json<ApiResponse<WebhookAck>>> {
    let resp =
        payment_service::handle_webhook(&state, query.webhook_secret.as_deref(), payload).await?;
    Ok(Json(resp))
}
