use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};
use serde_json::Value;
use uuid::Uuid;

use crate::{
    audit,
    dto::payments::{CheckPaymentRequest, PaymentCheck, WebhookAck},
    entity::orders::{Column as OrderCol, Entity as Orders, Model as OrderModel},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::OrderStatus,
    payments::webhook::{WebhookNotice, verify_secret},
    realtime::ChangeEvent,
    response::{ApiResponse, Meta},
    state::AppState,
};

async fn find_by_billing<C: ConnectionTrait>(
    conn: &C,
    billing_id: &str,
) -> AppResult<Option<OrderModel>> {
    Ok(Orders::find()
        .filter(OrderCol::BillingId.eq(billing_id))
        .one(conn)
        .await?)
}

/// Move the order behind `billing_id` from `awaiting_payment` to `received`.
///
/// The status predicate makes this a no-op for an order that was already
/// confirmed, so polling and the webhook can race freely. Returns whether
/// this call did the transition.
pub async fn confirm_payment(
    state: &AppState,
    billing_id: &str,
    actor: Option<Uuid>,
    source: &str,
) -> AppResult<bool> {
    let result = Orders::update_many()
        .col_expr(OrderCol::Status, Expr::value(OrderStatus::Received))
        .col_expr(OrderCol::UpdatedAt, Expr::value(Utc::now()))
        .filter(OrderCol::BillingId.eq(billing_id))
        .filter(OrderCol::Status.eq(OrderStatus::AwaitingPayment))
        .exec(&state.orm)
        .await?;

    if result.rows_affected == 0 {
        tracing::debug!(billing_id, source, "payment already confirmed or order not awaiting");
        return Ok(false);
    }

    if let Some(order) = find_by_billing(&state.orm, billing_id).await? {
        tracing::info!(order_id = %order.id, billing_id, source, "payment confirmed");
        audit::record(
            &state.orm,
            actor,
            "payment_confirmed",
            "orders",
            serde_json::json!({ "order_id": order.id, "billing_id": billing_id, "source": source }),
        )
        .await;
        state.events.publish(ChangeEvent::OrderChanged {
            order_id: order.id,
            user_id: order.user_id,
            status: order.status,
        });
    }

    Ok(true)
}

pub async fn check_pix_payment(
    state: &AppState,
    user: &AuthUser,
    payload: CheckPaymentRequest,
) -> AppResult<ApiResponse<PaymentCheck>> {
    let billing_id = payload.billing_id.trim();
    if billing_id.is_empty() {
        return Err(AppError::BadRequest("billing_id is required".into()));
    }

    let order = find_by_billing(&state.orm, billing_id)
        .await?
        .filter(|order| user.is_staff() || order.user_id == user.user_id)
        .ok_or(AppError::NotFound)?;

    let status = state.payments.billing_status(billing_id).await?;
    let mut order_status = order.status;
    if status.is_paid() && confirm_payment(state, billing_id, Some(user.user_id), "poll").await? {
        order_status = OrderStatus::Received;
    }

    Ok(ApiResponse::success(
        "Payment status",
        PaymentCheck {
            billing_id: billing_id.to_string(),
            status: status.as_str().to_string(),
            is_paid: status.is_paid(),
            order_status,
        },
        Some(Meta::empty()),
    ))
}

pub async fn handle_webhook(
    state: &AppState,
    secret: Option<&str>,
    payload: Value,
) -> AppResult<ApiResponse<WebhookAck>> {
    if !verify_secret(state.config.payments.webhook_secret.as_deref(), secret) {
        tracing::warn!("webhook rejected: secret mismatch");
        return Err(AppError::Unauthorized("Invalid webhook secret".into()));
    }

    let notice = WebhookNotice::from_payload(&payload);
    let Some(billing_id) = notice.billing_id.clone() else {
        tracing::info!("webhook without billing id ignored");
        return Ok(ApiResponse::success(
            "No billing ID",
            WebhookAck {
                billing_id: None,
                status: None,
                confirmed: false,
            },
            None,
        ));
    };
    tracing::info!(%billing_id, status = notice.status.as_str(), "webhook received");

    let mut confirmed = false;
    if notice.is_paid() {
        if find_by_billing(&state.orm, &billing_id).await?.is_none() {
            tracing::warn!(%billing_id, "webhook for unknown billing");
            return Err(AppError::NotFound);
        }
        confirmed = confirm_payment(state, &billing_id, None, "webhook").await?;
    }

    Ok(ApiResponse::success(
        "OK",
        WebhookAck {
            status: Some(notice.status.as_str().to_string()),
            billing_id: Some(billing_id),
            confirmed,
        },
        None,
    ))
}
