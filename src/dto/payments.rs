use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::OrderStatus;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CheckPaymentRequest {
    pub billing_id: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaymentCheck {
    pub billing_id: String,
    /// Provider status, e.g. `PENDING` or `PAID`.
    pub status: String,
    pub is_paid: bool,
    pub order_status: OrderStatus,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct WebhookAck {
    pub billing_id: Option<String>,
    pub status: Option<String>,
    /// True when this callback moved the order out of `awaiting_payment`.
    pub confirmed: bool,
}
