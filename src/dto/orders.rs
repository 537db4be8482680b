use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    checkout::PixPayerInput,
    models::{Address, DeliveryType, Order, PaymentMethod},
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CheckoutRequest {
    pub delivery_type: DeliveryType,
    pub payment_method: PaymentMethod,
    /// Falls back to the saved profile address for delivery orders.
    pub address: Option<Address>,
    /// Cents the customer will pay in cash.
    pub change_for: Option<i64>,
    pub payer: Option<PixPayerInput>,
}

/// Data the client needs to render the PIX QR code.
#[derive(Debug, Serialize, ToSchema)]
pub struct PixCharge {
    pub billing_id: String,
    pub url: String,
    pub amount: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CheckoutResponse {
    pub order: Order,
    pub pix: Option<PixCharge>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderList {
    pub items: Vec<Order>,
}
