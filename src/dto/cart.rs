use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{CartSelection, OrderLine};

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddToCartRequest {
    pub selection: CartSelection,
    pub quantity: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateCartItemRequest {
    pub quantity: i32,
}

/// A stored line that no longer prices, e.g. a pizza taken off the menu.
#[derive(Debug, Serialize, ToSchema)]
pub struct UnavailableLine {
    pub line_id: Uuid,
    pub selection: CartSelection,
    pub quantity: i32,
    pub reason: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartView {
    pub lines: Vec<OrderLine>,
    pub unavailable: Vec<UnavailableLine>,
    pub subtotal: i64,
}
