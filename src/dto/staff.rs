use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{Order, OrderStatus};

#[derive(Debug, Serialize, ToSchema)]
pub struct StaffOrderView {
    pub order: Order,
    /// Statuses the order may move to next.
    pub next_statuses: Vec<OrderStatus>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StaffOrderList {
    pub items: Vec<StaffOrderView>,
}

#[derive(Debug, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct StaffStats {
    pub received: i64,
    pub preparing: i64,
    pub out_for_delivery: i64,
    pub completed: i64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateOrderStatusRequest {
    pub status: OrderStatus,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RestaurantStatusRequest {
    pub is_open: bool,
}
