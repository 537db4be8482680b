use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{Extra, ExtraKind, MenuItem, MenuKind, PizzaCategory, SizePrices};

#[derive(Debug, Serialize, ToSchema)]
pub struct MenuView {
    pub pizzas: Vec<MenuItem>,
    pub beverages: Vec<MenuItem>,
    pub desserts: Vec<MenuItem>,
    pub crusts: Vec<Extra>,
    pub add_ons: Vec<Extra>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MenuItemList {
    pub items: Vec<MenuItem>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateMenuItemRequest {
    pub kind: MenuKind,
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub category: Option<PizzaCategory>,
    pub price: Option<i64>,
    pub size_prices: Option<SizePrices>,
    pub volume: Option<String>,
    pub available: Option<bool>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateMenuItemRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub category: Option<PizzaCategory>,
    pub price: Option<i64>,
    pub size_prices: Option<SizePrices>,
    pub volume: Option<String>,
    pub available: Option<bool>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateExtraRequest {
    pub kind: ExtraKind,
    pub name: String,
    pub price: i64,
}
