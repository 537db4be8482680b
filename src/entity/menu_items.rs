use sea_orm::entity::prelude::*;

use crate::models::{MenuKind, PizzaCategory};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "menu_items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub kind: MenuKind,
    #[sea_orm(unique)]
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub category: Option<PizzaCategory>,
    pub price: Option<i64>,
    pub price_small: Option<i64>,
    pub price_medium: Option<i64>,
    pub price_large: Option<i64>,
    pub price_giant: Option<i64>,
    pub volume: Option<String>,
    pub available: bool,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
