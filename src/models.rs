use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    entity::{extras, menu_items, orders, profiles},
    error::AppError,
};

#[derive(Debug, thiserror::Error)]
#[error("unknown {kind} value '{value}'")]
pub struct ParseEnumError {
    kind: &'static str,
    value: String,
}

macro_rules! text_enum {
    ($ty:ident, { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $ty {
            pub fn as_str(self) -> &'static str {
                match self {
                    $($ty::$variant => $text),+
                }
            }
        }
    };
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
    ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[sea_orm(string_value = "awaiting_payment")]
    AwaitingPayment,
    #[sea_orm(string_value = "received")]
    Received,
    #[sea_orm(string_value = "preparing")]
    Preparing,
    #[sea_orm(string_value = "ready_for_pickup")]
    ReadyForPickup,
    #[sea_orm(string_value = "out_for_delivery")]
    OutForDelivery,
    #[sea_orm(string_value = "delivered")]
    Delivered,
}

text_enum!(OrderStatus, {
    AwaitingPayment => "awaiting_payment",
    Received => "received",
    Preparing => "preparing",
    ReadyForPickup => "ready_for_pickup",
    OutForDelivery => "out_for_delivery",
    Delivered => "delivered",
});

impl OrderStatus {
    pub const ALL: [OrderStatus; 6] = [
        OrderStatus::AwaitingPayment,
        OrderStatus::Received,
        OrderStatus::Preparing,
        OrderStatus::ReadyForPickup,
        OrderStatus::OutForDelivery,
        OrderStatus::Delivered,
    ];

    /// Label shown to customers and staff.
    pub fn label(self) -> &'static str {
        match self {
            OrderStatus::AwaitingPayment => "Aguardando Pagamento",
            OrderStatus::Received => "Pedido Recebido",
            OrderStatus::Preparing => "Em Preparo",
            OrderStatus::ReadyForPickup => "Pronto para Retirada",
            OrderStatus::OutForDelivery => "Saiu para Entrega",
            OrderStatus::Delivered => "Entregue",
        }
    }

    // Pickup and delivery branch after preparing, so both branch states share a stage.
    fn stage(self) -> u8 {
        match self {
            OrderStatus::AwaitingPayment => 0,
            OrderStatus::Received => 1,
            OrderStatus::Preparing => 2,
            OrderStatus::ReadyForPickup | OrderStatus::OutForDelivery => 3,
            OrderStatus::Delivered => 4,
        }
    }

    /// Whether an order with this delivery type can ever be in this status.
    pub fn applies_to(self, delivery_type: DeliveryType) -> bool {
        match self {
            OrderStatus::ReadyForPickup => delivery_type == DeliveryType::Pickup,
            OrderStatus::OutForDelivery | OrderStatus::Delivered => {
                delivery_type == DeliveryType::Delivery
            }
            _ => true,
        }
    }

    /// Staff transitions only move forward, and never back into payment.
    pub fn can_advance_to(self, next: OrderStatus, delivery_type: DeliveryType) -> bool {
        next != OrderStatus::AwaitingPayment
            && next.applies_to(delivery_type)
            && next.stage() > self.stage()
    }

    pub fn next_options(self, delivery_type: DeliveryType) -> Vec<OrderStatus> {
        OrderStatus::ALL
            .into_iter()
            .filter(|next| self.can_advance_to(*next, delivery_type))
            .collect()
    }

    /// Delivered orders, and pickup orders that are ready, need nothing else from the kitchen.
    pub fn is_final(self, delivery_type: DeliveryType) -> bool {
        match self {
            OrderStatus::Delivered => true,
            OrderStatus::ReadyForPickup => delivery_type == DeliveryType::Pickup,
            _ => false,
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
    ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum DeliveryType {
    #[sea_orm(string_value = "delivery")]
    Delivery,
    #[sea_orm(string_value = "pickup")]
    Pickup,
}

text_enum!(DeliveryType, {
    Delivery => "delivery",
    Pickup => "pickup",
});

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
    ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[sea_orm(string_value = "pix")]
    Pix,
    #[sea_orm(string_value = "credit")]
    Credit,
    #[sea_orm(string_value = "debit")]
    Debit,
    #[sea_orm(string_value = "cash")]
    Cash,
}

text_enum!(PaymentMethod, {
    Pix => "pix",
    Credit => "credit",
    Debit => "debit",
    Cash => "cash",
});

impl PaymentMethod {
    /// Only PIX is paid online; card and cash are settled on delivery or at the counter.
    pub fn initial_status(self) -> OrderStatus {
        match self {
            PaymentMethod::Pix => OrderStatus::AwaitingPayment,
            PaymentMethod::Credit | PaymentMethod::Debit | PaymentMethod::Cash => {
                OrderStatus::Received
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Customer,
    Employee,
    Admin,
}

text_enum!(Role, {
    Customer => "customer",
    Employee => "employee",
    Admin => "admin",
});

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ParseEnumError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "customer" => Ok(Role::Customer),
            "employee" => Ok(Role::Employee),
            "admin" => Ok(Role::Admin),
            other => Err(ParseEnumError {
                kind: "role",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
    ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum MenuKind {
    #[sea_orm(string_value = "pizza")]
    Pizza,
    #[sea_orm(string_value = "beverage")]
    Beverage,
    #[sea_orm(string_value = "dessert")]
    Dessert,
}

text_enum!(MenuKind, {
    Pizza => "pizza",
    Beverage => "beverage",
    Dessert => "dessert",
});

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
    ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum ExtraKind {
    #[sea_orm(string_value = "crust")]
    Crust,
    #[sea_orm(string_value = "add_on")]
    AddOn,
}

text_enum!(ExtraKind, {
    Crust => "crust",
    AddOn => "add_on",
});

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
    ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum PizzaCategory {
    #[sea_orm(string_value = "traditional")]
    Traditional,
    #[sea_orm(string_value = "special")]
    Special,
    #[sea_orm(string_value = "sweet")]
    Sweet,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PizzaSize {
    Small,
    Medium,
    Large,
    Giant,
}

impl PizzaSize {
    pub fn label(self) -> &'static str {
        match self {
            PizzaSize::Small => "Pequena",
            PizzaSize::Medium => "Média",
            PizzaSize::Large => "Grande",
            PizzaSize::Giant => "Gigante",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SizePrices {
    pub small: i64,
    pub medium: i64,
    pub large: i64,
    pub giant: i64,
}

impl SizePrices {
    pub fn for_size(&self, size: PizzaSize) -> i64 {
        match size {
            PizzaSize::Small => self.small,
            PizzaSize::Medium => self.medium,
            PizzaSize::Large => self.large,
            PizzaSize::Giant => self.giant,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct Profile {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub street: Option<String>,
    pub number: Option<String>,
    pub complement: Option<String>,
    pub neighborhood: Option<String>,
    pub city: Option<String>,
    pub cep: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    /// The saved address, if the profile has one.
    pub fn address(&self) -> Option<Address> {
        Some(Address {
            street: self.street.clone()?,
            number: self.number.clone()?,
            complement: self.complement.clone(),
            neighborhood: self.neighborhood.clone()?,
            city: self.city.clone().unwrap_or_default(),
            cep: self.cep.clone()?,
        })
    }
}

impl From<profiles::Model> for Profile {
    fn from(model: profiles::Model) -> Self {
        Profile {
            id: model.id,
            name: model.name,
            email: model.email,
            phone: model.phone,
            street: model.street,
            number: model.number,
            complement: model.complement,
            neighborhood: model.neighborhood,
            city: model.city,
            cep: model.cep,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Address {
    pub street: String,
    pub number: String,
    pub complement: Option<String>,
    pub neighborhood: String,
    pub city: String,
    pub cep: String,
}

/// Customer data frozen on the order when it is placed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CustomerSnapshot {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: Option<Address>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MenuItem {
    pub id: Uuid,
    pub kind: MenuKind,
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub category: Option<PizzaCategory>,
    /// Flat price for beverages and desserts.
    pub price: Option<i64>,
    /// Per-size prices for pizzas.
    pub size_prices: Option<SizePrices>,
    pub volume: Option<String>,
    pub available: bool,
    pub created_at: DateTime<Utc>,
}

impl From<menu_items::Model> for MenuItem {
    fn from(model: menu_items::Model) -> Self {
        let size_prices = match (
            model.price_small,
            model.price_medium,
            model.price_large,
            model.price_giant,
        ) {
            (Some(small), Some(medium), Some(large), Some(giant)) => Some(SizePrices {
                small,
                medium,
                large,
                giant,
            }),
            _ => None,
        };

        MenuItem {
            id: model.id,
            kind: model.kind,
            name: model.name,
            description: model.description,
            image_url: model.image_url,
            category: model.category,
            price: model.price,
            size_prices,
            volume: model.volume,
            available: model.available,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Extra {
    pub id: Uuid,
    pub kind: ExtraKind,
    pub name: String,
    pub price: i64,
    pub available: bool,
    pub created_at: DateTime<Utc>,
}

impl From<extras::Model> for Extra {
    fn from(model: extras::Model) -> Self {
        Extra {
            id: model.id,
            kind: model.kind,
            name: model.name,
            price: model.price,
            available: model.available,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

/// What the customer picked for one cart line, tagged by product kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CartSelection {
    Pizza {
        pizza_id: Uuid,
        /// Second half of a half-and-half pizza.
        #[serde(default)]
        second_pizza_id: Option<Uuid>,
        size: PizzaSize,
        #[serde(default)]
        crust_id: Option<Uuid>,
        #[serde(default)]
        add_on_ids: Vec<Uuid>,
        #[serde(default)]
        notes: String,
    },
    Beverage {
        beverage_id: Uuid,
    },
    Dessert {
        dessert_id: Uuid,
    },
}

impl CartSelection {
    pub fn menu_item_ids(&self) -> Vec<Uuid> {
        match self {
            CartSelection::Pizza {
                pizza_id,
                second_pizza_id,
                ..
            } => std::iter::once(*pizza_id).chain(*second_pizza_id).collect(),
            CartSelection::Beverage { beverage_id } => vec![*beverage_id],
            CartSelection::Dessert { dessert_id } => vec![*dessert_id],
        }
    }

    pub fn extra_ids(&self) -> Vec<Uuid> {
        match self {
            CartSelection::Pizza {
                crust_id,
                add_on_ids,
                ..
            } => crust_id.iter().chain(add_on_ids.iter()).copied().collect(),
            CartSelection::Beverage { .. } | CartSelection::Dessert { .. } => Vec::new(),
        }
    }
}

/// A priced line, used both for the live cart and the order snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct OrderLine {
    pub line_id: Uuid,
    pub selection: CartSelection,
    pub title: String,
    pub details: Vec<String>,
    pub unit_price: i64,
    pub quantity: i32,
    pub line_total: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    pub items: Vec<OrderLine>,
    pub customer: CustomerSnapshot,
    pub delivery_type: DeliveryType,
    pub payment_method: PaymentMethod,
    pub change_for: Option<i64>,
    pub status: OrderStatus,
    pub status_label: String,
    pub subtotal: i64,
    pub delivery_fee: i64,
    pub total: i64,
    pub billing_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<orders::Model> for Order {
    type Error = AppError;

    fn try_from(model: orders::Model) -> Result<Self, Self::Error> {
        let items: Vec<OrderLine> = serde_json::from_value(model.items).map_err(|err| {
            AppError::Internal(anyhow::anyhow!("order {} has malformed items: {err}", model.id))
        })?;
        let customer: CustomerSnapshot =
            serde_json::from_value(model.customer).map_err(|err| {
                AppError::Internal(anyhow::anyhow!(
                    "order {} has malformed customer: {err}",
                    model.id
                ))
            })?;

        Ok(Order {
            id: model.id,
            user_id: model.user_id,
            items,
            customer,
            delivery_type: model.delivery_type,
            payment_method: model.payment_method,
            change_for: model.change_for,
            status: model.status,
            status_label: model.status.label().to_string(),
            subtotal: model.subtotal,
            delivery_fee: model.delivery_fee,
            total: model.total,
            billing_id: model.billing_id,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RestaurantStatus {
    pub is_open: bool,
    pub updated_at: DateTime<Utc>,
}
