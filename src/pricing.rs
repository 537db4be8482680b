//! Cart pricing against the current menu.
//!
//! Prices are looked up at the time a line is priced, never taken from the
//! client. A half-and-half pizza costs as much as its more expensive half.

use std::collections::HashMap;

use thiserror::Error;
use uuid::Uuid;

use crate::models::{CartSelection, Extra, ExtraKind, MenuItem, MenuKind, OrderLine, PizzaSize};

pub const MAX_LINE_QUANTITY: i32 = 50;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PricingError {
    #[error("quantity must be between 1 and 50")]
    InvalidQuantity,

    #[error("menu item {0} not found")]
    UnknownItem(Uuid),

    #[error("extra {0} not found")]
    UnknownExtra(Uuid),

    #[error("{0} is not available")]
    Unavailable(String),

    #[error("{name} is not a {expected}")]
    WrongKind { name: String, expected: &'static str },

    #[error("{0} has no price")]
    MissingPrice(String),
}

/// The slice of the menu needed to price a set of cart lines.
#[derive(Debug, Default, Clone)]
pub struct MenuCatalog {
    items: HashMap<Uuid, MenuItem>,
    extras: HashMap<Uuid, Extra>,
}

impl MenuCatalog {
    pub fn new(
        items: impl IntoIterator<Item = MenuItem>,
        extras: impl IntoIterator<Item = Extra>,
    ) -> Self {
        Self {
            items: items.into_iter().map(|item| (item.id, item)).collect(),
            extras: extras.into_iter().map(|extra| (extra.id, extra)).collect(),
        }
    }

    pub fn price_line(
        &self,
        line_id: Uuid,
        selection: &CartSelection,
        quantity: i32,
    ) -> Result<OrderLine, PricingError> {
        if !(1..=MAX_LINE_QUANTITY).contains(&quantity) {
            return Err(PricingError::InvalidQuantity);
        }

        let (title, details, unit_price) = match selection {
            CartSelection::Pizza {
                pizza_id,
                second_pizza_id,
                size,
                crust_id,
                add_on_ids,
                notes,
            } => {
                let first = self.item(*pizza_id, MenuKind::Pizza)?;
                let mut base = pizza_price(first, *size)?;
                let mut title = first.name.clone();

                if let Some(second_id) = second_pizza_id {
                    let second = self.item(*second_id, MenuKind::Pizza)?;
                    base = base.max(pizza_price(second, *size)?);
                    title = format!("{title} + {}", second.name);
                }
                title = format!("{title} ({})", size.label());

                let mut details = Vec::new();
                let mut unit = base;
                if let Some(crust_id) = crust_id {
                    let crust = self.extra(*crust_id, ExtraKind::Crust)?;
                    details.push(format!("Borda: {}", crust.name));
                    unit += crust.price;
                }
                for add_on_id in add_on_ids {
                    let add_on = self.extra(*add_on_id, ExtraKind::AddOn)?;
                    details.push(format!("Adicional: {}", add_on.name));
                    unit += add_on.price;
                }
                let notes = notes.trim();
                if !notes.is_empty() {
                    details.push(format!("Obs: {notes}"));
                }

                (title, details, unit)
            }
            CartSelection::Beverage { beverage_id } => {
                let beverage = self.item(*beverage_id, MenuKind::Beverage)?;
                let title = match &beverage.volume {
                    Some(volume) => format!("{} {volume}", beverage.name),
                    None => beverage.name.clone(),
                };
                (title, Vec::new(), flat_price(beverage)?)
            }
            CartSelection::Dessert { dessert_id } => {
                let dessert = self.item(*dessert_id, MenuKind::Dessert)?;
                (dessert.name.clone(), Vec::new(), flat_price(dessert)?)
            }
        };

        Ok(OrderLine {
            line_id,
            selection: selection.clone(),
            title,
            details,
            unit_price,
            quantity,
            line_total: unit_price * i64::from(quantity),
        })
    }

    /// Validate a selection before it is stored in a cart.
    pub fn check_selection(&self, selection: &CartSelection) -> Result<(), PricingError> {
        self.price_line(Uuid::nil(), selection, 1).map(|_| ())
    }

    fn item(&self, id: Uuid, expected: MenuKind) -> Result<&MenuItem, PricingError> {
        let item = self.items.get(&id).ok_or(PricingError::UnknownItem(id))?;
        if item.kind != expected {
            return Err(PricingError::WrongKind {
                name: item.name.clone(),
                expected: expected.as_str(),
            });
        }
        if !item.available {
            return Err(PricingError::Unavailable(item.name.clone()));
        }
        Ok(item)
    }

    fn extra(&self, id: Uuid, expected: ExtraKind) -> Result<&Extra, PricingError> {
        let extra = self.extras.get(&id).ok_or(PricingError::UnknownExtra(id))?;
        if extra.kind != expected {
            return Err(PricingError::WrongKind {
                name: extra.name.clone(),
                expected: match expected {
                    ExtraKind::Crust => "crust",
                    ExtraKind::AddOn => "add-on",
                },
            });
        }
        if !extra.available {
            return Err(PricingError::Unavailable(extra.name.clone()));
        }
        Ok(extra)
    }
}

fn pizza_price(pizza: &MenuItem, size: PizzaSize) -> Result<i64, PricingError> {
    pizza
        .size_prices
        .map(|prices| prices.for_size(size))
        .ok_or_else(|| PricingError::MissingPrice(pizza.name.clone()))
}

fn flat_price(item: &MenuItem) -> Result<i64, PricingError> {
    item.price
        .ok_or_else(|| PricingError::MissingPrice(item.name.clone()))
}

pub fn subtotal(lines: &[OrderLine]) -> i64 {
    lines.iter().map(|line| line.line_total).sum()
}
