//! Checkout rules that do not need the database.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use crate::models::{Address, DeliveryType, Profile};

const MIN_PAYER_NAME_CHARS: usize = 3;
const MIN_PHONE_DIGITS: usize = 10;
const CPF_DIGITS: usize = 11;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CheckoutError {
    #[error("Delivery address is required")]
    MissingAddress,

    #[error("Address field '{0}' is required")]
    MissingAddressField(&'static str),

    #[error("Change amount is required for cash payments")]
    MissingChange,

    #[error("Change amount {change_for} is lower than the order total {total}")]
    InsufficientChange { change_for: i64, total: i64 },

    #[error("Payer data is required for PIX payments")]
    MissingPayer,

    #[error("Payer name must have at least 3 characters")]
    InvalidPayerName,

    #[error("Payer phone must have at least 10 digits")]
    InvalidPhone,

    #[error("Payer email is invalid")]
    InvalidEmail,

    #[error("CPF must have 11 digits")]
    InvalidCpf,
}

/// Payer fields sent with a PIX checkout. Missing name, email and phone fall
/// back to the customer's profile.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct PixPayerInput {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub cpf: String,
}

/// Validated payer data handed to the payment provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixPayer {
    pub name: String,
    pub email: String,
    /// Digits only.
    pub phone: String,
    /// Digits only.
    pub cpf: String,
}

pub fn delivery_fee(delivery_type: DeliveryType, configured_fee: i64) -> i64 {
    match delivery_type {
        DeliveryType::Delivery => configured_fee,
        DeliveryType::Pickup => 0,
    }
}

pub fn digits(value: &str) -> String {
    value.chars().filter(char::is_ascii_digit).collect()
}

/// Trim every field and require the ones a courier needs.
pub fn normalize_address(address: &Address) -> Result<Address, CheckoutError> {
    let required = |name: &'static str, value: &str| -> Result<String, CheckoutError> {
        let value = value.trim();
        if value.is_empty() {
            Err(CheckoutError::MissingAddressField(name))
        } else {
            Ok(value.to_string())
        }
    };

    Ok(Address {
        street: required("street", &address.street)?,
        number: required("number", &address.number)?,
        complement: address
            .complement
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string),
        neighborhood: required("neighborhood", &address.neighborhood)?,
        city: address.city.trim().to_string(),
        cep: required("cep", &address.cep)?,
    })
}

/// Resolve the address of a delivery order: the one sent with checkout, or the saved one.
pub fn resolve_address(
    delivery_type: DeliveryType,
    requested: Option<&Address>,
    profile: &Profile,
) -> Result<Option<Address>, CheckoutError> {
    match delivery_type {
        DeliveryType::Pickup => Ok(None),
        DeliveryType::Delivery => {
            let address = match requested {
                Some(address) => address.clone(),
                None => profile.address().ok_or(CheckoutError::MissingAddress)?,
            };
            normalize_address(&address).map(Some)
        }
    }
}

pub fn validate_change(change_for: Option<i64>, total: i64) -> Result<i64, CheckoutError> {
    let change_for = change_for.ok_or(CheckoutError::MissingChange)?;
    if change_for < total {
        return Err(CheckoutError::InsufficientChange { change_for, total });
    }
    Ok(change_for)
}

pub fn resolve_payer(
    input: Option<&PixPayerInput>,
    profile: &Profile,
) -> Result<PixPayer, CheckoutError> {
    let input = input.ok_or(CheckoutError::MissingPayer)?;

    let name = input
        .name
        .clone()
        .unwrap_or_else(|| profile.name.clone())
        .trim()
        .to_string();
    if name.chars().count() < MIN_PAYER_NAME_CHARS {
        return Err(CheckoutError::InvalidPayerName);
    }

    let phone = digits(
        input
            .phone
            .as_deref()
            .or(profile.phone.as_deref())
            .unwrap_or_default(),
    );
    if phone.len() < MIN_PHONE_DIGITS {
        return Err(CheckoutError::InvalidPhone);
    }

    let email = input
        .email
        .clone()
        .unwrap_or_else(|| profile.email.clone())
        .trim()
        .to_string();
    if !email.contains('@') {
        return Err(CheckoutError::InvalidEmail);
    }

    let cpf = digits(&input.cpf);
    if cpf.len() != CPF_DIGITS {
        return Err(CheckoutError::InvalidCpf);
    }

    Ok(PixPayer {
        name,
        email,
        phone,
        cpf,
    })
}
