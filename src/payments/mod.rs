//! Payment provider port and the AbacatePay adapter behind it.

pub mod abacatepay;
pub mod webhook;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::checkout::PixPayer;

pub use abacatepay::AbacatePayClient;

/// Billing state as reported by the provider. Unknown values are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BillingStatus {
    Pending,
    Paid,
    Completed,
    Expired,
    Cancelled,
    Refunded,
    Other(String),
}

impl BillingStatus {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "PENDING" => BillingStatus::Pending,
            "PAID" => BillingStatus::Paid,
            "COMPLETED" => BillingStatus::Completed,
            "EXPIRED" => BillingStatus::Expired,
            "CANCELLED" => BillingStatus::Cancelled,
            "REFUNDED" => BillingStatus::Refunded,
            _ => BillingStatus::Other(raw.trim().to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            BillingStatus::Pending => "PENDING",
            BillingStatus::Paid => "PAID",
            BillingStatus::Completed => "COMPLETED",
            BillingStatus::Expired => "EXPIRED",
            BillingStatus::Cancelled => "CANCELLED",
            BillingStatus::Refunded => "REFUNDED",
            BillingStatus::Other(raw) => raw,
        }
    }

    pub fn is_paid(&self) -> bool {
        matches!(self, BillingStatus::Paid | BillingStatus::Completed)
    }
}

/// A one-time PIX charge for a single order.
#[derive(Debug, Clone)]
pub struct BillingRequest {
    pub order_id: Uuid,
    pub description: String,
    /// Cents.
    pub amount: i64,
    pub payer: PixPayer,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Billing {
    pub id: String,
    /// Payment page encoded in the QR code.
    pub url: String,
    pub status: BillingStatus,
}

#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("payment provider is not configured")]
    NotConfigured,

    #[error("invalid payment request: {0}")]
    InvalidRequest(String),

    #[error("payment provider unreachable: {0}")]
    Transport(String),

    #[error("payment provider returned {status}: {message}")]
    Upstream { status: u16, message: String },

    #[error("payment provider rejected the request: {0}")]
    Rejected(String),

    #[error("unexpected payment provider response: {0}")]
    Decode(String),
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_billing(&self, request: &BillingRequest) -> Result<Billing, PaymentError>;

    async fn billing_status(&self, billing_id: &str) -> Result<BillingStatus, PaymentError>;
}
