//! Parsing of AbacatePay webhook callbacks.

use serde_json::Value;

use super::BillingStatus;

/// What a callback says about a billing. The provider has sent the billing
/// nested under `data.billing`, under `billing`, and at the top level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookNotice {
    pub billing_id: Option<String>,
    pub status: BillingStatus,
}

impl WebhookNotice {
    pub fn from_payload(payload: &Value) -> Self {
        let billing_id = lookup(payload, "id");
        let status = lookup(payload, "status")
            .as_deref()
            .map_or(BillingStatus::Pending, BillingStatus::parse);

        Self { billing_id, status }
    }

    pub fn is_paid(&self) -> bool {
        self.status.is_paid()
    }
}

fn lookup(payload: &Value, field: &str) -> Option<String> {
    [
        format!("/data/billing/{field}"),
        format!("/billing/{field}"),
        format!("/{field}"),
    ]
    .iter()
    .filter_map(|pointer| payload.pointer(pointer))
    .filter_map(Value::as_str)
    .map(str::trim)
    .find(|value| !value.is_empty())
    .map(str::to_string)
}

/// Accept the callback when no secret is configured, or when it matches.
pub fn verify_secret(expected: Option<&str>, provided: Option<&str>) -> bool {
    match expected {
        None => true,
        Some(expected) => provided.is_some_and(|provided| constant_time_eq(expected, provided)),
    }
}

fn constant_time_eq(left: &str, right: &str) -> bool {
    let (left, right) = (left.as_bytes(), right.as_bytes());
    if left.len() != right.len() {
        return false;
    }
    left.iter()
        .zip(right)
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}
