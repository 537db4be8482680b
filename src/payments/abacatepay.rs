//! Reqwest-backed AbacatePay adapter.
//!
//! Owns transport details only: request serialisation, bearer auth, timeout,
//! HTTP error mapping and decoding of the `{ data, error }` envelope.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, Url};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;

use super::{Billing, BillingRequest, BillingStatus, PaymentError, PaymentGateway};

const USER_AGENT: &str = "pizzaria-api/0.1";
const MAX_ERROR_BODY_CHARS: usize = 300;

pub struct AbacatePayClient {
    client: Client,
    base_url: Url,
    api_key: Option<String>,
    return_url: String,
}

impl AbacatePayClient {
    /// Build a client with an explicit request timeout.
    ///
    /// Without an API key the client still builds, and every call fails with
    /// [`PaymentError::NotConfigured`].
    pub fn new(
        base_url: Url,
        api_key: Option<String>,
        return_url: String,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            client,
            base_url,
            api_key,
            return_url,
        })
    }

    fn api_key(&self) -> Result<&str, PaymentError> {
        self.api_key.as_deref().ok_or(PaymentError::NotConfigured)
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, PaymentError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                PaymentError::InvalidRequest(format!("base url {} cannot hold a path", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateBillingBody<'a> {
    frequency: &'static str,
    methods: [&'static str; 1],
    products: [BillingProduct<'a>; 1],
    return_url: &'a str,
    completion_url: &'a str,
    customer: BillingCustomer<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BillingProduct<'a> {
    external_id: String,
    name: &'a str,
    quantity: u32,
    price: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BillingCustomer<'a> {
    name: &'a str,
    cellphone: &'a str,
    email: &'a str,
    tax_id: &'a str,
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: Option<T>,
    error: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct BillingData {
    id: String,
    url: String,
    status: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StatusData {
    status: Option<String>,
}

/// The status endpoint has been seen answering with the status both inside
/// `data` and at the top level.
#[derive(Debug, Deserialize)]
struct StatusEnvelope {
    data: Option<StatusData>,
    status: Option<String>,
    error: Option<Value>,
}

#[async_trait]
impl PaymentGateway for AbacatePayClient {
    async fn create_billing(&self, request: &BillingRequest) -> Result<Billing, PaymentError> {
        let api_key = self.api_key()?;
        let url = self.endpoint(&["v1", "billing", "create"])?;
        let body = CreateBillingBody {
            frequency: "ONE_TIME",
            methods: ["PIX"],
            products: [BillingProduct {
                external_id: request.order_id.to_string(),
                name: &request.description,
                quantity: 1,
                price: request.amount,
            }],
            return_url: &self.return_url,
            completion_url: &self.return_url,
            customer: BillingCustomer {
                name: &request.payer.name,
                cellphone: &request.payer.phone,
                email: &request.payer.email,
                tax_id: &request.payer.cpf,
            },
        };

        let response = self
            .client
            .post(url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(map_transport_error)?;

        let envelope: Envelope<BillingData> = decode(response).await?;
        if let Some(error) = envelope.error.as_ref().filter(|error| !error.is_null()) {
            return Err(PaymentError::Rejected(error_message(error)));
        }
        let data = envelope
            .data
            .ok_or_else(|| PaymentError::Decode("billing response has no data".into()))?;

        Ok(Billing {
            id: data.id,
            url: data.url,
            status: data
                .status
                .as_deref()
                .map_or(BillingStatus::Pending, BillingStatus::parse),
        })
    }

    async fn billing_status(&self, billing_id: &str) -> Result<BillingStatus, PaymentError> {
        let api_key = self.api_key()?;
        if billing_id.trim().is_empty() {
            return Err(PaymentError::InvalidRequest("billing id is empty".into()));
        }
        let url = self.endpoint(&["v1", "billing", "status", billing_id])?;

        let response = self
            .client
            .get(url)
            .bearer_auth(api_key)
            .send()
            .await
            .map_err(map_transport_error)?;

        let envelope: StatusEnvelope = decode(response).await?;
        if let Some(error) = envelope.error.as_ref().filter(|error| !error.is_null()) {
            return Err(PaymentError::Rejected(error_message(error)));
        }

        // Blank statuses count as missing, same as in webhook payloads.
        let present = |status: &String| !status.trim().is_empty();
        let status = envelope
            .data
            .and_then(|data| data.status)
            .filter(present)
            .or(envelope.status.filter(present));
        Ok(status
            .as_deref()
            .map_or(BillingStatus::Pending, BillingStatus::parse))
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, PaymentError> {
    let status = response.status();
    let body = response.bytes().await.map_err(map_transport_error)?;

    if !status.is_success() {
        let message = serde_json::from_slice::<Value>(&body)
            .ok()
            .and_then(|value| value.get("error").cloned())
            .filter(|error| !error.is_null())
            .map(|error| error_message(&error))
            .unwrap_or_else(|| {
                String::from_utf8_lossy(&body)
                    .chars()
                    .take(MAX_ERROR_BODY_CHARS)
                    .collect()
            });
        return Err(PaymentError::Upstream {
            status: status.as_u16(),
            message,
        });
    }

    serde_json::from_slice(&body)
        .map_err(|error| PaymentError::Decode(format!("invalid JSON payload: {error}")))
}

fn error_message(error: &Value) -> String {
    match error {
        Value::String(message) => message.clone(),
        Value::Object(fields) => fields
            .get("message")
            .and_then(Value::as_str)
            .map_or_else(|| error.to_string(), str::to_string),
        other => other.to_string(),
    }
}

fn map_transport_error(error: reqwest::Error) -> PaymentError {
    if error.is_timeout() {
        PaymentError::Transport("request timed out".into())
    } else {
        PaymentError::Transport(error.to_string())
    }
}
