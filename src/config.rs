use std::env;

const DEFAULT_DELIVERY_FEE_CENTS: i64 = 800;
const DEFAULT_ABACATEPAY_BASE_URL: &str = "https://api.abacatepay.com";
const DEFAULT_PAYMENT_RETURN_URL: &str = "http://localhost:5173/meus-pedidos";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub jwt_ttl_hours: i64,
    /// Fee charged on delivery orders, in cents. Pickup orders are free.
    pub delivery_fee_cents: i64,
    pub payments: PaymentConfig,
}

#[derive(Debug, Clone)]
pub struct PaymentConfig {
    /// PIX checkout is rejected when no key is configured.
    pub api_key: Option<String>,
    pub base_url: String,
    pub webhook_secret: Option<String>,
    pub return_url: String,
    pub timeout_secs: u64,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL")?;
        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_SECRET is not set"))?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = parse_or("APP_PORT", 3000);
        let jwt_ttl_hours = parse_or("JWT_TTL_HOURS", 24);
        let delivery_fee_cents = parse_or("DELIVERY_FEE_CENTS", DEFAULT_DELIVERY_FEE_CENTS);

        let payments = PaymentConfig {
            api_key: non_empty("ABACATEPAY_API_KEY"),
            base_url: env::var("ABACATEPAY_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_ABACATEPAY_BASE_URL.to_string()),
            webhook_secret: non_empty("ABACATEPAY_WEBHOOK_SECRET"),
            return_url: env::var("PAYMENT_RETURN_URL")
                .unwrap_or_else(|_| DEFAULT_PAYMENT_RETURN_URL.to_string()),
            timeout_secs: parse_or("PAYMENT_TIMEOUT_SECS", 15),
        };

        if payments.api_key.is_none() {
            tracing::warn!("ABACATEPAY_API_KEY is not set, PIX checkout is disabled");
        }

        Ok(Self {
            database_url,
            host,
            port,
            jwt_secret,
            jwt_ttl_hours,
            delivery_fee_cents,
            payments,
        })
    }
}

fn parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|value| value.parse::<T>().ok())
        .unwrap_or(default)
}

fn non_empty(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}
