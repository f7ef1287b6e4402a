use std::env;

/// Stripe settings consumed at process start. No runtime reconfiguration.
#[derive(Debug, Clone)]
pub struct StripeSettings {
    pub secret_key: String,
    pub webhook_secret: String,
    /// Pre-configured Stripe Price ID used for checkout sessions
    pub price_id: String,
    /// Fallback currency when a checkout session carries none
    pub currency: String,
    /// Fixed product label written into purchase records
    pub product_name: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_path: String,
    pub base_url: String,
    pub stripe: StripeSettings,
    pub success_url: String,
    pub cancel_url: String,
    pub dev_mode: bool,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let dev_mode = env::var("PAYHOOK_ENV")
            .map(|v| v == "dev" || v == "development")
            .unwrap_or(false);

        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port: u16 = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(3000);

        let base_url =
            env::var("BASE_URL").unwrap_or_else(|_| format!("http://{}:{}", host, port));

        let success_url = env::var("SUCCESS_URL")
            .unwrap_or_else(|_| format!("{}/app?payment=success", base_url));
        let cancel_url =
            env::var("CANCEL_URL").unwrap_or_else(|_| format!("{}/?payment=cancelled", base_url));

        Self {
            host,
            port,
            database_path: env::var("DATABASE_PATH").unwrap_or_else(|_| "payhook.db".to_string()),
            base_url,
            stripe: StripeSettings {
                secret_key: env::var("STRIPE_SECRET_KEY").unwrap_or_default(),
                webhook_secret: env::var("STRIPE_WEBHOOK_SECRET").unwrap_or_default(),
                price_id: env::var("STRIPE_PRICE_ID").unwrap_or_default(),
                currency: env::var("STRIPE_CURRENCY").unwrap_or_else(|_| "usd".to_string()),
                product_name: env::var("STRIPE_PRODUCT_NAME")
                    .unwrap_or_else(|_| "SaaS Access".to_string()),
            },
            success_url,
            cancel_url,
            dev_mode,
        }
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
