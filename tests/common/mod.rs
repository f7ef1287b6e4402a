//! Test utilities and fixtures for Payhook integration tests

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, Connection};

pub use payhook::config::StripeSettings;
pub use payhook::db::{init_db, queries, AppState};
pub use payhook::models::*;
pub use payhook::payments::StripeClient;

/// Webhook secret shared by all test fixtures
pub const TEST_WEBHOOK_SECRET: &str = "whsec_test_secret";

pub fn test_stripe_settings() -> StripeSettings {
    StripeSettings {
        secret_key: "sk_test_xxx".to_string(),
        webhook_secret: TEST_WEBHOOK_SECRET.to_string(),
        price_id: "price_test_123".to_string(),
        currency: "usd".to_string(),
        product_name: "SaaS Access".to_string(),
    }
}

/// Create an in-memory test database with schema initialized
pub fn setup_test_db() -> Connection {
    let conn = Connection::open_in_memory().expect("Failed to create in-memory database");
    init_db(&conn).expect("Failed to initialize schema");
    conn
}

/// Create an AppState for testing with an in-memory database.
/// Pool size 1 so every handler call sees the same in-memory connection.
pub fn create_test_app_state() -> AppState {
    let manager = SqliteConnectionManager::memory();
    let pool = Pool::builder().max_size(1).build(manager).unwrap();
    {
        let conn = pool.get().unwrap();
        init_db(&conn).unwrap();
    }

    let settings = test_stripe_settings();

    AppState {
        db: pool,
        stripe: Arc::new(StripeClient::new(&settings)),
        base_url: "http://localhost:3000".to_string(),
        default_currency: settings.currency.clone(),
        product_name: settings.product_name.clone(),
        price_id: settings.price_id.clone(),
        success_url: "http://localhost:3000/app?payment=success".to_string(),
        cancel_url: "http://localhost:3000/?payment=cancelled".to_string(),
    }
}

/// Create a Router with the webhook and checkout endpoints
pub fn test_app(state: AppState) -> Router {
    Router::new()
        .merge(payhook::handlers::webhooks::router())
        .merge(payhook::handlers::checkout::router())
        .with_state(state)
}

/// Create a test user with a generated id
pub fn create_test_user(conn: &Connection, email: &str) -> User {
    queries::create_user(
        conn,
        &CreateUser {
            email: email.to_string(),
        },
    )
    .expect("Failed to create test user")
}

/// Create a test user with a known id (for webhook correlation tests)
pub fn create_test_user_with_id(conn: &Connection, id: &str, email: &str) -> User {
    let now = chrono::Utc::now().timestamp();
    conn.execute(
        "INSERT INTO users (id, email, has_access, stripe_customer_id, created_at, updated_at)
         VALUES (?1, ?2, 0, NULL, ?3, ?3)",
        params![id, email, now],
    )
    .expect("Failed to insert test user");
    queries::get_user_by_id(conn, id)
        .expect("Query should succeed")
        .expect("User should exist")
}

/// Compute a valid Stripe signature header for a payload
pub fn stripe_signature_header(payload: &[u8], secret: &str) -> String {
    let timestamp = chrono::Utc::now().timestamp().to_string();
    let signature = compute_stripe_signature(payload, secret, &timestamp);
    format!("t={},v1={}", timestamp, signature)
}

pub fn compute_stripe_signature(payload: &[u8], secret: &str, timestamp: &str) -> String {
    use hmac::{Hmac, Mac};
    use sha2::Sha256;

    type HmacSha256 = Hmac<Sha256>;

    let signed_payload = format!("{}.{}", timestamp, String::from_utf8_lossy(payload));
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(signed_payload.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}
