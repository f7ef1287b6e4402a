use serde::{Deserialize, Serialize};

/// Append-only purchase record written when a checkout completes.
///
/// `stripe_session_id` is unique: Stripe delivers webhooks at-least-once,
/// so the session id is the idempotency key for the whole row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Purchase {
    pub id: String,
    pub user_id: String,
    pub stripe_payment_intent_id: Option<String>,
    pub stripe_session_id: String,
    /// Amount in minor currency units (cents)
    pub amount_cents: i64,
    /// ISO 4217 currency code (lowercase, e.g., "usd", "eur")
    pub currency: String,
    pub product_name: String,
    pub created_at: i64,
}

/// Data required to record a new purchase
#[derive(Debug, Clone)]
pub struct CreatePurchase {
    pub user_id: String,
    pub stripe_payment_intent_id: Option<String>,
    pub stripe_session_id: String,
    pub amount_cents: i64,
    pub currency: String,
    pub product_name: String,
}
