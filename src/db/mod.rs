mod from_row;
mod schema;
pub mod queries;

pub use schema::init_db;

use std::sync::Arc;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;

use crate::payments::StripeClient;

pub type DbPool = Pool<SqliteConnectionManager>;

/// Application state holding the database pool and the Stripe client.
///
/// The Stripe client is constructed once at startup and injected here -
/// handlers never reach for process-global state.
#[derive(Clone)]
pub struct AppState {
    pub db: DbPool,
    pub stripe: Arc<StripeClient>,
    /// Base URL for building redirect URLs (e.g. https://api.example.com)
    pub base_url: String,
    /// Fallback currency for purchases when the session carries none
    pub default_currency: String,
    /// Fixed product label written into purchase records
    pub product_name: String,
    /// Stripe Price ID used when creating checkout sessions
    pub price_id: String,
    pub success_url: String,
    pub cancel_url: String,
}

pub fn create_pool(database_path: &str) -> Result<DbPool, r2d2::Error> {
    let manager = SqliteConnectionManager::file(database_path);
    Pool::builder().max_size(10).build(manager)
}
