use std::sync::Arc;

use axum::Router;
use clap::Parser;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use payhook::config::Config;
use payhook::db::{create_pool, init_db, queries, AppState};
use payhook::handlers;
use payhook::models::CreateUser;
use payhook::payments::StripeClient;

#[derive(Parser, Debug)]
#[command(name = "payhook")]
#[command(about = "Stripe payment event intake service for subscription SaaS apps")]
struct Cli {
    /// Seed the database with a dev user (dev mode only)
    #[arg(long)]
    seed: bool,
}

/// Seeds the database with a dev user for local checkout testing.
/// Only runs in dev mode and when the database is empty.
fn seed_dev_data(state: &AppState) {
    let conn = state.db.get().expect("Failed to get db connection for seeding");

    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))
        .expect("Failed to count users");
    if count > 0 {
        tracing::info!("Database already has data, skipping seed");
        return;
    }

    let user = queries::create_user(
        &conn,
        &CreateUser {
            email: "dev@payhook.local".to_string(),
        },
    )
    .expect("Failed to create dev user");

    tracing::info!("============================================");
    tracing::info!("SEEDED DEV USER");
    tracing::info!("Email: {}", user.email);
    tracing::info!("User ID: {}", user.id);
    tracing::info!("============================================");
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "payhook=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env();

    if config.dev_mode {
        tracing::info!("Running in DEVELOPMENT mode");
    }

    if config.stripe.webhook_secret.is_empty() {
        tracing::warn!("STRIPE_WEBHOOK_SECRET is not set - all webhooks will be rejected");
    }

    // Create database connection pool and initialize the schema
    let db_pool = create_pool(&config.database_path).expect("Failed to create database pool");
    {
        let conn = db_pool.get().expect("Failed to get connection");
        init_db(&conn).expect("Failed to initialize database");
    }

    let stripe = Arc::new(StripeClient::new(&config.stripe));

    let state = AppState {
        db: db_pool,
        stripe,
        base_url: config.base_url.clone(),
        default_currency: config.stripe.currency.clone(),
        product_name: config.stripe.product_name.clone(),
        price_id: config.stripe.price_id.clone(),
        success_url: config.success_url.clone(),
        cancel_url: config.cancel_url.clone(),
    };

    // Seed dev data if --seed flag is passed (only in dev mode)
    if cli.seed {
        if !config.dev_mode {
            tracing::warn!("--seed flag ignored: not in dev mode (set PAYHOOK_ENV=dev)");
        } else {
            seed_dev_data(&state);
        }
    }

    // Build the application router
    let app = Router::new()
        // Webhook endpoint (signature auth)
        .merge(handlers::webhooks::router())
        // Checkout initiation
        .merge(handlers::checkout::router())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start the server
    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Payhook server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Failed to start server");
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    tracing::info!("Shutdown signal received, stopping server...");
}
