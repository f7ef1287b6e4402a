use rusqlite::Connection;

/// Initialize the database schema.
pub fn init_db(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        -- Users (has_access = paid entitlement flag)
        CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            email TEXT NOT NULL UNIQUE,
            has_access INTEGER NOT NULL DEFAULT 0,
            stripe_customer_id TEXT,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_users_stripe_customer ON users(stripe_customer_id);

        -- Purchases (append-only history, one row per checkout session).
        -- stripe_session_id is UNIQUE: webhook redelivery must not create
        -- duplicate rows.
        CREATE TABLE IF NOT EXISTS purchases (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL REFERENCES users(id),
            stripe_payment_intent_id TEXT,
            stripe_session_id TEXT NOT NULL UNIQUE,
            amount_cents INTEGER NOT NULL,
            currency TEXT NOT NULL,
            product_name TEXT NOT NULL,
            created_at INTEGER NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_purchases_user ON purchases(user_id);
        "#,
    )
}
