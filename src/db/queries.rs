use chrono::Utc;
use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::error::{msg, AppError, Result};
use crate::models::*;

use super::from_row::{query_all, query_one, PURCHASE_COLS, USER_COLS};

fn now() -> i64 {
    Utc::now().timestamp()
}

fn gen_id() -> String {
    Uuid::new_v4().to_string()
}

// ============ Users ============

pub fn create_user(conn: &Connection, input: &CreateUser) -> Result<User> {
    input.validate()?;

    let user = User {
        id: gen_id(),
        email: input.email.trim().to_string(),
        has_access: false,
        stripe_customer_id: None,
        created_at: now(),
        updated_at: now(),
    };

    conn.execute(
        "INSERT INTO users (id, email, has_access, stripe_customer_id, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            user.id,
            user.email,
            user.has_access,
            user.stripe_customer_id,
            user.created_at,
            user.updated_at
        ],
    )?;

    Ok(user)
}

pub fn get_user_by_id(conn: &Connection, user_id: &str) -> Result<Option<User>> {
    query_one(
        conn,
        &format!("SELECT {} FROM users WHERE id = ?1", USER_COLS),
        &[&user_id],
    )
}

/// Grant paid access to a user. Monotonic: granting an already-granted
/// user is a no-op, so webhook redelivery is safe.
///
/// Errors if the user does not exist - the caller decides whether that is
/// retryable.
pub fn grant_user_access(conn: &Connection, user_id: &str) -> Result<()> {
    let updated = conn.execute(
        "UPDATE users SET has_access = 1, updated_at = ?2 WHERE id = ?1",
        params![user_id, now()],
    )?;

    if updated == 0 {
        return Err(AppError::NotFound(msg::USER_NOT_FOUND.into()));
    }
    Ok(())
}

/// Record the Stripe customer id for a user, enabling reverse lookups
/// when later events (e.g. payment failures) only carry the customer id.
pub fn update_user_stripe_customer_id(
    conn: &Connection,
    user_id: &str,
    customer_id: &str,
) -> Result<()> {
    let updated = conn.execute(
        "UPDATE users SET stripe_customer_id = ?2, updated_at = ?3 WHERE id = ?1",
        params![user_id, customer_id, now()],
    )?;

    if updated == 0 {
        return Err(AppError::NotFound(msg::USER_NOT_FOUND.into()));
    }
    Ok(())
}

/// Find all users mapped to a Stripe customer id (possibly empty).
pub fn get_users_by_stripe_customer_id(
    conn: &Connection,
    customer_id: &str,
) -> Result<Vec<User>> {
    query_all(
        conn,
        &format!(
            "SELECT {} FROM users WHERE stripe_customer_id = ?1",
            USER_COLS
        ),
        &[&customer_id],
    )
}

// ============ Purchases ============

/// Record a purchase. Idempotent by checkout session id: inserting the
/// same session twice leaves a single row.
///
/// Returns `true` if a new row was inserted, `false` if the session was
/// already recorded (webhook redelivery).
pub fn create_purchase(conn: &Connection, input: &CreatePurchase) -> Result<bool> {
    let inserted = conn.execute(
        "INSERT INTO purchases (id, user_id, stripe_payment_intent_id, stripe_session_id,
                                amount_cents, currency, product_name, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
         ON CONFLICT(stripe_session_id) DO NOTHING",
        params![
            gen_id(),
            input.user_id,
            input.stripe_payment_intent_id,
            input.stripe_session_id,
            input.amount_cents,
            input.currency,
            input.product_name,
            now()
        ],
    )?;

    Ok(inserted > 0)
}

pub fn get_purchase_by_session_id(
    conn: &Connection,
    session_id: &str,
) -> Result<Option<Purchase>> {
    query_one(
        conn,
        &format!(
            "SELECT {} FROM purchases WHERE stripe_session_id = ?1",
            PURCHASE_COLS
        ),
        &[&session_id],
    )
}

pub fn count_purchases(conn: &Connection) -> Result<i64> {
    let count = conn.query_row("SELECT COUNT(*) FROM purchases", [], |row| row.get(0))?;
    Ok(count)
}
