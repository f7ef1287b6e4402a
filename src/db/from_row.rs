//! Row mapping trait and helpers for reducing boilerplate in queries.

use rusqlite::{Connection, OptionalExtension, Row, ToSql};

use crate::models::*;

/// Trait for constructing a type from a database row.
pub trait FromRow: Sized {
    fn from_row(row: &Row) -> rusqlite::Result<Self>;
}

/// Query for a single optional result.
pub fn query_one<T: FromRow>(
    conn: &Connection,
    sql: &str,
    params: &[&dyn ToSql],
) -> crate::error::Result<Option<T>> {
    conn.query_row(sql, params, T::from_row)
        .optional()
        .map_err(Into::into)
}

/// Query for multiple results.
pub fn query_all<T: FromRow>(
    conn: &Connection,
    sql: &str,
    params: &[&dyn ToSql],
) -> crate::error::Result<Vec<T>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params, T::from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

// ============ SQL SELECT Constants ============

pub const USER_COLS: &str =
    "id, email, has_access, stripe_customer_id, created_at, updated_at";

pub const PURCHASE_COLS: &str = "id, user_id, stripe_payment_intent_id, stripe_session_id, amount_cents, currency, product_name, created_at";

impl FromRow for User {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(User {
            id: row.get(0)?,
            email: row.get(1)?,
            has_access: row.get(2)?,
            stripe_customer_id: row.get(3)?,
            created_at: row.get(4)?,
            updated_at: row.get(5)?,
        })
    }
}

impl FromRow for Purchase {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Purchase {
            id: row.get(0)?,
            user_id: row.get(1)?,
            stripe_payment_intent_id: row.get(2)?,
            stripe_session_id: row.get(3)?,
            amount_cents: row.get(4)?,
            currency: row.get(5)?,
            product_name: row.get(6)?,
            created_at: row.get(7)?,
        })
    }
}
