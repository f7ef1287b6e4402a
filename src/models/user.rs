use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Basic email format validation.
///
/// Intentionally permissive - this is a sanity check, not RFC 5322.
fn validate_email_format(email: &str) -> Result<()> {
    let email = email.trim();

    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 {
        return Err(AppError::BadRequest("Invalid email format".into()));
    }

    let (local, domain) = (parts[0], parts[1]);
    if local.is_empty() || local.contains(' ') {
        return Err(AppError::BadRequest("Invalid email format".into()));
    }
    if domain.is_empty()
        || !domain.contains('.')
        || domain.starts_with('.')
        || domain.ends_with('.')
    {
        return Err(AppError::BadRequest("Invalid email format".into()));
    }

    Ok(())
}

/// An application user. `has_access` is the paid-entitlement flag;
/// `stripe_customer_id` maps the user back to Stripe for failure lookups.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub has_access: bool,
    pub stripe_customer_id: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Deserialize)]
pub struct CreateUser {
    pub email: String,
}

impl CreateUser {
    pub fn validate(&self) -> Result<()> {
        validate_email_format(&self.email)
    }
}
