//! Checkout initiation.
//!
//! Creates a Stripe checkout session for a known user. The user id is
//! planted as `client_reference_id` so the webhook intake can map the
//! resulting checkout.session.completed event back to the user.

use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};

use crate::db::{queries, AppState};
use crate::error::{msg, AppError, Result};

#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    pub user_id: String,
}

#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub checkout_url: String,
    pub session_id: String,
}

pub async fn create_checkout(
    State(state): State<AppState>,
    Json(request): Json<CheckoutRequest>,
) -> Result<Json<CheckoutResponse>> {
    {
        let conn = state.db.get()?;
        queries::get_user_by_id(&conn, &request.user_id)?
            .ok_or_else(|| AppError::NotFound(msg::USER_NOT_FOUND.into()))?;
    }

    let (session_id, checkout_url) = state
        .stripe
        .create_checkout_session(
            &request.user_id,
            &state.price_id,
            &state.success_url,
            &state.cancel_url,
        )
        .await?;

    tracing::info!(
        "Checkout session created: user={}, session={}",
        request.user_id,
        session_id
    );

    Ok(Json(CheckoutResponse {
        checkout_url,
        session_id,
    }))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/checkout", post(create_checkout))
}
