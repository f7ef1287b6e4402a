//! Stripe webhook intake.
//!
//! Receives payment event notifications, authenticates them against the
//! raw request body, filters to a small allowlist, and applies the
//! event-specific side effects. Stripe retries on any non-2xx response,
//! so the status code is the whole retry protocol:
//!
//! - 400: signature or payload is bad; Stripe does not retry on 4xx
//! - 200: handled (or deliberately ignored); stops redelivery
//! - 500: a side effect failed; Stripe redelivers the notification later

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::db::{queries, AppState};
use crate::error::{AppError, Result};
use crate::models::CreatePurchase;
use crate::payments::{StripeCheckoutSession, StripePaymentIntent};

/// Event types this service acts on. Anything else is acknowledged and
/// dropped - unknown types are expected noise, not errors.
const PERMITTED_EVENTS: &[&str] = &[
    "checkout.session.completed",
    "payment_intent.payment_failed",
    "payment_intent.created",
    "payment_intent.succeeded",
];

fn received() -> Response {
    (StatusCode::OK, Json(json!({ "received": true }))).into_response()
}

fn webhook_error(detail: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "message": format!("Webhook Error: {}", detail) })),
    )
        .into_response()
}

fn processing_failed() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "Webhook processing failed" })),
    )
        .into_response()
}

/// Axum handler for Stripe webhooks.
pub async fn handle_stripe_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let signature = match headers.get("stripe-signature").and_then(|v| v.to_str().ok()) {
        Some(s) => s,
        None => {
            tracing::debug!("Webhook request missing stripe-signature header");
            return webhook_error("Missing stripe-signature header");
        }
    };

    // Verify over the exact raw bytes, then parse. Any failure here means
    // the notification never came from Stripe (or arrived mangled) and no
    // side effects may run.
    let event = match state.stripe.construct_event(&body, signature) {
        Ok(event) => event,
        Err(e) => {
            let detail = match &e {
                AppError::BadRequest(m) => m.clone(),
                other => other.to_string(),
            };
            tracing::warn!("Webhook signature verification failed: {}", detail);
            return webhook_error(&detail);
        }
    };

    if !PERMITTED_EVENTS.contains(&event.event_type.as_str()) {
        tracing::debug!("Unhandled event type: {} ({})", event.event_type, event.id);
        return received();
    }

    let result = match event.event_type.as_str() {
        "checkout.session.completed" => {
            process_checkout_completed(&state, &event.id, &event.data.object)
        }
        "payment_intent.payment_failed" => process_payment_failed(&state, &event.data.object),
        // Succeeded events deliberately do NOT grant access - that is the
        // sole responsibility of checkout.session.completed, otherwise a
        // user could be granted twice from one payment.
        "payment_intent.created" | "payment_intent.succeeded" => {
            log_payment_intent(&event.event_type, &event.data.object)
        }
        _ => unreachable!("event type was checked against the allowlist"),
    };

    match result {
        Ok(()) => received(),
        // A malformed payload cannot become valid on redelivery
        Err(AppError::BadRequest(detail)) => {
            tracing::error!("Failed to parse {} payload: {}", event.event_type, detail);
            webhook_error(&detail)
        }
        Err(e) => {
            tracing::error!("Error processing {} ({}): {}", event.event_type, event.id, e);
            processing_failed()
        }
    }
}

/// Handle successful checkout completion.
///
/// Three effects, in order: grant access, record the Stripe customer id,
/// append the purchase record. Each is idempotent (grant is monotonic,
/// the purchase is keyed by session id), so a 500-triggered redelivery
/// after a partial failure converges to the same final state.
fn process_checkout_completed(
    state: &AppState,
    event_id: &str,
    object: &serde_json::Value,
) -> Result<()> {
    let session: StripeCheckoutSession = serde_json::from_value(object.clone())
        .map_err(|e| AppError::BadRequest(format!("Invalid checkout session: {}", e)))?;

    if session.payment_status != "paid" {
        tracing::info!(
            "Checkout session {} not paid (status: {}), skipping",
            session.id,
            session.payment_status
        );
        return Ok(());
    }

    // The correlation id we planted at checkout creation. Without it the
    // event cannot be mapped to a user, and redelivering the same payload
    // will not help - acknowledge and move on.
    let Some(user_id) = session.client_reference_id.as_deref() else {
        tracing::error!(
            "No client_reference_id in paid checkout session {}",
            session.id
        );
        return Ok(());
    };

    let conn = state.db.get()?;

    // 1. Grant access
    queries::grant_user_access(&conn, user_id)?;

    // 2. Store the Stripe customer id for future lookups (failure handling)
    if let Some(ref customer) = session.customer {
        queries::update_user_stripe_customer_id(&conn, user_id, customer)?;
    }

    // 3. Append the purchase record for history/analytics
    let inserted = queries::create_purchase(
        &conn,
        &CreatePurchase {
            user_id: user_id.to_string(),
            stripe_payment_intent_id: session
                .payment_intent
                .as_ref()
                .map(|pi| pi.id().to_string()),
            stripe_session_id: session.id.clone(),
            amount_cents: session.amount_total.unwrap_or(0),
            currency: session
                .currency
                .clone()
                .unwrap_or_else(|| state.default_currency.clone()),
            product_name: state.product_name.clone(),
        },
    )?;

    if !inserted {
        tracing::info!(
            "Purchase for session {} already recorded (redelivery)",
            session.id
        );
    }

    tracing::info!(
        "Checkout completed: event={}, session={}, user={}",
        event_id,
        session.id,
        user_id
    );

    Ok(())
}

/// Handle failed payment attempts. Observability-only: looks up which
/// user(s) the failure belongs to and logs the reason, mutating nothing.
fn process_payment_failed(state: &AppState, object: &serde_json::Value) -> Result<()> {
    let intent: StripePaymentIntent = serde_json::from_value(object.clone())
        .map_err(|e| AppError::BadRequest(format!("Invalid payment intent: {}", e)))?;

    let Some(ref customer_id) = intent.customer else {
        tracing::warn!("No customer id in failed payment intent {}", intent.id);
        return Ok(());
    };

    let conn = state.db.get()?;
    let users = queries::get_users_by_stripe_customer_id(&conn, customer_id)?;

    if users.is_empty() {
        tracing::warn!("No users found for Stripe customer id: {}", customer_id);
        return Ok(());
    }

    let user_ids: Vec<&str> = users.iter().map(|u| u.id.as_str()).collect();
    let reason = intent
        .last_payment_error
        .as_ref()
        .and_then(|e| e.message.as_deref())
        .unwrap_or("Unknown");

    tracing::warn!(
        "Payment failed for users [{}]: {} (intent: {})",
        user_ids.join(", "),
        reason,
        intent.id
    );

    Ok(())
}

/// Log-only path for payment_intent.created / payment_intent.succeeded.
fn log_payment_intent(event_type: &str, object: &serde_json::Value) -> Result<()> {
    let intent: StripePaymentIntent = serde_json::from_value(object.clone())
        .map_err(|e| AppError::BadRequest(format!("Invalid payment intent: {}", e)))?;

    tracing::info!("{}: {}", event_type, intent.id);
    Ok(())
}
