//! Database query tests

mod common;

use common::*;

#[test]
fn test_create_and_get_user() {
    let conn = setup_test_db();

    let user = create_test_user(&conn, "alice@example.com");
    assert_eq!(user.email, "alice@example.com");
    assert!(!user.has_access);
    assert!(user.stripe_customer_id.is_none());

    let fetched = queries::get_user_by_id(&conn, &user.id)
        .expect("Query should succeed")
        .expect("User should exist");
    assert_eq!(fetched.id, user.id);
    assert_eq!(fetched.email, user.email);
}

#[test]
fn test_get_unknown_user_returns_none() {
    let conn = setup_test_db();

    let result = queries::get_user_by_id(&conn, "nonexistent").unwrap();
    assert!(result.is_none());
}

#[test]
fn test_duplicate_email_rejected() {
    let conn = setup_test_db();

    create_test_user(&conn, "alice@example.com");
    let result = queries::create_user(
        &conn,
        &CreateUser {
            email: "alice@example.com".to_string(),
        },
    );

    assert!(result.is_err(), "Duplicate email should be rejected");
}

#[test]
fn test_grant_access_is_monotonic() {
    let conn = setup_test_db();
    let user = create_test_user(&conn, "alice@example.com");

    queries::grant_user_access(&conn, &user.id).unwrap();
    let granted = queries::get_user_by_id(&conn, &user.id).unwrap().unwrap();
    assert!(granted.has_access);

    // Granting again is a no-op, not an error
    queries::grant_user_access(&conn, &user.id).unwrap();
    let still = queries::get_user_by_id(&conn, &user.id).unwrap().unwrap();
    assert!(still.has_access);
}

#[test]
fn test_grant_access_unknown_user_errors() {
    let conn = setup_test_db();

    let result = queries::grant_user_access(&conn, "nonexistent");
    assert!(result.is_err(), "Grant on unknown user should error");
}

#[test]
fn test_update_stripe_customer_id() {
    let conn = setup_test_db();
    let user = create_test_user(&conn, "alice@example.com");

    queries::update_user_stripe_customer_id(&conn, &user.id, "cus_123").unwrap();

    let updated = queries::get_user_by_id(&conn, &user.id).unwrap().unwrap();
    assert_eq!(updated.stripe_customer_id.as_deref(), Some("cus_123"));
}

#[test]
fn test_update_stripe_customer_id_unknown_user_errors() {
    let conn = setup_test_db();

    let result = queries::update_user_stripe_customer_id(&conn, "nonexistent", "cus_123");
    assert!(result.is_err());
}

#[test]
fn test_get_users_by_stripe_customer_id() {
    let conn = setup_test_db();
    let alice = create_test_user(&conn, "alice@example.com");
    let bob = create_test_user(&conn, "bob@example.com");
    create_test_user(&conn, "carol@example.com");

    queries::update_user_stripe_customer_id(&conn, &alice.id, "cus_shared").unwrap();
    queries::update_user_stripe_customer_id(&conn, &bob.id, "cus_shared").unwrap();

    let users = queries::get_users_by_stripe_customer_id(&conn, "cus_shared").unwrap();
    assert_eq!(users.len(), 2);

    let none = queries::get_users_by_stripe_customer_id(&conn, "cus_other").unwrap();
    assert!(none.is_empty());
}

#[test]
fn test_create_purchase() {
    let conn = setup_test_db();
    let user = create_test_user(&conn, "alice@example.com");

    let inserted = queries::create_purchase(
        &conn,
        &CreatePurchase {
            user_id: user.id.clone(),
            stripe_payment_intent_id: Some("pi_1".to_string()),
            stripe_session_id: "cs_1".to_string(),
            amount_cents: 1999,
            currency: "eur".to_string(),
            product_name: "SaaS Access".to_string(),
        },
    )
    .unwrap();
    assert!(inserted);

    let purchase = queries::get_purchase_by_session_id(&conn, "cs_1")
        .unwrap()
        .expect("Purchase should exist");
    assert_eq!(purchase.user_id, user.id);
    assert_eq!(purchase.amount_cents, 1999);
    assert_eq!(purchase.currency, "eur");
}

#[test]
fn test_create_purchase_same_session_is_idempotent() {
    let conn = setup_test_db();
    let user = create_test_user(&conn, "alice@example.com");

    let purchase = CreatePurchase {
        user_id: user.id.clone(),
        stripe_payment_intent_id: Some("pi_1".to_string()),
        stripe_session_id: "cs_dup".to_string(),
        amount_cents: 1999,
        currency: "usd".to_string(),
        product_name: "SaaS Access".to_string(),
    };

    let first = queries::create_purchase(&conn, &purchase).unwrap();
    let second = queries::create_purchase(&conn, &purchase).unwrap();

    assert!(first, "First insert should create a row");
    assert!(!second, "Second insert for the same session should be skipped");
    assert_eq!(queries::count_purchases(&conn).unwrap(), 1);
}

#[test]
fn test_email_validation() {
    let valid = |email: &str| {
        CreateUser {
            email: email.to_string(),
        }
        .validate()
        .is_ok()
    };

    assert!(valid("user@example.com"));
    assert!(valid("a@b.co"));
    assert!(!valid("notanemail"));
    assert!(!valid("@example.com"));
    assert!(!valid("user@"));
    assert!(!valid(""));
}
