//! Payhook - Stripe payment event intake for subscription SaaS apps
//!
//! This library provides the core functionality for the Payhook service:
//! webhook signature verification, event dispatch, and the persistence
//! side effects (entitlement grants, customer mapping, purchase records).

pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;
pub mod payments;
