//! # SkillnScale Core
//!
//! Business logic for the SkillnScale home-services marketplace.
//!
//! This crate contains configuration, persistence and the marketplace rules:
//! - Accounts, service requests, availability, chat negotiation, bookings, reviews and payments
//!   as database-backed services in [`repositories`]
//! - Pure rules for matching, description validation and booking transitions
//! - Embedded schema migrations and idempotent seed data
//!
//! **No HTTP concerns**: routing, extractors and response mapping belong in `api-rest`.

pub mod config;
pub mod constants;
pub mod db;
pub mod error;
pub mod lifecycle;
pub mod matching;
pub mod models;
pub mod notifications;
pub mod otp;
pub mod payments;
pub mod repositories;
pub mod security;
pub mod seed;
pub mod validation;

pub use config::Settings;
pub use error::{CoreError, CoreResult};
