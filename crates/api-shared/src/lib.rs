//! # API Shared
//!
//! Shared utilities and definitions for the SkillnScale APIs.
//!
//! Contains:
//! - Wire types (`dto` module) with serde and OpenAPI schemas
//! - Shared services like `HealthService`
//! - Bearer token issuing and validation (`auth` module)
//!
//! Used by `sns-core` and `api-rest` for common functionality.

pub mod auth;
pub mod dto;
pub mod health;

pub use auth::{Claims, TokenError, TokenKind, TokenService};
pub use dto::*;
pub use health::HealthService;
