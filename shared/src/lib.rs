//! # Account Core - Shared Library
//!
//! Core shared functionality for the account core service: configuration,
//! error handling, the auth subsystem (tokens, password hashing, role
//! guards), persistence helpers, outbound delivery collaborators, rate
//! limiting, tracing, and request validation.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      auth-service                            │
//! │              ┌────────▼────────┐                            │
//! │              │  shared crate   │ ◄── You are here           │
//! │              └─────────────────┘                            │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose | Key Types |
//! |--------|---------|-----------|
//! | [`config`] | Environment-based configuration | [`AppConfig`] |
//! | [`errors`] | Standardized error handling | [`ApiError`], [`ApiResult`] |
//! | [`auth`] | Bearer tokens, password hashing, role guards | [`auth::TokenService`], [`auth::PasswordHasher`] |
//! | [`database`] | PostgreSQL connection pool | [`database::create_pool`] |
//! | [`collaborators`] | Mailer/SMS/Clock traits | [`collaborators::Mailer`] |
//! | [`rate_limit`] | In-process attempt throttling | [`rate_limit::RateLimiter`] |
//! | [`tracing_config`] | Structured logging setup | [`tracing_config::init_tracing`] |
//! | [`validation`] | Request validation helpers | Custom validators |
//!
//! ## Design Decisions
//!
//! 1. **Single source of truth**: All shared types live here to prevent drift
//! 2. **Security first**: auth and crypto follow OWASP guidelines
//! 3. **Observable by default**: structured logging and tracing built-in
//!
//! ## Usage Example
//!
//! ```rust,ignore
//! use shared::{AppConfig, ApiError, ApiResult};
//! use shared::auth::{TokenService, Argon2Hasher};
//! use shared::database;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::from_env()?;
//!     let db_pool = database::create_pool(&config.database).await?;
//!     let tokens = TokenService::new(&config.jwt.secret);
//!
//!     // Ready to build the service!
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod collaborators;
pub mod config;
pub mod database;
pub mod errors;
pub mod rate_limit;
pub mod tracing_config;
pub mod validation;

// Re-exports for convenience - import commonly used types directly from `shared`
pub use config::AppConfig;
pub use errors::{ApiError, ApiResult};
