//! # Account Core - Auth Service
//!
//! The **auth-service** is the core microservice responsible for credential
//! management, verification challenges, and account administration.
//!
//! ## Architecture Overview
//!
//! This service follows **Clean Architecture** principles with clear
//! separation between layers:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        HTTP Layer (api/)                        │
//! │  ┌─────────────┐  ┌───────────────────────┐  ┌────────────────┐ │
//! │  │   routes    │  │ handlers/admin_handlers│  │  DTOs (req/res)│ │
//! │  └──────┬──────┘  └──────────┬─────────────┘  └───────┬────────┘ │
//! └─────────┼────────────────────┼────────────────────────┼─────────┘
//!           │                    │                        │
//!           ▼                    ▼                        ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    Service Layer (service/)                     │
//! │  CredentialService │ VerificationService │ AccountService        │
//! └─────────────────────────────┬─────────────────────────────────────┘
//!                               │
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                  Repository Layer (repository/)                 │
//! │                 Store: account lifecycle tables                  │
//! └─────────────────────────────┬───────────────────────────────────┘
//!                               │
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    Domain Layer (domain/)                       │
//! │        Account, Credential, EmailVerification, PhoneVerification │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## API Endpoints
//!
//! See [`api::routes`] for the full route table.
//!
//! ## Authentication Flow
//!
//! ```text
//! User                    Auth Service              Database
//!   │                          │                        │
//!   │  POST /auth/login        │                        │
//!   │  {email, password}       │                        │
//!   │─────────────────────────▶│                        │
//!   │                          │  SELECT credential      │
//!   │                          │───────────────────────▶│
//!   │                          │  (salt, salted_hash)    │
//!   │                          │◀───────────────────────│
//!   │                          │  constant-time verify   │
//!   │  {accessToken, user}     │                        │
//!   │◀─────────────────────────│                        │
//! ```
//!
//! ## Security Features
//!
//! - **Password Hashing**: Argon2id with OWASP-recommended parameters
//! - **Bearer Tokens**: Signed, type-checked, short-lived for resets
//! - **Rate Limiting**: In-process throttling on resend/reset operations
//! - **Role Hierarchy**: Strict-dominance checks on every admin mutation
//!
//! ## Configuration
//!
//! Environment variables are loaded via [`shared::config::AppConfig`].
//!
//! ## Related Documentation
//!
//! - Authentication design: [`shared::auth`]
//! - Bearer tokens: [`shared::auth::jwt`]
//! - Password hashing: [`shared::auth::crypto`]

use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use shared::auth::{
    crypto::{Argon2Hasher, PasswordHasher},
    jwt::TokenService,
};
use shared::collaborators::{Clock, Mailer, SMSGateway, SystemClock, WebhookMailer, WebhookSMSGateway};
use shared::rate_limit::RateLimiter;
use shared::{config::AppConfig, database, tracing_config};
use std::sync::Arc;
use tracing::info;

mod api;
mod domain;
mod repository;
mod service;

use api::routes;
use repository::Store;
use service::{AccountService, CredentialService, VerificationService};

/// Shared application state injected into all request handlers.
///
/// Wrapped in [`actix_web::web::Data`] and made available to every handler
/// via the extractor pattern.
pub struct AppState {
    /// Bearer token issuance/verification, shared via `Arc` across workers.
    pub tokens: Arc<TokenService>,
    /// Registration, login, password change/reset.
    pub credentials: CredentialService,
    /// Email and phone verification challenges.
    pub verification: VerificationService,
    /// Self-service reads and the full admin surface.
    pub accounts: AccountService,
    /// Echoed in the health check response.
    pub service_name: String,
}

/// Application entry point and server initialization.
///
/// # Initialization Sequence
///
/// 1. Load configuration from environment variables
/// 2. Initialize structured logging/tracing
/// 3. Create PostgreSQL connection pool and run migrations
/// 4. Instantiate collaborators (mailer, SMS gateway, clock) and services
/// 5. Configure and start the HTTP server
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let config = AppConfig::from_env().expect("Failed to load configuration");

    tracing_config::init_tracing(&config.service_name, config.is_production());

    info!(
        service = %config.service_name,
        host = %config.server.host,
        port = %config.server.port,
        "Starting auth-service"
    );

    let db_pool = database::create_pool(&config.database)
        .await
        .expect("Failed to create database pool");

    sqlx::migrate!("../migrations")
        .run(&db_pool)
        .await
        .expect("Failed to run database migrations");

    let tokens = Arc::new(TokenService::new(&config.jwt.secret));
    let hasher: Arc<dyn PasswordHasher> = Arc::new(Argon2Hasher::default());
    let mailer: Arc<dyn Mailer> = Arc::new(WebhookMailer::new(config.delivery.mail_webhook_url.clone()));
    let sms: Arc<dyn SMSGateway> = Arc::new(WebhookSMSGateway::new(config.delivery.sms_webhook_url.clone()));
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let rate_limiter = Arc::new(RateLimiter::new(clock.clone()));

    let store = Store::new(db_pool.clone());

    let credentials = CredentialService::new(
        store.clone(),
        tokens.clone(),
        hasher.clone(),
        mailer.clone(),
        rate_limiter.clone(),
        config.base_url.clone(),
    );
    let verification = VerificationService::new(
        store.clone(),
        mailer,
        sms,
        clock,
        rate_limiter,
        config.base_url.clone(),
        config.is_development(),
    );
    let accounts = AccountService::new(store, hasher);

    let app_state = web::Data::new(AppState {
        tokens,
        credentials,
        verification,
        accounts,
        service_name: config.service_name.clone(),
    });
    let db_pool = web::Data::new(db_pool);

    let server_host = config.server.host.clone();
    let server_port = config.server.port;

    info!("Server listening on {}:{}", server_host, server_port);

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .wrap(tracing_actix_web::TracingLogger::default())
            .app_data(app_state.clone())
            .app_data(db_pool.clone())
            .configure(routes::configure)
    })
    .bind((server_host, server_port))?
    .run()
    .await
}
