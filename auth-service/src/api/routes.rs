//! # Route Configuration
//!
//! Defines URL patterns and maps them to handler functions.
//!
//! ## Route Structure
//!
//! ```text
//! /
//! ├── health                                    GET    → health_check
//! │
//! ├── auth/
//! │   ├── register                              POST   → register
//! │   ├── login                                 POST   → login
//! │   ├── password/reset-request                POST   → reset_request
//! │   ├── password/reset                         POST   → reset_consume
//! │   ├── verify/email/confirm                   GET    → confirm_email_verification
//! │   ├── user/password/change                   POST   → change_password        (auth)
//! │   ├── verify/email/send                      POST   → send_email_verification (auth)
//! │   ├── verify/phone/send                       POST   → send_phone_verification (auth)
//! │   ├── verify/phone/verify                      POST   → verify_phone_code      (auth)
//! │   └── me                                     GET    → get_self                (auth)
//! │
//! └── admin/
//!     ├── users                                  POST   → create_user
//!     ├── users                                  GET    → list_users
//!     ├── users/search                           GET    → search_users
//!     ├── users/{id}                             GET    → get_user
//!     ├── users/{id}                             PUT    → update_user
//!     ├── users/{id}                             DELETE → delete_user
//!     ├── users/{id}/password                    PUT    → reset_user_password
//!     ├── users/{id}/role                        PUT    → change_user_role
//!     └── dashboard/stats                        GET    → dashboard_stats
//! ```
//!
//! ## Authentication
//!
//! Routes under `auth/user`, `auth/verify/*/send`, `auth/verify/phone/verify`,
//! `auth/me`, and every route under `admin/` require a valid bearer token.
//! There is no Actix middleware service for this — each handler calls
//! [`super::handlers::authenticated_user`] itself. Admin routes additionally
//! require role ≥ Admin, enforced inside [`crate::service::AccountService`].
//!
//! ## Related Documentation
//!
//! - Handler implementations: [`super::handlers`], [`super::admin_handlers`]
//! - Role hierarchy: [`shared::auth::middleware::guards`]

use actix_web::web;

use super::{admin_handlers, handlers};

/// Configures all routes for the account core.
///
/// Called from `main.rs` during app initialization:
///
/// ```rust,ignore
/// App::new()
///     .configure(routes::configure)
/// ```
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(handlers::health_check))
        .service(
            web::scope("/auth")
                // Public routes
                .route("/register", web::post().to(handlers::register))
                .route("/login", web::post().to(handlers::login))
                .route(
                    "/password/reset-request",
                    web::post().to(handlers::reset_request),
                )
                .route("/password/reset", web::post().to(handlers::reset_consume))
                .route(
                    "/verify/email/confirm",
                    web::get().to(handlers::confirm_email_verification),
                )
                // Authenticated routes
                .route(
                    "/user/password/change",
                    web::post().to(handlers::change_password),
                )
                .route(
                    "/verify/email/send",
                    web::post().to(handlers::send_email_verification),
                )
                .route(
                    "/verify/phone/send",
                    web::post().to(handlers::send_phone_verification),
                )
                .route(
                    "/verify/phone/verify",
                    web::post().to(handlers::verify_phone_code),
                )
                .route("/me", web::get().to(handlers::get_self)),
        )
        .service(
            web::scope("/admin")
                .route("/users", web::post().to(admin_handlers::create_user))
                .route("/users", web::get().to(admin_handlers::list_users))
                .route(
                    "/users/search",
                    web::get().to(admin_handlers::search_users),
                )
                .route("/users/{id}", web::get().to(admin_handlers::get_user))
                .route("/users/{id}", web::put().to(admin_handlers::update_user))
                .route(
                    "/users/{id}",
                    web::delete().to(admin_handlers::delete_user),
                )
                .route(
                    "/users/{id}/password",
                    web::put().to(admin_handlers::reset_user_password),
                )
                .route(
                    "/users/{id}/role",
                    web::put().to(admin_handlers::change_user_role),
                )
                .route(
                    "/dashboard/stats",
                    web::get().to(admin_handlers::dashboard_stats),
                ),
        );
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test, App};

    #[actix_web::test]
    async fn health_route_responds_without_state() {
        let app = test::init_service(App::new().route(
            "/health",
            web::get().to(|| async { actix_web::HttpResponse::Ok().finish() }),
        ))
        .await;
        let req = test::TestRequest::get().uri("/health").to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());
    }
}
