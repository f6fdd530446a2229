//! # Service Layer
//!
//! Business logic orchestrating the store and the external collaborators.
//! Three services cover the three operational surfaces named by the account
//! core: credentials, verification challenges, and the admin account
//! surface.
//!
//! ## Clean Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                            API Layer                                    │
//! │                    (HTTP handlers, DTOs)                                │
//! └───────────────────────────────┬─────────────────────────────────────────┘
//!                                 │
//!                                 │ Calls service methods
//!                                 ▼
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Service Layer                                  │
//! │  ┌────────────────────┐ ┌───────────────────────┐ ┌───────────────────┐ │
//! │  │ CredentialService  │ │ VerificationService    │ │ AccountService    │ │
//! │  │ register/login/    │ │ email+phone send       │ │ self/admin reads  │ │
//! │  │ change/reset        │ │ and verify             │ │ and admin writes │ │
//! │  └────────────────────┘ └───────────────────────┘ └───────────────────┘ │
//! └───────────────────────────────┬─────────────────────────────────────────┘
//!                                 │
//!                                 │ Uses store + collaborators
//!                                 ▼
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │              Repository Layer          │    External Collaborators     │
//! │            (Data persistence)          │  (Mailer, SMSGateway, Clock)  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Related Documentation
//!
//! - Tokens: [`shared::auth::jwt`]
//! - Hashing: [`shared::auth::crypto`]
//! - Repository: [`crate::repository::Store`]

pub mod account_service;
pub mod credential_service;
pub mod verification_service;

pub use account_service::AccountService;
pub use credential_service::{AccountView, CredentialService};
pub use verification_service::VerificationService;
