//! # Repository Layer
//!
//! The repository layer provides data access abstractions for the account
//! core. It encapsulates all database operations, hiding SQL complexity from
//! the service layer.
//!
//! ## Clean Architecture Principles
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Service Layer                                  │
//! │                    (Business logic, validation)                         │
//! └───────────────────────────────┬─────────────────────────────────────────┘
//!                                 │
//!                                 │ Uses Store
//!                                 ▼
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Repository Layer                                 │
//! │  ┌────────────────────────────────────────────────────────────────────┐ │
//! │  │                          Store                                      │ │
//! │  │  ┌──────────────────┐  ┌──────────────────┐  ┌──────────────────┐  │ │
//! │  │  │ Account Ops      │  │ Email Verify Ops │  │ Phone Verify Ops │  │ │
//! │  │  │ - create         │  │ - upsert         │  │ - upsert         │  │ │
//! │  │  │ - get_by_email   │  │ - consume        │  │ - consume        │  │ │
//! │  │  │ - get_by_id      │  │                  │  │                  │  │ │
//! │  │  │ - update/delete  │  │                  │  │                  │  │ │
//! │  │  └──────────────────┘  └──────────────────┘  └──────────────────┘  │ │
//! │  └────────────────────────────────────────────────────────────────────┘ │
//! └───────────────────────────────────┬─────────────────────────────────────┘
//!                                     │
//!                                     │ sqlx queries
//!                                     ▼
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         PostgreSQL Database                             │
//! │    accounts │ credentials │ email_verifications │ phone_verifications   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Decisions
//!
//! 1. **Concrete Implementation**: Uses the `Store` struct directly rather
//!    than a trait for simplicity.
//!
//! 2. **Connection Pool**: `Store` holds a `PgPool` clone (Arc internally)
//!    for efficient connection sharing.
//!
//! 3. **Error Handling**: Database errors are mapped to [`shared::errors::ApiError`]
//!    for consistent HTTP responses.
//!
//! 4. **Soft Deletes**: account rows use `status = 'deleted'`, never a hard
//!    delete, preserving Credential and verification rows for audit.
//!
//! ## Related Documentation
//!
//! - Error handling: [`shared::errors`]
//! - Connection pool: [`shared::database`]

pub mod store;

pub use store::{AccountFilter, AccountPatch, DashboardCounts, PhoneConsumeOutcome, Store};
