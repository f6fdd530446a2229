//! # Domain Layer
//!
//! The domain layer contains the core business entities for the account
//! core. This layer is **framework-agnostic** and represents the heart of
//! the business logic.
//!
//! ## Clean Architecture Principles
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────────┐
//! │                         Domain Layer                              │
//! │  ┌─────────────────────────────────────────────────────────────┐  │
//! │  │                       Entities                              │  │
//! │  │  - Account: Identity, contact info, role, lifecycle status  │  │
//! │  │  - Credential: Salted password digest, one per account      │  │
//! │  │  - EmailVerification: Outstanding email challenge           │  │
//! │  │  - PhoneVerification: Outstanding phone challenge           │  │
//! │  └─────────────────────────────────────────────────────────────┘  │
//! └───────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Decisions
//!
//! 1. **Entities vs DTOs**: Domain entities contain all database fields,
//!    while separate DTOs in the API layer handle request/response transformation.
//!
//! 2. **`FromRow` Derive**: Entities use sqlx's `FromRow` for automatic
//!    mapping from database rows, reducing boilerplate.
//!
//! 3. **Soft deletes**: `status = deleted` enables soft deletion, preserving
//!    the account and its child rows for audit/recovery.

pub mod entities;

pub use entities::*;
