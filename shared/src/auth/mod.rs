//! # Authentication and Authorization Module
//!
//! Everything needed to mint/verify bearer tokens, hash/verify credentials,
//! and enforce the role hierarchy, shared across the account core's API
//! layer.
//!
//! ## Module Structure
//!
//! ```text
//! auth/
//! ├── crypto.rs     - salts, digests, constant-time comparison, codes
//! ├── jwt.rs        - signed bearer token issuance/verification
//! └── middleware.rs - role hierarchy and request guards
//! ```
//!
//! ## Usage Example
//!
//! ```rust,ignore
//! use shared::auth::{TokenService, Argon2Hasher, PasswordHasher};
//!
//! let tokens = TokenService::new(&config.jwt.secret);
//! let hasher = Argon2Hasher::default();
//!
//! async fn login(email: &str, password: &str) -> ApiResult<String> {
//!     let (account, salt, digest) = store.get_credential(email).await?;
//!     if !hasher.verify(password, &salt, &digest) {
//!         return Err(ApiError::InvalidCredentials);
//!     }
//!     tokens.issue_access(account.id, &account.email, account.role)
//! }
//! ```

pub mod crypto;
pub mod jwt;
pub mod middleware;

pub use crypto::{Argon2Hasher, PasswordHasher, Sha256Hasher};
pub use jwt::{AccessClaims, Claims, ResetClaims, TokenKind, TokenService};
pub use middleware::{guards, AuthenticatedUser, Role};
