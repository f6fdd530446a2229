//! # Account Service
//!
//! Self-service reads plus the full admin surface: create/list/search/get/
//! update/reset-password/delete/change-role/dashboard. Every admin operation
//! requires role ≥ Admin and dispatches the matching hierarchy guard from
//! [`shared::auth::middleware::guards`] before touching the store.
//!
//! ## Related Documentation
//!
//! - Guards: [`shared::auth::middleware::guards`]
//! - Store contracts: [`crate::repository::Store`]

use std::sync::Arc;

use shared::auth::crypto::PasswordHasher;
use shared::auth::middleware::{guards, AuthenticatedUser, Role};
use shared::errors::ApiError;
use tracing::info;

use crate::domain::NewAccount;
use crate::repository::{AccountFilter, AccountPatch, DashboardCounts, Store};
use crate::service::credential_service::AccountView;

/// A page of accounts plus pagination metadata, per the admin listing contract.
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountPage {
    pub accounts: Vec<AccountView>,
    pub page: i64,
    pub limit: i64,
    pub total_accounts: i64,
    pub total_pages: i64,
}

fn paginate(rows: Vec<crate::domain::Account>, total: i64, page: i64, limit: i64) -> AccountPage {
    let total_pages = if limit > 0 { (total + limit - 1) / limit } else { 0 };
    AccountPage {
        accounts: rows.into_iter().map(Into::into).collect(),
        page,
        limit,
        total_accounts: total,
        total_pages,
    }
}

/// Fields an admin may supply when directly creating a user.
pub struct CreateUserInput {
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub email: String,
    pub password: String,
    pub phone: String,
    pub role: i16,
}

#[derive(Clone)]
pub struct AccountService {
    store: Store,
    hasher: Arc<dyn PasswordHasher>,
}

impl AccountService {
    pub fn new(store: Store, hasher: Arc<dyn PasswordHasher>) -> Self {
        Self { store, hasher }
    }

    // =========================================================================
    // SELF-SERVICE READS
    // =========================================================================

    pub async fn get_self(&self, id: i64) -> Result<AccountView, ApiError> {
        let account = self
            .store
            .get_account_by_id(id)
            .await?
            .ok_or_else(|| ApiError::NotFound {
                resource: format!("account:{id}"),
            })?;
        Ok(account.into())
    }

    // =========================================================================
    // ADMIN: CREATE
    // =========================================================================

    pub async fn create_user(
        &self,
        input: CreateUserInput,
        caller: &AuthenticatedUser,
    ) -> Result<AccountView, ApiError> {
        guards::require_min_role(caller, Role::Admin)?;
        let role = guards::validate_role_creation(input.role, caller)?;

        let salt = shared::auth::crypto::new_salt()?;
        let hash = self.hasher.hash(&input.password, &salt)?;

        let fields = NewAccount {
            first_name: input.first_name,
            last_name: input.last_name,
            username: input.username,
            email: input.email,
            phone: input.phone,
            role: role.as_i16(),
        };

        let id = self
            .store
            .create_account_with_credential(fields, &salt, &hash, "active")
            .await?;

        let account = self
            .store
            .get_account_by_id(id)
            .await?
            .ok_or_else(|| ApiError::Internal("account vanished after creation".to_string()))?;

        info!(account_id = id, admin_id = caller.id, "admin created account");
        Ok(account.into())
    }

    // =========================================================================
    // ADMIN: LIST / SEARCH / GET
    // =========================================================================

    pub async fn list_users(
        &self,
        filter: AccountFilter,
        page: i64,
        limit: i64,
        caller: &AuthenticatedUser,
    ) -> Result<AccountPage, ApiError> {
        guards::require_min_role(caller, Role::Admin)?;
        let (rows, total) = self.store.list_accounts(&filter, page, limit).await?;
        Ok(paginate(rows, total, page, limit.clamp(1, 100)))
    }

    pub async fn search_users(
        &self,
        q: &str,
        fields: &[&str],
        page: i64,
        limit: i64,
        caller: &AuthenticatedUser,
    ) -> Result<AccountPage, ApiError> {
        guards::require_min_role(caller, Role::Admin)?;
        let (rows, total) = self.store.search_accounts(q, fields, page, limit).await?;
        Ok(paginate(rows, total, page, limit.clamp(1, 100)))
    }

    pub async fn get_user(&self, id: i64, caller: &AuthenticatedUser) -> Result<AccountView, ApiError> {
        guards::require_min_role(caller, Role::Admin)?;
        let account = self
            .store
            .get_account_by_id(id)
            .await?
            .ok_or_else(|| ApiError::NotFound {
                resource: format!("account:{id}"),
            })?;
        Ok(account.into())
    }

    // =========================================================================
    // ADMIN: UPDATE / DELETE / ROLE / PASSWORD
    // =========================================================================

    pub async fn update_user(
        &self,
        id: i64,
        patch: AccountPatch,
        caller: &AuthenticatedUser,
    ) -> Result<AccountView, ApiError> {
        guards::require_min_role(caller, Role::Admin)?;
        let target = self
            .store
            .get_account_by_id(id)
            .await?
            .ok_or_else(|| ApiError::NotFound {
                resource: format!("account:{id}"),
            })?;
        let target_role = Role::from_i16(target.role).ok_or(ApiError::TokenInvalid)?;
        guards::check_role_hierarchy(id, target_role, caller)?;

        self.store.update_account_fields(id, &patch).await?;
        let updated = self
            .store
            .get_account_by_id(id)
            .await?
            .ok_or_else(|| ApiError::NotFound {
                resource: format!("account:{id}"),
            })?;

        info!(account_id = id, admin_id = caller.id, "admin updated account");
        Ok(updated.into())
    }

    pub async fn reset_user_password(
        &self,
        id: i64,
        new_password: &str,
        caller: &AuthenticatedUser,
    ) -> Result<(), ApiError> {
        guards::require_min_role(caller, Role::Admin)?;
        let target = self
            .store
            .get_account_by_id(id)
            .await?
            .ok_or_else(|| ApiError::NotFound {
                resource: format!("account:{id}"),
            })?;
        let target_role = Role::from_i16(target.role).ok_or(ApiError::TokenInvalid)?;
        guards::check_role_hierarchy(id, target_role, caller)?;

        let salt = shared::auth::crypto::new_salt()?;
        let hash = self.hasher.hash(new_password, &salt)?;
        self.store.set_credential(id, &salt, &hash).await?;

        info!(account_id = id, admin_id = caller.id, "admin reset user password");
        Ok(())
    }

    pub async fn delete_user(&self, id: i64, caller: &AuthenticatedUser) -> Result<(), ApiError> {
        guards::require_min_role(caller, Role::Admin)?;
        let target = self
            .store
            .get_account_by_id(id)
            .await?
            .ok_or_else(|| ApiError::NotFound {
                resource: format!("account:{id}"),
            })?;
        let target_role = Role::from_i16(target.role).ok_or(ApiError::TokenInvalid)?;
        guards::check_role_hierarchy(id, target_role, caller)?;

        self.store.soft_delete(id).await?;
        info!(account_id = id, admin_id = caller.id, "admin soft-deleted account");
        Ok(())
    }

    pub async fn change_user_role(
        &self,
        id: i64,
        new_role: i16,
        caller: &AuthenticatedUser,
    ) -> Result<AccountView, ApiError> {
        guards::require_min_role(caller, Role::Admin)?;
        let target = self
            .store
            .get_account_by_id(id)
            .await?
            .ok_or_else(|| ApiError::NotFound {
                resource: format!("account:{id}"),
            })?;
        let target_role = Role::from_i16(target.role).ok_or(ApiError::TokenInvalid)?;
        let role = guards::check_role_change_hierarchy(id, target_role, new_role, caller)?;

        self.store.update_role(id, role.as_i16()).await?;
        let updated = self
            .store
            .get_account_by_id(id)
            .await?
            .ok_or_else(|| ApiError::NotFound {
                resource: format!("account:{id}"),
            })?;

        info!(
            account_id = id,
            admin_id = caller.id,
            new_role = role.as_i16(),
            "admin changed account role"
        );
        Ok(updated.into())
    }

    // =========================================================================
    // ADMIN: DASHBOARD
    // =========================================================================

    pub async fn dashboard_stats(&self, caller: &AuthenticatedUser) -> Result<DashboardCounts, ApiError> {
        guards::require_min_role(caller, Role::Admin)?;
        self.store.dashboard_counts().await
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_computes_total_pages_by_ceiling_division() {
        let rows = vec![];
        let page = paginate(rows, 101, 2, 25);
        assert_eq!(page.total_pages, 5);
    }

    #[test]
    fn pagination_handles_zero_results() {
        let page = paginate(vec![], 0, 1, 20);
        assert_eq!(page.total_pages, 0);
    }
}
