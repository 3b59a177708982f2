//! Persistence boundary.
//!
//! The auth core and the ledger talk to storage only through the traits
//! here. Two backends exist: [`memory::MemoryStore`] (tests, single-process
//! deployments) and [`postgres::PgStore`].

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::auth::{Email, NewUser, User};
use crate::models::ledger::{Account, AccountUpdate, Category, NewAccount, NewCategory};

/// Storage errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write.
    #[error("Duplicate key: {0}")]
    DuplicateKey(String),

    /// A per-owner quota rejected the write.
    #[error("Limit of {0} reached")]
    LimitReached(usize),

    #[error("Database error: {0}")]
    Db(#[from] sqlx::Error),
}

/// Identity records.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, StoreError>;

    async fn find_by_id(&self, id: &str) -> Result<Option<User>, StoreError>;

    /// Create a user if no user holds its email yet.
    ///
    /// The existence check and the insert are one atomic step; a losing
    /// concurrent writer gets [`StoreError::DuplicateKey`].
    async fn create(&self, new_user: NewUser) -> Result<User, StoreError>;

    /// Attach a federated subject to an existing user. Returns `None` if the
    /// user does not exist.
    async fn link_federated_subject(
        &self,
        id: &str,
        subject: &str,
    ) -> Result<Option<User>, StoreError>;
}

/// Accounts and categories, always scoped to an owning user.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    async fn list_accounts(&self, owner_id: &str) -> Result<Vec<Account>, StoreError>;

    async fn find_account(
        &self,
        owner_id: &str,
        account_id: &str,
    ) -> Result<Option<Account>, StoreError>;

    /// Create an account unless the owner already holds `limit` of them.
    async fn create_account(
        &self,
        owner_id: &str,
        account: NewAccount,
        limit: usize,
    ) -> Result<Account, StoreError>;

    async fn update_account(
        &self,
        owner_id: &str,
        account_id: &str,
        update: AccountUpdate,
    ) -> Result<Option<Account>, StoreError>;

    /// Returns `false` when nothing matched.
    async fn delete_account(&self, owner_id: &str, account_id: &str) -> Result<bool, StoreError>;

    async fn list_categories(&self, owner_id: &str) -> Result<Vec<Category>, StoreError>;

    async fn find_category(
        &self,
        owner_id: &str,
        category_id: &str,
    ) -> Result<Option<Category>, StoreError>;

    async fn create_category(
        &self,
        owner_id: &str,
        category: NewCategory,
    ) -> Result<Category, StoreError>;
}
