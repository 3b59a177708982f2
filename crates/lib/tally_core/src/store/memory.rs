//! In-memory store backed by `DashMap`.
//!
//! Users are keyed by email so the map's entry API gives the atomic
//! create-if-absent the credential store needs. Ledger records are grouped
//! per owner, which makes quota checks atomic under the owner's shard lock.

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use super::{CredentialStore, LedgerStore, StoreError};
use crate::models::auth::{Email, NewUser, User};
use crate::models::ledger::{Account, AccountUpdate, Category, NewAccount, NewCategory};
use crate::uuid::uuidv7;

#[derive(Debug, Default)]
pub struct MemoryStore {
    /// email → user
    users: DashMap<String, User>,
    /// user id → email
    user_ids: DashMap<String, String>,
    /// owner id → accounts
    accounts: DashMap<String, Vec<Account>>,
    /// owner id → categories
    categories: DashMap<String, Vec<Category>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored users.
    pub fn user_count(&self) -> usize {
        self.users.len()
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, StoreError> {
        Ok(self.users.get(email.as_str()).map(|u| u.clone()))
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<User>, StoreError> {
        let Some(email) = self.user_ids.get(id).map(|e| e.clone()) else {
            return Ok(None);
        };
        Ok(self.users.get(&email).map(|u| u.clone()))
    }

    async fn create(&self, new_user: NewUser) -> Result<User, StoreError> {
        let email = new_user.email().as_str().to_string();
        match self.users.entry(email.clone()) {
            Entry::Occupied(_) => Err(StoreError::DuplicateKey(format!("email {email}"))),
            Entry::Vacant(slot) => {
                let user = new_user.into_user(uuidv7().to_string());
                self.user_ids.insert(user.id.clone(), email);
                slot.insert(user.clone());
                Ok(user)
            }
        }
    }

    async fn link_federated_subject(
        &self,
        id: &str,
        subject: &str,
    ) -> Result<Option<User>, StoreError> {
        let Some(email) = self.user_ids.get(id).map(|e| e.clone()) else {
            return Ok(None);
        };
        Ok(self.users.get_mut(&email).map(|mut user| {
            user.federated_subject = Some(subject.to_string());
            user.clone()
        }))
    }
}

#[async_trait]
impl LedgerStore for MemoryStore {
    async fn list_accounts(&self, owner_id: &str) -> Result<Vec<Account>, StoreError> {
        Ok(self
            .accounts
            .get(owner_id)
            .map(|a| a.clone())
            .unwrap_or_default())
    }

    async fn find_account(
        &self,
        owner_id: &str,
        account_id: &str,
    ) -> Result<Option<Account>, StoreError> {
        Ok(self
            .accounts
            .get(owner_id)
            .and_then(|a| a.iter().find(|acc| acc.id == account_id).cloned()))
    }

    async fn create_account(
        &self,
        owner_id: &str,
        account: NewAccount,
        limit: usize,
    ) -> Result<Account, StoreError> {
        let mut owned = self.accounts.entry(owner_id.to_string()).or_default();
        if owned.len() >= limit {
            return Err(StoreError::LimitReached(limit));
        }
        let account = account.into_account(uuidv7().to_string(), owner_id.to_string());
        owned.push(account.clone());
        Ok(account)
    }

    async fn update_account(
        &self,
        owner_id: &str,
        account_id: &str,
        update: AccountUpdate,
    ) -> Result<Option<Account>, StoreError> {
        let Some(mut owned) = self.accounts.get_mut(owner_id) else {
            return Ok(None);
        };
        Ok(owned
            .iter_mut()
            .find(|acc| acc.id == account_id)
            .map(|acc| {
                update.apply(acc);
                acc.clone()
            }))
    }

    async fn delete_account(&self, owner_id: &str, account_id: &str) -> Result<bool, StoreError> {
        let Some(mut owned) = self.accounts.get_mut(owner_id) else {
            return Ok(false);
        };
        let before = owned.len();
        owned.retain(|acc| acc.id != account_id);
        Ok(owned.len() != before)
    }

    async fn list_categories(&self, owner_id: &str) -> Result<Vec<Category>, StoreError> {
        Ok(self
            .categories
            .get(owner_id)
            .map(|c| c.clone())
            .unwrap_or_default())
    }

    async fn find_category(
        &self,
        owner_id: &str,
        category_id: &str,
    ) -> Result<Option<Category>, StoreError> {
        Ok(self
            .categories
            .get(owner_id)
            .and_then(|c| c.iter().find(|cat| cat.id == category_id).cloned()))
    }

    async fn create_category(
        &self,
        owner_id: &str,
        category: NewCategory,
    ) -> Result<Category, StoreError> {
        let category = category.into_category(uuidv7().to_string(), owner_id.to_string());
        self.categories
            .entry(owner_id.to_string())
            .or_default()
            .push(category.clone());
        Ok(category)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    fn email(raw: &str) -> Email {
        Email::parse(raw).unwrap()
    }

    fn wallet() -> NewAccount {
        NewAccount {
            name: "Wallet".into(),
            currency: "€".into(),
            description: String::new(),
            balance: 0.0,
        }
    }

    #[tokio::test]
    async fn create_then_find_by_email_and_id() {
        let store = MemoryStore::new();
        let user = store
            .create(NewUser::local(email("a@b.com"), "hash".into()))
            .await
            .unwrap();

        let by_email = store.find_by_email(&email("a@b.com")).await.unwrap();
        let by_id = store.find_by_id(&user.id).await.unwrap();
        assert_eq!(by_email.as_ref(), Some(&user));
        assert_eq!(by_id, Some(user));
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let store = MemoryStore::new();
        store
            .create(NewUser::local(email("a@b.com"), "h1".into()))
            .await
            .unwrap();
        let err = store
            .create(NewUser::federated(email("A@B.com"), "sub".into()))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::DuplicateKey(_)));
        assert_eq!(store.user_count(), 1);
    }

    #[tokio::test]
    async fn concurrent_creates_yield_one_user() {
        let store = Arc::new(MemoryStore::new());
        let mut handles = Vec::new();
        for i in 0..16 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store
                    .create(NewUser::local(email("race@b.com"), format!("h{i}")))
                    .await
            }));
        }
        let mut ok = 0;
        for h in handles {
            if h.await.unwrap().is_ok() {
                ok += 1;
            }
        }
        assert_eq!(ok, 1);
        assert_eq!(store.user_count(), 1);
    }

    #[tokio::test]
    async fn link_sets_subject() {
        let store = MemoryStore::new();
        let user = store
            .create(NewUser::local(email("a@b.com"), "hash".into()))
            .await
            .unwrap();
        let linked = store
            .link_federated_subject(&user.id, "google-123")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(linked.federated_subject.as_deref(), Some("google-123"));
        assert!(store.link_federated_subject("missing", "x").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn account_limit_is_enforced() {
        let store = MemoryStore::new();
        store.create_account("u1", wallet(), 2).await.unwrap();
        store.create_account("u1", wallet(), 2).await.unwrap();
        let err = store.create_account("u1", wallet(), 2).await.unwrap_err();
        assert!(matches!(err, StoreError::LimitReached(2)));
        // Other owners are unaffected.
        store.create_account("u2", wallet(), 2).await.unwrap();
    }

    #[tokio::test]
    async fn accounts_are_scoped_to_owner() {
        let store = MemoryStore::new();
        let acc = store.create_account("u1", wallet(), 10).await.unwrap();

        assert!(store.find_account("u2", &acc.id).await.unwrap().is_none());
        assert!(!store.delete_account("u2", &acc.id).await.unwrap());
        assert!(
            store
                .update_account("u2", &acc.id, AccountUpdate::default())
                .await
                .unwrap()
                .is_none()
        );

        assert!(store.delete_account("u1", &acc.id).await.unwrap());
        assert!(store.list_accounts("u1").await.unwrap().is_empty());
    }
}
