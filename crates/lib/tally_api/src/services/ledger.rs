//! Ledger service: accounts and categories of the authenticated user.

use tracing::{debug, info};

use tally_core::models::ledger::{
    AccountUpdate, DEFAULT_CATEGORY_COLOR, DEFAULT_CATEGORY_SYMBOL, NewAccount, NewCategory,
};
use tally_core::store::{LedgerStore, StoreError};

use crate::error::{AppError, AppResult};
use crate::models::{
    AccountResponse, CategoryResponse, CreateAccountRequest, CreateCategoryRequest,
    MessageResponse, UpdateAccountRequest,
};

/// Treat blank strings as absent.
fn present(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// List the owner's accounts, or only `account_id` when given.
pub async fn list_accounts(
    store: &dyn LedgerStore,
    owner_id: &str,
    account_id: Option<String>,
) -> AppResult<Vec<AccountResponse>> {
    match present(account_id) {
        Some(id) => {
            let account = store
                .find_account(owner_id, &id)
                .await?
                .ok_or_else(|| AppError::NotFound("Specified account_id not found.".into()))?;
            Ok(vec![account.into()])
        }
        None => Ok(store
            .list_accounts(owner_id)
            .await?
            .into_iter()
            .map(Into::into)
            .collect()),
    }
}

fn no_matching_account() -> AppError {
    AppError::NotFound("No matching account was found for your user.".into())
}

pub async fn create_account(
    store: &dyn LedgerStore,
    owner_id: &str,
    req: CreateAccountRequest,
    limit: usize,
) -> AppResult<MessageResponse> {
    let name = present(req.account_name)
        .ok_or_else(|| AppError::Validation("No account name was provided.".into()))?;

    let new_account = NewAccount {
        name,
        currency: present(req.account_currency).unwrap_or_default(),
        description: present(req.account_desc).unwrap_or_default(),
        balance: req.account_balance.unwrap_or(0.0),
    };

    let account = match store.create_account(owner_id, new_account, limit).await {
        Ok(account) => account,
        Err(StoreError::LimitReached(limit)) => {
            debug!(owner_id, limit, "account limit reached");
            return Err(AppError::Conflict("Account limit reached!".into()));
        }
        Err(e) => return Err(e.into()),
    };

    info!(owner_id, account_id = %account.id, "account created");
    Ok(MessageResponse::with_id(
        "Account creation was successful",
        account.id,
    ))
}

pub async fn update_account(
    store: &dyn LedgerStore,
    owner_id: &str,
    req: UpdateAccountRequest,
) -> AppResult<MessageResponse> {
    let account_id = present(Some(req.account_id))
        .ok_or_else(|| AppError::Validation("No account_id was provided.".into()))?;

    let update = AccountUpdate {
        name: present(req.account_name),
        currency: req.account_currency.map(|c| c.trim().to_string()),
        description: req.account_desc.map(|d| d.trim().to_string()),
        balance: req.account_balance,
    };

    store
        .update_account(owner_id, &account_id, update)
        .await?
        .ok_or_else(no_matching_account)?;

    Ok(MessageResponse::new("Account updated successfully"))
}

pub async fn delete_account(
    store: &dyn LedgerStore,
    owner_id: &str,
    account_id: String,
) -> AppResult<MessageResponse> {
    let account_id = present(Some(account_id))
        .ok_or_else(|| AppError::Validation("No account_id was provided.".into()))?;

    if !store.delete_account(owner_id, &account_id).await? {
        return Err(no_matching_account());
    }
    info!(owner_id, %account_id, "account deleted");
    Ok(MessageResponse::new("Account deleted successfully"))
}

/// List the owner's categories, or only `category_id` when given.
pub async fn list_categories(
    store: &dyn LedgerStore,
    owner_id: &str,
    category_id: Option<String>,
) -> AppResult<Vec<CategoryResponse>> {
    match present(category_id) {
        Some(id) => {
            let category = store
                .find_category(owner_id, &id)
                .await?
                .ok_or_else(|| AppError::NotFound("Specified category_id not found.".into()))?;
            Ok(vec![category.into()])
        }
        None => Ok(store
            .list_categories(owner_id)
            .await?
            .into_iter()
            .map(Into::into)
            .collect()),
    }
}

pub async fn create_category(
    store: &dyn LedgerStore,
    owner_id: &str,
    req: CreateCategoryRequest,
) -> AppResult<MessageResponse> {
    let name = present(req.category_name)
        .ok_or_else(|| AppError::Validation("No category name was provided.".into()))?;
    let category_type = present(req.category_type)
        .ok_or_else(|| AppError::Validation("No category type was provided.".into()))?;

    let category = store
        .create_category(
            owner_id,
            NewCategory {
                name,
                category_type,
                description: present(req.category_desc).unwrap_or_default(),
                color: present(req.category_color)
                    .unwrap_or_else(|| DEFAULT_CATEGORY_COLOR.to_string()),
                symbol: present(req.category_symbol)
                    .unwrap_or_else(|| DEFAULT_CATEGORY_SYMBOL.to_string()),
            },
        )
        .await?;

    info!(owner_id, category_id = %category.id, "category created");
    Ok(MessageResponse::with_id(
        "Category creation was successful",
        category.id,
    ))
}

#[cfg(test)]
mod tests {
    use tally_core::store::memory::MemoryStore;

    use super::*;

    fn account(name: &str) -> CreateAccountRequest {
        CreateAccountRequest {
            account_name: Some(name.into()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn create_applies_defaults() {
        let store = MemoryStore::new();
        let created = create_account(&store, "u1", account("Wallet"), 10)
            .await
            .unwrap();
        assert_eq!(created.message, "Account creation was successful");

        let listed = list_accounts(&store, "u1", None).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(Some(listed[0].id.clone()), created.id);
        assert_eq!(listed[0].account_currency, "");
        assert_eq!(listed[0].account_balance, 0.0);
    }

    #[tokio::test]
    async fn blank_name_is_rejected() {
        let store = MemoryStore::new();
        let err = create_account(&store, "u1", account("   "), 10)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(m) if m == "No account name was provided."));
    }

    #[tokio::test]
    async fn limit_is_enforced() {
        let store = MemoryStore::new();
        for i in 0..2 {
            create_account(&store, "u1", account(&format!("a{i}")), 2)
                .await
                .unwrap();
        }
        let err = create_account(&store, "u1", account("a3"), 2)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(m) if m == "Account limit reached!"));
    }

    #[tokio::test]
    async fn empty_listing_is_empty() {
        let store = MemoryStore::new();
        assert!(list_accounts(&store, "u1", None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_and_delete_are_owner_scoped() {
        let store = MemoryStore::new();
        let id = create_account(&store, "u1", account("Wallet"), 10)
            .await
            .unwrap()
            .id
            .unwrap();

        let foreign = UpdateAccountRequest {
            account_id: id.clone(),
            account_name: Some("Mine now".into()),
            account_currency: None,
            account_desc: None,
            account_balance: None,
        };
        let no_match = "No matching account was found for your user.";
        assert!(matches!(
            update_account(&store, "u2", foreign).await,
            Err(AppError::NotFound(m)) if m == no_match
        ));
        assert!(matches!(
            delete_account(&store, "u2", id.clone()).await,
            Err(AppError::NotFound(m)) if m == no_match
        ));

        let own = UpdateAccountRequest {
            account_id: id.clone(),
            account_name: None,
            account_currency: None,
            account_desc: None,
            account_balance: Some(42.0),
        };
        update_account(&store, "u1", own).await.unwrap();
        let listed = list_accounts(&store, "u1", Some(id.clone())).await.unwrap();
        assert_eq!(listed[0].account_name, "Wallet");
        assert_eq!(listed[0].account_balance, 42.0);

        delete_account(&store, "u1", id).await.unwrap();
        assert!(list_accounts(&store, "u1", None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn category_requires_name_and_type() {
        let store = MemoryStore::new();
        let err = create_category(
            &store,
            "u1",
            CreateCategoryRequest {
                category_name: Some("Food".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(m) if m == "No category type was provided."));

        create_category(
            &store,
            "u1",
            CreateCategoryRequest {
                category_name: Some("Food".into()),
                category_type: Some("expense".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let listed = list_categories(&store, "u1", None).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].category_color, DEFAULT_CATEGORY_COLOR);
        assert_eq!(listed[0].category_symbol, DEFAULT_CATEGORY_SYMBOL);
        assert!(list_categories(&store, "u2", None).await.unwrap().is_empty());
    }
}
