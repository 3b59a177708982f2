//! PostgreSQL store.
//!
//! Email uniqueness is a unique index; a violation surfaces as
//! [`StoreError::DuplicateKey`] so concurrent sign-ups cannot both succeed.

use async_trait::async_trait;
use sqlx::PgPool;

use super::{CredentialStore, LedgerStore, StoreError};
use crate::models::auth::{Email, NewUser, User};
use crate::models::ledger::{Account, AccountUpdate, Category, NewAccount, NewCategory};
use crate::uuid::{parse_id, uuidv7};

type UserRow = (String, String, Option<String>, Option<String>);
type AccountRow = (String, String, String, String, String, f64);
type CategoryRow = (String, String, String, String, String, String, String);

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn user_from_row((id, email, password_hash, federated_subject): UserRow) -> User {
    User {
        id,
        email: Email::from_stored(email),
        password_hash,
        federated_subject,
    }
}

fn account_from_row((id, owner_id, name, currency, description, balance): AccountRow) -> Account {
    Account {
        id,
        owner_id,
        name,
        currency,
        description,
        balance,
    }
}

fn category_from_row(
    (id, owner_id, name, category_type, description, color, symbol): CategoryRow,
) -> Category {
    Category {
        id,
        owner_id,
        name,
        category_type,
        description,
        color,
        symbol,
    }
}

fn map_unique_violation(e: sqlx::Error, what: &str) -> StoreError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            StoreError::DuplicateKey(what.to_string())
        }
        _ => StoreError::Db(e),
    }
}

#[async_trait]
impl CredentialStore for PgStore {
    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id::text, email, password_hash, federated_subject FROM users WHERE email = $1",
        )
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(user_from_row))
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<User>, StoreError> {
        let Some(id) = parse_id(id) else {
            return Ok(None);
        };
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id::text, email, password_hash, federated_subject FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(user_from_row))
    }

    async fn create(&self, new_user: NewUser) -> Result<User, StoreError> {
        let id = uuidv7();
        sqlx::query(
            "INSERT INTO users (id, email, password_hash, federated_subject) VALUES ($1, $2, $3, $4)",
        )
        .bind(id)
        .bind(new_user.email().as_str())
        .bind(new_user.password_hash())
        .bind(new_user.federated_subject())
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, &format!("email {}", new_user.email())))?;
        Ok(new_user.into_user(id.to_string()))
    }

    async fn link_federated_subject(
        &self,
        id: &str,
        subject: &str,
    ) -> Result<Option<User>, StoreError> {
        let Some(id) = parse_id(id) else {
            return Ok(None);
        };
        let row = sqlx::query_as::<_, UserRow>(
            "UPDATE users SET federated_subject = $2 WHERE id = $1 \
             RETURNING id::text, email, password_hash, federated_subject",
        )
        .bind(id)
        .bind(subject)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(user_from_row))
    }
}

#[async_trait]
impl LedgerStore for PgStore {
    async fn list_accounts(&self, owner_id: &str) -> Result<Vec<Account>, StoreError> {
        let Some(owner) = parse_id(owner_id) else {
            return Ok(Vec::new());
        };
        let rows = sqlx::query_as::<_, AccountRow>(
            "SELECT id::text, owner_id::text, name, currency, description, balance \
             FROM accounts WHERE owner_id = $1 ORDER BY id",
        )
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(account_from_row).collect())
    }

    async fn find_account(
        &self,
        owner_id: &str,
        account_id: &str,
    ) -> Result<Option<Account>, StoreError> {
        let (Some(owner), Some(id)) = (parse_id(owner_id), parse_id(account_id)) else {
            return Ok(None);
        };
        let row = sqlx::query_as::<_, AccountRow>(
            "SELECT id::text, owner_id::text, name, currency, description, balance \
             FROM accounts WHERE owner_id = $1 AND id = $2",
        )
        .bind(owner)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(account_from_row))
    }

    async fn create_account(
        &self,
        owner_id: &str,
        account: NewAccount,
        limit: usize,
    ) -> Result<Account, StoreError> {
        let id = uuidv7();
        let mut tx = self.pool.begin().await?;

        // Serialise quota checks per owner for the life of the transaction.
        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
            .bind(owner_id)
            .execute(&mut *tx)
            .await?;

        let count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM accounts WHERE owner_id = $1::uuid")
                .bind(owner_id)
                .fetch_one(&mut *tx)
                .await?;
        if count >= limit as i64 {
            return Err(StoreError::LimitReached(limit));
        }

        sqlx::query(
            "INSERT INTO accounts (id, owner_id, name, currency, description, balance) \
             VALUES ($1, $2::uuid, $3, $4, $5, $6)",
        )
        .bind(id)
        .bind(owner_id)
        .bind(&account.name)
        .bind(&account.currency)
        .bind(&account.description)
        .bind(account.balance)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        Ok(account.into_account(id.to_string(), owner_id.to_string()))
    }

    async fn update_account(
        &self,
        owner_id: &str,
        account_id: &str,
        update: AccountUpdate,
    ) -> Result<Option<Account>, StoreError> {
        let (Some(owner), Some(id)) = (parse_id(owner_id), parse_id(account_id)) else {
            return Ok(None);
        };
        let row = sqlx::query_as::<_, AccountRow>(
            "UPDATE accounts SET \
                 name = COALESCE($3, name), \
                 currency = COALESCE($4, currency), \
                 description = COALESCE($5, description), \
                 balance = COALESCE($6, balance) \
             WHERE owner_id = $1 AND id = $2 \
             RETURNING id::text, owner_id::text, name, currency, description, balance",
        )
        .bind(owner)
        .bind(id)
        .bind(update.name)
        .bind(update.currency)
        .bind(update.description)
        .bind(update.balance)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(account_from_row))
    }

    async fn delete_account(&self, owner_id: &str, account_id: &str) -> Result<bool, StoreError> {
        let (Some(owner), Some(id)) = (parse_id(owner_id), parse_id(account_id)) else {
            return Ok(false);
        };
        let result = sqlx::query("DELETE FROM accounts WHERE owner_id = $1 AND id = $2")
            .bind(owner)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_categories(&self, owner_id: &str) -> Result<Vec<Category>, StoreError> {
        let Some(owner) = parse_id(owner_id) else {
            return Ok(Vec::new());
        };
        let rows = sqlx::query_as::<_, CategoryRow>(
            "SELECT id::text, owner_id::text, name, category_type, description, color, symbol \
             FROM categories WHERE owner_id = $1 ORDER BY id",
        )
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(category_from_row).collect())
    }

    async fn find_category(
        &self,
        owner_id: &str,
        category_id: &str,
    ) -> Result<Option<Category>, StoreError> {
        let (Some(owner), Some(id)) = (parse_id(owner_id), parse_id(category_id)) else {
            return Ok(None);
        };
        let row = sqlx::query_as::<_, CategoryRow>(
            "SELECT id::text, owner_id::text, name, category_type, description, color, symbol \
             FROM categories WHERE owner_id = $1 AND id = $2",
        )
        .bind(owner)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(category_from_row))
    }

    async fn create_category(
        &self,
        owner_id: &str,
        category: NewCategory,
    ) -> Result<Category, StoreError> {
        let id = uuidv7();
        sqlx::query(
            "INSERT INTO categories (id, owner_id, name, category_type, description, color, symbol) \
             VALUES ($1, $2::uuid, $3, $4, $5, $6, $7)",
        )
        .bind(id)
        .bind(owner_id)
        .bind(&category.name)
        .bind(&category.category_type)
        .bind(&category.description)
        .bind(&category.color)
        .bind(&category.symbol)
        .execute(&self.pool)
        .await?;
        Ok(category.into_category(id.to_string(), owner_id.to_string()))
    }
}
