//! Request and response bodies.
//!
//! Auth endpoints speak camelCase (`accessToken`); ledger endpoints keep the
//! prefixed snake_case field names (`account_name`) existing clients send.

use serde::{Deserialize, Serialize};

use tally_core::models::ledger::{Account, Category};

/// Error body for every non-2xx JSON response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

/// Plain confirmation body.
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            id: None,
        }
    }

    pub fn with_id(message: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            id: Some(id.into()),
        }
    }
}

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

/// `POST /signup` and `POST /signin` body.
#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUpResponse {
    pub access_token: String,
    pub id: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInResponse {
    pub id: String,
    pub email: String,
    pub access_token: String,
}

#[derive(Debug, Deserialize)]
pub struct CheckUserRequest {
    pub email: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CheckUserResponse {
    pub exists: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

/// `POST /checktoken` body. Fields are optional so a partial body still
/// gets a `{matching: false}` answer.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckTokenRequest {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub access_token: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CheckTokenResponse {
    pub matching: bool,
}

/// `POST /auth/google` body posted by the provider's sign-in button.
#[derive(Debug, Default, Deserialize)]
pub struct GoogleCredentialRequest {
    #[serde(default)]
    pub credential: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub id: String,
    pub email: String,
    pub has_password: bool,
    pub federated: bool,
}

// ---------------------------------------------------------------------------
// Accounts
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub struct AccountQuery {
    #[serde(default)]
    pub account_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CreateAccountRequest {
    #[serde(default)]
    pub account_name: Option<String>,
    #[serde(default)]
    pub account_currency: Option<String>,
    #[serde(default)]
    pub account_desc: Option<String>,
    #[serde(default)]
    pub account_balance: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateAccountRequest {
    pub account_id: String,
    #[serde(default)]
    pub account_name: Option<String>,
    #[serde(default)]
    pub account_currency: Option<String>,
    #[serde(default)]
    pub account_desc: Option<String>,
    #[serde(default)]
    pub account_balance: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct DeleteAccountRequest {
    pub account_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AccountResponse {
    pub id: String,
    pub account_owner_id: String,
    pub account_name: String,
    pub account_currency: String,
    pub account_desc: String,
    pub account_balance: f64,
}

impl From<Account> for AccountResponse {
    fn from(a: Account) -> Self {
        Self {
            id: a.id,
            account_owner_id: a.owner_id,
            account_name: a.name,
            account_currency: a.currency,
            account_desc: a.description,
            account_balance: a.balance,
        }
    }
}

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub struct CategoryQuery {
    #[serde(default)]
    pub category_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CreateCategoryRequest {
    #[serde(default)]
    pub category_name: Option<String>,
    #[serde(default)]
    pub category_type: Option<String>,
    #[serde(default)]
    pub category_desc: Option<String>,
    #[serde(default)]
    pub category_color: Option<String>,
    #[serde(default)]
    pub category_symbol: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CategoryResponse {
    pub id: String,
    pub category_owner_id: String,
    pub category_name: String,
    pub category_type: String,
    pub category_desc: String,
    pub category_color: String,
    pub category_symbol: String,
}

impl From<Category> for CategoryResponse {
    fn from(c: Category) -> Self {
        Self {
            id: c.id,
            category_owner_id: c.owner_id,
            category_name: c.name,
            category_type: c.category_type,
            category_desc: c.description,
            category_color: c.color,
            category_symbol: c.symbol,
        }
    }
}
