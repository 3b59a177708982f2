//! Local authentication service: sign-up, sign-in and the liveness checks
//! used by clients restoring a stored session.

use tracing::{debug, error, info};

use tally_core::auth::AuthError;
use tally_core::auth::jwt::TokenService;
use tally_core::auth::password::{hash_password, verify_password};
use tally_core::models::auth::{Email, NewUser};
use tally_core::store::{CredentialStore, StoreError};

use crate::error::{AppError, AppResult};
use crate::models::{CheckUserResponse, ProfileResponse, SignInResponse, SignUpResponse};

/// Register a local user and issue its first token.
///
/// Email uniqueness is enforced by the store's atomic create, so two
/// concurrent sign-ups for one email produce one user and one
/// `DuplicateEmail` rejection.
pub async fn sign_up(
    store: &dyn CredentialStore,
    tokens: &TokenService,
    email: &str,
    password: &str,
) -> AppResult<SignUpResponse> {
    let email = Email::parse(email).map_err(AuthError::from)?;
    if password.is_empty() {
        return Err(AppError::Validation("Password must not be empty".into()));
    }

    let pw_hash = hash_password(password)?;

    let user = match store.create(NewUser::local(email, pw_hash)).await {
        Ok(user) => user,
        Err(StoreError::DuplicateKey(_)) => {
            debug!("sign-up rejected: email already in use");
            return Err(AuthError::DuplicateEmail.into());
        }
        Err(e) => {
            error!("sign-up storage failure: {e}");
            return Err(e.into());
        }
    };

    let access_token = tokens.issue(&user.id)?;
    info!(user_id = %user.id, "user signed up");

    Ok(SignUpResponse {
        access_token,
        id: user.id,
    })
}

/// Authenticate with email + password.
pub async fn sign_in(
    store: &dyn CredentialStore,
    tokens: &TokenService,
    email: &str,
    password: &str,
) -> AppResult<SignInResponse> {
    // A malformed email can't belong to anyone.
    let email = Email::parse(email).map_err(|_| AuthError::NotFound)?;

    let user = store
        .find_by_email(&email)
        .await?
        .ok_or(AuthError::NotFound)?;

    // Federation-only accounts have no password to check against.
    let pw_hash = user.password_hash.as_deref().ok_or(AuthError::NotFound)?;

    if !verify_password(password, pw_hash)? {
        debug!(user_id = %user.id, "sign-in rejected: wrong password");
        return Err(AuthError::InvalidCredentials.into());
    }

    let access_token = tokens.issue(&user.id)?;
    debug!(user_id = %user.id, "user signed in");

    Ok(SignInResponse {
        id: user.id,
        email: user.email.to_string(),
        access_token,
    })
}

/// Report whether an email is registered.
pub async fn check_user(store: &dyn CredentialStore, email: &str) -> AppResult<CheckUserResponse> {
    let Ok(email) = Email::parse(email) else {
        return Ok(CheckUserResponse {
            exists: false,
            id: None,
        });
    };
    let user = store.find_by_email(&email).await?;
    Ok(CheckUserResponse {
        exists: user.is_some(),
        id: user.map(|u| u.id),
    })
}

/// Best-effort check: does `token` currently authenticate user `id`?
///
/// Never fails. Every problem, from a missing user to a storage outage, is
/// reported as `false`, so a `false` is not proof the token is bad.
pub async fn check_token(
    store: &dyn CredentialStore,
    tokens: &TokenService,
    id: Option<&str>,
    token: Option<&str>,
) -> bool {
    let (Some(id), Some(token)) = (id, token) else {
        return false;
    };

    let user = match store.find_by_id(id).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            debug!(user_id = id, "check_token: no such user");
            return false;
        }
        Err(e) => {
            debug!(user_id = id, "check_token: lookup failed: {e}");
            return false;
        }
    };

    match tokens.verify(token) {
        Ok(subject) => subject == user.id,
        Err(e) => {
            debug!(user_id = id, "check_token: {e}");
            false
        }
    }
}

/// Profile of the authenticated user.
pub async fn profile(store: &dyn CredentialStore, user_id: &str) -> AppResult<ProfileResponse> {
    let user = store
        .find_by_id(user_id)
        .await?
        .ok_or(AuthError::NotFound)?;
    Ok(ProfileResponse {
        id: user.id,
        email: user.email.to_string(),
        has_password: user.password_hash.is_some(),
        federated: user.federated_subject.is_some(),
    })
}
