//! Federated sign-in: turn a verified provider assertion into a local user
//! and a server-side session.

use std::sync::Arc;

use tracing::{debug, info, warn};

use tally_core::auth::AuthError;
use tally_core::auth::identity::{DisabledIdentityVerifier, GoogleIdTokenVerifier, IdentityVerifier};
use tally_core::models::auth::{Email, IdentityClaims, NewUser, User};
use tally_core::store::{CredentialStore, StoreError};

use crate::AppState;
use crate::config::ApiConfig;

/// Outcome of a successful federated login.
#[derive(Debug, Clone)]
pub struct FederatedLogin {
    pub user_id: String,
    pub session_id: String,
}

/// Verifier matching the configuration: Google when a client id is set,
/// otherwise one that rejects everything.
pub fn identity_verifier_from_config(config: &ApiConfig) -> Arc<dyn IdentityVerifier> {
    match &config.google_client_id {
        Some(client_id) => Arc::new(GoogleIdTokenVerifier::new(client_id.clone())),
        None => {
            warn!("GOOGLE_CLIENT_ID not set, federated login disabled");
            Arc::new(DisabledIdentityVerifier)
        }
    }
}

/// Verify `credential`, resolve it to a user, issue a token and open a session.
///
/// Nothing is stored unless the assertion verifies.
pub async fn federated_login(
    state: &AppState,
    credential: Option<&str>,
) -> Result<FederatedLogin, AuthError> {
    debug!(received = credential.is_some(), "federated login attempt");
    let credential = credential
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .ok_or_else(|| AuthError::InvalidAssertion("no credential supplied".into()))?;

    let claims = state.identity.verify(credential).await?;
    let user = resolve_user(state.credentials.as_ref(), &claims).await?;

    let access_token = state.tokens.issue(&user.id)?;
    let session_id = state.sessions.create(&user.id, &access_token);
    info!(user_id = %user.id, "federated sign-in");

    Ok(FederatedLogin {
        user_id: user.id,
        session_id,
    })
}

/// Map verified claims onto a local user.
///
/// - a user with this email and this subject signs in as-is;
/// - no user with this email gets one provisioned;
/// - a local user with no subject yet is linked, but only if the provider
///   vouches for the email;
/// - anything else is refused.
pub async fn resolve_user(
    store: &dyn CredentialStore,
    claims: &IdentityClaims,
) -> Result<User, AuthError> {
    let email = Email::parse(&claims.email)
        .map_err(|_| AuthError::InvalidAssertion("assertion email is invalid".into()))?;

    // One retry covers losing a provisioning race to a concurrent login.
    for _ in 0..2 {
        if let Some(user) = store.find_by_email(&email).await? {
            return link_existing(store, user, claims).await;
        }

        match store
            .create(NewUser::federated(email.clone(), claims.sub.clone()))
            .await
        {
            Ok(user) => {
                info!(user_id = %user.id, "provisioned federated user");
                return Ok(user);
            }
            Err(StoreError::DuplicateKey(_)) => {
                debug!("federated provisioning lost a race, re-reading user");
            }
            Err(e) => return Err(e.into()),
        }
    }

    Err(AuthError::Internal(
        "federated user vanished after duplicate insert".into(),
    ))
}

async fn link_existing(
    store: &dyn CredentialStore,
    user: User,
    claims: &IdentityClaims,
) -> Result<User, AuthError> {
    match user.federated_subject.as_deref() {
        Some(subject) if subject == claims.sub => Ok(user),
        Some(_) => {
            warn!(user_id = %user.id, "federated subject mismatch for email");
            Err(AuthError::InvalidAssertion(
                "email is bound to another identity".into(),
            ))
        }
        None if claims.email_verified == Some(true) => {
            let linked = store
                .link_federated_subject(&user.id, &claims.sub)
                .await?
                .ok_or(AuthError::NotFound)?;
            info!(user_id = %linked.id, "linked federated identity to existing user");
            Ok(linked)
        }
        None => {
            warn!(user_id = %user.id, "refusing to link unverified provider email");
            Err(AuthError::InvalidAssertion(
                "provider email is not verified".into(),
            ))
        }
    }
}
