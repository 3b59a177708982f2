//! API server configuration.

use std::time::Duration;

use tally_core::auth::jwt::{DEFAULT_TOKEN_TTL_SECS, TokenConfig, resolve_jwt_secret};

/// Default per-user account quota.
pub const DEFAULT_ACCOUNT_LIMIT: usize = 10;

/// Configuration for the API server.
#[derive(Clone)]
pub struct ApiConfig {
    /// Address to bind the HTTP listener (e.g. "127.0.0.1:3100").
    pub bind_addr: String,
    /// PostgreSQL connection URL. `None` runs on the in-memory store.
    pub database_url: Option<String>,
    /// JWT signing secret.
    pub jwt_secret: String,
    /// Access token lifetime, shared by local and federated sign-in.
    pub token_ttl_secs: i64,
    /// Max-age of the federated-login session cookie.
    pub session_max_age_secs: u64,
    /// Base URL of the web frontend; federated login redirects below it.
    pub frontend_url: String,
    /// OAuth client id for Google sign-in. `None` disables federated login.
    pub google_client_id: Option<String>,
    /// Maximum number of accounts per user.
    pub account_limit: usize,
    /// Mark cookies `Secure`.
    pub secure_cookies: bool,
}

impl ApiConfig {
    /// Reads configuration from environment variables with sensible defaults.
    ///
    /// | Variable                     | Default                          |
    /// |------------------------------|----------------------------------|
    /// | `BIND_ADDR`                  | `127.0.0.1:3100`                 |
    /// | `DATABASE_URL`               | unset (in-memory store)          |
    /// | `JWT_SECRET` / `AUTH_SECRET` | generated & persisted to file    |
    /// | `TOKEN_TTL_SECS`             | `86400`                          |
    /// | `SESSION_MAX_AGE_SECS`       | same as `TOKEN_TTL_SECS`         |
    /// | `FRONTEND_URL`               | `http://localhost:3000`          |
    /// | `GOOGLE_CLIENT_ID`           | unset (federated login disabled) |
    /// | `ACCOUNT_LIMIT`              | `10`                             |
    /// | `SECURE_COOKIES`             | `false`                          |
    pub fn from_env() -> Self {
        let token_ttl_secs = env_parse("TOKEN_TTL_SECS").unwrap_or(DEFAULT_TOKEN_TTL_SECS);
        Self {
            bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:3100".into()),
            database_url: env_nonempty("DATABASE_URL"),
            jwt_secret: resolve_jwt_secret(),
            token_ttl_secs,
            session_max_age_secs: env_parse("SESSION_MAX_AGE_SECS")
                .unwrap_or(token_ttl_secs.max(0) as u64),
            frontend_url: std::env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:3000".into()),
            google_client_id: env_nonempty("GOOGLE_CLIENT_ID"),
            account_limit: env_parse("ACCOUNT_LIMIT").unwrap_or(DEFAULT_ACCOUNT_LIMIT),
            secure_cookies: env_parse("SECURE_COOKIES").unwrap_or(false),
        }
    }

    /// Defaults suitable for tests: fixed secret, no database, no provider.
    pub fn for_tests(jwt_secret: &str) -> Self {
        Self {
            bind_addr: "127.0.0.1:0".into(),
            database_url: None,
            jwt_secret: jwt_secret.into(),
            token_ttl_secs: DEFAULT_TOKEN_TTL_SECS,
            session_max_age_secs: DEFAULT_TOKEN_TTL_SECS as u64,
            frontend_url: "http://localhost:3000".into(),
            google_client_id: None,
            account_limit: DEFAULT_ACCOUNT_LIMIT,
            secure_cookies: false,
        }
    }

    pub fn token_config(&self) -> TokenConfig {
        TokenConfig::new(self.jwt_secret.clone()).with_ttl_secs(self.token_ttl_secs)
    }

    pub fn session_max_age(&self) -> Duration {
        Duration::from_secs(self.session_max_age_secs)
    }

    /// Where the browser lands after a successful federated login.
    pub fn success_redirect(&self) -> String {
        frontend_path(&self.frontend_url, "app")
    }

    /// Where the browser lands after a failed federated login.
    pub fn failure_redirect(&self) -> String {
        frontend_path(&self.frontend_url, "auth/failed")
    }
}

impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("bind_addr", &self.bind_addr)
            .field("database_url", &self.database_url.as_ref().map(|_| "<set>"))
            .field("jwt_secret", &"<redacted>")
            .field("token_ttl_secs", &self.token_ttl_secs)
            .field("session_max_age_secs", &self.session_max_age_secs)
            .field("frontend_url", &self.frontend_url)
            .field("google_client_id", &self.google_client_id)
            .field("account_limit", &self.account_limit)
            .field("secure_cookies", &self.secure_cookies)
            .finish()
    }
}

fn env_nonempty(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    env_nonempty(key).and_then(|v| v.parse().ok())
}

/// Join `path` below `base`, tolerating a missing or present trailing slash.
fn frontend_path(base: &str, path: &str) -> String {
    match url::Url::parse(base) {
        Ok(mut url) => {
            if !url.path().ends_with('/') {
                let with_slash = format!("{}/", url.path());
                url.set_path(&with_slash);
            }
            url.join(path)
                .map(|u| u.to_string())
                .unwrap_or_else(|_| format!("{}/{path}", base.trim_end_matches('/')))
        }
        Err(_) => format!("{}/{path}", base.trim_end_matches('/')),
    }
}
