//! Cookie service: build the federated-login session cookie.

use std::time::Duration as StdDuration;

use axum_extra::extract::cookie::{Cookie, SameSite};
use time::Duration;

/// Cookie name carrying the server-side session id.
pub const SESSION_COOKIE: &str = "tally_session";

/// Build a httpOnly cookie for a session id.
pub fn session_cookie(session_id: &str, max_age: StdDuration, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE.to_string(), session_id.to_string()))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .path("/".to_string())
        .max_age(Duration::seconds(max_age.as_secs().min(i64::MAX as u64) as i64))
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_cookie_attributes() {
        let cookie = session_cookie("abc", StdDuration::from_secs(60), true);
        assert_eq!(cookie.name(), SESSION_COOKIE);
        assert_eq!(cookie.value(), "abc");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.max_age(), Some(Duration::seconds(60)));
    }
}
