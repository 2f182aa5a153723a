//! Session cookie policy.
//!
//! The session token only ever travels in an `HttpOnly`, `Secure`,
//! `SameSite=None` cookie whose max-age equals the session TTL.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use super::session::SessionConfig;

/// Build the cookie that hands a session token to the client.
pub fn session_cookie(config: &SessionConfig, token: String) -> Cookie<'static> {
    Cookie::build((config.cookie_name.clone(), token))
        .http_only(true)
        .secure(config.cookie_secure)
        .same_site(SameSite::None)
        .path("/")
        .max_age(::cookie::time::Duration::days(config.ttl_days))
        .build()
}

/// Build a cookie that instructs the client to drop its session token.
pub fn removal_cookie(config: &SessionConfig) -> Cookie<'static> {
    Cookie::build((config.cookie_name.clone(), ""))
        .http_only(true)
        .secure(config.cookie_secure)
        .same_site(SameSite::None)
        .path("/")
        .max_age(::cookie::time::Duration::ZERO)
        .build()
}

/// Read the session token from the request cookies, if present and non-empty.
pub fn session_token(jar: &CookieJar, config: &SessionConfig) -> Option<String> {
    jar.get(&config.cookie_name)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty())
}
