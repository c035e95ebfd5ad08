//! The `refreshToken` cookie.
//!
//! The refresh token never appears in a response body. It is set as an
//! `HttpOnly`, `SameSite=Strict` cookie on login/refresh and cleared on
//! logout.

use axum::http::header::COOKIE;
use axum::http::HeaderMap;
use cookie::time::Duration;
use cookie::{Cookie, SameSite};

/// Name of the cookie carrying the refresh token.
pub const REFRESH_COOKIE: &str = "refreshToken";

/// Build the cookie delivering a freshly issued refresh token.
pub fn refresh_cookie(token: &str, max_age_days: i64, secure: bool) -> Cookie<'static> {
    Cookie::build((REFRESH_COOKIE, token.to_string()))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Strict)
        .max_age(Duration::days(max_age_days))
        .build()
}

/// Build a cookie instructing the browser to drop the refresh token.
pub fn clear_refresh_cookie(secure: bool) -> Cookie<'static> {
    let mut cookie = Cookie::build((REFRESH_COOKIE, ""))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Strict)
        .build();
    cookie.make_removal();
    cookie
}

/// Read the refresh token from the request's `Cookie` headers, if any.
pub fn read_refresh_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(Result::ok)
        .find(|c| c.name() == REFRESH_COOKIE && !c.value().is_empty())
        .map(|c| c.value().to_string())
}
