// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session cookie handling and login-required middleware.

use crate::error::AppError;
use crate::AppState;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use std::sync::Arc;

/// Name of the cookie carrying the opaque session token.
pub const SESSION_COOKIE: &str = "car_catalog_session";

/// Logged-in user resolved from the session cookie.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub username: String,
}

/// Session token from the request cookies, if any.
pub fn session_id(jar: &CookieJar) -> Option<String> {
    jar.get(SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|value| !value.is_empty())
}

/// Cookie that stores `session_id` on the client.
pub fn session_cookie(session_id: String, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, session_id))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .build()
}

/// Cookie that clears the session token; attributes match [`session_cookie`].
pub fn removal_cookie(secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .build()
}

/// Middleware that requires a logged-in session.
pub async fn require_login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let username = session_id(&jar)
        .and_then(|id| state.auth.current_user(&id))
        .ok_or(AppError::Unauthorized)?;

    request.extensions_mut().insert(AuthUser { username });

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_cookie_attributes() {
        let cookie = session_cookie("abc".to_string(), false).to_string();

        assert!(cookie.starts_with("car_catalog_session=abc"));
        assert!(cookie.contains("Path=/"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Lax"));
        assert!(!cookie.contains("Secure"));

        let secure = session_cookie("abc".to_string(), true).to_string();
        assert!(secure.contains("Secure"));
    }

    #[test]
    fn test_session_id_from_jar() {
        let jar = CookieJar::new();
        assert_eq!(session_id(&jar), None);

        let jar = jar.add(session_cookie("existing".to_string(), false));
        assert_eq!(session_id(&jar).as_deref(), Some("existing"));

        let jar = jar.add(session_cookie(String::new(), false));
        assert_eq!(session_id(&jar), None);
    }
}
