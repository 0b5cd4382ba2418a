//! services/api/src/web/middleware.rs
//!
//! Authentication middleware for protecting routes.
//!
//! Sessions are issued by the external identity provider; this service only
//! resolves the `session` cookie to a user id.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use tracing::error;
use uuid::Uuid;

use crate::web::state::AppState;

/// Extracts the session id from a `Cookie` header, if any.
fn session_cookie(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())?
        .split(';')
        .find_map(|c| c.trim().strip_prefix("session="))
}

/// Resolves the caller's session to a user id, if they have a valid one.
///
/// Used by routes that serve anonymous callers too (like status): absence of
/// a session is not an error there, it just means `liked = false`.
pub async fn session_user(state: &AppState, headers: &HeaderMap) -> Option<Uuid> {
    let session_id = session_cookie(headers)?;
    state.store.validate_auth_session(session_id).await.ok()
}

/// Middleware that validates the auth session cookie and extracts the user_id.
///
/// If valid, inserts the user_id into request extensions for handlers to use.
/// If invalid or missing, returns 401 Unauthorized. This gate runs before any
/// existence or ownership check.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let session_id = session_cookie(req.headers()).ok_or(StatusCode::UNAUTHORIZED)?;

    let user_id = state
        .store
        .validate_auth_session(session_id)
        .await
        .map_err(|e| {
            error!("Failed to validate auth session: {:?}", e);
            StatusCode::UNAUTHORIZED
        })?;

    req.extensions_mut().insert(user_id);

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn finds_session_among_other_cookies() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; session=abc-123; lang=tr"),
        );
        assert_eq!(session_cookie(&headers), Some("abc-123"));
    }

    #[test]
    fn missing_cookie_header_yields_none() {
        assert_eq!(session_cookie(&HeaderMap::new()), None);
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("theme=dark"));
        assert_eq!(session_cookie(&headers), None);
    }

    #[tokio::test]
    async fn session_user_resolves_known_sessions_only() {
        let (state, store) = crate::web::testing::state_with_store();
        let user = Uuid::new_v4();
        store.seed_session("tok-1", user);

        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("session=tok-1"));
        assert_eq!(session_user(&state, &headers).await, Some(user));

        headers.insert(header::COOKIE, HeaderValue::from_static("session=tok-2"));
        assert_eq!(session_user(&state, &headers).await, None);
    }
}
