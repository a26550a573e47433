//! Session/auth gate.
//!
//! Runs once per request ahead of all other handling: refreshes the
//! provider-owned session from the inbound cookie, then either redirects
//! (protected page without a session, login page with one) or forwards the
//! request with the validated session attached. A refreshed cookie from the
//! provider is propagated on every terminal branch; dropping it on a redirect
//! would silently desynchronize the browser from the provider.

use crate::AppState;
use crate::error::AppError;
use crate::services::auth_client::{Session, SessionHandoff};
use axum::{
    async_trait,
    body::Body,
    extract::{FromRequestParts, State},
    http::{HeaderValue, Request, header, request::Parts},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use std::convert::Infallible;

const AUTH_PREFIX: &str = "/auth/";
const LOGIN_PATH: &str = "/login";
const DASHBOARD_PATH: &str = "/dashboard";

/// Path prefixes that require a valid session. Static: no runtime mutation.
const PROTECTED_PREFIXES: &[&str] = &["/dashboard"];

/// Paths the gate never touches: static assets, image files and the
/// operational endpoints that must stay reachable without a provider round
/// trip.
const EXEMPT_PREFIXES: &[&str] = &["/static/"];
const EXEMPT_PATHS: &[&str] = &["/favicon.ico", "/health", "/metrics"];
const IMAGE_EXTENSIONS: &[&str] = &[".png", ".jpg", ".jpeg", ".gif", ".webp", ".svg", ".ico"];

fn is_exempt(path: &str) -> bool {
    EXEMPT_PREFIXES.iter().any(|prefix| path.starts_with(prefix))
        || EXEMPT_PATHS.contains(&path)
        || IMAGE_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
}

fn is_protected(path: &str) -> bool {
    PROTECTED_PREFIXES.iter().any(|prefix| {
        path.strip_prefix(prefix)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
    })
}

pub async fn session_gate(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let path = request.uri().path().to_owned();

    if path.starts_with(AUTH_PREFIX) || is_exempt(&path) {
        return next.run(request).await;
    }

    let cookie = request
        .headers()
        .get(header::COOKIE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);

    // Provider failures degrade to an anonymous request; the gate redirects
    // or passes exactly as if no session existed.
    let SessionHandoff {
        session,
        set_cookie,
    } = match state.sessions.refresh(cookie.as_deref()).await {
        Ok(handoff) => handoff,
        Err(error) => {
            tracing::warn!(%error, path = %path, "Session refresh failed; treating request as unauthenticated");
            SessionHandoff::anonymous()
        }
    };

    let mut response = if is_protected(&path) && session.is_none() {
        Redirect::to(LOGIN_PATH).into_response()
    } else if path == LOGIN_PATH && session.is_some() {
        Redirect::to(DASHBOARD_PATH).into_response()
    } else {
        if let Some(session) = session {
            request.extensions_mut().insert(session);
        }
        next.run(request).await
    };

    if let Some(cookie) = set_cookie {
        match HeaderValue::from_str(&cookie) {
            Ok(value) => {
                response.headers_mut().append(header::SET_COOKIE, value);
            }
            Err(error) => {
                tracing::warn!(%error, "Discarding refreshed session cookie with an invalid header value");
            }
        }
    }

    response
}

/// The gate's verdict for this request, readable by any handler.
///
/// `None` means the gate found no valid session (or never ran, for exempt
/// paths); endpoints that require authentication call [`CurrentSession::require`].
#[derive(Debug, Clone)]
pub struct CurrentSession(pub Option<Session>);

impl CurrentSession {
    pub fn require(self) -> Result<Session, AppError> {
        self.0
            .ok_or_else(|| AppError::Unauthorized(anyhow::anyhow!("No valid session")))
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for CurrentSession
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(CurrentSession(parts.extensions.get::<Session>().cloned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dashboard_paths_are_protected() {
        assert!(is_protected("/dashboard"));
        assert!(is_protected("/dashboard/services"));
        assert!(!is_protected("/dashboard-preview"));
        assert!(!is_protected("/"));
        assert!(!is_protected("/login"));
    }

    #[test]
    fn assets_and_images_are_exempt() {
        assert!(is_exempt("/static/site.css"));
        assert!(is_exempt("/favicon.ico"));
        assert!(is_exempt("/static/uploads/images/abc.webp"));
        assert!(is_exempt("/logo.png"));
        assert!(!is_exempt("/api/images"));
        assert!(!is_exempt("/dashboard"));
    }
}
