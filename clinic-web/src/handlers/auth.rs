//! Login, logout and the provider callback. All verification happens at the
//! hosted auth provider; these handlers only move cookies around. The routes
//! live under `/auth/` so the session gate leaves them alone.

use crate::AppState;
use crate::error::AppError;
use crate::services::auth_client::SESSION_COOKIE;
use askama::Template;
use axum::{
    Form,
    extract::{Query, State},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use serde::Deserialize;

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub error: Option<String>,
}

pub async fn login_page() -> impl IntoResponse {
    LoginTemplate { error: None }
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

fn with_session_cookie(mut response: Response, set_cookie: Option<String>) -> Response {
    if let Some(cookie) = set_cookie {
        match HeaderValue::from_str(&cookie) {
            Ok(value) => {
                response.headers_mut().append(header::SET_COOKIE, value);
            }
            Err(error) => {
                tracing::warn!(%error, "Discarding session cookie with an invalid header value");
            }
        }
    }
    response
}

pub async fn login_handler(
    State(state): State<AppState>,
    Form(payload): Form<LoginRequest>,
) -> Response {
    match state.sessions.sign_in(&payload.email, &payload.password).await {
        Ok(handoff) if handoff.session.is_some() => {
            tracing::info!(email = %payload.email, "User logged in");
            with_session_cookie(Redirect::to("/dashboard").into_response(), handoff.set_cookie)
        }
        Ok(_) => (
            StatusCode::UNAUTHORIZED,
            LoginTemplate {
                error: Some("Invalid email or password".to_string()),
            },
        )
            .into_response(),
        Err(error) => {
            tracing::error!(%error, "Login failed against the auth provider");
            (
                StatusCode::UNAUTHORIZED,
                LoginTemplate {
                    error: Some("Login is temporarily unavailable".to_string()),
                },
            )
                .into_response()
        }
    }
}

#[derive(Deserialize)]
pub struct CallbackParams {
    pub code: String,
}

/// Completes a provider-initiated flow (email confirmation, password reset)
/// by exchanging the callback code for a session cookie.
pub async fn auth_callback(
    State(state): State<AppState>,
    Query(params): Query<CallbackParams>,
) -> Response {
    match state.sessions.exchange_code(&params.code).await {
        Ok(handoff) if handoff.session.is_some() => {
            with_session_cookie(Redirect::to("/dashboard").into_response(), handoff.set_cookie)
        }
        Ok(_) => Redirect::to("/login").into_response(),
        Err(error) => {
            tracing::error!(%error, "Callback code exchange failed");
            Redirect::to("/login").into_response()
        }
    }
}

pub async fn logout_handler(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    let cookie_header = jar
        .get(SESSION_COOKIE)
        .map(|cookie| format!("{}={}", cookie.name(), cookie.value()));

    // Revocation failure never blocks logout; the local cookie is cleared
    // either way.
    if let Err(error) = state.sessions.sign_out(cookie_header.as_deref()).await {
        tracing::error!(%error, "Failed to revoke session during logout");
    }

    let mut removal = Cookie::new(SESSION_COOKIE, "");
    removal.set_path("/");
    let jar = jar.remove(removal);

    (jar, Redirect::to("/"))
}
