//! Route handlers
//!
//! Each handler resolves the session from the `rp_session` cookie, locks it
//! for the duration of the operation and translates the outcome into a
//! plain-text response.

use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use axum_extra::extract::cookie::CookieJar;
use oidc_rp_core::auth::tokens::generate_session_id;
use oidc_rp_core::SharedSession;
use oidc_rp_domain::AuthError;
use serde::Deserialize;
use tracing::{debug, info};

use crate::cookies::{session_cookie, session_cookie_removal, session_id};
use crate::error::AppError;
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/login", get(login))
        .route("/login_callback", get(login_callback))
        .route("/refresh", get(refresh))
        .route("/logout", get(logout))
        .route("/healthz", get(healthz))
        .with_state(state)
}

/// Query parameters of the authorization response.
#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    pub state: Option<String>,
    pub code: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

async fn existing_session(state: &AppState, jar: &CookieJar) -> Option<(String, SharedSession)> {
    let id = session_id(jar)?;
    let session = state.sessions.get(&id).await?;
    Some((id, session))
}

/// Start a login.
///
/// A cookie naming a session this process does not hold is ignored and a
/// fresh id is issued, so a client cannot choose its own session id.
async fn login(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    let (id, session) = match existing_session(&state, &jar).await {
        Some(existing) => existing,
        None => {
            let id = generate_session_id();
            let session = state.sessions.get_or_create(&id).await;
            (id, session)
        }
    };

    let request = {
        let mut guard = session.lock().await;
        state.service.begin_login(&mut guard)
    };
    let location = request.to_url().to_string();
    debug!(endpoint = %request.endpoint, scope = %request.scope, "Redirecting to provider");

    let jar = jar.add(session_cookie(id, state.secure_cookies));
    (StatusCode::FOUND, jar, [(header::LOCATION, location)])
}

/// Finish a login.
///
/// On success the session moves to a newly issued id and the old id is
/// forgotten; whoever knew the pre-login id holds nothing.
async fn login_callback(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(params): Query<CallbackParams>,
) -> Result<(CookieJar, &'static str), AppError> {
    let session = existing_session(&state, &jar).await;

    if let Some(error) = params.error {
        if let Some((_, session)) = &session {
            let abandoned = state.service.abandon_login(&mut *session.lock().await);
            debug!(abandoned, "Pending login dropped after provider error");
        }
        return Err(AppError::Authorization { error, description: params.error_description });
    }

    let (Some(received_state), Some(code)) = (params.state, params.code) else {
        return Err(AppError::MissingCallbackParameters);
    };
    let Some((old_id, session)) = session else {
        return Err(AuthError::CsrfMismatch.into());
    };

    let new_id = generate_session_id();
    let outcome = {
        let mut guard = session.lock().await;
        let outcome = state.service.complete_login(&mut guard, &received_state, &code).await?;
        state.sessions.insert(&new_id, std::mem::take(&mut *guard)).await;
        outcome
    };
    state.sessions.remove(&old_id).await;

    info!(
        subject = %outcome.claims.subject,
        access_token_expires_at = %outcome.expires_at,
        id_token_expires_at = ?outcome.claims.expires_at(),
        "User authenticated"
    );
    let jar = jar.add(session_cookie(new_id, state.secure_cookies));
    Ok((jar, "Authentication successful."))
}

async fn refresh(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<&'static str, AppError> {
    let Some((_, session)) = existing_session(&state, &jar).await else {
        return Err(AuthError::NoRefreshToken.into());
    };

    let outcome = {
        let mut guard = session.lock().await;
        state.service.refresh(&mut guard).await?
    };

    info!(
        access_token_expires_at = %outcome.expires_at,
        id_token_expires_at = ?outcome.claims.expires_at(),
        refresh_token_rotated = outcome.refresh_token_rotated,
        "Session refreshed"
    );
    Ok("Token refreshed successfully.")
}

async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(CookieJar, &'static str), AppError> {
    let Some(id) = session_id(&jar) else {
        return Err(AuthError::NoActiveSession.into());
    };
    let Some(session) = state.sessions.get(&id).await else {
        return Err(AuthError::NoActiveSession.into());
    };

    {
        let mut guard = session.lock().await;
        state.service.logout(&mut guard).await?;
    }
    state.sessions.remove(&id).await;

    Ok((jar.remove(session_cookie_removal()), "Logged out successfully."))
}

async fn healthz() -> &'static str {
    "ok"
}
