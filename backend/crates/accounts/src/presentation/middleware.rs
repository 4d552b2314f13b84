//! Session Middleware
//!
//! `require_session` resolves the session cookie for protected routes and
//! hands the [`AuthSession`] to handlers through request extensions.
//! `enforce_idle_timeout` applies the idle policy to the protected area.

use axum::body::Body;
use axum::extract::{OriginalUri, State};
use axum::http::{Extensions, HeaderMap, HeaderValue, Request, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use platform::client::fingerprint_request;

use crate::application::CheckSessionUseCase;
use crate::application::idle_timeout::{IdleTimeoutUseCase, IdleVerdict};
use crate::domain::entity::auth_session::AuthSession;
use crate::domain::repository::{AccountsRepository, DocumentStore};
use crate::error::{AccountsError, AccountsResult};
use crate::presentation::handlers::AccountsAppState;

/// Header set on responses that end a session for inactivity
pub const SESSION_EXPIRED_HEADER: &str = "x-session-expired";

/// Middleware that requires a valid session
pub async fn require_session<R, F>(
    State(state): State<AccountsAppState<R, F>>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, Response>
where
    R: AccountsRepository,
    F: DocumentStore + Clone + Send + Sync + 'static,
{
    // Already resolved by the idle-timeout layer
    if req.extensions().get::<AuthSession>().is_some() {
        return Ok(next.run(req).await);
    }

    let session = resolve_session(&state, req.headers(), req.extensions())
        .await
        .map_err(IntoResponse::into_response)?
        .ok_or_else(|| AccountsError::SessionInvalid.into_response())?;

    req.extensions_mut().insert(session);
    Ok(next.run(req).await)
}

/// Middleware that invalidates sessions idle past the configured timeout
///
/// Requests outside the protected area, and requests without a usable
/// session, pass through untouched.
pub async fn enforce_idle_timeout<R, F>(
    State(state): State<AccountsAppState<R, F>>,
    mut req: Request<Body>,
    next: Next,
) -> Response
where
    R: AccountsRepository,
    F: DocumentStore + Clone + Send + Sync + 'static,
{
    // Full path, before any `nest` prefix stripping
    let path = req
        .extensions()
        .get::<OriginalUri>()
        .map(|uri| uri.0.path().to_string())
        .unwrap_or_else(|| req.uri().path().to_string());

    if !state.config.idle.applies_to(&path) {
        return next.run(req).await;
    }

    let resolved = resolve_session(&state, req.headers(), req.extensions()).await;
    let session = match resolved {
        Ok(Some(session)) => session,
        Ok(None) | Err(_) => return next.run(req).await,
    };

    let use_case = IdleTimeoutUseCase::new(state.repo.clone(), state.config.idle.clone());
    match use_case.enforce(session, Utc::now()).await {
        Ok(IdleVerdict::Active(session)) => {
            req.extensions_mut().insert(session);
            next.run(req).await
        }
        Ok(IdleVerdict::Expired) => session_expired_response(&state),
        Err(e) => e.into_response(),
    }
}

/// Look up the session referenced by the request's cookie
///
/// `Ok(None)` when there is no cookie; invalid or foreign sessions are errors.
async fn resolve_session<R, F>(
    state: &AccountsAppState<R, F>,
    headers: &HeaderMap,
    extensions: &Extensions,
) -> AccountsResult<Option<AuthSession>>
where
    R: AccountsRepository,
    F: DocumentStore + Clone + Send + Sync + 'static,
{
    let Some(token) = platform::cookie::extract_cookie(headers, &state.config.session_cookie_name)
    else {
        return Ok(None);
    };

    let fingerprint = fingerprint_request(headers, extensions)?;

    let use_case = CheckSessionUseCase::new(state.repo.clone(), state.config.clone());
    let session = use_case.get_session(&token, &fingerprint.hash).await?;

    Ok(Some(session))
}

fn session_expired_response<R, F>(state: &AccountsAppState<R, F>) -> Response
where
    R: AccountsRepository,
    F: DocumentStore + Clone + Send + Sync + 'static,
{
    let mut response = AccountsError::SessionExpired.into_response();
    let headers = response.headers_mut();

    headers.insert(SESSION_EXPIRED_HEADER, HeaderValue::from_static("true"));
    if let Some(cookie) =
        platform::cookie::set_cookie_header(state.config.session_cookie().build_delete_cookie())
    {
        headers.append(header::SET_COOKIE, cookie);
    }

    response
}
