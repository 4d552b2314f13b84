//! Accounts Router
//!
//! Paths are relative to the `/api` prefix the binary nests this router
//! under; the idle-timeout policy matches on the full path.

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware,
    routing::{delete, get, post},
};
use std::sync::Arc;

use crate::application::config::AccountsConfig;
use crate::domain::repository::{AccountsRepository, DocumentStore};
use crate::infra::{file_store::LocalFileStore, postgres::PgAccountsRepository};
use crate::presentation::handlers::{self, AccountsAppState};
use crate::presentation::middleware::{enforce_idle_timeout, require_session};

/// Room for multipart boundaries and the `docType` field
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Create the accounts router with PostgreSQL and local disk storage
pub fn accounts_router(
    repo: PgAccountsRepository,
    files: LocalFileStore,
    config: AccountsConfig,
) -> Router {
    accounts_router_generic(repo, files, config)
}

/// Create an accounts router for any repository and document store
pub fn accounts_router_generic<R, F>(repo: R, files: F, config: AccountsConfig) -> Router
where
    R: AccountsRepository,
    F: DocumentStore + Clone + Send + Sync + 'static,
{
    let body_limit = config.max_upload_bytes + MULTIPART_OVERHEAD_BYTES;

    let state = AccountsAppState {
        repo: Arc::new(repo),
        files: Arc::new(files),
        config: Arc::new(config),
    };

    let public = Router::new()
        .route("/accounts/signup", post(handlers::sign_up::<R, F>))
        .route("/accounts/login", post(handlers::sign_in::<R, F>))
        .route("/accounts/logout", post(handlers::sign_out::<R, F>))
        .route("/accounts/status", get(handlers::session_status::<R, F>))
        .route("/accounts/root", get(handlers::root::<R, F>))
        .route("/specialties", get(handlers::list_specialties::<R, F>));

    let protected = Router::new()
        .route("/home", get(handlers::home::<R, F>))
        .route("/psych/onboarding", get(handlers::onboarding::<R, F>))
        .route(
            "/psych/onboarding/documents",
            post(handlers::upload_document::<R, F>).layer(DefaultBodyLimit::max(body_limit)),
        )
        .route(
            "/psych/availability",
            get(handlers::list_slots::<R, F>).post(handlers::create_slot::<R, F>),
        )
        .route(
            "/psych/availability/{id}",
            delete(handlers::delete_slot::<R, F>),
        )
        .route(
            "/admin/documents",
            get(handlers::admin_list_documents::<R, F>),
        )
        .route(
            "/admin/documents/accept",
            post(handlers::admin_accept_documents::<R, F>),
        )
        .route(
            "/admin/specialties",
            post(handlers::admin_create_specialty::<R, F>),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_session::<R, F>,
        ));

    public
        .merge(protected)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            enforce_idle_timeout::<R, F>,
        ))
        .with_state(state)
}
