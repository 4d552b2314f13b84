//! HTTP Handlers

use axum::extract::{FromRequestParts, Path, Query, State};
use axum::http::request::Parts;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::IntoResponse;
use axum::{Extension, Json};
use axum_extra::extract::Multipart;
use axum_extra::extract::multipart::MultipartError;
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use platform::client::{ClientFingerprint, fingerprint_request};

use crate::application::config::AccountsConfig;
use crate::application::idle_timeout::IdleTimeoutUseCase;
use crate::application::session_token;
use crate::application::{
    AvailabilityUseCase, CatalogUseCase, CheckSessionUseCase, NewSlotInput, OnboardingUseCase,
    OnboardingView, RootTarget, SignInInput, SignInUseCase, SignOutUseCase, SignUpInput,
    SignUpUseCase, UploadDocumentInput, VerificationUseCase,
};
use crate::domain::entity::auth_session::AuthSession;
use crate::domain::repository::{AccountsRepository, DocumentStore};
use crate::domain::value_object::{document_type::DocumentType, ids::SlotId};
use crate::error::{AccountsError, AccountsResult};
use crate::presentation::dto::{
    AcceptDocumentsRequest, AcceptDocumentsResponse, AdminDocumentResponse, AuthResponse,
    CreateSpecialtyRequest, DocumentListQuery, DocumentResponse, HomeResponse,
    OnboardingResponse, RedirectResponse, SessionStatusResponse, SignInRequest, SignUpRequest,
    SlotRequest, SlotResponse, SpecialtyResponse,
};

/// Shared state for accounts handlers
#[derive(Clone)]
pub struct AccountsAppState<R, F>
where
    R: AccountsRepository,
    F: DocumentStore + Clone + Send + Sync + 'static,
{
    pub repo: Arc<R>,
    pub files: Arc<F>,
    pub config: Arc<AccountsConfig>,
}

// ============================================================================
// Sign Up
// ============================================================================

/// POST /api/accounts/signup
pub async fn sign_up<R, F>(
    State(state): State<AccountsAppState<R, F>>,
    headers: HeaderMap,
    ClientContext(fingerprint): ClientContext,
    Json(req): Json<SignUpRequest>,
) -> AccountsResult<impl IntoResponse>
where
    R: AccountsRepository,
    F: DocumentStore + Clone + Send + Sync + 'static,
{
    let use_case = SignUpUseCase::new(state.repo.clone(), state.config.clone());

    let input = SignUpInput {
        user_name: req.user_name,
        email: req.email,
        password: req.password,
        password_confirmation: req.password_confirmation,
        role: req.role,
        phone: req.phone,
        license_number: req.license_number,
        specialty_ids: req.specialty_ids,
    };

    let current_session = current_session_id(&state.config, &headers);
    let output = use_case
        .execute(input, fingerprint, current_session)
        .await?;

    let cookie = state
        .config
        .session_cookie()
        .build_set_cookie(&output.session_token);

    Ok((
        StatusCode::CREATED,
        [(header::SET_COOKIE, cookie)],
        Json(AuthResponse {
            public_id: output.public_id,
            role: output.role,
            redirect: output.redirect,
        }),
    ))
}

// ============================================================================
// Sign In
// ============================================================================

/// POST /api/accounts/login
pub async fn sign_in<R, F>(
    State(state): State<AccountsAppState<R, F>>,
    headers: HeaderMap,
    ClientContext(fingerprint): ClientContext,
    Json(req): Json<SignInRequest>,
) -> AccountsResult<impl IntoResponse>
where
    R: AccountsRepository,
    F: DocumentStore + Clone + Send + Sync + 'static,
{
    let use_case = SignInUseCase::new(state.repo.clone(), state.config.clone());

    let input = SignInInput {
        user_name: req.user_name,
        password: req.password,
        next: req.next,
    };

    let current_session = current_session_id(&state.config, &headers);
    let output = use_case
        .execute(input, fingerprint, current_session)
        .await?;

    let cookie = state
        .config
        .session_cookie()
        .build_set_cookie(&output.session_token);

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(AuthResponse {
            public_id: output.public_id,
            role: output.role,
            redirect: output.redirect,
        }),
    ))
}

// ============================================================================
// Sign Out
// ============================================================================

/// POST /api/accounts/logout
pub async fn sign_out<R, F>(
    State(state): State<AccountsAppState<R, F>>,
    headers: HeaderMap,
    MaybeClientContext(fingerprint): MaybeClientContext,
) -> impl IntoResponse
where
    R: AccountsRepository,
    F: DocumentStore + Clone + Send + Sync + 'static,
{
    let token = platform::cookie::extract_cookie(&headers, &state.config.session_cookie_name);

    if let (Some(token), Some(fingerprint)) = (token, fingerprint) {
        let use_case = SignOutUseCase::new(state.repo.clone(), state.config.clone());
        // Sign-out always succeeds for the client
        if let Err(e) = use_case.execute(&token, &fingerprint.hash).await {
            tracing::debug!(error = %e, "Sign out without a usable session");
        }
    }

    (
        StatusCode::NO_CONTENT,
        [(
            header::SET_COOKIE,
            state.config.session_cookie().build_delete_cookie(),
        )],
    )
}

// ============================================================================
// Session Status / Root
// ============================================================================

/// GET /api/accounts/status
pub async fn session_status<R, F>(
    State(state): State<AccountsAppState<R, F>>,
    headers: HeaderMap,
    MaybeClientContext(fingerprint): MaybeClientContext,
) -> Json<SessionStatusResponse>
where
    R: AccountsRepository,
    F: DocumentStore + Clone + Send + Sync + 'static,
{
    let token = platform::cookie::extract_cookie(&headers, &state.config.session_cookie_name);

    let session_info = match (token, fingerprint) {
        (Some(token), Some(fingerprint)) => {
            let use_case = CheckSessionUseCase::new(state.repo.clone(), state.config.clone());
            use_case.execute(&token, &fingerprint.hash).await.ok()
        }
        _ => None,
    };

    match session_info {
        Some(info) => Json(SessionStatusResponse {
            authenticated: true,
            public_id: Some(info.public_id),
            role: Some(info.user_role),
            expires_at_ms: Some(info.expires_at_ms),
        }),
        None => Json(SessionStatusResponse::anonymous()),
    }
}

/// GET /api/accounts/root
///
/// Entry point deciding between home and login; an idle session is
/// invalidated on the way.
pub async fn root<R, F>(
    State(state): State<AccountsAppState<R, F>>,
    headers: HeaderMap,
    MaybeClientContext(fingerprint): MaybeClientContext,
) -> AccountsResult<impl IntoResponse>
where
    R: AccountsRepository,
    F: DocumentStore + Clone + Send + Sync + 'static,
{
    let token = platform::cookie::extract_cookie(&headers, &state.config.session_cookie_name);

    let session = match (&token, fingerprint) {
        (Some(token), Some(fingerprint)) => {
            let use_case = CheckSessionUseCase::new(state.repo.clone(), state.config.clone());
            use_case.get_session(token, &fingerprint.hash).await.ok()
        }
        _ => None,
    };

    let use_case = IdleTimeoutUseCase::new(state.repo.clone(), state.config.idle.clone());
    let target = use_case.resolve_root(session, Utc::now()).await?;

    let body = Json(RedirectResponse::to(target.as_str()));
    if target == RootTarget::Login && token.is_some() {
        let cookie = state.config.session_cookie().build_delete_cookie();
        return Ok(([(header::SET_COOKIE, cookie)], body).into_response());
    }

    Ok(body.into_response())
}

// ============================================================================
// Home / Catalog
// ============================================================================

/// GET /api/home
pub async fn home<R, F>(
    State(state): State<AccountsAppState<R, F>>,
    Extension(session): Extension<AuthSession>,
) -> AccountsResult<Json<HomeResponse>>
where
    R: AccountsRepository,
    F: DocumentStore + Clone + Send + Sync + 'static,
{
    let use_case = CatalogUseCase::new(state.repo.clone());
    let summary = use_case.home(&session.user_id).await?;

    Ok(Json(summary.into()))
}

/// GET /api/specialties
pub async fn list_specialties<R, F>(
    State(state): State<AccountsAppState<R, F>>,
) -> AccountsResult<Json<Vec<SpecialtyResponse>>>
where
    R: AccountsRepository,
    F: DocumentStore + Clone + Send + Sync + 'static,
{
    let use_case = CatalogUseCase::new(state.repo.clone());
    let specialties = use_case.specialties().await?;

    Ok(Json(specialties.into_iter().map(Into::into).collect()))
}

// ============================================================================
// Psychologist Onboarding
// ============================================================================

/// GET /api/psych/onboarding
pub async fn onboarding<R, F>(
    State(state): State<AccountsAppState<R, F>>,
    Extension(session): Extension<AuthSession>,
) -> AccountsResult<Json<OnboardingResponse>>
where
    R: AccountsRepository,
    F: DocumentStore + Clone + Send + Sync + 'static,
{
    let use_case = OnboardingUseCase::new(state.repo.clone(), state.files.clone());

    let response = match use_case.view(&session.user_id).await? {
        OnboardingView::RedirectHome => OnboardingResponse::Redirect(RedirectResponse::to("home")),
        OnboardingView::Pending { profile, documents } => OnboardingResponse::Pending {
            profile: profile.into(),
            documents: documents.into_iter().map(Into::into).collect(),
        },
    };

    Ok(Json(response))
}

/// POST /api/psych/onboarding/documents (multipart: `docType`, `file`)
pub async fn upload_document<R, F>(
    State(state): State<AccountsAppState<R, F>>,
    Extension(session): Extension<AuthSession>,
    mut multipart: Multipart,
) -> AccountsResult<(StatusCode, Json<DocumentResponse>)>
where
    R: AccountsRepository,
    F: DocumentStore + Clone + Send + Sync + 'static,
{
    let max_bytes = state.config.max_upload_bytes;

    let mut doc_type: Option<String> = None;
    let mut file: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();

        match name.as_str() {
            "docType" => {
                doc_type = Some(field.text().await.map_err(multipart_error)?);
            }
            "file" => {
                let original_name = field
                    .file_name()
                    .map(ToString::to_string)
                    .unwrap_or_default();
                let bytes = field.bytes().await.map_err(multipart_error)?;

                if bytes.len() > max_bytes {
                    return Err(AccountsError::PayloadTooLarge(format!(
                        "File exceeds {max_bytes} bytes"
                    )));
                }
                file = Some((original_name, bytes.to_vec()));
            }
            _ => {}
        }
    }

    let doc_type: DocumentType = doc_type
        .ok_or_else(|| AccountsError::Validation("docType is required".to_string()))?
        .parse()?;
    let (original_name, bytes) =
        file.ok_or_else(|| AccountsError::Validation("file is required".to_string()))?;

    let use_case = OnboardingUseCase::new(state.repo.clone(), state.files.clone());
    let document = use_case
        .upload(
            &session.user_id,
            UploadDocumentInput {
                doc_type,
                original_name,
                bytes,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(document.into())))
}

fn multipart_error(err: MultipartError) -> AccountsError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AccountsError::PayloadTooLarge(err.body_text())
    } else {
        AccountsError::Validation(format!("Invalid multipart body: {}", err.body_text()))
    }
}

// ============================================================================
// Availability
// ============================================================================

/// GET /api/psych/availability
pub async fn list_slots<R, F>(
    State(state): State<AccountsAppState<R, F>>,
    Extension(session): Extension<AuthSession>,
) -> AccountsResult<Json<Vec<SlotResponse>>>
where
    R: AccountsRepository,
    F: DocumentStore + Clone + Send + Sync + 'static,
{
    let use_case = AvailabilityUseCase::new(state.repo.clone());
    let slots = use_case.list(&session.user_id).await?;

    Ok(Json(slots.into_iter().map(Into::into).collect()))
}

/// POST /api/psych/availability
pub async fn create_slot<R, F>(
    State(state): State<AccountsAppState<R, F>>,
    Extension(session): Extension<AuthSession>,
    Json(req): Json<SlotRequest>,
) -> AccountsResult<(StatusCode, Json<SlotResponse>)>
where
    R: AccountsRepository,
    F: DocumentStore + Clone + Send + Sync + 'static,
{
    let use_case = AvailabilityUseCase::new(state.repo.clone());
    let slot = use_case
        .add(
            &session.user_id,
            NewSlotInput {
                weekday: req.weekday,
                start_time: req.start_time,
                end_time: req.end_time,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(slot.into())))
}

/// DELETE /api/psych/availability/{id}
pub async fn delete_slot<R, F>(
    State(state): State<AccountsAppState<R, F>>,
    Extension(session): Extension<AuthSession>,
    Path(slot_id): Path<String>,
) -> AccountsResult<StatusCode>
where
    R: AccountsRepository,
    F: DocumentStore + Clone + Send + Sync + 'static,
{
    let slot_id = Uuid::parse_str(&slot_id)
        .map(SlotId::from_uuid)
        .map_err(|_| AccountsError::NotFound("Slot not found".to_string()))?;

    let use_case = AvailabilityUseCase::new(state.repo.clone());
    use_case.remove(&session.user_id, &slot_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Staff
// ============================================================================

/// GET /api/admin/documents?accepted=
pub async fn admin_list_documents<R, F>(
    State(state): State<AccountsAppState<R, F>>,
    Extension(session): Extension<AuthSession>,
    Query(query): Query<DocumentListQuery>,
) -> AccountsResult<Json<Vec<AdminDocumentResponse>>>
where
    R: AccountsRepository,
    F: DocumentStore + Clone + Send + Sync + 'static,
{
    let use_case = VerificationUseCase::new(state.repo.clone());
    use_case.require_staff(&session.user_id).await?;

    let documents = use_case.list_documents(query.accepted).await?;
    Ok(Json(documents.into_iter().map(Into::into).collect()))
}

/// POST /api/admin/documents/accept
pub async fn admin_accept_documents<R, F>(
    State(state): State<AccountsAppState<R, F>>,
    Extension(session): Extension<AuthSession>,
    Json(req): Json<AcceptDocumentsRequest>,
) -> AccountsResult<Json<AcceptDocumentsResponse>>
where
    R: AccountsRepository,
    F: DocumentStore + Clone + Send + Sync + 'static,
{
    let use_case = VerificationUseCase::new(state.repo.clone());
    use_case.require_staff(&session.user_id).await?;

    let output = use_case.accept_documents(&req.document_ids).await?;
    Ok(Json(AcceptDocumentsResponse {
        accepted: output.accepted,
        profiles_verified: output.profiles_verified,
    }))
}

/// POST /api/admin/specialties
pub async fn admin_create_specialty<R, F>(
    State(state): State<AccountsAppState<R, F>>,
    Extension(session): Extension<AuthSession>,
    Json(req): Json<CreateSpecialtyRequest>,
) -> AccountsResult<(StatusCode, Json<SpecialtyResponse>)>
where
    R: AccountsRepository,
    F: DocumentStore + Clone + Send + Sync + 'static,
{
    let use_case = VerificationUseCase::new(state.repo.clone());
    use_case.require_staff(&session.user_id).await?;

    let specialty = use_case.create_specialty(&req.name).await?;
    Ok((StatusCode::CREATED, Json(specialty.into())))
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Session id from the caller's cookie, if it carries a well-signed one
fn current_session_id(config: &AccountsConfig, headers: &HeaderMap) -> Option<Uuid> {
    platform::cookie::extract_cookie(headers, &config.session_cookie_name)
        .and_then(|token| session_token::parse(config, &token).ok())
}

// ============================================================================
// Extractors
// ============================================================================

/// Fingerprint of the calling client; rejects requests without a User-Agent
pub struct ClientContext(pub ClientFingerprint);

impl<S> FromRequestParts<S> for ClientContext
where
    S: Send + Sync,
{
    type Rejection = AccountsError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let fingerprint = fingerprint_request(&parts.headers, &parts.extensions)?;
        Ok(Self(fingerprint))
    }
}

/// Like [`ClientContext`] but never rejects
pub struct MaybeClientContext(pub Option<ClientFingerprint>);

impl<S> FromRequestParts<S> for MaybeClientContext
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(
            fingerprint_request(&parts.headers, &parts.extensions).ok(),
        ))
    }
}
