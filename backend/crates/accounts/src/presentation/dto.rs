//! API DTOs (Data Transfer Objects)

use serde::{Deserialize, Serialize};

use crate::application::catalog::HomeSummary;
use crate::domain::entity::{
    availability_slot::AvailabilitySlot,
    document::{Document, DocumentWithOwner},
    profile::Profile,
    specialty::Specialty,
};
use crate::domain::value_object::user_role::UserRole;

// ============================================================================
// Sign Up / Sign In
// ============================================================================

/// Sign up request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUpRequest {
    pub user_name: String,
    pub email: Option<String>,
    pub password: String,
    pub password_confirmation: String,
    #[serde(default)]
    pub role: UserRole,
    pub phone: Option<String>,
    pub license_number: Option<String>,
    #[serde(default)]
    pub specialty_ids: Vec<String>,
}

/// Sign in request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInRequest {
    pub user_name: String,
    pub password: String,
    pub next: Option<String>,
}

/// Answer to a successful sign-up or sign-in
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub public_id: String,
    pub role: String,
    pub redirect: String,
}

// ============================================================================
// Session Status / Root
// ============================================================================

/// Session status response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatusResponse {
    pub authenticated: bool,
    pub public_id: Option<String>,
    pub role: Option<String>,
    pub expires_at_ms: Option<i64>,
}

impl SessionStatusResponse {
    pub fn anonymous() -> Self {
        Self {
            authenticated: false,
            public_id: None,
            role: None,
            expires_at_ms: None,
        }
    }
}

/// Where the front-end should navigate
#[derive(Debug, Clone, Serialize)]
pub struct RedirectResponse {
    pub redirect: String,
}

impl RedirectResponse {
    pub fn to(target: &str) -> Self {
        Self {
            redirect: target.to_string(),
        }
    }
}

// ============================================================================
// Home / Catalog
// ============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeResponse {
    pub public_id: String,
    pub user_name: String,
    pub role: String,
    pub is_verified: bool,
    pub is_staff: bool,
    /// Unix milliseconds
    pub last_login_at: Option<i64>,
}

impl From<HomeSummary> for HomeResponse {
    fn from(summary: HomeSummary) -> Self {
        Self {
            public_id: summary.public_id,
            user_name: summary.user_name,
            role: summary.role.code().to_string(),
            is_verified: summary.is_verified,
            is_staff: summary.is_staff,
            last_login_at: summary.last_login_at.map(|at| at.timestamp_millis()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SpecialtyResponse {
    pub id: String,
    pub name: String,
}

impl From<Specialty> for SpecialtyResponse {
    fn from(specialty: Specialty) -> Self {
        Self {
            id: specialty.specialty_id.to_string(),
            name: specialty.name,
        }
    }
}

/// Create specialty request (staff)
#[derive(Debug, Clone, Deserialize)]
pub struct CreateSpecialtyRequest {
    pub name: String,
}

// ============================================================================
// Onboarding / Documents
// ============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub role: String,
    pub phone: Option<String>,
    pub license_number: Option<String>,
    pub specialty_ids: Vec<String>,
    pub is_verified: bool,
}

impl From<Profile> for ProfileResponse {
    fn from(profile: Profile) -> Self {
        Self {
            role: profile.role.code().to_string(),
            phone: profile.phone,
            license_number: profile.license_number,
            specialty_ids: profile
                .specialty_ids
                .iter()
                .map(ToString::to_string)
                .collect(),
            is_verified: profile.is_verified,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentResponse {
    pub id: String,
    pub doc_type: String,
    pub original_name: String,
    pub size_bytes: i64,
    pub accepted: bool,
    /// Unix milliseconds
    pub uploaded_at: i64,
}

impl From<Document> for DocumentResponse {
    fn from(document: Document) -> Self {
        Self {
            id: document.document_id.to_string(),
            doc_type: document.doc_type.to_string(),
            original_name: document.original_name,
            size_bytes: document.size_bytes,
            accepted: document.accepted,
            uploaded_at: document.uploaded_at.timestamp_millis(),
        }
    }
}

/// Onboarding page: either a redirect or the pending profile
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum OnboardingResponse {
    Redirect(RedirectResponse),
    Pending {
        profile: ProfileResponse,
        documents: Vec<DocumentResponse>,
    },
}

/// Staff view of a document with its owner
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminDocumentResponse {
    #[serde(flatten)]
    pub document: DocumentResponse,
    pub owner_public_id: String,
    pub owner_user_name: String,
    pub owner_verified: bool,
}

impl From<DocumentWithOwner> for AdminDocumentResponse {
    fn from(row: DocumentWithOwner) -> Self {
        Self {
            document: row.document.into(),
            owner_public_id: row.owner_public_id,
            owner_user_name: row.owner_user_name,
            owner_verified: row.owner_verified,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DocumentListQuery {
    pub accepted: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcceptDocumentsRequest {
    pub document_ids: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AcceptDocumentsResponse {
    pub accepted: u64,
    pub profiles_verified: u64,
}

// ============================================================================
// Availability
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotRequest {
    /// 0 = Monday .. 6 = Sunday
    pub weekday: i16,
    pub start_time: String,
    pub end_time: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotResponse {
    pub id: String,
    pub weekday: i16,
    pub start_time: String,
    pub end_time: String,
}

impl From<AvailabilitySlot> for SlotResponse {
    fn from(slot: AvailabilitySlot) -> Self {
        Self {
            id: slot.slot_id.to_string(),
            weekday: slot.weekday_index(),
            start_time: slot.start_time.format("%H:%M").to_string(),
            end_time: slot.end_time.format("%H:%M").to_string(),
        }
    }
}
