//! Repository Traits
//!
//! Interfaces for data persistence. Implementations are in the infra layer
//! (PostgreSQL) and in the in-memory store used by tests.
//!
//! Method names are unique across traits so a single type can implement
//! all of them without call-site disambiguation.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::entity::{
    active_session::ActiveSession,
    auth_session::AuthSession,
    availability_slot::AvailabilitySlot,
    credentials::{Credentials, LockoutPolicy},
    document::{Document, DocumentWithOwner},
    profile::Profile,
    specialty::Specialty,
    user::User,
};
use crate::domain::value_object::{
    email::Email,
    ids::{DocumentId, SlotId, SpecialtyId, UserId},
    user_name::UserName,
};
use crate::error::AccountsResult;

/// Everything written at sign-up, persisted atomically
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub user: User,
    pub credentials: Credentials,
    pub profile: Profile,
}

/// User repository trait
#[trait_variant::make(UserRepository: Send)]
pub trait LocalUserRepository {
    /// Insert user, credentials, profile and specialty links in one transaction
    ///
    /// A user name or email that is already stored fails with
    /// `UserNameTaken` / `EmailTaken`, even when the earlier existence
    /// checks passed.
    async fn create_account(&self, account: &NewAccount) -> AccountsResult<()>;

    async fn find_user_by_id(&self, user_id: &UserId) -> AccountsResult<Option<User>>;

    /// Lookup on the canonical user name
    async fn find_user_by_user_name(&self, canonical: &str) -> AccountsResult<Option<User>>;

    async fn user_name_exists(&self, user_name: &UserName) -> AccountsResult<bool>;

    async fn email_exists(&self, email: &Email) -> AccountsResult<bool>;

    async fn record_login(&self, user_id: &UserId, at: DateTime<Utc>) -> AccountsResult<()>;
}

/// Credentials repository trait
#[trait_variant::make(CredentialsRepository: Send)]
pub trait LocalCredentialsRepository {
    async fn find_credentials(&self, user_id: &UserId) -> AccountsResult<Option<Credentials>>;

    /// Count one wrong password as a single atomic step
    ///
    /// 失敗回数の加算とロックアウト判定を一度に行う。
    /// Increments the failure counter and starts a lockout once it reaches
    /// `policy.max_failures`. A lockout that already lapsed restarts the
    /// count at one. Concurrent calls must each be counted.
    ///
    /// ## Returns
    /// The credentials as stored after this failure.
    async fn record_failed_login(
        &self,
        user_id: &UserId,
        policy: &LockoutPolicy,
        now: DateTime<Utc>,
    ) -> AccountsResult<Credentials>;

    /// Clear failure tracking after a successful login
    async fn clear_failed_logins(&self, user_id: &UserId, now: DateTime<Utc>)
    -> AccountsResult<()>;
}

/// Auth session repository trait
#[trait_variant::make(SessionRepository: Send)]
pub trait LocalSessionRepository {
    async fn create_session(&self, session: &AuthSession) -> AccountsResult<()>;

    /// Find an unexpired session and verify its fingerprint
    async fn find_session(
        &self,
        session_id: Uuid,
        fingerprint_hash: &[u8],
    ) -> AccountsResult<Option<AuthSession>>;

    /// Whether an unexpired session with this id is stored
    async fn session_exists(&self, session_id: Uuid) -> AccountsResult<bool>;

    async fn touch_session(&self, session_id: Uuid, at: DateTime<Utc>) -> AccountsResult<()>;

    async fn delete_session(&self, session_id: Uuid) -> AccountsResult<()>;

    /// Remove sessions past their absolute expiry
    async fn delete_expired_sessions(&self) -> AccountsResult<u64>;
}

/// Active session (one per user) repository trait
#[trait_variant::make(ActiveSessionRepository: Send)]
pub trait LocalActiveSessionRepository {
    async fn find_active_session(&self, user_id: &UserId)
    -> AccountsResult<Option<ActiveSession>>;

    /// Record `active` as the user's one live session, unless another
    /// live session holds the slot
    ///
    /// The slot may be taken over when it is empty, when it holds
    /// `replacing` (the caller's own previous session), or when the
    /// session it points at is gone or expired. Returns `false` when the
    /// slot stays with someone else. Check and write are one atomic step.
    async fn claim_active_session(
        &self,
        active: &ActiveSession,
        replacing: Option<Uuid>,
    ) -> AccountsResult<bool>;

    async fn delete_active_session(&self, user_id: &UserId) -> AccountsResult<()>;

    /// Remove records whose session no longer exists
    async fn delete_stale_active_sessions(&self) -> AccountsResult<u64>;
}

/// Profile repository trait
#[trait_variant::make(ProfileRepository: Send)]
pub trait LocalProfileRepository {
    async fn find_profile(&self, user_id: &UserId) -> AccountsResult<Option<Profile>>;
}

/// Specialty catalog repository trait
#[trait_variant::make(SpecialtyRepository: Send)]
pub trait LocalSpecialtyRepository {
    /// All specialties ordered by name
    async fn list_specialties(&self) -> AccountsResult<Vec<Specialty>>;

    async fn specialty_name_exists(&self, name: &str) -> AccountsResult<bool>;

    /// Fails with `SpecialtyTaken` when the name exists (case-insensitive)
    async fn create_specialty(&self, specialty: &Specialty) -> AccountsResult<()>;

    /// How many of the given ids exist
    async fn count_specialties(&self, ids: &[SpecialtyId]) -> AccountsResult<usize>;
}

/// Verification document repository trait
#[trait_variant::make(DocumentRepository: Send)]
pub trait LocalDocumentRepository {
    async fn create_document(&self, document: &Document) -> AccountsResult<()>;

    /// Documents of one user, newest first
    async fn list_user_documents(&self, user_id: &UserId) -> AccountsResult<Vec<Document>>;

    /// Documents with owners for staff review, newest first
    async fn list_documents(&self, accepted: Option<bool>)
    -> AccountsResult<Vec<DocumentWithOwner>>;

    /// Mark documents accepted and their owners' profiles verified
    /// (one transaction). Returns `(documents accepted, profiles verified)`.
    async fn accept_documents(&self, ids: &[DocumentId]) -> AccountsResult<(u64, u64)>;
}

/// Availability slot repository trait
#[trait_variant::make(AvailabilityRepository: Send)]
pub trait LocalAvailabilityRepository {
    /// Slots of one psychologist ordered by weekday, then start time
    async fn list_slots(&self, user_id: &UserId) -> AccountsResult<Vec<AvailabilitySlot>>;

    async fn create_slot(&self, slot: &AvailabilitySlot) -> AccountsResult<()>;

    /// Delete a slot owned by `user_id`; false when nothing matched
    async fn delete_slot(&self, user_id: &UserId, slot_id: &SlotId) -> AccountsResult<bool>;
}

/// Every repository the accounts use cases need, implemented by one store
pub trait AccountsRepository:
    UserRepository
    + CredentialsRepository
    + SessionRepository
    + ActiveSessionRepository
    + ProfileRepository
    + SpecialtyRepository
    + DocumentRepository
    + AvailabilityRepository
    + Clone
    + Send
    + Sync
    + 'static
{
}

impl<T> AccountsRepository for T where
    T: UserRepository
        + CredentialsRepository
        + SessionRepository
        + ActiveSessionRepository
        + ProfileRepository
        + SpecialtyRepository
        + DocumentRepository
        + AvailabilityRepository
        + Clone
        + Send
        + Sync
        + 'static
{
}

/// Upload written to document storage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    /// Path relative to the storage root, `/`-separated
    pub relative_path: String,
    pub size_bytes: i64,
}

/// Binary storage for uploaded documents
#[trait_variant::make(DocumentStore: Send)]
pub trait LocalDocumentStore {
    async fn save_document(&self, original_name: &str, bytes: &[u8]) -> AccountsResult<StoredFile>;

    async fn remove_document(&self, relative_path: &str) -> AccountsResult<()>;
}
