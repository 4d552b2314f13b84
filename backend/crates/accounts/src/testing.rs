//! In-memory repository and document store for tests

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use platform::client::ClientFingerprint;

use crate::application::config::AccountsConfig;
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
use crate::domain::repository::{
    ActiveSessionRepository, AvailabilityRepository, CredentialsRepository, DocumentRepository,
    DocumentStore, NewAccount, ProfileRepository, SessionRepository, SpecialtyRepository,
    StoredFile, UserRepository,
};
use crate::domain::value_object::{
    email::Email,
    ids::{DocumentId, SlotId, SpecialtyId, UserId},
    user_name::UserName,
};
use crate::error::{AccountsError, AccountsResult};

pub const TEST_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) Firefox/128.0";
pub const TEST_PASSWORD: &str = "Consulta#2024";

pub fn test_config() -> AccountsConfig {
    AccountsConfig::development()
}

pub fn fingerprint(user_agent: &str) -> ClientFingerprint {
    ClientFingerprint::new(
        platform::crypto::sha256(user_agent.as_bytes()),
        None,
        Some(user_agent.to_string()),
    )
}

#[derive(Default)]
struct State {
    users: HashMap<UserId, User>,
    credentials: HashMap<UserId, Credentials>,
    profiles: HashMap<UserId, Profile>,
    sessions: HashMap<Uuid, AuthSession>,
    active: HashMap<UserId, ActiveSession>,
    specialties: Vec<Specialty>,
    documents: Vec<Document>,
    slots: Vec<AvailabilitySlot>,
    fail_document_inserts: bool,
    fail_session_lookups: bool,
    slow_reads: bool,
}

impl State {
    fn session_live(&self, session_id: Uuid, now_ms: i64) -> bool {
        self.sessions
            .get(&session_id)
            .is_some_and(|s| s.expires_at_ms > now_ms)
    }

    /// Same comparison as the `LOWER(name)` unique index
    fn has_specialty(&self, name: &str) -> bool {
        let name = name.to_lowercase();
        self.specialties.iter().any(|s| s.name.to_lowercase() == name)
    }
}

#[derive(Clone, Default)]
pub struct MemoryRepository {
    state: Arc<Mutex<State>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    pub fn add_specialty(&self, name: &str) -> Specialty {
        let specialty = Specialty::new(name.to_string());
        self.lock().specialties.push(specialty.clone());
        specialty
    }

    pub fn make_staff(&self, user_id: &UserId) {
        if let Some(user) = self.lock().users.get_mut(user_id) {
            user.is_staff = true;
        }
    }

    pub fn user_id_by_name(&self, user_name: &str) -> UserId {
        let canonical = UserName::canonicalize(user_name);
        self.lock()
            .users
            .values()
            .find(|u| u.user_name.canonical() == canonical)
            .map(|u| u.user_id)
            .unwrap()
    }

    pub fn credentials(&self, user_id: &UserId) -> Credentials {
        self.lock().credentials.get(user_id).cloned().unwrap()
    }

    pub fn profile(&self, user_id: &UserId) -> Profile {
        self.lock().profiles.get(user_id).cloned().unwrap()
    }

    pub fn active_session(&self, user_id: &UserId) -> Option<ActiveSession> {
        self.lock().active.get(user_id).cloned()
    }

    pub fn session(&self, session_id: Uuid) -> Option<AuthSession> {
        self.lock().sessions.get(&session_id).cloned()
    }

    pub fn session_count(&self) -> usize {
        self.lock().sessions.len()
    }

    pub fn user_count(&self) -> usize {
        self.lock().users.len()
    }

    /// Pretend the last protected request happened `ago` before now
    pub fn backdate_activity(&self, session_id: Uuid, ago: Duration) {
        if let Some(session) = self.lock().sessions.get_mut(&session_id) {
            session.last_activity_at = Some(Utc::now() - ago);
        }
    }

    pub fn expire_session(&self, session_id: Uuid) {
        if let Some(session) = self.lock().sessions.get_mut(&session_id) {
            session.expires_at_ms = Utc::now().timestamp_millis() - 1;
        }
    }

    pub fn drop_session_row(&self, session_id: Uuid) {
        self.lock().sessions.remove(&session_id);
    }

    /// Shift a lockout into the past
    pub fn lapse_lockout(&self, user_id: &UserId) {
        if let Some(credentials) = self.lock().credentials.get_mut(user_id) {
            credentials.lockout_until = credentials.lockout_until.map(|_| Utc::now() - Duration::seconds(1));
        }
    }

    pub fn fail_document_inserts(&self) {
        self.lock().fail_document_inserts = true;
    }

    /// Make `session_exists` fail as if the store were unreachable
    pub fn fail_session_lookups(&self) {
        self.lock().fail_session_lookups = true;
    }

    /// Yield to the runtime after existence checks and snapshot reads, so
    /// requests joined on one task interleave between read and write
    pub fn slow_reads(&self) {
        self.lock().slow_reads = true;
    }

    async fn after_read(&self) {
        let slow = self.lock().slow_reads;
        if slow {
            tokio::task::yield_now().await;
        }
    }

    pub fn backdate_document(&self, document_id: &DocumentId, at: DateTime<Utc>) {
        if let Some(doc) = self
            .lock()
            .documents
            .iter_mut()
            .find(|d| d.document_id == *document_id)
        {
            doc.uploaded_at = at;
        }
    }
}

fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

impl UserRepository for MemoryRepository {
    async fn create_account(&self, account: &NewAccount) -> AccountsResult<()> {
        let mut state = self.lock();
        let canonical = account.user.user_name.canonical();
        if state.users.values().any(|u| u.user_name.canonical() == canonical) {
            return Err(AccountsError::UserNameTaken);
        }
        if account.user.email.is_some()
            && state.users.values().any(|u| u.email == account.user.email)
        {
            return Err(AccountsError::EmailTaken);
        }

        let user_id = account.user.user_id;
        state.users.insert(user_id, account.user.clone());
        state.credentials.insert(user_id, account.credentials.clone());
        state.profiles.insert(user_id, account.profile.clone());
        Ok(())
    }

    async fn find_user_by_id(&self, user_id: &UserId) -> AccountsResult<Option<User>> {
        Ok(self.lock().users.get(user_id).cloned())
    }

    async fn find_user_by_user_name(&self, canonical: &str) -> AccountsResult<Option<User>> {
        Ok(self
            .lock()
            .users
            .values()
            .find(|u| u.user_name.canonical() == canonical)
            .cloned())
    }

    async fn user_name_exists(&self, user_name: &UserName) -> AccountsResult<bool> {
        let exists = self
            .lock()
            .users
            .values()
            .any(|u| u.user_name.canonical() == user_name.canonical());
        self.after_read().await;
        Ok(exists)
    }

    async fn email_exists(&self, email: &Email) -> AccountsResult<bool> {
        let exists = self
            .lock()
            .users
            .values()
            .any(|u| u.email.as_ref() == Some(email));
        self.after_read().await;
        Ok(exists)
    }

    async fn record_login(&self, user_id: &UserId, at: DateTime<Utc>) -> AccountsResult<()> {
        if let Some(user) = self.lock().users.get_mut(user_id) {
            user.record_login(at);
        }
        Ok(())
    }
}

impl CredentialsRepository for MemoryRepository {
    async fn find_credentials(&self, user_id: &UserId) -> AccountsResult<Option<Credentials>> {
        let found = self.lock().credentials.get(user_id).cloned();
        self.after_read().await;
        Ok(found)
    }

    async fn record_failed_login(
        &self,
        user_id: &UserId,
        policy: &LockoutPolicy,
        now: DateTime<Utc>,
    ) -> AccountsResult<Credentials> {
        let mut state = self.lock();
        let credentials = state
            .credentials
            .get_mut(user_id)
            .ok_or_else(|| AccountsError::Internal("Credentials not found".to_string()))?;
        credentials.register_failure(policy, now);
        Ok(credentials.clone())
    }

    async fn clear_failed_logins(
        &self,
        user_id: &UserId,
        now: DateTime<Utc>,
    ) -> AccountsResult<()> {
        if let Some(credentials) = self.lock().credentials.get_mut(user_id) {
            credentials.reset_failures(now);
        }
        Ok(())
    }
}

impl SessionRepository for MemoryRepository {
    async fn create_session(&self, session: &AuthSession) -> AccountsResult<()> {
        self.lock()
            .sessions
            .insert(session.session_id, session.clone());
        Ok(())
    }

    async fn find_session(
        &self,
        session_id: Uuid,
        fingerprint_hash: &[u8],
    ) -> AccountsResult<Option<AuthSession>> {
        let state = self.lock();
        match state.sessions.get(&session_id) {
            Some(session) if session.expires_at_ms > now_ms() => {
                if session.client_fingerprint_hash != fingerprint_hash {
                    return Err(AccountsError::SessionFingerprintMismatch);
                }
                Ok(Some(session.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn session_exists(&self, session_id: Uuid) -> AccountsResult<bool> {
        let state = self.lock();
        if state.fail_session_lookups {
            return Err(AccountsError::Internal("session store unreachable".to_string()));
        }
        Ok(state.session_live(session_id, now_ms()))
    }

    async fn touch_session(&self, session_id: Uuid, at: DateTime<Utc>) -> AccountsResult<()> {
        if let Some(session) = self.lock().sessions.get_mut(&session_id) {
            session.touch(at);
        }
        Ok(())
    }

    async fn delete_session(&self, session_id: Uuid) -> AccountsResult<()> {
        self.lock().sessions.remove(&session_id);
        Ok(())
    }

    async fn delete_expired_sessions(&self) -> AccountsResult<u64> {
        let mut state = self.lock();
        let before = state.sessions.len();
        let now = now_ms();
        state.sessions.retain(|_, s| s.expires_at_ms > now);
        Ok((before - state.sessions.len()) as u64)
    }
}

impl ActiveSessionRepository for MemoryRepository {
    async fn find_active_session(
        &self,
        user_id: &UserId,
    ) -> AccountsResult<Option<ActiveSession>> {
        let found = self.lock().active.get(user_id).cloned();
        self.after_read().await;
        Ok(found)
    }

    async fn claim_active_session(
        &self,
        active: &ActiveSession,
        replacing: Option<Uuid>,
    ) -> AccountsResult<bool> {
        let mut state = self.lock();
        let claimable = match state.active.get(&active.user_id) {
            None => true,
            Some(held) => {
                held.session_id == active.session_id
                    || Some(held.session_id) == replacing
                    || !state.session_live(held.session_id, now_ms())
            }
        };
        if claimable {
            state.active.insert(active.user_id, active.clone());
        }
        Ok(claimable)
    }

    async fn delete_active_session(&self, user_id: &UserId) -> AccountsResult<()> {
        self.lock().active.remove(user_id);
        Ok(())
    }

    async fn delete_stale_active_sessions(&self) -> AccountsResult<u64> {
        let mut state = self.lock();
        let before = state.active.len();
        let now = now_ms();
        let live: Vec<Uuid> = state
            .active
            .values()
            .map(|a| a.session_id)
            .filter(|id| state.session_live(*id, now))
            .collect();
        state.active.retain(|_, a| live.contains(&a.session_id));
        Ok((before - state.active.len()) as u64)
    }
}

impl ProfileRepository for MemoryRepository {
    async fn find_profile(&self, user_id: &UserId) -> AccountsResult<Option<Profile>> {
        Ok(self.lock().profiles.get(user_id).cloned())
    }
}

impl SpecialtyRepository for MemoryRepository {
    async fn list_specialties(&self) -> AccountsResult<Vec<Specialty>> {
        let mut specialties = self.lock().specialties.clone();
        specialties.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(specialties)
    }

    async fn specialty_name_exists(&self, name: &str) -> AccountsResult<bool> {
        let exists = self.lock().has_specialty(name);
        self.after_read().await;
        Ok(exists)
    }

    async fn create_specialty(&self, specialty: &Specialty) -> AccountsResult<()> {
        let mut state = self.lock();
        if state.has_specialty(&specialty.name) {
            return Err(AccountsError::SpecialtyTaken);
        }
        state.specialties.push(specialty.clone());
        Ok(())
    }

    async fn count_specialties(&self, ids: &[SpecialtyId]) -> AccountsResult<usize> {
        let state = self.lock();
        Ok(ids
            .iter()
            .filter(|id| state.specialties.iter().any(|s| s.specialty_id == **id))
            .count())
    }
}

impl DocumentRepository for MemoryRepository {
    async fn create_document(&self, document: &Document) -> AccountsResult<()> {
        let mut state = self.lock();
        if state.fail_document_inserts {
            return Err(AccountsError::Internal("insert failed".to_string()));
        }
        state.documents.push(document.clone());
        Ok(())
    }

    async fn list_user_documents(&self, user_id: &UserId) -> AccountsResult<Vec<Document>> {
        let mut documents: Vec<Document> = self
            .lock()
            .documents
            .iter()
            .filter(|d| d.user_id == *user_id)
            .cloned()
            .collect();
        documents.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at));
        Ok(documents)
    }

    async fn list_documents(
        &self,
        accepted: Option<bool>,
    ) -> AccountsResult<Vec<DocumentWithOwner>> {
        let state = self.lock();
        let mut rows: Vec<DocumentWithOwner> = state
            .documents
            .iter()
            .filter(|d| accepted.is_none_or(|accepted| d.accepted == accepted))
            .filter_map(|d| {
                let owner = state.users.get(&d.user_id)?;
                let profile = state.profiles.get(&d.user_id)?;
                Some(DocumentWithOwner {
                    document: d.clone(),
                    owner_public_id: owner.public_id.to_string(),
                    owner_user_name: owner.user_name.original().to_string(),
                    owner_verified: profile.is_verified,
                })
            })
            .collect();
        rows.sort_by(|a, b| b.document.uploaded_at.cmp(&a.document.uploaded_at));
        Ok(rows)
    }

    async fn accept_documents(&self, ids: &[DocumentId]) -> AccountsResult<(u64, u64)> {
        let mut guard = self.lock();
        let state = &mut *guard;

        let mut accepted = 0;
        let mut owners = Vec::new();
        for doc in state
            .documents
            .iter_mut()
            .filter(|d| ids.contains(&d.document_id))
        {
            if !doc.accepted {
                doc.accepted = true;
                accepted += 1;
            }
            owners.push(doc.user_id);
        }

        let mut verified = 0;
        for owner in owners {
            if let Some(profile) = state.profiles.get_mut(&owner) {
                if !profile.is_verified {
                    profile.is_verified = true;
                    verified += 1;
                }
            }
        }

        Ok((accepted, verified))
    }
}

impl AvailabilityRepository for MemoryRepository {
    async fn list_slots(&self, user_id: &UserId) -> AccountsResult<Vec<AvailabilitySlot>> {
        let mut slots: Vec<AvailabilitySlot> = self
            .lock()
            .slots
            .iter()
            .filter(|s| s.user_id == *user_id)
            .cloned()
            .collect();
        slots.sort_by_key(AvailabilitySlot::sort_key);
        Ok(slots)
    }

    async fn create_slot(&self, slot: &AvailabilitySlot) -> AccountsResult<()> {
        self.lock().slots.push(slot.clone());
        Ok(())
    }

    async fn delete_slot(&self, user_id: &UserId, slot_id: &SlotId) -> AccountsResult<bool> {
        let mut state = self.lock();
        let before = state.slots.len();
        state
            .slots
            .retain(|s| !(s.slot_id == *slot_id && s.user_id == *user_id));
        Ok(state.slots.len() < before)
    }
}

/// Document store keeping files in memory
#[derive(Clone, Default)]
pub struct MemoryDocumentStore {
    files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn file_count(&self) -> usize {
        self.files.lock().unwrap().len()
    }

    pub fn contains(&self, relative_path: &str) -> bool {
        self.files.lock().unwrap().contains_key(relative_path)
    }
}

impl DocumentStore for MemoryDocumentStore {
    async fn save_document(&self, original_name: &str, bytes: &[u8]) -> AccountsResult<StoredFile> {
        let relative_path = format!("documents/test/{}-{}", Uuid::new_v4(), original_name);
        self.files
            .lock()
            .unwrap()
            .insert(relative_path.clone(), bytes.to_vec());
        Ok(StoredFile {
            relative_path,
            size_bytes: bytes.len() as i64,
        })
    }

    async fn remove_document(&self, relative_path: &str) -> AccountsResult<()> {
        self.files.lock().unwrap().remove(relative_path);
        Ok(())
    }
}
