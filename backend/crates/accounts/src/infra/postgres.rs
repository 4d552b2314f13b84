//! PostgreSQL Repository Implementations

use chrono::{DateTime, NaiveTime, Utc, Weekday};
use sqlx::PgPool;
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
use crate::domain::repository::{
    ActiveSessionRepository, AvailabilityRepository, CredentialsRepository, DocumentRepository,
    NewAccount, ProfileRepository, SessionRepository, SpecialtyRepository, UserRepository,
};
use crate::domain::value_object::{
    document_type::DocumentType,
    email::Email,
    ids::{DocumentId, SlotId, SpecialtyId, UserId},
    public_id::PublicId,
    user_name::UserName,
    user_password::UserPassword,
    user_role::UserRole,
};
use crate::error::{AccountsError, AccountsResult};

/// PostgreSQL-backed accounts repository
#[derive(Clone)]
pub struct PgAccountsRepository {
    pool: PgPool,
}

impl PgAccountsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// ============================================================================
// User Repository Implementation
// ============================================================================

impl UserRepository for PgAccountsRepository {
    async fn create_account(&self, account: &NewAccount) -> AccountsResult<()> {
        let NewAccount {
            user,
            credentials,
            profile,
        } = account;

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO users (
                user_id,
                public_id,
                user_name,
                user_name_canonical,
                email,
                is_staff,
                last_login_at,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(user.user_id.as_uuid())
        .bind(user.public_id.as_str())
        .bind(user.user_name.original())
        .bind(user.user_name.canonical())
        .bind(user.email.as_ref().map(|e| e.as_str()))
        .bind(user.is_staff)
        .bind(user.last_login_at)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(unique_conflict)?;

        sqlx::query(
            r#"
            INSERT INTO credentials (
                user_id,
                password_hash,
                failed_attempts,
                last_failed_at,
                lockout_until,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(credentials.user_id.as_uuid())
        .bind(credentials.password_hash.as_phc_string())
        .bind(credentials.failed_attempts as i16)
        .bind(credentials.last_failed_at)
        .bind(credentials.lockout_until)
        .bind(credentials.created_at)
        .bind(credentials.updated_at)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO profiles (
                user_id,
                role,
                phone,
                license_number,
                is_verified,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(profile.user_id.as_uuid())
        .bind(profile.role.id())
        .bind(&profile.phone)
        .bind(&profile.license_number)
        .bind(profile.is_verified)
        .bind(profile.created_at)
        .bind(profile.updated_at)
        .execute(&mut *tx)
        .await?;

        if !profile.specialty_ids.is_empty() {
            let specialty_ids: Vec<Uuid> =
                profile.specialty_ids.iter().map(|id| *id.as_uuid()).collect();

            sqlx::query(
                r#"
                INSERT INTO profile_specialties (user_id, specialty_id)
                SELECT $1, UNNEST($2::uuid[])
                "#,
            )
            .bind(profile.user_id.as_uuid())
            .bind(&specialty_ids)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(())
    }

    async fn find_user_by_id(&self, user_id: &UserId) -> AccountsResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT
                user_id,
                public_id,
                user_name,
                email,
                is_staff,
                last_login_at,
                created_at,
                updated_at
            FROM users
            WHERE user_id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_user()).transpose()
    }

    async fn find_user_by_user_name(&self, canonical: &str) -> AccountsResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT
                user_id,
                public_id,
                user_name,
                email,
                is_staff,
                last_login_at,
                created_at,
                updated_at
            FROM users
            WHERE user_name_canonical = $1
            "#,
        )
        .bind(canonical)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_user()).transpose()
    }

    async fn user_name_exists(&self, user_name: &UserName) -> AccountsResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM users WHERE user_name_canonical = $1)",
        )
        .bind(user_name.canonical())
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn email_exists(&self, email: &Email) -> AccountsResult<bool> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
                .bind(email.as_str())
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }

    async fn record_login(&self, user_id: &UserId, at: DateTime<Utc>) -> AccountsResult<()> {
        sqlx::query("UPDATE users SET last_login_at = $2, updated_at = $2 WHERE user_id = $1")
            .bind(user_id.as_uuid())
            .bind(at)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

// ============================================================================
// Credentials Repository Implementation
// ============================================================================

impl CredentialsRepository for PgAccountsRepository {
    async fn find_credentials(&self, user_id: &UserId) -> AccountsResult<Option<Credentials>> {
        let row = sqlx::query_as::<_, CredentialsRow>(
            r#"
            SELECT
                user_id,
                password_hash,
                failed_attempts,
                last_failed_at,
                lockout_until,
                created_at,
                updated_at
            FROM credentials
            WHERE user_id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_credentials()).transpose()
    }

    async fn record_failed_login(
        &self,
        user_id: &UserId,
        policy: &LockoutPolicy,
        now: DateTime<Utc>,
    ) -> AccountsResult<Credentials> {
        // SET expressions all read the pre-update row; the row lock
        // serializes concurrent failures.
        let row = sqlx::query_as::<_, CredentialsRow>(
            r#"
            UPDATE credentials SET
                failed_attempts = CASE
                    WHEN lockout_until <= $2 THEN 1
                    ELSE failed_attempts + 1
                END,
                lockout_until = CASE
                    WHEN lockout_until <= $2 THEN CASE WHEN 1 >= $3 THEN $4 END
                    WHEN failed_attempts + 1 >= $3 THEN $4
                    ELSE lockout_until
                END,
                last_failed_at = $2,
                updated_at = $2
            WHERE user_id = $1
            RETURNING
                user_id,
                password_hash,
                failed_attempts,
                last_failed_at,
                lockout_until,
                created_at,
                updated_at
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(now)
        .bind(i16::try_from(policy.max_failures).unwrap_or(i16::MAX))
        .bind(now + policy.lockout)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AccountsError::Internal("Credentials not found".to_string()))?;

        row.into_credentials()
    }

    async fn clear_failed_logins(
        &self,
        user_id: &UserId,
        now: DateTime<Utc>,
    ) -> AccountsResult<()> {
        sqlx::query(
            r#"
            UPDATE credentials SET
                failed_attempts = 0,
                last_failed_at = NULL,
                lockout_until = NULL,
                updated_at = $2
            WHERE user_id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

// ============================================================================
// Session Repository Implementation
// ============================================================================

impl SessionRepository for PgAccountsRepository {
    async fn create_session(&self, session: &AuthSession) -> AccountsResult<()> {
        sqlx::query(
            r#"
            INSERT INTO auth_sessions (
                session_id,
                user_id,
                public_id,
                user_role,
                expires_at_ms,
                client_fingerprint_hash,
                client_ip,
                user_agent,
                created_at,
                last_activity_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(session.session_id)
        .bind(session.user_id.as_uuid())
        .bind(session.public_id.as_str())
        .bind(session.user_role.id())
        .bind(session.expires_at_ms)
        .bind(&session.client_fingerprint_hash)
        .bind(&session.client_ip)
        .bind(&session.user_agent)
        .bind(session.created_at)
        .bind(session.last_activity_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_session(
        &self,
        session_id: Uuid,
        fingerprint_hash: &[u8],
    ) -> AccountsResult<Option<AuthSession>> {
        let now_ms = Utc::now().timestamp_millis();

        let row = sqlx::query_as::<_, AuthSessionRow>(
            r#"
            SELECT
                session_id,
                user_id,
                public_id,
                user_role,
                expires_at_ms,
                client_fingerprint_hash,
                client_ip,
                user_agent,
                created_at,
                last_activity_at
            FROM auth_sessions
            WHERE session_id = $1 AND expires_at_ms > $2
            "#,
        )
        .bind(session_id)
        .bind(now_ms)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(r) => {
                if r.client_fingerprint_hash != fingerprint_hash {
                    tracing::warn!(session_id = %session_id, "Auth session fingerprint mismatch");
                    return Err(AccountsError::SessionFingerprintMismatch);
                }
                Ok(Some(r.into_session()?))
            }
            None => Ok(None),
        }
    }

    async fn session_exists(&self, session_id: Uuid) -> AccountsResult<bool> {
        let now_ms = Utc::now().timestamp_millis();

        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM auth_sessions WHERE session_id = $1 AND expires_at_ms > $2)",
        )
        .bind(session_id)
        .bind(now_ms)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn touch_session(&self, session_id: Uuid, at: DateTime<Utc>) -> AccountsResult<()> {
        sqlx::query("UPDATE auth_sessions SET last_activity_at = $2 WHERE session_id = $1")
            .bind(session_id)
            .bind(at)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn delete_session(&self, session_id: Uuid) -> AccountsResult<()> {
        sqlx::query("DELETE FROM auth_sessions WHERE session_id = $1")
            .bind(session_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn delete_expired_sessions(&self) -> AccountsResult<u64> {
        let now_ms = Utc::now().timestamp_millis();

        let deleted = sqlx::query("DELETE FROM auth_sessions WHERE expires_at_ms <= $1")
            .bind(now_ms)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted)
    }
}

// ============================================================================
// Active Session Repository Implementation
// ============================================================================

impl ActiveSessionRepository for PgAccountsRepository {
    async fn find_active_session(
        &self,
        user_id: &UserId,
    ) -> AccountsResult<Option<ActiveSession>> {
        let row = sqlx::query_as::<_, ActiveSessionRow>(
            "SELECT user_id, session_id, created_at FROM active_sessions WHERE user_id = $1",
        )
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into_active_session()))
    }

    async fn claim_active_session(
        &self,
        active: &ActiveSession,
        replacing: Option<Uuid>,
    ) -> AccountsResult<bool> {
        // A concurrent insert for the same user waits on the primary key and
        // then sees the winner's row in the WHERE clause.
        let claimed = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO active_sessions (user_id, session_id, created_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id) DO UPDATE SET
                session_id = EXCLUDED.session_id,
                created_at = EXCLUDED.created_at
            WHERE active_sessions.session_id = EXCLUDED.session_id
               OR active_sessions.session_id = $4
               OR NOT EXISTS (
                   SELECT 1 FROM auth_sessions s
                   WHERE s.session_id = active_sessions.session_id
                     AND s.expires_at_ms > $5
               )
            RETURNING session_id
            "#,
        )
        .bind(active.user_id.as_uuid())
        .bind(active.session_id)
        .bind(active.created_at)
        .bind(replacing)
        .bind(Utc::now().timestamp_millis())
        .fetch_optional(&self.pool)
        .await?;

        Ok(claimed.is_some())
    }

    async fn delete_active_session(&self, user_id: &UserId) -> AccountsResult<()> {
        sqlx::query("DELETE FROM active_sessions WHERE user_id = $1")
            .bind(user_id.as_uuid())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn delete_stale_active_sessions(&self) -> AccountsResult<u64> {
        let now_ms = Utc::now().timestamp_millis();

        let deleted = sqlx::query(
            r#"
            DELETE FROM active_sessions a
            WHERE NOT EXISTS (
                SELECT 1 FROM auth_sessions s
                WHERE s.session_id = a.session_id AND s.expires_at_ms > $1
            )
            "#,
        )
        .bind(now_ms)
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(deleted)
    }
}

// ============================================================================
// Profile Repository Implementation
// ============================================================================

impl ProfileRepository for PgAccountsRepository {
    async fn find_profile(&self, user_id: &UserId) -> AccountsResult<Option<Profile>> {
        let row = sqlx::query_as::<_, ProfileRow>(
            r#"
            SELECT
                p.user_id,
                p.role,
                p.phone,
                p.license_number,
                p.is_verified,
                p.created_at,
                p.updated_at,
                COALESCE(
                    ARRAY(
                        SELECT ps.specialty_id FROM profile_specialties ps
                        WHERE ps.user_id = p.user_id
                    ),
                    '{}'
                ) AS specialty_ids
            FROM profiles p
            WHERE p.user_id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_profile()).transpose()
    }
}

// ============================================================================
// Specialty Repository Implementation
// ============================================================================

impl SpecialtyRepository for PgAccountsRepository {
    async fn list_specialties(&self) -> AccountsResult<Vec<Specialty>> {
        let rows = sqlx::query_as::<_, SpecialtyRow>(
            "SELECT specialty_id, name, created_at FROM specialties ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.into_specialty()).collect())
    }

    async fn specialty_name_exists(&self, name: &str) -> AccountsResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM specialties WHERE LOWER(name) = LOWER($1))",
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn create_specialty(&self, specialty: &Specialty) -> AccountsResult<()> {
        sqlx::query("INSERT INTO specialties (specialty_id, name, created_at) VALUES ($1, $2, $3)")
            .bind(specialty.specialty_id.as_uuid())
            .bind(&specialty.name)
            .bind(specialty.created_at)
            .execute(&self.pool)
            .await
            .map_err(unique_conflict)?;

        Ok(())
    }

    async fn count_specialties(&self, ids: &[SpecialtyId]) -> AccountsResult<usize> {
        let ids: Vec<Uuid> = ids.iter().map(|id| *id.as_uuid()).collect();

        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM specialties WHERE specialty_id = ANY($1)",
        )
        .bind(&ids)
        .fetch_one(&self.pool)
        .await?;

        Ok(count as usize)
    }
}

// ============================================================================
// Document Repository Implementation
// ============================================================================

impl DocumentRepository for PgAccountsRepository {
    async fn create_document(&self, document: &Document) -> AccountsResult<()> {
        sqlx::query(
            r#"
            INSERT INTO documents (
                document_id,
                user_id,
                doc_type,
                file_path,
                original_name,
                size_bytes,
                accepted,
                uploaded_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(document.document_id.as_uuid())
        .bind(document.user_id.as_uuid())
        .bind(document.doc_type.id())
        .bind(&document.file_path)
        .bind(&document.original_name)
        .bind(document.size_bytes)
        .bind(document.accepted)
        .bind(document.uploaded_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list_user_documents(&self, user_id: &UserId) -> AccountsResult<Vec<Document>> {
        let rows = sqlx::query_as::<_, DocumentRow>(
            r#"
            SELECT
                document_id,
                user_id,
                doc_type,
                file_path,
                original_name,
                size_bytes,
                accepted,
                uploaded_at
            FROM documents
            WHERE user_id = $1
            ORDER BY uploaded_at DESC
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(|r| r.into_document()).collect()
    }

    async fn list_documents(
        &self,
        accepted: Option<bool>,
    ) -> AccountsResult<Vec<DocumentWithOwner>> {
        let rows = sqlx::query_as::<_, DocumentWithOwnerRow>(
            r#"
            SELECT
                d.document_id,
                d.user_id,
                d.doc_type,
                d.file_path,
                d.original_name,
                d.size_bytes,
                d.accepted,
                d.uploaded_at,
                u.public_id AS owner_public_id,
                u.user_name AS owner_user_name,
                p.is_verified AS owner_verified
            FROM documents d
            JOIN users u ON u.user_id = d.user_id
            JOIN profiles p ON p.user_id = d.user_id
            WHERE $1::boolean IS NULL OR d.accepted = $1
            ORDER BY d.uploaded_at DESC
            "#,
        )
        .bind(accepted)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(|r| r.into_document_with_owner()).collect()
    }

    async fn accept_documents(&self, ids: &[DocumentId]) -> AccountsResult<(u64, u64)> {
        let ids: Vec<Uuid> = ids.iter().map(|id| *id.as_uuid()).collect();
        let now = Utc::now();

        let mut tx = self.pool.begin().await?;

        let accepted = sqlx::query(
            "UPDATE documents SET accepted = TRUE WHERE document_id = ANY($1) AND accepted = FALSE",
        )
        .bind(&ids)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        let verified = sqlx::query(
            r#"
            UPDATE profiles SET is_verified = TRUE, updated_at = $2
            WHERE is_verified = FALSE
              AND user_id IN (SELECT user_id FROM documents WHERE document_id = ANY($1))
            "#,
        )
        .bind(&ids)
        .bind(now)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        tx.commit().await?;

        Ok((accepted, verified))
    }
}

// ============================================================================
// Availability Repository Implementation
// ============================================================================

impl AvailabilityRepository for PgAccountsRepository {
    async fn list_slots(&self, user_id: &UserId) -> AccountsResult<Vec<AvailabilitySlot>> {
        let rows = sqlx::query_as::<_, SlotRow>(
            r#"
            SELECT slot_id, user_id, weekday, start_time, end_time, created_at
            FROM availability_slots
            WHERE user_id = $1
            ORDER BY weekday, start_time
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(|r| r.into_slot()).collect()
    }

    async fn create_slot(&self, slot: &AvailabilitySlot) -> AccountsResult<()> {
        sqlx::query(
            r#"
            INSERT INTO availability_slots (
                slot_id,
                user_id,
                weekday,
                start_time,
                end_time,
                created_at
            ) VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(slot.slot_id.as_uuid())
        .bind(slot.user_id.as_uuid())
        .bind(slot.weekday_index())
        .bind(slot.start_time)
        .bind(slot.end_time)
        .bind(slot.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete_slot(&self, user_id: &UserId, slot_id: &SlotId) -> AccountsResult<bool> {
        let deleted =
            sqlx::query("DELETE FROM availability_slots WHERE slot_id = $1 AND user_id = $2")
                .bind(slot_id.as_uuid())
                .bind(user_id.as_uuid())
                .execute(&self.pool)
                .await?
                .rows_affected();

        Ok(deleted > 0)
    }
}

// ============================================================================
// Row Types for sqlx mapping
// ============================================================================

// ============================================================================
// Unique constraint mapping
// ============================================================================

const USER_NAME_CONSTRAINT: &str = "users_user_name_canonical_key";
const EMAIL_CONSTRAINT: &str = "users_email_key";
const SPECIALTY_NAME_CONSTRAINT: &str = "specialties_name_lower_idx";

/// Domain error for a unique constraint that guards a user-visible name
fn conflict_for_constraint(constraint: &str) -> Option<AccountsError> {
    match constraint {
        USER_NAME_CONSTRAINT => Some(AccountsError::UserNameTaken),
        EMAIL_CONSTRAINT => Some(AccountsError::EmailTaken),
        SPECIALTY_NAME_CONSTRAINT => Some(AccountsError::SpecialtyTaken),
        _ => None,
    }
}

/// Turn a unique violation on a name constraint into its `*Taken` error
///
/// The existence checks run before the insert, so two concurrent requests
/// can both pass them; the constraint decides the loser here.
fn unique_conflict(err: sqlx::Error) -> AccountsError {
    let conflict = match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            db_err.constraint().and_then(conflict_for_constraint)
        }
        _ => None,
    };

    match conflict {
        Some(conflict) => conflict,
        None => AccountsError::Database(err),
    }
}

fn parse_public_id(raw: &str) -> AccountsResult<PublicId> {
    PublicId::parse_str(raw)
        .map_err(|e| AccountsError::Internal(format!("Invalid public_id: {}", e)))
}

fn parse_role(id: i16) -> AccountsResult<UserRole> {
    UserRole::from_id(id).ok_or_else(|| AccountsError::Internal(format!("Invalid role: {}", id)))
}

#[derive(sqlx::FromRow)]
struct UserRow {
    user_id: Uuid,
    public_id: String,
    user_name: String,
    email: Option<String>,
    is_staff: bool,
    last_login_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self) -> AccountsResult<User> {
        Ok(User {
            user_id: UserId::from_uuid(self.user_id),
            public_id: parse_public_id(&self.public_id)?,
            user_name: UserName::from_db(&self.user_name),
            email: self.email.map(Email::from_db),
            is_staff: self.is_staff,
            last_login_at: self.last_login_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct CredentialsRow {
    user_id: Uuid,
    password_hash: String,
    failed_attempts: i16,
    last_failed_at: Option<DateTime<Utc>>,
    lockout_until: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl CredentialsRow {
    fn into_credentials(self) -> AccountsResult<Credentials> {
        Ok(Credentials {
            user_id: UserId::from_uuid(self.user_id),
            password_hash: UserPassword::from_phc_string(self.password_hash)?,
            failed_attempts: self.failed_attempts.max(0) as u16,
            last_failed_at: self.last_failed_at,
            lockout_until: self.lockout_until,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct AuthSessionRow {
    session_id: Uuid,
    user_id: Uuid,
    public_id: String,
    user_role: i16,
    expires_at_ms: i64,
    client_fingerprint_hash: Vec<u8>,
    client_ip: Option<String>,
    user_agent: Option<String>,
    created_at: DateTime<Utc>,
    last_activity_at: Option<DateTime<Utc>>,
}

impl AuthSessionRow {
    fn into_session(self) -> AccountsResult<AuthSession> {
        Ok(AuthSession {
            session_id: self.session_id,
            user_id: UserId::from_uuid(self.user_id),
            public_id: parse_public_id(&self.public_id)?,
            user_role: parse_role(self.user_role)?,
            expires_at_ms: self.expires_at_ms,
            client_fingerprint_hash: self.client_fingerprint_hash,
            client_ip: self.client_ip,
            user_agent: self.user_agent,
            created_at: self.created_at,
            last_activity_at: self.last_activity_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct ActiveSessionRow {
    user_id: Uuid,
    session_id: Uuid,
    created_at: DateTime<Utc>,
}

impl ActiveSessionRow {
    fn into_active_session(self) -> ActiveSession {
        ActiveSession {
            user_id: UserId::from_uuid(self.user_id),
            session_id: self.session_id,
            created_at: self.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct ProfileRow {
    user_id: Uuid,
    role: i16,
    phone: Option<String>,
    license_number: Option<String>,
    is_verified: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    specialty_ids: Vec<Uuid>,
}

impl ProfileRow {
    fn into_profile(self) -> AccountsResult<Profile> {
        Ok(Profile {
            user_id: UserId::from_uuid(self.user_id),
            role: parse_role(self.role)?,
            phone: self.phone,
            license_number: self.license_number,
            specialty_ids: self
                .specialty_ids
                .into_iter()
                .map(SpecialtyId::from_uuid)
                .collect(),
            is_verified: self.is_verified,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct SpecialtyRow {
    specialty_id: Uuid,
    name: String,
    created_at: DateTime<Utc>,
}

impl SpecialtyRow {
    fn into_specialty(self) -> Specialty {
        Specialty {
            specialty_id: SpecialtyId::from_uuid(self.specialty_id),
            name: self.name,
            created_at: self.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct DocumentRow {
    document_id: Uuid,
    user_id: Uuid,
    doc_type: i16,
    file_path: String,
    original_name: String,
    size_bytes: i64,
    accepted: bool,
    uploaded_at: DateTime<Utc>,
}

impl DocumentRow {
    fn into_document(self) -> AccountsResult<Document> {
        let doc_type = DocumentType::from_id(self.doc_type).ok_or_else(|| {
            AccountsError::Internal(format!("Invalid doc_type: {}", self.doc_type))
        })?;

        Ok(Document {
            document_id: DocumentId::from_uuid(self.document_id),
            user_id: UserId::from_uuid(self.user_id),
            doc_type,
            file_path: self.file_path,
            original_name: self.original_name,
            size_bytes: self.size_bytes,
            accepted: self.accepted,
            uploaded_at: self.uploaded_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct DocumentWithOwnerRow {
    #[sqlx(flatten)]
    document: DocumentRow,
    owner_public_id: String,
    owner_user_name: String,
    owner_verified: bool,
}

impl DocumentWithOwnerRow {
    fn into_document_with_owner(self) -> AccountsResult<DocumentWithOwner> {
        Ok(DocumentWithOwner {
            document: self.document.into_document()?,
            owner_public_id: self.owner_public_id,
            owner_user_name: self.owner_user_name,
            owner_verified: self.owner_verified,
        })
    }
}

#[derive(sqlx::FromRow)]
struct SlotRow {
    slot_id: Uuid,
    user_id: Uuid,
    weekday: i16,
    start_time: NaiveTime,
    end_time: NaiveTime,
    created_at: DateTime<Utc>,
}

impl SlotRow {
    fn into_slot(self) -> AccountsResult<AvailabilitySlot> {
        let weekday: Weekday = AvailabilitySlot::weekday_from_index(self.weekday)?;

        Ok(AvailabilitySlot {
            slot_id: SlotId::from_uuid(self.slot_id),
            user_id: UserId::from_uuid(self.user_id),
            weekday,
            start_time: self.start_time,
            end_time: self.end_time,
            created_at: self.created_at,
        })
    }
}
