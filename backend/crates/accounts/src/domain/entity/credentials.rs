//! Credentials Entity
//!
//! Password hash plus the consecutive-failure counter that drives the
//! temporary lockout. Separated from `User` to isolate sensitive data.

use chrono::{DateTime, Duration, Utc};

use crate::domain::value_object::{ids::UserId, user_password::UserPassword};

/// How many consecutive failures lock an account, and for how long
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockoutPolicy {
    pub max_failures: u16,
    pub lockout: Duration,
}

impl Default for LockoutPolicy {
    fn default() -> Self {
        Self {
            max_failures: 3,
            lockout: Duration::minutes(5),
        }
    }
}

impl LockoutPolicy {
    pub fn lockout_minutes(&self) -> i64 {
        self.lockout.num_minutes()
    }

    /// 記録済みの失敗回数から結果を判定する
    ///
    /// Classifies a failure count that has already been persisted.
    ///
    /// ## Arguments
    /// * `failed_attempts` - consecutive failures including the one just recorded
    ///
    /// ## Examples
    /// ```
    /// use accounts::domain::entity::credentials::{FailureOutcome, LockoutPolicy};
    ///
    /// let policy = LockoutPolicy::default();
    /// assert_eq!(policy.outcome(1), FailureOutcome::Remaining(2));
    /// assert_eq!(policy.outcome(3), FailureOutcome::LockedOut);
    /// ```
    pub fn outcome(&self, failed_attempts: u16) -> FailureOutcome {
        if failed_attempts >= self.max_failures {
            FailureOutcome::LockedOut
        } else {
            FailureOutcome::Remaining(self.max_failures - failed_attempts)
        }
    }
}

/// Result of recording one wrong password
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureOutcome {
    /// Attempts left before the lockout starts
    Remaining(u16),
    /// This failure started a lockout
    LockedOut,
}

#[derive(Debug, Clone)]
pub struct Credentials {
    pub user_id: UserId,
    pub password_hash: UserPassword,
    /// Consecutive login failures since the last success or lockout
    pub failed_attempts: u16,
    pub last_failed_at: Option<DateTime<Utc>>,
    pub lockout_until: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Credentials {
    pub fn new(user_id: UserId, password_hash: UserPassword) -> Self {
        let now = Utc::now();
        Self {
            user_id,
            password_hash,
            failed_attempts: 0,
            last_failed_at: None,
            lockout_until: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Time left on a running lockout, `None` when not locked
    pub fn lockout_remaining(&self, now: DateTime<Utc>) -> Option<Duration> {
        self.lockout_until
            .filter(|until| *until > now)
            .map(|until| until - now)
    }

    /// Whole minutes left on a running lockout (floored)
    pub fn remaining_lockout_minutes(&self, now: DateTime<Utc>) -> Option<i64> {
        self.lockout_remaining(now)
            .map(|left| (left.num_seconds() / 60).max(0))
    }

    /// Record a wrong password
    ///
    /// A lockout that has already lapsed is cleared first, so counting
    /// restarts from zero.
    pub fn register_failure(&mut self, policy: &LockoutPolicy, now: DateTime<Utc>) -> FailureOutcome {
        if self.lockout_until.is_some_and(|until| until <= now) {
            self.failed_attempts = 0;
            self.lockout_until = None;
        }

        self.failed_attempts = self.failed_attempts.saturating_add(1);
        self.last_failed_at = Some(now);
        self.updated_at = now;

        let outcome = policy.outcome(self.failed_attempts);
        if outcome == FailureOutcome::LockedOut {
            self.lockout_until = Some(now + policy.lockout);
        }
        outcome
    }

    /// Reset failure tracking after a successful login
    pub fn reset_failures(&mut self, now: DateTime<Utc>) {
        self.failed_attempts = 0;
        self.last_failed_at = None;
        self.lockout_until = None;
        self.updated_at = now;
    }
}
