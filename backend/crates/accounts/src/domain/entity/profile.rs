//! Profile Entity
//!
//! Role and professional data attached to every user.

use chrono::{DateTime, Utc};

use crate::domain::value_object::{ids::SpecialtyId, ids::UserId, user_role::UserRole};

/// Where the client should go after sign-in or sign-up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Landing {
    Home,
    PsychOnboarding,
}

impl Landing {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Landing::Home => "home",
            Landing::PsychOnboarding => "psych_onboarding",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Profile {
    pub user_id: UserId,
    pub role: UserRole,
    pub phone: Option<String>,
    /// Professional license number (psychologists)
    pub license_number: Option<String>,
    pub specialty_ids: Vec<SpecialtyId>,
    /// Set by staff once the documents are accepted
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    pub fn new(user_id: UserId, role: UserRole) -> Self {
        let now = Utc::now();
        Self {
            user_id,
            role,
            phone: None,
            license_number: None,
            specialty_ids: Vec::new(),
            is_verified: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Psychologist still waiting for verification
    pub fn needs_onboarding(&self) -> bool {
        self.role.is_psychologist() && !self.is_verified
    }

    pub fn landing(&self) -> Landing {
        if self.needs_onboarding() {
            Landing::PsychOnboarding
        } else {
            Landing::Home
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_landing() {
        let patient = Profile::new(UserId::new(), UserRole::Patient);
        assert_eq!(patient.landing(), Landing::Home);

        let mut psych = Profile::new(UserId::new(), UserRole::Psychologist);
        assert_eq!(psych.landing(), Landing::PsychOnboarding);
        assert_eq!(psych.landing().as_str(), "psych_onboarding");

        psych.is_verified = true;
        assert_eq!(psych.landing(), Landing::Home);
    }
}
