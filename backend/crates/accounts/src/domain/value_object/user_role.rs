use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of account, fixed at sign-up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(i16)]
pub enum UserRole {
    #[default]
    Patient = 0,
    Psychologist = 1,
}

impl UserRole {
    #[inline]
    pub const fn id(&self) -> i16 {
        *self as i16
    }

    #[inline]
    pub const fn code(&self) -> &'static str {
        match self {
            UserRole::Patient => "patient",
            UserRole::Psychologist => "psychologist",
        }
    }

    #[inline]
    pub const fn is_psychologist(&self) -> bool {
        matches!(self, UserRole::Psychologist)
    }

    #[inline]
    pub fn from_id(id: i16) -> Option<Self> {
        match id {
            0 => Some(UserRole::Patient),
            1 => Some(UserRole::Psychologist),
            _ => None,
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_role_from_id() {
        assert_eq!(UserRole::from_id(0), Some(UserRole::Patient));
        assert_eq!(UserRole::from_id(1), Some(UserRole::Psychologist));
        assert_eq!(UserRole::from_id(7), None);
    }

    #[test]
    fn test_user_role_serde() {
        let role: UserRole = serde_json::from_str("\"psychologist\"").unwrap();
        assert_eq!(role, UserRole::Psychologist);
        assert_eq!(serde_json::to_string(&UserRole::Patient).unwrap(), "\"patient\"");
        assert!(serde_json::from_str::<UserRole>("\"admin\"").is_err());
    }

    #[test]
    fn test_user_role_display() {
        assert_eq!(UserRole::Patient.to_string(), "patient");
        assert_eq!(UserRole::Psychologist.to_string(), "psychologist");
    }
}
