use chrono::{DateTime, Utc};

use crate::domain::value_object::ids::SpecialtyId;

/// Catalog entry psychologists pick at sign-up
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Specialty {
    pub specialty_id: SpecialtyId,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl Specialty {
    pub fn new(name: String) -> Self {
        Self {
            specialty_id: SpecialtyId::new(),
            name,
            created_at: Utc::now(),
        }
    }
}
