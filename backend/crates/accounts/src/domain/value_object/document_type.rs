//! Document Type Value Object
//!
//! Kinds of verification documents a psychologist can upload.

use std::str::FromStr;

use derive_more::Display;
use kernel::error::app_error::AppError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(i16)]
pub enum DocumentType {
    /// Professional license
    #[display("license")]
    License = 0,
    /// Identity document
    #[display("id")]
    Id = 1,
    /// Curriculum vitae
    #[display("cv")]
    Cv = 2,
}

impl DocumentType {
    #[inline]
    pub const fn id(&self) -> i16 {
        *self as i16
    }

    pub fn from_id(id: i16) -> Option<Self> {
        match id {
            0 => Some(DocumentType::License),
            1 => Some(DocumentType::Id),
            2 => Some(DocumentType::Cv),
            _ => None,
        }
    }
}

impl FromStr for DocumentType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "license" => Ok(DocumentType::License),
            "id" => Ok(DocumentType::Id),
            "cv" => Ok(DocumentType::Cv),
            other => Err(AppError::bad_request(format!("Unknown document type: {other}"))
                .with_action("Use one of: license, id, cv")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!("license".parse::<DocumentType>().unwrap(), DocumentType::License);
        assert_eq!(" ID ".parse::<DocumentType>().unwrap(), DocumentType::Id);
        assert_eq!("cv".parse::<DocumentType>().unwrap(), DocumentType::Cv);
        assert!("passport".parse::<DocumentType>().is_err());
    }

    #[test]
    fn test_display_matches_serde() {
        for doc_type in [DocumentType::License, DocumentType::Id, DocumentType::Cv] {
            let json = serde_json::to_string(&doc_type).unwrap();
            assert_eq!(json, format!("\"{}\"", doc_type));
            assert_eq!(DocumentType::from_id(doc_type.id()), Some(doc_type));
        }
    }
}
