use chrono::{DateTime, Utc};

use crate::domain::value_object::{
    document_type::DocumentType,
    ids::{DocumentId, UserId},
};

/// Verification document uploaded by a psychologist
#[derive(Debug, Clone)]
pub struct Document {
    pub document_id: DocumentId,
    pub user_id: UserId,
    pub doc_type: DocumentType,
    /// Path relative to the media root
    pub file_path: String,
    pub original_name: String,
    pub size_bytes: i64,
    pub accepted: bool,
    pub uploaded_at: DateTime<Utc>,
}

impl Document {
    pub fn new(
        user_id: UserId,
        doc_type: DocumentType,
        file_path: String,
        original_name: String,
        size_bytes: i64,
    ) -> Self {
        Self {
            document_id: DocumentId::new(),
            user_id,
            doc_type,
            file_path,
            original_name,
            size_bytes,
            accepted: false,
            uploaded_at: Utc::now(),
        }
    }
}

/// Document joined with its owner, for staff review
#[derive(Debug, Clone)]
pub struct DocumentWithOwner {
    pub document: Document,
    pub owner_public_id: String,
    pub owner_user_name: String,
    pub owner_verified: bool,
}
