//! Local Document Storage
//!
//! Uploads are written below `<root>/documents/YYYY/MM/DD/` with a random
//! prefix so two uploads with the same name never collide.

use std::path::{Component, Path, PathBuf};

use chrono::Utc;
use uuid::Uuid;

use crate::domain::repository::{DocumentStore, StoredFile};
use crate::error::{AccountsError, AccountsResult};

/// Maximum length of the sanitized file name part
const MAX_FILENAME_LENGTH: usize = 255;

/// Filesystem-backed document store
#[derive(Debug, Clone)]
pub struct LocalFileStore {
    root: PathBuf,
}

impl LocalFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a stored relative path, refusing anything that escapes the root
    fn resolve(&self, relative_path: &str) -> AccountsResult<PathBuf> {
        let relative = Path::new(relative_path);
        if !relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
        {
            return Err(AccountsError::Internal(format!(
                "Refusing stored path outside media root: {relative_path}"
            )));
        }
        Ok(self.root.join(relative))
    }
}

impl DocumentStore for LocalFileStore {
    async fn save_document(&self, original_name: &str, bytes: &[u8]) -> AccountsResult<StoredFile> {
        let directory = Utc::now().format("documents/%Y/%m/%d").to_string();
        let file_name = format!("{}-{}", Uuid::new_v4(), sanitize_filename(original_name));
        let relative_path = format!("{directory}/{file_name}");

        tokio::fs::create_dir_all(self.root.join(&directory)).await?;
        tokio::fs::write(self.resolve(&relative_path)?, bytes).await?;

        tracing::debug!(path = %relative_path, size = bytes.len(), "Stored uploaded document");

        Ok(StoredFile {
            relative_path,
            size_bytes: bytes.len() as i64,
        })
    }

    async fn remove_document(&self, relative_path: &str) -> AccountsResult<()> {
        match tokio::fs::remove_file(self.resolve(relative_path)?).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Reduce a client-supplied file name to a safe single path segment
fn sanitize_filename(raw_filename: &str) -> String {
    // Drop any directory part the client sent
    let filename = raw_filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(raw_filename);

    let sanitized: String = filename
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        .collect();

    // No hidden files, no ".." sequences
    let mut collapsed = String::with_capacity(sanitized.len());
    for c in sanitized.trim_start_matches('.').chars() {
        if !(c == '.' && collapsed.ends_with('.')) {
            collapsed.push(c);
        }
    }

    // Keep the extension when truncating
    if collapsed.len() > MAX_FILENAME_LENGTH {
        collapsed = match collapsed.rfind('.') {
            Some(dot) if collapsed.len() - dot < MAX_FILENAME_LENGTH => {
                let ext = collapsed[dot..].to_string();
                format!("{}{}", &collapsed[..MAX_FILENAME_LENGTH - ext.len()], ext)
            }
            _ => collapsed[..MAX_FILENAME_LENGTH].to_string(),
        };
    }

    if collapsed.is_empty() {
        "upload".to_string()
    } else {
        collapsed
    }
}
