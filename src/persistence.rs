use crate::backup::BackupManager;
use crate::errors::{AppError, AppResult};
use crate::models::{StoreConfig, TodoDocument};
use serde_json::Value;
use std::fs;
use std::io::Write;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Persistence {
    data_file: PathBuf,
    backups: BackupManager,
}

impl Persistence {
    pub fn new(config: &StoreConfig) -> Self {
        Self {
            data_file: config.data_file.clone(),
            backups: BackupManager::new(config),
        }
    }

    pub fn document_exists(&self) -> bool {
        self.data_file.exists()
    }

    /// Load the whole collection. Never fails: a missing document is an
    /// empty collection, and an unreadable or wrong-shaped one is backed up
    /// and downgraded to empty. Availability wins over surfacing corruption.
    pub fn load(&self) -> TodoDocument {
        let raw = match fs::read_to_string(&self.data_file) {
            Ok(raw) => raw,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                return TodoDocument::default();
            }
            Err(error) => {
                tracing::warn!(path = %self.data_file.display(), error = %error, "failed to read todo document");
                return TodoDocument::default();
            }
        };

        match parse_document(&raw) {
            Ok(document) => document,
            Err(error) => {
                tracing::warn!(
                    path = %self.data_file.display(),
                    error = %error,
                    "todo document unreadable; backing it up and starting empty"
                );
                if let Err(backup_error) = self.backups.snapshot() {
                    tracing::warn!(error = %backup_error, "backup of corrupt document failed");
                }
                TodoDocument::default()
            }
        }
    }

    /// Snapshot the prior on-disk state, then atomically overwrite the
    /// document. The snapshot comes first: a recoverable copy must exist
    /// before on-disk state changes, so a snapshot failure fails the save.
    pub fn save(&self, document: &TodoDocument) -> AppResult<()> {
        self.backups.snapshot()?;

        let pretty = serde_json::to_string_pretty(document)
            .map_err(|error| AppError::Persistence(error.to_string()))?;
        self.write_atomic(pretty.as_bytes())
            .map_err(|error| AppError::Persistence(error.to_string()))
    }

    fn write_atomic(&self, bytes: &[u8]) -> std::io::Result<()> {
        let tmp = self.data_file.with_extension("json.tmp");
        let mut file = fs::File::create(&tmp)?;
        file.write_all(bytes)?;
        file.sync_all()?;
        drop(file);
        fs::rename(&tmp, &self.data_file)
    }
}

/// The `todos` envelope key is part of the persisted invariant; a document
/// without it takes the corruption path rather than erroring.
fn parse_document(raw: &str) -> AppResult<TodoDocument> {
    let value: Value = serde_json::from_str(raw)?;
    let has_envelope = value
        .as_object()
        .map(|object| object.contains_key("todos"))
        .unwrap_or(false);
    if !has_envelope {
        return Err(AppError::Persistence(
            "document is missing the 'todos' envelope".to_string(),
        ));
    }
    Ok(serde_json::from_value(value)?)
}
