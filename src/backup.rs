use crate::errors::{AppError, AppResult};
use crate::models::{StoreConfig, TodoDocument};
use chrono::Utc;
use std::fs;
use std::path::PathBuf;

pub const BACKUP_PREFIX: &str = "todos_backup_";

#[derive(Debug, Clone)]
pub struct BackupManager {
    data_file: PathBuf,
    backup_dir: PathBuf,
}

impl BackupManager {
    pub fn new(config: &StoreConfig) -> Self {
        Self {
            data_file: config.data_file.clone(),
            backup_dir: config.backup_dir.clone(),
        }
    }

    /// Copy the backing document verbatim into the backup store. No-op when
    /// the document does not exist yet. The name carries a second-resolution
    /// timestamp; two snapshots within the same second share a name and the
    /// last write wins.
    pub fn snapshot(&self) -> AppResult<()> {
        if !self.data_file.exists() {
            return Ok(());
        }
        fs::create_dir_all(&self.backup_dir)?;
        let name = format!("{}{}.json", BACKUP_PREFIX, Utc::now().format("%Y%m%d_%H%M%S"));
        fs::copy(&self.data_file, self.backup_dir.join(&name))?;
        tracing::debug!(backup = %name, "snapshot written");
        Ok(())
    }

    /// Read a named backup without touching the primary document. The name
    /// is a bare file name; anything path-like resolves to NotFound.
    pub fn restore(&self, name: &str) -> AppResult<TodoDocument> {
        let path = self.backup_dir.join(name);
        if !is_plain_file_name(name) || !path.is_file() {
            return Err(AppError::NotFound(format!("Backup '{}' not found", name)));
        }
        let raw = fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&raw)?)
    }
}

fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".." && !name.contains('/') && !name.contains('\\')
}
