//! Reading and rewriting the dialog JSON files.

use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};
use vasari_core::Dialog;
use vasari_error::{JsonError, StorageError, StorageErrorKind, VasariResult};

/// Loads dialogs and rewrites the output document.
///
/// Every save writes the whole array to a sibling temporary file and then
/// renames it over the output path, so readers never see a truncated file.
#[derive(Debug, Clone)]
pub struct DialogStore {
    output_path: PathBuf,
}

impl DialogStore {
    /// Creates a store writing to `output_path`.
    pub fn new(output_path: impl Into<PathBuf>) -> Self {
        Self {
            output_path: output_path.into(),
        }
    }

    /// Path the output document is written to.
    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// Reads a JSON array of dialogs.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the file cannot be read and a JSON error if
    /// it is not an array of dialog objects.
    #[instrument(fields(path = %path.display()))]
    pub async fn load(path: &Path) -> VasariResult<Vec<Dialog>> {
        let raw = tokio::fs::read(path)
            .await
            .map_err(|e| StorageError::new(StorageErrorKind::from_read(path, &e)))?;
        let dialogs: Vec<Dialog> = serde_json::from_slice(&raw)
            .map_err(|e| JsonError::new(format!("{}: {}", path.display(), e)))?;
        let done = dialogs.iter().filter(|d| d.is_done()).count();
        info!(count = dialogs.len(), done, "Loaded dialogs");
        Ok(dialogs)
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .output_path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.output_path.with_file_name(name)
    }

    /// Serializes all dialogs and replaces the output file.
    #[instrument(skip_all, fields(path = %self.output_path.display(), count = dialogs.len()))]
    pub async fn save(&self, dialogs: &[Dialog]) -> VasariResult<()> {
        let body = serde_json::to_vec(dialogs)
            .map_err(|e| JsonError::new(format!("Failed to serialize dialogs: {}", e)))?;

        let temp = self.temp_path();
        tokio::fs::write(&temp, &body)
            .await
            .map_err(|e| StorageError::new(StorageErrorKind::from_write(&temp, &e)))?;
        tokio::fs::rename(&temp, &self.output_path)
            .await
            .map_err(|e| StorageError::new(StorageErrorKind::from_write(&self.output_path, &e)))?;

        debug!(bytes = body.len(), "Dialogs saved");
        Ok(())
    }
}
