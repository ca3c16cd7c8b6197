use std::path::PathBuf;

use crate::{types::DriftStatus, warning};

pub const LAST_CALLBACK_FILE: &str = "last_callback_url";
pub const FIRST_RUN_FILE: &str = "first_run_done";

/// Persists the last externally visible callback URL so a resolution can
/// tell whether the URL the operator registered with Spotify has gone
/// stale. Keeps a monotonic "last seen" record, not a history.
///
/// Also owns the first-run marker that gates the setup page: absent until
/// the first successful exposure, never cleared automatically.
pub struct RedirectStateStore {
    cache_dir: PathBuf,
}

impl RedirectStateStore {
    pub fn new(cache_dir: PathBuf) -> Self {
        RedirectStateStore { cache_dir }
    }

    /// Compares `new_url` against the previously recorded callback URL and
    /// overwrites the record with `new_url`.
    ///
    /// Drift (`changed = true`) is reported only when a previous value
    /// existed and differs; it is advisory and never blocks operation. An
    /// unwritable cache downgrades to a warning so the resolver stays
    /// usable on read-only filesystems.
    pub async fn record_and_compare(&self, new_url: &str) -> DriftStatus {
        let path = self.cache_dir.join(LAST_CALLBACK_FILE);
        let previous = async_fs::read_to_string(&path)
            .await
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        let changed = previous.as_deref().is_some_and(|p| p != new_url);

        if let Err(e) = self.write(&path, new_url).await {
            warning!("Could not save last callback URL: {}", e);
        }

        DriftStatus { changed, previous }
    }

    pub async fn is_first_run(&self) -> bool {
        !self.cache_dir.join(FIRST_RUN_FILE).is_file()
    }

    pub async fn mark_first_run_done(&self) {
        let path = self.cache_dir.join(FIRST_RUN_FILE);
        if let Err(e) = self.write(&path, "done").await {
            warning!("Could not mark first run done: {}", e);
        }
    }

    async fn write(&self, path: &PathBuf, content: &str) -> Result<(), String> {
        async_fs::create_dir_all(&self.cache_dir)
            .await
            .map_err(|e| e.to_string())?;
        async_fs::write(path, content)
            .await
            .map_err(|e| e.to_string())
    }
}
