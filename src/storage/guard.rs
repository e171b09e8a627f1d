use super::TempStore;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

/// Owns a request's temporary file until it is released.
///
/// `release` removes the file on the normal path. If the guard is dropped
/// first (the request future was cancelled), removal is handed to a
/// background task on the current runtime.
pub struct TempFileGuard {
    store: Arc<dyn TempStore>,
    path: PathBuf,
    armed: bool,
}

impl TempFileGuard {
    pub fn new(store: Arc<dyn TempStore>, path: PathBuf) -> Self {
        Self {
            store,
            path,
            armed: true,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Remove the file now. Failures are logged, not returned.
    pub async fn release(mut self) {
        self.armed = false;
        remove_logged(self.store.as_ref(), &self.path).await;
    }
}

impl Drop for TempFileGuard {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        self.armed = false;

        let store = self.store.clone();
        let path = std::mem::take(&mut self.path);

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                debug!(path = %path.display(), "Request dropped, removing temporary upload in background");
                handle.spawn(async move {
                    remove_logged(store.as_ref(), &path).await;
                });
            }
            Err(_) => {
                warn!(path = %path.display(), "No runtime available to remove temporary upload file");
            }
        }
    }
}

async fn remove_logged(store: &dyn TempStore, path: &Path) {
    if let Err(e) = store.remove(path).await {
        warn!(path = %path.display(), error = %e, "Failed to remove temporary upload file");
    }
}
