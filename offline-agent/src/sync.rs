//! Background Sync Hook
//!
//! The sync signal is a stub over the application's pending-upload queue
//! (an external collaborator). Only the `"video-upload"` tag is
//! recognized; any failure inside the delegate is caught and logged, never
//! propagated, and the signal counts as handled regardless.

use async_trait::async_trait;
use log::{debug, info, warn};

/// The only recognized sync tag.
pub const VIDEO_UPLOAD_TAG: &str = "video-upload";

/// Failure reported by the upload-queue delegate.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SyncError {
    /// The delegate could not complete its synchronization.
    #[error("sync delegate failed: {0}")]
    Delegate(String),
}

/// Pending-upload queue collaborator.
///
/// The real queue lives in the application (IndexedDB-backed) and is out
/// of scope here; the agent only invokes it.
#[async_trait]
pub trait UploadQueue: Send + Sync {
    /// Synchronize pending uploads; returns how many were flushed.
    async fn sync_pending(&self) -> Result<usize, SyncError>;
}

/// How a sync signal was resolved. Observability only: no variant is an
/// error to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Delegate ran successfully, flushing this many uploads.
    Completed(usize),
    /// Delegate failed; the failure was logged and swallowed.
    Failed,
    /// Tag not recognized; ignored silently.
    IgnoredTag,
}

/// Handle a sync signal for the given tag.
pub async fn handle_sync(tag: &str, queue: Option<&dyn UploadQueue>) -> SyncOutcome {
    if tag != VIDEO_UPLOAD_TAG {
        debug!("sync: ignoring tag '{tag}'");
        return SyncOutcome::IgnoredTag;
    }

    let Some(queue) = queue else {
        // No queue wired up: the hook is a stub and succeeds vacuously.
        debug!("sync: no upload queue configured, nothing to do");
        return SyncOutcome::Completed(0);
    };

    match queue.sync_pending().await {
        Ok(count) => {
            info!("sync: flushed {count} pending uploads");
            SyncOutcome::Completed(count)
        }
        Err(e) => {
            warn!("sync: {e}");
            SyncOutcome::Failed
        }
    }
}
