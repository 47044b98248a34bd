//! Media relay: transient download of attachments for re-upload.

use crate::transport::{DownloadDest, Transport};
use std::path::{Path, PathBuf};
use threadmirror_core::types::SourceMessage;
use tracing::{debug, warn};
use uuid::Uuid;

/// Placeholder body used when an attachment cannot be fetched. The
/// message is still replicated as text rather than dropped.
pub const MEDIA_UNAVAILABLE_TEXT: &str = "(media unavailable)";

/// Outcome of relaying a message's attachment.
#[derive(Debug)]
pub enum RelayOutcome {
    /// The attachment was downloaded and is ready to upload.
    Attached(ScopedAttachment),

    /// The download failed; the caller substitutes
    /// [`MEDIA_UNAVAILABLE_TEXT`] and sends text-only.
    Unavailable,
}

/// Local handle to a downloaded attachment.
///
/// Each download lives in its own scratch subdirectory, removed when the
/// handle is released. The `Drop` impl is a fallback so the scratch
/// entry cannot outlive the delivery attempt on any exit path.
#[derive(Debug)]
pub struct ScopedAttachment {
    path: PathBuf,
    dir: PathBuf,
    released: bool,
}

impl ScopedAttachment {
    /// Path of the downloaded content.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Remove the scratch entry. Call after the send attempt concludes,
    /// whatever its outcome.
    pub async fn release(mut self) {
        self.released = true;
        if let Err(e) = tokio::fs::remove_dir_all(&self.dir).await {
            warn!(dir = %self.dir.display(), error = %e, "failed to remove scratch dir");
        }
    }
}

impl Drop for ScopedAttachment {
    fn drop(&mut self) {
        if !self.released {
            if let Err(e) = std::fs::remove_dir_all(&self.dir) {
                warn!(dir = %self.dir.display(), error = %e, "failed to remove scratch dir");
            }
        }
    }
}

/// Downloads attachments into a scratch directory for the delivery
/// executor to upload.
#[derive(Debug, Clone)]
pub struct MediaRelay {
    scratch_root: PathBuf,
}

impl MediaRelay {
    /// Create a relay writing under the given scratch root.
    pub fn new(scratch_root: impl Into<PathBuf>) -> Self {
        Self {
            scratch_root: scratch_root.into(),
        }
    }

    /// Default scratch root under the system temp directory.
    pub fn default_scratch_root() -> PathBuf {
        std::env::temp_dir().join("threadmirror")
    }

    /// Fetch the attachment of `message` into transient storage.
    ///
    /// Any failure, from creating the scratch directory to the download
    /// itself, degrades to [`RelayOutcome::Unavailable`]; the underlying
    /// error is logged, never propagated, so the message still goes out
    /// as text.
    pub async fn relay(
        &self,
        transport: &dyn Transport,
        message: &SourceMessage,
    ) -> RelayOutcome {
        let Some(meta) = message.attachment.as_ref() else {
            return RelayOutcome::Unavailable;
        };

        let dir = self.scratch_root.join(Uuid::new_v4().to_string());
        if let Err(e) = tokio::fs::create_dir_all(&dir).await {
            warn!(source = %message.id, error = %e, "cannot create scratch dir");
            return RelayOutcome::Unavailable;
        }

        // Named media keeps its original filename; unnamed media (photos,
        // voice notes, stickers) lets the backend pick one. The filename
        // is reduced to its final component so it cannot escape the dir.
        let dest = match meta.filename.as_deref().and_then(safe_file_name) {
            Some(name) => DownloadDest::File(dir.join(name)),
            None => DownloadDest::Dir(dir.clone()),
        };

        match transport.download_attachment(message, dest).await {
            Ok(path) => {
                debug!(source = %message.id, path = %path.display(), "attachment downloaded");
                RelayOutcome::Attached(ScopedAttachment {
                    path,
                    dir,
                    released: false,
                })
            }
            Err(e) => {
                warn!(source = %message.id, error = %e, "attachment download failed");
                if let Err(e) = tokio::fs::remove_dir_all(&dir).await {
                    warn!(dir = %dir.display(), error = %e, "failed to remove scratch dir");
                }
                RelayOutcome::Unavailable
            }
        }
    }
}

/// Final path component of a platform-supplied filename, or `None` when
/// nothing usable remains.
fn safe_file_name(name: &str) -> Option<String> {
    Path::new(name)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .filter(|n| !n.is_empty() && n != "." && n != "..")
}
