use crate::io::IoError;
use crate::remote::{PageId, RemoteError};
use crate::state::StateError;

/// Errors raised by the sync core.
///
/// Everything except [`SyncError::ConfigurationInvalid`] is scoped to one
/// file: the orchestrator records it and moves on.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("Configuration invalid: {0}")]
    ConfigurationInvalid(String),
    #[error("Container for '{path_key}' vanished again after being rebuilt")]
    HierarchyStale { path_key: String },
    #[error("Destination page {0} was lost again after recreation")]
    DestinationLost(PageId),
    #[error("Remote rejected content: {0}")]
    RemoteRejected(String),
    #[error("Remote error: {0}")]
    Remote(RemoteError),
    #[error(transparent)]
    Io(#[from] IoError),
    #[error(transparent)]
    State(#[from] StateError),
}

impl From<RemoteError> for SyncError {
    fn from(err: RemoteError) -> Self {
        match err {
            RemoteError::Rejected(reason) => SyncError::RemoteRejected(reason),
            other => SyncError::Remote(other),
        }
    }
}

impl SyncError {
    /// Errors that must stop the run before any file is touched.
    pub fn is_fatal(&self) -> bool {
        matches!(self, SyncError::ConfigurationInvalid(_) | SyncError::State(_))
    }
}
