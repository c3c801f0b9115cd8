pub mod convert;
pub mod error;
pub mod hierarchy;
pub mod io;
pub mod models;
pub mod parsing;
pub mod remote;
pub mod render;
pub mod state;
pub mod sync;
pub mod watchdog;

#[cfg(test)]
pub mod tests;

// Re-export key types for easier usage
pub use convert::{BlockConverter, ConvertedDocument, Degradation};
pub use error::SyncError;
pub use hierarchy::{HierarchyOptions, HierarchyResolver};
pub use io::*;
pub use models::*;
pub use remote::{PageId, RemoteClient, RemoteError, RemotePage};
pub use state::{StateError, StateRepository};
pub use sync::{FileOutcome, SyncOptions, SyncOrchestrator, SyncSummary};
