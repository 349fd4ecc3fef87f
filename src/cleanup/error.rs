//! Fatal cleanup errors
//!
//! Only conditions that make the rest of the run unsafe end up here.
//! Everything else is a per-resource [`ProviderError`] recorded in the
//! [`RunReport`](super::RunReport).

use crate::provider::ProviderError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CleanupError {
    /// The folder tree could not be listed, so its shape cannot be trusted
    #[error("failed to list sub-folders of {folder}: {source}")]
    FolderListing {
        folder: String,
        #[source]
        source: ProviderError,
    },
}
