//! Error types for usbinfo.

use std::sync::Arc;

use thiserror::Error;

/// Failure to build the record collection.
///
/// A vendor or product that does not exist is not an error; lookups return
/// `Ok(None)` for it.
#[derive(Debug, Clone, Error)]
pub enum UsbIdsError {
    /// The source could not be opened or ended abnormally
    #[error("failed to read usb ids from {source_name}: {cause}")]
    SourceRead {
        source_name: String,
        #[source]
        cause: Arc<dyn std::error::Error + Send + Sync>,
    },
}

impl UsbIdsError {
    pub fn source_read(
        source_name: impl Into<String>,
        cause: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::SourceRead {
            source_name: source_name.into(),
            cause: Arc::new(cause),
        }
    }
}
