//! Error types returned by the query client.

use crate::api::response::VendorError;
use crate::api::tree::DecodeError;

/// Boxed error produced by a [`Transport`](crate::api::Transport) implementation.
pub type TransportError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Everything that can go wrong between building a request and handing back
/// the interpreted response.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// A mutating action was attempted on a read-only client. No request was sent.
    #[error("account is read-only, refusing to call {action}")]
    ReadOnly { action: String },

    /// Connection, timeout or body-read failure.
    #[error("transport error: {0}")]
    Transport(#[source] TransportError),

    /// The response body could not be turned into a tree.
    #[error("failed to decode response: {0}")]
    Decode(#[from] DecodeError),

    /// The remote side reported an application-level error.
    #[error("{0}")]
    Vendor(VendorError),

    /// Non-2xx status without a vendor error in the body.
    #[error("request failed with status {status}: {body}")]
    Status { status: u16, body: String },

    /// No cached region has the requested id.
    #[error("region not found: {0}")]
    NotFound(String),

    /// Invalid endpoint, proxy or client settings.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl ApiError {
    /// Whether repeating the same call could plausibly succeed.
    ///
    /// Only transport failures qualify; nothing in this crate retries on its own.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ApiError::Transport(_))
    }

    /// Returns the vendor error payload, if this is a vendor-level failure.
    pub fn vendor(&self) -> Option<&VendorError> {
        match self {
            ApiError::Vendor(e) => Some(e),
            _ => None,
        }
    }
}

impl From<VendorError> for ApiError {
    fn from(e: VendorError) -> Self {
        ApiError::Vendor(e)
    }
}

/// Result alias used across the `api` module.
pub type Result<T> = std::result::Result<T, ApiError>;
