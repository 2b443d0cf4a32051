use thiserror::Error;

/// Errors raised by the core view-state layer.
///
/// Only routing can fail here: everything else is a pure state transition.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The location does not name a known route.
    #[error("unrecognised route: {0}")]
    InvalidRoute(String),

    /// The encoded state in a route is not valid UTF-8 after decoding.
    #[error("route state is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// The route state could not be (de)serialized.
    #[error("route state encoding failed: {0}")]
    Encoding(#[from] serde_json::Error),
}
