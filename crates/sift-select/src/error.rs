//! Error types for sift-select.
//!
//! Interaction with a live widget never fails: invalid requests (selecting a
//! disabled option, highlighting an index that does not exist) are ignored.
//! Errors only arise when a widget cannot be built at all, or when
//! configuration text cannot be parsed.

/// Result type alias for sift-select operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in sift-select.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The native control cannot be enhanced.
    #[error("Invalid native control{}: {reason}", control_label(.control_id))]
    InvalidControl {
        control_id: Option<String>,
        reason: String,
    },

    /// Configuration text could not be parsed.
    #[error("Invalid search-select configuration: {0}")]
    Config(#[from] toml::de::Error),
}

impl Error {
    /// Create an invalid-control error.
    pub fn invalid_control(control_id: Option<&str>, reason: impl Into<String>) -> Self {
        Self::InvalidControl {
            control_id: control_id.map(str::to_owned),
            reason: reason.into(),
        }
    }
}

fn control_label(control_id: &Option<String>) -> String {
    control_id
        .as_deref()
        .map(|id| format!(" '{id}'"))
        .unwrap_or_default()
}
