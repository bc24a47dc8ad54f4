//! Error types for cooldown configuration

use thiserror::Error;

/// Result type alias for cooldown operations
pub type Result<T> = std::result::Result<T, CooldownError>;

/// Errors reported when building a guild configuration.
///
/// The evaluation path itself never fails: unknown commands yield `None`
/// and append operations on missing state are silent no-ops.
#[derive(Error, Debug)]
pub enum CooldownError {
    /// A guild configuration was requested with an empty guild id
    #[error("Guild id cannot be empty")]
    EmptyGuildId,

    /// A rule definition failed validation
    #[error("Invalid rule for '{key}': {reason}")]
    InvalidRule {
        /// Config key the rule was registered under
        key: String,
        /// What the rule violated
        reason: String,
    },
}

impl CooldownError {
    /// Create a new invalid-rule error
    pub fn invalid_rule(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidRule {
            key: key.into(),
            reason: reason.into(),
        }
    }
}
