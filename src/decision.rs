//! Outcome of a single usage evaluation

/// Decision returned for one invocation attempt.
///
/// Unrecognized commands are reported as `None` by
/// [`GuildConfig::update_usage`](crate::GuildConfig::update_usage), never as
/// an error: the caller treats them as untracked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// The invocation is permitted.
    Allowed {
        /// True exactly when this call consumed the final use of the
        /// current window, triggering the cooldown.
        cooldown_hit: bool,
    },
    /// The invocation is rejected until the window elapses.
    Blocked {
        /// Seconds remaining until the window resets. Never negative.
        seconds_left: u64,
        /// True when the user already made a blocked attempt within this
        /// exhausted window.
        tried_again: bool,
    },
}

impl Decision {
    /// Whether the invocation may proceed
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_allowed() {
        assert!(Decision::Allowed { cooldown_hit: true }.is_allowed());
        assert!(!Decision::Blocked {
            seconds_left: 5,
            tried_again: false
        }
        .is_allowed());
    }
}
