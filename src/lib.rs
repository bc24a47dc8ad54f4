//! Guild-scoped command cooldown tracking.
//!
//! This crate tracks how often each user may invoke each command, with all
//! usage isolated per guild (tenant): exhausting a cooldown in one guild
//! never affects another. Commands can be grouped so that several names
//! share a single usage counter and cooldown window.
//!
//! The engine never reads a clock. Every call takes a caller-supplied unix
//! timestamp, which keeps evaluation deterministic and easy to test. State
//! is in-memory only; nothing is persisted.
//!
//! # Example
//!
//! ```
//! use guild_cooldowns::{Decision, GuildRegistry, RuleDef};
//! use std::collections::HashMap;
//!
//! let registry = GuildRegistry::new();
//!
//! let mut rules = HashMap::new();
//! rules.insert(
//!     "ping".to_string(),
//!     RuleDef::Single { uses: 3, cool_time: 10 },
//! );
//!
//! let guild = registry.create_config("guild-1", rules, None).unwrap();
//!
//! // First use at t=0 is allowed.
//! assert_eq!(
//!     guild.update_usage("ping", "user-1", 0, false),
//!     Some(Decision::Allowed { cooldown_hit: false }),
//! );
//! ```

#![forbid(unsafe_code)]

mod decision;
mod error;
mod guild;
mod registry;
mod rule;

pub use decision::Decision;
pub use error::{CooldownError, Result};
pub use guild::GuildConfig;
pub use registry::GuildRegistry;
pub use rule::{RuleDef, RuleSet};
