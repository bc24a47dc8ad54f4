//! Rule definitions and the compiled command resolution table

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{CooldownError, Result};

/// Mapping from command (or command-group) key to its rule definition.
///
/// This is the externally visible configuration shape. It round-trips
/// through JSON with the original field names (`uses`, `coolTime`,
/// `isGroup`, `glue`, `commands`).
pub type RuleSet = HashMap<String, RuleDef>;

/// Limit definition for one command or command-group.
///
/// A `Single` rule limits one command by name. A `Group` rule makes every
/// listed member command share a single usage counter and cooldown window.
/// The `glue` flag is accepted and preserved for compatibility with the
/// original configuration shape, but plain grouping already unifies usage
/// across members, so glued and non-glued groups behave identically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawRule", into = "RawRule")]
pub enum RuleDef {
    /// Limit for a single command
    Single {
        /// Maximum invocations allowed within one cooldown window
        uses: u32,
        /// Window length in seconds
        cool_time: u64,
    },
    /// Shared limit for a set of member commands
    Group {
        /// Maximum invocations allowed within one cooldown window
        uses: u32,
        /// Window length in seconds
        cool_time: u64,
        /// Whether using one member counts as using all of them.
        /// Operationally equivalent to plain grouping.
        glue: bool,
        /// Command names sharing this rule's counter
        commands: Vec<String>,
    },
}

impl RuleDef {
    /// Maximum invocations allowed within one window
    pub fn uses(&self) -> u32 {
        match self {
            Self::Single { uses, .. } | Self::Group { uses, .. } => *uses,
        }
    }

    /// Window length in seconds
    pub fn cool_time(&self) -> u64 {
        match self {
            Self::Single { cool_time, .. } | Self::Group { cool_time, .. } => *cool_time,
        }
    }

    /// Validate this rule definition for the given config key
    pub fn validate(&self, key: &str) -> Result<()> {
        if self.uses() == 0 {
            return Err(CooldownError::invalid_rule(key, "uses must be at least 1"));
        }

        if let Self::Group { commands, .. } = self {
            if commands.is_empty() {
                return Err(CooldownError::invalid_rule(
                    key,
                    "group has no member commands",
                ));
            }
            if commands.iter().any(|name| name.is_empty()) {
                return Err(CooldownError::invalid_rule(
                    key,
                    "group member name is empty",
                ));
            }
        }

        Ok(())
    }
}

/// Wire representation matching the original loosely-typed config object.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRule {
    #[serde(default = "default_uses")]
    uses: u32,
    #[serde(default = "default_cool_time")]
    cool_time: u64,
    #[serde(default, skip_serializing_if = "is_false")]
    is_group: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    glue: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    commands: Option<Vec<String>>,
}

// Defaults carried over from the original command definition.
fn default_uses() -> u32 {
    1
}

fn default_cool_time() -> u64 {
    30
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl From<RawRule> for RuleDef {
    fn from(raw: RawRule) -> Self {
        if raw.is_group {
            Self::Group {
                uses: raw.uses,
                cool_time: raw.cool_time,
                glue: raw.glue,
                commands: raw.commands.unwrap_or_default(),
            }
        } else {
            Self::Single {
                uses: raw.uses,
                cool_time: raw.cool_time,
            }
        }
    }
}

impl From<RuleDef> for RawRule {
    fn from(def: RuleDef) -> Self {
        match def {
            RuleDef::Single { uses, cool_time } => Self {
                uses,
                cool_time,
                is_group: false,
                glue: false,
                commands: None,
            },
            RuleDef::Group {
                uses,
                cool_time,
                glue,
                commands,
            } => Self {
                uses,
                cool_time,
                is_group: true,
                glue,
                commands: Some(commands),
            },
        }
    }
}

/// Effective limits for one command name after group resolution.
#[derive(Debug, Clone)]
pub(crate) struct CompiledRule {
    /// Usage bucket this command charges against. Group members share the
    /// group's bucket; direct keys use their own name.
    pub bucket: String,
    pub uses: u32,
    pub cool_time: i64,
}

/// Build the command-name resolution table for a validated rule set.
///
/// Every top-level key (including group keys) resolves to itself. Group
/// members resolve to their group's key unless the member name is also a
/// direct key, in which case the direct rule wins.
pub(crate) fn compile(defs: &RuleSet) -> HashMap<String, CompiledRule> {
    let mut table = HashMap::new();

    for (key, def) in defs {
        table.insert(
            key.clone(),
            CompiledRule {
                bucket: key.clone(),
                uses: def.uses(),
                cool_time: def.cool_time() as i64,
            },
        );
    }

    for (key, def) in defs {
        if let RuleDef::Group { commands, .. } = def {
            for member in commands {
                if !table.contains_key(member) {
                    table.insert(
                        member.clone(),
                        CompiledRule {
                            bucket: key.clone(),
                            uses: def.uses(),
                            cool_time: def.cool_time() as i64,
                        },
                    );
                }
            }
        }
    }

    table
}
