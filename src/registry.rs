//! Registry of per-guild cooldown trackers

use std::sync::Arc;

use dashmap::DashMap;
use tracing::debug;

use crate::error::{CooldownError, Result};
use crate::guild::GuildConfig;
use crate::rule::RuleSet;

/// Container holding one [`GuildConfig`] per guild.
///
/// Construct a registry explicitly and share it from the dispatch layer;
/// there is no process-wide default instance.
#[derive(Debug, Default)]
pub struct GuildRegistry {
    configs: DashMap<String, Arc<GuildConfig>>,
}

impl GuildRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a configuration for a guild and register it.
    ///
    /// The effective rule set starts from `link_to`'s definitions when one
    /// is given, with every key present in `rules` overwriting (or adding
    /// to) the base. Linking copies definitions only: the new tracker
    /// starts with empty usage state and shares nothing with `link_to`
    /// afterwards.
    ///
    /// Registration is last-write-wins: any tracker previously registered
    /// under `guild_id` is replaced, though existing handles to it stay
    /// valid.
    pub fn create_config(
        &self,
        guild_id: impl Into<String>,
        rules: RuleSet,
        link_to: Option<&GuildConfig>,
    ) -> Result<Arc<GuildConfig>> {
        let guild_id = guild_id.into();
        if guild_id.is_empty() {
            return Err(CooldownError::EmptyGuildId);
        }

        let mut merged = link_to.map(|base| base.rules().clone()).unwrap_or_default();
        merged.extend(rules);

        let config = Arc::new(GuildConfig::new(guild_id.clone(), merged)?);
        debug!(
            "Registered cooldown config for guild {} ({} rules)",
            guild_id,
            config.rules().len()
        );
        self.configs.insert(guild_id, Arc::clone(&config));

        Ok(config)
    }

    /// Look up the tracker registered for a guild
    pub fn get(&self, guild_id: &str) -> Option<Arc<GuildConfig>> {
        self.configs
            .get(guild_id)
            .map(|entry| Arc::clone(entry.value()))
    }

    /// Number of registered guilds
    pub fn len(&self) -> usize {
        self.configs.len()
    }

    /// Whether no guild is registered
    pub fn is_empty(&self) -> bool {
        self.configs.is_empty()
    }
}
