//! Per-guild command usage tracking and cooldown evaluation

use std::collections::HashMap;

use dashmap::DashMap;
use tracing::debug;

use crate::decision::Decision;
use crate::error::Result;
use crate::rule::{compile, CompiledRule, RuleSet};

/// Live counter for one (usage bucket, user) pair.
///
/// Created lazily on the first recorded invocation and kept for the
/// lifetime of the owning [`GuildConfig`] unless removed by
/// [`GuildConfig::sweep_expired`] or [`GuildConfig::clear_user`].
#[derive(Debug)]
struct UsageState {
    /// Remaining allowed invocations in the current window. Can go
    /// negative through [`GuildConfig::append_uses`]; any non-positive
    /// value blocks.
    uses_left: i64,
    /// Unix timestamp at which the window resets.
    window_end: i64,
    /// Set on the first blocked attempt within an exhausted window,
    /// cleared on window reset.
    tried_again: bool,
}

/// Cooldown tracker for a single guild.
///
/// Owns the guild's rule definitions and all per-user usage state. All
/// usage is isolated to this guild; other guilds tracked by the same
/// [`GuildRegistry`](crate::GuildRegistry) are unaffected.
///
/// Every operation takes the invocation timestamp from the caller as raw
/// unix seconds. The tracker never reads a clock, so evaluation is
/// deterministic.
#[derive(Debug)]
pub struct GuildConfig {
    guild_id: String,
    /// Rule definitions as configured, kept for merging and round-trip.
    rules: RuleSet,
    /// Command name to effective limits, with group members resolved to
    /// their group's bucket.
    resolution: HashMap<String, CompiledRule>,
    /// Live usage counters keyed by (bucket, user id).
    usage: DashMap<(String, String), UsageState>,
}

impl GuildConfig {
    /// Build a tracker from validated rule definitions.
    pub(crate) fn new(guild_id: String, rules: RuleSet) -> Result<Self> {
        for (key, def) in &rules {
            def.validate(key)?;
        }

        let resolution = compile(&rules);

        Ok(Self {
            guild_id,
            rules,
            resolution,
            usage: DashMap::new(),
        })
    }

    /// The guild this tracker belongs to
    pub fn guild_id(&self) -> &str {
        &self.guild_id
    }

    /// The rule definitions this tracker was built from
    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Record one invocation attempt and decide whether it may proceed.
    ///
    /// Returns `None` when `cmd` is neither a configured key nor a member
    /// of any group (the command is untracked). Otherwise the attempt is
    /// charged against the command's usage bucket: group members all share
    /// their group's bucket, so using any member counts against every
    /// member.
    ///
    /// A window that has elapsed by `timestamp` is reset first, with this
    /// call counting as the first use of the fresh window. The call that
    /// consumes the final use reports `cooldown_hit`; calls beyond that
    /// are blocked with the seconds remaining.
    ///
    /// With `check_only` the decision is computed without mutating any
    /// state: no counter is created, decremented, or reset.
    pub fn update_usage(
        &self,
        cmd: &str,
        user_id: &str,
        timestamp: i64,
        check_only: bool,
    ) -> Option<Decision> {
        let rule = self.resolution.get(cmd)?;
        let key = (rule.bucket.clone(), user_id.to_string());

        if check_only {
            let decision = match self.usage.get(&key) {
                None => Self::decide_fresh(rule),
                Some(state) if timestamp >= state.window_end => Self::decide_fresh(rule),
                Some(state) if state.uses_left > 0 => Decision::Allowed {
                    cooldown_hit: state.uses_left == 1,
                },
                Some(state) => Decision::Blocked {
                    seconds_left: (state.window_end - timestamp).max(0) as u64,
                    tried_again: state.tried_again,
                },
            };
            return Some(decision);
        }

        let mut entry = self.usage.entry(key).or_insert_with(|| UsageState {
            uses_left: i64::from(rule.uses),
            window_end: timestamp + rule.cool_time,
            tried_again: false,
        });
        let state = entry.value_mut();

        if timestamp >= state.window_end {
            state.uses_left = i64::from(rule.uses);
            state.window_end = timestamp + rule.cool_time;
            state.tried_again = false;
            debug!(
                "Reset cooldown window for '{}' (user: {}, guild: {})",
                rule.bucket, user_id, self.guild_id
            );
        }

        let decision = if state.uses_left > 0 {
            state.uses_left -= 1;
            let cooldown_hit = state.uses_left == 0;
            if cooldown_hit {
                debug!(
                    "Cooldown triggered for '{}' (user: {}, guild: {})",
                    rule.bucket, user_id, self.guild_id
                );
            }
            Decision::Allowed { cooldown_hit }
        } else {
            let tried_again = state.tried_again;
            state.tried_again = true;
            Decision::Blocked {
                seconds_left: (state.window_end - timestamp).max(0) as u64,
                tried_again,
            }
        };

        Some(decision)
    }

    /// Decision for a user with no live state (or an elapsed window):
    /// the call would start a fresh window and take its first use.
    fn decide_fresh(rule: &CompiledRule) -> Decision {
        Decision::Allowed {
            cooldown_hit: rule.uses == 1,
        }
    }

    /// Shift the end of the current window for `(cmd, user_id)`.
    ///
    /// Positive values extend the wait, negative values shorten it; a
    /// window pushed into the past is observed as expired by the next
    /// [`update_usage`](Self::update_usage) call. Silent no-op when the
    /// user has no state for the command yet, or the command is unknown.
    pub fn append_seconds(&self, cmd: &str, user_id: &str, extra_seconds: i64) {
        let Some(rule) = self.resolution.get(cmd) else {
            return;
        };

        if let Some(mut state) = self
            .usage
            .get_mut(&(rule.bucket.clone(), user_id.to_string()))
        {
            state.window_end += extra_seconds;
            debug!(
                "Appended {}s to '{}' (user: {}, guild: {})",
                extra_seconds, rule.bucket, user_id, self.guild_id
            );
        }
    }

    /// Shift the remaining allowance for `(cmd, user_id)`.
    ///
    /// Positive values grant extra uses within the current window (even
    /// after exhaustion); negative values take uses away and can lock the
    /// command until the window resets. Silent no-op when the user has no
    /// state for the command yet, or the command is unknown.
    pub fn append_uses(&self, cmd: &str, user_id: &str, extra_uses: i64) {
        let Some(rule) = self.resolution.get(cmd) else {
            return;
        };

        if let Some(mut state) = self
            .usage
            .get_mut(&(rule.bucket.clone(), user_id.to_string()))
        {
            state.uses_left += extra_uses;
            debug!(
                "Appended {} uses to '{}' (user: {}, guild: {})",
                extra_uses, rule.bucket, user_id, self.guild_id
            );
        }
    }

    /// Number of live usage entries across all buckets and users
    pub fn active_entries(&self) -> usize {
        self.usage.len()
    }

    /// Drop all usage state recorded for one user
    pub fn clear_user(&self, user_id: &str) {
        let before = self.usage.len();
        self.usage.retain(|(_, user), _| user != user_id);
        let cleared = before - self.usage.len();

        if cleared > 0 {
            debug!(
                "Cleared {} usage entries for user {} (guild: {})",
                cleared, user_id, self.guild_id
            );
        }
    }

    /// Remove entries whose window ended more than `stale_after_seconds`
    /// before `now`.
    ///
    /// Usage state otherwise accumulates per (bucket, user) pair for the
    /// lifetime of the tracker, so long-running callers should run this
    /// periodically. Returns the number of entries removed.
    pub fn sweep_expired(&self, now: i64, stale_after_seconds: u64) -> usize {
        let before = self.usage.len();
        self.usage
            .retain(|_, state| now - state.window_end <= stale_after_seconds as i64);
        let swept = before - self.usage.len();

        if swept > 0 {
            debug!(
                "Swept {} stale usage entries (guild: {})",
                swept, self.guild_id
            );
        }

        swept
    }
}
