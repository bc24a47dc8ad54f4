//! Integration tests for the guild-cooldowns public API.
//!
//! These exercise the registry and per-guild trackers end to end, including
//! the JSON configuration shape and the documented usage scenario.

use std::collections::HashMap;

use guild_cooldowns::{Decision, GuildRegistry, RuleDef, RuleSet};
use proptest::prelude::*;

fn rule_set(json: &str) -> RuleSet {
    serde_json::from_str(json).unwrap()
}

#[test]
fn test_documented_usage_scenario() {
    // uses=3, coolTime=10: calls at t=0,1,2 succeed (the third triggers the
    // cooldown), t=5 is blocked with 5 seconds left, t=10 resets.
    let registry = GuildRegistry::new();
    let guild = registry
        .create_config("guild-1", rule_set(r#"{ "ping": { "uses": 3, "coolTime": 10 } }"#), None)
        .unwrap();

    assert_eq!(
        guild.update_usage("ping", "user-1", 0, false),
        Some(Decision::Allowed {
            cooldown_hit: false
        })
    );
    assert_eq!(
        guild.update_usage("ping", "user-1", 1, false),
        Some(Decision::Allowed {
            cooldown_hit: false
        })
    );
    assert_eq!(
        guild.update_usage("ping", "user-1", 2, false),
        Some(Decision::Allowed { cooldown_hit: true })
    );
    assert_eq!(
        guild.update_usage("ping", "user-1", 5, false),
        Some(Decision::Blocked {
            seconds_left: 5,
            tried_again: false
        })
    );
    assert_eq!(
        guild.update_usage("ping", "user-1", 10, false),
        Some(Decision::Allowed {
            cooldown_hit: false
        })
    );
}

#[test]
fn test_original_config_shape_end_to_end() {
    let registry = GuildRegistry::new();
    let guild = registry
        .create_config(
            "guild-1",
            rule_set(
                r#"{
                    "command-name": { "uses": 3, "coolTime": 10 },
                    "myCommandGroup": { "isGroup": true, "uses": 1, "coolTime": 60, "commands": ["foo", "bar"] },
                    "myGluedCommands": { "isGroup": true, "glue": true, "uses": 2, "coolTime": 120, "commands": ["lorem", "ipsum"] }
                }"#,
            ),
            None,
        )
        .unwrap();

    // Grouped commands share one allowance.
    assert!(guild.update_usage("foo", "u1", 0, false).unwrap().is_allowed());
    assert!(matches!(
        guild.update_usage("bar", "u1", 1, false),
        Some(Decision::Blocked { .. })
    ));

    // Glued commands do as well.
    assert!(guild.update_usage("lorem", "u1", 0, false).unwrap().is_allowed());
    assert!(guild.update_usage("ipsum", "u1", 1, false).unwrap().is_allowed());
    assert!(matches!(
        guild.update_usage("lorem", "u1", 2, false),
        Some(Decision::Blocked { .. })
    ));

    // Untracked commands stay untracked.
    assert_eq!(guild.update_usage("unrelated", "u1", 0, false), None);
}

#[test]
fn test_linked_config_round_trips_through_json() {
    let registry = GuildRegistry::new();
    let base = registry
        .create_config(
            "base",
            rule_set(r#"{ "ping": { "uses": 3, "coolTime": 10 }, "pong": { "uses": 2, "coolTime": 20 } }"#),
            None,
        )
        .unwrap();

    let derived = registry
        .create_config(
            "derived",
            rule_set(r#"{ "ping": { "uses": 1, "coolTime": 60 } }"#),
            Some(&base),
        )
        .unwrap();

    // The merged definitions serialize back to the same external shape.
    let json = serde_json::to_value(derived.rules()).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "ping": { "uses": 1, "coolTime": 60 },
            "pong": { "uses": 2, "coolTime": 20 },
        })
    );

    let reparsed: RuleSet = serde_json::from_value(json).unwrap();
    assert_eq!(&reparsed, derived.rules());
}

#[test]
fn test_usage_is_isolated_per_guild() {
    let registry = GuildRegistry::new();
    let config = rule_set(r#"{ "ping": { "uses": 1, "coolTime": 100 } }"#);

    let g1 = registry.create_config("g1", config.clone(), None).unwrap();
    let g2 = registry.create_config("g2", config, None).unwrap();

    assert!(g1.update_usage("ping", "u1", 0, false).unwrap().is_allowed());
    assert!(matches!(
        g1.update_usage("ping", "u1", 1, false),
        Some(Decision::Blocked { .. })
    ));
    assert!(g2.update_usage("ping", "u1", 1, false).unwrap().is_allowed());
}

#[test]
fn test_append_operations_through_registry_handle() {
    let registry = GuildRegistry::new();
    registry
        .create_config("g1", rule_set(r#"{ "ping": { "uses": 1, "coolTime": 9999 } }"#), None)
        .unwrap();

    let guild = registry.get("g1").unwrap();
    assert!(guild.update_usage("ping", "u1", 0, false).unwrap().is_allowed());
    assert!(matches!(
        guild.update_usage("ping", "u1", 1, false),
        Some(Decision::Blocked { .. })
    ));

    // Forcing the window into the past makes the next call reset.
    guild.append_seconds("ping", "u1", -9999);
    assert!(guild.update_usage("ping", "u1", 2, false).unwrap().is_allowed());
}

fn exhaust(guild: &guild_cooldowns::GuildConfig, cmd: &str, user: &str, uses: u32) {
    for _ in 0..uses {
        let decision = guild.update_usage(cmd, user, 0, false).unwrap();
        assert!(decision.is_allowed());
    }
}

proptest! {
    #[test]
    fn test_blocked_seconds_left_matches_remaining_window(
        uses in 1u32..6,
        cool_time in 2u64..600,
        percent in 1u64..100,
    ) {
        let mut rules = HashMap::new();
        rules.insert(
            "cmd".to_string(),
            RuleDef::Single { uses, cool_time },
        );

        let registry = GuildRegistry::new();
        let guild = registry.create_config("g1", rules, None).unwrap();
        exhaust(&guild, "cmd", "u1", uses);

        // Probe somewhere strictly inside the exhausted window.
        let ts = (cool_time * percent / 100).clamp(1, cool_time - 1) as i64;
        match guild.update_usage("cmd", "u1", ts, true) {
            Some(Decision::Blocked { seconds_left, .. }) => {
                prop_assert_eq!(seconds_left, cool_time - ts as u64);
            }
            other => prop_assert!(false, "expected blocked, got {:?}", other),
        }

        // At the boundary the window resets instead of blocking.
        let decision = guild.update_usage("cmd", "u1", cool_time as i64, false);
        prop_assert!(decision.unwrap().is_allowed());
    }
}
