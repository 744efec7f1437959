//! 可见性谓词求值。环境 = 命令存储 + 暂存中写命令存储的条目。

use std::collections::HashMap;

use crate::core::ledger::StagingLedger;
use crate::core::store::ValueStore;
use crate::core::value::is_truthy;
use crate::models::{OptionDefinition, VisibilityRule};

pub type Environment = HashMap<String, String>;

pub fn effective_environment(store: &ValueStore, ledger: &StagingLedger) -> Environment {
    let mut env = store.commands().clone();
    for change in ledger.changes() {
        if let Some(command) = change.command() {
            env.insert(command.to_string(), change.value.clone());
        }
    }
    env
}

impl VisibilityRule {
    /// 缺失的命令：Equals 为假，NotEquals 为真，Truthy 为假
    pub fn evaluate(&self, env: &Environment) -> bool {
        match self {
            VisibilityRule::Equals { command, value } => env.get(command) == Some(value),
            VisibilityRule::NotEquals { command, value } => env.get(command) != Some(value),
            VisibilityRule::Truthy { command } => env.get(command).is_some_and(|v| is_truthy(v)),
            VisibilityRule::All(rules) => rules.iter().all(|r| r.evaluate(env)),
            VisibilityRule::Any(rules) => rules.iter().any(|r| r.evaluate(env)),
            VisibilityRule::Not(rule) => !rule.evaluate(env),
        }
    }
}

pub fn is_visible(option: &OptionDefinition, env: &Environment) -> bool {
    option.visible_when.as_ref().map_or(true, |rule| rule.evaluate(env))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::OptionsSnapshot;

    fn env(pairs: &[(&str, &str)]) -> Environment {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_missing_command_semantics() {
        let e = env(&[]);
        assert!(!VisibilityRule::equals("a", "x").evaluate(&e));
        assert!(VisibilityRule::not_equals("a", "x").evaluate(&e));
        assert!(!VisibilityRule::truthy("a").evaluate(&e));
    }

    #[test]
    fn test_combinators() {
        let e = env(&[("r2_sunshafts_mode", "volumetric"), ("r2_mblur_enabled", "on")]);
        let rule = VisibilityRule::All(vec![
            VisibilityRule::not_equals("r4_lighting_style", "st_opt_static"),
            VisibilityRule::not_equals("r2_sunshafts_mode", "off"),
        ]);
        assert!(rule.evaluate(&e));
        assert!(VisibilityRule::truthy("r2_mblur_enabled").evaluate(&e));
        assert!(!VisibilityRule::Not(Box::new(rule.clone())).evaluate(&e));
        assert!(VisibilityRule::Any(vec![
            VisibilityRule::equals("r2_sunshafts_mode", "off"),
            VisibilityRule::truthy("r2_mblur_enabled"),
        ])
        .evaluate(&e));
    }

    #[test]
    fn test_environment_overlays_staged_commands() {
        let mut store = ValueStore::new();
        let mut snapshot = OptionsSnapshot::default();
        snapshot
            .command_values
            .insert("r2_mblur_enabled".to_string(), "off".to_string());
        store.replace_snapshot(snapshot);

        let mut ledger = StagingLedger::new();
        let toggle = OptionDefinition::toggle("mblur_enable", "false").command("r2_mblur_enabled");
        ledger.stage(&toggle, "video", "advanced/main", "true");
        ledger.stage(&OptionDefinition::text("nickname", ""), "gameplay", "general", "x");

        let e = effective_environment(&store, &ledger);
        assert_eq!(e["r2_mblur_enabled"], "on");
        assert_eq!(e.len(), 1);

        let mblur = OptionDefinition::range("mblur", "0.4", 0.0, 1.0, 0.05)
            .visible_when(VisibilityRule::truthy("r2_mblur_enabled"));
        assert!(is_visible(&mblur, &e));
        assert!(is_visible(&OptionDefinition::text("always", ""), &e));
    }
}
