use crate::core::ledger::StagingLedger;
use crate::core::store::ValueStore;
use crate::schema::catalog::{LIGHTING_STYLE_COMMAND, LIGHTING_STYLE_DEFAULT};
use crate::schema::presets::{self, LightingMode};
use crate::schema::{OptionRef, Schema};

/// 光照模式：暂存值 → 命令存储 → 硬编码默认值
pub fn lighting_mode(ledger: &StagingLedger, store: &ValueStore) -> LightingMode {
    let value = ledger
        .for_command(LIGHTING_STYLE_COMMAND)
        .map(|e| e.change.value.as_str())
        .or_else(|| store.command_value(LIGHTING_STYLE_COMMAND))
        .unwrap_or(LIGHTING_STYLE_DEFAULT);
    LightingMode::from_value(value)
}

/// 预设表中能在目录里找到的条目；找不到的命令跳过
pub fn preset_targets<'a>(
    schema: &'a Schema,
    name: &str,
    mode: LightingMode,
) -> Vec<(OptionRef<'a>, &'static str)> {
    presets::table(name, mode)
        .iter()
        .filter_map(|&(command, value)| match schema.find_by_command(command) {
            Some(r) => Some((r, value)),
            None => {
                tracing::debug!(command, "预设命令不在目录中，跳过");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{OptionDefinition, OptionsSnapshot};
    use crate::schema::catalog::{self, LIGHTING_STYLE_STATIC};

    #[test]
    fn test_lighting_mode_precedence() {
        let mut ledger = StagingLedger::new();
        let mut store = ValueStore::new();
        assert_eq!(lighting_mode(&ledger, &store), LightingMode::Dynamic);

        let mut snapshot = OptionsSnapshot::default();
        snapshot
            .command_values
            .insert(LIGHTING_STYLE_COMMAND.to_string(), LIGHTING_STYLE_STATIC.to_string());
        store.replace_snapshot(snapshot);
        assert_eq!(lighting_mode(&ledger, &store), LightingMode::Static);

        let opt = OptionDefinition::list("lighting_style", LIGHTING_STYLE_DEFAULT, &[])
            .command(LIGHTING_STYLE_COMMAND);
        ledger.stage(&opt, "video", "basic", LIGHTING_STYLE_DEFAULT);
        assert_eq!(lighting_mode(&ledger, &store), LightingMode::Dynamic);
    }

    #[test]
    fn test_preset_targets_cover_table() {
        let schema = catalog::builtin();
        let targets = preset_targets(&schema, "high", LightingMode::Dynamic);
        assert_eq!(targets.len(), presets::table("high", LightingMode::Dynamic).len());
        assert!(targets
            .iter()
            .all(|(r, _)| r.option.command_name().is_some()));
    }
}
