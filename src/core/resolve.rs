//! 四级值解析：暂存 → 后端存储 → 默认值层级 → 目录硬编码默认值

use crate::core::ledger::StagingLedger;
use crate::core::store::ValueStore;
use crate::core::value::normalize_bool;
use crate::models::{OptionDefinition, OptionPath};

pub fn resolve(
    option: &OptionDefinition,
    page_id: &str,
    group_id: &str,
    ledger: &StagingLedger,
    store: &ValueStore,
) -> String {
    let path = OptionPath::new(page_id, group_id, &option.id);
    if let Some(entry) = ledger.get(&path) {
        return entry.display_value.clone();
    }

    let stored = match option.command_name() {
        Some(command) => store.command_value(command).map(|raw| normalize_bool(option, raw)),
        None => store.structured_value(&path).map(str::to_string),
    };
    stored.unwrap_or_else(|| default_for(option, page_id, group_id, store))
}

/// 仅第 3、4 级；reset 与 healing 共用
pub fn default_for(option: &OptionDefinition, page_id: &str, group_id: &str, store: &ValueStore) -> String {
    store
        .default_value(page_id, group_id, &option.id)
        .map(str::to_string)
        .unwrap_or_else(|| option.default_value.clone())
}
