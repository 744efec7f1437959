use std::collections::BTreeMap;

use crate::core::value::encode_for_storage;
use crate::models::{OptionDefinition, OptionPath, PendingChange, StorageKind};

/// 暂存条目：`change` 是提交给后端的存储编码值，
/// `display_value` 是用户暂存时的原始 UI 值，解析时原样返回。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedEntry {
    pub change: PendingChange,
    pub display_value: String,
}

/// 未提交修改的账本，按路径唯一，同一路径后写覆盖
#[derive(Debug, Clone, Default)]
pub struct StagingLedger {
    entries: BTreeMap<OptionPath, StagedEntry>,
}

impl StagingLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stage(&mut self, option: &OptionDefinition, page_id: &str, group_id: &str, value: &str) {
        let path = OptionPath::new(page_id, group_id, &option.id);
        let change = PendingChange {
            path: path.clone(),
            value: encode_for_storage(option, value),
            storage: StorageKind::from(&option.storage),
        };
        self.entries.insert(
            path,
            StagedEntry {
                change,
                display_value: value.to_string(),
            },
        );
    }

    pub fn get(&self, path: &OptionPath) -> Option<&StagedEntry> {
        self.entries.get(path)
    }

    /// 写同一命令的暂存条目（按路径顺序取第一个）
    pub fn for_command(&self, command: &str) -> Option<&StagedEntry> {
        self.entries
            .values()
            .find(|e| e.change.command() == Some(command))
    }

    pub fn changes(&self) -> impl Iterator<Item = &PendingChange> {
        self.entries.values().map(|e| &e.change)
    }

    pub fn commands(&self) -> impl Iterator<Item = &str> {
        self.entries.values().filter_map(|e| e.change.command())
    }

    /// 删除某页的所有条目，返回删除数量
    pub fn remove_page(&mut self, page_id: &str) -> usize {
        let before = self.entries.len();
        self.entries.retain(|path, _| !path.in_page(page_id));
        before - self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_encodes_and_keeps_display() {
        let mut ledger = StagingLedger::new();
        let opt = OptionDefinition::toggle("v_sync", "false").command("rs_v_sync");
        ledger.stage(&opt, "video", "advanced/main", "true");

        let entry = ledger
            .get(&OptionPath::new("video", "advanced/main", "v_sync"))
            .unwrap();
        assert_eq!(entry.change.value, "on");
        assert_eq!(entry.display_value, "true");
        assert_eq!(entry.change.command(), Some("rs_v_sync"));
    }

    #[test]
    fn test_last_write_wins() {
        let mut ledger = StagingLedger::new();
        let opt = OptionDefinition::range("fov", "75", 5.0, 140.0, 1.0).command("fov");
        ledger.stage(&opt, "video", "basic", "80");
        ledger.stage(&opt, "video", "basic", "90");
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.changes().next().unwrap().value, "90");
    }

    #[test]
    fn test_remove_page_uses_prefix_boundary() {
        let mut ledger = StagingLedger::new();
        let opt = OptionDefinition::text("name", "");
        ledger.stage(&opt, "video", "basic", "a");
        ledger.stage(&opt, "video_extra", "basic", "b");
        ledger.stage(&opt, "sound", "general", "c");

        assert_eq!(ledger.remove_page("video"), 1);
        assert_eq!(ledger.len(), 2);
        assert!(ledger.get(&OptionPath::new("video_extra", "basic", "name")).is_some());
    }

    #[test]
    fn test_for_command() {
        let mut ledger = StagingLedger::new();
        let opt = OptionDefinition::list("lighting_style", "st_opt_dynamic", &[])
            .command("r4_lighting_style");
        assert!(ledger.for_command("r4_lighting_style").is_none());
        ledger.stage(&opt, "video", "basic", "st_opt_static");
        assert_eq!(
            ledger.for_command("r4_lighting_style").unwrap().change.value,
            "st_opt_static"
        );
        assert_eq!(ledger.commands().collect::<Vec<_>>(), vec!["r4_lighting_style"]);
    }
}
