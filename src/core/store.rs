use std::collections::HashMap;

use crate::models::{DefaultsMap, OptionPath, OptionsSnapshot};

/// 默认值层级的 section 名：`{page}_{group}`
pub fn defaults_section(page_id: &str, group_id: &str) -> String {
    format!("{}_{}", page_id, group_id)
}

/// 后端状态的本地副本。每次刷新整体替换，不做部分合并。
#[derive(Debug, Clone, Default)]
pub struct ValueStore {
    structured: HashMap<String, String>,
    commands: HashMap<String, String>,
    defaults: DefaultsMap,
}

impl ValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replace_snapshot(&mut self, snapshot: OptionsSnapshot) {
        self.structured = snapshot.structured_values;
        self.commands = snapshot.command_values;
    }

    pub fn replace_defaults(&mut self, defaults: DefaultsMap) {
        self.defaults = defaults;
    }

    pub fn structured_value(&self, path: &OptionPath) -> Option<&str> {
        self.structured.get(path.as_str()).map(String::as_str)
    }

    pub fn command_value(&self, command: &str) -> Option<&str> {
        self.commands.get(command).map(String::as_str)
    }

    pub fn has_command(&self, command: &str) -> bool {
        self.commands.contains_key(command)
    }

    pub fn commands(&self) -> &HashMap<String, String> {
        &self.commands
    }

    pub fn default_value(&self, page_id: &str, group_id: &str, option_id: &str) -> Option<&str> {
        self.defaults
            .get(&defaults_section(page_id, group_id))
            .and_then(|section| section.get(option_id))
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replace_is_wholesale() {
        let mut store = ValueStore::new();
        let mut first = OptionsSnapshot::default();
        first.command_values.insert("fov".to_string(), "75".to_string());
        first.command_values.insert("hud_fov".to_string(), "0.4".to_string());
        store.replace_snapshot(first);

        let mut second = OptionsSnapshot::default();
        second.command_values.insert("fov".to_string(), "90".to_string());
        store.replace_snapshot(second);

        assert_eq!(store.command_value("fov"), Some("90"));
        assert!(!store.has_command("hud_fov"));
    }

    #[test]
    fn test_defaults_section_lookup() {
        let mut store = ValueStore::new();
        let mut defaults = DefaultsMap::new();
        defaults.insert(
            "video_advanced/main".to_string(),
            HashMap::from([("v_sync".to_string(), "true".to_string())]),
        );
        store.replace_defaults(defaults);

        assert_eq!(store.default_value("video", "advanced/main", "v_sync"), Some("true"));
        assert_eq!(store.default_value("video", "basic", "v_sync"), None);
    }
}
