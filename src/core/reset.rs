use crate::core::resolve::default_for;
use crate::core::store::ValueStore;
use crate::core::value::encode_for_storage;
use crate::models::{OptionPage, OptionPath, ResetEntry, StorageKind};

/// 页内每个携带值的选项一条，默认值按存储目标编码
pub fn build_reset_entries(page: &OptionPage, store: &ValueStore) -> Vec<ResetEntry> {
    page.groups
        .iter()
        .flat_map(|group| {
            group
                .options
                .iter()
                .filter(|o| !o.is_decorative())
                .map(move |option| {
                    let default = default_for(option, &page.id, &group.id, store);
                    ResetEntry {
                        path: OptionPath::new(&page.id, &group.id, &option.id),
                        default_value: encode_for_storage(option, &default),
                        storage: StorageKind::from(&option.storage),
                    }
                })
        })
        .collect()
}
