use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::RwLock;

use crate::config::GamePaths;
use crate::error::{EditorError, Result};
use crate::models::{DefaultsMap, OptionsSnapshot, PendingChange, ResetEntry, StorageKind};
use crate::storage::OptionsBackend;

#[derive(Debug, Default)]
struct MemoryState {
    defaults: DefaultsMap,
    snapshot: OptionsSnapshot,
    saved_batches: Vec<Vec<PendingChange>>,
    reset_batches: Vec<Vec<ResetEntry>>,
}

/// 内存后端：测试用，也在找不到游戏目录时兜底
#[derive(Debug, Default)]
pub struct MemoryBackend {
    state: RwLock<MemoryState>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(defaults: DefaultsMap, snapshot: OptionsSnapshot) -> Self {
        Self {
            state: RwLock::new(MemoryState {
                defaults,
                snapshot,
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    /// 故障注入：之后的读调用全部失败
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// 故障注入：之后的写调用全部失败
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub async fn snapshot(&self) -> OptionsSnapshot {
        self.state.read().await.snapshot.clone()
    }

    pub async fn set_command_value(&self, command: &str, value: &str) {
        self.state
            .write()
            .await
            .snapshot
            .command_values
            .insert(command.to_string(), value.to_string());
    }

    pub async fn set_structured_value(&self, path: &str, value: &str) {
        self.state
            .write()
            .await
            .snapshot
            .structured_values
            .insert(path.to_string(), value.to_string());
    }

    /// 所有成功提交的 save_options 批次
    pub async fn saved_batches(&self) -> Vec<Vec<PendingChange>> {
        self.state.read().await.saved_batches.clone()
    }

    pub async fn reset_batches(&self) -> Vec<Vec<ResetEntry>> {
        self.state.read().await.reset_batches.clone()
    }

    fn check_reads(&self) -> Result<()> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(EditorError::Backend("memory backend: reads disabled".to_string()));
        }
        Ok(())
    }

    fn check_writes(&self) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(EditorError::Backend("memory backend: writes disabled".to_string()));
        }
        Ok(())
    }
}

fn apply(snapshot: &mut OptionsSnapshot, path: &str, value: &str, storage: &StorageKind) {
    match storage {
        StorageKind::Structured => {
            snapshot
                .structured_values
                .insert(path.to_string(), value.to_string());
        }
        StorageKind::Command { command } => {
            snapshot
                .command_values
                .insert(command.clone(), value.to_string());
        }
    }
}

impl OptionsBackend for MemoryBackend {
    async fn get_all_defaults(&self) -> Result<DefaultsMap> {
        self.check_reads()?;
        Ok(self.state.read().await.defaults.clone())
    }

    async fn get_options(&self) -> Result<OptionsSnapshot> {
        self.check_reads()?;
        Ok(self.state.read().await.snapshot.clone())
    }

    async fn save_options(&self, changes: Vec<PendingChange>) -> Result<()> {
        self.check_writes()?;
        let mut state = self.state.write().await;
        for change in &changes {
            apply(
                &mut state.snapshot,
                change.path.as_str(),
                &change.value,
                &change.storage,
            );
        }
        state.saved_batches.push(changes);
        Ok(())
    }

    async fn reset_options_to_defaults(&self, options: Vec<ResetEntry>) -> Result<()> {
        self.check_writes()?;
        let mut state = self.state.write().await;
        for entry in &options {
            apply(
                &mut state.snapshot,
                entry.path.as_str(),
                &entry.default_value,
                &entry.storage,
            );
        }
        state.reset_batches.push(options);
        Ok(())
    }

    async fn get_game_paths(&self) -> Result<GamePaths> {
        Err(EditorError::Paths("memory backend has no game directory".to_string()))
    }

    async fn reset_user_ltx(&self) -> Result<()> {
        self.check_writes()?;
        self.state.write().await.snapshot.command_values.clear();
        Ok(())
    }

    async fn clear_shader_cache(&self) -> Result<u64> {
        self.check_writes()?;
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::OptionPath;

    #[tokio::test]
    async fn test_save_applies_to_both_stores() {
        let backend = MemoryBackend::new();
        backend
            .save_options(vec![
                PendingChange {
                    path: OptionPath::new("video", "basic", "fov"),
                    value: "90".to_string(),
                    storage: StorageKind::Command {
                        command: "fov".to_string(),
                    },
                },
                PendingChange {
                    path: OptionPath::new("gameplay", "general", "max_tasks"),
                    value: "4".to_string(),
                    storage: StorageKind::Structured,
                },
            ])
            .await
            .unwrap();

        let snap = backend.get_options().await.unwrap();
        assert_eq!(snap.command_values["fov"], "90");
        assert_eq!(snap.structured_values["gameplay/general/max_tasks"], "4");
        assert_eq!(backend.saved_batches().await.len(), 1);
    }

    #[tokio::test]
    async fn test_failed_write_changes_nothing() {
        let backend = MemoryBackend::new();
        backend.set_fail_writes(true);
        let err = backend
            .save_options(vec![PendingChange {
                path: OptionPath::new("video", "basic", "fov"),
                value: "90".to_string(),
                storage: StorageKind::Command {
                    command: "fov".to_string(),
                },
            }])
            .await
            .unwrap_err();
        assert!(matches!(err, EditorError::Backend(_)));
        assert!(backend.snapshot().await.command_values.is_empty());
        assert!(backend.saved_batches().await.is_empty());
    }

    #[tokio::test]
    async fn test_reset_user_ltx_clears_commands_only() {
        let backend = MemoryBackend::new();
        backend.set_command_value("fov", "90").await;
        backend.set_structured_value("gameplay/general/max_tasks", "4").await;

        backend.reset_user_ltx().await.unwrap();
        let snap = backend.snapshot().await;
        assert!(snap.command_values.is_empty());
        assert_eq!(snap.structured_values["gameplay/general/max_tasks"], "4");
        assert!(matches!(
            backend.get_game_paths().await,
            Err(EditorError::Paths(_))
        ));
    }
}
