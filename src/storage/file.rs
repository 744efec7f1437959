use std::path::{Path, PathBuf};

use crate::config::GamePaths;
use crate::error::Result;
use crate::models::{DefaultsMap, OptionsSnapshot, PendingChange, ResetEntry, StorageKind};
use crate::storage::ltx::LtxFile;
use crate::storage::user_ltx::UserLtx;
use crate::storage::OptionsBackend;

/// axr_options.ltx 中存放选项的 section
const OPTIONS_SECTION: &str = "options";

/// 文件后端：结构化存储 = axr_options.ltx，命令存储 = user.ltx，
/// 默认值 = plugins/defaults/includes.ltx
#[derive(Debug, Clone)]
pub struct FileBackend {
    game_root: PathBuf,
    gamedata: PathBuf,
    appdata: PathBuf,
}

impl FileBackend {
    pub fn new(paths: &GamePaths) -> Self {
        Self {
            game_root: paths.game_root.clone(),
            gamedata: paths.gamedata.clone(),
            appdata: paths.appdata.clone(),
        }
    }

    fn axr_options_path(&self) -> PathBuf {
        self.gamedata.join("configs").join("axr_options.ltx")
    }

    fn user_ltx_path(&self) -> PathBuf {
        self.appdata.join("user.ltx")
    }

    fn defaults_path(&self) -> PathBuf {
        self.gamedata
            .join("configs")
            .join("plugins")
            .join("defaults")
            .join("includes.ltx")
    }

    /// 文件不存在视为首次启动，返回空状态
    fn load_axr_options(&self) -> Result<LtxFile> {
        let path = self.axr_options_path();
        if !path.exists() {
            return Ok(LtxFile::new());
        }
        LtxFile::parse(&path)
    }

    /// user.ltx 缺失则退回 user_default.ltx。读写共用同一基线，
    /// 首次保存后 user.ltx 仍包含全部基线命令。
    fn load_user_ltx(&self) -> Result<UserLtx> {
        let path = self.user_ltx_path();
        if path.exists() {
            return Ok(UserLtx::parse(&std::fs::read_to_string(&path)?));
        }
        let fallback = self.user_default_path();
        if !fallback.exists() {
            tracing::info!("user.ltx 与 user_default.ltx 均不存在，命令存储为空");
            return Ok(UserLtx::new());
        }
        let ltx = UserLtx::parse(&std::fs::read_to_string(&fallback)?);
        tracing::info!(commands = ltx.len(), "user.ltx 不存在，使用 user_default.ltx");
        Ok(ltx)
    }

    fn user_default_path(&self) -> PathBuf {
        self.game_root.join("user_default.ltx")
    }

    fn shaders_cache_path(&self) -> PathBuf {
        self.appdata.join("shaders_cache")
    }

    /// 把一批写入应用到两个文件
    fn apply_batch<'a>(&self, batch: impl Iterator<Item = (&'a str, &'a str, &'a StorageKind)>) -> Result<()> {
        let mut axr = self.load_axr_options()?;
        let mut user = self.load_user_ltx()?;
        let mut axr_dirty = false;
        let mut user_dirty = false;

        for (path, value, storage) in batch {
            match storage {
                StorageKind::Structured => {
                    axr.set(OPTIONS_SECTION, path, Some(value));
                    axr_dirty = true;
                }
                StorageKind::Command { command } => {
                    user.set(command, value);
                    user_dirty = true;
                }
            }
        }

        let mut files = Vec::with_capacity(2);
        if axr_dirty {
            files.push((self.axr_options_path(), axr.render()));
        }
        if user_dirty {
            files.push((self.user_ltx_path(), user.render()));
        }
        replace_all(&files)
    }
}

/// 一个待替换的目标文件：临时文件已写好，原内容留作回滚
struct StagedFile<'a> {
    path: &'a Path,
    tmp: PathBuf,
    previous: Option<String>,
}

/// 所有临时文件写成功后才开始 rename；任一 rename 失败时
/// 已替换的文件恢复为原内容，整批要么全部可见要么都不变
fn replace_all(files: &[(PathBuf, String)]) -> Result<()> {
    let mut staged: Vec<StagedFile<'_>> = Vec::with_capacity(files.len());
    for (path, content) in files {
        match stage_file(path, content) {
            Ok(file) => staged.push(file),
            Err(e) => {
                remove_tmp_files(&staged);
                return Err(e);
            }
        }
    }

    for (i, file) in staged.iter().enumerate() {
        if let Err(e) = std::fs::rename(&file.tmp, file.path) {
            tracing::error!("替换 {:?} 失败，回滚已写入的文件: {}", file.path, e);
            restore(&staged[..i]);
            remove_tmp_files(&staged[i..]);
            return Err(e.into());
        }
    }

    for (path, content) in files {
        tracing::debug!("写入 {:?} ({} bytes)", path, content.len());
    }
    Ok(())
}

fn stage_file<'a>(path: &'a Path, content: &str) -> Result<StagedFile<'a>> {
    if let Some(parent) = path.parent() {
        if !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let previous = if path.exists() {
        Some(std::fs::read_to_string(path)?)
    } else {
        None
    };
    let tmp = path.with_extension("ltx.tmp");
    std::fs::write(&tmp, content)?;
    Ok(StagedFile { path, tmp, previous })
}

fn restore(replaced: &[StagedFile<'_>]) {
    for file in replaced {
        let result = match &file.previous {
            Some(content) => std::fs::write(file.path, content),
            None => std::fs::remove_file(file.path),
        };
        if let Err(e) = result {
            tracing::error!("回滚 {:?} 失败: {}", file.path, e);
        }
    }
}

fn remove_tmp_files(staged: &[StagedFile<'_>]) {
    for file in staged {
        let _ = std::fs::remove_file(&file.tmp);
    }
}

/// 递归统计目录内文件大小
fn dir_size(path: &Path) -> Result<u64> {
    let mut total = 0;
    for entry in std::fs::read_dir(path)? {
        let entry = entry?;
        let file_type = entry.file_type()?;
        if file_type.is_dir() {
            total += dir_size(&entry.path())?;
        } else {
            total += entry.metadata()?.len();
        }
    }
    Ok(total)
}

impl OptionsBackend for FileBackend {
    async fn get_all_defaults(&self) -> Result<DefaultsMap> {
        let path = self.defaults_path();
        if !path.exists() {
            tracing::warn!("默认值文件不存在 {:?}，使用硬编码默认值", path);
            return Ok(DefaultsMap::new());
        }
        let ltx = LtxFile::parse(&path)?;
        let mut defaults = DefaultsMap::new();
        for (section, entries) in ltx.sections() {
            let values: std::collections::HashMap<String, String> = entries
                .iter()
                .filter_map(|(k, v)| v.as_ref().map(|v| (k.clone(), v.clone())))
                .collect();
            if !values.is_empty() {
                defaults.insert(section.to_string(), values);
            }
        }
        tracing::info!(sections = defaults.len(), "默认值加载完成");
        Ok(defaults)
    }

    async fn get_options(&self) -> Result<OptionsSnapshot> {
        let axr = self.load_axr_options()?;
        let user = self.load_user_ltx()?;

        let structured_values = axr
            .section(OPTIONS_SECTION)
            .map(|entries| {
                entries
                    .iter()
                    .filter_map(|(k, v)| v.as_ref().map(|v| (k.clone(), v.clone())))
                    .collect()
            })
            .unwrap_or_default();

        Ok(OptionsSnapshot {
            structured_values,
            command_values: user.to_map(),
        })
    }

    async fn save_options(&self, changes: Vec<PendingChange>) -> Result<()> {
        tracing::info!(changes = changes.len(), "save_options");
        self.apply_batch(
            changes
                .iter()
                .map(|c| (c.path.as_str(), c.value.as_str(), &c.storage)),
        )
    }

    async fn reset_options_to_defaults(&self, options: Vec<ResetEntry>) -> Result<()> {
        tracing::info!(options = options.len(), "reset_options_to_defaults");
        self.apply_batch(
            options
                .iter()
                .map(|e| (e.path.as_str(), e.default_value.as_str(), &e.storage)),
        )
    }

    async fn get_game_paths(&self) -> Result<GamePaths> {
        Ok(GamePaths {
            game_root: self.game_root.clone(),
            gamedata: self.gamedata.clone(),
            appdata: self.appdata.clone(),
        })
    }

    /// 删除 user.ltx，游戏下次启动时重新生成
    async fn reset_user_ltx(&self) -> Result<()> {
        let path = self.user_ltx_path();
        if !path.exists() {
            tracing::info!("user.ltx 不存在，无需重置");
            return Ok(());
        }
        std::fs::remove_file(&path)?;
        tracing::info!("已删除 {:?}", path);
        Ok(())
    }

    async fn clear_shader_cache(&self) -> Result<u64> {
        let dir = self.shaders_cache_path();
        if !dir.exists() {
            return Ok(0);
        }
        let bytes = dir_size(&dir)?;
        std::fs::remove_dir_all(&dir)?;
        tracing::info!(bytes, "着色器缓存已清除 {:?}", dir);
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EditorError;
    use crate::models::OptionPath;
    use tempfile::TempDir;

    fn setup(tmp: &TempDir) -> FileBackend {
        let root = tmp.path();
        std::fs::create_dir_all(root.join("gamedata/configs/plugins/defaults")).unwrap();
        std::fs::create_dir_all(root.join("appdata")).unwrap();
        FileBackend::new(&GamePaths::from_root(root))
    }

    #[tokio::test]
    async fn test_empty_install() {
        let tmp = TempDir::new().unwrap();
        let backend = setup(&tmp);

        assert!(backend.get_all_defaults().await.unwrap().is_empty());
        let snap = backend.get_options().await.unwrap();
        assert!(snap.structured_values.is_empty());
        assert!(snap.command_values.is_empty());
    }

    #[tokio::test]
    async fn test_defaults_from_includes() {
        let tmp = TempDir::new().unwrap();
        let backend = setup(&tmp);
        let dir = tmp.path().join("gamedata/configs/plugins/defaults");
        std::fs::write(dir.join("includes.ltx"), "#include \"defaults_*.ltx\"\n").unwrap();
        std::fs::write(
            dir.join("defaults_video.ltx"),
            "[video_basic]\nfov = 80\nempty =\n[blank]\nnothing =\n",
        )
        .unwrap();

        let defaults = backend.get_all_defaults().await.unwrap();
        assert_eq!(defaults["video_basic"]["fov"], "80");
        assert!(!defaults["video_basic"].contains_key("empty"));
        assert!(!defaults.contains_key("blank"));
    }

    #[tokio::test]
    async fn test_save_round_trip_and_preserve_other_sections() {
        let tmp = TempDir::new().unwrap();
        let backend = setup(&tmp);
        std::fs::write(
            tmp.path().join("gamedata/configs/axr_options.ltx"),
            "[meta]\nversion = 3\n[options]\ngameplay/general/max_tasks = 2\n",
        )
        .unwrap();
        std::fs::write(tmp.path().join("appdata/user.ltx"), "; user settings\nfov 75\n").unwrap();

        backend
            .save_options(vec![
                PendingChange {
                    path: OptionPath::new("gameplay", "general", "max_tasks"),
                    value: "5".to_string(),
                    storage: StorageKind::Structured,
                },
                PendingChange {
                    path: OptionPath::new("video", "advanced/main", "v_sync"),
                    value: "on".to_string(),
                    storage: StorageKind::Command {
                        command: "rs_v_sync".to_string(),
                    },
                },
            ])
            .await
            .unwrap();

        let snap = backend.get_options().await.unwrap();
        assert_eq!(snap.structured_values["gameplay/general/max_tasks"], "5");
        assert_eq!(snap.command_values["rs_v_sync"], "on");
        assert_eq!(snap.command_values["fov"], "75");

        let axr = std::fs::read_to_string(tmp.path().join("gamedata/configs/axr_options.ltx")).unwrap();
        assert!(axr.contains("[meta]"));
        let user = std::fs::read_to_string(tmp.path().join("appdata/user.ltx")).unwrap();
        assert!(user.starts_with("; user settings\n"));
        assert!(!tmp.path().join("appdata/user.ltx.tmp").exists());
    }

    #[tokio::test]
    async fn test_user_default_fallback() {
        let tmp = TempDir::new().unwrap();
        let backend = setup(&tmp);
        std::fs::write(tmp.path().join("user_default.ltx"), "rs_v_sync on\n").unwrap();

        let snap = backend.get_options().await.unwrap();
        assert_eq!(snap.command_values["rs_v_sync"], "on");
    }

    #[tokio::test]
    async fn test_save_after_fallback_keeps_baseline_commands() {
        let tmp = TempDir::new().unwrap();
        let backend = setup(&tmp);
        std::fs::write(tmp.path().join("user_default.ltx"), "rs_v_sync off\nfov 90\n").unwrap();

        backend
            .save_options(vec![PendingChange {
                path: OptionPath::new("video", "advanced/main", "v_sync"),
                value: "on".to_string(),
                storage: StorageKind::Command {
                    command: "rs_v_sync".to_string(),
                },
            }])
            .await
            .unwrap();

        let snap = backend.get_options().await.unwrap();
        assert_eq!(snap.command_values["rs_v_sync"], "on");
        assert_eq!(snap.command_values["fov"], "90");
        assert!(tmp.path().join("appdata/user.ltx").exists());
        let baseline = std::fs::read_to_string(tmp.path().join("user_default.ltx")).unwrap();
        assert_eq!(baseline, "rs_v_sync off\nfov 90\n");
    }

    #[tokio::test]
    async fn test_failed_command_write_leaves_structured_store_untouched() {
        let tmp = TempDir::new().unwrap();
        let backend = setup(&tmp);
        let axr_path = tmp.path().join("gamedata/configs/axr_options.ltx");
        let original = "[options]\ngameplay/general/max_tasks = 2\n";
        std::fs::write(&axr_path, original).unwrap();
        // 临时文件位置被目录占用，user.ltx 写入必然失败
        std::fs::create_dir_all(tmp.path().join("appdata/user.ltx.tmp")).unwrap();

        let result = backend
            .save_options(vec![
                PendingChange {
                    path: OptionPath::new("gameplay", "general", "max_tasks"),
                    value: "5".to_string(),
                    storage: StorageKind::Structured,
                },
                PendingChange {
                    path: OptionPath::new("video", "basic", "fov"),
                    value: "90".to_string(),
                    storage: StorageKind::Command {
                        command: "fov".to_string(),
                    },
                },
            ])
            .await;

        assert!(matches!(result, Err(EditorError::IoError(_))));
        assert_eq!(std::fs::read_to_string(&axr_path).unwrap(), original);
        assert!(!tmp.path().join("gamedata/configs/axr_options.ltx.tmp").exists());
        assert!(!tmp.path().join("appdata/user.ltx").exists());
    }

    #[tokio::test]
    async fn test_reset_user_ltx_deletes_file() {
        let tmp = TempDir::new().unwrap();
        let backend = setup(&tmp);
        std::fs::write(tmp.path().join("appdata/user.ltx"), "fov 75\n").unwrap();
        std::fs::write(tmp.path().join("user_default.ltx"), "fov 67\n").unwrap();

        backend.reset_user_ltx().await.unwrap();
        assert!(!tmp.path().join("appdata/user.ltx").exists());
        // 之后读取退回 user_default.ltx
        let snap = backend.get_options().await.unwrap();
        assert_eq!(snap.command_values["fov"], "67");

        // 文件已不存在时也成功
        backend.reset_user_ltx().await.unwrap();
    }

    #[tokio::test]
    async fn test_clear_shader_cache_reports_bytes() {
        let tmp = TempDir::new().unwrap();
        let backend = setup(&tmp);
        assert_eq!(backend.clear_shader_cache().await.unwrap(), 0);

        let cache = tmp.path().join("appdata/shaders_cache");
        std::fs::create_dir_all(cache.join("r4")).unwrap();
        std::fs::write(cache.join("a.bin"), [0u8; 100]).unwrap();
        std::fs::write(cache.join("r4/b.bin"), [0u8; 28]).unwrap();

        assert_eq!(backend.clear_shader_cache().await.unwrap(), 128);
        assert!(!cache.exists());
        assert!(tmp.path().join("appdata").exists());
    }

    #[tokio::test]
    async fn test_game_paths() {
        let tmp = TempDir::new().unwrap();
        let backend = setup(&tmp);
        let paths = backend.get_game_paths().await.unwrap();
        assert_eq!(paths, GamePaths::from_root(tmp.path()));
    }

    #[tokio::test]
    async fn test_reset_writes_defaults() {
        let tmp = TempDir::new().unwrap();
        let backend = setup(&tmp);
        std::fs::write(tmp.path().join("appdata/user.ltx"), "snd_volume_eff 0.2\n").unwrap();

        backend
            .reset_options_to_defaults(vec![ResetEntry {
                path: OptionPath::new("sound", "general", "master_volume"),
                default_value: "1.0".to_string(),
                storage: StorageKind::Command {
                    command: "snd_volume_eff".to_string(),
                },
            }])
            .await
            .unwrap();

        let snap = backend.get_options().await.unwrap();
        assert_eq!(snap.command_values["snd_volume_eff"], "1.0");
        // 没有结构化条目时不创建 axr_options.ltx
        assert!(!tmp.path().join("gamedata/configs/axr_options.ltx").exists());
    }
}
