use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{EditorError, Result};

/// 环境变量覆盖游戏根目录（开发/测试用）
pub const GAME_ROOT_ENV: &str = "OWL_GAME_ROOT";

/// 编辑器配置，JSON 文件放在启动器目录
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EditorConfig {
    #[serde(default)]
    pub game_root: Option<String>,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
    /// 设置后 HTTP 接口要求 X-API-Key
    #[serde(default)]
    pub api_token: Option<String>,
    #[serde(default = "default_preset")]
    pub default_preset: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_listen_addr() -> String {
    "127.0.0.1:3000".to_string()
}

fn default_preset() -> String {
    "medium".to_string()
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            game_root: None,
            log_level: default_log_level(),
            listen_addr: default_listen_addr(),
            api_token: None,
            default_preset: default_preset(),
        }
    }
}

impl EditorConfig {
    pub const FILENAME: &'static str = "editor_config.json";

    /// 文件不存在返回默认配置；文件损坏记录警告并返回默认配置
    pub fn load(dir: &Path) -> Self {
        let path = dir.join(Self::FILENAME);
        if !path.exists() {
            return Self::default();
        }
        match std::fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str::<EditorConfig>(&content) {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!("配置文件损坏，使用默认配置: {}", e);
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!("无法读取配置文件，使用默认配置: {}", e);
                Self::default()
            }
        }
    }

    pub fn save(&self, dir: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        if !dir.exists() {
            std::fs::create_dir_all(dir)?;
        }
        std::fs::write(dir.join(Self::FILENAME), json)?;
        Ok(())
    }

    pub fn log_level(&self) -> tracing::Level {
        match self.log_level.to_lowercase().as_str() {
            "trace" => tracing::Level::TRACE,
            "debug" => tracing::Level::DEBUG,
            "warn" => tracing::Level::WARN,
            "error" => tracing::Level::ERROR,
            _ => tracing::Level::INFO,
        }
    }
}

/// 游戏目录布局
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GamePaths {
    pub game_root: PathBuf,
    pub gamedata: PathBuf,
    pub appdata: PathBuf,
}

impl GamePaths {
    pub fn from_root(root: &Path) -> Self {
        Self {
            game_root: root.to_path_buf(),
            gamedata: root.join("gamedata"),
            appdata: root.join("appdata"),
        }
    }

    /// 根目录优先级：环境变量 → 配置 gameRoot → 启动器目录 → 启动器上级目录
    pub fn resolve(config_game_root: Option<&str>, launcher_dir: &Path) -> Result<Self> {
        let env_root = std::env::var(GAME_ROOT_ENV).ok();
        Self::resolve_with(env_root.as_deref(), config_game_root, launcher_dir)
    }

    fn resolve_with(
        env_root: Option<&str>,
        config_game_root: Option<&str>,
        launcher_dir: &Path,
    ) -> Result<Self> {
        if let Some(root) = env_root {
            let path = PathBuf::from(root);
            if path.is_dir() {
                return Ok(Self::from_root(&path));
            }
            return Err(EditorError::Paths(format!(
                "{} is set to '{}' but the directory does not exist",
                GAME_ROOT_ENV, root
            )));
        }

        if let Some(root) = config_game_root.filter(|r| !r.is_empty()) {
            let path = PathBuf::from(root);
            if path.is_dir() {
                return Ok(Self::from_root(&path));
            }
            return Err(EditorError::Paths(format!(
                "gameRoot is set to '{}' but the directory does not exist",
                root
            )));
        }

        if launcher_dir.join("gamedata").is_dir() {
            return Ok(Self::from_root(launcher_dir));
        }
        if let Some(parent) = launcher_dir.parent() {
            if parent.join("gamedata").is_dir() {
                return Ok(Self::from_root(parent));
            }
        }

        Err(EditorError::Paths(format!(
            "no gamedata directory near {:?}; set {} or gameRoot",
            launcher_dir, GAME_ROOT_ENV
        )))
    }
}

/// 启动器目录：可执行文件所在目录
pub fn launcher_dir() -> Result<PathBuf> {
    let exe = std::env::current_exe()?;
    exe.parent()
        .map(Path::to_path_buf)
        .ok_or_else(|| EditorError::Paths("executable has no parent directory".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_missing_returns_default() {
        let tmp = TempDir::new().unwrap();
        let config = EditorConfig::load(tmp.path());
        assert_eq!(config, EditorConfig::default());
        assert_eq!(config.log_level(), tracing::Level::INFO);
    }

    #[test]
    fn test_load_malformed_returns_default() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join(EditorConfig::FILENAME), "{not json").unwrap();
        assert_eq!(EditorConfig::load(tmp.path()), EditorConfig::default());
    }

    #[test]
    fn test_save_and_load() {
        let tmp = TempDir::new().unwrap();
        let config = EditorConfig {
            game_root: Some("/games/anomaly".to_string()),
            log_level: "debug".to_string(),
            api_token: Some("secret".to_string()),
            ..Default::default()
        };
        config.save(tmp.path()).unwrap();

        let loaded = EditorConfig::load(tmp.path());
        assert_eq!(loaded, config);
        assert_eq!(loaded.log_level(), tracing::Level::DEBUG);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join(EditorConfig::FILENAME), r#"{"logLevel":"warn"}"#).unwrap();
        let config = EditorConfig::load(tmp.path());
        assert_eq!(config.log_level(), tracing::Level::WARN);
        assert_eq!(config.listen_addr, "127.0.0.1:3000");
        assert_eq!(config.default_preset, "medium");
    }

    #[test]
    fn test_resolve_env_wins() {
        let env_dir = TempDir::new().unwrap();
        let cfg_dir = TempDir::new().unwrap();
        let paths = GamePaths::resolve_with(
            env_dir.path().to_str(),
            cfg_dir.path().to_str(),
            Path::new("/nowhere"),
        )
        .unwrap();
        assert_eq!(paths.game_root, env_dir.path());
        assert_eq!(paths.gamedata, env_dir.path().join("gamedata"));
    }

    #[test]
    fn test_resolve_env_missing_dir_is_error() {
        let err = GamePaths::resolve_with(Some("/definitely/not/here"), None, Path::new("/nowhere"))
            .unwrap_err();
        assert!(matches!(err, EditorError::Paths(_)));
    }

    #[test]
    fn test_resolve_launcher_parent() {
        let tmp = TempDir::new().unwrap();
        std::fs::create_dir_all(tmp.path().join("gamedata")).unwrap();
        std::fs::create_dir_all(tmp.path().join("launcher")).unwrap();

        let paths = GamePaths::resolve_with(None, Some(""), &tmp.path().join("launcher")).unwrap();
        assert_eq!(paths.game_root, tmp.path());
    }

    #[test]
    fn test_resolve_nothing_found() {
        let tmp = TempDir::new().unwrap();
        let err = GamePaths::resolve_with(None, None, tmp.path()).unwrap_err();
        assert!(matches!(err, EditorError::Paths(_)));
    }
}
