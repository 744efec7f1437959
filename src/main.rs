pub mod api;
pub mod config;
pub mod core;
pub mod error;
pub mod models;
pub mod schema;
pub mod storage;
pub mod tui;

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crate::config::{EditorConfig, GamePaths};
use crate::core::OptionsEditor;
use crate::error::{EditorError, Result};
use crate::storage::{FileBackend, MemoryBackend, OptionsBackend};

const LOG_FILE: &str = "options_editor.log";

/// 命令行参数：`[serve] [--config-dir <dir>]`
#[derive(Debug, Default, PartialEq)]
struct Args {
    serve: bool,
    config_dir: Option<PathBuf>,
}

impl Args {
    fn parse(mut args: impl Iterator<Item = String>) -> Result<Self> {
        let mut parsed = Args::default();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "serve" => parsed.serve = true,
                "--config-dir" => {
                    let dir = args
                        .next()
                        .ok_or_else(|| EditorError::Paths("--config-dir needs a value".to_string()))?;
                    parsed.config_dir = Some(PathBuf::from(dir));
                }
                other => {
                    return Err(EditorError::Paths(format!("unknown argument: {}", other)));
                }
            }
        }
        Ok(parsed)
    }
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let args = Args::parse(std::env::args().skip(1))?;
    let config_dir = match &args.config_dir {
        Some(dir) => dir.clone(),
        None => config::launcher_dir()?,
    };
    let config = EditorConfig::load(&config_dir);
    init_logging(&config, args.serve, &config_dir)?;
    tracing::info!(config_dir = ?config_dir, serve = args.serve, "启动");

    match GamePaths::resolve(config.game_root.as_deref(), &config_dir) {
        Ok(paths) => {
            tracing::info!(game_root = ?paths.game_root, "游戏目录");
            run_with(FileBackend::new(&paths), &args, &config)
        }
        Err(e) => {
            tracing::warn!("{}，改用内存后端，修改不会写入磁盘", e);
            run_with(MemoryBackend::new(), &args, &config)
        }
    }
}

fn run_with<B>(backend: B, args: &Args, config: &EditorConfig) -> Result<()>
where
    B: OptionsBackend + Send + Sync + 'static,
{
    if args.serve {
        let runtime = tokio::runtime::Runtime::new()?;
        return runtime.block_on(api::serve(
            Arc::new(backend),
            &config.listen_addr,
            config.api_token.clone(),
        ));
    }

    let editor = OptionsEditor::new(Arc::new(schema::catalog::builtin()), backend);
    let mut app = tui::App::new(editor, &config.default_preset)?;
    app.run()?;
    Ok(())
}

/// TUI 模式写日志文件，避免破坏终端画面；serve 模式写 stderr
fn init_logging(config: &EditorConfig, serve: bool, dir: &std::path::Path) -> Result<()> {
    let builder = tracing_subscriber::fmt().with_max_level(config.log_level());
    if serve {
        builder.with_writer(std::io::stderr).init();
    } else {
        let file = std::fs::File::create(dir.join(LOG_FILE))?;
        builder.with_ansi(false).with_writer(Mutex::new(file)).init();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Args> {
        Args::parse(args.iter().map(|s| s.to_string()))
    }

    #[test]
    fn test_parse_args() {
        assert_eq!(parse(&[]).unwrap(), Args::default());
        let args = parse(&["serve", "--config-dir", "/tmp/cfg"]).unwrap();
        assert!(args.serve);
        assert_eq!(args.config_dir, Some(PathBuf::from("/tmp/cfg")));
    }

    #[test]
    fn test_parse_args_errors() {
        assert!(parse(&["--config-dir"]).is_err());
        assert!(parse(&["--verbose"]).is_err());
    }
}
