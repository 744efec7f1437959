pub mod file;
pub mod ltx;
pub mod memory;
pub mod user_ltx;

use std::future::Future;

use crate::config::GamePaths;
use crate::error::Result;
use crate::models::{DefaultsMap, OptionsSnapshot, PendingChange, ResetEntry};

pub use file::FileBackend;
pub use memory::MemoryBackend;

/// 持久化后端。引擎只依赖这四个调用的约定，不关心落盘方式。
/// 写调用要求整批原子：要么全部可见，要么失败且无变化。
pub trait OptionsBackend {
    fn get_all_defaults(&self) -> impl Future<Output = Result<DefaultsMap>> + Send;

    fn get_options(&self) -> impl Future<Output = Result<OptionsSnapshot>> + Send;

    fn save_options(&self, changes: Vec<PendingChange>) -> impl Future<Output = Result<()>> + Send;

    fn reset_options_to_defaults(
        &self,
        options: Vec<ResetEntry>,
    ) -> impl Future<Output = Result<()>> + Send;

    fn get_game_paths(&self) -> impl Future<Output = Result<GamePaths>> + Send;

    /// 删除命令存储文件；之后的读取退回基线
    fn reset_user_ltx(&self) -> impl Future<Output = Result<()>> + Send;

    /// 删除着色器缓存，返回释放的字节数
    fn clear_shader_cache(&self) -> impl Future<Output = Result<u64>> + Send;
}
