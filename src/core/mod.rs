pub mod commit;
pub mod ledger;
pub mod preset;
pub mod reset;
pub mod resolve;
pub mod store;
pub mod value;
pub mod visibility;

use std::sync::Arc;

use tokio::sync::watch;

use crate::error::{EditorError, Result};
use crate::models::{OptionDefinition, OptionPath};
use crate::schema::presets::LightingMode;
use crate::schema::Schema;
use crate::storage::OptionsBackend;

pub use commit::CommitReport;
pub use ledger::{StagedEntry, StagingLedger};
pub use store::ValueStore;
pub use visibility::Environment;

/// 选项编辑引擎：持有后端状态副本和暂存账本。
///
/// 同一时刻只有一个后端调用在进行（`&mut self`），解析与暂存都是同步的。
/// 每次状态变化递增 watch 通道里的代数，UI 据此重绘。
pub struct OptionsEditor<B> {
    schema: Arc<Schema>,
    backend: B,
    store: ValueStore,
    ledger: StagingLedger,
    initialized: bool,
    /// 最近一次读取存储是否成功
    store_loaded: bool,
    changes: watch::Sender<u64>,
}

impl<B: OptionsBackend> OptionsEditor<B> {
    pub fn new(schema: Arc<Schema>, backend: B) -> Self {
        let (changes, _) = watch::channel(0);
        Self {
            schema,
            backend,
            store: ValueStore::new(),
            ledger: StagingLedger::new(),
            initialized: false,
            store_loaded: false,
            changes,
        }
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// 读取默认值层级和当前存储。失败只记录日志，存储保持为空，可再次调用重试。
    pub async fn initialize(&mut self) {
        if self.initialized {
            return;
        }

        match self.backend.get_all_defaults().await {
            Ok(defaults) => {
                tracing::info!(sections = defaults.len(), "默认值层级已加载");
                self.store.replace_defaults(defaults);
            }
            Err(e) => {
                tracing::error!("加载默认值失败: {}", e);
                self.notify();
                return;
            }
        }

        match self.refresh().await {
            Ok(()) => self.initialized = true,
            Err(e) => tracing::error!("加载选项失败: {}", e),
        }
        self.notify();
    }

    /// 重新读取两个存储；失败时保留上次成功的状态
    pub async fn refresh(&mut self) -> Result<()> {
        let snapshot = match self.backend.get_options().await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                self.store_loaded = false;
                return Err(e);
            }
        };
        tracing::debug!(
            structured = snapshot.structured_values.len(),
            commands = snapshot.command_values.len(),
            "存储已刷新"
        );
        self.store.replace_snapshot(snapshot);
        self.store_loaded = true;
        Ok(())
    }

    pub fn resolve(&self, option: &OptionDefinition, page_id: &str, group_id: &str) -> String {
        resolve::resolve(option, page_id, group_id, &self.ledger, &self.store)
    }

    pub fn default_for(&self, option: &OptionDefinition, page_id: &str, group_id: &str) -> String {
        resolve::default_for(option, page_id, group_id, &self.store)
    }

    /// 按路径解析
    pub fn resolve_path(&self, path: &OptionPath) -> Result<String> {
        let r = self
            .schema
            .find(path)
            .ok_or_else(|| EditorError::OptionNotFound(path.to_string()))?;
        Ok(self.resolve(r.option, r.page_id, r.group_id))
    }

    /// 分隔线和标题不携带值，直接忽略
    pub fn stage(&mut self, option: &OptionDefinition, page_id: &str, group_id: &str, value: &str) {
        if option.is_decorative() {
            tracing::debug!(option = %option.id, "忽略装饰项的暂存");
            return;
        }
        self.ledger.stage(option, page_id, group_id, value);
        self.notify();
    }

    pub fn stage_path(&mut self, path: &OptionPath, value: &str) -> Result<()> {
        let schema = Arc::clone(&self.schema);
        let r = schema
            .find(path)
            .ok_or_else(|| EditorError::OptionNotFound(path.to_string()))?;
        self.stage(r.option, r.page_id, r.group_id, value);
        Ok(())
    }

    pub fn discard(&mut self) {
        let count = self.ledger.len();
        self.ledger.clear();
        tracing::info!(count, "已丢弃暂存修改");
        self.notify();
    }

    pub fn pending(&self) -> &StagingLedger {
        &self.ledger
    }

    pub fn pending_count(&self) -> usize {
        self.ledger.len()
    }

    pub fn has_pending_changes(&self) -> bool {
        !self.ledger.is_empty()
    }

    pub fn is_staged(&self, path: &OptionPath) -> bool {
        self.ledger.get(path).is_some()
    }

    /// 提交所有暂存修改，附带补齐缺失命令。
    /// 后端失败时账本与存储保持不变，错误返回给调用方。
    ///
    /// 存储上次读取失败时先重读一次；仍失败则本次不补齐，
    /// 只写暂存条目。
    pub async fn commit_all(&mut self) -> Result<CommitReport> {
        if self.ledger.is_empty() {
            tracing::debug!("没有暂存修改，跳过提交");
            return Ok(CommitReport::default());
        }

        if !self.store_loaded {
            if let Err(e) = self.refresh().await {
                tracing::warn!("存储未加载，本次提交不补齐缺失命令: {}", e);
            }
        }

        let batch = commit::build_commit_batch(
            &self.schema,
            &self.store,
            &self.ledger,
            self.store_loaded,
        );
        let report = CommitReport {
            submitted: batch.changes.len(),
            healed: batch.healed,
        };

        if let Err(e) = self.backend.save_options(batch.changes).await {
            tracing::warn!("保存选项失败，保留暂存修改: {}", e);
            return Err(e);
        }

        // 先清空账本再刷新
        self.ledger.clear();
        if let Err(e) = self.refresh().await {
            tracing::warn!("保存成功但刷新失败: {}", e);
        }
        tracing::info!(submitted = report.submitted, healed = report.healed, "选项已保存");
        self.notify();
        Ok(report)
    }

    /// 把一页恢复为默认值，返回写入的条目数。其他页的暂存不受影响。
    pub async fn reset_page(&mut self, page_id: &str) -> Result<usize> {
        let schema = Arc::clone(&self.schema);
        let page = schema
            .page(page_id)
            .ok_or_else(|| EditorError::PageNotFound(page_id.to_string()))?;

        let entries = reset::build_reset_entries(page, &self.store);
        let count = entries.len();

        if let Err(e) = self.backend.reset_options_to_defaults(entries).await {
            tracing::warn!(page = page_id, "恢复默认值失败: {}", e);
            return Err(e);
        }

        let removed = self.ledger.remove_page(page_id);
        if let Err(e) = self.refresh().await {
            tracing::warn!("恢复默认值成功但刷新失败: {}", e);
        }
        tracing::info!(page = page_id, count, removed, "页面已恢复默认值");
        self.notify();
        Ok(count)
    }

    /// 删除 user.ltx 后重读存储。暂存修改保留，下次提交照常写入。
    pub async fn reset_user_ltx(&mut self) -> Result<()> {
        if let Err(e) = self.backend.reset_user_ltx().await {
            tracing::warn!("重置 user.ltx 失败: {}", e);
            return Err(e);
        }
        if let Err(e) = self.refresh().await {
            tracing::warn!("重置 user.ltx 成功但刷新失败: {}", e);
        }
        tracing::info!("user.ltx 已重置");
        self.notify();
        Ok(())
    }

    pub async fn clear_shader_cache(&self) -> Result<u64> {
        let bytes = self.backend.clear_shader_cache().await?;
        tracing::info!(bytes, "着色器缓存已清除");
        Ok(bytes)
    }

    pub fn lighting_mode(&self) -> LightingMode {
        preset::lighting_mode(&self.ledger, &self.store)
    }

    /// 按当前光照模式应用预设，返回暂存的条目数
    pub fn apply_preset(&mut self, name: &str) -> usize {
        let mode = self.lighting_mode();
        self.apply_preset_with_mode(name, mode)
    }

    /// 预设只写入账本，不提交
    pub fn apply_preset_with_mode(&mut self, name: &str, mode: LightingMode) -> usize {
        let schema = Arc::clone(&self.schema);
        let targets = preset::preset_targets(&schema, name, mode);
        for (r, value) in &targets {
            self.ledger.stage(r.option, r.page_id, r.group_id, value);
        }
        tracing::info!(preset = name, ?mode, staged = targets.len(), "预设已暂存");
        self.notify();
        targets.len()
    }

    pub fn effective_environment(&self) -> Environment {
        visibility::effective_environment(&self.store, &self.ledger)
    }

    /// 每次调用重新计算环境；批量判断时先取 `effective_environment`
    pub fn is_visible(&self, option: &OptionDefinition) -> bool {
        visibility::is_visible(option, &self.effective_environment())
    }

    /// 订阅状态变化；丢弃 Receiver 即取消订阅
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.changes.subscribe()
    }

    fn notify(&self) {
        self.changes.send_modify(|generation| *generation += 1);
    }
}
