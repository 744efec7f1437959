use std::collections::HashSet;

use serde::Serialize;

use crate::core::ledger::StagingLedger;
use crate::core::resolve::default_for;
use crate::core::store::ValueStore;
use crate::core::value::encode_for_storage;
use crate::models::{PendingChange, StorageKind};
use crate::schema::Schema;

/// 一次提交的统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitReport {
    pub submitted: usize,
    pub healed: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommitBatch {
    pub changes: Vec<PendingChange>,
    pub healed: usize,
}

/// 组装提交批次：先补齐命令存储里缺失的命令（healing），再接暂存条目。
/// 同一命令只补一次，已被暂存覆盖的命令不补。
///
/// 补齐值取 `default_for`：默认值层级优先于 schema 默认值，
/// 与界面在该命令缺失时显示的值一致。
///
/// `heal` 为 false 时只提交暂存条目；存储没有成功读取过时
/// "缺失" 无法与 "从未写入" 区分，调用方应关闭补齐。
pub fn build_commit_batch(
    schema: &Schema,
    store: &ValueStore,
    ledger: &StagingLedger,
    heal: bool,
) -> CommitBatch {
    let mut covered: HashSet<&str> = ledger.commands().collect();
    let mut changes = Vec::new();

    for r in schema.value_options().filter(|_| heal) {
        let Some(command) = r.option.command_name() else {
            continue;
        };
        if store.has_command(command) || covered.contains(command) {
            continue;
        }
        let default = default_for(r.option, r.page_id, r.group_id, store);
        tracing::debug!(command, default = %default, "补齐缺失命令");
        changes.push(PendingChange {
            path: r.path(),
            value: encode_for_storage(r.option, &default),
            storage: StorageKind::Command {
                command: command.to_string(),
            },
        });
        covered.insert(command);
    }

    let healed = changes.len();
    changes.extend(ledger.changes().cloned());
    CommitBatch { changes, healed }
}
