pub mod remote;

#[cfg(test)]
pub mod memory;

use anyhow::Result;

use crate::models::{Task, TaskDraft, TaskId, TaskPatch};

pub use remote::RestRepository;

/// 持久化任务的权威仓库
///
/// 每次写入成功后，看板都会调用 `list` 重新构建划分。
pub trait TaskRepository {
    /// 返回全部任务（包括已归档）
    fn list(&self) -> Result<Vec<Task>>;

    /// 插入新任务，返回仓库分配 ID 后的任务
    fn insert(&self, draft: &TaskDraft) -> Result<Task>;

    fn update(&self, id: TaskId, patch: &TaskPatch) -> Result<Task>;

    fn delete(&self, id: TaskId) -> Result<()>;
}
