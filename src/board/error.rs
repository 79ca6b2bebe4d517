use thiserror::Error;

use crate::models::{ColumnId, TaskId};

/// 看板操作错误
///
/// 校验失败（例如空文本）不是错误，调用方静默忽略。
#[derive(Debug, Error)]
pub enum BoardError {
    #[error("未知的列: {0}")]
    UnknownColumn(String),

    #[error("不能在列 '{0}' 中执行该操作")]
    InvalidColumn(ColumnId),

    #[error("找不到任务 #{0}")]
    TaskNotFound(TaskId),

    #[error("索引 {index} 超出列 '{column}' 的范围 (共 {len} 个任务)")]
    IndexOutOfRange {
        column: ColumnId,
        index: usize,
        len: usize,
    },

    #[error("用户 '{actor}' 无权修改任务 #{task}")]
    Unauthorized { actor: String, task: TaskId },

    #[error("任务 #{0} 尚未归档，只能删除已归档的任务")]
    NotArchived(TaskId),

    #[error("仓库调用失败: {0:#}")]
    Repository(#[from] anyhow::Error),
}

impl BoardError {
    /// 是否应当以警告（而非错误）的形式展示给用户
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            BoardError::Unauthorized { .. } | BoardError::NotArchived(_)
        )
    }
}

pub type BoardResult<T> = Result<T, BoardError>;
