use serde::{Deserialize, Serialize};

use super::error::{BoardError, BoardResult};
use crate::models::{ColumnId, Task, TaskId, TaskPatch};

/// 列内 order 的步长
pub const ORDER_STEP: i64 = 1000;

/// 列统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ColumnStats {
    pub total: usize,
    pub completed: usize,
}

/// 任务到列的划分
///
/// 每个任务恰好属于一个桶，且 `task.column_id` 与所在桶一致。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Partition {
    #[serde(default)]
    todo: Vec<Task>,
    #[serde(default)]
    in_progress: Vec<Task>,
    #[serde(default)]
    done: Vec<Task>,
    #[serde(default)]
    archived: Vec<Task>,
}

impl Partition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn column(&self, column: ColumnId) -> &[Task] {
        match column {
            ColumnId::Todo => &self.todo,
            ColumnId::InProgress => &self.in_progress,
            ColumnId::Done => &self.done,
            ColumnId::Archived => &self.archived,
        }
    }

    pub(crate) fn column_mut(&mut self, column: ColumnId) -> &mut Vec<Task> {
        match column {
            ColumnId::Todo => &mut self.todo,
            ColumnId::InProgress => &mut self.in_progress,
            ColumnId::Done => &mut self.done,
            ColumnId::Archived => &mut self.archived,
        }
    }

    /// 所有任务（包括已归档）
    pub fn iter(&self) -> impl Iterator<Item = &Task> {
        self.todo
            .iter()
            .chain(self.in_progress.iter())
            .chain(self.done.iter())
            .chain(self.archived.iter())
    }

    pub fn len(&self) -> usize {
        self.todo.len() + self.in_progress.len() + self.done.len() + self.archived.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 查找任务所在的列和索引
    pub fn find(&self, id: TaskId) -> Option<(ColumnId, usize)> {
        [ColumnId::Todo, ColumnId::InProgress, ColumnId::Done, ColumnId::Archived]
            .into_iter()
            .find_map(|c| self.column(c).iter().position(|t| t.id == id).map(|i| (c, i)))
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        let (column, index) = self.find(id)?;
        self.column(column).get(index)
    }

    fn get_mut(&mut self, id: TaskId) -> BoardResult<&mut Task> {
        let (column, index) = self.find(id).ok_or(BoardError::TaskNotFound(id))?;
        Ok(&mut self.column_mut(column)[index])
    }

    /// 单列统计
    pub fn stats(&self, column: ColumnId) -> ColumnStats {
        let tasks = self.column(column);
        ColumnStats {
            total: tasks.len(),
            completed: tasks.iter().filter(|t| t.completed).count(),
        }
    }

    /// 看板（不含归档）总计
    pub fn board_stats(&self) -> ColumnStats {
        ColumnId::BOARD
            .into_iter()
            .map(|c| self.stats(c))
            .fold(ColumnStats::default(), |acc, s| ColumnStats {
                total: acc.total + s.total,
                completed: acc.completed + s.completed,
            })
    }

    /// 本地模式下的下一个任务 ID：毫秒时间戳，且严格大于现有最大 ID
    pub fn next_local_id(&self) -> TaskId {
        let now = chrono::Utc::now().timestamp_millis().max(0) as TaskId;
        let max_id = self.iter().map(|t| t.id).max().unwrap_or(0);
        now.max(max_id + 1)
    }

    /// 追加到列尾时应使用的 order
    pub fn next_order(&self, column: ColumnId) -> i64 {
        self.column(column)
            .iter()
            .map(|t| t.order)
            .max()
            .map_or(0, |max| max + ORDER_STEP)
    }

    /// 按当前位置重新编号 order
    fn renumber(&mut self, column: ColumnId) {
        for (index, task) in self.column_mut(column).iter_mut().enumerate() {
            task.order = index as i64 * ORDER_STEP;
        }
    }

    /// 追加新任务到列尾
    pub fn add_task(&mut self, column: ColumnId, mut task: Task) -> BoardResult<()> {
        if !column.is_board() {
            return Err(BoardError::InvalidColumn(column));
        }
        task.column_id = column;
        task.order = self.next_order(column);
        self.column_mut(column).push(task);
        Ok(())
    }

    /// 切换完成状态，返回新状态；不移动任务
    pub fn toggle_completed(&mut self, id: TaskId) -> BoardResult<bool> {
        let task = self.get_mut(id)?;
        task.completed = !task.completed;
        Ok(task.completed)
    }

    /// 应用可编辑字段；文本为空时不做任何修改并返回 `false`
    pub fn edit_task(&mut self, id: TaskId, patch: &TaskPatch) -> BoardResult<bool> {
        let task = self.get_mut(id)?;
        if patch.has_blank_text() {
            return Ok(false);
        }
        patch.apply_edit(task);
        Ok(true)
    }

    /// 永久删除，只允许删除已归档的任务
    pub fn delete_task(&mut self, id: TaskId) -> BoardResult<Task> {
        let (column, index) = self.find(id).ok_or(BoardError::TaskNotFound(id))?;
        if column != ColumnId::Archived {
            return Err(BoardError::NotArchived(id));
        }
        Ok(self.archived.remove(index))
    }

    /// 归档：移出看板但保留
    pub fn archive_task(&mut self, id: TaskId) -> BoardResult<()> {
        let (column, _) = self.find(id).ok_or(BoardError::TaskNotFound(id))?;
        if column == ColumnId::Archived {
            return Ok(());
        }
        self.transfer(id, column, ColumnId::Archived)
    }

    /// 从归档恢复到指定列
    pub fn restore_task(&mut self, id: TaskId, target: ColumnId) -> BoardResult<()> {
        let (column, _) = self.find(id).ok_or(BoardError::TaskNotFound(id))?;
        if column != ColumnId::Archived {
            return Err(BoardError::NotArchived(id));
        }
        if !target.is_board() {
            return Err(BoardError::InvalidColumn(target));
        }
        self.transfer(id, ColumnId::Archived, target)
    }

    /// 列内移动 (array move)
    pub fn reorder_within_column(
        &mut self,
        column: ColumnId,
        from: usize,
        to: usize,
    ) -> BoardResult<()> {
        let len = self.column(column).len();
        for index in [from, to] {
            if index >= len {
                return Err(BoardError::IndexOutOfRange { column, index, len });
            }
        }
        if from == to {
            return Ok(());
        }

        let tasks = self.column_mut(column);
        let task = tasks.remove(from);
        tasks.insert(to, task);
        self.renumber(column);
        Ok(())
    }

    /// 把 `from` 处的任务移到 `to` 后，夹在新邻居之间的 order
    ///
    /// 只需改写被移动的任务；相邻 order 之间没有空隙时返回 `None`，
    /// 调用方需要整列重新编号。
    pub fn order_between(&self, column: ColumnId, from: usize, to: usize) -> Option<i64> {
        let mut orders: Vec<i64> = self.column(column).iter().map(|t| t.order).collect();
        if from >= orders.len() || to >= orders.len() {
            return None;
        }
        orders.remove(from);
        let prev = to.checked_sub(1).and_then(|i| orders.get(i)).copied();
        let next = orders.get(to).copied();
        match (prev, next) {
            (Some(p), Some(n)) if n - p >= 2 => Some(p + (n - p) / 2),
            (Some(p), None) => Some(p + ORDER_STEP),
            (None, Some(n)) => Some(n - ORDER_STEP),
            _ => None,
        }
    }

    /// 跨列移动，追加到目标列尾部
    pub fn move_across_columns(
        &mut self,
        id: TaskId,
        from: ColumnId,
        to: ColumnId,
    ) -> BoardResult<()> {
        if !from.is_board() {
            return Err(BoardError::InvalidColumn(from));
        }
        if !to.is_board() {
            return Err(BoardError::InvalidColumn(to));
        }
        if from == to {
            return Ok(());
        }
        self.transfer(id, from, to)
    }

    fn transfer(&mut self, id: TaskId, from: ColumnId, to: ColumnId) -> BoardResult<()> {
        let index = self
            .column(from)
            .iter()
            .position(|t| t.id == id)
            .ok_or(BoardError::TaskNotFound(id))?;

        let mut task = self.column_mut(from).remove(index);
        task.column_id = to;
        task.order = self.next_order(to);
        self.column_mut(to).push(task);
        self.renumber(from);
        Ok(())
    }

    /// 检查每个任务的 column_id 与所在桶一致
    pub fn is_consistent(&self) -> bool {
        [ColumnId::Todo, ColumnId::InProgress, ColumnId::Done, ColumnId::Archived]
            .into_iter()
            .all(|c| self.column(c).iter().all(|t| t.column_id == c))
    }
}
