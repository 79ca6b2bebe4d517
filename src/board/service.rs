use anyhow::Result;

use super::auth::{authorize, Action};
use super::drag::DragOutcome;
use super::error::{BoardError, BoardResult};
use super::partition::Partition;
use super::reconcile;
use crate::log::log_debug;
use crate::models::{Actor, ColumnId, Task, TaskDraft, TaskId, TaskPatch};
use crate::notify::{ActionKind, NotificationQueue};
use crate::state::{LocalState, LocalStore};
use crate::store::TaskRepository;

/// 持久化后端
pub enum Backend {
    /// 本地 JSON 文件：直接修改内存划分后整体写回
    Local(LocalStore),
    /// 远程仓库：先写仓库，成功后重新拉取完整列表
    Remote(Box<dyn TaskRepository>),
}

/// 看板应用状态
///
/// 持有列划分、后端、当前操作者和通知队列。所有修改都经由这里，
/// 远程模式下划分始终等于最近一次成功拉取的快照。
pub struct Board {
    partition: Partition,
    backend: Backend,
    actor: Actor,
    notifier: Option<NotificationQueue>,
    dark_mode: bool,
}

impl Board {
    /// 打开本地看板，启动时读取一次状态文件
    pub fn open_local(store: LocalStore, actor: Actor) -> Result<Self> {
        let LocalState { mut columns, dark_mode } = store.load()?;
        // 手工编辑过的状态文件：按 columnId 重新分组
        if !columns.is_consistent() {
            log_debug(format!("{} 中的 columnId 与所在列不一致，已重新分组", store.path().display()));
            columns = reconcile::rebuild(columns.iter().cloned().collect::<Vec<_>>());
        }
        Ok(Self {
            partition: columns,
            backend: Backend::Local(store),
            actor,
            notifier: None,
            dark_mode,
        })
    }

    /// 打开远程看板并拉取一次任务列表
    pub fn open_remote(repository: Box<dyn TaskRepository>, actor: Actor) -> Self {
        let mut board = Self {
            partition: Partition::new(),
            backend: Backend::Remote(repository),
            actor,
            notifier: None,
            dark_mode: false,
        };
        board.resync();
        board
    }

    pub fn with_notifier(mut self, queue: NotificationQueue) -> Self {
        self.notifier = Some(queue);
        self
    }

    pub fn partition(&self) -> &Partition {
        &self.partition
    }

    pub fn actor(&self) -> &Actor {
        &self.actor
    }

    pub fn is_remote(&self) -> bool {
        matches!(self.backend, Backend::Remote(_))
    }

    pub fn dark_mode(&self) -> bool {
        self.dark_mode
    }

    pub fn set_dark_mode(&mut self, dark_mode: bool) {
        self.dark_mode = dark_mode;
        self.persist();
    }

    /// 从仓库重新拉取完整列表并重建划分
    ///
    /// 本地模式下没有外部来源，直接返回 `true`。
    /// 拉取失败时记录日志，划分保持不变。
    pub fn resync(&mut self) -> bool {
        let Backend::Remote(repository) = &self.backend else {
            return true;
        };
        match repository.list() {
            Ok(tasks) => {
                self.partition = reconcile::rebuild(tasks);
                true
            }
            Err(e) => {
                log_debug(format!("重新拉取任务列表失败: {:#}", e));
                false
            }
        }
    }

    /// 新建任务并追加到列尾，文本为空时什么也不做
    pub fn add_task(&mut self, mut draft: TaskDraft) -> BoardResult<Option<TaskId>> {
        if draft.is_blank() {
            return Ok(None);
        }
        let column = draft.column_id;
        if !column.is_board() {
            return Err(BoardError::InvalidColumn(column));
        }
        draft.text = draft.text.trim().to_string();
        draft.created_by = Some(self.actor.id.clone());
        draft.order = self.partition.next_order(column);

        let created = match &self.backend {
            Backend::Local(_) => {
                let task = Task::from_draft(self.partition.next_local_id(), draft);
                self.partition.add_task(column, task.clone())?;
                self.persist();
                task
            }
            Backend::Remote(repository) => {
                let created = repository.insert(&draft).map_err(|e| self.write_failed(e))?;
                self.resync();
                created
            }
        };

        // 重新拉取失败时用仓库返回的任务
        let id = created.id;
        let task = self.partition.get(id).cloned().unwrap_or(created);
        self.notify(&task, ActionKind::Created);
        if task.assignee.is_some() {
            self.notify(&task, ActionKind::Assigned);
        }
        Ok(Some(id))
    }

    /// 切换完成状态，返回新状态
    pub fn toggle_completed(&mut self, id: TaskId) -> BoardResult<bool> {
        let task = self.snapshot(id)?;
        authorize(&self.actor, &task, Action::Toggle)?;
        let completed = !task.completed;

        match &self.backend {
            Backend::Local(_) => {
                self.partition.toggle_completed(id)?;
                self.persist();
            }
            Backend::Remote(repository) => {
                repository
                    .update(id, &TaskPatch::completed(completed))
                    .map_err(|e| self.write_failed(e))?;
                self.resync();
            }
        }

        if completed {
            let task = self.partition.get(id).cloned().unwrap_or(Task { completed, ..task });
            self.notify(&task, ActionKind::Completed);
        }
        Ok(completed)
    }

    /// 编辑文本、优先级、负责人、截止日期；文本为空时返回 `Ok(false)`
    pub fn edit_task(&mut self, id: TaskId, patch: TaskPatch) -> BoardResult<bool> {
        let task = self.snapshot(id)?;
        if patch.has_blank_text() {
            return Ok(false);
        }
        authorize(&self.actor, &task, Action::Edit)?;

        let edit = TaskPatch {
            text: patch.text,
            priority: patch.priority,
            assignee: patch.assignee,
            due_date: patch.due_date,
            ..TaskPatch::default()
        };

        match &self.backend {
            Backend::Local(_) => {
                self.partition.edit_task(id, &edit)?;
                self.persist();
            }
            Backend::Remote(repository) => {
                repository.update(id, &edit).map_err(|e| self.write_failed(e))?;
                self.resync();
            }
        }

        let updated = self.partition.get(id).cloned().unwrap_or_else(|| {
            let mut t = task.clone();
            edit.apply_edit(&mut t);
            t
        });
        self.notify(&updated, ActionKind::Edited);
        if updated.assignee.is_some() && updated.assignee != task.assignee {
            self.notify(&updated, ActionKind::Assigned);
        }
        Ok(true)
    }

    /// 永久删除已归档的任务
    pub fn delete_task(&mut self, id: TaskId) -> BoardResult<()> {
        let task = self.snapshot(id)?;
        authorize(&self.actor, &task, Action::Delete)?;

        match &self.backend {
            Backend::Local(_) => {
                self.partition.delete_task(id)?;
                self.persist();
            }
            Backend::Remote(repository) => {
                repository.delete(id).map_err(|e| self.write_failed(e))?;
                self.resync();
            }
        }

        self.notify(&task, ActionKind::Deleted);
        Ok(())
    }

    pub fn archive_task(&mut self, id: TaskId) -> BoardResult<()> {
        let task = self.snapshot(id)?;
        authorize(&self.actor, &task, Action::Edit)?;
        if task.column_id == ColumnId::Archived {
            return Ok(());
        }
        self.relocate(id, ColumnId::Archived, |p| p.archive_task(id))?;

        let task = self.partition.get(id).cloned().unwrap_or(task);
        self.notify(&task, ActionKind::Archived);
        Ok(())
    }

    /// 从归档恢复到 `target` 列尾
    pub fn restore_task(&mut self, id: TaskId, target: ColumnId) -> BoardResult<()> {
        let task = self.snapshot(id)?;
        authorize(&self.actor, &task, Action::Edit)?;
        if task.column_id != ColumnId::Archived {
            return Err(BoardError::NotArchived(id));
        }
        if !target.is_board() {
            return Err(BoardError::InvalidColumn(target));
        }
        self.relocate(id, target, |p| p.restore_task(id, target))
    }

    pub fn reorder_within_column(
        &mut self,
        column: ColumnId,
        from: usize,
        to: usize,
    ) -> BoardResult<()> {
        let mut planned = self.partition.clone();
        planned.reorder_within_column(column, from, to)?;
        if from == to {
            return Ok(());
        }
        let task = self.partition.column(column)[from].clone();
        authorize(&self.actor, &task, Action::Move)?;

        match &self.backend {
            Backend::Local(_) => {
                self.partition = planned;
                self.persist();
            }
            Backend::Remote(repository) => {
                if let Some(order) = self.partition.order_between(column, from, to) {
                    repository
                        .update(task.id, &TaskPatch::order(order))
                        .map_err(|e| self.write_failed(e))?;
                } else if let Err(e) = renumber_remote(repository.as_ref(), &self.partition, &planned, column) {
                    let err = self.write_failed(e);
                    // 整列编号可能只写入了一部分，以仓库为准
                    self.resync();
                    return Err(err);
                }
                self.resync();
            }
        }
        Ok(())
    }

    /// 跨列移动到目标列尾部
    pub fn move_across_columns(
        &mut self,
        id: TaskId,
        from: ColumnId,
        to: ColumnId,
    ) -> BoardResult<()> {
        let task = self.snapshot(id)?;
        if task.column_id != from {
            return Err(BoardError::TaskNotFound(id));
        }
        if !from.is_board() {
            return Err(BoardError::InvalidColumn(from));
        }
        if !to.is_board() {
            return Err(BoardError::InvalidColumn(to));
        }
        if from == to {
            return Ok(());
        }
        authorize(&self.actor, &task, Action::Move)?;
        self.relocate(id, to, |p| p.move_across_columns(id, from, to))
    }

    /// 应用拖拽结果，返回是否有修改
    pub fn apply_drag(&mut self, outcome: DragOutcome) -> BoardResult<bool> {
        match outcome {
            DragOutcome::Cancelled | DragOutcome::Unchanged => Ok(false),
            DragOutcome::Reorder { column, from, to } => {
                self.reorder_within_column(column, from, to)?;
                Ok(true)
            }
            DragOutcome::Move { task_id, from, to } => {
                self.move_across_columns(task_id, from, to)?;
                Ok(true)
            }
        }
    }

    /// 把任务放到另一个桶的尾部：本地直接修改，远程写 column_id + order
    fn relocate(
        &mut self,
        id: TaskId,
        to: ColumnId,
        local: impl FnOnce(&mut Partition) -> BoardResult<()>,
    ) -> BoardResult<()> {
        match &self.backend {
            Backend::Local(_) => {
                local(&mut self.partition)?;
                self.persist();
            }
            Backend::Remote(repository) => {
                let patch = TaskPatch::placement(to, self.partition.next_order(to));
                repository.update(id, &patch).map_err(|e| self.write_failed(e))?;
                self.resync();
            }
        }
        Ok(())
    }

    fn snapshot(&self, id: TaskId) -> BoardResult<Task> {
        self.partition
            .get(id)
            .cloned()
            .ok_or(BoardError::TaskNotFound(id))
    }

    fn write_failed(&self, error: anyhow::Error) -> BoardError {
        log_debug(format!("仓库写入失败: {:#}", error));
        BoardError::Repository(error)
    }

    fn persist(&self) {
        let Backend::Local(store) = &self.backend else {
            return;
        };
        let state = LocalState {
            columns: self.partition.clone(),
            dark_mode: self.dark_mode,
        };
        if let Err(e) = store.save(&state) {
            log_debug(format!("保存本地状态失败 {}: {:#}", store.path().display(), e));
        }
    }

    fn notify(&self, task: &Task, action: ActionKind) {
        if let Some(queue) = &self.notifier {
            queue.dispatch(task, action, &self.actor);
        }
    }
}

/// 把 `planned` 中该列变化了的 order 逐个写回仓库
fn renumber_remote(
    repository: &dyn TaskRepository,
    current: &Partition,
    planned: &Partition,
    column: ColumnId,
) -> Result<()> {
    for moved in planned.column(column) {
        if current.get(moved.id).map(|t| t.order) != Some(moved.order) {
            repository.update(moved.id, &TaskPatch::order(moved.order))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::partition::tests::task;
    use crate::models::{Priority, Role};
    use crate::notify::tests::RecordingNotifier;
    use crate::store::memory::MemoryRepository;
    use tempfile::TempDir;

    fn alice() -> Actor {
        Actor::new("alice", Role::Member)
    }

    fn remote(repo: &MemoryRepository, actor: Actor) -> Board {
        Board::open_remote(Box::new(repo.clone()), actor)
    }

    fn seeded_repo() -> MemoryRepository {
        let mut b = task(2, "B", ColumnId::Todo);
        b.order = 1000;
        MemoryRepository::with_tasks(vec![task(1, "A", ColumnId::Todo), b])
    }

    fn ids(board: &Board, column: ColumnId) -> Vec<TaskId> {
        board.partition().column(column).iter().map(|t| t.id).collect()
    }

    #[test]
    fn test_local_changes_are_persisted() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");

        let mut board = Board::open_local(LocalStore::new(&path), alice()).unwrap();
        let id = board
            .add_task(TaskDraft::new("写文档", ColumnId::Todo).with_priority(Priority::Urgent))
            .unwrap()
            .unwrap();
        board.move_across_columns(id, ColumnId::Todo, ColumnId::Done).unwrap();
        board.set_dark_mode(true);

        let reopened = Board::open_local(LocalStore::new(&path), alice()).unwrap();
        assert_eq!(reopened.partition(), board.partition());
        assert!(reopened.dark_mode());
        let task = reopened.partition().get(id).unwrap();
        assert_eq!(task.column_id, ColumnId::Done);
        assert_eq!(task.created_by.as_deref(), Some("alice"));
    }

    #[test]
    fn test_blank_task_is_ignored() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");
        let mut board = Board::open_local(LocalStore::new(&path), alice()).unwrap();
        assert_eq!(board.add_task(TaskDraft::new("   ", ColumnId::Todo)).unwrap(), None);
        assert!(board.partition().is_empty());
        assert!(!path.exists());
    }

    #[test]
    fn test_remote_add_refetches_full_list() {
        let repo = seeded_repo();
        let mut board = remote(&repo, alice());
        assert_eq!(repo.list_calls(), 1);

        let id = board.add_task(TaskDraft::new("C", ColumnId::Todo)).unwrap().unwrap();
        assert_eq!(repo.list_calls(), 2);
        assert_eq!(ids(&board, ColumnId::Todo), vec![1, 2, id]);
        assert_eq!(repo.snapshot().len(), 3);
    }

    #[test]
    fn test_remote_write_failure_leaves_partition_unchanged() {
        let repo = seeded_repo();
        let mut board = remote(&repo, alice());
        let before = board.partition().clone();

        repo.set_fail_writes(true);
        let err = board.toggle_completed(1).unwrap_err();
        assert!(matches!(err, BoardError::Repository(_)));
        assert_eq!(board.partition(), &before);
        // 写入失败时不再拉取
        assert_eq!(repo.list_calls(), 1);
    }

    #[test]
    fn test_remote_refetch_failure_leaves_partition_stale() {
        let repo = seeded_repo();
        let mut board = remote(&repo, alice());

        repo.set_fail_list(true);
        assert!(board.toggle_completed(1).is_ok());
        assert!(!board.partition().get(1).unwrap().completed);
        assert!(repo.snapshot()[0].completed);

        repo.set_fail_list(false);
        assert!(board.resync());
        assert!(board.partition().get(1).unwrap().completed);
    }

    #[test]
    fn test_resync_picks_up_other_sessions_and_is_idempotent() {
        let repo = seeded_repo();
        let mut board = remote(&repo, alice());
        let mut external = task(10, "外部", ColumnId::InProgress);
        external.created_by = Some("bob".to_string());
        repo.push_external(external);

        board.resync();
        let first = board.partition().clone();
        board.resync();
        assert_eq!(board.partition(), &first);
        assert_eq!(ids(&board, ColumnId::InProgress), vec![10]);
    }

    #[test]
    fn test_stranger_cannot_edit_or_move() {
        let repo = seeded_repo();
        let mut board = remote(&repo, Actor::new("bob", Role::Member));
        let before = repo.snapshot();

        let err = board.edit_task(1, TaskPatch::text("hacked")).unwrap_err();
        assert!(matches!(err, BoardError::Unauthorized { .. }));
        let err = board
            .move_across_columns(1, ColumnId::Todo, ColumnId::Done)
            .unwrap_err();
        assert!(err.is_rejection());

        assert_eq!(repo.snapshot(), before);
        assert_eq!(board.partition().get(1).unwrap().text, "A");
        assert_eq!(repo.list_calls(), 1);
    }

    #[test]
    fn test_admin_can_move_foreign_task() {
        let repo = seeded_repo();
        let mut board = remote(&repo, Actor::new("root", Role::Admin));
        board.move_across_columns(1, ColumnId::Todo, ColumnId::Done).unwrap();
        assert_eq!(ids(&board, ColumnId::Done), vec![1]);
        assert_eq!(board.partition().get(1).unwrap().column_id, ColumnId::Done);
    }

    #[test]
    fn test_remote_archive_then_delete() {
        let repo = seeded_repo();
        let mut board = remote(&repo, alice());

        assert!(matches!(board.delete_task(1), Err(BoardError::NotArchived(1))));
        assert_eq!(repo.snapshot().len(), 2);

        board.archive_task(1).unwrap();
        assert_eq!(ids(&board, ColumnId::Todo), vec![2]);
        assert_eq!(ids(&board, ColumnId::Archived), vec![1]);

        board.delete_task(1).unwrap();
        assert!(board.partition().get(1).is_none());
        assert_eq!(repo.snapshot().len(), 1);
    }

    #[test]
    fn test_remote_restore_goes_to_end_of_target() {
        let repo = seeded_repo();
        let mut board = remote(&repo, alice());
        board.archive_task(1).unwrap();
        board.restore_task(1, ColumnId::Todo).unwrap();
        assert_eq!(ids(&board, ColumnId::Todo), vec![2, 1]);
        assert!(matches!(
            board.restore_task(2, ColumnId::Todo),
            Err(BoardError::NotArchived(2))
        ));
    }

    #[test]
    fn test_remote_reorder_survives_refetch() {
        let repo = seeded_repo();
        let mut board = remote(&repo, alice());
        board.add_task(TaskDraft::new("C", ColumnId::Todo)).unwrap();
        let before = ids(&board, ColumnId::Todo);

        board.reorder_within_column(ColumnId::Todo, 0, 2).unwrap();
        let expected = vec![before[1], before[2], before[0]];
        assert_eq!(ids(&board, ColumnId::Todo), expected);

        board.resync();
        assert_eq!(ids(&board, ColumnId::Todo), expected);
    }

    #[test]
    fn test_remote_reorder_writes_only_moved_task() {
        let repo = seeded_repo();
        let mut board = remote(&repo, alice());
        board.add_task(TaskDraft::new("C", ColumnId::Todo)).unwrap();
        let writes = repo.update_calls();

        board.reorder_within_column(ColumnId::Todo, 2, 1).unwrap();
        assert_eq!(repo.update_calls(), writes + 1);
        assert_eq!(ids(&board, ColumnId::Todo), vec![1, 3, 2]);
        let orders: Vec<i64> = repo.snapshot().iter().map(|t| t.order).collect();
        assert_eq!(orders, vec![0, 1000, 500]);
    }

    #[test]
    fn test_remote_renumber_failure_resyncs_with_repository() {
        let tasks = (1..=3)
            .map(|id| {
                let mut t = task(id, "T", ColumnId::Todo);
                t.order = id as i64 - 1;
                t
            })
            .collect();
        let repo = MemoryRepository::with_tasks(tasks);
        let mut board = remote(&repo, alice());

        // 0, 1, 2 之间没有空隙，只能整列重新编号；第二次写入失败
        repo.fail_nth_update(2);
        let err = board.reorder_within_column(ColumnId::Todo, 0, 1).unwrap_err();
        assert!(matches!(err, BoardError::Repository(_)));
        assert_eq!(board.partition(), &reconcile::rebuild(repo.snapshot()));

        // 之后的拖拽只写一次
        let writes = repo.update_calls();
        board.reorder_within_column(ColumnId::Todo, 0, 1).unwrap();
        assert_eq!(repo.update_calls(), writes + 1);
        assert_eq!(ids(&board, ColumnId::Todo), vec![2, 1, 3]);
        assert_eq!(board.partition(), &reconcile::rebuild(repo.snapshot()));
    }

    #[test]
    fn test_remote_add_notifies_when_refetch_fails() {
        let repo = seeded_repo();
        let notifier = RecordingNotifier::new();
        let mut board =
            remote(&repo, alice()).with_notifier(NotificationQueue::spawn(Box::new(notifier.clone())));

        repo.set_fail_list(true);
        let draft = TaskDraft::new("C", ColumnId::Todo).with_assignee(Some("bob".to_string()));
        let id = board.add_task(draft).unwrap().unwrap();
        assert!(board.partition().get(id).is_none());
        drop(board);

        let sent = notifier.sent();
        let kinds: Vec<ActionKind> = sent.iter().map(|(_, k)| *k).collect();
        assert_eq!(kinds, vec![ActionKind::Created, ActionKind::Assigned]);
        assert_eq!(sent[0].0, id);
    }

    #[test]
    fn test_apply_drag_move_appends_to_destination() {
        let repo = MemoryRepository::with_tasks(vec![
            task(1, "A", ColumnId::Todo),
            {
                let mut b = task(2, "B", ColumnId::Todo);
                b.order = 1000;
                b
            },
        ]);
        let mut board = remote(&repo, alice());
        let changed = board
            .apply_drag(DragOutcome::Move {
                task_id: 1,
                from: ColumnId::Todo,
                to: ColumnId::Done,
            })
            .unwrap();
        assert!(changed);
        assert_eq!(ids(&board, ColumnId::Todo), vec![2]);
        assert_eq!(ids(&board, ColumnId::Done), vec![1]);
        assert_eq!(board.partition().get(1).unwrap().column_id, ColumnId::Done);
        assert!(board.partition().is_consistent());

        assert!(!board.apply_drag(DragOutcome::Cancelled).unwrap());
    }

    #[test]
    fn test_notifications_follow_mutations() {
        let dir = TempDir::new().unwrap();
        let notifier = RecordingNotifier::new();
        let mut board = Board::open_local(LocalStore::new(dir.path().join("s.json")), alice())
            .unwrap()
            .with_notifier(NotificationQueue::spawn(Box::new(notifier.clone())));

        let id = board
            .add_task(TaskDraft::new("A", ColumnId::Todo).with_assignee(Some("bob".to_string())))
            .unwrap()
            .unwrap();
        board.toggle_completed(id).unwrap();
        board.toggle_completed(id).unwrap();
        board.edit_task(id, TaskPatch::text("")).unwrap();
        board.archive_task(id).unwrap();
        board.delete_task(id).unwrap();
        drop(board);

        let kinds: Vec<ActionKind> = notifier.sent().into_iter().map(|(_, k)| k).collect();
        assert_eq!(
            kinds,
            vec![
                ActionKind::Created,
                ActionKind::Assigned,
                ActionKind::Completed,
                ActionKind::Archived,
                ActionKind::Deleted,
            ]
        );
    }

    #[test]
    fn test_edit_notifies_assignment_change() {
        let dir = TempDir::new().unwrap();
        let notifier = RecordingNotifier::new();
        let mut board = Board::open_local(LocalStore::new(dir.path().join("s.json")), alice())
            .unwrap()
            .with_notifier(NotificationQueue::spawn(Box::new(notifier.clone())));

        let id = board.add_task(TaskDraft::new("A", ColumnId::Todo)).unwrap().unwrap();
        let patch = TaskPatch {
            assignee: Some(Some("carol".to_string())),
            ..TaskPatch::default()
        };
        assert!(board.edit_task(id, patch).unwrap());
        assert_eq!(board.partition().get(id).unwrap().assignee.as_deref(), Some("carol"));
        drop(board);

        let kinds: Vec<ActionKind> = notifier.sent().into_iter().map(|(_, k)| k).collect();
        assert_eq!(
            kinds,
            vec![ActionKind::Created, ActionKind::Edited, ActionKind::Assigned]
        );
    }
}
