use std::cell::{Cell, RefCell};
use std::rc::Rc;

use anyhow::{anyhow, bail, Result};

use super::TaskRepository;
use crate::models::{Task, TaskDraft, TaskId, TaskPatch};

/// 进程内仓库，支持注入失败
///
/// 克隆共享同一份数据，测试可以在看板之外观察和修改仓库状态。
#[derive(Debug, Clone, Default)]
pub struct MemoryRepository {
    tasks: Rc<RefCell<Vec<Task>>>,
    next_id: Rc<Cell<TaskId>>,
    fail_writes: Rc<Cell<bool>>,
    fail_list: Rc<Cell<bool>>,
    list_calls: Rc<Cell<usize>>,
    update_calls: Rc<Cell<usize>>,
    fail_update_at: Rc<Cell<Option<usize>>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        let repo = Self::default();
        repo.next_id.set(1);
        repo
    }

    pub fn with_tasks(tasks: Vec<Task>) -> Self {
        let repo = Self::new();
        let max_id = tasks.iter().map(|t| t.id).max().unwrap_or(0);
        repo.next_id.set(max_id + 1);
        *repo.tasks.borrow_mut() = tasks;
        repo
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.set(fail);
    }

    pub fn set_fail_list(&self, fail: bool) {
        self.fail_list.set(fail);
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.get()
    }

    pub fn update_calls(&self) -> usize {
        self.update_calls.get()
    }

    /// 从现在起第 `n` 次 update 失败一次
    pub fn fail_nth_update(&self, n: usize) {
        self.fail_update_at.set(Some(self.update_calls.get() + n));
    }

    pub fn snapshot(&self) -> Vec<Task> {
        self.tasks.borrow().clone()
    }

    /// 模拟另一个会话直接写入仓库
    pub fn push_external(&self, task: Task) {
        self.tasks.borrow_mut().push(task);
    }

    fn check_writes(&self) -> Result<()> {
        if self.fail_writes.get() {
            bail!("simulated write failure");
        }
        Ok(())
    }
}

impl TaskRepository for MemoryRepository {
    fn list(&self) -> Result<Vec<Task>> {
        self.list_calls.set(self.list_calls.get() + 1);
        if self.fail_list.get() {
            bail!("simulated list failure");
        }
        Ok(self.snapshot())
    }

    fn insert(&self, draft: &TaskDraft) -> Result<Task> {
        self.check_writes()?;
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        let task = Task::from_draft(id, draft.clone());
        self.tasks.borrow_mut().push(task.clone());
        Ok(task)
    }

    fn update(&self, id: TaskId, patch: &TaskPatch) -> Result<Task> {
        let call = self.update_calls.get() + 1;
        self.update_calls.set(call);
        if self.fail_update_at.get() == Some(call) {
            self.fail_update_at.set(None);
            bail!("simulated failure on update #{}", call);
        }
        self.check_writes()?;
        let mut tasks = self.tasks.borrow_mut();
        let task = tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| anyhow!("task {} not found", id))?;
        patch.apply_all(task);
        Ok(task.clone())
    }

    fn delete(&self, id: TaskId) -> Result<()> {
        self.check_writes()?;
        let mut tasks = self.tasks.borrow_mut();
        let before = tasks.len();
        tasks.retain(|t| t.id != id);
        if tasks.len() == before {
            bail!("task {} not found", id);
        }
        Ok(())
    }
}
