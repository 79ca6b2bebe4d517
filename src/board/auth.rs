use super::error::{BoardError, BoardResult};
use crate::models::{Actor, ColumnId, Task};

/// 需要授权的操作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Edit,
    Toggle,
    Move,
    Delete,
}

/// 检查操作者是否可以对任务执行操作
///
/// 创建者或管理员可以修改任务；没有创建者的旧数据对所有人开放。
/// 删除额外要求任务已归档，管理员也不例外。
pub fn authorize(actor: &Actor, task: &Task, action: Action) -> BoardResult<()> {
    if action == Action::Delete && task.column_id != ColumnId::Archived {
        return Err(BoardError::NotArchived(task.id));
    }

    let is_owner = match task.created_by.as_deref() {
        Some(owner) => owner == actor.id,
        None => true,
    };

    if is_owner || actor.is_admin() {
        Ok(())
    } else {
        Err(BoardError::Unauthorized {
            actor: actor.id.clone(),
            task: task.id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::partition::tests::task;
    use crate::models::Role;

    #[test]
    fn test_owner_and_admin_may_edit() {
        let t = task(1, "A", ColumnId::Todo);
        assert!(authorize(&Actor::new("alice", Role::Member), &t, Action::Edit).is_ok());
        assert!(authorize(&Actor::new("root", Role::Admin), &t, Action::Move).is_ok());
    }

    #[test]
    fn test_stranger_is_rejected() {
        let t = task(1, "A", ColumnId::Todo);
        let bob = Actor::new("bob", Role::Member);
        for action in [Action::Edit, Action::Toggle, Action::Move] {
            assert!(matches!(
                authorize(&bob, &t, action),
                Err(BoardError::Unauthorized { task: 1, .. })
            ));
        }
    }

    #[test]
    fn test_delete_requires_archived_even_for_admin() {
        let mut t = task(1, "A", ColumnId::Done);
        let admin = Actor::new("root", Role::Admin);
        assert!(matches!(
            authorize(&admin, &t, Action::Delete),
            Err(BoardError::NotArchived(1))
        ));
        t.column_id = ColumnId::Archived;
        assert!(authorize(&admin, &t, Action::Delete).is_ok());
        assert!(authorize(&Actor::new("bob", Role::Member), &t, Action::Delete).is_err());
    }

    #[test]
    fn test_legacy_task_without_owner_is_open() {
        let mut t = task(1, "A", ColumnId::Todo);
        t.created_by = None;
        assert!(authorize(&Actor::new("bob", Role::Member), &t, Action::Edit).is_ok());
    }
}
