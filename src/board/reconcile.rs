use super::partition::Partition;
use crate::models::Task;

/// 从权威的扁平任务列表重建划分
///
/// 按 `column_id` 分组，列内按 `(order, id)` 稳定排序；
/// 已归档的任务进入单独的归档列表。
pub fn rebuild(tasks: impl IntoIterator<Item = Task>) -> Partition {
    let mut tasks: Vec<Task> = tasks.into_iter().collect();
    tasks.sort_by_key(|t| (t.order, t.id));

    let mut partition = Partition::new();
    for task in tasks {
        let column = task.column_id;
        partition.column_mut(column).push(task);
    }
    partition
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::partition::tests::task;
    use crate::models::ColumnId;

    fn remote_list() -> Vec<Task> {
        let mut a = task(1, "A", ColumnId::Todo);
        a.order = 2000;
        let mut b = task(2, "B", ColumnId::Todo);
        b.order = 1000;
        let mut c = task(3, "C", ColumnId::Done);
        c.order = 0;
        let d = task(4, "D", ColumnId::Archived);
        let mut e = task(5, "E", ColumnId::Todo);
        e.order = 1000;
        vec![a, c, d, b, e]
    }

    #[test]
    fn test_rebuild_groups_by_column_and_sorts() {
        let p = rebuild(remote_list());
        let todo: Vec<_> = p.column(ColumnId::Todo).iter().map(|t| t.id).collect();
        assert_eq!(todo, vec![2, 5, 1]);
        assert_eq!(p.column(ColumnId::Done)[0].id, 3);
        assert_eq!(p.column(ColumnId::Archived)[0].id, 4);
        assert!(p.column(ColumnId::InProgress).is_empty());
        assert!(p.is_consistent());
        assert_eq!(p.len(), 5);
    }

    #[test]
    fn test_rebuild_is_idempotent() {
        let first = rebuild(remote_list());
        let second = rebuild(remote_list());
        assert_eq!(first, second);

        let again = rebuild(first.iter().cloned().collect::<Vec<_>>());
        assert_eq!(again, first);
    }

    #[test]
    fn test_rebuild_empty_list() {
        assert!(rebuild(Vec::new()).is_empty());
    }
}
