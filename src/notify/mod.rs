//! 任务事件通知
//!
//! 通知在后台线程中发送，永远不会阻塞或回滚触发它的任务修改。
//! 发送失败只记录日志，不重试。

pub mod telegram;

use std::sync::mpsc::{self, Sender};
use std::thread::JoinHandle;

use crate::log::log_debug;
use crate::models::{Actor, Task};

pub use telegram::TelegramNotifier;

/// 通知的动作类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    Created,
    Completed,
    Archived,
    Deleted,
    Edited,
    Assigned,
}

impl ActionKind {
    pub fn key(self) -> &'static str {
        match self {
            ActionKind::Created => "create",
            ActionKind::Completed => "complete",
            ActionKind::Archived => "archive",
            ActionKind::Deleted => "delete",
            ActionKind::Edited => "edit",
            ActionKind::Assigned => "assign",
        }
    }
}

/// 通知发送器，返回是否发送成功
pub trait Notifier {
    fn notify(&self, task: &Task, action: ActionKind, actor: &Actor) -> bool;
}

struct Job {
    task: Task,
    action: ActionKind,
    actor: Actor,
}

/// 后台通知队列
///
/// 丢弃队列时关闭通道，工作线程发送完剩余的通知后退出。
pub struct NotificationQueue {
    sender: Option<Sender<Job>>,
    worker: Option<JoinHandle<()>>,
}

impl NotificationQueue {
    pub fn spawn(notifier: Box<dyn Notifier + Send>) -> Self {
        let (sender, receiver) = mpsc::channel::<Job>();

        let worker = std::thread::Builder::new()
            .name("kanban-notify".to_string())
            .spawn(move || {
                for job in receiver {
                    if !notifier.notify(&job.task, job.action, &job.actor) {
                        log_debug(format!(
                            "通知发送失败: 任务 #{} ({})",
                            job.task.id,
                            job.action.key()
                        ));
                    }
                }
            });

        match worker {
            Ok(handle) => Self {
                sender: Some(sender),
                worker: Some(handle),
            },
            Err(e) => {
                log_debug(format!("无法启动通知线程: {}", e));
                Self {
                    sender: None,
                    worker: None,
                }
            }
        }
    }

    /// 投递通知，立即返回
    pub fn dispatch(&self, task: &Task, action: ActionKind, actor: &Actor) {
        let Some(sender) = &self.sender else {
            return;
        };
        let job = Job {
            task: task.clone(),
            action,
            actor: actor.clone(),
        };
        if sender.send(job).is_err() {
            log_debug(format!("通知线程已退出，丢弃通知: 任务 #{}", task.id));
        }
    }
}

impl Drop for NotificationQueue {
    fn drop(&mut self) {
        self.sender.take();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::board::partition::tests::task;
    use crate::models::{ColumnId, Role, TaskId};
    use std::sync::{Arc, Mutex};

    /// 记录收到的通知；`succeed = false` 时模拟发送失败
    #[derive(Clone, Default)]
    pub(crate) struct RecordingNotifier {
        pub sent: Arc<Mutex<Vec<(TaskId, ActionKind)>>>,
        pub succeed: bool,
    }

    impl RecordingNotifier {
        pub(crate) fn new() -> Self {
            Self {
                sent: Arc::default(),
                succeed: true,
            }
        }

        pub(crate) fn sent(&self) -> Vec<(TaskId, ActionKind)> {
            self.sent.lock().unwrap().clone()
        }
    }

    impl Notifier for RecordingNotifier {
        fn notify(&self, task: &Task, action: ActionKind, _actor: &Actor) -> bool {
            self.sent.lock().unwrap().push((task.id, action));
            self.succeed
        }
    }

    #[test]
    fn test_queue_delivers_in_order_and_drains_on_drop() {
        let notifier = RecordingNotifier::new();
        let queue = NotificationQueue::spawn(Box::new(notifier.clone()));
        let actor = Actor::new("alice", Role::Member);
        let t = task(1, "A", ColumnId::Todo);

        queue.dispatch(&t, ActionKind::Created, &actor);
        queue.dispatch(&t, ActionKind::Completed, &actor);
        drop(queue);

        assert_eq!(
            notifier.sent(),
            vec![(1, ActionKind::Created), (1, ActionKind::Completed)]
        );
    }

    #[test]
    fn test_failed_notification_is_swallowed() {
        let notifier = RecordingNotifier {
            succeed: false,
            ..RecordingNotifier::new()
        };
        let queue = NotificationQueue::spawn(Box::new(notifier.clone()));
        let actor = Actor::new("alice", Role::Member);
        queue.dispatch(&task(2, "B", ColumnId::Todo), ActionKind::Deleted, &actor);
        drop(queue);
        assert_eq!(notifier.sent(), vec![(2, ActionKind::Deleted)]);
    }
}
