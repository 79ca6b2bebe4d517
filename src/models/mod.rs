pub mod actor;
pub mod column;
pub mod task;

pub use actor::{Actor, Role};
pub use column::ColumnId;
pub use task::{parse_due_date, Priority, Task, TaskDraft, TaskId, TaskPatch};
