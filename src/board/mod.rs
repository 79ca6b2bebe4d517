pub mod auth;
pub mod drag;
pub mod error;
pub mod partition;
pub mod reconcile;
pub mod service;

pub use drag::{Bounds, DragController, DragOutcome, DropTarget, DropZone, Point, Step};
pub use error::{BoardError, BoardResult};
pub use partition::Partition;
pub use service::Board;
