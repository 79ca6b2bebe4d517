//! 拖拽手势控制器
//!
//! 状态机：`Idle` → 拾起任务 → `Dragging` → 放下/取消 → `Idle`。
//! 控制器只负责把手势解析成 [`DragOutcome`]，不修改划分；
//! 结果由 [`Board::apply_drag`](super::Board::apply_drag) 在授权检查后应用。

use super::partition::Partition;
use crate::log::log_debug;
use crate::models::{ColumnId, Task, TaskId};

/// 指针位置（终端单元格坐标）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// 放置区域的矩形范围
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x < self.x + self.width && p.y >= self.y && p.y < self.y + self.height
    }
}

/// 放置目标：某个任务卡片，或者列本身
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropTarget {
    Task(TaskId),
    Column(ColumnId),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DropZone {
    pub target: DropTarget,
    pub bounds: Bounds,
}

/// closest-center 碰撞检测：中心点离指针最近的区域胜出，距离相同时取第一个
pub fn closest_center(point: Point, zones: &[DropZone]) -> Option<DropTarget> {
    let mut best: Option<(f32, DropTarget)> = None;
    for zone in zones {
        let c = zone.bounds.center();
        let distance = (c.x - point.x).powi(2) + (c.y - point.y).powi(2);
        if best.is_none_or(|(d, _)| distance < d) {
            best = Some((distance, zone.target));
        }
    }
    best.map(|(_, target)| target)
}

/// 键盘拖拽的单步方向
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Up,
    Down,
    Left,
    Right,
}

/// 键盘拖拽时的落点指示
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyboardCursor {
    pub column: ColumnId,
    pub index: usize,
}

impl KeyboardCursor {
    fn max_index(&self, partition: &Partition, origin: ColumnId) -> usize {
        let len = partition.column(self.column).len();
        if self.column == origin {
            len.saturating_sub(1)
        } else {
            // 其他列允许停在末尾之后（放到列本身）
            len
        }
    }

    fn step(&mut self, partition: &Partition, origin: ColumnId, step: Step) {
        match step {
            Step::Up => self.index = self.index.saturating_sub(1),
            Step::Down => self.index = (self.index + 1).min(self.max_index(partition, origin)),
            Step::Left | Step::Right => {
                let current = self.column.board_index().unwrap_or(0);
                let next = match step {
                    Step::Left => current.saturating_sub(1),
                    _ => (current + 1).min(ColumnId::BOARD.len() - 1),
                };
                if let Some(column) = ColumnId::from_board_index(next) {
                    self.column = column;
                }
                self.index = self.index.min(self.max_index(partition, origin));
            }
        }
    }

    /// 当前指示位置对应的放置目标
    pub fn target(&self, partition: &Partition) -> DropTarget {
        match partition.column(self.column).get(self.index) {
            Some(task) => DropTarget::Task(task.id),
            None => DropTarget::Column(self.column),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum DragState {
    Idle,
    Dragging {
        task_id: TaskId,
        origin: ColumnId,
        pointer: Option<Point>,
        cursor: KeyboardCursor,
    },
}

/// 一次手势的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragOutcome {
    /// 没有有效落点，不做任何修改
    Cancelled,
    /// 同列且位置不变
    Unchanged,
    Reorder {
        column: ColumnId,
        from: usize,
        to: usize,
    },
    Move {
        task_id: TaskId,
        from: ColumnId,
        to: ColumnId,
    },
}

#[derive(Debug)]
pub struct DragController {
    state: DragState,
}

impl Default for DragController {
    fn default() -> Self {
        Self::new()
    }
}

impl DragController {
    pub fn new() -> Self {
        Self {
            state: DragState::Idle,
        }
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    pub fn active_id(&self) -> Option<TaskId> {
        match self.state {
            DragState::Dragging { task_id, .. } => Some(task_id),
            DragState::Idle => None,
        }
    }

    /// 正在拖拽的任务（用于浮动预览）
    pub fn active<'a>(&self, partition: &'a Partition) -> Option<&'a Task> {
        partition.get(self.active_id()?)
    }

    pub fn pointer(&self) -> Option<Point> {
        match self.state {
            DragState::Dragging { pointer, .. } => pointer,
            DragState::Idle => None,
        }
    }

    pub fn cursor(&self) -> Option<KeyboardCursor> {
        match self.state {
            DragState::Dragging { cursor, .. } => Some(cursor),
            DragState::Idle => None,
        }
    }

    /// 拾起任务；已归档任务和进行中的手势都会被忽略
    pub fn pick_up<'a>(&mut self, partition: &'a Partition, task_id: TaskId) -> Option<&'a Task> {
        if self.is_dragging() {
            return None;
        }
        let (column, index) = partition.find(task_id)?;
        if !column.is_board() {
            return None;
        }
        self.state = DragState::Dragging {
            task_id,
            origin: column,
            pointer: None,
            cursor: KeyboardCursor { column, index },
        };
        partition.get(task_id)
    }

    pub fn hover(&mut self, point: Point) {
        if let DragState::Dragging { pointer, .. } = &mut self.state {
            *pointer = Some(point);
        }
    }

    /// 键盘单步移动落点
    pub fn step(&mut self, partition: &Partition, step: Step) {
        if let DragState::Dragging { origin, cursor, .. } = &mut self.state {
            cursor.step(partition, *origin, step);
        }
    }

    pub fn cancel(&mut self) {
        self.state = DragState::Idle;
    }

    /// 指针放下：用 closest-center 选出落点
    pub fn drop_at(&mut self, partition: &Partition, point: Point, zones: &[DropZone]) -> DragOutcome {
        self.drop_on(partition, closest_center(point, zones))
    }

    /// 键盘放下：使用当前落点指示
    pub fn drop_keyboard(&mut self, partition: &Partition) -> DragOutcome {
        let target = self.cursor().map(|c| c.target(partition));
        self.drop_on(partition, target)
    }

    /// 结束手势并把落点解析成结果
    pub fn drop_on(&mut self, partition: &Partition, target: Option<DropTarget>) -> DragOutcome {
        let state = std::mem::replace(&mut self.state, DragState::Idle);
        let DragState::Dragging { task_id, .. } = state else {
            return DragOutcome::Cancelled;
        };

        let Some(target) = target else {
            log_debug(format!("拖拽取消: 任务 #{} 没有落点", task_id));
            return DragOutcome::Cancelled;
        };

        let Some((from, from_index)) = partition.find(task_id) else {
            log_debug(format!("拖拽取消: 任务 #{} 已不存在", task_id));
            return DragOutcome::Cancelled;
        };

        let (to, over_index) = match target {
            DropTarget::Task(over) => match partition.find(over) {
                Some((column, index)) => (column, Some(index)),
                None => return DragOutcome::Cancelled,
            },
            DropTarget::Column(column) => (column, None),
        };

        if !from.is_board() || !to.is_board() {
            return DragOutcome::Cancelled;
        }

        if from == to {
            let last = partition.column(from).len().saturating_sub(1);
            let to_index = over_index.unwrap_or(last);
            if to_index == from_index {
                DragOutcome::Unchanged
            } else {
                DragOutcome::Reorder {
                    column: from,
                    from: from_index,
                    to: to_index,
                }
            }
        } else {
            DragOutcome::Move { task_id, from, to }
        }
    }
}
