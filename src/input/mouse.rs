use crate::app::{App, Mode};
use crate::ui::{self, kanban};
use crossterm::event::{MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;

use super::keyboard::finish_drag;

/// 处理鼠标输入：按下拿起卡片，拖动更新指针，松开放下
///
/// `area` 是整个终端区域，放置区域和渲染使用同一份布局。
pub fn handle_mouse_input(app: &mut App, mouse: MouseEvent, area: Rect) {
    if app.mode != Mode::Normal || app.show_welcome_dialog {
        return;
    }

    let (board_area, _) = ui::main_layout(area);
    let point = kanban::cell_point(mouse.column, mouse.row);

    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            // 键盘拖拽进行中时忽略
            if app.drag.is_dragging() {
                return;
            }
            let Some(id) = kanban::card_at(board_area, app.board.partition(), point) else {
                return;
            };
            app.select_task(id);
            if app.drag.pick_up(app.board.partition(), id).is_some() {
                app.drag.hover(point);
            }
        }
        MouseEventKind::Drag(MouseButton::Left) => {
            if app.drag.pointer().is_some() {
                app.drag.hover(point);
            }
        }
        MouseEventKind::Up(MouseButton::Left) => {
            // 只结束指针发起的手势
            if app.drag.pointer().is_none() {
                return;
            }
            let zones = kanban::drop_zones(board_area, app.board.partition());
            let id = app.drag.active_id();
            let outcome = app.drag.drop_at(app.board.partition(), point, &zones);
            finish_drag(app, id, outcome);
        }
        _ => {}
    }
}
