use crate::app::{App, Mode, NotificationLevel};
use crate::board::{DragOutcome, Step};
use crate::input::Command;
use crate::models::{parse_due_date, ColumnId, TaskDraft, TaskId, TaskPatch};
use crate::ui::dialogs::{ConfirmAction, DialogType, InputPurpose, SelectPurpose};
use crate::ui::text_input::InputAction;
use crossterm::event::{KeyCode, KeyEvent};

/// 处理键盘输入
/// 返回 false 表示应该退出应用
pub fn handle_key_input(app: &mut App, key: KeyEvent) -> bool {
    // 如果显示欢迎对话框，任意按键都关闭它
    if app.show_welcome_dialog {
        app.show_welcome_dialog = false;
        return true;
    }

    match app.mode {
        Mode::Normal if app.drag.is_dragging() => handle_drag_mode(app, key),
        Mode::Normal => handle_normal_mode(app, key),
        Mode::Dialog => handle_dialog_mode(app, key),
        Mode::Help => handle_help_mode(app, key),
        Mode::Archive => handle_archive_mode(app, key),
    }
}

/// 正常模式的按键映射
pub fn match_key(key: KeyEvent) -> Option<Command> {
    let cmd = match key.code {
        KeyCode::Char('q') => Command::Quit,
        KeyCode::Char('j') | KeyCode::Down => Command::TaskDown,
        KeyCode::Char('k') | KeyCode::Up => Command::TaskUp,
        KeyCode::Char('h') | KeyCode::Left => Command::ColumnLeft,
        KeyCode::Char('l') | KeyCode::Right => Command::ColumnRight,
        KeyCode::Char('a') => Command::NewTask,
        KeyCode::Char('e') => Command::EditTask,
        KeyCode::Char('p') => Command::CyclePriority,
        KeyCode::Char('u') => Command::SetAssignee,
        KeyCode::Char('D') => Command::SetDueDate,
        KeyCode::Char('x') | KeyCode::Enter => Command::ToggleTask,
        KeyCode::Char('d') => Command::ArchiveTask,
        KeyCode::Char(' ') => Command::PickUp,
        KeyCode::Char('H') => Command::MoveTask(Step::Left),
        KeyCode::Char('L') => Command::MoveTask(Step::Right),
        KeyCode::Char('J') => Command::MoveTask(Step::Down),
        KeyCode::Char('K') => Command::MoveTask(Step::Up),
        KeyCode::Char('v') => Command::OpenArchive,
        KeyCode::Char('t') => Command::ToggleDarkMode,
        KeyCode::Char('R') => Command::Resync,
        KeyCode::Char('?') => Command::ShowHelp,
        _ => return None,
    };
    Some(cmd)
}

/// 处理正常模式的按键
fn handle_normal_mode(app: &mut App, key: KeyEvent) -> bool {
    match match_key(key) {
        Some(Command::Quit) => false,
        Some(cmd) => {
            execute_command(app, cmd);
            true
        }
        None => true,
    }
}

/// 键盘拖拽中：方向键移动落点，Space/Enter 放下，Esc 取消
fn handle_drag_mode(app: &mut App, key: KeyEvent) -> bool {
    let step = match key.code {
        KeyCode::Char('h') | KeyCode::Left => Some(Step::Left),
        KeyCode::Char('l') | KeyCode::Right => Some(Step::Right),
        KeyCode::Char('k') | KeyCode::Up => Some(Step::Up),
        KeyCode::Char('j') | KeyCode::Down => Some(Step::Down),
        _ => None,
    };
    if let Some(step) = step {
        app.drag.step(app.board.partition(), step);
        return true;
    }

    match key.code {
        KeyCode::Char(' ') | KeyCode::Enter => {
            let id = app.drag.active_id();
            let outcome = app.drag.drop_keyboard(app.board.partition());
            finish_drag(app, id, outcome);
        }
        KeyCode::Esc => {
            app.drag.cancel();
            app.show_notification("已取消拖拽".to_string(), NotificationLevel::Info);
        }
        _ => {}
    }
    true
}

/// 应用拖拽结果，成功后选中被移动的任务
pub(super) fn finish_drag(app: &mut App, id: Option<TaskId>, outcome: DragOutcome) {
    let result = app.board.apply_drag(outcome);
    if app.report(result) == Some(true) {
        if let Some(id) = id {
            app.select_task(id);
        }
    }
}

/// 执行命令
pub fn execute_command(app: &mut App, cmd: Command) {
    match cmd {
        Command::Quit => {}
        Command::TaskDown => {
            let len = app.board.partition().column(app.current_column()).len();
            app.selected_index = (app.selected_index + 1).min(len.saturating_sub(1));
        }
        Command::TaskUp => {
            app.selected_index = app.selected_index.saturating_sub(1);
        }
        Command::ColumnLeft => {
            app.selected_column = app.selected_column.saturating_sub(1);
            app.clamp_selection();
        }
        Command::ColumnRight => {
            app.selected_column = (app.selected_column + 1).min(ColumnId::BOARD.len() - 1);
            app.clamp_selection();
        }
        Command::NewTask => {
            let column = app.current_column();
            open_input(
                app,
                "新建任务",
                &format!("在「{}」中新建任务：", column.label()),
                "",
                InputPurpose::NewTask(column),
            );
        }
        Command::EditTask => {
            if let Some(task) = app.selected_task() {
                let (id, text) = (task.id, task.text.clone());
                open_input(app, "编辑任务", "任务文本：", &text, InputPurpose::EditText(id));
            }
        }
        Command::SetAssignee => {
            if let Some(task) = app.selected_task() {
                let id = task.id;
                let current = task.assignee.clone().unwrap_or_default();
                open_input(
                    app,
                    "负责人",
                    "负责人（留空清除）：",
                    &current,
                    InputPurpose::Assignee(id),
                );
            }
        }
        Command::SetDueDate => {
            if let Some(task) = app.selected_task() {
                let id = task.id;
                let current = task
                    .due_date
                    .map(|d| d.format("%Y-%m-%d").to_string())
                    .unwrap_or_default();
                open_input(
                    app,
                    "截止日期",
                    "截止日期 YYYY-MM-DD（留空清除）：",
                    &current,
                    InputPurpose::DueDate(id),
                );
            }
        }
        Command::CyclePriority => {
            if let Some(task) = app.selected_task() {
                let id = task.id;
                let patch = TaskPatch {
                    priority: Some(task.priority.next()),
                    ..TaskPatch::default()
                };
                let result = app.board.edit_task(id, patch);
                app.report(result);
            }
        }
        Command::ToggleTask => {
            if let Some(id) = app.selected_task().map(|t| t.id) {
                let result = app.board.toggle_completed(id);
                match app.report(result) {
                    Some(true) => {
                        app.show_notification("任务已完成".to_string(), NotificationLevel::Success)
                    }
                    Some(false) => {
                        app.show_notification("任务已标记为未完成".to_string(), NotificationLevel::Info)
                    }
                    None => {}
                }
            }
        }
        Command::ArchiveTask => {
            if let Some(id) = app.selected_task().map(|t| t.id) {
                let result = app.board.archive_task(id);
                if app.report(result).is_some() {
                    app.show_notification("任务已归档（v 查看归档）".to_string(), NotificationLevel::Info);
                }
            }
        }
        Command::PickUp => {
            if let Some(id) = app.selected_task().map(|t| t.id) {
                app.drag.pick_up(app.board.partition(), id);
            }
        }
        Command::MoveTask(step) => {
            if let Some(id) = app.selected_task().map(|t| t.id) {
                if app.drag.pick_up(app.board.partition(), id).is_some() {
                    app.drag.step(app.board.partition(), step);
                    let outcome = app.drag.drop_keyboard(app.board.partition());
                    finish_drag(app, Some(id), outcome);
                }
            }
        }
        Command::OpenArchive => {
            app.archive_index = 0;
            app.mode = Mode::Archive;
        }
        Command::ToggleDarkMode => {
            let dark = !app.board.dark_mode();
            app.board.set_dark_mode(dark);
        }
        Command::Resync => {
            if app.board.resync() {
                app.clamp_selection();
                app.show_notification("已同步".to_string(), NotificationLevel::Success);
            } else {
                app.show_notification("同步失败，显示的可能是旧数据".to_string(), NotificationLevel::Error);
            }
        }
        Command::ShowHelp => {
            app.mode = Mode::Help;
        }
    }
}

fn open_input(app: &mut App, title: &str, prompt: &str, initial: &str, purpose: InputPurpose) {
    app.dialog = Some(DialogType::input(title, prompt, initial, purpose));
    app.mode = Mode::Dialog;
}

fn close_dialog(app: &mut App, back_to: Mode) {
    app.dialog = None;
    app.mode = back_to;
}

/// 处理对话框模式的按键
fn handle_dialog_mode(app: &mut App, key: KeyEvent) -> bool {
    let Some(dialog) = app.dialog.as_mut() else {
        app.mode = Mode::Normal;
        return true;
    };

    match dialog {
        DialogType::Input { field, purpose, .. } => match field.handle_key(key) {
            InputAction::Continue => {}
            InputAction::Cancel => close_dialog(app, Mode::Normal),
            InputAction::Submit => {
                let (value, purpose) = (field.value(), *purpose);
                close_dialog(app, Mode::Normal);
                submit_input(app, purpose, value);
            }
        },
        DialogType::Select {
            items,
            selected,
            purpose,
            ..
        } => match key.code {
            KeyCode::Esc => close_dialog(app, Mode::Archive),
            KeyCode::Char('j') | KeyCode::Down => {
                *selected = (*selected + 1).min(items.len().saturating_sub(1));
            }
            KeyCode::Char('k') | KeyCode::Up => {
                *selected = selected.saturating_sub(1);
            }
            KeyCode::Enter => {
                let (index, purpose) = (*selected, *purpose);
                close_dialog(app, Mode::Archive);
                submit_select(app, purpose, index);
            }
            _ => {}
        },
        DialogType::Confirm {
            yes_selected,
            action,
            ..
        } => match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => {
                let action = *action;
                close_dialog(app, Mode::Archive);
                confirm(app, action);
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                close_dialog(app, Mode::Archive);
            }
            KeyCode::Left | KeyCode::Right | KeyCode::Tab | KeyCode::Char('h') | KeyCode::Char('l') => {
                *yes_selected = !*yes_selected;
            }
            KeyCode::Enter => {
                let (yes, action) = (*yes_selected, *action);
                close_dialog(app, Mode::Archive);
                if yes {
                    confirm(app, action);
                }
            }
            _ => {}
        },
    }
    true
}

/// 提交输入对话框
fn submit_input(app: &mut App, purpose: InputPurpose, value: String) {
    match purpose {
        InputPurpose::NewTask(column) => {
            let result = app.board.add_task(TaskDraft::new(value, column));
            if let Some(Some(id)) = app.report(result) {
                app.select_task(id);
                app.show_notification("任务已创建".to_string(), NotificationLevel::Success);
            }
        }
        InputPurpose::EditText(id) => {
            let result = app.board.edit_task(id, TaskPatch::text(value));
            if app.report(result) == Some(true) {
                app.show_notification("任务已更新".to_string(), NotificationLevel::Success);
            }
        }
        InputPurpose::Assignee(id) => {
            let assignee = Some(value.trim().to_string()).filter(|a| !a.is_empty());
            let patch = TaskPatch {
                assignee: Some(assignee),
                ..TaskPatch::default()
            };
            let result = app.board.edit_task(id, patch);
            app.report(result);
        }
        InputPurpose::DueDate(id) => {
            let due_date = if value.trim().is_empty() {
                None
            } else {
                match parse_due_date(&value) {
                    Ok(date) => Some(date),
                    Err(e) => {
                        app.show_notification(e, NotificationLevel::Warning);
                        return;
                    }
                }
            };
            let patch = TaskPatch {
                due_date: Some(due_date),
                ..TaskPatch::default()
            };
            let result = app.board.edit_task(id, patch);
            app.report(result);
        }
    }
}

/// 提交选择对话框
fn submit_select(app: &mut App, purpose: SelectPurpose, index: usize) {
    match purpose {
        SelectPurpose::RestoreTarget(id) => {
            let target = ColumnId::from_board_index(index).unwrap_or(ColumnId::Todo);
            let result = app.board.restore_task(id, target);
            if app.report(result).is_some() {
                app.show_notification(
                    format!("已恢复到「{}」", target.label()),
                    NotificationLevel::Success,
                );
            }
        }
    }
}

fn confirm(app: &mut App, action: ConfirmAction) {
    match action {
        ConfirmAction::DeleteTask(id) => {
            let result = app.board.delete_task(id);
            if app.report(result).is_some() {
                app.show_notification("任务已永久删除".to_string(), NotificationLevel::Success);
            }
        }
    }
}

/// 处理帮助模式的按键
fn handle_help_mode(app: &mut App, key: KeyEvent) -> bool {
    if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
        app.mode = Mode::Normal;
    }
    true
}

/// 处理归档视图的按键
fn handle_archive_mode(app: &mut App, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Esc | KeyCode::Char('v') | KeyCode::Char('q') => {
            app.mode = Mode::Normal;
        }
        KeyCode::Char('j') | KeyCode::Down => {
            let len = app.board.partition().column(ColumnId::Archived).len();
            app.archive_index = (app.archive_index + 1).min(len.saturating_sub(1));
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.archive_index = app.archive_index.saturating_sub(1);
        }
        KeyCode::Char('r') => {
            if let Some(id) = app.selected_archived().map(|t| t.id) {
                app.dialog = Some(DialogType::Select {
                    title: "恢复到".to_string(),
                    items: ColumnId::BOARD.iter().map(|c| c.label().to_string()).collect(),
                    selected: 0,
                    purpose: SelectPurpose::RestoreTarget(id),
                });
                app.mode = Mode::Dialog;
            }
        }
        KeyCode::Char('d') => {
            if let Some(task) = app.selected_archived() {
                let message = format!("永久删除「{}」？此操作无法撤销。", task.text);
                app.dialog = Some(DialogType::Confirm {
                    title: "删除任务".to_string(),
                    message,
                    yes_selected: false,
                    action: ConfirmAction::DeleteTask(task.id),
                });
                app.mode = Mode::Dialog;
            }
        }
        _ => {}
    }
    true
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::board::partition::tests::task;
    use crate::board::{Board, Partition};
    use crate::config::Config;
    use crate::models::{Actor, Role};
    use crate::state::{LocalState, LocalStore};
    use crossterm::event::KeyModifiers;
    use tempfile::TempDir;

    pub(crate) fn app_with(dir: &TempDir, columns: Partition) -> App {
        let store = LocalStore::new(dir.path().join("state.json"));
        store
            .save(&LocalState {
                columns,
                dark_mode: false,
            })
            .unwrap();
        let board = Board::open_local(store, Actor::new("alice", Role::Member)).unwrap();
        App::with_board(Config::default(), board, false)
    }

    pub(crate) fn press(app: &mut App, code: KeyCode) -> bool {
        handle_key_input(app, KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    fn texts(app: &App, column: ColumnId) -> Vec<String> {
        app.board
            .partition()
            .column(column)
            .iter()
            .map(|t| t.text.clone())
            .collect()
    }

    fn two_tasks() -> Partition {
        let mut p = Partition::new();
        p.add_task(ColumnId::Todo, task(1, "A", ColumnId::Todo)).unwrap();
        p.add_task(ColumnId::Todo, task(2, "B", ColumnId::Todo)).unwrap();
        p
    }

    #[test]
    fn test_add_task_through_dialog() {
        let dir = TempDir::new().unwrap();
        let mut app = app_with(&dir, Partition::new());

        press(&mut app, KeyCode::Char('a'));
        assert_eq!(app.mode, Mode::Dialog);
        type_text(&mut app, "写文档");
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.mode, Mode::Normal);
        assert_eq!(texts(&app, ColumnId::Todo), vec!["写文档"]);
        assert_eq!(app.selected_task().map(|t| t.text.as_str()), Some("写文档"));
    }

    #[test]
    fn test_blank_task_is_ignored() {
        let dir = TempDir::new().unwrap();
        let mut app = app_with(&dir, Partition::new());

        press(&mut app, KeyCode::Char('a'));
        type_text(&mut app, "   ");
        press(&mut app, KeyCode::Enter);

        assert!(app.board.partition().is_empty());
        assert!(app.notification.is_none());
    }

    #[test]
    fn test_keyboard_drag_moves_to_next_column() {
        let dir = TempDir::new().unwrap();
        let mut app = app_with(&dir, two_tasks());

        press(&mut app, KeyCode::Char(' '));
        assert!(app.drag.is_dragging());
        press(&mut app, KeyCode::Char('l'));
        press(&mut app, KeyCode::Char(' '));

        assert!(!app.drag.is_dragging());
        assert_eq!(texts(&app, ColumnId::Todo), vec!["B"]);
        assert_eq!(texts(&app, ColumnId::InProgress), vec!["A"]);
        assert_eq!(app.current_column(), ColumnId::InProgress);
    }

    #[test]
    fn test_escape_cancels_drag() {
        let dir = TempDir::new().unwrap();
        let mut app = app_with(&dir, two_tasks());

        press(&mut app, KeyCode::Char(' '));
        press(&mut app, KeyCode::Char('l'));
        press(&mut app, KeyCode::Esc);

        assert!(!app.drag.is_dragging());
        assert_eq!(texts(&app, ColumnId::Todo), vec!["A", "B"]);
    }

    #[test]
    fn test_shift_j_reorders_within_column() {
        let dir = TempDir::new().unwrap();
        let mut app = app_with(&dir, two_tasks());

        press(&mut app, KeyCode::Char('J'));

        assert_eq!(texts(&app, ColumnId::Todo), vec!["B", "A"]);
        assert_eq!(app.selected_index, 1);
    }

    #[test]
    fn test_archive_then_delete_from_archive_view() {
        let dir = TempDir::new().unwrap();
        let mut app = app_with(&dir, two_tasks());

        press(&mut app, KeyCode::Char('d'));
        assert_eq!(texts(&app, ColumnId::Archived), vec!["A"]);

        press(&mut app, KeyCode::Char('v'));
        assert_eq!(app.mode, Mode::Archive);
        press(&mut app, KeyCode::Char('d'));
        assert_eq!(app.mode, Mode::Dialog);
        press(&mut app, KeyCode::Char('y'));

        assert_eq!(app.mode, Mode::Archive);
        assert!(app.board.partition().column(ColumnId::Archived).is_empty());
        assert_eq!(app.board.partition().len(), 1);
    }

    #[test]
    fn test_restore_to_selected_column() {
        let dir = TempDir::new().unwrap();
        let mut app = app_with(&dir, two_tasks());

        press(&mut app, KeyCode::Char('d'));
        press(&mut app, KeyCode::Char('v'));
        press(&mut app, KeyCode::Char('r'));
        press(&mut app, KeyCode::Char('j'));
        press(&mut app, KeyCode::Enter);

        assert_eq!(texts(&app, ColumnId::InProgress), vec!["A"]);
        assert!(app.board.partition().column(ColumnId::Archived).is_empty());
    }

    #[test]
    fn test_unauthorized_toggle_shows_warning() {
        let dir = TempDir::new().unwrap();
        let mut foreign = task(7, "别人的任务", ColumnId::Todo);
        foreign.created_by = Some("bob".to_string());
        let mut p = Partition::new();
        p.add_task(ColumnId::Todo, foreign).unwrap();
        let mut app = app_with(&dir, p);

        press(&mut app, KeyCode::Char('x'));

        let notification = app.notification.as_ref().unwrap();
        assert_eq!(notification.level, NotificationLevel::Warning);
        assert!(!app.board.partition().get(7).unwrap().completed);
    }

    #[test]
    fn test_invalid_due_date_is_rejected() {
        let dir = TempDir::new().unwrap();
        let mut app = app_with(&dir, two_tasks());

        press(&mut app, KeyCode::Char('D'));
        type_text(&mut app, "明天");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.notification.as_ref().unwrap().level, NotificationLevel::Warning);
        assert_eq!(app.board.partition().get(1).unwrap().due_date, None);

        press(&mut app, KeyCode::Char('D'));
        type_text(&mut app, "2030-01-02");
        press(&mut app, KeyCode::Enter);
        assert_eq!(
            app.board.partition().get(1).unwrap().due_date,
            Some(parse_due_date("2030-01-02").unwrap())
        );
    }

    #[test]
    fn test_cycle_priority_and_quit() {
        let dir = TempDir::new().unwrap();
        let mut app = app_with(&dir, two_tasks());
        let before = app.board.partition().get(1).unwrap().priority;

        press(&mut app, KeyCode::Char('p'));
        assert_eq!(app.board.partition().get(1).unwrap().priority, before.next());
        assert!(!press(&mut app, KeyCode::Char('q')));
    }
}
