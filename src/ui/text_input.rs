use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tui_textarea::{CursorMove, TextArea};

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    Frame,
};

/// 输入动作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    /// 继续编辑
    Continue,
    /// 提交内容
    Submit,
    /// 取消对话框
    Cancel,
}

/// 单行文本输入框
///
/// tui-textarea 的 `input()` 绑定的是它自己依赖的 crossterm 版本，
/// 这里手动把按键映射到编辑操作。
pub struct TextField {
    textarea: TextArea<'static>,
}

impl TextField {
    pub fn new(initial_value: &str) -> Self {
        let mut textarea = TextArea::from([initial_value.to_string()]);
        textarea.move_cursor(CursorMove::End);

        // Nord 配色
        textarea.set_style(
            Style::default()
                .fg(Color::Rgb(236, 239, 244))
                .bg(Color::Rgb(46, 52, 64)),
        );
        textarea.set_cursor_style(
            Style::default()
                .bg(Color::Rgb(136, 192, 208))
                .fg(Color::Rgb(46, 52, 64)),
        );
        textarea.set_cursor_line_style(Style::default());

        Self { textarea }
    }

    /// 获取内容
    pub fn value(&self) -> String {
        self.textarea.lines().join(" ")
    }

    /// 处理按键事件
    pub fn handle_key(&mut self, key: KeyEvent) -> InputAction {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Esc => return InputAction::Cancel,
            KeyCode::Enter => return InputAction::Submit,
            KeyCode::Char('s') if ctrl => return InputAction::Submit,
            KeyCode::Char('c') if ctrl => return InputAction::Cancel,
            // Ctrl+U 清空整行
            KeyCode::Char('u') if ctrl => {
                self.textarea.move_cursor(CursorMove::End);
                self.textarea.delete_line_by_head();
            }
            KeyCode::Char('w') if ctrl => {
                self.textarea.delete_word();
            }
            KeyCode::Char(c) => {
                self.textarea.insert_char(c);
            }
            KeyCode::Backspace => {
                self.textarea.delete_char();
            }
            KeyCode::Delete => {
                self.textarea.delete_next_char();
            }
            KeyCode::Left => self.textarea.move_cursor(CursorMove::Back),
            KeyCode::Right => self.textarea.move_cursor(CursorMove::Forward),
            KeyCode::Home => self.textarea.move_cursor(CursorMove::Head),
            KeyCode::End => self.textarea.move_cursor(CursorMove::End),
            _ => {}
        }
        InputAction::Continue
    }

    pub fn render(&self, f: &mut Frame, area: Rect) {
        f.render_widget(&self.textarea, area);
    }
}
