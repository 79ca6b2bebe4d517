mod archive;
pub mod dialogs;
mod help;
pub mod kanban;
mod statusbar;
pub mod text_input;
pub mod theme;
mod welcome;

use crate::app::{App, Mode, Notification, NotificationLevel};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;
use theme::Theme;

/// 主布局：看板区域 + 底部状态栏
pub fn main_layout(area: Rect) -> (Rect, Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),    // 看板
            Constraint::Length(1), // 状态栏
        ])
        .split(area);
    (chunks[0], chunks[1])
}

/// 主渲染函数
pub fn render(f: &mut Frame, app: &App) {
    let theme = Theme::new(app.board.dark_mode());
    let (board_area, status_area) = main_layout(f.area());

    kanban::render(f, board_area, app, &theme);
    statusbar::render(f, status_area, app, &theme);

    if app.mode == Mode::Archive {
        archive::render(f, board_area, app, &theme);
    }

    // 渲染对话框（如果有）
    if let Some(dialog) = &app.dialog {
        dialogs::render_dialog(f, dialog);
    }

    // 渲染帮助面板（如果处于帮助模式）
    if app.mode == Mode::Help {
        help::render(f, f.area());
    }

    // 渲染欢迎对话框（如果是首次运行）
    if app.show_welcome_dialog {
        welcome::render(f, f.area(), &app.config);
    }

    // 渲染通知栏（如果有通知）
    if let Some(notification) = &app.notification {
        render_notification(f, f.area(), notification);
    }
}

/// 渲染通知栏
fn render_notification(f: &mut Frame, area: Rect, notification: &Notification) {
    // 通知栏占据顶部 3 行
    let notification_area = Rect {
        x: area.x,
        y: area.y,
        width: area.width,
        height: 3.min(area.height),
    };

    // 根据级别选择颜色
    let (bg_color, fg_color, prefix) = match notification.level {
        NotificationLevel::Info => (Color::Blue, Color::White, "ℹ"),
        NotificationLevel::Success => (Color::Green, Color::White, "✓"),
        NotificationLevel::Warning => (Color::Yellow, Color::Black, "⚠"),
        NotificationLevel::Error => (Color::Red, Color::White, "✗"),
    };

    let content = Line::from(vec![
        Span::styled(
            format!(" {} ", prefix),
            Style::default().fg(fg_color).bg(bg_color).add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
        Span::styled(notification.message.as_str(), Style::default().fg(fg_color)),
    ]);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(bg_color))
        .style(Style::default().bg(bg_color));

    let paragraph = Paragraph::new(content).block(block);

    f.render_widget(paragraph, notification_area);
}
