use crate::app::{App, Mode};
use crate::ui::theme::Theme;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

/// 渲染状态栏
pub fn render(f: &mut Frame, area: Rect, app: &App, theme: &Theme) {
    let mode_text = match app.mode {
        _ if app.drag.is_dragging() => ("DRAG", Color::Yellow),
        Mode::Normal => ("NORMAL", Color::Green),
        Mode::Dialog => ("DIALOG", Color::Magenta),
        Mode::Help => ("HELP", Color::Blue),
        Mode::Archive => ("ARCHIVE", Color::Cyan),
    };

    let stats = app.board.partition().board_stats();
    let remaining = stats.total - stats.completed;
    let archived = app.board.partition().column(crate::models::ColumnId::Archived).len();
    let backend = if app.board.is_remote() { "远程" } else { "本地" };

    let line = Line::from(vec![
        Span::styled(
            format!(" {} ", mode_text.0),
            Style::default()
                .fg(Color::Black)
                .bg(mode_text.1)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!(
            " 共 {} | 已完成 {} | 剩余 {} | 归档 {} ",
            stats.total, stats.completed, remaining, archived
        )),
        Span::styled(
            format!("| {} @{} ", backend, app.board.actor().id),
            Style::default().fg(theme.muted),
        ),
    ]);

    let paragraph = Paragraph::new(line).style(Style::default().bg(theme.bg).fg(theme.fg));

    f.render_widget(paragraph, area);
}
