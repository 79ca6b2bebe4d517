use crate::app::App;
use crate::models::ColumnId;
use crate::ui::theme::{priority_color, Theme};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, List, ListItem, ListState, Paragraph},
    Frame,
};

/// 渲染归档视图
pub fn render(f: &mut Frame, area: Rect, app: &App, theme: &Theme) {
    let popup_area = super::dialogs::centered_rect(70, 80, area);
    f.render_widget(Clear, popup_area);

    let tasks = app.board.partition().column(ColumnId::Archived);

    let block = Block::default()
        .title(format!(" {} ({}) ", ColumnId::Archived.label(), tasks.len()))
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.border_focused))
        .border_type(BorderType::Rounded)
        .style(Style::default().bg(theme.bg));

    let inner = block.inner(popup_area);
    f.render_widget(block, popup_area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(inner);

    if tasks.is_empty() {
        let empty = Paragraph::new("没有已归档的任务")
            .style(Style::default().fg(theme.muted))
            .alignment(Alignment::Center);
        f.render_widget(empty, chunks[0]);
    } else {
        let items: Vec<ListItem> = tasks
            .iter()
            .map(|task| {
                let status = if task.completed { "✓" } else { "·" };
                ListItem::new(Line::from(vec![
                    Span::raw(format!(" {} ", status)),
                    Span::styled("▌ ", Style::default().fg(priority_color(task.priority))),
                    Span::raw(task.text.as_str()),
                    Span::styled(format!("  #{}", task.id), Style::default().fg(theme.muted)),
                ]))
                .style(Style::default().fg(theme.fg))
            })
            .collect();

        let list = List::new(items).highlight_style(
            Style::default()
                .bg(theme.selected_bg)
                .fg(theme.selected_fg)
                .add_modifier(Modifier::BOLD),
        );
        let mut state = ListState::default();
        state.select(Some(app.archive_index));
        f.render_stateful_widget(list, chunks[0], &mut state);
    }

    let help = Paragraph::new("j/k 选择  r 恢复  d 删除  Esc 返回")
        .style(Style::default().fg(theme.muted))
        .alignment(Alignment::Center);
    f.render_widget(help, chunks[1]);
}
