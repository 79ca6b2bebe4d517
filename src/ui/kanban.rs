use crate::app::App;
use crate::board::drag::closest_center;
use crate::board::{Bounds, DropTarget, DropZone, Partition, Point};
use crate::models::{ColumnId, Task};
use crate::ui::theme::{priority_color, Theme};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, List, ListItem, Paragraph},
    Frame,
};

/// 每张卡片占用的行数：标题 + 元信息
pub const CARD_HEIGHT: u16 = 2;

/// 三列布局：待办 | 进行中 | 已完成
pub fn column_areas(area: Rect) -> [Rect; 3] {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(33),
            Constraint::Percentage(33),
            Constraint::Percentage(34),
        ])
        .split(area);
    [columns[0], columns[1], columns[2]]
}

/// 列边框内的卡片区域
fn column_inner(area: Rect) -> Rect {
    Block::default().borders(Borders::ALL).inner(area)
}

/// 第 `index` 张卡片的位置，超出可见范围时返回 `None`
fn card_rect(inner: Rect, index: usize) -> Option<Rect> {
    let offset = u16::try_from(index).ok()?.checked_mul(CARD_HEIGHT)?;
    if offset + CARD_HEIGHT > inner.height {
        return None;
    }
    Some(Rect::new(inner.x, inner.y + offset, inner.width, CARD_HEIGHT))
}

fn to_bounds(rect: Rect) -> Bounds {
    Bounds::new(
        f32::from(rect.x),
        f32::from(rect.y),
        f32::from(rect.width),
        f32::from(rect.height),
    )
}

/// 终端单元格的中心点
pub fn cell_point(column: u16, row: u16) -> Point {
    Point::new(f32::from(column) + 0.5, f32::from(row) + 0.5)
}

/// 放置区域，渲染和鼠标拖拽共用这一份布局
///
/// 每列先是可见卡片，最后是卡片下方的空白区域（列本身）。
/// 列满时列区域覆盖整个列内部。
pub fn drop_zones(area: Rect, partition: &Partition) -> Vec<DropZone> {
    let mut zones = Vec::new();
    for (rect, column) in column_areas(area).into_iter().zip(ColumnId::BOARD) {
        let inner = column_inner(rect);
        let mut used = 0;
        for (index, task) in partition.column(column).iter().enumerate() {
            let Some(card) = card_rect(inner, index) else {
                break;
            };
            used += CARD_HEIGHT;
            zones.push(DropZone {
                target: DropTarget::Task(task.id),
                bounds: to_bounds(card),
            });
        }
        let rest = if used < inner.height {
            Rect::new(inner.x, inner.y + used, inner.width, inner.height - used)
        } else {
            inner
        };
        zones.push(DropZone {
            target: DropTarget::Column(column),
            bounds: to_bounds(rest),
        });
    }
    zones
}

/// 指针下方的卡片
pub fn card_at(area: Rect, partition: &Partition, point: Point) -> Option<crate::models::TaskId> {
    drop_zones(area, partition)
        .into_iter()
        .find_map(|zone| match zone.target {
            DropTarget::Task(id) if zone.bounds.contains(point) => Some(id),
            _ => None,
        })
}

/// 当前拖拽的落点：指针拖拽用 closest-center，键盘拖拽用落点指示
fn current_drop_target(area: Rect, app: &App) -> Option<DropTarget> {
    let partition = app.board.partition();
    match app.drag.pointer() {
        Some(point) => closest_center(point, &drop_zones(area, partition)),
        None => app.drag.cursor().map(|c| c.target(partition)),
    }
}

/// 渲染看板视图
pub fn render(f: &mut Frame, area: Rect, app: &App, theme: &Theme) {
    let partition = app.board.partition();
    let target = current_drop_target(area, app);

    for (idx, (rect, column)) in column_areas(area)
        .into_iter()
        .zip(ColumnId::BOARD)
        .enumerate()
    {
        render_column(f, rect, column, idx, app, theme, target);
    }

    // 拖拽浮层：跟随指针显示正在拖拽的任务
    if let (Some(task), Some(point)) = (app.drag.active(partition), app.drag.pointer()) {
        render_drag_overlay(f, area, task, point, theme);
    }
}

/// 渲染单个列
fn render_column(
    f: &mut Frame,
    area: Rect,
    column: ColumnId,
    column_idx: usize,
    app: &App,
    theme: &Theme,
    target: Option<DropTarget>,
) {
    let tasks = app.board.partition().column(column);
    let is_column_focused = app.selected_column == column_idx;
    let is_column_target = target == Some(DropTarget::Column(column));
    let active_id = app.drag.active_id();

    let (border_color, title_style) = if is_column_target {
        (
            theme.drop_target,
            Style::default().fg(theme.drop_target).add_modifier(Modifier::BOLD),
        )
    } else if is_column_focused {
        (
            theme.border_focused,
            Style::default().fg(theme.fg).add_modifier(Modifier::BOLD),
        )
    } else {
        (theme.border, Style::default().fg(theme.muted))
    };

    let items: Vec<ListItem> = tasks
        .iter()
        .enumerate()
        .map(|(i, task)| {
            let is_selected = is_column_focused && i == app.selected_index && active_id.is_none();
            let is_dragged = active_id == Some(task.id);
            let is_target = target == Some(DropTarget::Task(task.id));

            let style = if is_dragged {
                Style::default().fg(theme.muted).add_modifier(Modifier::DIM)
            } else if is_target {
                Style::default().bg(theme.drop_target).fg(theme.bg)
            } else if is_selected {
                Style::default()
                    .bg(theme.selected_bg)
                    .fg(theme.selected_fg)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(theme.fg)
            };

            ListItem::new(card_lines(task, is_selected || is_target, theme)).style(style)
        })
        .collect();

    let stats = app.board.partition().stats(column);
    let title = format!(" {} ({}/{}) ", column.label(), stats.completed, stats.total);

    let list = List::new(items).block(
        Block::default()
            .title(title)
            .title_alignment(Alignment::Center)
            .title_style(title_style)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border_color))
            .border_type(BorderType::Rounded)
            .style(Style::default().bg(theme.bg)),
    );

    f.render_widget(list, area);
}

/// 卡片内容：第一行标题，第二行负责人/截止日期
fn card_lines<'a>(task: &'a Task, highlighted: bool, theme: &Theme) -> Vec<Line<'a>> {
    // 选中指示器
    let indicator = if highlighted {
        Span::raw("▶ ")
    } else {
        Span::raw("  ")
    };
    let check = if task.completed { "✓ " } else { "" };
    let title_style = if task.completed {
        Style::default().add_modifier(Modifier::CROSSED_OUT)
    } else {
        Style::default()
    };

    let title = Line::from(vec![
        indicator,
        Span::styled("▌", Style::default().fg(priority_color(task.priority))),
        Span::raw(" "),
        Span::raw(check),
        Span::styled(task.text.as_str(), title_style),
    ]);

    let mut meta = vec![Span::raw("    ")];
    meta.push(Span::styled(
        task.priority.label(),
        Style::default().fg(priority_color(task.priority)),
    ));
    if let Some(assignee) = &task.assignee {
        meta.push(Span::raw(format!("  @{}", assignee)));
    }
    if let Some(due) = task.due_date {
        meta.push(Span::raw(format!("  📅 {}", due.format("%Y-%m-%d"))));
    }
    if task.is_overdue() {
        meta.push(Span::styled(
            "  逾期",
            Style::default().fg(theme.overdue).add_modifier(Modifier::BOLD),
        ));
    }

    vec![title, Line::from(meta)]
}

fn render_drag_overlay(f: &mut Frame, area: Rect, task: &Task, point: Point, theme: &Theme) {
    let width = 30.min(area.width);
    let height = 3.min(area.height);
    // 指针坐标是单元格中心，向下取整回到单元格
    let x = (point.x as u16).min(area.right().saturating_sub(width));
    let y = (point.y as u16).min(area.bottom().saturating_sub(height));
    let overlay = Rect::new(x, y, width, height);

    f.render_widget(Clear, overlay);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.drop_target))
        .style(Style::default().bg(theme.bg));
    let paragraph = Paragraph::new(Line::from(vec![
        Span::styled("▌ ", Style::default().fg(priority_color(task.priority))),
        Span::styled(task.text.as_str(), Style::default().fg(theme.fg)),
    ]))
    .block(block);
    f.render_widget(paragraph, overlay);
}
