use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, List, ListItem, Paragraph, Wrap},
    Frame,
};

use super::text_input::TextField;
use crate::models::{ColumnId, TaskId};

/// 输入对话框的用途
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputPurpose {
    NewTask(ColumnId),
    EditText(TaskId),
    Assignee(TaskId),
    DueDate(TaskId),
}

/// 选择对话框的用途
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectPurpose {
    /// 选择恢复到哪一列
    RestoreTarget(TaskId),
}

/// 确认操作类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmAction {
    DeleteTask(TaskId),
}

/// 对话框类型
pub enum DialogType {
    /// 输入对话框（创建任务、编辑文本、负责人、截止日期）
    Input {
        title: String,
        prompt: String,
        field: TextField,
        purpose: InputPurpose,
    },
    /// 选择对话框
    Select {
        title: String,
        items: Vec<String>,
        selected: usize,
        purpose: SelectPurpose,
    },
    /// 确认对话框
    Confirm {
        title: String,
        message: String,
        yes_selected: bool,
        action: ConfirmAction,
    },
}

impl DialogType {
    pub fn input(title: &str, prompt: &str, initial: &str, purpose: InputPurpose) -> Self {
        DialogType::Input {
            title: title.to_string(),
            prompt: prompt.to_string(),
            field: TextField::new(initial),
            purpose,
        }
    }
}

/// 渲染居中的对话框
pub fn render_dialog(f: &mut Frame, dialog: &DialogType) {
    let area = match dialog {
        DialogType::Input { .. } => centered_rect(60, 30, f.area()),
        _ => centered_rect(50, 40, f.area()),
    };

    // 清空对话框区域
    f.render_widget(Clear, area);

    match dialog {
        DialogType::Input {
            title,
            prompt,
            field,
            ..
        } => render_input_dialog(f, area, title, prompt, field),
        DialogType::Select {
            title,
            items,
            selected,
            ..
        } => render_select_dialog(f, area, title, items, *selected),
        DialogType::Confirm {
            title,
            message,
            yes_selected,
            ..
        } => render_confirm_dialog(f, area, title, message, *yes_selected),
    }
}

/// 渲染输入对话框
fn render_input_dialog(f: &mut Frame, area: Rect, title: &str, prompt: &str, field: &TextField) {
    let block = Block::default()
        .title(format!("  {}  ", title))
        .title_alignment(Alignment::Left)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Rgb(76, 86, 106)))  // Nord border color
        .border_type(BorderType::Rounded)
        .style(Style::default().bg(Color::Rgb(46, 52, 64)));  // Nord background

    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // 提示文本
            Constraint::Length(3), // 输入框
            Constraint::Min(0),
            Constraint::Length(1), // 帮助
        ])
        .split(inner);

    let prompt_text = Paragraph::new(prompt).style(Style::default().fg(Color::Rgb(129, 161, 193)));
    f.render_widget(prompt_text, chunks[0]);

    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Rgb(136, 192, 208)))  // Nord cyan
        .border_type(BorderType::Rounded);
    let input_inner = input_block.inner(chunks[1]);
    f.render_widget(input_block, chunks[1]);
    field.render(f, input_inner);

    let help = Paragraph::new("Enter 确认  Esc 取消  Ctrl+U 清空")
        .style(Style::default().fg(Color::Rgb(129, 161, 193)))
        .alignment(Alignment::Center);
    f.render_widget(help, chunks[3]);
}

/// 渲染选择对话框
fn render_select_dialog(f: &mut Frame, area: Rect, title: &str, items: &[String], selected: usize) {
    let block = Block::default()
        .title(format!("  {}  ", title))
        .title_alignment(Alignment::Left)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Rgb(76, 86, 106)))
        .border_type(BorderType::Rounded)
        .style(Style::default().bg(Color::Rgb(46, 52, 64)));

    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),    // 列表
            Constraint::Length(1), // 帮助
        ])
        .split(inner);

    let list_items: Vec<ListItem> = items
        .iter()
        .enumerate()
        .map(|(idx, item)| {
            if idx == selected {
                // 选中项：蓝色序号标记
                ListItem::new(Line::from(vec![
                    Span::raw("  "),
                    Span::styled(
                        format!("{}", idx + 1),
                        Style::default()
                            .fg(Color::White)
                            .bg(Color::Rgb(94, 129, 172))
                            .add_modifier(Modifier::BOLD),
                    ),
                    Span::raw("  "),
                    Span::styled(
                        item.as_str(),
                        Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
                    ),
                    Span::raw("  "),
                    Span::styled("✓", Style::default().fg(Color::Rgb(163, 190, 140))),
                ]))
                .style(Style::default().bg(Color::Rgb(59, 66, 82)))
            } else {
                ListItem::new(Line::from(format!("      {}", item)))
                    .style(Style::default().fg(Color::Rgb(216, 222, 233)))
            }
        })
        .collect();

    f.render_widget(List::new(list_items), chunks[0]);

    let help_text = format!("↑↓/jk 导航  Enter 确认  Esc 取消  [{}/{}]", selected + 1, items.len());
    let help_paragraph = Paragraph::new(help_text)
        .style(Style::default().fg(Color::Rgb(129, 161, 193)))
        .alignment(Alignment::Center);
    f.render_widget(help_paragraph, chunks[1]);
}

/// 渲染确认对话框
fn render_confirm_dialog(f: &mut Frame, area: Rect, title: &str, message: &str, yes_selected: bool) {
    let block = Block::default()
        .title(format!("  {}  ", title))
        .title_alignment(Alignment::Left)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Rgb(235, 203, 139)))  // Nord yellow for warnings
        .border_type(BorderType::Rounded)
        .style(Style::default().bg(Color::Rgb(46, 52, 64)));

    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),    // 消息
            Constraint::Length(3), // 按钮
        ])
        .split(inner);

    let message_text = Paragraph::new(message)
        .wrap(Wrap { trim: true })
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Rgb(216, 222, 233)));
    f.render_widget(message_text, chunks[0]);

    let button_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(25),
            Constraint::Percentage(25),
            Constraint::Percentage(25),
            Constraint::Percentage(25),
        ])
        .split(chunks[1]);

    // 否按钮 (n) - 放在左侧
    let no_style = if !yes_selected {
        Style::default()
            .bg(Color::Rgb(191, 97, 106))
            .fg(Color::Rgb(46, 52, 64))
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default()
            .fg(Color::Rgb(191, 97, 106))
            .add_modifier(Modifier::DIM)
    };
    let no_button = Paragraph::new("[ n ] 否")
        .style(no_style)
        .alignment(Alignment::Center);
    f.render_widget(no_button, button_chunks[1]);

    // 是按钮 (y) - 放在右侧
    let yes_style = if yes_selected {
        Style::default()
            .bg(Color::Rgb(163, 190, 140))
            .fg(Color::Rgb(46, 52, 64))
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default()
            .fg(Color::Rgb(163, 190, 140))
            .add_modifier(Modifier::DIM)
    };
    let yes_button = Paragraph::new("[ y ] 是")
        .style(yes_style)
        .alignment(Alignment::Center);
    f.render_widget(yes_button, button_chunks[2]);
}

/// 创建一个居中的矩形区域
pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
