use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
    Frame,
};

use super::dialogs::centered_rect;

fn section(title: &str) -> Line<'_> {
    Line::from(vec![Span::styled(
        title,
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
    )])
}

fn key_line<'a>(keys: &'a str, description: &'a str) -> Line<'a> {
    Line::from(vec![
        Span::styled(format!("{:<11}", keys), Style::default().fg(Color::Cyan)),
        Span::raw(description),
    ])
}

/// 渲染帮助面板
pub fn render(f: &mut Frame, area: Rect) {
    let popup_area = centered_rect(80, 85, area);
    f.render_widget(Clear, popup_area);

    let block = Block::default()
        .title(" 键盘快捷键帮助 (按 ESC 或 ? 关闭) ")
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .border_type(BorderType::Rounded)
        .style(Style::default().bg(Color::Black));

    let inner = block.inner(popup_area);
    f.render_widget(block, popup_area);

    // 分成三列
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(33),
            Constraint::Percentage(33),
            Constraint::Percentage(34),
        ])
        .split(inner);

    // 左列：基础导航
    let navigation_help = vec![
        section("基础导航"),
        Line::from(""),
        key_line("j, ↓", "下一个任务"),
        key_line("k, ↑", "上一个任务"),
        key_line("h, ←", "左边的列"),
        key_line("l, →", "右边的列"),
        key_line("v", "归档视图"),
        key_line("t", "切换深色模式"),
        key_line("R", "重新同步"),
        key_line("?", "帮助"),
        key_line("q", "退出程序"),
        Line::from(""),
        section("任务操作"),
        Line::from(""),
        key_line("a", "创建新任务"),
        key_line("e", "编辑任务文本"),
        key_line("p", "切换优先级"),
        key_line("u", "设置负责人"),
        key_line("D", "设置截止日期"),
        key_line("x, Enter", "切换完成状态"),
        key_line("d", "归档任务"),
    ];

    // 中列：拖拽
    let drag_help = vec![
        section("拖拽"),
        Line::from(""),
        key_line("Space", "拿起任务"),
        key_line("hjkl", "移动落点"),
        key_line("Space", "放下"),
        key_line("Enter", "放下"),
        key_line("ESC", "取消拖拽"),
        Line::from(""),
        key_line("H / L", "任务移到左/右列"),
        key_line("J / K", "任务在列内下/上移"),
        Line::from(""),
        section("鼠标"),
        Line::from(""),
        key_line("按下", "拿起卡片"),
        key_line("拖动", "选择落点"),
        key_line("松开", "放下"),
    ];

    // 右列：归档和对话框
    let archive_help = vec![
        section("归档视图"),
        Line::from(""),
        key_line("j / k", "选择任务"),
        key_line("r", "恢复到某一列"),
        key_line("d", "永久删除"),
        key_line("ESC, v", "返回看板"),
        Line::from(""),
        section("对话框"),
        Line::from(""),
        key_line("Enter", "确认"),
        key_line("ESC", "取消"),
        key_line("Ctrl+U", "清空输入"),
        key_line("y / n", "是 / 否"),
    ];

    f.render_widget(Paragraph::new(navigation_help), columns[0]);
    f.render_widget(Paragraph::new(drag_help), columns[1]);
    f.render_widget(Paragraph::new(archive_help), columns[2]);
}
