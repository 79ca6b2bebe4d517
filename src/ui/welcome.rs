use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap},
};

use crate::config::{Config, StorageBackend};

fn heading(text: &str) -> Line<'_> {
    Line::from(vec![Span::styled(
        text,
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    )])
}

fn command(cmd: &str, comment: &str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {:<34}", cmd), Style::default().fg(Color::Green)),
        Span::styled(format!("# {}", comment), Style::default().fg(Color::DarkGray)),
    ])
}

/// 渲染首次运行欢迎对话框
pub fn render(f: &mut Frame, area: Rect, config: &Config) {
    let popup_area = super::dialogs::centered_rect(70, 60, area);
    f.render_widget(Clear, popup_area);

    let block = Block::default()
        .title(" 🎉 欢迎使用看板！ ")
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .border_type(BorderType::Rounded)
        .style(Style::default().bg(Color::Black));

    let inner = block.inner(popup_area);
    f.render_widget(block, popup_area);

    let storage = match config.storage.backend {
        StorageBackend::Local => format!("本地 {}", config.state_file().display()),
        StorageBackend::Remote => format!(
            "远程 {}",
            config.storage.url.as_deref().unwrap_or("<未设置>")
        ),
    };

    let value_style = Style::default().fg(Color::Green).add_modifier(Modifier::BOLD);
    let lines = vec![
        Line::from(""),
        Line::from(vec![Span::styled(
            "已为您创建默认配置：",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )]),
        Line::from(""),
        Line::from(vec![
            Span::styled("  用户: ", Style::default().fg(Color::DarkGray)),
            Span::styled(config.user.id.clone(), value_style),
        ]),
        Line::from(vec![
            Span::styled("  存储: ", Style::default().fg(Color::DarkGray)),
            Span::styled(storage, value_style),
        ]),
        Line::from(""),
        heading("配置文件位置:"),
        Line::from(vec![Span::styled(
            format!("  {}", crate::config::get_config_path().display()),
            Style::default().fg(Color::DarkGray),
        )]),
        Line::from(""),
        heading("如需修改配置，请使用以下命令:"),
        Line::from(""),
        command("kb config user <id> [admin]", "设置当前用户"),
        command("kb config remote <url> <api-key>", "使用远程存储"),
        command("kb config telegram <token> <chat>", "启用 Telegram 通知"),
        command("kb config show", "查看当前配置"),
        Line::from(""),
        Line::from(vec![
            Span::styled("  ?", Style::default().fg(Color::Yellow)),
            Span::raw("        查看完整帮助"),
        ]),
        Line::from(""),
        Line::from(vec![Span::styled(
            "按任意键开始使用",
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        )]),
    ];

    let paragraph = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: false });

    f.render_widget(paragraph, inner);
}
