use ratatui::style::Color;

/// 界面配色，深色为 Nord，浅色为 Nord 的 Snow Storm 反转
#[derive(Debug, Clone, Copy)]
pub struct Theme {
    pub bg: Color,
    pub fg: Color,
    pub muted: Color,
    pub border: Color,
    pub border_focused: Color,
    pub selected_bg: Color,
    pub selected_fg: Color,
    pub drop_target: Color,
    pub overdue: Color,
}

impl Theme {
    pub fn new(dark_mode: bool) -> Self {
        if dark_mode {
            Self {
                bg: Color::Rgb(46, 52, 64),
                fg: Color::Rgb(216, 222, 233),
                muted: Color::Rgb(129, 161, 193),
                border: Color::Rgb(76, 86, 106),
                border_focused: Color::Rgb(136, 192, 208),
                selected_bg: Color::Rgb(41, 98, 218),
                selected_fg: Color::White,
                drop_target: Color::Rgb(235, 203, 139),
                overdue: Color::Rgb(191, 97, 106),
            }
        } else {
            Self {
                bg: Color::Rgb(236, 239, 244),
                fg: Color::Rgb(46, 52, 64),
                muted: Color::Rgb(94, 129, 172),
                border: Color::Rgb(180, 188, 204),
                border_focused: Color::Rgb(94, 129, 172),
                selected_bg: Color::Rgb(41, 98, 218),
                selected_fg: Color::White,
                drop_target: Color::Rgb(208, 135, 112),
                overdue: Color::Rgb(191, 97, 106),
            }
        }
    }
}

/// 优先级颜色
pub fn priority_color(priority: crate::models::Priority) -> Color {
    let (r, g, b) = priority.color();
    Color::Rgb(r, g, b)
}
