use crate::board::{Board, BoardResult, DragController};
use crate::config::Config;
use crate::log::log_debug;
use crate::models::{ColumnId, Task, TaskId};
use crate::ui::dialogs::DialogType;
use anyhow::Result;
use std::time::Instant;

/// 通知级别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// 通知消息
#[derive(Debug, Clone)]
pub struct Notification {
    pub message: String,
    pub level: NotificationLevel,
    pub created_at: Instant,
}

impl Notification {
    /// 检查通知是否已过期（3秒后自动消失）
    pub fn is_expired(&self) -> bool {
        self.created_at.elapsed().as_secs() >= 3
    }
}

/// 应用模式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// 正常模式 - 导航、编辑和拖拽
    Normal,
    /// 对话框模式
    Dialog,
    /// 帮助模式 - 显示快捷键
    Help,
    /// 归档视图
    Archive,
}

/// 应用状态
pub struct App {
    /// 看板（任务划分 + 持久化后端）
    pub board: Board,
    /// 应用配置
    pub config: Config,
    /// 当前模式
    pub mode: Mode,
    /// 选中的列 (0=待办, 1=进行中, 2=已完成)
    pub selected_column: usize,
    /// 选中列中的任务索引
    pub selected_index: usize,
    /// 归档视图中选中的索引
    pub archive_index: usize,
    /// 当前显示的对话框
    pub dialog: Option<DialogType>,
    /// 拖拽手势
    pub drag: DragController,
    /// 是否显示首次运行欢迎对话框
    pub show_welcome_dialog: bool,
    /// 通知消息
    pub notification: Option<Notification>,
}

impl App {
    /// 创建新的应用实例
    pub fn new() -> Result<Self> {
        // 检查首次运行并加载配置
        let (config, is_first_run) = crate::config::check_first_run()?;
        let board = config.open_board()?;

        log_debug(format!(
            "App初始化: user={}, remote={}, tasks={}",
            board.actor().id,
            board.is_remote(),
            board.partition().len()
        ));

        Ok(Self::with_board(config, board, is_first_run))
    }

    pub fn with_board(config: Config, board: Board, show_welcome_dialog: bool) -> Self {
        Self {
            board,
            config,
            mode: Mode::Normal,
            selected_column: 0,
            selected_index: 0,
            archive_index: 0,
            dialog: None,
            drag: DragController::new(),
            show_welcome_dialog,
            notification: None,
        }
    }

    /// 处理键盘输入
    pub fn handle_key(&mut self, key: crossterm::event::KeyEvent) -> bool {
        crate::input::handle_key_input(self, key)
    }

    /// 处理鼠标输入
    pub fn handle_mouse(&mut self, mouse: crossterm::event::MouseEvent, area: ratatui::layout::Rect) {
        crate::input::handle_mouse_input(self, mouse, area)
    }

    /// 当前选中的列
    pub fn current_column(&self) -> ColumnId {
        ColumnId::from_board_index(self.selected_column).unwrap_or(ColumnId::Todo)
    }

    /// 当前选中的任务
    pub fn selected_task(&self) -> Option<&Task> {
        self.board
            .partition()
            .column(self.current_column())
            .get(self.selected_index)
    }

    /// 归档视图中选中的任务
    pub fn selected_archived(&self) -> Option<&Task> {
        self.board
            .partition()
            .column(ColumnId::Archived)
            .get(self.archive_index)
    }

    /// 把选中位置移到指定任务上（任务不在看板上时保持不变）
    pub fn select_task(&mut self, id: TaskId) {
        if let Some((column, index)) = self.board.partition().find(id) {
            if let Some(col) = column.board_index() {
                self.selected_column = col;
                self.selected_index = index;
            }
        }
    }

    /// 修改后把选中索引限制在有效范围内
    pub fn clamp_selection(&mut self) {
        let len = self.board.partition().column(self.current_column()).len();
        self.selected_index = self.selected_index.min(len.saturating_sub(1));
        let archived = self.board.partition().column(ColumnId::Archived).len();
        self.archive_index = self.archive_index.min(archived.saturating_sub(1));
    }

    /// 显示通知消息
    pub fn show_notification(&mut self, message: String, level: NotificationLevel) {
        self.notification = Some(Notification {
            message,
            level,
            created_at: Instant::now(),
        });
    }

    /// 清除已过期的通知
    pub fn clear_expired_notification(&mut self) {
        if self.notification.as_ref().is_some_and(Notification::is_expired) {
            self.notification = None;
        }
    }

    /// 处理看板操作的结果：权限类拒绝显示警告，其余错误显示错误
    pub fn report<T>(&mut self, result: BoardResult<T>) -> Option<T> {
        match result {
            Ok(value) => {
                self.clamp_selection();
                Some(value)
            }
            Err(e) => {
                let level = if e.is_rejection() {
                    NotificationLevel::Warning
                } else {
                    log_debug(format!("操作失败: {}", e));
                    NotificationLevel::Error
                };
                self.show_notification(e.to_string(), level);
                self.clamp_selection();
                None
            }
        }
    }
}
