use serde::{Deserialize, Serialize};

/// 列（状态桶）
///
/// `Archived` 是隐藏的第四个桶，不在看板上显示。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ColumnId {
    Todo,
    InProgress,
    Done,
    Archived,
}

impl ColumnId {
    /// 看板上可见的三列（按显示顺序）
    pub const BOARD: [ColumnId; 3] = [ColumnId::Todo, ColumnId::InProgress, ColumnId::Done];

    /// 存储用的键名
    pub fn key(self) -> &'static str {
        match self {
            ColumnId::Todo => "todo",
            ColumnId::InProgress => "inProgress",
            ColumnId::Done => "done",
            ColumnId::Archived => "archived",
        }
    }

    /// 显示名称
    pub fn label(self) -> &'static str {
        match self {
            ColumnId::Todo => "待办",
            ColumnId::InProgress => "进行中",
            ColumnId::Done => "已完成",
            ColumnId::Archived => "已归档",
        }
    }

    /// 从键名解析，大小写不敏感，兼容 helix 风格的 "doing"
    pub fn from_key(key: &str) -> Option<Self> {
        match key.trim().to_ascii_lowercase().as_str() {
            "todo" => Some(ColumnId::Todo),
            "inprogress" | "in_progress" | "in-progress" | "doing" => Some(ColumnId::InProgress),
            "done" => Some(ColumnId::Done),
            "archived" => Some(ColumnId::Archived),
            _ => None,
        }
    }

    /// 是否为看板上的可见列
    pub fn is_board(self) -> bool {
        self != ColumnId::Archived
    }

    /// 可见列的索引 (0=todo, 1=inProgress, 2=done)
    pub fn board_index(self) -> Option<usize> {
        ColumnId::BOARD.iter().position(|c| *c == self)
    }

    pub fn from_board_index(index: usize) -> Option<Self> {
        ColumnId::BOARD.get(index).copied()
    }
}

impl std::fmt::Display for ColumnId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}
