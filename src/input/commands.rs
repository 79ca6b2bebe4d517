use crate::board::Step;

/// 应用命令枚举
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    // ===== 退出 =====
    Quit,

    // ===== 导航 =====
    /// 选择上一个任务
    TaskUp,
    /// 选择下一个任务
    TaskDown,
    /// 切换到左边的列
    ColumnLeft,
    /// 切换到右边的列
    ColumnRight,

    // ===== 任务操作 =====
    /// 创建新任务
    NewTask,
    /// 编辑任务文本
    EditTask,
    /// 切换优先级（紧急 → 不重要 → 想法）
    CyclePriority,
    /// 设置负责人
    SetAssignee,
    /// 设置截止日期
    SetDueDate,
    /// 切换完成状态
    ToggleTask,
    /// 归档当前任务
    ArchiveTask,

    // ===== 拖拽 =====
    /// 拿起当前任务，进入键盘拖拽
    PickUp,
    /// 单步拖拽：拿起、移动一步、放下
    MoveTask(Step),

    // ===== 视图 =====
    OpenArchive,
    ToggleDarkMode,
    /// 重新拉取远程任务
    Resync,
    ShowHelp,
}
