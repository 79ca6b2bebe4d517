use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use super::column::ColumnId;

pub type TaskId = u64;

/// 任务优先级
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "Option<String>")]
pub enum Priority {
    Urgent,
    NotImportant,
    #[default]
    Idea,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::Urgent, Priority::NotImportant, Priority::Idea];

    pub fn key(self) -> &'static str {
        match self {
            Priority::Urgent => "urgent",
            Priority::NotImportant => "notImportant",
            Priority::Idea => "idea",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Priority::Urgent => "紧急",
            Priority::NotImportant => "不重要",
            Priority::Idea => "想法",
        }
    }

    /// 卡片左侧色条的 RGB 颜色
    pub fn color(self) -> (u8, u8, u8) {
        match self {
            Priority::Urgent => (0xe7, 0x4c, 0x3c),
            Priority::NotImportant => (0x95, 0xa5, 0xa6),
            Priority::Idea => (0x34, 0x98, 0xdb),
        }
    }

    /// 循环切换到下一个优先级
    pub fn next(self) -> Self {
        match self {
            Priority::Urgent => Priority::NotImportant,
            Priority::NotImportant => Priority::Idea,
            Priority::Idea => Priority::Urgent,
        }
    }

    /// 解析优先级，无法识别时回退到 `Idea`
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "urgent" | "high" => Priority::Urgent,
            "notimportant" | "not_important" | "low" => Priority::NotImportant,
            _ => Priority::Idea,
        }
    }
}

impl From<Option<String>> for Priority {
    fn from(value: Option<String>) -> Self {
        value.as_deref().map(Priority::parse).unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    /// 列内排序键（重新拉取后保持拖拽顺序）
    #[serde(default)]
    pub order: i64,
    pub text: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub assignee: Option<String>,
    #[serde(default, deserialize_with = "lenient_date")]
    pub due_date: Option<NaiveDate>,
    pub column_id: ColumnId,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub created_by: Option<String>,
}

impl Task {
    pub fn from_draft(id: TaskId, draft: TaskDraft) -> Self {
        Self {
            id,
            order: draft.order,
            text: draft.text.trim().to_string(),
            completed: false,
            priority: draft.priority,
            assignee: draft.assignee,
            due_date: draft.due_date,
            column_id: draft.column_id,
            created_by: draft.created_by,
        }
    }

    /// 截止日期早于 `today` 且未完成
    pub fn is_overdue_on(&self, today: NaiveDate) -> bool {
        !self.completed && self.due_date.is_some_and(|due| due < today)
    }

    pub fn is_overdue(&self) -> bool {
        self.is_overdue_on(chrono::Local::now().date_naive())
    }
}

/// 新建任务的输入
#[derive(Debug, Clone, PartialEq)]
pub struct TaskDraft {
    pub text: String,
    pub priority: Priority,
    pub assignee: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub column_id: ColumnId,
    pub created_by: Option<String>,
    pub order: i64,
}

impl TaskDraft {
    pub fn new(text: impl Into<String>, column_id: ColumnId) -> Self {
        Self {
            text: text.into(),
            priority: Priority::default(),
            assignee: None,
            due_date: None,
            column_id,
            created_by: None,
            order: 0,
        }
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_assignee(mut self, assignee: Option<String>) -> Self {
        self.assignee = assignee.filter(|a| !a.trim().is_empty());
        self
    }

    pub fn with_due_date(mut self, due_date: Option<NaiveDate>) -> Self {
        self.due_date = due_date;
        self
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// 任务的部分更新
///
/// `text`/`priority`/`assignee`/`due_date` 是可编辑字段；
/// `completed`/`column_id`/`order` 只在仓库调用中使用。
/// 内层 `None` 表示清空该字段。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskPatch {
    pub text: Option<String>,
    pub priority: Option<Priority>,
    pub assignee: Option<Option<String>>,
    pub due_date: Option<Option<NaiveDate>>,
    pub completed: Option<bool>,
    pub column_id: Option<ColumnId>,
    pub order: Option<i64>,
}

impl TaskPatch {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn completed(completed: bool) -> Self {
        Self {
            completed: Some(completed),
            ..Self::default()
        }
    }

    pub fn placement(column_id: ColumnId, order: i64) -> Self {
        Self {
            column_id: Some(column_id),
            order: Some(order),
            ..Self::default()
        }
    }

    pub fn order(order: i64) -> Self {
        Self {
            order: Some(order),
            ..Self::default()
        }
    }

    /// 编辑后的文本为空（去除空白后）
    pub fn has_blank_text(&self) -> bool {
        self.text.as_deref().is_some_and(|t| t.trim().is_empty())
    }

    /// 只应用可编辑字段
    pub fn apply_edit(&self, task: &mut Task) {
        if let Some(text) = &self.text {
            task.text = text.trim().to_string();
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(assignee) = &self.assignee {
            task.assignee = assignee
                .as_ref()
                .map(|a| a.trim().to_string())
                .filter(|a| !a.is_empty());
        }
        if let Some(due_date) = self.due_date {
            task.due_date = due_date;
        }
    }

    /// 应用全部字段（内存仓库使用）
    #[cfg(test)]
    pub fn apply_all(&self, task: &mut Task) {
        self.apply_edit(task);
        if let Some(completed) = self.completed {
            task.completed = completed;
        }
        if let Some(column_id) = self.column_id {
            task.column_id = column_id;
        }
        if let Some(order) = self.order {
            task.order = order;
        }
    }
}

/// 解析截止日期，接受 `YYYY-MM-DD` 或带时间的 ISO 格式
pub fn parse_due_date(value: &str) -> Result<NaiveDate, String> {
    let value = value.trim();
    let date_part = value.split('T').next().unwrap_or(value);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .map_err(|e| format!("无效的日期 '{}': {}", value, e))
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()))
}

fn lenient_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => parse_due_date(s).map(Some).map_err(serde::de::Error::custom),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        parse_due_date(s).unwrap()
    }

    fn task_due(due: &str, completed: bool) -> Task {
        let mut task = Task::from_draft(
            1,
            TaskDraft::new("写周报", ColumnId::Todo).with_due_date(Some(date(due))),
        );
        task.completed = completed;
        task
    }

    #[test]
    fn test_overdue_only_when_past_and_not_completed() {
        let today = date("2025-03-10");
        assert!(task_due("2025-03-09", false).is_overdue_on(today));
        assert!(!task_due("2025-03-09", true).is_overdue_on(today));
        assert!(!task_due("2025-03-10", false).is_overdue_on(today));
        assert!(!task_due("2025-03-11", false).is_overdue_on(today));
    }

    #[test]
    fn test_task_without_due_date_is_never_overdue() {
        let task = Task::from_draft(1, TaskDraft::new("无期限", ColumnId::Todo));
        assert!(!task.is_overdue_on(date("2030-01-01")));
    }

    #[test]
    fn test_unknown_priority_falls_back_to_idea() {
        assert_eq!(Priority::parse("urgent"), Priority::Urgent);
        assert_eq!(Priority::parse("notImportant"), Priority::NotImportant);
        assert_eq!(Priority::parse("whatever"), Priority::Idea);

        let json = r#"{"id":1,"text":"a","priority":"bogus","columnId":"todo"}"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.priority, Priority::Idea);

        let json = r#"{"id":1,"text":"a","priority":null,"columnId":"todo"}"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.priority, Priority::Idea);
    }

    #[test]
    fn test_legacy_local_task_with_empty_strings() {
        // 旧版本把空的负责人和日期存成 ""
        let json = r#"{
            "id": 1718000000000,
            "text": "新任务",
            "completed": false,
            "priority": "idea",
            "assignee": "",
            "dueDate": "",
            "columnId": "inProgress"
        }"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.assignee, None);
        assert_eq!(task.due_date, None);
        assert_eq!(task.created_by, None);
        assert_eq!(task.column_id, ColumnId::InProgress);
    }

    #[test]
    fn test_priority_serializes_with_wire_keys() {
        assert_eq!(serde_json::to_string(&Priority::NotImportant).unwrap(), "\"notImportant\"");
        for p in Priority::ALL {
            assert_eq!(Priority::parse(p.key()), p);
        }
    }

    #[test]
    fn test_apply_edit_ignores_structural_fields() {
        let mut task = Task::from_draft(7, TaskDraft::new("old", ColumnId::Todo));
        let patch = TaskPatch {
            text: Some("  new  ".to_string()),
            assignee: Some(Some("  ".to_string())),
            column_id: Some(ColumnId::Done),
            completed: Some(true),
            ..TaskPatch::default()
        };
        patch.apply_edit(&mut task);
        assert_eq!(task.text, "new");
        assert_eq!(task.assignee, None);
        assert_eq!(task.column_id, ColumnId::Todo);
        assert!(!task.completed);
    }

    #[test]
    fn test_parse_due_date_accepts_iso_datetime() {
        assert_eq!(date("2025-06-01T00:00:00+00:00"), date("2025-06-01"));
        assert!(parse_due_date("01.06.2025").is_err());
    }
}
