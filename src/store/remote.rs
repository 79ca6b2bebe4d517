use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};

use super::TaskRepository;
use crate::models::{ColumnId, Priority, Task, TaskDraft, TaskId, TaskPatch};

/// 远程数据表中的一行（snake_case 列名）
#[derive(Debug, Clone, Serialize, Deserialize)]
struct TaskRow {
    id: TaskId,
    text: String,
    #[serde(default)]
    completed: bool,
    #[serde(default)]
    priority: Priority,
    #[serde(default)]
    assignee: Option<String>,
    #[serde(default)]
    due_date: Option<String>,
    column_id: ColumnId,
    #[serde(default)]
    created_by: Option<String>,
    #[serde(default)]
    position: i64,
}

impl TaskRow {
    fn into_task(self) -> Task {
        Task {
            id: self.id,
            order: self.position,
            text: self.text,
            completed: self.completed,
            priority: self.priority,
            assignee: self.assignee.filter(|a| !a.trim().is_empty()),
            due_date: self
                .due_date
                .as_deref()
                .and_then(|d| crate::models::parse_due_date(d).ok()),
            column_id: self.column_id,
            created_by: self.created_by,
        }
    }
}

#[derive(Debug, Serialize)]
struct NewRow<'a> {
    text: &'a str,
    completed: bool,
    priority: Priority,
    assignee: Option<&'a str>,
    due_date: Option<NaiveDate>,
    column_id: ColumnId,
    created_by: Option<&'a str>,
    position: i64,
}

impl<'a> From<&'a TaskDraft> for NewRow<'a> {
    fn from(draft: &'a TaskDraft) -> Self {
        Self {
            text: draft.text.trim(),
            completed: false,
            priority: draft.priority,
            assignee: draft.assignee.as_deref(),
            due_date: draft.due_date,
            column_id: draft.column_id,
            created_by: draft.created_by.as_deref(),
            position: draft.order,
        }
    }
}

/// PATCH 请求体；`Some(None)` 序列化为 null 以清空字段
#[derive(Debug, Default, Serialize)]
struct PatchRow {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    priority: Option<Priority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    assignee: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    due_date: Option<Option<NaiveDate>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    completed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    column_id: Option<ColumnId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    position: Option<i64>,
}

impl From<&TaskPatch> for PatchRow {
    fn from(patch: &TaskPatch) -> Self {
        Self {
            text: patch.text.as_ref().map(|t| t.trim().to_string()),
            priority: patch.priority,
            assignee: patch
                .assignee
                .clone()
                .map(|a| a.filter(|s| !s.trim().is_empty())),
            due_date: patch.due_date,
            completed: patch.completed,
            column_id: patch.column_id,
            position: patch.order,
        }
    }
}

/// PostgREST 风格的 REST 仓库（例如 Supabase 的 `/rest/v1/<table>`）
pub struct RestRepository {
    client: Client,
    endpoint: String,
}

impl RestRepository {
    pub fn new(base_url: &str, api_key: &str, table: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert("apikey", HeaderValue::from_str(api_key)?);
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", api_key))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert("Prefer", HeaderValue::from_static("return=representation"));

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .context("create HTTP client")?;

        Ok(Self {
            client,
            endpoint: format!("{}/rest/v1/{}", base_url.trim_end_matches('/'), table),
        })
    }

    fn single(rows: Vec<TaskRow>, what: &str) -> Result<Task> {
        rows.into_iter()
            .next()
            .map(TaskRow::into_task)
            .ok_or_else(|| anyhow!("{} returned no rows", what))
    }
}

impl TaskRepository for RestRepository {
    fn list(&self) -> Result<Vec<Task>> {
        let rows: Vec<TaskRow> = self
            .client
            .get(&self.endpoint)
            .query(&[("select", "*"), ("order", "position.asc,id.asc")])
            .send()
            .context("list tasks")?
            .error_for_status()?
            .json()
            .context("decode task list")?;
        Ok(rows.into_iter().map(TaskRow::into_task).collect())
    }

    fn insert(&self, draft: &TaskDraft) -> Result<Task> {
        let rows: Vec<TaskRow> = self
            .client
            .post(&self.endpoint)
            .json(&NewRow::from(draft))
            .send()
            .context("insert task")?
            .error_for_status()?
            .json()?;
        Self::single(rows, "insert")
    }

    fn update(&self, id: TaskId, patch: &TaskPatch) -> Result<Task> {
        let rows: Vec<TaskRow> = self
            .client
            .patch(&self.endpoint)
            .query(&[("id", format!("eq.{}", id))])
            .json(&PatchRow::from(patch))
            .send()
            .with_context(|| format!("update task {}", id))?
            .error_for_status()?
            .json()?;
        Self::single(rows, "update")
    }

    fn delete(&self, id: TaskId) -> Result<()> {
        self.client
            .delete(&self.endpoint)
            .query(&[("id", format!("eq.{}", id))])
            .send()
            .with_context(|| format!("delete task {}", id))?
            .error_for_status()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_maps_snake_case_columns() {
        let json = r#"{
            "id": 42,
            "text": "发布版本",
            "completed": false,
            "priority": "urgent",
            "assignee": "",
            "due_date": "2025-07-01",
            "column_id": "inProgress",
            "created_by": "alice",
            "position": 3000
        }"#;
        let task = serde_json::from_str::<TaskRow>(json).unwrap().into_task();
        assert_eq!(task.id, 42);
        assert_eq!(task.order, 3000);
        assert_eq!(task.priority, Priority::Urgent);
        assert_eq!(task.assignee, None);
        assert_eq!(task.column_id, ColumnId::InProgress);
        assert_eq!(task.due_date.map(|d| d.to_string()), Some("2025-07-01".to_string()));
    }

    #[test]
    fn test_patch_body_only_contains_set_fields() {
        let patch = TaskPatch {
            assignee: Some(None),
            ..TaskPatch::placement(ColumnId::Done, 2000)
        };
        let body = serde_json::to_value(PatchRow::from(&patch)).unwrap();
        assert_eq!(
            body,
            serde_json::json!({ "assignee": null, "column_id": "done", "position": 2000 })
        );
    }
}
