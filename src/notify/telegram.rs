use std::time::Duration;

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use super::{ActionKind, Notifier};
use crate::log::log_debug;
use crate::models::{Actor, Task};

const API_BASE: &str = "https://api.telegram.org";

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'a str,
}

#[derive(Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

/// Telegram 机器人通知
///
/// 没有配置 token 或 chat id 时禁用，`notify` 直接返回 `false`。
pub struct TelegramNotifier {
    client: Client,
    bot_token: Option<String>,
    chat_id: Option<String>,
}

impl TelegramNotifier {
    pub fn new(bot_token: Option<String>, chat_id: Option<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_else(|_| Client::new());

        match bot_token.as_deref() {
            None => log_debug("未配置 Telegram bot token，通知已禁用".to_string()),
            Some(token) if !validate_token(token) => {
                log_debug("Telegram bot token 格式不正确".to_string())
            }
            Some(_) => {}
        }

        Self {
            client,
            bot_token: bot_token.filter(|t| !t.trim().is_empty()),
            chat_id: chat_id.filter(|c| !c.trim().is_empty()),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.bot_token.is_some() && self.chat_id.is_some()
    }

    fn send_message(&self, token: &str, chat_id: &str, text: &str) -> bool {
        let url = format!("{}/bot{}/sendMessage", API_BASE, token);
        let body = SendMessage {
            chat_id,
            text,
            parse_mode: "HTML",
        };

        let response = match self.client.post(url).json(&body).send() {
            Ok(response) => response,
            Err(e) => {
                log_debug(format!("发送 Telegram 消息时网络错误: {}", e));
                return false;
            }
        };

        match response.json::<ApiResponse>() {
            Ok(result) if result.ok => true,
            Ok(result) => {
                log_debug(format!(
                    "Telegram 返回错误: {}",
                    result.description.unwrap_or_default()
                ));
                false
            }
            Err(e) => {
                log_debug(format!("无法解析 Telegram 响应: {}", e));
                false
            }
        }
    }
}

impl Notifier for TelegramNotifier {
    fn notify(&self, task: &Task, action: ActionKind, actor: &Actor) -> bool {
        let (Some(token), Some(chat_id)) = (&self.bot_token, &self.chat_id) else {
            return false;
        };
        let today = chrono::Local::now().date_naive();
        let message = format_task_message(task, action, actor, today);
        self.send_message(token, chat_id, &message)
    }
}

/// 检查 token 格式：`<数字>:<字母数字_->`
pub fn validate_token(token: &str) -> bool {
    let Some((bot_id, secret)) = token.split_once(':') else {
        return false;
    };
    !bot_id.is_empty()
        && bot_id.chars().all(|c| c.is_ascii_digit())
        && !secret.is_empty()
        && secret
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// 生成通知文本（Telegram HTML）
pub fn format_task_message(
    task: &Task,
    action: ActionKind,
    actor: &Actor,
    today: chrono::NaiveDate,
) -> String {
    let text = escape_html(&task.text);
    let priority = task.priority.label();
    let due = task
        .due_date
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "未指定".to_string());
    let assignee = task.assignee.as_deref().map(escape_html);

    let mut lines = Vec::new();
    match action {
        ActionKind::Created => {
            lines.push("📋 <b>新任务已创建！</b>".to_string());
            lines.push(format!("任务: {}", text));
            lines.push(format!("优先级: {}", priority));
            lines.push(format!("截止: {}", due));
            if let Some(a) = &assignee {
                lines.push(format!("负责人: {}", a));
            }
        }
        ActionKind::Completed => {
            lines.push("✅ <b>任务已完成！</b>".to_string());
            lines.push(format!("任务: {}", text));
            if let Some(a) = &assignee {
                lines.push(format!("执行人: {}", a));
            }
            lines.push(format!("完成日期: {}", today.format("%Y-%m-%d")));
            lines.push("干得漂亮！🎉".to_string());
        }
        ActionKind::Archived => {
            lines.push("📦 <b>任务已归档</b>".to_string());
            lines.push(format!("任务: {}", text));
            let status = if task.completed { "已完成" } else { "未完成" };
            lines.push(format!("完成状态: {}", status));
        }
        ActionKind::Deleted => {
            lines.push("🗑️ <b>任务已永久删除</b>".to_string());
            lines.push(format!("任务: {}", text));
        }
        ActionKind::Edited => {
            lines.push("✏️ <b>任务已更新</b>".to_string());
            lines.push(format!("任务: {}", text));
            lines.push(format!("优先级: {}", priority));
            lines.push(format!("截止: {}", due));
            if let Some(a) = &assignee {
                lines.push(format!("负责人: {}", a));
            }
        }
        ActionKind::Assigned => {
            lines.push("👤 <b>你被分配了一个任务！</b>".to_string());
            lines.push(format!("任务: {}", text));
            lines.push(format!("优先级: {}", priority));
            lines.push(format!("截止: {}", due));
        }
    }
    lines.push(format!("操作人: {}", escape_html(&actor.id)));

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::partition::tests::task;
    use crate::models::{parse_due_date, ColumnId, Priority, Role};

    fn today() -> chrono::NaiveDate {
        parse_due_date("2025-05-20").unwrap()
    }

    #[test]
    fn test_created_message_includes_details() {
        let mut t = task(1, "修复 <登录> 问题", ColumnId::Todo);
        t.priority = Priority::Urgent;
        t.assignee = Some("bob".to_string());
        t.due_date = Some(parse_due_date("2025-06-01").unwrap());

        let msg = format_task_message(&t, ActionKind::Created, &Actor::new("alice", Role::Member), today());
        assert!(msg.starts_with("📋 <b>新任务已创建！</b>"));
        assert!(msg.contains("任务: 修复 &lt;登录&gt; 问题"));
        assert!(msg.contains("优先级: 紧急"));
        assert!(msg.contains("截止: 2025-06-01"));
        assert!(msg.contains("负责人: bob"));
        assert!(msg.ends_with("操作人: alice"));
    }

    #[test]
    fn test_missing_due_date_and_assignee() {
        let t = task(1, "A", ColumnId::Todo);
        let msg = format_task_message(&t, ActionKind::Edited, &Actor::new("alice", Role::Member), today());
        assert!(msg.contains("截止: 未指定"));
        assert!(!msg.contains("负责人"));
    }

    #[test]
    fn test_completed_message_uses_today() {
        let t = task(1, "A", ColumnId::Done);
        let msg = format_task_message(&t, ActionKind::Completed, &Actor::new("alice", Role::Member), today());
        assert!(msg.contains("完成日期: 2025-05-20"));
    }

    #[test]
    fn test_validate_token() {
        assert!(validate_token("123456:AbC_d-9"));
        assert!(!validate_token("abc:def"));
        assert!(!validate_token("123456:"));
        assert!(!validate_token("123456"));
        assert!(!validate_token("123:ab cd"));
    }

    #[test]
    fn test_disabled_notifier_returns_false() {
        let notifier = TelegramNotifier::new(None, Some("42".to_string()));
        assert!(!notifier.is_enabled());
        let t = task(1, "A", ColumnId::Todo);
        assert!(!notifier.notify(&t, ActionKind::Created, &Actor::new("alice", Role::Member)));
    }
}
