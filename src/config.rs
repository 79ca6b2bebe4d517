/// 应用配置管理
use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::board::Board;
use crate::models::{Actor, Role};
use crate::notify::{NotificationQueue, TelegramNotifier};
use crate::state::{default_state_file_path, LocalStore};
use crate::store::RestRepository;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub user: UserConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub telegram: TelegramConfig,
}

/// 当前用户身份（用于授权检查）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserConfig {
    pub id: String,
    #[serde(default)]
    pub role: Role,
}

impl Default for UserConfig {
    fn default() -> Self {
        Self {
            id: detect_user(),
            role: Role::Member,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Local,
    Remote,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,
    /// 本地状态文件，默认 ~/.kanban-board/state.json
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_file: Option<PathBuf>,
    /// 远程服务地址，例如 https://xyz.supabase.co
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default = "default_table")]
    pub table: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Local,
            state_file: None,
            url: None,
            api_key: None,
            table: default_table(),
        }
    }
}

fn default_table() -> String {
    "tasks".to_string()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TelegramConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bot_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chat_id: Option<String>,
}

impl Config {
    pub fn actor(&self) -> Actor {
        Actor::new(self.user.id.clone(), self.user.role)
    }

    pub fn state_file(&self) -> PathBuf {
        self.storage
            .state_file
            .clone()
            .unwrap_or_else(default_state_file_path)
    }

    /// Telegram 凭据，环境变量优先
    pub fn telegram_credentials(&self) -> (Option<String>, Option<String>) {
        let token = std::env::var("TELEGRAM_BOT_TOKEN")
            .ok()
            .or_else(|| self.telegram.bot_token.clone());
        let chat_id = std::env::var("TELEGRAM_DEFAULT_CHAT_ID")
            .ok()
            .or_else(|| self.telegram.chat_id.clone());
        (token, chat_id)
    }

    /// 根据配置打开看板
    pub fn open_board(&self) -> Result<Board> {
        let board = match self.storage.backend {
            StorageBackend::Local => Board::open_local(LocalStore::new(self.state_file()), self.actor())?,
            StorageBackend::Remote => {
                let (Some(url), Some(api_key)) = (&self.storage.url, &self.storage.api_key) else {
                    bail!("远程存储需要配置 url 和 api_key（kb config remote <url> <api-key>）");
                };
                let repository = RestRepository::new(url, api_key, &self.storage.table)?;
                Board::open_remote(Box::new(repository), self.actor())
            }
        };

        let (token, chat_id) = self.telegram_credentials();
        let notifier = TelegramNotifier::new(token, chat_id);
        if notifier.is_enabled() {
            return Ok(board.with_notifier(NotificationQueue::spawn(Box::new(notifier))));
        }
        Ok(board)
    }
}

/// 获取配置文件路径
/// Windows: %APPDATA%\kanban-board\config.toml
/// macOS: ~/Library/Application Support/kanban-board/config.toml
/// Linux: ~/.config/kanban-board/config.toml
pub fn get_config_path() -> PathBuf {
    let config_dir = directories::BaseDirs::new()
        .map(|dirs| dirs.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."));
    config_dir.join("kanban-board").join("config.toml")
}

/// 加载配置
pub fn load_config() -> Result<Config> {
    let config_path = get_config_path();

    if !config_path.exists() {
        // 配置文件不存在，返回默认配置
        return Ok(Config::default());
    }

    let content = std::fs::read_to_string(config_path)?;
    let config: Config = toml::from_str(&content)?;

    Ok(config)
}

/// 保存配置
pub fn save_config(config: &Config) -> Result<()> {
    let config_path = get_config_path();

    // 确保目录存在
    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let content = toml::to_string_pretty(config)?;
    std::fs::write(config_path, content)?;

    Ok(())
}

/// 首次运行检查
/// 返回 (config, is_first_run)
pub fn check_first_run() -> Result<(Config, bool)> {
    let config_path = get_config_path();

    if !config_path.exists() {
        // 首次运行，创建默认配置
        let config = Config::default();
        save_config(&config)?;

        Ok((config, true))
    } else {
        Ok((load_config()?, false))
    }
}

/// 检测当前系统用户名
fn detect_user() -> String {
    std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .ok()
        .filter(|u| !u.trim().is_empty())
        .unwrap_or_else(|| "local".to_string())
}

/// 设置当前用户
pub fn set_user(id: String, role: Option<Role>) -> Result<()> {
    let mut config = load_config()?;
    config.user.id = id;
    if let Some(role) = role {
        config.user.role = role;
    }
    save_config(&config)?;
    println!("✓ 当前用户: {} ({:?})", config.user.id, config.user.role);
    Ok(())
}

/// 切换到远程存储
pub fn set_remote(url: String, api_key: String) -> Result<()> {
    let mut config = load_config()?;
    config.storage.backend = StorageBackend::Remote;
    config.storage.url = Some(url);
    config.storage.api_key = Some(api_key);
    save_config(&config)?;
    println!("✓ 已切换到远程存储: {}", config.storage.url.as_deref().unwrap_or_default());
    Ok(())
}

/// 切换到本地存储
pub fn set_local() -> Result<()> {
    let mut config = load_config()?;
    config.storage.backend = StorageBackend::Local;
    save_config(&config)?;
    println!("✓ 已切换到本地存储: {}", config.state_file().display());
    Ok(())
}

/// 设置 Telegram 通知
pub fn set_telegram(bot_token: String, chat_id: String) -> Result<()> {
    if !crate::notify::telegram::validate_token(&bot_token) {
        bail!("bot token 格式不正确，应为 <数字>:<字符串>");
    }
    let mut config = load_config()?;
    config.telegram.bot_token = Some(bot_token);
    config.telegram.chat_id = Some(chat_id);
    save_config(&config)?;
    println!("✓ Telegram 通知已启用");
    Ok(())
}

/// 显示当前配置
pub fn show_config() -> Result<()> {
    let config = load_config()?;
    let (token, chat_id) = config.telegram_credentials();

    println!("当前配置:");
    println!("  用户:     {} ({:?})", config.user.id, config.user.role);
    match config.storage.backend {
        StorageBackend::Local => {
            println!("  存储:     本地 {}", config.state_file().display());
        }
        StorageBackend::Remote => {
            println!(
                "  存储:     远程 {} (表 {})",
                config.storage.url.as_deref().unwrap_or("<未设置>"),
                config.storage.table
            );
        }
    }
    let telegram = match (token, chat_id) {
        (Some(_), Some(chat)) => format!("已启用 (chat {})", chat),
        _ => "未启用".to_string(),
    };
    println!("  Telegram: {}", telegram);
    println!();
    println!("配置文件: {}", get_config_path().display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.storage.backend, StorageBackend::Local);
        assert_eq!(config.storage.table, "tasks");
        assert_eq!(config.user.role, Role::Member);
        assert!(!config.user.id.is_empty());
    }

    #[test]
    fn test_parse_remote_config() {
        let content = r#"
[user]
id = "alice"
role = "admin"

[storage]
backend = "remote"
url = "https://example.supabase.co"
api_key = "secret"

[telegram]
bot_token = "123:abc"
chat_id = "-100200"
"#;
        let config: Config = toml::from_str(content).unwrap();
        assert_eq!(config.actor(), Actor::new("alice", Role::Admin));
        assert_eq!(config.storage.backend, StorageBackend::Remote);
        assert_eq!(config.storage.table, "tasks");
        assert_eq!(config.telegram.chat_id.as_deref(), Some("-100200"));
    }

    #[test]
    fn test_remote_without_credentials_fails_to_open() {
        let config = Config {
            storage: StorageConfig {
                backend: StorageBackend::Remote,
                ..StorageConfig::default()
            },
            ..Config::default()
        };
        assert!(config.open_board().is_err());
    }

    #[test]
    fn test_config_roundtrips_through_toml() {
        let config = Config {
            user: UserConfig {
                id: "bob".to_string(),
                role: Role::Member,
            },
            storage: StorageConfig {
                state_file: Some(PathBuf::from("/tmp/board.json")),
                ..StorageConfig::default()
            },
            telegram: TelegramConfig::default(),
        };
        let text = toml::to_string_pretty(&config).unwrap();
        assert_eq!(toml::from_str::<Config>(&text).unwrap(), config);
    }
}
