/// 本地持久化状态
///
/// 一个 JSON 文档，包含两个键：`kanban-columns`（列划分）和 `darkMode`。
/// 启动时读取一次，每次状态变化后整体写回。
use crate::board::Partition;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocalState {
    #[serde(rename = "kanban-columns", default)]
    pub columns: Partition,
    #[serde(rename = "darkMode", default)]
    pub dark_mode: bool,
}

/// 获取默认状态文件路径
/// All platforms: ~/.kanban-board/state.json
pub fn default_state_file_path() -> PathBuf {
    let home_dir = directories::BaseDirs::new()
        .map(|dirs| dirs.home_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."));
    home_dir.join(".kanban-board").join("state.json")
}

/// 本地状态存储
#[derive(Debug, Clone)]
pub struct LocalStore {
    path: PathBuf,
}

impl LocalStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 从文件加载状态，文件不存在时返回空状态
    pub fn load(&self) -> Result<LocalState> {
        if !self.path.exists() {
            return Ok(LocalState::default());
        }

        let content = std::fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(LocalState::default());
        }
        let state: LocalState = serde_json::from_str(&content)?;

        Ok(state)
    }

    /// 保存状态（临时文件 + 重命名）
    pub fn save(&self, state: &LocalState) -> Result<()> {
        // 确保目录存在
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(state)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(tmp, &self.path)?;

        Ok(())
    }
}
