/// 调试日志：追加写入日志文件，写入失败时静默忽略
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

/// 日志文件路径，可用 `KANBAN_BOARD_LOG` 覆盖
pub fn log_file_path() -> PathBuf {
    std::env::var_os("KANBAN_BOARD_LOG")
        .map(PathBuf::from)
        .unwrap_or_else(|| std::env::temp_dir().join("kanban_board_debug.log"))
}

pub fn log_debug(msg: String) {
    if let Ok(mut file) = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file_path())
    {
        let _ = writeln!(
            file,
            "[{}] {}",
            chrono::Local::now().format("%H:%M:%S"),
            msg
        );
    }
}
