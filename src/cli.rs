use anyhow::{anyhow, bail, Result};
use std::env;

use crate::board::{Board, BoardError};
use crate::models::{parse_due_date, ColumnId, Priority, Role, Task, TaskDraft, TaskId, TaskPatch};

/// 处理 CLI 命令
/// 返回 true 表示应该继续进入 TUI，false 表示已处理完毕应该退出
pub fn handle_cli() -> Result<bool> {
    let args: Vec<String> = env::args().collect();

    // 如果没有参数，进入 TUI 模式
    if args.len() < 2 {
        return Ok(true);
    }

    match args[1].as_str() {
        "config" => {
            if let Err(e) = handle_config_command(&args[2..]) {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
            Ok(false)
        }
        "--help" | "-h" | "help" => {
            print_help();
            Ok(false)
        }
        "--version" | "-V" | "-v" => {
            print_version();
            Ok(false)
        }
        "list" | "add" | "toggle" | "edit" | "move" | "archive" | "restore" | "delete" | "stats" => {
            let config = crate::config::load_config()?;
            let mut board = config.open_board()?;
            let result = run_board_command(&mut board, &args[1..]);
            // 先丢弃看板，让后台通知发送完
            drop(board);
            if let Err(e) = result {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
            Ok(false)
        }
        _ => {
            eprintln!("未知命令: {}", args[1]);
            eprintln!("使用 'kb --help' 查看帮助");
            std::process::exit(1);
        }
    }
}

// ============================================================================
// Config Commands
// ============================================================================

fn handle_config_command(args: &[String]) -> Result<()> {
    let Some(sub) = args.first() else {
        return crate::config::show_config();
    };

    match sub.as_str() {
        "show" => crate::config::show_config(),
        "user" => {
            let id = args
                .get(1)
                .ok_or_else(|| anyhow!("用法: kb config user <id> [admin|member]"))?;
            let role = match args.get(2) {
                Some(value) => Some(
                    Role::parse(value).ok_or_else(|| anyhow!("未知角色: {}（可选 admin, member）", value))?,
                ),
                None => None,
            };
            crate::config::set_user(id.clone(), role)
        }
        "remote" => {
            let (Some(url), Some(api_key)) = (args.get(1), args.get(2)) else {
                bail!("用法: kb config remote <url> <api-key>");
            };
            crate::config::set_remote(url.clone(), api_key.clone())
        }
        "local" => crate::config::set_local(),
        "telegram" => {
            let (Some(token), Some(chat_id)) = (args.get(1), args.get(2)) else {
                bail!("用法: kb config telegram <bot-token> <chat-id>");
            };
            crate::config::set_telegram(token.clone(), chat_id.clone())
        }
        other => {
            bail!("未知的配置选项: {}\n可用选项: show, user, remote, local, telegram", other)
        }
    }
}

// ============================================================================
// Board Commands
// ============================================================================

/// 在看板上执行一条命令，`args[0]` 是命令名
pub fn run_board_command(board: &mut Board, args: &[String]) -> Result<()> {
    let rest = &args[1..];
    match args[0].as_str() {
        "list" => {
            let column = parse_flag(rest, "--column").map(|c| parse_column(&c)).transpose()?;
            let archived = rest.iter().any(|a| a == "--archived");
            task_list(board, column, archived);
            Ok(())
        }
        "add" => {
            let text = positional(rest).join(" ");
            let column = parse_flag(rest, "--column")
                .map(|c| parse_column(&c))
                .transpose()?
                .unwrap_or(ColumnId::Todo);
            let due = parse_flag(rest, "--due").map(|d| parse_date(&d)).transpose()?;
            let draft = TaskDraft::new(text, column)
                .with_priority(parse_flag(rest, "--priority").map(|p| Priority::parse(&p)).unwrap_or_default())
                .with_assignee(parse_flag(rest, "--assignee"))
                .with_due_date(due);
            match board.add_task(draft)? {
                Some(id) => {
                    println!("✓ 已创建任务 #{}", id);
                    Ok(())
                }
                None => bail!("任务文本不能为空"),
            }
        }
        "toggle" => {
            let id = parse_id(rest)?;
            let completed = board.toggle_completed(id)?;
            let state = if completed { "已完成" } else { "未完成" };
            println!("✓ 任务 #{} 标记为{}", id, state);
            Ok(())
        }
        "edit" => {
            let id = parse_id(rest)?;
            let patch = TaskPatch {
                text: parse_flag(rest, "--text"),
                priority: parse_flag(rest, "--priority").map(|p| Priority::parse(&p)),
                assignee: parse_flag(rest, "--assignee").map(|a| Some(a).filter(|a| !a.trim().is_empty())),
                due_date: parse_flag(rest, "--due")
                    .map(|d| if d.trim().is_empty() { Ok(None) } else { parse_date(&d).map(Some) })
                    .transpose()?,
                ..TaskPatch::default()
            };
            if patch == TaskPatch::default() {
                bail!("用法: kb edit <id> [--text <文本>] [--priority <p>] [--assignee <a>] [--due <日期>]");
            }
            if !board.edit_task(id, patch)? {
                bail!("任务文本不能为空");
            }
            println!("✓ 已更新任务 #{}", id);
            Ok(())
        }
        "move" => {
            let id = parse_id(rest)?;
            let to = rest
                .get(1)
                .ok_or_else(|| anyhow!("用法: kb move <id> <todo|inProgress|done>"))
                .and_then(|c| parse_column(c))?;
            let (from, _) = board
                .partition()
                .find(id)
                .ok_or(BoardError::TaskNotFound(id))?;
            board.move_across_columns(id, from, to)?;
            println!("✓ 任务 #{} 已移到「{}」", id, to.label());
            Ok(())
        }
        "archive" => {
            let id = parse_id(rest)?;
            board.archive_task(id)?;
            println!("✓ 任务 #{} 已归档", id);
            Ok(())
        }
        "restore" => {
            let id = parse_id(rest)?;
            let target = rest
                .get(1)
                .map(|c| parse_column(c))
                .transpose()?
                .unwrap_or(ColumnId::Todo);
            board.restore_task(id, target)?;
            println!("✓ 任务 #{} 已恢复到「{}」", id, target.label());
            Ok(())
        }
        "delete" => {
            let id = parse_id(rest)?;
            board.delete_task(id)?;
            println!("✓ 任务 #{} 已永久删除", id);
            Ok(())
        }
        "stats" => {
            print_stats(board);
            Ok(())
        }
        cmd => bail!("未知命令: {}", cmd),
    }
}

fn parse_flag(args: &[String], flag: &str) -> Option<String> {
    args.iter()
        .position(|s| s == flag)
        .and_then(|i| args.get(i + 1))
        .cloned()
}

/// 第一个 `--flag` 之前的参数
fn positional(args: &[String]) -> &[String] {
    let end = args.iter().position(|a| a.starts_with("--")).unwrap_or(args.len());
    &args[..end]
}

fn parse_id(args: &[String]) -> Result<TaskId> {
    let raw = args.first().ok_or_else(|| anyhow!("缺少任务 ID"))?;
    raw.parse()
        .map_err(|_| anyhow!("无效的任务 ID: {}（必须是数字）", raw))
}

fn parse_column(key: &str) -> Result<ColumnId> {
    ColumnId::from_key(key).ok_or_else(|| BoardError::UnknownColumn(key.to_string()).into())
}

fn parse_date(value: &str) -> Result<chrono::NaiveDate> {
    parse_due_date(value).map_err(|e| anyhow!(e))
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}

fn task_list(board: &Board, column: Option<ColumnId>, archived: bool) {
    let columns: Vec<ColumnId> = match column {
        Some(c) => vec![c],
        None if archived => vec![ColumnId::Archived],
        None => ColumnId::BOARD.to_vec(),
    };

    for column in columns {
        let tasks = board.partition().column(column);
        println!("{} ({})", column.label(), tasks.len());
        if tasks.is_empty() {
            println!("  -");
        }
        for task in tasks {
            println!("  {}", format_task_row(task));
        }
        println!();
    }
}

fn format_task_row(task: &Task) -> String {
    let check = if task.completed { "✓" } else { " " };
    let due = task
        .due_date
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "-".to_string());
    let overdue = if task.is_overdue() { " 逾期" } else { "" };
    format!(
        "[{}] #{:<14} {:<35} {:<6} @{:<10} {}{}",
        check,
        task.id,
        truncate(&task.text, 35),
        task.priority.label(),
        task.assignee.as_deref().unwrap_or("-"),
        due,
        overdue
    )
}

fn print_stats(board: &Board) {
    let partition = board.partition();
    for column in ColumnId::BOARD {
        let stats = partition.stats(column);
        println!("{:<8} {:>3} 个任务，{:>3} 已完成", column.label(), stats.total, stats.completed);
    }
    let total = partition.board_stats();
    println!(
        "共 {} | 已完成 {} | 剩余 {} | 归档 {}",
        total.total,
        total.completed,
        total.total - total.completed,
        partition.column(ColumnId::Archived).len()
    );
}

fn print_help() {
    println!("Kanban Board (kb) - 终端看板\n");
    println!("用法:");
    println!("  kb                      启动 TUI 界面");
    println!("  kb <命令> [参数]          运行 CLI 命令");
    println!("  kb --help               显示此帮助信息");
    println!("  kb --version            显示版本信息\n");

    println!("任务命令:");
    println!("  list [--column <列>] [--archived]");
    println!("  add <文本> [--column <列>] [--priority <p>] [--assignee <a>] [--due YYYY-MM-DD]");
    println!("  toggle <id>             切换完成状态");
    println!("  edit <id> [--text <t>] [--priority <p>] [--assignee <a>] [--due <d>]");
    println!("  move <id> <列>           移到另一列尾部");
    println!("  archive <id>            归档");
    println!("  restore <id> [列]        从归档恢复（默认 todo）");
    println!("  delete <id>             永久删除已归档的任务");
    println!("  stats                   统计\n");

    println!("配置命令:");
    println!("  config show");
    println!("  config user <id> [admin|member]");
    println!("  config remote <url> <api-key>");
    println!("  config local");
    println!("  config telegram <bot-token> <chat-id>\n");

    println!("列: todo, inProgress, done");
    let priorities: Vec<_> = Priority::ALL.iter().map(|p| format!("{} ({})", p.key(), p.label())).collect();
    println!("优先级: {}\n", priorities.join(", "));

    println!("示例:");
    println!("  kb add 修复登录问题 --priority urgent --assignee bob --due 2025-06-01");
    println!("  kb move 1718000000000 done");
    println!("  kb list --archived");
}

/// 打印版本信息
fn print_version() {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    const NAME: &str = env!("CARGO_PKG_NAME");
    println!("{} {}", NAME, VERSION);
}
