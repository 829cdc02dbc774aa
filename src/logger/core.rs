/// Core logging implementation: level filtering plus colored console output
///
/// Filtering rules:
/// 1. Errors are always shown
/// 2. Everything else is checked against the minimum level threshold
use super::config::get_logger_config;
use super::levels::LogLevel;
use super::tags::LogTag;
use chrono::Local;
use colored::*;
use std::io::{stdout, ErrorKind, Write};

/// Tag column width for alignment
const TAG_WIDTH: usize = 9;

fn should_log(level: LogLevel) -> bool {
    if level == LogLevel::Error {
        return true;
    }
    level <= get_logger_config().min_level
}

pub fn log_internal(tag: LogTag, level: LogLevel, message: &str) {
    if !should_log(level) {
        return;
    }

    let time = Local::now().format("%H:%M:%S").to_string();

    let tag_str = format!("{:<width$}", tag.as_str(), width = TAG_WIDTH);
    let tag_colored = match tag {
        LogTag::Services => tag_str.cyan(),
        LogTag::Api | LogTag::Cache => tag_str.blue(),
        _ => tag_str.magenta(),
    };

    let level_colored = match level {
        LogLevel::Error => level.as_str().red().bold(),
        LogLevel::Warning => level.as_str().yellow(),
        LogLevel::Info => level.as_str().green(),
        LogLevel::Debug => level.as_str().dimmed(),
    };

    let line = format!(
        "{} [{}] [{}] {}",
        time.dimmed(),
        tag_colored,
        level_colored,
        message
    );

    print_stdout_safe(&line);
}

/// Print to stdout, swallowing broken-pipe errors when output is piped
fn print_stdout_safe(line: &str) {
    let mut out = stdout();
    if let Err(e) = writeln!(out, "{}", line) {
        if e.kind() != ErrorKind::BrokenPipe {
            eprintln!("{}", line);
        }
    }
}
