//! # Logging Sink Module / 日志接收器模块
//!
//! The harness never prints on its own. Every message goes through a
//! `LogSink` supplied by the caller: `ConsoleLog` for interactive runs,
//! `MemoryLog` when the messages themselves are under test.
//!
//! 框架从不自行打印。所有消息都通过调用者提供的 `LogSink` 输出：
//! 交互式运行使用 `ConsoleLog`，需要检查消息本身时使用 `MemoryLog`。

use colored::*;
use std::cell::RefCell;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Info,
    Warn,
    Error,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
        };
        f.write_str(label)
    }
}

/// Destination for harness log messages.
/// 框架日志消息的目的地。
pub trait LogSink {
    fn log(&self, level: Level, message: &str);

    fn info(&self, message: &str) {
        self.log(Level::Info, message);
    }

    fn warn(&self, message: &str) {
        self.log(Level::Warn, message);
    }

    fn error(&self, message: &str) {
        self.log(Level::Error, message);
    }
}

/// Prints colored lines, errors to stderr and everything else to stdout.
/// 打印彩色行：错误输出到 stderr，其他输出到 stdout。
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleLog {
    /// Drop `Info` messages.
    pub quiet: bool,
}

impl ConsoleLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn quiet() -> Self {
        Self { quiet: true }
    }
}

impl LogSink for ConsoleLog {
    fn log(&self, level: Level, message: &str) {
        match level {
            Level::Info if self.quiet => {}
            Level::Info => println!("{} {}", "[INFO]".cyan(), message),
            Level::Warn => println!("{} {}", "[WARN]".yellow(), message),
            Level::Error => eprintln!("{} {}", "[ERROR]".red().bold(), message),
        }
    }
}

/// Keeps every message in memory.
/// 在内存中保存所有消息。
#[derive(Debug, Default)]
pub struct MemoryLog {
    lines: RefCell<Vec<(Level, String)>>,
}

impl MemoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<(Level, String)> {
        self.lines.borrow().clone()
    }

    /// `true` if any message at `level` contains `needle`.
    pub fn contains(&self, level: Level, needle: &str) -> bool {
        self.lines
            .borrow()
            .iter()
            .any(|(l, line)| *l == level && line.contains(needle))
    }

    pub fn clear(&self) {
        self.lines.borrow_mut().clear();
    }
}

impl LogSink for MemoryLog {
    fn log(&self, level: Level, message: &str) {
        self.lines.borrow_mut().push((level, message.to_string()));
    }
}
