//! # Reporting Module / 报告模块
//!
//! Views of a finished `GroupReport`: a colored console summary and a
//! JSON-lines dump of the result stream.
//!
//! 已完成的 `GroupReport` 的视图：彩色控制台摘要，以及结果流的 JSON 行输出。

pub mod console;
pub mod json;

// Re-export common reporting functions
pub use console::{format_summary, print_summary};
pub use json::write_results;
