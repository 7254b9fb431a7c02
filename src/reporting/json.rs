//! JSON-lines view of the result stream. One object per line, in execution order.
//!
//! 结果流的 JSON 行视图。每行一个对象，按执行顺序排列。

use anyhow::{Context, Result};
use serde::Serialize;
use std::io::Write;

use crate::core::models::{GroupReport, TestResult};

#[derive(Serialize)]
struct ResultLine<'a> {
    group: &'a str,
    case: &'a str,
    row: Option<u64>,
    #[serde(flatten)]
    result: &'a TestResult,
}

#[derive(Serialize)]
struct StatusLine<'a> {
    group: &'a str,
    status: String,
    passed: bool,
}

/// Writes every result, then one closing status object.
/// 写出所有结果，最后写出一个状态对象。
pub fn write_results<W: Write>(report: &GroupReport, mut writer: W) -> Result<()> {
    for entry in &report.results {
        let line = ResultLine {
            group: &report.group,
            case: &entry.case,
            row: entry.row,
            result: &entry.result,
        };
        serde_json::to_writer(&mut writer, &line)
            .with_context(|| format!("Failed to serialize result of {}", entry.case))?;
        writeln!(writer).context("Failed to write result line")?;
    }

    let status = StatusLine {
        group: &report.group,
        status: report.status(),
        passed: report.is_passed(),
    };
    serde_json::to_writer(&mut writer, &status).context("Failed to serialize group status")?;
    writeln!(writer).context("Failed to write status line")?;
    writer.flush().context("Failed to flush results")?;
    Ok(())
}
