//! # Console Reporting Module / 控制台报告模块
//!
//! This module prints a finished group run to the console: one line per
//! result with color-coded status, followed by the group status line.
//!
//! 此模块将已完成的测试组运行打印到控制台：每个结果一行并按状态着色，
//! 最后是测试组状态行。

use colored::*;

use crate::core::models::{CaseResult, GroupReport, TestResult};
use crate::infra::t;

/// Builds the summary printed by `print_summary`.
///
/// # Output Format / 输出格式
/// ```text
/// --- Test Summary: parsing (2026-10-17 09:30:00 UTC) ---
///   - OK               | parse[0]
///   - Not Applicable   | parse[1]
///   - Failure          | render                                   expected 1 to equal 2
///   - Excluded         | slow_case
/// Passed. test cases: 2; passed: 1; not applicable: 1; failed: 1
/// ```
pub fn format_summary(report: &GroupReport, locale: &str) -> String {
    let mut lines = Vec::with_capacity(report.results.len() + report.excluded_cases.len() + 2);
    lines.push(
        t!(
            "report.summary_banner",
            locale = locale,
            group = &report.group,
            started = report.started_at.format("%Y-%m-%d %H:%M:%S UTC")
        )
        .bold()
        .to_string(),
    );

    for entry in &report.results {
        let status_str = entry.result.get_status_str(locale);
        let status_colored = match entry.result {
            TestResult::Ok(_) => status_str.green(),
            TestResult::Failure(_) => status_str.red(),
            TestResult::NotApplicable(_) => status_str.yellow(),
        };
        let detail = entry.result.message().lines().next().unwrap_or("");
        lines.push(format!(
            "  - {:<18} | {:<40} {}",
            status_colored,
            row_label(entry),
            detail.dimmed()
        ));
    }

    for name in &report.excluded_cases {
        lines.push(format!(
            "  - {:<18} | {}",
            t!("report.status_excluded", locale = locale).dimmed(),
            name
        ));
    }

    let status = report.status();
    lines.push(if report.is_passed() {
        status.green().bold().to_string()
    } else {
        status.red().bold().to_string()
    });
    lines.join("\n")
}

/// Prints a formatted summary of a group run to the console.
///
/// 在控制台打印测试组运行的格式化摘要。
///
/// # Arguments / 参数
/// * `report` - The finished group run
///              已完成的测试组运行
/// * `locale` - The language locale to use for labels
///              用于标签的语言区域设置
pub fn print_summary(report: &GroupReport, locale: &str) {
    println!("\n{}", format_summary(report, locale));
}

fn row_label(entry: &CaseResult) -> String {
    match entry.row {
        Some(row) => format!("{}[{}]", entry.case, row),
        None => entry.case.clone(),
    }
}
