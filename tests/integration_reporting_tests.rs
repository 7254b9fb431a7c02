//! # Reporting Integration Tests / 报告集成测试
//!
//! Checks the console and JSON-lines views of a finished group run.
//!
//! 检查已完成测试组运行的控制台视图和 JSON 行视图。

mod common;

use case_matrix::core::models::GroupReport;
use case_matrix::core::values::{ParamType, Values};
use case_matrix::infra::log::MemoryLog;
use case_matrix::reporting::{format_summary, write_results};
use case_matrix::{run_group, HarnessConfig, TestCaseDescriptor, TestGroup};

fn sample_report() -> GroupReport {
    let calls = common::new_calls();
    let group = TestGroup::builder("reporting")
        .case(
            common::recording_target("parse", vec![ParamType::Int], &calls),
            TestCaseDescriptor::marked().column(Values::column([1, 2])),
        )
        .case(
            common::recording_target("slow_case", vec![], &calls),
            TestCaseDescriptor::marked(),
        )
        .build();
    let config = HarnessConfig {
        exclude: vec!["parse[1]; slow_case".to_string()],
        ..HarnessConfig::default()
    };
    run_group(&group, &config, &MemoryLog::new()).unwrap()
}

#[cfg(test)]
mod console_tests {
    use super::*;

    #[test]
    fn test_summary_lists_rows_exclusions_and_status() {
        let report = sample_report();
        let summary = format_summary(&report, "en");

        assert!(summary.contains("parse[0]"));
        assert!(summary.contains("parse[1]"));
        assert!(summary.contains("Not Applicable"));
        assert!(summary.contains("slow_case"));
        assert!(summary.contains(&report.status()));
    }

    #[test]
    fn test_summary_uses_requested_locale() {
        let report = sample_report();
        let summary = format_summary(&report, "zh-CN");
        assert!(summary.contains("不适用"));
        assert!(summary.contains("已排除"));
    }
}

#[cfg(test)]
mod json_tests {
    use super::*;

    #[test]
    fn test_one_line_per_result_plus_status() {
        let report = sample_report();
        let mut buffer = Vec::new();

        write_results(&report, &mut buffer).unwrap();

        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<serde_json::Value> = text
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(lines.len(), report.results.len() + 1);

        assert_eq!(lines[0]["case"], "parse");
        assert_eq!(lines[0]["row"], 0);
        assert_eq!(lines[0]["kind"], "OK");
        assert_eq!(lines[1]["kind"], "NOT_APPLICABLE");

        let status = lines.last().unwrap();
        assert_eq!(status["group"], "reporting");
        assert_eq!(status["passed"], true);
        assert_eq!(status["status"], report.status());
    }
}
