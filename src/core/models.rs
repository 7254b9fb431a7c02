//! # Data Models Module / 数据模型模块
//!
//! This module defines the result side of the harness: the per-row
//! `TestResult`, the `CaseResult` stream entries, the per-group `Tally`
//! and the `GroupReport` returned by `run_group`.
//!
//! 此模块定义了框架的结果部分：每行的 `TestResult`、结果流条目 `CaseResult`、
//! 每个测试组的 `Tally`，以及 `run_group` 返回的 `GroupReport`。

use crate::infra::t;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// The classified outcome of one invocation.
/// Exactly one is produced per (test case, row), or per non-data-bound test case.
///
/// 单次调用的分类结果。
/// 每个（测试用例，数据行）对，或每个非数据绑定的测试用例，恰好产生一个。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "message", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TestResult {
    /// The invocation passed.
    /// 调用通过。
    Ok(String),
    /// The invocation failed.
    /// 调用失败。
    Failure(String),
    /// The row or test case does not apply. Not a failure.
    /// 数据行或测试用例不适用。不算失败。
    NotApplicable(Option<String>),
}

impl TestResult {
    pub fn ok(message: impl Into<String>) -> Self {
        TestResult::Ok(message.into())
    }

    pub fn failure(message: impl Into<String>) -> Self {
        TestResult::Failure(message.into())
    }

    pub fn not_applicable(reason: Option<String>) -> Self {
        TestResult::NotApplicable(reason)
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, TestResult::Ok(_))
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, TestResult::Failure(_))
    }

    pub fn is_not_applicable(&self) -> bool {
        matches!(self, TestResult::NotApplicable(_))
    }

    /// The message or reason, empty if there is none.
    pub fn message(&self) -> &str {
        match self {
            TestResult::Ok(message) | TestResult::Failure(message) => message,
            TestResult::NotApplicable(reason) => reason.as_deref().unwrap_or(""),
        }
    }

    /// The contract label: `OK`, `FAILURE` or `NOT_APPLICABLE`.
    pub fn label(&self) -> &'static str {
        match self {
            TestResult::Ok(_) => "OK",
            TestResult::Failure(_) => "FAILURE",
            TestResult::NotApplicable(_) => "NOT_APPLICABLE",
        }
    }

    /// Returns the localized status string for display.
    /// 返回用于显示的本地化状态字符串。
    pub fn get_status_str(&self, locale: &str) -> String {
        match self {
            TestResult::Ok(_) => t!("report.status_ok", locale = locale).to_string(),
            TestResult::Failure(_) => t!("report.status_failure", locale = locale).to_string(),
            TestResult::NotApplicable(_) => {
                t!("report.status_not_applicable", locale = locale).to_string()
            }
        }
    }
}

impl fmt::Display for TestResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.message() {
            "" => f.write_str(self.label()),
            message => write!(f, "{}: {}", self.label(), message),
        }
    }
}

/// One entry of the result stream.
/// 结果流中的一个条目。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseResult {
    pub case: String,
    /// Row index, `None` for test cases without a data binding and for
    /// data-creation failures.
    /// 数据行索引；对于没有数据绑定的测试用例和数据创建失败，为 `None`。
    pub row: Option<u64>,
    pub result: TestResult,
}

#[derive(Debug, Default, Clone, Copy)]
struct CaseOutcome {
    ok: bool,
    not_applicable: bool,
    failed: bool,
}

/// Per-test-case contribution counts for a group.
///
/// A test case counts as failed if any of its rows failed. Otherwise it
/// counts as passed if at least one row was OK, and as not applicable if at
/// least one row was not applicable. A case may therefore count both as
/// passed and as not applicable.
///
/// 测试组中按测试用例统计的贡献计数。
/// 只要有任一行失败，测试用例即计为失败。否则，至少一行 OK 时计为通过，
/// 至少一行不适用时计为不适用。因此一个用例可能同时计为通过和不适用。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    pub test_cases: usize,
    pub passed: usize,
    pub not_applicable: usize,
    pub failed: usize,
}

impl Tally {
    pub fn from_results(results: &[CaseResult]) -> Self {
        let mut cases: BTreeMap<&str, CaseOutcome> = BTreeMap::new();
        for entry in results {
            let outcome = cases.entry(entry.case.as_str()).or_default();
            match entry.result {
                TestResult::Ok(_) => outcome.ok = true,
                TestResult::Failure(_) => outcome.failed = true,
                TestResult::NotApplicable(_) => outcome.not_applicable = true,
            }
        }

        let mut tally = Tally::default();
        for outcome in cases.values() {
            tally.record_case(outcome.ok, outcome.not_applicable, outcome.failed);
        }
        tally
    }

    fn record_case(&mut self, ok: bool, not_applicable: bool, failed: bool) {
        self.test_cases += 1;
        if failed {
            self.failed += 1;
            return;
        }
        if ok {
            self.passed += 1;
        }
        if not_applicable {
            self.not_applicable += 1;
        }
    }

    pub fn is_passed(&self) -> bool {
        self.failed == 0
    }

    /// The aggregated status string. Never localized.
    ///
    /// 汇总的状态字符串。从不本地化。
    pub fn status(&self) -> String {
        if self.test_cases == 0 {
            return "Passed. No test cases found (or all test cases excluded.)".to_string();
        }
        if self.failed == 0 && self.not_applicable == 0 && self.passed == self.test_cases {
            return format!("Passed. test cases: {}; all passed", self.test_cases);
        }
        format!(
            "{}. test cases: {}; passed: {}; not applicable: {}; failed: {}",
            if self.is_passed() { "Passed" } else { "Failed" },
            self.test_cases,
            self.passed,
            self.not_applicable,
            self.failed
        )
    }
}

/// The outcome of running one test group.
/// 运行一个测试组的结果。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupReport {
    pub group: String,
    pub started_at: DateTime<Utc>,
    /// Test cases excluded wholesale, in declaration order.
    /// 被整体排除的测试用例，按声明顺序排列。
    pub excluded_cases: Vec<String>,
    pub results: Vec<CaseResult>,
    pub tally: Tally,
}

impl GroupReport {
    pub fn new(
        group: impl Into<String>,
        started_at: DateTime<Utc>,
        excluded_cases: Vec<String>,
        results: Vec<CaseResult>,
    ) -> Self {
        let tally = Tally::from_results(&results);
        Self {
            group: group.into(),
            started_at,
            excluded_cases,
            results,
            tally,
        }
    }

    pub fn status(&self) -> String {
        self.tally.status()
    }

    pub fn is_passed(&self) -> bool {
        self.tally.is_passed()
    }
}
