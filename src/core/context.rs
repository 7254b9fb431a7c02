//! # Execution Context Module / 执行上下文模块
//!
//! The `ExecutionContext` is the single mutable record threaded through one
//! test case drive. It is created by `run_test_case`, handed to every handler
//! by `&mut`, and consumed once the test case's results are final.
//!
//! `ExecutionContext` 是贯穿单个测试用例驱动过程的唯一可变记录。
//! 它由 `run_test_case` 创建，以 `&mut` 传递给每个处理器，
//! 并在测试用例结果确定后被消费。

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::exclusion::ExcludedIndices;
use crate::core::fault::Fault;
use crate::core::group::{ResolvedCase, TestGroup};
use crate::core::models::{CaseResult, TestResult};
use crate::core::values::Value;
use crate::infra::log::LogSink;

/// The life-cycle phases of a test case, in traversal order.
/// 测试用例的生命周期阶段，按遍历顺序排列。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Phase {
    SettingWhatToCall,
    BeforeTestcase,
    CallingTestcase,
    AfterInvocation,
    ProcessingResult,
    AfterTestcase,
}

impl Phase {
    pub const ALL: [Phase; 6] = [
        Phase::SettingWhatToCall,
        Phase::BeforeTestcase,
        Phase::CallingTestcase,
        Phase::AfterInvocation,
        Phase::ProcessingResult,
        Phase::AfterTestcase,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// The following phase, or `None` after the terminal `AfterTestcase`.
    pub fn next(self) -> Option<Phase> {
        Phase::ALL.get(self.index() + 1).copied()
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::SettingWhatToCall => "SETTING_WHAT_TO_CALL",
            Phase::BeforeTestcase => "BEFORE_TESTCASE",
            Phase::CallingTestcase => "CALLING_TESTCASE",
            Phase::AfterInvocation => "AFTER_INVOCATION",
            Phase::ProcessingResult => "PROCESSING_RESULT",
            Phase::AfterTestcase => "AFTER_TESTCASE",
        };
        f.write_str(name)
    }
}

/// Mutable state of one test case drive.
/// 单个测试用例驱动过程的可变状态。
pub struct ExecutionContext<'a> {
    /// The phase currently being visited.
    pub phase: Phase,
    /// 0-based index of the current row, `None` until the first row is set.
    pub row_index: Option<u64>,
    /// `false` when the current row was excluded by index.
    pub row_applicable: bool,
    /// Arguments for the current invocation. Released after every invocation.
    pub arguments: Vec<Value>,
    /// Fault captured from the current invocation.
    pub fault: Option<Fault>,
    /// Value returned by the current invocation.
    pub returned: Option<Value>,
    /// A result that short-circuits invocation and classification.
    pub overriding_result: Option<TestResult>,
    /// The classified result of the current row, pending recording.
    pub result: Option<TestResult>,
    /// Whether assertion traces are trimmed to the group's own code.
    pub trim_traces: bool,
    group: &'a TestGroup,
    case: &'a ResolvedCase,
    excluded: Option<&'a ExcludedIndices>,
    log: &'a dyn LogSink,
    results: Vec<CaseResult>,
}

impl<'a> ExecutionContext<'a> {
    pub fn new(
        group: &'a TestGroup,
        case: &'a ResolvedCase,
        excluded: Option<&'a ExcludedIndices>,
        log: &'a dyn LogSink,
    ) -> Self {
        Self {
            phase: Phase::SettingWhatToCall,
            row_index: None,
            row_applicable: true,
            arguments: Vec::new(),
            fault: None,
            returned: None,
            overriding_result: None,
            result: None,
            trim_traces: true,
            group,
            case,
            excluded,
            log,
            results: Vec::new(),
        }
    }

    pub fn group(&self) -> &'a TestGroup {
        self.group
    }

    pub fn case(&self) -> &'a ResolvedCase {
        self.case
    }

    /// Row exclusions for this test case, if any.
    pub fn excluded(&self) -> Option<&'a ExcludedIndices> {
        self.excluded
    }

    pub fn log(&self) -> &'a dyn LogSink {
        self.log
    }

    /// Starts a new row, discarding everything left over from the previous one.
    /// 开始新的数据行，丢弃上一行遗留的所有状态。
    pub fn begin_row(&mut self, index: u64, arguments: Vec<Value>, applicable: bool) {
        self.clear_scratch();
        self.overriding_result = None;
        self.result = None;
        self.row_index = Some(index);
        self.row_applicable = applicable;
        self.arguments = arguments;
    }

    /// Clears the per-invocation scratch state: captured fault and return value.
    pub fn clear_scratch(&mut self) {
        self.fault = None;
        self.returned = None;
    }

    /// Drops the current arguments.
    pub fn release_arguments(&mut self) -> usize {
        let released = std::mem::take(&mut self.arguments);
        released.len()
    }

    /// Moves the pending result into the result stream.
    /// Returns `false` if no result was pending.
    ///
    /// 将待处理的结果移入结果流。如果没有待处理结果则返回 `false`。
    pub fn record_result(&mut self) -> bool {
        let Some(result) = self.result.take() else {
            return false;
        };
        let row = if self.case.binding.is_data_bound() {
            self.row_index
        } else {
            None
        };
        self.results.push(CaseResult {
            case: self.case.name.clone(),
            row,
            result,
        });
        true
    }

    /// Results recorded so far.
    pub fn results(&self) -> &[CaseResult] {
        &self.results
    }

    pub fn into_results(self) -> Vec<CaseResult> {
        self.results
    }
}

impl fmt::Debug for ExecutionContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutionContext")
            .field("case", &self.case.name)
            .field("phase", &self.phase)
            .field("row_index", &self.row_index)
            .field("row_applicable", &self.row_applicable)
            .field("has_fault", &self.fault.is_some())
            .field("overriding_result", &self.overriding_result)
            .finish_non_exhaustive()
    }
}
