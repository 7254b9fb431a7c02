//! # Test Execution Planner Module / 测试执行计划模块
//!
//! This module turns a test group and an exclusion list into the ordered
//! list of test cases to drive. Discovery runs once here; wholesale
//! exclusions are applied before any test case executes.
//!
//! 此模块将测试组和排除列表转换为待驱动的有序测试用例列表。
//! 发现过程在此处运行一次；整体排除会在任何测试用例执行之前应用。

use crate::core::error::HarnessError;
use crate::core::exclusion::{ExcludedIndices, ExclusionList};
use crate::core::group::{ResolvedCase, TestGroup};

/// A test case scheduled to run, with its row exclusions if any.
/// 计划运行的测试用例，以及其数据行排除（如果有）。
#[derive(Debug)]
pub struct PlannedCase {
    pub case: ResolvedCase,
    pub excluded_rows: Option<ExcludedIndices>,
}

/// Represents a complete execution plan for a test group.
/// 表示测试组的完整执行计划。
#[derive(Debug)]
pub struct ExecutionPlan {
    /// The test cases to drive, in declaration order.
    /// 要驱动的测试用例，按声明顺序排列。
    pub cases_to_run: Vec<PlannedCase>,
    /// Names of test cases excluded wholesale.
    /// 被整体排除的测试用例名称。
    pub excluded_cases: Vec<String>,
    /// Exclusion entries that name no test case of this group.
    /// 未匹配本测试组任何测试用例的排除条目。
    pub unmatched_exclusions: Vec<String>,
}

/// Creates an execution plan for the given group.
///
/// 为给定的测试组创建执行计划。
///
/// # Errors
/// Returns a configuration error if any test case descriptor is malformed.
pub fn plan_execution(
    group: &TestGroup,
    exclusions: &ExclusionList,
) -> Result<ExecutionPlan, HarnessError> {
    let cases = group.discover()?;

    let unmatched_exclusions = exclusions
        .names()
        .filter(|name| !cases.iter().any(|case| case.name == *name))
        .map(str::to_string)
        .collect();

    let (excluded, kept): (Vec<_>, Vec<_>) = cases
        .into_iter()
        .partition(|case| exclusions.is_case_excluded(&case.name));

    let cases_to_run = kept
        .into_iter()
        .map(|case| {
            let excluded_rows = exclusions.get(&case.name).cloned();
            PlannedCase {
                case,
                excluded_rows,
            }
        })
        .collect();

    Ok(ExecutionPlan {
        cases_to_run,
        excluded_cases: excluded.into_iter().map(|case| case.name).collect(),
        unmatched_exclusions,
    })
}
