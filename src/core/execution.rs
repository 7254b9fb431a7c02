//! # Test Execution Engine Module / 测试执行引擎模块
//!
//! This module provides the entry points for executing test groups and
//! single test cases. A fresh scheduler with the standard handler pipeline
//! drives each test case; `run_group` plans the group, drives every planned
//! case in declaration order and aggregates the results.
//!
//! 此模块提供执行测试组和单个测试用例的入口。
//! 每个测试用例都由一个带有标准处理器管道的全新调度器驱动；
//! `run_group` 规划测试组，按声明顺序驱动每个计划用例并汇总结果。

use chrono::Utc;

use crate::{
    core::{
        config::HarnessConfig,
        context::ExecutionContext,
        error::HarnessError,
        exclusion::ExcludedIndices,
        group::{ResolvedCase, TestGroup},
        handlers,
        models::{CaseResult, GroupReport},
        planner::plan_execution,
        scheduler::Scheduler,
    },
    infra::{log::LogSink, t},
};

/// Runs every test case of `group` that survives the configured exclusions.
///
/// The exclusion list is parsed before anything executes, so a malformed
/// directive aborts the run with no results.
///
/// 运行 `group` 中未被配置排除的所有测试用例。
/// 排除列表会在任何执行之前解析，因此格式错误的指令会在没有任何结果的情况下中止运行。
///
/// # Errors
/// - `MalformedExclusion` for a bad exclusion directive
/// - `Configuration` for a malformed test case descriptor
/// - `Pipeline` if a handler fails while driving a test case
pub fn run_group(
    group: &TestGroup,
    config: &HarnessConfig,
    log: &dyn LogSink,
) -> Result<GroupReport, HarnessError> {
    let started_at = Utc::now();
    let exclusions = config.exclusions()?;
    for trailing in exclusions.ignored_trailing() {
        log.warn(&t!("run.trailing_ignored", trailing = trailing));
    }

    let plan = plan_execution(group, &exclusions)?;
    for name in &plan.unmatched_exclusions {
        log.warn(&t!("run.unknown_exclusion", name = name, group = group.name()));
    }
    if !plan.excluded_cases.is_empty() {
        log.info(&t!(
            "run.cases_excluded",
            count = plan.excluded_cases.len(),
            names = plan.excluded_cases.join(", ")
        ));
    }
    log.info(&t!(
        "run.group_started",
        group = group.name(),
        count = plan.cases_to_run.len()
    ));

    let mut results = Vec::new();
    for planned in &plan.cases_to_run {
        let case_results = run_test_case(
            group,
            &planned.case,
            planned.excluded_rows.as_ref(),
            config.trim_traces,
            log,
        )?;
        results.extend(case_results);
    }

    let report = GroupReport::new(group.name(), started_at, plan.excluded_cases, results);
    log.info(&t!("run.group_finished", group = group.name(), status = report.status()));
    Ok(report)
}

/// Drives one resolved test case through the standard handler pipeline.
///
/// 通过标准处理器管道驱动一个已解析的测试用例。
///
/// # Arguments
/// * `excluded` - Row exclusions for this test case; excluded rows are recorded as not applicable
/// * `trim_traces` - Whether assertion traces are trimmed to the group's own code
///
/// # Returns
/// One `CaseResult` per row, or a single one for a test case without a data binding.
pub fn run_test_case(
    group: &TestGroup,
    case: &ResolvedCase,
    excluded: Option<&ExcludedIndices>,
    trim_traces: bool,
    log: &dyn LogSink,
) -> Result<Vec<CaseResult>, HarnessError> {
    log.info(&t!("run.running_case", case = &case.name));

    let mut ctx = ExecutionContext::new(group, case, excluded, log);
    ctx.trim_traces = trim_traces;
    let mut scheduler = Scheduler::new(handlers::standard_pipeline());
    scheduler.drive(&mut ctx)?;

    Ok(ctx.into_results())
}
