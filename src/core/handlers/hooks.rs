//! Before and after hooks around every applicable invocation.
//!
//! 每次适用调用前后的钩子。

use crate::core::context::{ExecutionContext, Phase};
use crate::core::error::HarnessError;
use crate::core::handlers::invoke::isolate;
use crate::core::models::TestResult;
use crate::core::scheduler::{Handler, Ownership, Readiness, Transition};
use crate::infra::t;

/// Runs the test case's before hook. A failing hook sets an overriding
/// FAILURE, which skips the invocation and its classification.
///
/// 运行测试用例的前置钩子。钩子失败会设置一个覆盖性的 FAILURE，
/// 从而跳过调用及其分类。
#[derive(Debug)]
pub struct BeforeHookHandler;

impl Handler for BeforeHookHandler {
    fn name(&self) -> &'static str {
        "before-hook"
    }

    fn phases(&self) -> &'static [Phase] {
        &[Phase::BeforeTestcase]
    }

    fn ownership(&self, _phase: Phase) -> Ownership {
        Ownership::Many
    }

    fn readiness(&mut self, ctx: &ExecutionContext<'_>) -> Readiness {
        Readiness::when(
            ctx.case().before.is_some()
                && ctx.overriding_result.is_none()
                && ctx.row_applicable,
        )
    }

    fn act(&mut self, ctx: &mut ExecutionContext<'_>) -> Result<Transition, HarnessError> {
        let case = ctx.case();
        let Some(hook) = &case.before else {
            return Ok(Transition::Advance);
        };
        if let Err(fault) = isolate(|| hook.run()) {
            ctx.log().error(&t!(
                "run.before_failed",
                hook = &hook.name,
                case = &case.name,
                error = fault
            ));
            ctx.overriding_result = Some(TestResult::failure(format!(
                "before method {} failed: {}",
                hook.name, fault
            )));
        }
        Ok(Transition::Advance)
    }
}

/// Runs the test case's after hook. A failing hook turns a pending non-failure
/// result into a FAILURE; an existing FAILURE is kept.
///
/// 运行测试用例的后置钩子。钩子失败会将待处理的非失败结果变为 FAILURE；
/// 已有的 FAILURE 保持不变。
#[derive(Debug)]
pub struct AfterHookHandler;

impl Handler for AfterHookHandler {
    fn name(&self) -> &'static str {
        "after-hook"
    }

    fn phases(&self) -> &'static [Phase] {
        &[Phase::AfterTestcase]
    }

    fn ownership(&self, _phase: Phase) -> Ownership {
        Ownership::Many
    }

    fn priority(&self, _phase: Phase) -> i32 {
        10
    }

    fn readiness(&mut self, ctx: &ExecutionContext<'_>) -> Readiness {
        Readiness::when(
            ctx.case().after.is_some()
                && ctx.overriding_result.is_none()
                && ctx.row_applicable,
        )
    }

    fn act(&mut self, ctx: &mut ExecutionContext<'_>) -> Result<Transition, HarnessError> {
        let case = ctx.case();
        let Some(hook) = &case.after else {
            return Ok(Transition::Advance);
        };
        if let Err(fault) = isolate(|| hook.run()) {
            ctx.log().error(&t!(
                "run.after_failed",
                hook = &hook.name,
                case = &case.name,
                error = fault
            ));
            if !ctx.result.as_ref().is_some_and(TestResult::is_failure) {
                ctx.result = Some(TestResult::failure(format!(
                    "after method {} failed: {}",
                    hook.name, fault
                )));
            }
        }
        Ok(Transition::Advance)
    }
}
