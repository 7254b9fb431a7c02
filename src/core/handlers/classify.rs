//! # Result Classifiers / 结果分类器
//!
//! Three handlers compete for `PROCESSING_RESULT`, highest priority first:
//!
//! | Handler                       | Priority | Ready when                                   |
//! |-------------------------------|----------|----------------------------------------------|
//! | `OverridingResultHandler`     | 100      | an overriding result is set                  |
//! | `ExpectedExceptionClassifier` | 20       | the case expects faults, no framework fault  |
//! | `DefaultClassifier`           | 10       | no result yet                                |
//!
//! 三个处理器竞争 `PROCESSING_RESULT` 阶段，优先级高者优先。

use crate::core::context::{ExecutionContext, Phase};
use crate::core::error::HarnessError;
use crate::core::fault::{render_trace, Fault, FaultKind};
use crate::core::models::TestResult;
use crate::core::scheduler::{Handler, Readiness, Transition};
use crate::core::values::Value;
use crate::infra::t;

/// Promotes an overriding result (a failed before hook, a failed data source)
/// to the row's result.
#[derive(Debug)]
pub struct OverridingResultHandler;

impl Handler for OverridingResultHandler {
    fn name(&self) -> &'static str {
        "overriding-result"
    }

    fn phases(&self) -> &'static [Phase] {
        &[Phase::ProcessingResult]
    }

    fn priority(&self, _phase: Phase) -> i32 {
        100
    }

    fn readiness(&mut self, ctx: &ExecutionContext<'_>) -> Readiness {
        Readiness::when(ctx.overriding_result.is_some() && ctx.result.is_none())
    }

    fn act(&mut self, ctx: &mut ExecutionContext<'_>) -> Result<Transition, HarnessError> {
        ctx.result = ctx.overriding_result.clone();
        ctx.clear_scratch();
        Ok(Transition::Advance)
    }
}

/// Classifies test cases that declare expected fault types.
///
/// 对声明了预期故障类型的测试用例进行分类。
#[derive(Debug)]
pub struct ExpectedExceptionClassifier;

impl ExpectedExceptionClassifier {
    fn classify(ctx: &ExecutionContext<'_>) -> TestResult {
        let expected = &ctx.case().expected;
        let Some(fault) = &ctx.fault else {
            return TestResult::failure("expected exception not thrown");
        };

        let actual = fault.fault_type();
        if expected.iter().any(|e| actual.is_assignable_to(e)) {
            return TestResult::ok(format!("expected exception thrown: {}", actual));
        }

        let names: Vec<String> = expected.iter().map(ToString::to_string).collect();
        ctx.log().error(&t!(
            "run.wrong_exception",
            case = &ctx.case().name,
            expected = names.join(", "),
            actual = fault,
            trace = render_trace(fault.trace())
        ));
        TestResult::failure(format!(
            "wrong type of exception: expected [{}], got {}",
            names.join(", "),
            fault
        ))
    }
}

impl Handler for ExpectedExceptionClassifier {
    fn name(&self) -> &'static str {
        "expected-exception"
    }

    fn phases(&self) -> &'static [Phase] {
        &[Phase::ProcessingResult]
    }

    fn priority(&self, _phase: Phase) -> i32 {
        20
    }

    fn readiness(&mut self, ctx: &ExecutionContext<'_>) -> Readiness {
        Readiness::when(
            ctx.overriding_result.is_none()
                && ctx.result.is_none()
                && !ctx.case().expected.is_empty()
                && !ctx.fault.as_ref().is_some_and(Fault::is_framework_fault),
        )
    }

    fn act(&mut self, ctx: &mut ExecutionContext<'_>) -> Result<Transition, HarnessError> {
        let result = Self::classify(ctx);
        ctx.result = Some(result);
        ctx.clear_scratch();
        Ok(Transition::Advance)
    }
}

/// The fallback classifier for every invocation outcome.
///
/// 所有调用结果的兜底分类器。
#[derive(Debug)]
pub struct DefaultClassifier;

impl DefaultClassifier {
    fn classify(ctx: &ExecutionContext<'_>) -> TestResult {
        let Some(fault) = &ctx.fault else {
            return match &ctx.returned {
                None | Some(Value::Unit) => TestResult::ok(""),
                Some(_) => TestResult::failure("testcase returned unrecognized value, expected void"),
            };
        };

        match fault.kind() {
            FaultKind::NotApplicable { reason } => TestResult::not_applicable(reason.clone()),
            FaultKind::ArgumentMismatch => TestResult::failure(fault.message()),
            FaultKind::Misconfiguration => {
                ctx.log().error(&t!(
                    "run.misconfigured",
                    case = &ctx.case().name,
                    error = fault.message()
                ));
                TestResult::failure(fault.message())
            }
            FaultKind::Assertion => {
                let trace = if ctx.trim_traces {
                    let group = ctx.group();
                    fault.trimmed_trace(|frame| group.is_own_code(frame))
                } else {
                    fault.trace()
                };
                if trace.is_empty() {
                    TestResult::failure(fault.message())
                } else {
                    TestResult::failure(format!("{}\n{}", fault.message(), render_trace(trace)))
                }
            }
            FaultKind::Raised(_) | FaultKind::Panic => {
                ctx.log().error(&t!(
                    "run.unexpected_fault",
                    case = &ctx.case().name,
                    error = fault,
                    trace = render_trace(fault.trace())
                ));
                TestResult::failure(format!("unexpected exception: {}", fault))
            }
        }
    }
}

impl Handler for DefaultClassifier {
    fn name(&self) -> &'static str {
        "default-classifier"
    }

    fn phases(&self) -> &'static [Phase] {
        &[Phase::ProcessingResult]
    }

    fn priority(&self, _phase: Phase) -> i32 {
        10
    }

    fn readiness(&mut self, ctx: &ExecutionContext<'_>) -> Readiness {
        Readiness::when(ctx.overriding_result.is_none() && ctx.result.is_none())
    }

    fn act(&mut self, ctx: &mut ExecutionContext<'_>) -> Result<Transition, HarnessError> {
        let result = Self::classify(ctx);
        ctx.result = Some(result);
        ctx.clear_scratch();
        Ok(Transition::Advance)
    }
}
