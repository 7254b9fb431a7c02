//! Invocation handlers and the isolating call boundary.
//!
//! 调用处理器以及隔离调用边界。

use std::panic::{self, AssertUnwindSafe};

use crate::core::context::{ExecutionContext, Phase};
use crate::core::error::HarnessError;
use crate::core::fault::{panic_message, Fault, Frame};
use crate::core::scheduler::{Handler, Ownership, Readiness, Transition};
use crate::core::values::Value;

/// Runs `call`, turning a panic into a `Panic` fault so that nothing raised
/// by test code unwinds past the scheduler.
///
/// 运行 `call`，将 panic 转换为 `Panic` 故障，使测试代码抛出的任何内容
/// 都不会越过调度器展开。
pub(crate) fn isolate<T>(call: impl FnOnce() -> Result<T, Fault>) -> Result<T, Fault> {
    match panic::catch_unwind(AssertUnwindSafe(call)) {
        Ok(outcome) => outcome,
        Err(payload) => Err(Fault::panic(panic_message(payload))),
    }
}

fn call_target(ctx: &mut ExecutionContext<'_>) {
    let target = &ctx.case().target;
    let outcome = target
        .check_arguments(&ctx.arguments)
        .and_then(|()| isolate(|| target.call(&ctx.arguments)));
    store_outcome(ctx, outcome);
}

fn store_outcome(ctx: &mut ExecutionContext<'_>, outcome: Result<Value, Fault>) {
    match outcome {
        Ok(value) => ctx.returned = Some(value),
        Err(fault) => {
            ctx.fault = Some(fault.with_frame(Frame::caller().named("case_matrix::invoke")))
        }
    }
}

/// Calls the target with the current arguments.
/// 使用当前参数调用目标。
#[derive(Debug)]
pub struct InvocationHandler;

impl Handler for InvocationHandler {
    fn name(&self) -> &'static str {
        "invoke"
    }

    fn phases(&self) -> &'static [Phase] {
        &[Phase::CallingTestcase]
    }

    fn readiness(&mut self, ctx: &ExecutionContext<'_>) -> Readiness {
        Readiness::when(ctx.overriding_result.is_none())
    }

    fn act(&mut self, ctx: &mut ExecutionContext<'_>) -> Result<Transition, HarnessError> {
        call_target(ctx);
        Ok(Transition::Advance)
    }
}

/// Packs a variadic tail into one array, then calls the target.
/// 将可变参数尾部打包为一个数组，然后调用目标。
#[derive(Debug)]
pub struct VariadicInvocationHandler;

impl Handler for VariadicInvocationHandler {
    fn name(&self) -> &'static str {
        "variadic-invoke"
    }

    fn phases(&self) -> &'static [Phase] {
        &[Phase::CallingTestcase]
    }

    fn priority(&self, _phase: Phase) -> i32 {
        10
    }

    fn readiness(&mut self, ctx: &ExecutionContext<'_>) -> Readiness {
        Readiness::when(
            ctx.overriding_result.is_none() && ctx.case().target.variadic_element().is_some(),
        )
    }

    fn act(&mut self, ctx: &mut ExecutionContext<'_>) -> Result<Transition, HarnessError> {
        match ctx.case().target.adapt_variadic(&ctx.arguments) {
            Ok(adapted) => {
                ctx.arguments = adapted;
                call_target(ctx);
            }
            Err(fault) => store_outcome(ctx, Err(fault)),
        }
        Ok(Transition::Advance)
    }
}

/// Releases the current arguments after every invocation, including skipped
/// and failed ones.
///
/// 在每次调用后释放当前参数，包括被跳过和失败的调用。
#[derive(Debug)]
pub struct ArgumentReleaseHandler;

impl Handler for ArgumentReleaseHandler {
    fn name(&self) -> &'static str {
        "argument-release"
    }

    fn phases(&self) -> &'static [Phase] {
        &[Phase::AfterInvocation]
    }

    fn ownership(&self, _phase: Phase) -> Ownership {
        Ownership::Many
    }

    fn readiness(&mut self, _ctx: &ExecutionContext<'_>) -> Readiness {
        Readiness::Ready
    }

    fn act(&mut self, ctx: &mut ExecutionContext<'_>) -> Result<Transition, HarnessError> {
        ctx.release_arguments();
        Ok(Transition::Advance)
    }
}
