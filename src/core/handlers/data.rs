//! Handlers that decide what to call: one row at a time for data-bound test
//! cases, exactly once for the others.
//!
//! 决定调用内容的处理器：数据绑定的测试用例每次一行，其他用例恰好一次。

use std::iter::Peekable;

use crate::core::context::{ExecutionContext, Phase};
use crate::core::error::HarnessError;
use crate::core::fault::Fault;
use crate::core::handlers::invoke::isolate;
use crate::core::models::TestResult;
use crate::core::scheduler::{Handler, Ownership, Readiness, Transition};
use crate::core::values::RowIter;
use crate::infra::t;

/// Pulls rows from the test case's data binding and loops the drive back to
/// `SETTING_WHAT_TO_CALL` while rows remain.
///
/// The rows are built lazily on the first readiness check. If building them
/// fails, the failure is latched: it is reported once as the test case's
/// result and never attempted again.
///
/// 从测试用例的数据绑定中拉取数据行，并在仍有数据行时将驱动循环回
/// `SETTING_WHAT_TO_CALL`。数据行在第一次就绪检查时惰性构建。
/// 如果构建失败，该失败会被锁存：只作为测试用例结果报告一次，且不再重试。
#[derive(Debug, Default)]
pub struct DataBindingHandler {
    rows: Option<Peekable<RowIter>>,
    failure: Option<String>,
    failure_reported: bool,
}

impl DataBindingHandler {
    pub fn new() -> Self {
        Self::default()
    }

    fn prepare(&mut self, ctx: &ExecutionContext<'_>) {
        if self.rows.is_some() || self.failure.is_some() {
            return;
        }
        let case = ctx.case();
        match isolate(|| case.binding.build()) {
            Ok(values) => {
                let values = match ctx.excluded() {
                    Some(indices) => values.with_not_applicable(indices.clone()),
                    None => values,
                };
                ctx.log().info(&t!(
                    "run.rows_prepared",
                    case = &case.name,
                    rows = values.len()
                ));
                self.rows = Some(values.iter().peekable());
            }
            Err(fault) => {
                ctx.log().error(&t!(
                    "run.data_creation_failed",
                    case = &case.name,
                    error = fault
                ));
                self.failure = Some(format!("data creation failed: {}", fault));
            }
        }
    }

    fn has_more_rows(&mut self) -> bool {
        self.rows
            .as_mut()
            .is_some_and(|rows| rows.peek().is_some())
    }
}

impl Handler for DataBindingHandler {
    fn name(&self) -> &'static str {
        "data-binding"
    }

    fn phases(&self) -> &'static [Phase] {
        &[Phase::SettingWhatToCall, Phase::AfterTestcase]
    }

    fn ownership(&self, phase: Phase) -> Ownership {
        match phase {
            Phase::AfterTestcase => Ownership::Many,
            _ => Ownership::ExactlyOne,
        }
    }

    fn priority(&self, phase: Phase) -> i32 {
        match phase {
            Phase::SettingWhatToCall => 10,
            Phase::AfterTestcase => -100,
            _ => 0,
        }
    }

    fn readiness(&mut self, ctx: &ExecutionContext<'_>) -> Readiness {
        if !ctx.case().binding.is_data_bound() {
            return Readiness::NotReady;
        }
        match ctx.phase {
            Phase::SettingWhatToCall => {
                self.prepare(ctx);
                if self.failure.is_some() {
                    Readiness::when(!self.failure_reported)
                } else {
                    Readiness::when(self.has_more_rows())
                }
            }
            Phase::AfterTestcase => Readiness::when(self.failure.is_none() && self.has_more_rows()),
            _ => Readiness::NotReady,
        }
    }

    fn act(&mut self, ctx: &mut ExecutionContext<'_>) -> Result<Transition, HarnessError> {
        if ctx.phase == Phase::AfterTestcase {
            return Ok(Transition::ReturnTo(Phase::SettingWhatToCall));
        }

        if let Some(message) = &self.failure {
            self.failure_reported = true;
            ctx.clear_scratch();
            ctx.row_index = None;
            ctx.result = None;
            ctx.overriding_result = Some(TestResult::failure(message.clone()));
            return Ok(Transition::Advance);
        }

        let row = self
            .rows
            .as_mut()
            .and_then(|rows| rows.next())
            .ok_or_else(|| HarnessError::configuration("row iterator ran dry after reporting a row"))?;
        ctx.begin_row(row.index, row.cells, row.applicable);
        Ok(Transition::Advance)
    }
}

/// Sets up the single call of a test case without a data binding.
/// 为没有数据绑定的测试用例设置唯一的一次调用。
#[derive(Debug, Default)]
pub struct SingleCallHandler {
    called: bool,
}

impl SingleCallHandler {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Handler for SingleCallHandler {
    fn name(&self) -> &'static str {
        "single-call"
    }

    fn phases(&self) -> &'static [Phase] {
        &[Phase::SettingWhatToCall]
    }

    fn readiness(&mut self, ctx: &ExecutionContext<'_>) -> Readiness {
        Readiness::when(!ctx.case().binding.is_data_bound() && !self.called)
    }

    fn act(&mut self, ctx: &mut ExecutionContext<'_>) -> Result<Transition, HarnessError> {
        self.called = true;
        let applicable = !ctx.excluded().is_some_and(|indices| indices.contains(0));
        ctx.begin_row(0, Vec::new(), applicable);
        Ok(Transition::Advance)
    }
}

/// Raises a not-applicable fault instead of invoking an excluded row.
/// 对被排除的数据行抛出"不适用"故障，而不是调用它。
#[derive(Debug)]
pub struct ExcludedRowHandler;

impl Handler for ExcludedRowHandler {
    fn name(&self) -> &'static str {
        "excluded-row"
    }

    fn phases(&self) -> &'static [Phase] {
        &[Phase::CallingTestcase]
    }

    fn priority(&self, _phase: Phase) -> i32 {
        100
    }

    fn readiness(&mut self, ctx: &ExecutionContext<'_>) -> Readiness {
        Readiness::when(!ctx.row_applicable && ctx.overriding_result.is_none())
    }

    fn act(&mut self, ctx: &mut ExecutionContext<'_>) -> Result<Transition, HarnessError> {
        let row = ctx.row_index.unwrap_or(0);
        ctx.log().info(&t!("run.row_excluded", row = row, case = &ctx.case().name));
        ctx.fault = Some(Fault::not_applicable_because(format!("row {} is excluded", row)));
        Ok(Transition::Advance)
    }
}
