//! Appends each row's classified result to the result stream.

use crate::core::context::{ExecutionContext, Phase};
use crate::core::error::HarnessError;
use crate::core::scheduler::{Handler, Ownership, Readiness, Transition};
use crate::infra::t;

#[derive(Debug)]
pub struct ResultRecorder;

impl Handler for ResultRecorder {
    fn name(&self) -> &'static str {
        "result-recorder"
    }

    fn phases(&self) -> &'static [Phase] {
        &[Phase::AfterTestcase]
    }

    fn ownership(&self, _phase: Phase) -> Ownership {
        Ownership::Many
    }

    fn readiness(&mut self, ctx: &ExecutionContext<'_>) -> Readiness {
        Readiness::when(ctx.result.is_some())
    }

    fn act(&mut self, ctx: &mut ExecutionContext<'_>) -> Result<Transition, HarnessError> {
        if let Some(result) = &ctx.result {
            let row = match ctx.row_index {
                Some(index) if ctx.case().binding.is_data_bound() => format!("[{}]", index),
                _ => String::new(),
            };
            ctx.log().info(&t!(
                "run.row_result",
                case = &ctx.case().name,
                row = row,
                status = result
            ));
        }
        ctx.record_result();
        Ok(Transition::Advance)
    }
}
