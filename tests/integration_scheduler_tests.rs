//! # Scheduler Integration Tests / 调度器集成测试
//!
//! Drives contexts through custom handler sets to check dispatch order,
//! ownership, phase loops and error propagation.
//!
//! 通过自定义处理器集合驱动上下文，检查分派顺序、所有权、阶段循环和错误传播。

mod common;

use case_matrix::core::context::{ExecutionContext, Phase};
use case_matrix::core::error::HarnessError;
use case_matrix::core::group::TestGroup;
use case_matrix::core::handlers::standard_pipeline;
use case_matrix::core::scheduler::{Handler, Ownership, Readiness, Scheduler, Transition};
use case_matrix::TestCaseDescriptor;
use case_matrix::infra::log::MemoryLog;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

type Journal = Rc<RefCell<Vec<&'static str>>>;

/// A configurable handler that writes its name to a shared journal.
struct Probe {
    name: &'static str,
    phases: &'static [Phase],
    ownership: Ownership,
    priority: i32,
    ready: bool,
    transition: Transition,
    outranks_peers: bool,
    journal: Journal,
}

impl Probe {
    fn new(name: &'static str, phases: &'static [Phase], journal: &Journal) -> Self {
        Self {
            name,
            phases,
            ownership: Ownership::ExactlyOne,
            priority: 0,
            ready: true,
            transition: Transition::Advance,
            outranks_peers: false,
            journal: Rc::clone(journal),
        }
    }

    fn priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    fn many(mut self) -> Self {
        self.ownership = Ownership::Many;
        self
    }

    fn not_ready(mut self) -> Self {
        self.ready = false;
        self
    }

    fn then(mut self, transition: Transition) -> Self {
        self.transition = transition;
        self
    }

    /// Claims precedence over every other handler regardless of `priority`.
    fn outranks_peers(mut self) -> Self {
        self.outranks_peers = true;
        self
    }
}

impl Handler for Probe {
    fn name(&self) -> &'static str {
        self.name
    }

    fn phases(&self) -> &'static [Phase] {
        self.phases
    }

    fn ownership(&self, _phase: Phase) -> Ownership {
        self.ownership
    }

    fn priority(&self, _phase: Phase) -> i32 {
        self.priority
    }

    fn has_higher_priority_than(&self, other: &dyn Handler, phase: Phase) -> bool {
        self.outranks_peers || self.priority > other.priority(phase)
    }

    fn readiness(&mut self, _ctx: &ExecutionContext<'_>) -> Readiness {
        Readiness::when(self.ready)
    }

    fn act(&mut self, _ctx: &mut ExecutionContext<'_>) -> Result<Transition, HarnessError> {
        self.journal.borrow_mut().push(self.name);
        Ok(self.transition)
    }
}

/// Ready in SETTING_WHAT_TO_CALL while it has rows left.
struct Feeder {
    remaining: Rc<Cell<usize>>,
    journal: Journal,
}

impl Handler for Feeder {
    fn name(&self) -> &'static str {
        "feeder"
    }

    fn phases(&self) -> &'static [Phase] {
        &[Phase::SettingWhatToCall, Phase::AfterTestcase]
    }

    fn ownership(&self, _phase: Phase) -> Ownership {
        Ownership::Many
    }

    fn readiness(&mut self, ctx: &ExecutionContext<'_>) -> Readiness {
        Readiness::when(self.remaining.get() > 0 || ctx.phase == Phase::AfterTestcase)
    }

    fn act(&mut self, ctx: &mut ExecutionContext<'_>) -> Result<Transition, HarnessError> {
        if ctx.phase == Phase::AfterTestcase {
            return Ok(if self.remaining.get() > 0 {
                Transition::ReturnTo(Phase::SettingWhatToCall)
            } else {
                Transition::Advance
            });
        }
        self.remaining.set(self.remaining.get() - 1);
        self.journal.borrow_mut().push("feeder");
        Ok(Transition::Advance)
    }
}

struct Broken;

impl Handler for Broken {
    fn name(&self) -> &'static str {
        "broken"
    }

    fn phases(&self) -> &'static [Phase] {
        &[Phase::CallingTestcase]
    }

    fn readiness(&mut self, _ctx: &ExecutionContext<'_>) -> Readiness {
        Readiness::Ready
    }

    fn act(&mut self, _ctx: &mut ExecutionContext<'_>) -> Result<Transition, HarnessError> {
        Err(HarnessError::configuration("handler state corrupted"))
    }
}

fn single_case_group() -> TestGroup {
    let calls = common::new_calls();
    TestGroup::builder("scheduler")
        .case(
            common::recording_target("probe_case", vec![], &calls),
            TestCaseDescriptor::marked(),
        )
        .build()
}

fn feeder(rows: usize, journal: &Journal) -> Box<dyn Handler> {
    Box::new(Feeder {
        remaining: Rc::new(Cell::new(rows)),
        journal: Rc::clone(journal),
    })
}

fn drive(handlers: Vec<Box<dyn Handler>>) -> Result<(), HarnessError> {
    let group = single_case_group();
    let cases = group.discover().unwrap();
    let log = MemoryLog::new();
    let mut ctx = ExecutionContext::new(&group, &cases[0], None, &log);
    Scheduler::new(handlers).drive(&mut ctx)
}

#[cfg(test)]
mod dispatch_tests {
    use super::*;

    #[test]
    fn test_exactly_one_runs_highest_priority_ready_handler() {
        let journal = Journal::default();
        let result = drive(vec![
            feeder(1, &journal),
            Box::new(Probe::new("low", &[Phase::CallingTestcase], &journal).priority(1)),
            Box::new(Probe::new("high", &[Phase::CallingTestcase], &journal).priority(5)),
            Box::new(
                Probe::new("highest-but-idle", &[Phase::CallingTestcase], &journal)
                    .priority(9)
                    .not_ready(),
            ),
        ]);

        assert!(result.is_ok());
        assert_eq!(*journal.borrow(), vec!["feeder", "high"]);
    }

    #[test]
    fn test_many_runs_every_ready_handler_in_priority_order() {
        let journal = Journal::default();
        drive(vec![
            feeder(1, &journal),
            Box::new(Probe::new("b", &[Phase::AfterInvocation], &journal).many()),
            Box::new(Probe::new("a", &[Phase::AfterInvocation], &journal).many().priority(3)),
            Box::new(Probe::new("idle", &[Phase::AfterInvocation], &journal).many().not_ready()),
        ])
        .unwrap();

        assert_eq!(*journal.borrow(), vec!["feeder", "a", "b"]);
    }

    #[test]
    fn test_equal_priorities_keep_registration_order() {
        let journal = Journal::default();
        let scheduler = Scheduler::new(vec![
            Box::new(Probe::new("first", &[Phase::ProcessingResult], &journal)),
            Box::new(Probe::new("second", &[Phase::ProcessingResult], &journal)),
        ]);
        assert_eq!(scheduler.order(Phase::ProcessingResult), vec!["first", "second"]);
        assert!(scheduler.order(Phase::BeforeTestcase).is_empty());
    }

    #[test]
    fn test_pairwise_priority_override_decides_the_owner() {
        let journal = Journal::default();
        drive(vec![
            feeder(1, &journal),
            Box::new(Probe::new("plain", &[Phase::CallingTestcase], &journal)),
            Box::new(Probe::new("pushy", &[Phase::CallingTestcase], &journal).outranks_peers()),
        ])
        .unwrap();

        assert_eq!(*journal.borrow(), vec!["feeder", "pushy"]);
    }

    #[test]
    fn test_pairwise_priority_override_reorders_many_handlers() {
        let journal = Journal::default();
        let scheduler = Scheduler::new(vec![
            Box::new(Probe::new("loud", &[Phase::AfterInvocation], &journal).many().priority(7)),
            Box::new(Probe::new("quiet", &[Phase::AfterInvocation], &journal).many()),
            Box::new(
                Probe::new("pushy", &[Phase::AfterInvocation], &journal)
                    .many()
                    .outranks_peers(),
            ),
        ]);
        assert_eq!(
            scheduler.order(Phase::AfterInvocation),
            vec!["pushy", "loud", "quiet"]
        );
    }

    #[test]
    fn test_drive_ends_when_nothing_is_ready_to_set_up() {
        let journal = Journal::default();
        drive(vec![
            feeder(0, &journal),
            Box::new(Probe::new("invoke", &[Phase::CallingTestcase], &journal)),
        ])
        .unwrap();
        assert!(journal.borrow().is_empty());
    }

    #[test]
    fn test_return_to_loops_until_rows_run_out() {
        let journal = Journal::default();
        drive(vec![
            feeder(3, &journal),
            Box::new(Probe::new("invoke", &[Phase::CallingTestcase], &journal)),
        ])
        .unwrap();

        assert_eq!(
            *journal.borrow(),
            vec!["feeder", "invoke", "feeder", "invoke", "feeder", "invoke"]
        );
    }

    #[test]
    fn test_standard_pipeline_order() {
        let scheduler = Scheduler::new(standard_pipeline());
        assert_eq!(
            scheduler.order(Phase::ProcessingResult),
            vec!["overriding-result", "expected-exception", "default-classifier"]
        );
        assert_eq!(
            scheduler.order(Phase::CallingTestcase),
            vec!["excluded-row", "variadic-invoke", "invoke"]
        );
        assert_eq!(
            scheduler.order(Phase::AfterTestcase),
            vec!["after-hook", "result-recorder", "data-binding"]
        );
    }
}

#[cfg(test)]
mod error_tests {
    use super::*;

    #[test]
    fn test_handler_error_is_fatal_and_names_the_handler() {
        let journal = Journal::default();
        let error = drive(vec![feeder(2, &journal), Box::new(Broken)]).unwrap_err();

        match error {
            HarnessError::Pipeline { phase, handler, message } => {
                assert_eq!(phase, Phase::CallingTestcase);
                assert_eq!(handler, "broken");
                assert!(message.contains("handler state corrupted"));
            }
            other => panic!("Expected a pipeline error, got {:?}", other),
        }
        assert_eq!(*journal.borrow(), vec!["feeder"]);
    }

    #[test]
    fn test_forward_return_is_rejected() {
        let journal = Journal::default();
        let error = drive(vec![
            feeder(1, &journal),
            Box::new(
                Probe::new("jumper", &[Phase::BeforeTestcase], &journal)
                    .then(Transition::ReturnTo(Phase::AfterTestcase)),
            ),
        ])
        .unwrap_err();

        assert!(matches!(
            error,
            HarnessError::Pipeline { handler: "jumper", .. }
        ));
    }
}
