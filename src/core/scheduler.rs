//! # Phase Scheduler Module / 阶段调度器模块
//!
//! The scheduler drives one `ExecutionContext` through the phases of a test
//! case. For every phase visit it asks the interested handlers whether they
//! are ready, then runs them in priority order: every ready `Many` handler,
//! plus the single highest-priority ready `ExactlyOne` handler.
//!
//! 调度器驱动一个 `ExecutionContext` 经历测试用例的各个阶段。
//! 每次访问阶段时，它会询问相关处理器是否就绪，然后按优先级顺序运行：
//! 所有就绪的 `Many` 处理器，加上优先级最高的单个就绪 `ExactlyOne` 处理器。
//!
//! ## Drive loop / 驱动循环
//!
//! ```text
//! SETTING_WHAT_TO_CALL -> BEFORE_TESTCASE -> CALLING_TESTCASE
//!   -> AFTER_INVOCATION -> PROCESSING_RESULT -> AFTER_TESTCASE
//!        ^                                           |
//!        +------------- ReturnTo (rows left) --------+
//! ```
//!
//! The drive ends when nothing is ready in `SETTING_WHAT_TO_CALL`, or when
//! `AFTER_TESTCASE` completes without a `ReturnTo`.

use crate::core::context::{ExecutionContext, Phase};
use crate::core::error::HarnessError;

/// Whether one or all ready handlers act in a phase visit.
/// 在一次阶段访问中是一个还是所有就绪处理器执行。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ownership {
    /// Only the highest-priority ready handler acts.
    ExactlyOne,
    /// Every ready handler acts once.
    Many,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    Ready,
    NotReady,
}

impl Readiness {
    pub fn when(condition: bool) -> Self {
        if condition {
            Readiness::Ready
        } else {
            Readiness::NotReady
        }
    }
}

/// Where control goes after a handler acts.
/// 处理器执行后控制流的去向。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Advance,
    /// Go back to an earlier (or the same) phase instead of advancing.
    ReturnTo(Phase),
}

/// A pluggable unit of the test case life-cycle.
///
/// `readiness` and `act` receive the context with `ctx.phase` set to the
/// phase being visited. `readiness` takes `&mut self` so handlers can latch
/// state, e.g. a data source that failed to build.
///
/// 测试用例生命周期中的可插拔单元。
/// `readiness` 和 `act` 接收的上下文中 `ctx.phase` 已设置为当前访问的阶段。
/// `readiness` 接受 `&mut self`，以便处理器锁存状态，例如构建失败的数据来源。
pub trait Handler {
    fn name(&self) -> &'static str;

    /// Phases this handler takes part in.
    fn phases(&self) -> &'static [Phase];

    fn ownership(&self, _phase: Phase) -> Ownership {
        Ownership::ExactlyOne
    }

    /// Higher runs first and wins `ExactlyOne` phases.
    fn priority(&self, _phase: Phase) -> i32 {
        0
    }

    /// Pairwise ordering used to build the pipeline. Defaults to comparing `priority`.
    /// 构建管道时使用的两两比较。默认比较 `priority`。
    fn has_higher_priority_than(&self, other: &dyn Handler, phase: Phase) -> bool {
        self.priority(phase) > other.priority(phase)
    }

    fn readiness(&mut self, ctx: &ExecutionContext<'_>) -> Readiness;

    /// Performs the handler's work. An error here is a pipeline bug and aborts the drive.
    fn act(&mut self, ctx: &mut ExecutionContext<'_>) -> Result<Transition, HarnessError>;
}

/// Drives test cases through a fixed handler pipeline.
/// 通过固定的处理器管道驱动测试用例。
pub struct Scheduler {
    handlers: Vec<Box<dyn Handler>>,
    /// Per phase, indices into `handlers` sorted by descending priority.
    pipeline: Vec<Vec<usize>>,
}

impl Scheduler {
    /// Builds the per-phase pipeline once.
    ///
    /// Each handler is placed before the first already-placed handler it
    /// `has_higher_priority_than`, so ties keep registration order.
    ///
    /// 一次性构建每个阶段的管道。
    /// 每个处理器被放在第一个比它优先级低的已放置处理器之前，因此优先级相同时保持注册顺序。
    pub fn new(handlers: Vec<Box<dyn Handler>>) -> Self {
        let pipeline = Phase::ALL
            .iter()
            .map(|&phase| {
                let mut order: Vec<usize> = Vec::new();
                for (index, handler) in handlers.iter().enumerate() {
                    if !handler.phases().contains(&phase) {
                        continue;
                    }
                    let position = order
                        .iter()
                        .position(|&placed| {
                            handler.has_higher_priority_than(handlers[placed].as_ref(), phase)
                        })
                        .unwrap_or(order.len());
                    order.insert(position, index);
                }
                order
            })
            .collect();
        Self { handlers, pipeline }
    }

    /// Handler names for `phase`, in execution order.
    pub fn order(&self, phase: Phase) -> Vec<&'static str> {
        self.pipeline[phase.index()]
            .iter()
            .map(|&index| self.handlers[index].name())
            .collect()
    }

    /// Runs the context through the phases until the drive terminates.
    /// 运行上下文经历各阶段，直到驱动结束。
    pub fn drive(&mut self, ctx: &mut ExecutionContext<'_>) -> Result<(), HarnessError> {
        let mut phase = Phase::SettingWhatToCall;
        loop {
            ctx.phase = phase;
            let (ran, transition) = self.visit(phase, ctx)?;

            if phase == Phase::SettingWhatToCall && ran == 0 {
                return Ok(());
            }

            phase = match transition {
                Transition::ReturnTo(target) => target,
                Transition::Advance => match phase.next() {
                    Some(next) => next,
                    None => return Ok(()),
                },
            };
        }
    }

    /// Visits one phase: selects the ready handlers, then runs them.
    fn visit(
        &mut self,
        phase: Phase,
        ctx: &mut ExecutionContext<'_>,
    ) -> Result<(usize, Transition), HarnessError> {
        let mut selected = Vec::new();
        let mut owner_chosen = false;

        for &index in &self.pipeline[phase.index()] {
            let handler = &mut self.handlers[index];
            let exclusive = handler.ownership(phase) == Ownership::ExactlyOne;
            if exclusive && owner_chosen {
                continue;
            }
            if handler.readiness(ctx) == Readiness::NotReady {
                continue;
            }
            owner_chosen |= exclusive;
            selected.push(index);
        }

        let mut transition = Transition::Advance;
        for &index in &selected {
            let handler = &mut self.handlers[index];
            let name = handler.name();
            let step = handler
                .act(ctx)
                .map_err(|e| HarnessError::pipeline(phase, name, e.to_string()))?;

            if let Transition::ReturnTo(target) = step {
                if target > phase {
                    return Err(HarnessError::pipeline(
                        phase,
                        name,
                        format!("cannot return forward to {}", target),
                    ));
                }
                if transition == Transition::Advance {
                    transition = step;
                }
            }
        }
        Ok((selected.len(), transition))
    }
}
