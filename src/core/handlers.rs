//! # Handler Pipeline Module / 处理器管道模块
//!
//! The standard handlers every test case is driven through. All of them are
//! registered for every case; readiness decides which ones take part.
//!
//! 每个测试用例都会经过的标准处理器。所有处理器都为每个用例注册，
//! 由就绪状态决定哪些处理器参与。
//!
//! | Phase               | Handler (priority)                                   |
//! |---------------------|------------------------------------------------------|
//! | SETTING_WHAT_TO_CALL| data-binding (10), single-call (0)                   |
//! | BEFORE_TESTCASE     | before-hook (many)                                   |
//! | CALLING_TESTCASE    | excluded-row (100), variadic-invoke (10), invoke (0) |
//! | AFTER_INVOCATION    | argument-release (many)                              |
//! | PROCESSING_RESULT   | overriding-result (100), expected-exception (20), default (10) |
//! | AFTER_TESTCASE      | after-hook (10), result-recorder (0), data-binding (-100), all many |

pub mod classify;
pub mod data;
pub mod hooks;
pub mod invoke;
pub mod record;

use crate::core::scheduler::Handler;

pub use classify::{DefaultClassifier, ExpectedExceptionClassifier, OverridingResultHandler};
pub use data::{DataBindingHandler, ExcludedRowHandler, SingleCallHandler};
pub use hooks::{AfterHookHandler, BeforeHookHandler};
pub use invoke::{ArgumentReleaseHandler, InvocationHandler, VariadicInvocationHandler};
pub use record::ResultRecorder;

/// A fresh set of the standard handlers for one test case drive.
/// 为单个测试用例驱动创建的一组全新标准处理器。
pub fn standard_pipeline() -> Vec<Box<dyn Handler>> {
    vec![
        Box::new(DataBindingHandler::new()),
        Box::new(SingleCallHandler::new()),
        Box::new(BeforeHookHandler),
        Box::new(ExcludedRowHandler),
        Box::new(VariadicInvocationHandler),
        Box::new(InvocationHandler),
        Box::new(ArgumentReleaseHandler),
        Box::new(OverridingResultHandler),
        Box::new(ExpectedExceptionClassifier),
        Box::new(DefaultClassifier),
        Box::new(AfterHookHandler),
        Box::new(ResultRecorder),
    ]
}
