//! # Error Module / 错误模块
//!
//! Errors that abort a run rather than being classified into a test result.
//! Faults raised by test code never show up here; they are turned into
//! `TestResult`s by the classifier handlers.
//!
//! 中止运行（而不是被归类为测试结果）的错误。
//! 测试代码抛出的故障不会出现在这里，而是由分类处理器转换为 `TestResult`。

use thiserror::Error;

use crate::core::context::Phase;
use crate::core::exclusion::ExclusionSyntaxError;

/// Fatal harness errors. None of these are retried.
/// 致命的框架错误。这些错误都不会被重试。
#[derive(Debug, Error)]
pub enum HarnessError {
    /// A test group or descriptor is malformed, e.g. an empty expected-exception
    /// list or the same directive attached at two scopes.
    /// 测试组或描述符格式错误，例如空的预期异常列表或在两个作用域重复附加同一指令。
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The exclusion list could not be parsed. Raised before any row executes.
    /// 无法解析排除列表。在任何数据行执行之前抛出。
    #[error("malformed exclusion list: {0}")]
    MalformedExclusion(#[from] ExclusionSyntaxError),

    /// A handler's own action failed. This is a pipeline bug, not a test fault.
    /// 处理器自身的动作失败。这是管道缺陷，而不是测试故障。
    #[error("handler '{handler}' failed in phase {phase}: {message}")]
    Pipeline {
        phase: Phase,
        handler: &'static str,
        message: String,
    },
}

impl HarnessError {
    pub fn configuration(message: impl Into<String>) -> Self {
        HarnessError::Configuration(message.into())
    }

    pub(crate) fn pipeline(phase: Phase, handler: &'static str, message: impl Into<String>) -> Self {
        HarnessError::Pipeline {
            phase,
            handler,
            message: message.into(),
        }
    }
}
