//! # Fault Module / 故障模块
//!
//! Faults are what test code raises instead of returning normally: failed
//! assertions, "not applicable" signals, typed exceptions, and panics caught
//! at the invocation boundary. Each fault carries a trace of `Frame`s, most
//! recent first, which classifiers trim to the test group's own code.
//!
//! 故障是测试代码代替正常返回而抛出的内容：断言失败、"不适用"信号、
//! 类型化异常以及在调用边界捕获的 panic。每个故障都带有一个 `Frame` 轨迹
//! （最近的在前），分类器会将其裁剪到测试组自身的代码。

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::panic::Location;

static ASSERTION_FAILURE: Lazy<FaultType> = Lazy::new(|| FaultType::new("AssertionFailure"));
static PANIC: Lazy<FaultType> = Lazy::new(|| FaultType::new("Panic"));
static NOT_APPLICABLE: Lazy<FaultType> = Lazy::new(|| FaultType::new("NotApplicable"));
static ARGUMENT_MISMATCH: Lazy<FaultType> = Lazy::new(|| FaultType::new("ArgumentMismatch"));
static MISCONFIGURATION: Lazy<FaultType> = Lazy::new(|| FaultType::new("Misconfiguration"));

/// A named fault type together with its ancestors.
///
/// `FaultType::new("IoError").subtype("Timeout")` yields a `Timeout` that is
/// assignable to `IoError`.
///
/// 一个带有祖先链的具名故障类型。
/// `FaultType::new("IoError").subtype("Timeout")` 生成一个可赋值给 `IoError` 的 `Timeout`。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FaultType {
    /// Most derived first.
    lineage: Vec<String>,
}

impl FaultType {
    /// A root fault type with no ancestors.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            lineage: vec![name.into()],
        }
    }

    /// A new type deriving from `self`.
    pub fn subtype(&self, name: impl Into<String>) -> Self {
        let mut lineage = Vec::with_capacity(self.lineage.len() + 1);
        lineage.push(name.into());
        lineage.extend(self.lineage.iter().cloned());
        Self { lineage }
    }

    pub fn name(&self) -> &str {
        &self.lineage[0]
    }

    /// `true` if `self` is `other` or one of its descendants.
    /// 如果 `self` 是 `other` 或其后代，则为 `true`。
    pub fn is_assignable_to(&self, other: &FaultType) -> bool {
        self.lineage.ends_with(&other.lineage)
    }

    /// The type of failed assertions.
    pub fn assertion() -> FaultType {
        ASSERTION_FAILURE.clone()
    }

    /// The type of panics caught at the invocation boundary.
    pub fn panic() -> FaultType {
        PANIC.clone()
    }
}

impl fmt::Display for FaultType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One entry of a fault trace.
/// 故障轨迹中的一个条目。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frame {
    pub file: String,
    pub line: u32,
    pub function: Option<String>,
}

impl Frame {
    /// The location of the caller, propagated through `#[track_caller]` functions.
    #[track_caller]
    pub fn caller() -> Self {
        let location = Location::caller();
        Self {
            file: location.file().to_string(),
            line: location.line(),
            function: None,
        }
    }

    pub fn named(mut self, function: impl Into<String>) -> Self {
        self.function = Some(function.into());
        self
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.function {
            Some(function) => write!(f, "at {} ({}:{})", function, self.file, self.line),
            None => write!(f, "at {}:{}", self.file, self.line),
        }
    }
}

/// What kind of fault was raised. Classifiers dispatch on this.
/// 抛出的故障种类。分类器据此进行分派。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FaultKind {
    /// An assertion or explicit failure in test code.
    Assertion,
    /// The row or test case does not apply; not a failure.
    NotApplicable { reason: Option<String> },
    /// The arguments did not fit the target's declared parameters.
    ArgumentMismatch,
    /// The harness detected a misconfigured test case.
    Misconfiguration,
    /// A typed fault raised by test code.
    Raised(FaultType),
    /// A panic caught at the invocation boundary.
    Panic,
}

/// A fault raised by test code or by the harness on its behalf.
/// 由测试代码或框架代其抛出的故障。
#[derive(Debug, Clone)]
pub struct Fault {
    kind: FaultKind,
    message: String,
    trace: Vec<Frame>,
}

impl Fault {
    fn with_kind(kind: FaultKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            trace: Vec::new(),
        }
    }

    /// An assertion failure raised at the caller's location.
    #[track_caller]
    pub fn assertion(message: impl Into<String>) -> Self {
        Self::with_kind(FaultKind::Assertion, message).with_frame(Frame::caller())
    }

    /// A typed fault raised at the caller's location.
    #[track_caller]
    pub fn raise(fault_type: FaultType, message: impl Into<String>) -> Self {
        Self::with_kind(FaultKind::Raised(fault_type), message).with_frame(Frame::caller())
    }

    pub fn not_applicable() -> Self {
        Self::with_kind(FaultKind::NotApplicable { reason: None }, "not applicable")
    }

    pub fn not_applicable_because(reason: impl Into<String>) -> Self {
        let reason = reason.into();
        Self::with_kind(
            FaultKind::NotApplicable {
                reason: Some(reason.clone()),
            },
            reason,
        )
    }

    pub fn misconfiguration(message: impl Into<String>) -> Self {
        Self::with_kind(FaultKind::Misconfiguration, message)
    }

    pub fn argument_mismatch(message: impl Into<String>) -> Self {
        Self::with_kind(FaultKind::ArgumentMismatch, message)
    }

    pub(crate) fn panic(message: impl Into<String>) -> Self {
        Self::with_kind(FaultKind::Panic, message)
    }

    /// Appends the caller's location to the trace while the fault propagates.
    /// 在故障传播时将调用者的位置追加到轨迹中。
    #[track_caller]
    pub fn rethrow(self) -> Self {
        self.with_frame(Frame::caller())
    }

    pub fn with_frame(mut self, frame: Frame) -> Self {
        self.trace.push(frame);
        self
    }

    pub fn kind(&self) -> &FaultKind {
        &self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn trace(&self) -> &[Frame] {
        &self.trace
    }

    /// The runtime type used for expected-exception matching.
    pub fn fault_type(&self) -> FaultType {
        match &self.kind {
            FaultKind::Assertion => FaultType::assertion(),
            FaultKind::Raised(fault_type) => fault_type.clone(),
            FaultKind::Panic => FaultType::panic(),
            FaultKind::NotApplicable { .. } => NOT_APPLICABLE.clone(),
            FaultKind::ArgumentMismatch => ARGUMENT_MISMATCH.clone(),
            FaultKind::Misconfiguration => MISCONFIGURATION.clone(),
        }
    }

    /// Faults produced by the harness itself rather than by the code under test.
    pub fn is_framework_fault(&self) -> bool {
        matches!(
            self.kind,
            FaultKind::NotApplicable { .. }
                | FaultKind::ArgumentMismatch
                | FaultKind::Misconfiguration
        )
    }

    /// The trace up to and including the last frame accepted by `is_own_code`.
    /// Frames past that point belong to the harness and are dropped. If no
    /// frame is accepted the full trace is returned.
    ///
    /// 返回直到（包括）最后一个被 `is_own_code` 接受的帧为止的轨迹。
    /// 之后的帧属于框架，会被丢弃。如果没有帧被接受，则返回完整轨迹。
    pub fn trimmed_trace(&self, is_own_code: impl Fn(&Frame) -> bool) -> &[Frame] {
        match self.trace.iter().rposition(is_own_code) {
            Some(last) => &self.trace[..=last],
            None => &self.trace,
        }
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.fault_type(), self.message)
    }
}

impl std::error::Error for Fault {}

/// Renders frames one per line, tab-indented.
pub fn render_trace(frames: &[Frame]) -> String {
    frames
        .iter()
        .map(|frame| format!("\t{}", frame))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Fails with an assertion fault at the caller's location unless `condition` holds.
/// 除非 `condition` 成立，否则在调用者位置以断言故障失败。
#[track_caller]
pub fn ensure(condition: bool, message: impl Into<String>) -> Result<(), Fault> {
    if condition {
        Ok(())
    } else {
        Err(Fault::assertion(message))
    }
}

/// Fails with an assertion fault at the caller's location unless `left == right`.
#[track_caller]
pub fn ensure_eq<T>(left: T, right: T) -> Result<(), Fault>
where
    T: PartialEq + fmt::Debug,
{
    if left == right {
        Ok(())
    } else {
        Err(Fault::assertion(format!(
            "expected {:?} to equal {:?}",
            left, right
        )))
    }
}

/// Extracts a readable message from a caught panic payload.
pub(crate) fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "panic payload".to_string()
    }
}
