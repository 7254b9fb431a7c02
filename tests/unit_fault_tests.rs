//! # Fault Module Unit Tests / 故障模块单元测试

use case_matrix::core::fault::{ensure, ensure_eq, render_trace, Fault, FaultKind, FaultType, Frame};

#[cfg(test)]
mod fault_type_tests {
    use super::*;

    #[test]
    fn test_subtype_is_assignable_to_ancestors() {
        let io = FaultType::new("IoError");
        let timeout = io.subtype("Timeout");
        let read_timeout = timeout.subtype("ReadTimeout");

        assert!(read_timeout.is_assignable_to(&timeout));
        assert!(read_timeout.is_assignable_to(&io));
        assert!(timeout.is_assignable_to(&timeout));
        assert!(!io.is_assignable_to(&timeout));
        assert!(!timeout.is_assignable_to(&FaultType::new("Timeout")));
        assert_eq!(read_timeout.name(), "ReadTimeout");
    }

    #[test]
    fn test_builtin_fault_types() {
        assert_eq!(Fault::assertion("x").fault_type(), FaultType::assertion());
        assert_eq!(FaultType::panic().to_string(), "Panic");
    }
}

#[cfg(test)]
mod fault_tests {
    use super::*;

    #[test]
    fn test_assertion_records_caller_location() {
        let fault = Fault::assertion("boom");
        assert_eq!(fault.kind(), &FaultKind::Assertion);
        assert_eq!(fault.trace().len(), 1);
        assert!(fault.trace()[0].file.ends_with("unit_fault_tests.rs"));
        assert_eq!(fault.to_string(), "AssertionFailure: boom");
    }

    #[test]
    fn test_rethrow_appends_frames() {
        let fault = Fault::raise(FaultType::new("IoError"), "disk").rethrow().rethrow();
        assert_eq!(fault.trace().len(), 3);
        assert_eq!(fault.message(), "disk");
    }

    #[test]
    fn test_framework_faults() {
        assert!(Fault::not_applicable().is_framework_fault());
        assert!(Fault::argument_mismatch("x").is_framework_fault());
        assert!(Fault::misconfiguration("x").is_framework_fault());
        assert!(!Fault::assertion("x").is_framework_fault());
        assert!(!Fault::raise(FaultType::new("E"), "x").is_framework_fault());
    }

    #[test]
    fn test_not_applicable_reason() {
        let fault = Fault::not_applicable_because("no network");
        assert_eq!(
            fault.kind(),
            &FaultKind::NotApplicable {
                reason: Some("no network".to_string())
            }
        );
    }

    #[test]
    fn test_trimmed_trace_stops_at_last_own_frame() {
        let fault = Fault::assertion("x")
            .with_frame(Frame {
                file: "tests/own_group.rs".to_string(),
                line: 20,
                function: None,
            })
            .with_frame(Frame::caller().named("harness"))
            .with_frame(Frame {
                file: "src/runtime.rs".to_string(),
                line: 1,
                function: None,
            });

        let trimmed = fault.trimmed_trace(|frame| frame.file == "tests/own_group.rs");
        assert_eq!(trimmed.len(), 2);
        assert_eq!(trimmed[1].line, 20);

        let untouched = fault.trimmed_trace(|_| false);
        assert_eq!(untouched.len(), 4);
    }

    #[test]
    fn test_render_trace_indents_frames() {
        let frames = vec![
            Frame {
                file: "a.rs".to_string(),
                line: 1,
                function: Some("run".to_string()),
            },
            Frame {
                file: "b.rs".to_string(),
                line: 2,
                function: None,
            },
        ];
        assert_eq!(render_trace(&frames), "\tat run (a.rs:1)\n\tat b.rs:2");
    }

    #[test]
    fn test_ensure_helpers() {
        assert!(ensure(true, "fine").is_ok());
        let fault = ensure(false, "broken").unwrap_err();
        assert_eq!(fault.message(), "broken");

        assert!(ensure_eq(1, 1).is_ok());
        let fault = ensure_eq("a", "b").unwrap_err();
        assert_eq!(fault.message(), "expected \"a\" to equal \"b\"");
        assert!(fault.trace()[0].file.ends_with("unit_fault_tests.rs"));
    }
}
