//! # Case Matrix Library / Case Matrix 库
//!
//! This library provides the execution core of a data-driven test harness:
//! a phase scheduler that drives each test case through pluggable handlers,
//! a value algebra that expands one declaration into many invocations, and
//! an exclusion engine that suppresses selected rows or whole test cases.
//!
//! 此库提供数据驱动测试框架的执行核心：
//! 一个通过可插拔处理器驱动每个测试用例的阶段调度器，
//! 一个将单个声明展开为多次调用的值代数，
//! 以及一个屏蔽指定数据行或整个测试用例的排除引擎。
//!
//! ## Modules / 模块
//!
//! - `core` - Scheduler, handlers, value algebra, exclusion engine and result model
//! - `infra` - Infrastructure services such as the logging sink and i18n
//! - `reporting` - Console and JSON views of a finished group run
//!
//! - `core` - 调度器、处理器、值代数、排除引擎和结果模型
//! - `infra` - 基础设施服务，如日志接收器和国际化
//! - `reporting` - 已完成测试组运行的控制台和 JSON 视图

pub mod core;
pub mod infra;
pub mod reporting;

// Re-export commonly used items
pub use crate::core::config::{HarnessConfig, TestCaseDescriptor};
pub use crate::core::error::HarnessError;
pub use crate::core::execution::{run_group, run_test_case};
pub use crate::core::exclusion::{ExcludedIndices, ExclusionList};
pub use crate::core::fault::{Fault, FaultType};
pub use crate::core::group::{Target, TestGroup};
pub use crate::core::models::{CaseResult, GroupReport, TestResult};
pub use crate::core::values::{Combination, ParamType, Value, Values};

/// Initializes the library's internationalization (i18n) based on the system locale.
///
/// This function detects the user's system locale and sets the language used
/// for log messages. It attempts to match the full locale (e.g., "zh-CN"),
/// then just the language code (e.g., "en"), and finally falls back to "en".
/// Result messages and status strings are never localized.
pub fn init() {
    let locale = sys_locale::get_locale().unwrap_or_else(|| "en".to_string());
    let available_locales = rust_i18n::available_locales!();

    let lang = if available_locales.contains(&locale.as_str()) {
        &locale
    } else {
        locale
            .split('-')
            .next()
            .filter(|lang_code| available_locales.contains(lang_code))
            .unwrap_or("en")
    };

    rust_i18n::set_locale(lang);
}

// Initialize i18n
rust_i18n::i18n!("locales", fallback = "en");
