//! # Infrastructure Module / 基础设施模块
//!
//! This module provides infrastructure services for Case Matrix:
//! the logging sink handed to every test case drive, and i18n support.
//!
//! 此模块为 Case Matrix 提供基础设施服务：
//! 传递给每个测试用例驱动的日志接收器，以及国际化支持。

pub mod log;

// Re-export i18n functions for easier access
pub use rust_i18n::t;
