//! # Core Module / 核心模块
//!
//! This module contains the execution core of Case Matrix: the phase
//! scheduler and its handler pipeline, the value algebra, the exclusion
//! engine, and the result model.
//!
//! 此模块包含 Case Matrix 的执行核心：阶段调度器及其处理器管道、
//! 值代数、排除引擎以及结果模型。

pub mod config;
pub mod context;
pub mod error;
pub mod exclusion;
pub mod execution;
pub mod fault;
pub mod group;
pub mod handlers;
pub mod models;
pub mod planner;
pub mod scheduler;
pub mod values;

// Re-exports
pub use context::{ExecutionContext, Phase};
pub use models::TestResult;
pub use scheduler::{Handler, Scheduler};
