// Shared test helpers for integration tests
#![allow(dead_code)]

use case_matrix::core::fault::Fault;
use case_matrix::core::group::Target;
use case_matrix::core::values::{ParamType, Value};
use std::cell::RefCell;
use std::rc::Rc;

/// Arguments of every call a target received, in call order.
pub type Calls = Rc<RefCell<Vec<Vec<Value>>>>;

pub fn new_calls() -> Calls {
    Rc::new(RefCell::new(Vec::new()))
}

/// A target that records its arguments and returns `Unit`.
pub fn recording_target(name: &str, params: Vec<ParamType>, calls: &Calls) -> Target {
    let calls = Rc::clone(calls);
    Target::new(name, params, move |args| {
        calls.borrow_mut().push(args.to_vec());
        Ok(Value::Unit)
    })
}

/// A target that records its arguments and then fails with `fault`.
pub fn failing_target(
    name: &str,
    params: Vec<ParamType>,
    calls: &Calls,
    fault: impl Fn() -> Fault + 'static,
) -> Target {
    let calls = Rc::clone(calls);
    Target::new(name, params, move |args| {
        calls.borrow_mut().push(args.to_vec());
        Err(fault())
    })
}

/// Counts how often a hook ran.
pub type Counter = Rc<RefCell<usize>>;

pub fn new_counter() -> Counter {
    Rc::new(RefCell::new(0))
}

pub fn counting_hook(counter: &Counter) -> impl Fn() -> Result<(), Fault> + 'static {
    let counter = Rc::clone(counter);
    move || {
        *counter.borrow_mut() += 1;
        Ok(())
    }
}

pub fn ints(values: &[i64]) -> Vec<Vec<Value>> {
    values.iter().map(|&v| vec![Value::Int(v)]).collect()
}
