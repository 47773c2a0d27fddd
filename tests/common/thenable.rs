use std::cell::Cell;
use std::rc::Rc;
use deferred::vm::{Callback, Scheduler, Thenable};
use deferred::Value;

/// Calls back synchronously, in order, without any guard of its own.
pub struct Script(pub Vec<Step>);

#[derive(Clone)]
pub enum Step {
    Resolve(Value),
    Reject(Value),
    Throw(Value),
}

/// Resolves from a later task, then tries to reject as well.
pub struct Later {
    pub scheduler: Scheduler,
    pub value:     Value,
}

/// Reading `then` faults.
pub struct Getter(pub Value);

/// Has a `then` member that is not callable.
pub struct NotCallable {
    pub called: Rc<Cell<bool>>,
}

/// Resolves with another of itself from a later task, forever.
pub struct Forever {
    pub scheduler: Scheduler,
}

impl Thenable for Script {
    fn then(&self, on_value: Callback, on_reason: Callback) -> Result<(), Value> {
        for step in &self.0 {
            match step.clone() {
                Step::Resolve(value) => on_value.call(value),
                Step::Reject(reason) => on_reason.call(reason),
                Step::Throw(fault)   => return Err(fault),
            }
        }
        Ok(())
    }
}

impl Thenable for Later {
    fn then(&self, on_value: Callback, on_reason: Callback) -> Result<(), Value> {
        let value = self.value.clone();
        self.scheduler.schedule(move || {
            on_value.call(value);
            on_reason.call("too late");
        });
        Ok(())
    }
}

impl Thenable for Getter {
    fn callable(&self) -> Result<bool, Value> {
        Err(self.0.clone())
    }

    fn then(&self, _: Callback, _: Callback) -> Result<(), Value> {
        Err("then invoked after a faulting getter".into())
    }
}

impl Thenable for NotCallable {
    fn callable(&self) -> Result<bool, Value> {
        Ok(false)
    }

    fn then(&self, _: Callback, _: Callback) -> Result<(), Value> {
        self.called.set(true);
        Ok(())
    }
}

impl Thenable for Forever {
    fn then(&self, on_value: Callback, _: Callback) -> Result<(), Value> {
        let scheduler = self.scheduler.clone();
        self.scheduler.schedule(move || {
            on_value.call(Value::thenable(Forever { scheduler }));
        });
        Ok(())
    }
}

pub fn script(steps: Vec<Step>) -> Value {
    Value::thenable(Script(steps))
}
