use std::cell::{Cell, RefCell};
use std::fmt;
use std::mem::take;
use std::rc::Rc;
use tracing::trace;
use super::channel::{oneshot, Rx};
use super::error::TypeError;
use super::machine::Scheduler;
use super::resolve::settle;
use super::value::Value;

pub type Continuation = Box<dyn FnOnce(Value) -> Result<Value, Value>>;

type Reaction = Box<dyn FnOnce(Value)>;

#[derive(Clone)]
pub struct Deferred {
    inner:     Rc<RefCell<Inner>>,
    scheduler: Scheduler,
}

#[derive(Clone, Debug)]
pub enum State {
    Pending,
    Fulfilled(Value),
    Rejected(Value),
}

pub struct Defer {
    pub deferred: Deferred,
    pub resolve:  Resolve,
    pub reject:   Reject,
}

#[derive(Clone)]
pub struct Resolve(Deferred);

#[derive(Clone)]
pub struct Reject(Deferred);

struct Inner {
    state:     State,
    fulfilled: Vec<Reaction>,
    rejected:  Vec<Reaction>,
}

impl Deferred {
    pub fn new<F>(scheduler: &Scheduler, init: F) -> Self
    where
        F: FnOnce(Resolve, Reject) -> Result<(), Value>,
    {
        let Defer { deferred, resolve, reject } = Self::defer(scheduler);
        if let Err(e) = init(resolve, reject.clone()) {
            reject.reject(e);
        }
        deferred
    }

    pub fn defer(scheduler: &Scheduler) -> Defer {
        let deferred = Self {
            inner:     Rc::new(RefCell::new(Inner {
                state:     State::Pending,
                fulfilled: Vec::new(),
                rejected:  Vec::new(),
            })),
            scheduler: scheduler.clone(),
        };

        Defer {
            resolve:  Resolve(deferred.clone()),
            reject:   Reject(deferred.clone()),
            deferred: deferred,
        }
    }

    pub fn resolved(scheduler: &Scheduler, value: impl Into<Value>) -> Self {
        Self::new(scheduler, |resolve, _| {
            resolve.resolve(value);
            Ok(())
        })
    }

    pub fn rejected(scheduler: &Scheduler, reason: impl Into<Value>) -> Self {
        Self::new(scheduler, |_, reject| {
            reject.reject(reason);
            Ok(())
        })
    }

    pub fn state(&self) -> State {
        self.inner.borrow().state.clone()
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.inner.borrow().state, State::Pending)
    }

    pub fn ptr_eq(&self, other: &Deferred) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Registers continuations and returns the value they settle.
    ///
    /// A missing success continuation forwards the value, a missing failure
    /// continuation re-raises the reason. Continuations always run from the
    /// scheduler, never during this call.
    pub fn then2(&self, on_fulfilled: Option<Continuation>, on_rejected: Option<Continuation>) -> Deferred {
        let on_fulfilled: Continuation = match on_fulfilled {
            Some(f) => f,
            None    => Box::new(|value| Ok(value)),
        };
        let on_rejected: Continuation = match on_rejected {
            Some(f) => f,
            None    => Box::new(|reason| Err(reason)),
        };

        let next = Self::defer(&self.scheduler).deferred;

        let task = {
            let mut inner = self.inner.borrow_mut();
            let settled = match &inner.state {
                State::Pending          => None,
                State::Fulfilled(value) => Some(Ok(value.clone())),
                State::Rejected(reason) => Some(Err(reason.clone())),
            };

            match settled {
                Some(Ok(value))   => Some(react(next.clone(), on_fulfilled, value)),
                Some(Err(reason)) => Some(react(next.clone(), on_rejected, reason)),
                None              => {
                    let (scheduler, target) = (self.scheduler.clone(), next.clone());
                    inner.fulfilled.push(Box::new(move |value| {
                        scheduler.schedule(react(target, on_fulfilled, value));
                    }));

                    let (scheduler, target) = (self.scheduler.clone(), next.clone());
                    inner.rejected.push(Box::new(move |reason| {
                        scheduler.schedule(react(target, on_rejected, reason));
                    }));

                    None
                }
            }
        };

        if let Some(task) = task {
            self.scheduler.schedule(task);
        }

        next
    }

    pub fn then<F>(&self, on_fulfilled: F) -> Deferred
    where
        F: FnOnce(Value) -> Result<Value, Value> + 'static,
    {
        self.then2(Some(Box::new(on_fulfilled)), None)
    }

    pub fn catch<F>(&self, on_rejected: F) -> Deferred
    where
        F: FnOnce(Value) -> Result<Value, Value> + 'static,
    {
        self.then2(None, Some(Box::new(on_rejected)))
    }

    pub fn finally<F>(&self, on_settled: F) -> Deferred
    where
        F: FnOnce() -> Result<Value, Value> + 'static,
    {
        let slot = Rc::new(Cell::new(Some(on_settled)));

        let (once, scheduler) = (slot.clone(), self.scheduler.clone());
        let on_fulfilled: Continuation = Box::new(move |value| {
            let x = run(&*once)?;
            let after = Deferred::resolved(&scheduler, x).then(move |_| Ok(value));
            Ok(Value::Deferred(after))
        });

        let (once, scheduler) = (slot, self.scheduler.clone());
        let on_rejected: Continuation = Box::new(move |reason| {
            let x = run(&*once)?;
            let after = Deferred::resolved(&scheduler, x).then(move |_| Err(reason));
            Ok(Value::Deferred(after))
        });

        self.then2(Some(on_fulfilled), Some(on_rejected))
    }

    pub fn watch(&self) -> Rx {
        let (tx, rx) = oneshot();
        let slot = Rc::new(Cell::new(Some(tx)));

        let once = slot.clone();
        let on_fulfilled: Continuation = Box::new(move |value| {
            if let Some(tx) = once.take() {
                tx.send(Ok(value.to_json()));
            }
            Ok(Value::default())
        });

        let on_rejected: Continuation = Box::new(move |reason| {
            if let Some(tx) = slot.take() {
                tx.send(Err(reason.to_json()));
            }
            Ok(Value::default())
        });

        self.then2(Some(on_fulfilled), Some(on_rejected));

        rx
    }

    fn fulfill(&self, value: Value) {
        if let Value::Deferred(inner) = value {
            if inner.ptr_eq(self) {
                return self.reject(Value::from(TypeError::Cycle));
            }

            let (resolve, reject) = (Resolve(self.clone()), Reject(self.clone()));
            let on_fulfilled: Continuation = Box::new(move |value| {
                resolve.resolve(value);
                Ok(Value::default())
            });
            let on_rejected: Continuation = Box::new(move |reason| {
                reject.reject(reason);
                Ok(Value::default())
            });
            inner.then2(Some(on_fulfilled), Some(on_rejected));
            return;
        }

        let reactions = {
            let mut inner = self.inner.borrow_mut();
            if !matches!(inner.state, State::Pending) {
                return;
            }
            inner.state = State::Fulfilled(value.clone());
            inner.rejected.clear();
            take(&mut inner.fulfilled)
        };

        trace!(reactions = reactions.len(), "deferred fulfilled");

        for reaction in reactions {
            reaction(value.clone());
        }
    }

    fn reject(&self, reason: Value) {
        let reactions = {
            let mut inner = self.inner.borrow_mut();
            if !matches!(inner.state, State::Pending) {
                return;
            }
            inner.state = State::Rejected(reason.clone());
            inner.fulfilled.clear();
            take(&mut inner.rejected)
        };

        trace!(reactions = reactions.len(), "deferred rejected");

        for reaction in reactions {
            reaction(reason.clone());
        }
    }
}

impl Resolve {
    pub fn resolve(&self, value: impl Into<Value>) {
        self.0.fulfill(value.into());
    }
}

impl Reject {
    pub fn reject(&self, reason: impl Into<Value>) {
        self.0.reject(reason.into());
    }
}

impl State {
    pub fn is_settled(&self) -> bool {
        !matches!(self, State::Pending)
    }

    pub fn value(&self) -> Option<&Value> {
        match self {
            State::Fulfilled(value) => Some(value),
            _                       => None,
        }
    }

    pub fn reason(&self) -> Option<&Value> {
        match self {
            State::Rejected(reason) => Some(reason),
            _                       => None,
        }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            State::Pending      => f.write_str("pending"),
            State::Fulfilled(_) => f.write_str("fulfilled"),
            State::Rejected(_)  => f.write_str("rejected"),
        }
    }
}

impl fmt::Debug for Deferred {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner.try_borrow() {
            Ok(inner) => f.debug_tuple("Deferred").field(&inner.state).finish(),
            Err(_)    => f.write_str("Deferred(<borrowed>)"),
        }
    }
}

fn react(next: Deferred, continuation: Continuation, payload: Value) -> impl FnOnce() {
    move || match continuation(payload) {
        Ok(x)  => settle(&next, x, Resolve(next.clone()), Reject(next.clone())),
        Err(e) => next.reject(e),
    }
}

fn run<F>(slot: &Cell<Option<F>>) -> Result<Value, Value>
where
    F: FnOnce() -> Result<Value, Value>,
{
    match slot.take() {
        Some(f) => f(),
        None    => Ok(Value::default()),
    }
}
