use std::collections::HashMap;
use anyhow::{anyhow, Error, Result};
use crossbeam_channel::Sender;
use tracing::debug;
use super::deferred::{Defer, Deferred};
use super::machine::Scheduler;
use super::value::Value;

pub struct Remotes {
    counter: u64,
    sender:  Sender<Settlement>,
    pending: HashMap<u64, Defer>,
}

pub enum Settlement {
    Success(u64, Box<dyn Resolved>),
    Failure(u64, Box<dyn Resolved>),
    Abandoned(u64),
}

pub struct Resolver {
    id: u64,
    tx: Option<Sender<Settlement>>,
}

pub trait Resolved: Send + 'static {
    fn value(self: Box<Self>) -> Value;
}

impl Remotes {
    pub fn new(sender: Sender<Settlement>) -> Self {
        Self {
            counter: 0,
            sender:  sender,
            pending: HashMap::new(),
        }
    }

    pub fn insert(&mut self, scheduler: &Scheduler) -> (Deferred, Resolver) {
        let defer = Deferred::defer(scheduler);

        let id = self.counter;
        let tx = Some(self.sender.clone());

        let deferred = defer.deferred.clone();

        self.counter += 1;
        self.pending.insert(id, defer);

        (deferred, Resolver { id, tx })
    }

    pub fn settle(&mut self, settlement: Settlement) {
        match settlement {
            Settlement::Success(id, v) => {
                if let Some(defer) = self.pending.remove(&id) {
                    defer.resolve.resolve(v.value());
                }
            }
            Settlement::Failure(id, v) => {
                if let Some(defer) = self.pending.remove(&id) {
                    defer.reject.reject(v.value());
                }
            }
            Settlement::Abandoned(id) => {
                if self.pending.remove(&id).is_some() {
                    debug!(id, "resolver dropped before settling");
                }
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

impl Resolver {
    pub fn resolve(self, value: Box<dyn Resolved>) -> Result<()> {
        self.send(|id| Settlement::Success(id, value))
    }

    pub fn reject(self, value: Box<dyn Resolved>) -> Result<()> {
        self.send(|id| Settlement::Failure(id, value))
    }

    fn send<F: FnOnce(u64) -> Settlement>(mut self, settlement: F) -> Result<()> {
        let tx = self.tx.take().ok_or_else(|| anyhow!("resolver used"))?;
        match tx.send(settlement(self.id)) {
            Ok(()) => Ok(()),
            Err(_) => Err(anyhow!("machine terminated")),
        }
    }
}

impl Drop for Resolver {
    fn drop(&mut self) {
        if let Some(tx) = self.tx.take() {
            let _ = tx.send(Settlement::Abandoned(self.id));
        }
    }
}

impl Resolved for Error {
    fn value(self: Box<Self>) -> Value {
        Value::from(*self)
    }
}

impl Resolved for serde_json::Value {
    fn value(self: Box<Self>) -> Value {
        Value::Json(*self)
    }
}

impl Resolved for String {
    fn value(self: Box<Self>) -> Value {
        Value::from(*self)
    }
}
