use std::rc::Rc;
use anyhow::{anyhow, Result};
use crossbeam_channel::{unbounded, Sender, Receiver};
use tracing::{debug, error, trace};
use super::deferred::Deferred;
use super::remote::{Remotes, Resolver, Settlement};

pub type Task = Box<dyn FnOnce()>;

pub trait Schedule {
    fn schedule(&self, task: Task);
}

#[derive(Clone)]
pub struct Scheduler {
    inner: Rc<dyn Schedule>,
}

pub struct Machine {
    queue:    Queue,
    tasks:    Receiver<Task>,
    remotes:  Remotes,
    receiver: Receiver<Settlement>,
    limit:    Option<usize>,
}

struct Queue {
    sender: Sender<Task>,
}

impl Scheduler {
    pub fn new<S: Schedule + 'static>(schedule: S) -> Self {
        Self { inner: Rc::new(schedule) }
    }

    pub fn schedule<F: FnOnce() + 'static>(&self, task: F) {
        self.inner.schedule(Box::new(task));
    }
}

impl Schedule for Queue {
    fn schedule(&self, task: Task) {
        if self.sender.send(task).is_err() {
            trace!("machine gone, task dropped");
        }
    }
}

impl Machine {
    pub fn new() -> Self {
        let (sender, tasks) = unbounded();
        let (remote, receiver) = unbounded();

        Self {
            queue:    Queue { sender },
            tasks:    tasks,
            remotes:  Remotes::new(remote),
            receiver: receiver,
            limit:    None,
        }
    }

    pub fn limit(&mut self, limit: usize) {
        self.limit = Some(limit);
    }

    pub fn scheduler(&self) -> Scheduler {
        let sender = self.queue.sender.clone();
        Scheduler::new(Queue { sender })
    }

    pub fn pending(&mut self) -> (Deferred, Resolver) {
        let scheduler = self.scheduler();
        self.remotes.insert(&scheduler)
    }

    pub fn tick(&mut self) -> bool {
        match self.tasks.try_recv() {
            Ok(task) => {
                task();
                true
            }
            Err(_) => false,
        }
    }

    /// Runs tasks until the queue is empty and no resolver is outstanding.
    pub fn run(&mut self) -> Result<usize> {
        let mut count = 0;

        loop {
            while let Ok(task) = self.tasks.try_recv() {
                if let Some(limit) = self.limit {
                    if count >= limit {
                        error!(limit, "task limit exceeded");
                        return Err(anyhow!("task limit of {limit} exceeded"));
                    }
                }
                task();
                count += 1;
            }

            if self.remotes.is_empty() {
                break;
            }

            match self.receiver.recv() {
                Ok(settlement) => self.remotes.settle(settlement),
                Err(_)         => break,
            }
        }

        debug!(count, "machine idle");

        Ok(count)
    }
}

impl Default for Machine {
    fn default() -> Self {
        Self::new()
    }
}
