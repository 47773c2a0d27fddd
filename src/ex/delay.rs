use std::thread::{sleep, spawn};
use std::time::Duration;
use tracing::debug;
use crate::vm::{Deferred, Machine, Resolved};

pub fn delay<T: Resolved>(machine: &mut Machine, after: Duration, value: T) -> Deferred {
    let (deferred, resolver) = machine.pending();
    spawn(move || {
        sleep(after);
        deliver(resolver.resolve(Box::new(value)));
    });
    deferred
}

pub fn fail_after<T: Resolved>(machine: &mut Machine, after: Duration, reason: T) -> Deferred {
    let (deferred, resolver) = machine.pending();
    spawn(move || {
        sleep(after);
        deliver(resolver.reject(Box::new(reason)));
    });
    deferred
}

fn deliver(result: anyhow::Result<()>) {
    if let Err(e) = result {
        debug!("delayed settlement dropped: {e:?}");
    }
}
