#![allow(dead_code)]

use serde_json::Value as Json;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, registry};
use tracing_subscriber::filter::{EnvFilter, LevelFilter};
use deferred::vm::{Scheduler, State};
use deferred::Deferred;

pub mod thenable;

pub fn init() {
    let mut filter = EnvFilter::from_default_env();
    filter = filter.add_directive(LevelFilter::WARN.into());
    let print = fmt::layer().compact();
    let _ = registry().with(filter).with(print).try_init();
}

/// Runs `f` after `turns` trips through the scheduler.
pub fn later<F: FnOnce() + 'static>(scheduler: Scheduler, turns: usize, f: F) {
    match turns {
        0 => f(),
        n => {
            let next = scheduler.clone();
            scheduler.schedule(move || later(next, n - 1, f));
        }
    }
}

pub fn outcome(deferred: &Deferred) -> Option<Result<Json, Json>> {
    match deferred.state() {
        State::Pending           => None,
        State::Fulfilled(value)  => Some(Ok(value.to_json())),
        State::Rejected(reason)  => Some(Err(reason.to_json())),
    }
}
