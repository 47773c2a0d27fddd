use std::time::Duration;
use anyhow::Result;
use serde_json::json;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, registry};
use tracing_subscriber::filter::{EnvFilter, LevelFilter};
use deferred::{ex::delay, Deferred, Machine, Value};

fn main() -> Result<()> {
    let mut filter = EnvFilter::from_default_env();
    filter = filter.add_directive(LevelFilter::WARN.into());
    let print = fmt::layer().compact();
    registry().with(filter).with(print).init();

    let mut machine = Machine::new();
    let scheduler   = machine.scheduler();

    let first = Deferred::new(&scheduler, |resolve, _| {
        println!("create a deferred");
        resolve.resolve("first value");
        Ok(())
    });
    println!("after new");

    first
        .then(|value| {
            println!("first value: {}", value.to_json());
            Err("second error".into())
        })
        .catch(|reason| {
            println!("caught: {}", reason.to_json());
            Ok(Value::default())
        })
        .then(|_| {
            println!("continued");
            Ok(Value::default())
        });
    println!("after then");

    let slow = delay(&mut machine, Duration::from_millis(200), json!(2));
    let all  = Deferred::all(&scheduler, Value::List(vec![Deferred::resolved(&scheduler, 1).into(), slow.into(), 3.into()]));
    let rx   = all.watch();

    let count = machine.run()?;
    println!("all -> {} ({count} tasks)", rx.recv()?);

    Ok(())
}
