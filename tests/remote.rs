use std::thread::spawn;
use std::time::Duration;
use anyhow::{anyhow, Result};
use serde_json::json;
use deferred::ex::{delay, fail_after};
use deferred::vm::{Dropped, Rejected};
use deferred::{Deferred, Machine, Value};
use common::outcome;
mod common;

#[test]
fn delayed_values_join_the_aggregate() -> Result<()> {
    common::init();
    let mut machine = Machine::new();
    let scheduler   = machine.scheduler();

    let slow  = delay(&mut machine, Duration::from_millis(20), json!(2));
    let input = vec![Deferred::resolved(&scheduler, 1).into(), slow.into(), Value::from(3)];
    let all   = Deferred::all(&scheduler, input.into());

    machine.run()?;
    assert_eq!(outcome(&all), Some(Ok(json!([1, 2, 3]))));

    Ok(())
}

#[test]
fn delayed_failures_reject() -> Result<()> {
    common::init();
    let mut machine = Machine::new();

    let late = fail_after(&mut machine, Duration::from_millis(5), anyhow!("late"))
        .catch(|reason| Ok(reason));

    machine.run()?;
    assert_eq!(outcome(&late), Some(Ok(json!("late"))));

    Ok(())
}

#[test]
fn resolver_settles_from_another_thread() -> Result<()> {
    common::init();
    let mut machine = Machine::new();

    let (deferred, resolver) = machine.pending();
    let chained = deferred.then(|value| Ok(value));

    let thread = spawn(move || resolver.resolve(Box::new(json!({"from": "thread"}))));

    machine.run()?;
    thread.join().map_err(|_| anyhow!("thread panicked"))??;

    assert_eq!(outcome(&chained), Some(Ok(json!({"from": "thread"}))));

    Ok(())
}

#[test]
fn abandoned_resolver_leaves_value_pending() -> Result<()> {
    common::init();
    let mut machine = Machine::new();

    let (deferred, resolver) = machine.pending();
    spawn(move || drop(resolver));

    machine.run()?;
    assert!(deferred.is_pending());

    Ok(())
}

#[test]
fn resolver_fails_once_machine_is_gone() {
    common::init();
    let mut machine = Machine::new();

    let (_deferred, resolver) = machine.pending();
    drop(machine);

    assert!(resolver.resolve(Box::new("unheard".to_owned())).is_err());
}

#[test]
fn watch_reports_outcomes() -> Result<()> {
    common::init();
    let mut machine = Machine::new();
    let scheduler   = machine.scheduler();

    let value  = Deferred::resolved(&scheduler, json!({"n": 1})).watch();
    let reason = Deferred::rejected(&scheduler, "e").watch();
    let coded  = Deferred::rejected(&scheduler, json!({"code": 7})).watch();

    let pending = Deferred::defer(&scheduler);
    let mut waiting = pending.deferred.watch();

    machine.run()?;
    assert_eq!(value.recv()?, json!({"n": 1}));

    let error = reason.recv().err().ok_or_else(|| anyhow!("expected rejection"))?;
    assert_eq!(error.to_string(), "e");
    assert_eq!(error.downcast_ref::<Rejected>(), Some(&Rejected(json!("e"))));

    let error = coded.recv().err().ok_or_else(|| anyhow!("expected rejection"))?;
    assert_eq!(error.to_string(), r#"{"code":7}"#);

    assert!(waiting.try_recv().is_none());
    drop(pending);
    let error = waiting.try_recv().and_then(Result::err).ok_or_else(|| anyhow!("expected drop"))?;
    assert_eq!(error.downcast_ref::<Dropped>(), Some(&Dropped));

    Ok(())
}

#[cfg(feature = "tokio")]
#[tokio::test]
async fn watch_can_be_awaited() -> Result<()> {
    let (tx, rx) = crossbeam_channel::bounded(1);

    let thread = spawn(move || -> Result<()> {
        let mut machine = Machine::new();
        let slow = delay(&mut machine, Duration::from_millis(20), json!("awaited"));
        let _ = tx.send(slow.then(|value| Ok(value)).watch());
        machine.run()?;
        Ok(())
    });

    let watch = tokio::task::spawn_blocking(move || rx.recv()).await??;
    assert_eq!(watch.await?, json!("awaited"));

    thread.join().map_err(|_| anyhow!("thread panicked"))??;

    Ok(())
}
