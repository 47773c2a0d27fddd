use std::cell::RefCell;
use std::mem::take;
use std::rc::Rc;
use serde_json::Value as Json;
use super::deferred::{Continuation, Defer, Deferred};
use super::error::TypeError;
use super::machine::Scheduler;
use super::resolve::follow;
use super::value::{Thenable, Value};

struct Tally {
    results: Vec<Value>,
    count:   usize,
}

impl Deferred {
    pub fn all(scheduler: &Scheduler, input: Value) -> Deferred {
        let items = match input {
            Value::List(items)              => items,
            Value::Json(Json::Array(items)) => items.into_iter().map(Value::Json).collect(),
            _                               => return Self::rejected(scheduler, TypeError::NotIterable),
        };

        Self::new(scheduler, move |resolve, reject| {
            if items.is_empty() {
                resolve.resolve(Value::List(Vec::new()));
                return Ok(());
            }

            let total = items.len();
            let tally = Rc::new(RefCell::new(Tally {
                results: vec![Value::default(); total],
                count:   0,
            }));

            let record = Rc::new(move |index: usize, value: Value| {
                let results = {
                    let mut tally = tally.borrow_mut();
                    tally.results[index] = value;
                    tally.count += 1;
                    match tally.count == total {
                        true  => Some(take(&mut tally.results)),
                        false => None,
                    }
                };
                if let Some(results) = results {
                    resolve.resolve(Value::List(results));
                }
            });

            for (index, item) in items.into_iter().enumerate() {
                let deferred = match item {
                    Value::Deferred(d) => d,
                    Value::Thenable(thenable) => match thenable.callable() {
                        Ok(true)  => adopt(scheduler, thenable),
                        Ok(false) => {
                            record(index, Value::Thenable(thenable));
                            continue;
                        }
                        Err(e) => {
                            reject.reject(e);
                            continue;
                        }
                    },
                    value => {
                        record(index, value);
                        continue;
                    }
                };

                let record = record.clone();
                let on_fulfilled: Continuation = Box::new(move |value| {
                    record(index, value);
                    Ok(Value::default())
                });
                let fail = reject.clone();
                let on_rejected: Continuation = Box::new(move |reason| {
                    fail.reject(reason);
                    Ok(Value::default())
                });
                deferred.then2(Some(on_fulfilled), Some(on_rejected));
            }

            Ok(())
        })
    }
}

fn adopt(scheduler: &Scheduler, thenable: Rc<dyn Thenable>) -> Deferred {
    let Defer { deferred, resolve, reject } = Deferred::defer(scheduler);
    follow(&deferred, thenable, resolve, reject);
    deferred
}
