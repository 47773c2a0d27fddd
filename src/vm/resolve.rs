use std::cell::Cell;
use std::rc::Rc;
use tracing::{debug, trace};
use super::deferred::{Continuation, Deferred, Reject, Resolve};
use super::error::TypeError;
use super::value::{Callback, Thenable, Value};

pub fn settle(target: &Deferred, x: Value, resolve: Resolve, reject: Reject) {
    match x {
        Value::Deferred(d) if d.ptr_eq(target) => {
            debug!("chaining cycle detected");
            reject.reject(TypeError::Cycle);
        }
        Value::Deferred(d) => {
            let (next, fail) = (target.clone(), reject.clone());
            let on_fulfilled: Continuation = Box::new(move |y| {
                settle(&next, y, resolve, fail);
                Ok(Value::default())
            });
            let on_rejected: Continuation = Box::new(move |r| {
                reject.reject(r);
                Ok(Value::default())
            });
            d.then2(Some(on_fulfilled), Some(on_rejected));
        }
        Value::Thenable(thenable) => match thenable.callable() {
            Ok(true)  => follow(target, thenable, resolve, reject),
            Ok(false) => resolve.resolve(Value::Thenable(thenable)),
            Err(e)    => reject.reject(e),
        },
        x => resolve.resolve(x),
    }
}

pub fn follow(target: &Deferred, thenable: Rc<dyn Thenable>, resolve: Resolve, reject: Reject) {
    let called = Rc::new(Cell::new(false));

    let on_value = {
        let (called, target) = (called.clone(), target.clone());
        let (resolve, reject) = (resolve, reject.clone());
        Callback::new(move |y| {
            if !called.replace(true) {
                settle(&target, y, resolve.clone(), reject.clone());
            }
        })
    };

    let on_reason = {
        let (called, reject) = (called.clone(), reject.clone());
        Callback::new(move |r| {
            if !called.replace(true) {
                reject.reject(r);
            }
        })
    };

    if let Err(e) = thenable.then(on_value, on_reason) {
        match called.replace(true) {
            true  => trace!("thenable fault after settlement discarded"),
            false => reject.reject(e),
        }
    }
}
