#[cfg(not(feature = "tokio"))]
use crossbeam_channel::{bounded, Sender, Receiver, TryRecvError};
#[cfg(feature = "tokio")]
use std::{future::Future, pin::Pin, task::{Context, Poll}};
use anyhow::Result;
use serde_json::Value;
use thiserror::Error;
#[cfg(feature = "tokio")]
use tokio::sync::oneshot::{channel, Sender, Receiver, error::TryRecvError};

type Outcome = Result<Value, Value>;

pub struct Tx(Sender<Outcome>);
pub struct Rx(Receiver<Outcome>);

#[derive(Debug, Error, PartialEq)]
#[error("{}", message(.0))]
pub struct Rejected(pub Value);

#[derive(Debug, Error, PartialEq, Eq)]
#[error("deferred dropped while pending")]
pub struct Dropped;

#[cfg(not(feature = "tokio"))]
fn channel<T>() -> (Sender<T>, Receiver<T>) {
    bounded(1)
}

pub fn oneshot() -> (Tx, Rx) {
    let (tx, rx) = channel();
    (Tx(tx), Rx(rx))
}

impl Tx {
    pub fn send(self, outcome: Outcome) {
        let _ = self.0.send(outcome);
    }
}

impl Rx {
    pub fn recv(self) -> Result<Value> {
        #[cfg(feature = "tokio")]
        let received = self.0.blocking_recv().ok();
        #[cfg(not(feature = "tokio"))]
        let received = self.0.recv().ok();
        unpack(received)
    }

    pub fn try_recv(&mut self) -> Option<Result<Value>> {
        match self.0.try_recv() {
            Ok(outcome)              => Some(unpack(Some(outcome))),
            Err(TryRecvError::Empty) => None,
            Err(_)                   => Some(unpack(None)),
        }
    }
}

#[cfg(feature = "tokio")]
impl Future for Rx {
    type Output = Result<Value>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.0).poll(cx) {
            Poll::Ready(r) => Poll::Ready(unpack(r.ok())),
            Poll::Pending  => Poll::Pending,
        }
    }
}

fn unpack(received: Option<Outcome>) -> Result<Value> {
    match received {
        Some(Ok(value))   => Ok(value),
        Some(Err(reason)) => Err(Rejected(reason).into()),
        None              => Err(Dropped.into()),
    }
}

fn message(reason: &Value) -> String {
    match reason {
        Value::String(s) => s.clone(),
        reason           => reason.to_string(),
    }
}
