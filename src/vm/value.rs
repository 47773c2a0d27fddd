use std::fmt;
use std::rc::Rc;
use anyhow::Error;
use serde_json::Value as Json;
use super::deferred::Deferred;
use super::error::TypeError;

#[derive(Clone)]
pub enum Value {
    Json(Json),
    List(Vec<Value>),
    Error(Rc<Error>),
    Thenable(Rc<dyn Thenable>),
    Deferred(Deferred),
}

/// A foreign object that may expose a `then` member.
///
/// Nothing about an implementation is trusted: `then` may call either
/// callback any number of times, synchronously or later, or never.
pub trait Thenable: 'static {
    fn callable(&self) -> Result<bool, Value> {
        Ok(true)
    }

    fn then(&self, on_value: Callback, on_reason: Callback) -> Result<(), Value>;
}

#[derive(Clone)]
pub struct Callback(Rc<dyn Fn(Value)>);

impl Callback {
    pub fn new<F: Fn(Value) + 'static>(f: F) -> Self {
        Self(Rc::new(f))
    }

    pub fn call(&self, value: impl Into<Value>) {
        (self.0)(value.into())
    }
}

impl Value {
    pub fn error(error: impl Into<Error>) -> Self {
        Value::Error(Rc::new(error.into()))
    }

    pub fn thenable<T: Thenable>(thenable: T) -> Self {
        Value::Thenable(Rc::new(thenable))
    }

    pub fn as_json(&self) -> Option<&Json> {
        match self {
            Value::Json(json) => Some(json),
            _                 => None,
        }
    }

    pub fn downcast_ref<E>(&self) -> Option<&E>
    where
        E: fmt::Display + fmt::Debug + Send + Sync + 'static,
    {
        match self {
            Value::Error(error) => error.downcast_ref::<E>(),
            _                   => None,
        }
    }

    pub fn is_cycle(&self) -> bool {
        self.downcast_ref::<TypeError>() == Some(&TypeError::Cycle)
    }

    pub fn to_json(&self) -> Json {
        match self {
            Value::Json(json)    => json.clone(),
            Value::List(items)   => items.iter().map(Value::to_json).collect(),
            Value::Error(error)  => Json::String(error.to_string()),
            Value::Thenable(_)   => Json::String("[object Thenable]".to_owned()),
            Value::Deferred(_)   => Json::String("[object Deferred]".to_owned()),
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::Json(Json::Null)
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Json(json)     => write!(f, "{json}"),
            Value::List(items)    => f.debug_list().entries(items).finish(),
            Value::Error(error)   => write!(f, "Error({error})"),
            Value::Thenable(_)    => f.write_str("Thenable"),
            Value::Deferred(d)    => fmt::Debug::fmt(d, f),
        }
    }
}

impl From<Json> for Value {
    fn from(json: Json) -> Self {
        Value::Json(json)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Json(s.into())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Json(s.into())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Json(b.into())
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Json(n.into())
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Json(n.into())
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Json(n.into())
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl From<Deferred> for Value {
    fn from(deferred: Deferred) -> Self {
        Value::Deferred(deferred)
    }
}

impl From<Error> for Value {
    fn from(error: Error) -> Self {
        Value::Error(Rc::new(error))
    }
}

impl From<TypeError> for Value {
    fn from(error: TypeError) -> Self {
        Value::error(error)
    }
}
