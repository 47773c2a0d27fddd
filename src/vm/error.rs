use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TypeError {
    #[error("TypeError: chaining cycle detected for deferred")]
    Cycle,
    #[error("TypeError: argument is not iterable")]
    NotIterable,
}
