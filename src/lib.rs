pub mod ex;
pub mod vm;

pub use vm::{Deferred, Machine, Value};
