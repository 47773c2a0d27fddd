pub use channel::{Dropped, Rejected, Rx, Tx};
pub use deferred::Continuation;
pub use deferred::Defer;
pub use deferred::Deferred;
pub use deferred::Reject;
pub use deferred::Resolve;
pub use deferred::State;
pub use error::TypeError;
pub use machine::Machine;
pub use machine::Schedule;
pub use machine::Scheduler;
pub use machine::Task;
pub use remote::Resolved;
pub use remote::Resolver;
pub use value::Callback;
pub use value::Thenable;
pub use value::Value;

mod all;
mod channel;
mod deferred;
mod error;
mod machine;
mod remote;
mod resolve;
mod value;
