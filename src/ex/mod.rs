pub use delay::{delay, fail_after};

pub mod delay;
