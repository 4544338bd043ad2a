pub mod invocation;
pub mod mood;
