//! Use cases for the application layer

pub mod collect;
pub mod dispatch;
pub mod run_consensus;
