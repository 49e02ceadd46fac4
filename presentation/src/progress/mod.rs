//! Execution progress display

pub mod reporter;
