//! Adapter implementations of the mirror ports.

pub mod memory;
pub mod postgres;
