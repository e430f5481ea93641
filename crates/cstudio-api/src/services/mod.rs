//! Business logic services.

pub mod funnels;

pub use funnels::{FunnelStore, MemoryFunnelStore};
