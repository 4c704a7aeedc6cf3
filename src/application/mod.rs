//! Application layer - Use cases and the ports they depend on
//!
//! Services here only talk to the outside world through the outbound port
//! traits, so every platform side effect can be swapped for an in-memory
//! implementation.

pub mod ports;
pub mod services;
