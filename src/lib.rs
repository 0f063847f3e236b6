//! pimon: DHTxx humidity monitor library.
//!
//! Exposes the pure-logic modules (decoder, retry policies, classifier,
//! monitor, service) and the host adapters for integration testing and
//! for the `pimon` binary.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod drivers;
pub mod error;
pub mod measurement;
pub mod pins;
pub mod sensors;
pub mod shutdown;
