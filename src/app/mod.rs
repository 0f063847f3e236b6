//! Application core: pure domain logic, zero I/O.
//!
//! This module contains the business rules of the monitor: smoothing and
//! recording measurements, classifying humidity risk, and orchestrating a
//! sampling cycle.  All interaction with hardware and files happens
//! through **port traits** defined in [`ports`], keeping this layer fully
//! testable without real peripherals.

pub mod events;
pub mod monitor;
pub mod ports;
pub mod risk;
pub mod service;
