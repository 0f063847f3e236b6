//! Warning LED driver, blink patterns, and worker-thread helpers.

pub mod led_patterns;
pub mod task;
pub mod warning_led;
