//! Named worker threads.
//!
//! Every background thread in the monitor (blink task, status server) is
//! created here so names and stack sizes show up consistently in logs and
//! debuggers.  Stacks are kept small: the monitor targets single-board
//! hosts with little RAM to spare.

use std::io;
use std::thread::{self, JoinHandle};

/// Spawn `f` on a new thread named `name` with a `stack_kb` KiB stack.
///
/// Thread creation can fail under resource exhaustion; the error is
/// returned rather than panicking so callers can degrade gracefully.
pub fn spawn_named<T, F>(name: &'static str, stack_kb: usize, f: F) -> io::Result<JoinHandle<T>>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    log::debug!("Spawning '{}' (stack={}KB)", name, stack_kb);
    thread::Builder::new()
        .name(name.into())
        .stack_size(stack_kb * 1024)
        .spawn(f)
}
