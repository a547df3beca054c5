use chrono::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};

static ENABLED: AtomicBool = AtomicBool::new(false);

/// Turn logging on or off. Off by default, the prompt owns stdout.
pub fn enable(on: bool) {
    ENABLED.store(on, Ordering::Relaxed);
}

pub fn enabled() -> bool {
    ENABLED.load(Ordering::Relaxed)
}

/// Add a timestamp like `[hh:mm:ss] ` before the message and print it to stderr.
///
/// ## Usage
///
/// ```rust
/// use spike_console::logger;
///
/// logger::log("String literal");
/// logger::log(&format!("to format: {}", 10));
/// ```
pub fn log(msg: &str) {
    if !enabled() {
        return;
    }
    let now = Local::now();
    eprintln!("[{:0>2}:{:0>2}:{:0>2}] {msg}", now.hour(), now.minute(), now.second());
}
