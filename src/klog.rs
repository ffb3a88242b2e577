//! Kernel Logger
//!
//! Routes the `log` facade to the UART. Diagnostics (`log::warn!` on a
//! rejected pointer, `log::info!` on termination) go through here; the
//! user-visible exit line does not, it is written to the console
//! collaborator by the dispatcher.
//!
//! The boot crate installs this once before enabling traps. Hosted tests
//! never install it, so test diagnostics just vanish, which is fine.

use log::{LevelFilter, Metadata, Record};

use crate::kprintln;

struct UartLogger;

impl log::Log for UartLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            kprintln!("[{}] {}: {}", record.level(), record.target(), record.args());
        }
    }

    fn flush(&self) {}
}

static LOGGER: UartLogger = UartLogger;

/// Install the UART logger.
///
/// Safe to call more than once; later calls lose the race and are
/// ignored.
pub fn init(max_level: LevelFilter) {
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(max_level);
    }
}
