//! Injected reporting for pipeline stages.
//!
//! The classifier and the generator never reach for a global logger. They
//! receive a [`Reporter`] and call [`Reporter::report`] with a level and a
//! message. The binary wires in [`TracingReporter`], which forwards to the
//! `tracing` subscriber installed in `main`; tests wire in a recorder and
//! assert on what was reported.

use tracing::Level;

/// Sink for per-stage diagnostics (skipped projects, created directories).
pub trait Reporter {
    fn report(&self, level: Level, message: &str);

    fn info(&self, message: &str) {
        self.report(Level::INFO, message);
    }

    fn warn(&self, message: &str) {
        self.report(Level::WARN, message);
    }
}

/// Forwards reports to `tracing` events.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn report(&self, level: Level, message: &str) {
        // tracing macros need the level as a constant
        if level == Level::ERROR {
            tracing::error!("{message}");
        } else if level == Level::WARN {
            tracing::warn!("{message}");
        } else if level == Level::INFO {
            tracing::info!("{message}");
        } else if level == Level::DEBUG {
            tracing::debug!("{message}");
        } else {
            tracing::trace!("{message}");
        }
    }
}

/// Discards every report.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentReporter;

impl Reporter for SilentReporter {
    fn report(&self, _level: Level, _message: &str) {}
}
