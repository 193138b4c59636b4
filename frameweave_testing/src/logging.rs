//! Shared `log` capture for tests.

use std::sync::{Mutex, MutexGuard, OnceLock};

use log::Level;
use logtest::Logger;
use rstest::fixture;

/// Exclusive handle to the process-wide [`logtest::Logger`].
///
/// `log` allows one logger per process, so every test that inspects log
/// records goes through this guard. Holding it serialises those tests.
pub struct LoggerHandle {
    guard: MutexGuard<'static, Logger>,
}

impl LoggerHandle {
    /// Acquire the global [`Logger`] instance.
    ///
    /// # Panics
    ///
    /// Panics if a previous holder panicked while capturing.
    pub fn new() -> Self {
        static LOGGER: OnceLock<Mutex<Logger>> = OnceLock::new();

        let logger = LOGGER.get_or_init(|| Mutex::new(Logger::start()));
        let guard = logger.lock().expect("logger poisoned");

        Self { guard }
    }

    /// Discard every captured record.
    pub fn clear(&mut self) { while self.guard.pop().is_some() {} }

    /// Drain captured records, returning the messages logged at `level`
    /// that contain `needle`.
    pub fn drain_matching(&mut self, level: Level, needle: &str) -> Vec<String> {
        let mut matches = Vec::new();
        while let Some(record) = self.guard.pop() {
            let message = record.args().to_string();
            if record.level() == level && message.contains(needle) {
                matches.push(message);
            }
        }
        matches
    }
}

impl Default for LoggerHandle {
    fn default() -> Self { Self::new() }
}

impl std::ops::Deref for LoggerHandle {
    type Target = Logger;

    fn deref(&self) -> &Self::Target { &self.guard }
}

impl std::ops::DerefMut for LoggerHandle {
    fn deref_mut(&mut self) -> &mut Self::Target { &mut self.guard }
}

#[allow(
    unused_braces,
    reason = "rustc false positive for single line rstest fixtures"
)]
#[fixture]
pub fn logger() -> LoggerHandle { LoggerHandle::new() }
