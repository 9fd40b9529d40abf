//! Logging service and logger sinks

use super::codes::Code;
use super::config;
use super::events::{LogEvent, LogLevel};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

pub trait Logger: Send + Sync {
    fn log(&self, event: &LogEvent);
}

/// Filters by level and forwards to a sink
pub struct LoggingService {
    logger: Arc<dyn Logger>,
    min_level: LogLevel,
}

impl LoggingService {
    pub fn new(logger: Arc<dyn Logger>, min_level: LogLevel) -> Self {
        Self { logger, min_level }
    }

    /// Service built from the runtime preferences; silent when console output is off
    pub fn with_config() -> Self {
        let logger: Arc<dyn Logger> = if !config::use_console_logging() {
            Arc::new(NullLogger)
        } else if config::use_structured_logging() {
            Arc::new(ConsoleLogger::json())
        } else {
            Arc::new(ConsoleLogger::text())
        };
        Self::new(logger, config::effective_min_level())
    }

    pub fn min_level(&self) -> LogLevel {
        self.min_level
    }

    pub fn should_log(&self, level: LogLevel) -> bool {
        level <= self.min_level
    }

    pub fn log_event(&self, event: LogEvent) {
        if self.should_log(event.level) {
            self.logger.log(&event);
        }
    }
}

/// Writes to stderr so stdout stays reserved for scan output
pub struct ConsoleLogger {
    structured: bool,
}

impl ConsoleLogger {
    pub fn text() -> Self {
        Self { structured: false }
    }

    pub fn json() -> Self {
        Self { structured: true }
    }
}

impl Logger for ConsoleLogger {
    fn log(&self, event: &LogEvent) {
        if !self.structured {
            eprintln!("{}", event.format());
            return;
        }
        match event.format_json() {
            Ok(json) => eprintln!("{}", json),
            Err(_) => eprintln!("{}", event.format()),
        }
    }
}

struct NullLogger;

impl Logger for NullLogger {
    fn log(&self, _event: &LogEvent) {}
}

/// Bounded in-memory sink; the oldest events are dropped first
pub struct MemoryLogger {
    events: Mutex<VecDeque<LogEvent>>,
    capacity: usize,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self::with_capacity(config::get_log_buffer_size())
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            events: Mutex::new(VecDeque::new()),
            capacity: capacity.max(1),
        }
    }

    fn with_events<R>(&self, f: impl FnOnce(&mut VecDeque<LogEvent>) -> R) -> R {
        match self.events.lock() {
            Ok(mut guard) => f(&mut guard),
            Err(poisoned) => f(&mut poisoned.into_inner()),
        }
    }

    pub fn events(&self) -> Vec<LogEvent> {
        self.with_events(|events| events.iter().cloned().collect())
    }

    pub fn event_count(&self) -> usize {
        self.with_events(|events| events.len())
    }

    pub fn clear(&self) {
        self.with_events(|events| events.clear());
    }

    pub fn events_with_code(&self, code: Code) -> Vec<LogEvent> {
        self.with_events(|events| events.iter().filter(|e| e.code == code).cloned().collect())
    }

    pub fn has_code(&self, code: Code) -> bool {
        self.with_events(|events| events.iter().any(|e| e.code == code))
    }

    pub fn error_count(&self) -> usize {
        self.with_events(|events| events.iter().filter(|e| e.is_error()).count())
    }
}

impl Default for MemoryLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl Logger for MemoryLogger {
    fn log(&self, event: &LogEvent) {
        let capacity = self.capacity;
        self.with_events(|events| {
            while events.len() >= capacity {
                events.pop_front();
            }
            events.push_back(event.clone());
        });
    }
}
