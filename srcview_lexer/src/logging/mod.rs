//! Global logging for the srcview lexer
//!
//! A process-wide service in a `OnceLock`, a per-thread file context and the
//! `log_*!` macros. Every entry point is a no-op until `init_global_logging`
//! has run, so library users and tests can scan without configuring anything.

pub mod codes;
pub mod config;
pub mod events;
pub mod macros;
pub mod service;

use std::cell::RefCell;
use std::path::PathBuf;
use std::sync::{Arc, OnceLock};

pub use codes::Code;
pub use events::{LogEvent, LogLevel};
pub use service::{ConsoleLogger, Logger, LoggingService, MemoryLogger};

static GLOBAL_LOGGER: OnceLock<Arc<LoggingService>> = OnceLock::new();

/// Token dump currently being processed on this thread
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileContext {
    pub file_path: PathBuf,
    pub file_id: usize,
    /// Events dispatched while this context was set
    pub emitted: usize,
}

thread_local! {
    static FILE_CONTEXT: RefCell<Option<FileContext>> = const { RefCell::new(None) };
}

pub fn init_global_logging() -> Result<(), String> {
    config::validate_config().map_err(|e| format!("Configuration validation failed: {}", e))?;

    for code in [
        codes::system::INTERNAL_ERROR,
        codes::lexical::PRECONDITION_VIOLATION,
        codes::scanner::SCAN_HALTED,
    ] {
        if codes::get_error_metadata(code.as_str()).is_none() {
            return Err(format!("Missing metadata for error code: {}", code));
        }
    }

    init_global_logging_with_service(Arc::new(LoggingService::with_config()))?;

    crate::log_success!(
        codes::success::SYSTEM_INITIALIZATION_COMPLETED,
        "Global logging system initialized",
        "build_config" => crate::config::build_info::source_info()
    );
    Ok(())
}

/// Install a custom service (tests, embedding applications)
pub fn init_global_logging_with_service(service: Arc<LoggingService>) -> Result<(), String> {
    GLOBAL_LOGGER
        .set(service)
        .map_err(|_| "Global logger already initialized".to_string())
}

pub fn is_initialized() -> bool {
    GLOBAL_LOGGER.get().is_some()
}

pub fn try_get_global_logger() -> Option<&'static LoggingService> {
    GLOBAL_LOGGER.get().map(|service| service.as_ref())
}

/// Whether an event at `level` would reach a sink
pub fn enabled(level: LogLevel) -> bool {
    try_get_global_logger().is_some_and(|logger| logger.should_log(level))
}

pub fn set_file_context(file_path: PathBuf, file_id: usize) {
    FILE_CONTEXT.with(|ctx| {
        *ctx.borrow_mut() = Some(FileContext {
            file_path,
            file_id,
            emitted: 0,
        });
    });
}

pub fn clear_file_context() {
    FILE_CONTEXT.with(|ctx| {
        *ctx.borrow_mut() = None;
    });
}

/// Run `f` with a file context that is cleared afterwards
pub fn with_file_context<F, R>(file_path: PathBuf, file_id: usize, f: F) -> R
where
    F: FnOnce() -> R,
{
    set_file_context(file_path, file_id);
    let result = f();
    clear_file_context();
    result
}

pub fn get_current_file_context() -> Option<FileContext> {
    FILE_CONTEXT.with(|ctx| ctx.borrow().clone())
}

/// Attach file context, enforce the per-file cap and hand the event to the
/// global service. Errors are never capped.
pub fn dispatch(event: LogEvent) {
    let Some(logger) = try_get_global_logger() else {
        return;
    };
    if !logger.should_log(event.level) {
        return;
    }

    let event = FILE_CONTEXT.with(|ctx| {
        let mut ctx = ctx.borrow_mut();
        let Some(file_ctx) = ctx.as_mut() else {
            return Some(event);
        };
        if !event.is_error() && file_ctx.emitted >= config::get_max_log_events_per_file() {
            return None;
        }
        file_ctx.emitted += 1;
        if config::include_file_context() {
            Some(event.with_context("file", &file_ctx.file_path.display().to_string()))
        } else {
            Some(event)
        }
    });

    if let Some(event) = event {
        logger.log_event(event);
    }
}

/// Build an event from macro arguments and dispatch it
pub fn dispatch_with_context(
    event: LogEvent,
    span: Option<crate::utils::Span>,
    context: &[(&str, String)],
) {
    let mut event = event;
    if let Some(span) = span {
        event = event.with_span(span);
    }
    for (key, value) in context {
        event = event.with_context(key, value);
    }
    dispatch(event);
}

/// Error logging that still reaches stderr when no service is installed
pub fn safe_log_error(code: Code, message: &str) {
    if is_initialized() {
        dispatch(LogEvent::error(code, message));
    } else {
        eprintln!("[ERROR] FALLBACK: [{}] {}", code, message);
    }
}
