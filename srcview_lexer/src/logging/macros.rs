//! Logging macros taking `"key" => value` context pairs
//!
//! Values only need `Display`. Every macro is a no-op until a global service
//! is installed, and debug context is not formatted unless debug is enabled.

#[doc(hidden)]
#[macro_export]
macro_rules! __log_dispatch {
    ($event:expr, $span:expr $(, $key:expr => $value:expr)*) => {
        $crate::logging::dispatch_with_context(
            $event,
            $span,
            &[$(($key, format!("{}", $value))),*],
        )
    };
}

#[macro_export]
macro_rules! log_error {
    ($code:expr, $message:expr, span = $span:expr $(, $key:expr => $value:expr)* $(,)?) => {
        $crate::__log_dispatch!(
            $crate::logging::LogEvent::error($code, $message),
            Some($span)
            $(, $key => $value)*
        )
    };

    ($code:expr, $message:expr $(, $key:expr => $value:expr)* $(,)?) => {
        $crate::__log_dispatch!(
            $crate::logging::LogEvent::error($code, $message),
            None
            $(, $key => $value)*
        )
    };
}

#[macro_export]
macro_rules! log_success {
    ($code:expr, $message:expr $(, $key:expr => $value:expr)* $(,)?) => {
        $crate::__log_dispatch!(
            $crate::logging::LogEvent::success($code, $message),
            None
            $(, $key => $value)*
        )
    };
}

#[macro_export]
macro_rules! log_info {
    ($message:expr $(, $key:expr => $value:expr)* $(,)?) => {
        $crate::__log_dispatch!(
            $crate::logging::LogEvent::info($message),
            None
            $(, $key => $value)*
        )
    };
}

/// `code = CODE` as the first argument attaches a specific warning code.
#[macro_export]
macro_rules! log_warning {
    (code = $code:expr, $message:expr $(, $key:expr => $value:expr)* $(,)?) => {
        $crate::__log_dispatch!(
            $crate::logging::LogEvent::warning_with_code($code, $message),
            None
            $(, $key => $value)*
        )
    };

    ($message:expr $(, $key:expr => $value:expr)* $(,)?) => {
        $crate::__log_dispatch!(
            $crate::logging::LogEvent::warning($message),
            None
            $(, $key => $value)*
        )
    };
}

#[macro_export]
macro_rules! log_debug {
    ($message:expr $(, $key:expr => $value:expr)* $(,)?) => {
        if $crate::logging::enabled($crate::logging::LogLevel::Debug) {
            $crate::__log_dispatch!(
                $crate::logging::LogEvent::debug($message),
                None
                $(, $key => $value)*
            )
        }
    };
}

/// Success event with a `duration_ms` entry ahead of the other pairs
#[macro_export]
macro_rules! log_performance {
    ($code:expr, $message:expr, duration = $duration:expr $(, $key:expr => $value:expr)* $(,)?) => {
        $crate::log_success!($code, $message,
            "duration_ms" => format!("{:.3}", $duration.as_secs_f64() * 1000.0)
            $(, $key => $value)*
        )
    };
}

#[cfg(test)]
mod tests {
    use crate::logging::codes;
    use crate::utils::{Position, Span};

    #[test]
    fn test_macros_without_global_logger() {
        let duration = std::time::Duration::from_millis(150);

        log_error!(codes::lexical::PRECONDITION_VIOLATION, "Cast split on a non-cast token",
            span = Span::covering(Position::new(0, 1), "int"),
            "kind" => "T_STRING"
        );
        log_error!(codes::file_processing::EMPTY_FILE, "File is empty");
        log_success!(codes::success::SCAN_COMPLETE, "Scan completed", "tokens" => 42);
        log_info!("Loading token dump", "is_large" => false);
        log_warning!(code = codes::scanner::CANDIDATE_OVERFLOW, "Candidate discarded",
            "opener" => "use"
        );
        log_warning!("Unbalanced input");
        log_debug!("Builder opened", "builder" => "namespace");
        log_performance!(codes::success::FILE_PROCESSING_SUCCESS, "Token dump processed",
            duration = duration,
            "tokens" => 42
        );
    }
}
