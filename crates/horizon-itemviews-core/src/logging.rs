//! Logging and tracing facilities for Horizon Itemviews.
//!
//! This module provides:
//! - Target and span name constants for the `tracing` crate
//! - Performance tracing hooks for profiling
//! - Thin logging macros with consistent target naming
//!
//! # Tracing Integration
//!
//! Horizon Itemviews uses the `tracing` crate for instrumentation. To see logs,
//! install a tracing subscriber in your application:
//!
//! ```ignore
//! use tracing_subscriber::EnvFilter;
//!
//! tracing_subscriber::fmt()
//!     .with_env_filter(EnvFilter::new("horizon_itemviews::proxy=debug"))
//!     .init();
//! ```

/// Span names used throughout Horizon Itemviews for tracing.
///
/// These constants can be used to filter traces for specific subsystems.
pub mod span_names {
    /// Signal emission span.
    pub const SIGNAL: &str = "horizon_itemviews::signal";
    /// Full rebuild of a proxy projection.
    pub const PROXY_REBUILD: &str = "horizon_itemviews::proxy_rebuild";
    /// Processing of a selection delta by a proxy.
    pub const SELECTION_DELTA: &str = "horizon_itemviews::selection_delta";
}

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Core framework target.
    pub const CORE: &str = "horizon_itemviews_core";
    /// Signal/slot system target.
    pub const SIGNAL: &str = "horizon_itemviews_core::signal";
    /// Item model target (source trees and their notifications).
    pub const MODEL: &str = "horizon_itemviews::model";
    /// Selection model target.
    pub const SELECTION: &str = "horizon_itemviews::selection";
    /// Selection proxy target.
    pub const PROXY: &str = "horizon_itemviews::proxy";
    /// Performance spans.
    pub const PERF: &str = "horizon_itemviews::perf";
}

/// A guard that keeps a tracing span entered until it is dropped.
///
/// This is useful for tracking the duration of operations.
#[derive(Debug)]
pub struct PerfSpan {
    #[allow(dead_code)]
    span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Create a new performance span.
    ///
    /// The span will be active until the guard is dropped.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::info_span!(target: "horizon_itemviews::perf", "perf", operation = name);
        Self {
            span: span.entered(),
        }
    }
}

/// Macros for common tracing patterns.
///
/// These are just wrappers around the `tracing` crate macros with consistent
/// target naming.
#[macro_export]
macro_rules! itemviews_trace {
    ($($arg:tt)*) => {
        tracing::trace!(target: "horizon_itemviews_core", $($arg)*)
    };
}

#[macro_export]
macro_rules! itemviews_debug {
    ($($arg:tt)*) => {
        tracing::debug!(target: "horizon_itemviews_core", $($arg)*)
    };
}

#[macro_export]
macro_rules! itemviews_info {
    ($($arg:tt)*) => {
        tracing::info!(target: "horizon_itemviews_core", $($arg)*)
    };
}

#[macro_export]
macro_rules! itemviews_warn {
    ($($arg:tt)*) => {
        tracing::warn!(target: "horizon_itemviews_core", $($arg)*)
    };
}

#[macro_export]
macro_rules! itemviews_error {
    ($($arg:tt)*) => {
        tracing::error!(target: "horizon_itemviews_core", $($arg)*)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_targets_share_prefix() {
        for target in [targets::MODEL, targets::SELECTION, targets::PROXY, targets::PERF] {
            assert!(target.starts_with("horizon_itemviews::"));
        }
        assert!(targets::SIGNAL.starts_with(targets::CORE));
    }

    #[test]
    fn test_perf_span() {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
        // Just ensure it enters and drops cleanly
        let span = PerfSpan::new("test_operation");
        drop(span);
    }

    #[test]
    fn test_macros_expand() {
        crate::itemviews_trace!("trace {}", 1);
        crate::itemviews_debug!(value = 2, "debug");
        crate::itemviews_info!("info");
        crate::itemviews_warn!("warn");
        crate::itemviews_error!("error");
    }
}
