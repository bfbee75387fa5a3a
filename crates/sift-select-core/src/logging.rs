//! Logging facilities for sift-select.
//!
//! sift-select uses the `tracing` crate for instrumentation. To see logs,
//! install a tracing subscriber in the host application:
//!
//! ```ignore
//! fn main() {
//!     tracing_subscriber::fmt::init();
//!     // ...
//! }
//! ```
//!
//! Every event is emitted under one of the [`targets`], so a filter such as
//! `RUST_LOG=sift_select::sync=debug` isolates a single subsystem.

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Core primitives target.
    pub const CORE: &str = "sift_select_core";
    /// Signal/slot system target.
    pub const SIGNAL: &str = "sift_select_core::signal";
    /// Change batching and delivery target.
    pub const CHANGE: &str = "sift_select_core::change";
    /// Open-overlay registry target.
    pub const REGISTRY: &str = "sift_select_core::registry";
    /// Widget state machine target.
    pub const WIDGET: &str = "sift_select::widget";
    /// Native control synchronization target.
    pub const SYNC: &str = "sift_select::sync";
    /// Native control mutation target.
    pub const NATIVE: &str = "sift_select::native";
}

/// Span names used for widget operations.
pub mod span_names {
    /// Rebuild of option records after an external mutation batch.
    pub const REBUILD: &str = "sift_select::rebuild";
    /// Search filtering.
    pub const FILTER: &str = "sift_select::filter";
}

/// A guard that keeps a named operation span entered until dropped.
///
/// ```
/// use sift_select_core::logging::{OperationSpan, span_names};
///
/// let _span = OperationSpan::new(span_names::REBUILD);
/// // work measured by the subscriber happens here
/// ```
pub struct OperationSpan {
    #[allow(dead_code)]
    span: tracing::span::EnteredSpan,
}

impl OperationSpan {
    /// Enter a new span for `name`.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::debug_span!(target: "sift_select_core", "operation", operation = name);
        Self {
            span: span.entered(),
        }
    }
}
