//! Core primitives for sift-select.
//!
//! This crate provides the building blocks the combobox widget is made of:
//!
//! - **Signal/Slot System**: Type-safe notification of interested parties
//! - **External Change Sources**: Batched observation of state the widget
//!   does not own
//! - **Open-Overlay Registry**: Page-wide "only one dropdown open" coordination
//! - **Logging**: `tracing` targets and spans used across the workspace
//!
//! # Signal/Slot Example
//!
//! ```
//! use sift_select_core::Signal;
//!
//! let selection_changed = Signal::<String>::new();
//! let conn_id = selection_changed.connect(|value| {
//!     println!("Selected: {}", value);
//! });
//!
//! selection_changed.emit("banana".to_string());
//! selection_changed.disconnect(conn_id);
//! ```
//!
//! # Change Source Example
//!
//! ```
//! use sift_select_core::{ChangeBatcher, ExternalChangeSource};
//!
//! let changes = ChangeBatcher::<&'static str>::new();
//! let handle = changes.subscribe(|batch| println!("{} changes", batch.len()));
//!
//! changes.record("option added");
//! changes.record("option disabled");
//! changes.flush(); // prints "2 changes"
//!
//! changes.unsubscribe(handle);
//! ```

pub mod change_source;
pub mod logging;
pub mod registry;
pub mod signal;

pub use change_source::{ChangeBatcher, ExternalChangeSource, SubscriptionHandle};
pub use logging::OperationSpan;
pub use registry::{OpenOverlayRegistry, OverlayId};
pub use signal::{ConnectionId, Signal};
