//! Prelude module for sift-select.
//!
//! This module re-exports the most commonly used types for convenient importing:
//!
//! ```
//! use sift_select::prelude::*;
//! ```

// ============================================================================
// Page and Native Control
// ============================================================================

pub use crate::document::{ClickTarget, Document, FocusTarget};
pub use crate::native::{ChangeEvent, NativeOption, NativeSelect};

// ============================================================================
// Widget
// ============================================================================

pub use crate::config::SearchSelectConfig;
pub use crate::keyboard::{Key, KeyEvent, KeyOutcome};
pub use crate::widget::SearchSelect;

// ============================================================================
// Signal/Slot System
// ============================================================================

pub use sift_select_core::{ConnectionId, Signal};
