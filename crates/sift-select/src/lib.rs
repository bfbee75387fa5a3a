//! sift-select - A searchable combobox that mirrors a native selection control.
//!
//! A [`SearchSelect`] enhances a single-selection [`NativeSelect`] with a
//! filterable, keyboard-navigable dropdown. The native control stays the
//! source of truth: the widget rebuilds its option list whenever the
//! control's options change, and writes the user's choice back to the
//! control before notifying its listeners.
//!
//! The page the controls live on is a [`Document`]. It keeps at most one
//! dropdown open at a time, routes clicks so dropdowns close when the user
//! clicks elsewhere, and tracks keyboard focus.
//!
//! # Example
//!
//! ```
//! use sift_select::prelude::*;
//!
//! let document = Document::new();
//! let country = document
//!     .create_select()
//!     .with_id("country")
//!     .options([
//!         NativeOption::new("", "Choose a country"),
//!         NativeOption::new("de", "Germany"),
//!         NativeOption::new("dk", "Denmark"),
//!         NativeOption::new("fr", "France"),
//!     ])
//!     .build();
//!
//! let widget = SearchSelect::new(country.clone())?;
//! widget.focus_display();
//! widget.handle_key(KeyEvent::new(Key::ArrowDown));
//! widget.input_search("den");
//! widget.handle_key(KeyEvent::new(Key::Enter));
//!
//! assert_eq!(country.value(), "dk");
//! # Ok::<(), sift_select::Error>(())
//! ```

pub mod config;
pub mod document;
pub mod error;
pub mod keyboard;
pub mod native;
pub mod option;
pub mod overlay;
pub mod prelude;
pub mod state;
pub mod widget;

pub use config::SearchSelectConfig;
pub use document::{ClickTarget, Document, FocusTarget};
pub use error::{Error, Result};
pub use keyboard::{Key, KeyEvent, KeyOutcome, KeyboardModifiers};
pub use native::{
    ChangeEvent, MutationRecord, NativeOption, NativeSelect, NativeSelectBuilder, OptionAttribute,
};
pub use option::OptionRecord;
pub use overlay::{AccessibleRole, DisplayView, DropdownView, OptionView, OverlayView, SearchView};
pub use state::WidgetState;
pub use widget::SearchSelect;

pub use sift_select_core::{
    ChangeBatcher, ConnectionId, ExternalChangeSource, OpenOverlayRegistry, OverlayId, Signal,
    SubscriptionHandle,
};
