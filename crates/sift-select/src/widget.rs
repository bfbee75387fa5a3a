//! The searchable select widget.
//!
//! [`SearchSelect`] enhances a [`NativeSelect`] with a combobox overlay: a
//! display affordance showing the current selection, and a dropdown with a
//! search field and a filterable option list. The native control stays the
//! source of truth for the selection; the widget mirrors it and writes back
//! whenever the user commits a choice.
//!
//! # Lifecycle
//!
//! Construction hides the native control, mounts the overlay in the
//! control's [`Document`], enrolls with the page's
//! [`OpenOverlayRegistry`](sift_select_core::OpenOverlayRegistry) and
//! subscribes to the control's external mutations and to document clicks.
//! [`SearchSelect::destroy`] undoes all of that. Dropping a widget without
//! destroying it leaves its subscriptions registered; they only hold weak
//! references and do nothing once the widget is gone.
//!
//! # Example
//!
//! ```
//! use sift_select::prelude::*;
//!
//! let document = Document::new();
//! let fruit = document
//!     .create_select()
//!     .with_id("fruit")
//!     .option(NativeOption::new("", "Pick a fruit"))
//!     .option(NativeOption::new("apple", "Apple"))
//!     .option(NativeOption::new("banana", "Banana"))
//!     .build();
//!
//! let widget = SearchSelect::new(fruit.clone()).unwrap();
//! assert_eq!(widget.display_text(), "Pick a fruit");
//!
//! widget.open();
//! widget.input_search("ban");
//! widget.handle_key(KeyEvent::new(Key::Enter));
//!
//! assert_eq!(fruit.value(), "banana");
//! assert_eq!(widget.display_text(), "Banana");
//! assert!(!widget.is_open());
//! ```

use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use sift_select_core::logging::{OperationSpan, span_names, targets};
use sift_select_core::{ConnectionId, ExternalChangeSource, OverlayId, SubscriptionHandle};

use crate::config::SearchSelectConfig;
use crate::document::{ClickTarget, Document, FocusTarget};
use crate::error::{Error, Result};
use crate::keyboard::{Key, KeyEvent, KeyOutcome};
use crate::native::{MutationRecord, NativeOption, NativeSelect};
use crate::option::{OptionRecord, records_from_native};
use crate::overlay::{OverlayView, ProjectionContext};
use crate::state::{Step, WidgetState};

/// Class added to a native control while a widget enhances it.
pub const HIDDEN_CLASS: &str = "search-select-hidden";

/// Where keyboard focus goes when the dropdown closes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Refocus {
    /// Always move focus to the display.
    Always,
    /// Move focus to the display only if it was inside the overlay.
    IfInside,
}

/// Native attribute values replaced while the control is hidden.
#[derive(Debug)]
struct NativeSnapshot {
    tabindex: Option<String>,
    aria_hidden: Option<String>,
}

#[derive(Debug)]
struct Subscriptions {
    mutations: SubscriptionHandle,
    clicks: ConnectionId,
}

#[derive(Debug)]
struct Inner {
    state: WidgetState,
    generation: u64,
    placeholder: String,
    destroyed: bool,
}

struct Shared {
    id: OverlayId,
    native: Arc<NativeSelect>,
    document: Weak<Document>,
    config: SearchSelectConfig,
    restore: NativeSnapshot,
    inner: Mutex<Inner>,
    subscriptions: Mutex<Option<Subscriptions>>,
}

/// A searchable, keyboard-navigable combobox mirroring a native control.
///
/// All operations are no-ops after [`destroy`](Self::destroy).
pub struct SearchSelect {
    shared: Arc<Shared>,
}

static_assertions::assert_impl_all!(SearchSelect: Send, Sync);

impl SearchSelect {
    /// Enhance `native` with the default configuration.
    pub fn new(native: Arc<NativeSelect>) -> Result<Self> {
        Self::with_config(native, SearchSelectConfig::default())
    }

    /// Enhance `native`.
    ///
    /// Fails if the control is detached from its document, allows multiple
    /// selection, or is already enhanced by another widget.
    pub fn with_config(native: Arc<NativeSelect>, config: SearchSelectConfig) -> Result<Self> {
        let document = native
            .document()
            .ok_or_else(|| Error::invalid_control(native.id(), "control is detached from its document"))?;
        if native.is_multiple() {
            return Err(Error::invalid_control(
                native.id(),
                "control allows multiple selection",
            ));
        }
        if native.has_class(HIDDEN_CLASS) {
            return Err(Error::invalid_control(
                native.id(),
                "control is already enhanced by another widget",
            ));
        }

        let restore = NativeSnapshot {
            tabindex: native.attribute("tabindex"),
            aria_hidden: native.attribute("aria-hidden"),
        };
        let options = native.options();
        let placeholder = placeholder_for(&options, &config);

        let shared = Arc::new_cyclic(|weak: &Weak<Shared>| {
            let hook = weak.clone();
            let id = document.overlays().enroll(move || {
                if let Some(shared) = hook.upgrade() {
                    shared.close(Refocus::IfInside);
                }
            });
            let token = match native.id() {
                Some(control_id) if !control_id.is_empty() => control_id.to_owned(),
                _ => id.as_raw().to_string(),
            };
            let records = records_from_native(&options, &config.id_prefix, &token);

            Shared {
                id,
                native: native.clone(),
                document: Arc::downgrade(&document),
                config,
                restore,
                inner: Mutex::new(Inner {
                    state: WidgetState::new(records),
                    generation: 0,
                    placeholder,
                    destroyed: false,
                }),
                subscriptions: Mutex::new(None),
            }
        });

        document.mount(shared.id, native.id().map(str::to_owned));
        native.add_class(HIDDEN_CLASS);
        native.set_attribute("tabindex", "-1");
        native.set_attribute("aria-hidden", "true");

        let weak = Arc::downgrade(&shared);
        let mutations = native.subscribe(move |batch: &[MutationRecord]| {
            if let Some(shared) = weak.upgrade() {
                shared.on_mutations(batch);
            }
        });
        let weak = Arc::downgrade(&shared);
        let clicks = document.clicked.connect(move |target: &ClickTarget| {
            if let Some(shared) = weak.upgrade() {
                shared.on_document_click(target);
            }
        });
        *shared.subscriptions.lock() = Some(Subscriptions { mutations, clicks });

        tracing::debug!(
            target: targets::WIDGET,
            overlay = shared.id.as_raw(),
            control = ?native.id(),
            options = options.len(),
            "search select created"
        );
        Ok(Self { shared })
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// The overlay id of this widget in its document.
    pub fn id(&self) -> OverlayId {
        self.shared.id
    }

    /// The native control this widget enhances.
    pub fn native(&self) -> &Arc<NativeSelect> {
        &self.shared.native
    }

    /// The widget configuration.
    pub fn config(&self) -> &SearchSelectConfig {
        &self.shared.config
    }

    /// Whether the dropdown is open.
    pub fn is_open(&self) -> bool {
        self.shared.inner.lock().state.is_open()
    }

    /// Whether [`destroy`](Self::destroy) was called.
    pub fn is_destroyed(&self) -> bool {
        self.shared.inner.lock().destroyed
    }

    /// A snapshot of the widget's state.
    pub fn state(&self) -> WidgetState {
        self.shared.inner.lock().state.clone()
    }

    /// The selected option.
    pub fn selected(&self) -> Option<OptionRecord> {
        self.shared.inner.lock().state.selected().cloned()
    }

    /// The highlighted option.
    pub fn highlighted(&self) -> Option<OptionRecord> {
        self.shared.inner.lock().state.highlighted().cloned()
    }

    /// Number of times the option records were rebuilt from the native control.
    pub fn generation(&self) -> u64 {
        self.shared.inner.lock().generation
    }

    /// Text of the display affordance.
    pub fn display_text(&self) -> String {
        let inner = self.shared.inner.lock();
        match inner.state.selected() {
            Some(record) if !record.value.is_empty() => record.label.clone(),
            _ => inner.placeholder.clone(),
        }
    }

    /// The rendered overlay, or `None` once destroyed.
    pub fn view(&self) -> Option<OverlayView> {
        self.shared.view()
    }

    // =========================================================================
    // Dropdown
    // =========================================================================

    /// Open the dropdown, closing whichever other dropdown on the page is open.
    ///
    /// Focus moves to the search field and the selection (or the first
    /// eligible option) is highlighted. Returns `false` if the dropdown was
    /// already open.
    pub fn open(&self) -> bool {
        self.shared.open()
    }

    /// Close the dropdown, clearing the search and returning focus to the
    /// display. Returns `false` if it was not open.
    pub fn close(&self) -> bool {
        self.shared.close(Refocus::Always)
    }

    /// Open the dropdown if closed, otherwise close it.
    ///
    /// Returns whether the dropdown is open afterwards.
    pub fn toggle(&self) -> bool {
        if self.is_open() {
            self.close();
        } else {
            self.open();
        }
        self.is_open()
    }

    // =========================================================================
    // List
    // =========================================================================

    /// Hide every option whose label does not contain `text`, ignoring case
    /// and surrounding whitespace, and highlight the first eligible option.
    ///
    /// Returns the new highlight.
    pub fn filter(&self, text: &str) -> Option<usize> {
        self.shared.filter(text)
    }

    /// Highlight the option at `index`.
    ///
    /// A hidden, disabled or missing option falls back to the first eligible
    /// one. Returns the new highlight.
    pub fn highlight(&self, index: usize) -> Option<usize> {
        let mut inner = self.shared.inner.lock();
        if inner.destroyed {
            return None;
        }
        let highlighted = inner.state.highlight(index);
        inner.state.scroll_highlight_into_view(self.shared.config.max_visible_items);
        tracing::trace!(target: targets::WIDGET, requested = index, ?highlighted, "highlight");
        highlighted
    }

    /// Make `record` the selection and notify the native control's listeners.
    ///
    /// `record` is resolved against the current options, by id and then by
    /// value, so copies taken before a rebuild still work. Disabled or
    /// unknown options are ignored. Returns `true` if the selection changed.
    pub fn select(&self, record: &OptionRecord) -> bool {
        if record.disabled {
            tracing::debug!(target: targets::WIDGET, value = %record.value, "ignoring selection of disabled option");
            return false;
        }
        self.shared.commit(|state| {
            state
                .options()
                .iter()
                .position(|r| r.id == record.id && r.value == record.value)
                .or_else(|| state.position_of_value(&record.value))
        })
    }

    /// Select the option with the given value.
    pub fn select_value(&self, value: &str) -> bool {
        self.shared.commit(|state| state.position_of_value(value))
    }

    // =========================================================================
    // Input
    // =========================================================================

    /// Handle a key press delivered to the overlay.
    ///
    /// While closed, only keys pressed on the focused display are handled:
    /// Enter and Space open the dropdown, ArrowDown and ArrowUp open it on
    /// the first or last eligible option. While open, the arrows move the
    /// highlight with wrap-around, Home and End jump to the ends, Enter and
    /// Space commit the highlight, Escape and Tab close.
    ///
    /// Modifiers are ignored: Shift+Tab closes and passes through like Tab.
    pub fn handle_key(&self, event: KeyEvent) -> KeyOutcome {
        self.shared.handle_key(event)
    }

    /// A click on the display affordance: toggles the dropdown.
    ///
    /// The click does not reach the document. Returns whether the dropdown
    /// is open afterwards.
    pub fn click_display(&self) -> bool {
        if let Some(document) = self.shared.document.upgrade()
            && !self.is_destroyed()
        {
            document.set_focus(FocusTarget::Display(self.shared.id));
        }
        self.toggle()
    }

    /// A click on the option at `index`.
    ///
    /// Visible, enabled options are selected and the dropdown closes; clicks
    /// on anything else are ignored. Returns `true` if the click was handled.
    pub fn click_option(&self, index: usize) -> bool {
        if !self.shared.is_open_on_eligible(index) {
            tracing::debug!(target: targets::WIDGET, index, "ignoring click on unavailable option");
            return false;
        }
        self.shared.commit(|_| Some(index));
        self.shared.close(Refocus::Always);
        true
    }

    /// The pointer entered the option at `index`.
    ///
    /// Visible, enabled options become highlighted.
    pub fn hover_option(&self, index: usize) -> bool {
        if !self.shared.is_open_on_eligible(index) {
            return false;
        }
        self.highlight(index) == Some(index)
    }

    /// The user edited the search field.
    ///
    /// Returns `false` if the dropdown is closed and the field is not shown.
    pub fn input_search(&self, text: &str) -> bool {
        if !self.is_open() {
            return false;
        }
        self.filter(text);
        true
    }

    /// Move keyboard focus to the display affordance.
    pub fn focus_display(&self) {
        if let Some(document) = self.shared.document.upgrade()
            && !self.is_destroyed()
        {
            document.set_focus(FocusTarget::Display(self.shared.id));
        }
    }

    // =========================================================================
    // Teardown
    // =========================================================================

    /// Remove the overlay and restore the native control.
    ///
    /// Unsubscribes from the native control and the document, leaves the
    /// open-overlay registry and restores the control's class list and its
    /// `tabindex` and `aria-hidden` attributes. Returns `false` if the widget
    /// was already destroyed.
    pub fn destroy(&self) -> bool {
        self.shared.destroy()
    }
}

impl std::fmt::Debug for SearchSelect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.shared.inner.lock();
        f.debug_struct("SearchSelect")
            .field("id", &self.shared.id)
            .field("control", &self.shared.native.id())
            .field("is_open", &inner.state.is_open())
            .field("selected_index", &inner.state.selected_index())
            .field("highlighted_index", &inner.state.highlighted_index())
            .field("destroyed", &inner.destroyed)
            .finish()
    }
}

impl Shared {
    fn rows(&self) -> usize {
        self.config.max_visible_items
    }

    fn is_open_on_eligible(&self, index: usize) -> bool {
        let inner = self.inner.lock();
        !inner.destroyed && inner.state.is_open() && inner.state.is_eligible(index)
    }

    fn open(&self) -> bool {
        let Some(document) = self.document.upgrade() else {
            return false;
        };
        {
            let inner = self.inner.lock();
            if inner.destroyed {
                return false;
            }
            if inner.state.is_open() {
                drop(inner);
                document.set_focus(FocusTarget::Search(self.id));
                return false;
            }
        }

        // The registry closes the previously open overlay; that must happen
        // without our own state locked.
        document.overlays().register_open(self.id);

        let highlighted = {
            let mut inner = self.inner.lock();
            if inner.destroyed {
                return false;
            }
            inner.state.set_open(true);
            let highlighted = inner.state.reset_highlight();
            inner.state.reset_scroll();
            inner.state.scroll_highlight_into_view(self.rows());
            highlighted
        };
        document.set_focus(FocusTarget::Search(self.id));
        tracing::debug!(target: targets::WIDGET, overlay = self.id.as_raw(), ?highlighted, "dropdown opened");
        true
    }

    fn close(&self, refocus: Refocus) -> bool {
        {
            let mut inner = self.inner.lock();
            if inner.destroyed || !inner.state.is_open() {
                return false;
            }
            inner.state.set_open(false);
            inner.state.apply_filter("");
            inner.state.clear_highlight();
            inner.state.reset_scroll();
        }

        if let Some(document) = self.document.upgrade() {
            document.overlays().clear(self.id);
            let move_focus = match refocus {
                Refocus::Always => true,
                Refocus::IfInside => {
                    document.has_focus(&FocusTarget::Search(self.id))
                        || document.has_focus(&FocusTarget::Display(self.id))
                }
            };
            if move_focus {
                document.set_focus(FocusTarget::Display(self.id));
            }
        }
        tracing::debug!(target: targets::WIDGET, overlay = self.id.as_raw(), ?refocus, "dropdown closed");
        true
    }

    fn filter(&self, text: &str) -> Option<usize> {
        let _span = OperationSpan::new(span_names::FILTER);
        let mut inner = self.inner.lock();
        if inner.destroyed {
            return None;
        }
        let highlighted = inner.state.apply_filter(text);
        inner.state.reset_scroll();
        inner.state.scroll_highlight_into_view(self.rows());
        tracing::trace!(
            target: targets::WIDGET,
            text,
            visible = inner.state.visible_count(),
            ?highlighted,
            "options filtered"
        );
        highlighted
    }

    /// Select the option `resolve` picks, then dispatch the change
    /// notification with the state unlocked.
    fn commit<F>(&self, resolve: F) -> bool
    where
        F: FnOnce(&WidgetState) -> Option<usize>,
    {
        {
            let mut inner = self.inner.lock();
            if inner.destroyed {
                return false;
            }
            let Some(index) = resolve(&inner.state) else {
                tracing::debug!(target: targets::WIDGET, "ignoring selection of unknown option");
                return false;
            };
            if inner.state.options().get(index).is_none_or(|r| r.disabled) {
                tracing::debug!(target: targets::WIDGET, index, "ignoring selection of disabled option");
                return false;
            }
            if inner.state.selected_index() == Some(index) {
                return false;
            }
            let previous = inner.state.mark_selected(index);
            self.native.set_selected_property(Some(index));
            tracing::debug!(target: targets::WIDGET, ?previous, selected = index, "selection changed");
        }
        self.native.dispatch_change();
        true
    }

    fn handle_key(&self, event: KeyEvent) -> KeyOutcome {
        let Some(document) = self.document.upgrade() else {
            return KeyOutcome::IGNORED;
        };
        let (destroyed, open) = {
            let inner = self.inner.lock();
            (inner.destroyed, inner.state.is_open())
        };
        if destroyed {
            return KeyOutcome::IGNORED;
        }
        if !open {
            if !event.key.opens_dropdown() || !document.has_focus(&FocusTarget::Display(self.id)) {
                return KeyOutcome::IGNORED;
            }
            self.open();
            let mut inner = self.inner.lock();
            let highlighted = match event.key {
                Key::ArrowDown => inner.state.highlight_first(),
                Key::ArrowUp => inner.state.highlight_last(),
                _ => inner.state.highlighted_index(),
            };
            inner.state.scroll_highlight_into_view(self.rows());
            tracing::trace!(target: targets::WIDGET, key = ?event.key, ?highlighted, "opened from keyboard");
            return KeyOutcome::CONSUMED;
        }

        let mut inner = self.inner.lock();
        if inner.state.first_eligible().is_none() && !matches!(event.key, Key::Escape | Key::Tab) {
            return KeyOutcome::IGNORED;
        }
        let moved = match event.key {
            Key::ArrowDown => inner.state.move_highlight(Step::Next),
            Key::ArrowUp => inner.state.move_highlight(Step::Previous),
            Key::Home => inner.state.highlight_first(),
            Key::End => inner.state.highlight_last(),
            Key::Enter | Key::Space => {
                let highlighted = inner.state.highlighted_index();
                drop(inner);
                if let Some(index) = highlighted {
                    self.commit(|_| Some(index));
                    self.close(Refocus::Always);
                }
                return KeyOutcome::CONSUMED;
            }
            Key::Escape => {
                drop(inner);
                self.close(Refocus::Always);
                return KeyOutcome::CONSUMED;
            }
            Key::Tab => {
                drop(inner);
                self.close(Refocus::Always);
                return KeyOutcome::PASS_THROUGH;
            }
            _ => return KeyOutcome::IGNORED,
        };
        inner.state.scroll_highlight_into_view(self.rows());
        tracing::trace!(target: targets::WIDGET, key = ?event.key, highlighted = ?moved, "highlight moved");
        KeyOutcome::CONSUMED
    }

    fn view(&self) -> Option<OverlayView> {
        let (display_focused, search_focused) = self
            .document
            .upgrade()
            .map(|document| {
                (
                    document.has_focus(&FocusTarget::Display(self.id)),
                    document.has_focus(&FocusTarget::Search(self.id)),
                )
            })
            .unwrap_or_default();

        let inner = self.inner.lock();
        if inner.destroyed {
            return None;
        }
        let ctx = ProjectionContext {
            overlay: self.id,
            generation: inner.generation,
            config: &self.config,
            placeholder: &inner.placeholder,
            display_focused,
            search_focused,
        };
        Some(OverlayView::project(&inner.state, &ctx))
    }

    // =========================================================================
    // Observation
    // =========================================================================

    fn on_mutations(&self, batch: &[MutationRecord]) {
        if !batch.iter().any(MutationRecord::affects_options) {
            tracing::trace!(target: targets::SYNC, records = batch.len(), "ignoring control attribute changes");
            return;
        }
        let _span = OperationSpan::new(span_names::REBUILD);

        let options = self.native.options();
        let mut inner = self.inner.lock();
        if inner.destroyed {
            return;
        }
        let previous = inner.state.highlighted().cloned();
        let previous_index = inner.state.highlighted_index();
        let token = self.token();
        inner
            .state
            .replace_options(records_from_native(&options, &self.config.id_prefix, &token));
        inner.placeholder = placeholder_for(&options, &self.config);
        inner.generation += 1;

        let text = inner.state.search_text().to_owned();
        inner.state.apply_filter(&text);
        if inner.state.is_open() {
            inner.state.restore_highlight(previous.as_ref(), previous_index);
            inner.state.scroll_highlight_into_view(self.rows());
        } else {
            inner.state.clear_highlight();
        }
        tracing::debug!(
            target: targets::SYNC,
            overlay = self.id.as_raw(),
            records = batch.len(),
            options = options.len(),
            generation = inner.generation,
            highlighted = ?inner.state.highlighted_index(),
            "options rebuilt from native control"
        );
    }

    fn on_document_click(&self, target: &ClickTarget) {
        if target.is_inside(self.id) {
            return;
        }
        if self.close(Refocus::IfInside) {
            tracing::debug!(target: targets::WIDGET, overlay = self.id.as_raw(), ?target, "closed by outside click");
        }
    }

    fn token(&self) -> String {
        match self.native.id() {
            Some(control_id) if !control_id.is_empty() => control_id.to_owned(),
            _ => self.id.as_raw().to_string(),
        }
    }

    fn destroy(&self) -> bool {
        {
            let mut inner = self.inner.lock();
            if inner.destroyed {
                return false;
            }
            inner.destroyed = true;
            inner.state.set_open(false);
        }

        let document = self.document.upgrade();
        if let Some(subscriptions) = self.subscriptions.lock().take() {
            self.native.unsubscribe(subscriptions.mutations);
            if let Some(document) = &document {
                document.clicked.disconnect(subscriptions.clicks);
            }
        }
        if let Some(document) = &document {
            document.overlays().withdraw(self.id);
            document.unmount(self.id);
            document.blur_overlay(self.id);
        }

        self.native.remove_class(HIDDEN_CLASS);
        restore_attribute(&self.native, "tabindex", self.restore.tabindex.as_deref());
        restore_attribute(&self.native, "aria-hidden", self.restore.aria_hidden.as_deref());

        tracing::debug!(target: targets::WIDGET, overlay = self.id.as_raw(), "search select destroyed");
        true
    }
}

/// The display text used while nothing is selected.
fn placeholder_for(options: &[NativeOption], config: &SearchSelectConfig) -> String {
    match options.first() {
        Some(first) if first.value.is_empty() => first.text.clone(),
        _ => config.placeholder.clone(),
    }
}

fn restore_attribute(native: &NativeSelect, name: &str, value: Option<&str>) {
    match value {
        Some(value) => native.set_attribute(name, value),
        None => {
            native.remove_attribute(name);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keyboard::KeyboardModifiers;

    fn setup() -> (Arc<Document>, Arc<NativeSelect>, SearchSelect) {
        let document = Document::new();
        let native = document
            .create_select()
            .with_id("fruit")
            .option(NativeOption::new("", "Pick a fruit"))
            .option(NativeOption::new("apple", "Apple"))
            .option(NativeOption::new("banana", "Banana"))
            .option(NativeOption::new("cherry", "Cherry"))
            .build();
        let widget = SearchSelect::new(native.clone()).unwrap();
        (document, native, widget)
    }

    fn key(widget: &SearchSelect, key: Key) -> KeyOutcome {
        widget.handle_key(KeyEvent::new(key))
    }

    #[test]
    fn test_construction_hides_native_control() {
        let (document, native, widget) = setup();

        assert!(native.has_class(HIDDEN_CLASS));
        assert_eq!(native.attribute("tabindex").as_deref(), Some("-1"));
        assert_eq!(native.attribute("aria-hidden").as_deref(), Some("true"));
        assert!(document.is_mounted(widget.id()));
        assert_eq!(document.mount_anchor(widget.id()).as_deref(), Some("fruit"));
        assert_eq!(native.observer_count(), 1);
        assert_eq!(document.clicked.connection_count(), 1);
        assert!(!widget.is_open());
    }

    #[test]
    fn test_construction_rejects_invalid_controls() {
        let detached = NativeSelect::builder().with_id("loose").build();
        let err = SearchSelect::new(detached).unwrap_err();
        assert!(matches!(err, Error::InvalidControl { .. }));

        let document = Document::new();
        let multiple = document.create_select().multiple(true).build();
        assert!(SearchSelect::new(multiple).is_err());

        let native = document.create_select().with_id("once").build();
        let _first = SearchSelect::new(native.clone()).unwrap();
        let err = SearchSelect::new(native).unwrap_err();
        assert!(err.to_string().contains("already enhanced"));
    }

    #[test]
    fn test_placeholder_policy() {
        let (_document, _native, widget) = setup();
        assert_eq!(widget.display_text(), "Pick a fruit");

        let document = Document::new();
        let native = document
            .create_select()
            .option(NativeOption::new("apple", "Apple"))
            .build();
        let config = SearchSelectConfig::default().with_placeholder("Choose");
        let widget = SearchSelect::with_config(native, config).unwrap();
        assert_eq!(widget.display_text(), "Choose");
    }

    #[test]
    fn test_option_ids_use_control_id_or_overlay_id() {
        let (_document, _native, widget) = setup();
        let ids: Vec<_> = widget.state().options().iter().map(|r| r.id.clone()).collect();
        assert_eq!(ids[0], "search-select-option-fruit-0");
        assert_eq!(ids[3], "search-select-option-fruit-3");

        let document = Document::new();
        let native = document
            .create_select()
            .option(NativeOption::new("a", "A"))
            .build();
        let widget = SearchSelect::new(native).unwrap();
        let expected = format!("search-select-option-{}-0", widget.id().as_raw());
        assert_eq!(widget.state().options()[0].id, expected);
    }

    #[test]
    fn test_open_focuses_search_and_highlights_selection() {
        let (document, _native, widget) = setup();
        widget.select_value("cherry");

        assert!(widget.open());
        assert!(!widget.open());
        assert!(document.has_focus(&FocusTarget::Search(widget.id())));
        assert_eq!(widget.highlighted().map(|r| r.value), Some("cherry".into()));
        assert!(document.overlays().is_open(widget.id()));
    }

    #[test]
    fn test_open_without_selection_highlights_first_eligible() {
        let (_document, _native, widget) = setup();
        widget.open();
        assert_eq!(widget.state().highlighted_index(), Some(0));
    }

    #[test]
    fn test_close_resets_search_and_highlight() {
        let (document, _native, widget) = setup();
        widget.open();
        widget.input_search("ch");
        assert_eq!(widget.state().visible_count(), 1);

        assert!(widget.close());
        assert!(!widget.close());
        let state = widget.state();
        assert_eq!(state.search_text(), "");
        assert_eq!(state.visible_count(), 4);
        assert_eq!(state.highlighted_index(), None);
        assert!(document.has_focus(&FocusTarget::Display(widget.id())));
        assert_eq!(document.overlays().open_overlay(), None);
    }

    #[test]
    fn test_select_updates_native_and_emits_change() {
        let (_document, native, widget) = setup();
        let changes = Arc::new(Mutex::new(Vec::new()));
        let changes_clone = changes.clone();
        native
            .changed
            .connect(move |event: &crate::ChangeEvent| changes_clone.lock().push(event.value.clone()));

        assert!(widget.select_value("banana"));
        assert!(!widget.select_value("banana"));
        assert!(!widget.select_value("durian"));

        assert_eq!(native.value(), "banana");
        assert_eq!(widget.display_text(), "Banana");
        assert_eq!(*changes.lock(), vec!["banana".to_string()]);
        assert_eq!(native.pending_mutations(), 3);
    }

    #[test]
    fn test_select_resolves_stale_copies_by_value() {
        let (_document, native, widget) = setup();
        let cherry = widget.state().options()[3].clone();

        native.insert_option(1, NativeOption::new("avocado", "Avocado"));
        native.flush_mutations();

        assert!(widget.select(&cherry));
        assert_eq!(native.selected_index(), Some(4));
        assert_eq!(widget.selected().map(|r| r.label), Some("Cherry".into()));
    }

    #[test]
    fn test_select_disabled_is_ignored() {
        let (_document, native, widget) = setup();
        widget.select_value("apple");
        native.set_option_disabled(2, true);
        native.flush_mutations();

        assert!(!widget.select_value("banana"));
        let mut banana = widget.state().options()[2].clone();
        assert!(!widget.select(&banana));
        banana.disabled = false;
        assert!(!widget.select(&banana));
        assert_eq!(native.value(), "apple");
    }

    #[test]
    fn test_closed_keys_require_display_focus() {
        let (document, _native, widget) = setup();
        assert_eq!(key(&widget, Key::Enter), KeyOutcome::IGNORED);
        assert!(!widget.is_open());

        widget.focus_display();
        assert_eq!(key(&widget, Key::Character('a')), KeyOutcome::IGNORED);
        assert_eq!(key(&widget, Key::Space), KeyOutcome::CONSUMED);
        assert!(widget.is_open());
        assert!(document.has_focus(&FocusTarget::Search(widget.id())));
    }

    #[test]
    fn test_closed_arrows_open_on_first_or_last() {
        let (_document, native, widget) = setup();
        native.set_option_disabled(3, true);
        native.flush_mutations();

        widget.focus_display();
        key(&widget, Key::ArrowUp);
        assert_eq!(widget.state().highlighted_index(), Some(2));

        widget.close();
        key(&widget, Key::ArrowDown);
        assert_eq!(widget.state().highlighted_index(), Some(0));
    }

    #[test]
    fn test_open_navigation_wraps() {
        let (_document, _native, widget) = setup();
        widget.open();
        widget.highlight(2);

        key(&widget, Key::ArrowDown);
        assert_eq!(widget.state().highlighted_index(), Some(3));
        key(&widget, Key::ArrowDown);
        assert_eq!(widget.state().highlighted_index(), Some(0));
        key(&widget, Key::ArrowUp);
        assert_eq!(widget.state().highlighted_index(), Some(3));
        key(&widget, Key::Home);
        assert_eq!(widget.state().highlighted_index(), Some(0));
        key(&widget, Key::End);
        assert_eq!(widget.state().highlighted_index(), Some(3));
        assert_eq!(key(&widget, Key::Character('x')), KeyOutcome::IGNORED);
    }

    #[test]
    fn test_escape_and_tab_close() {
        let (_document, _native, widget) = setup();
        widget.open();
        assert_eq!(key(&widget, Key::Escape), KeyOutcome::CONSUMED);
        assert!(!widget.is_open());

        widget.open();
        assert_eq!(key(&widget, Key::Tab), KeyOutcome::PASS_THROUGH);
        assert!(!widget.is_open());
    }

    #[test]
    fn test_modifiers_do_not_change_key_handling() {
        let (_document, _native, widget) = setup();
        widget.open();
        let shift_tab = KeyEvent::with_modifiers(Key::Tab, KeyboardModifiers::SHIFT);
        assert_eq!(widget.handle_key(shift_tab), KeyOutcome::PASS_THROUGH);
        assert!(!widget.is_open());

        widget.open();
        let shift_down = KeyEvent::with_modifiers(Key::ArrowDown, KeyboardModifiers::SHIFT);
        assert_eq!(widget.handle_key(shift_down), KeyOutcome::CONSUMED);
        assert_eq!(widget.state().highlighted_index(), Some(1));
    }

    #[test]
    fn test_no_eligible_options_only_escape_and_tab() {
        let (_document, _native, widget) = setup();
        widget.open();
        widget.input_search("zzz");

        assert_eq!(key(&widget, Key::ArrowDown), KeyOutcome::IGNORED);
        assert_eq!(key(&widget, Key::Enter), KeyOutcome::IGNORED);
        assert!(widget.is_open());
        assert_eq!(key(&widget, Key::Escape), KeyOutcome::CONSUMED);
        assert!(!widget.is_open());
    }

    #[test]
    fn test_enter_without_highlight_stays_open() {
        let (_document, native, widget) = setup();
        widget.open();
        {
            let mut inner = widget.shared.inner.lock();
            inner.state.clear_highlight();
        }
        assert_eq!(key(&widget, Key::Enter), KeyOutcome::CONSUMED);
        assert!(widget.is_open());
        assert_eq!(native.selected_index(), None);
    }

    #[test]
    fn test_pointer_interactions() {
        let (document, native, widget) = setup();
        assert!(widget.click_display());
        assert!(widget.hover_option(3));
        assert_eq!(widget.state().highlighted_index(), Some(3));

        native.set_option_disabled(1, true);
        native.flush_mutations();
        assert!(!widget.hover_option(1));
        assert!(!widget.click_option(1));

        assert!(widget.click_option(2));
        assert!(!widget.is_open());
        assert_eq!(native.value(), "banana");
        assert!(document.has_focus(&FocusTarget::Display(widget.id())));

        assert!(!widget.click_option(3));
        assert!(widget.click_display());
        assert!(!widget.click_display());
    }

    #[test]
    fn test_input_search_requires_open_dropdown() {
        let (_document, _native, widget) = setup();
        assert!(!widget.input_search("app"));
        widget.open();
        assert!(widget.input_search("app"));
        assert_eq!(widget.state().highlighted_index(), Some(1));
        assert_eq!(widget.state().search_text(), "app");
    }

    #[test]
    fn test_control_attribute_changes_do_not_rebuild() {
        let (_document, native, widget) = setup();
        native.flush_mutations();
        native.set_attribute("data-kind", "fruit");
        native.flush_mutations();
        assert_eq!(widget.generation(), 0);

        native.set_option_text(1, "Green apple");
        native.flush_mutations();
        assert_eq!(widget.generation(), 1);
        assert_eq!(widget.state().options()[1].label, "Green apple");
    }

    #[test]
    fn test_rebuild_while_open_reapplies_search() {
        let (_document, native, widget) = setup();
        widget.open();
        widget.input_search("an");
        native.append_option(NativeOption::new("mango", "Mango"));
        native.flush_mutations();

        let state = widget.state();
        assert!(state.is_open());
        assert_eq!(state.search_text(), "an");
        let visible: Vec<_> = state
            .options()
            .iter()
            .filter(|r| !r.hidden)
            .map(|r| r.label.as_str())
            .collect();
        assert_eq!(visible, vec!["Banana", "Mango"]);
        assert_eq!(state.highlighted_index(), Some(2));
    }

    #[test]
    fn test_destroy_is_idempotent_and_restores_control() {
        let document = Document::new();
        let native = document
            .create_select()
            .attribute("tabindex", "3")
            .attribute("class", "form-select")
            .option(NativeOption::new("a", "A"))
            .build();
        let widget = SearchSelect::new(native.clone()).unwrap();
        widget.open();

        assert!(widget.destroy());
        assert!(!widget.destroy());

        assert_eq!(native.attribute("class").as_deref(), Some("form-select"));
        assert_eq!(native.attribute("tabindex").as_deref(), Some("3"));
        assert_eq!(native.attribute("aria-hidden"), None);
        assert_eq!(native.observer_count(), 0);
        assert_eq!(document.clicked.connection_count(), 0);
        assert!(document.overlays().is_empty());
        assert_eq!(document.mounted_count(), 0);
        assert_eq!(document.focused(), None);

        assert!(!widget.open());
        assert!(widget.view().is_none());
        assert_eq!(widget.handle_key(KeyEvent::new(Key::Enter)), KeyOutcome::IGNORED);
        assert!(SearchSelect::new(native).is_ok());
    }

    #[test]
    fn test_dropped_widget_subscriptions_are_inert() {
        let (document, native, widget) = setup();
        drop(widget);
        native.append_option(NativeOption::new("kiwi", "Kiwi"));
        assert_eq!(native.flush_mutations(), 4);
        assert_eq!(document.dispatch_click(ClickTarget::Background), 1);
    }
}
