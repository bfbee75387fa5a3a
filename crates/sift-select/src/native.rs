//! The native single-selection control.
//!
//! [`NativeSelect`] is the form control a [`SearchSelect`](crate::SearchSelect)
//! enhances. It holds the ordered native options plus the control's own
//! attributes, and stays the source of truth for form submission.
//!
//! Writes come in two flavours, mirroring how markup-based controls behave:
//!
//! - **External mutations** (`append_option`, `set_option_disabled`,
//!   `set_attribute`, ...) are what host code does. Each one queues a
//!   [`MutationRecord`]; the host's observation cycle delivers the queued
//!   records to subscribers with [`NativeSelect::flush_mutations`].
//! - **Live selection writes** ([`NativeSelect::set_selected_property`]) are
//!   what the widget does when the user commits a choice. They change the
//!   selection without queuing a record, so the widget never observes its
//!   own writes.

use std::collections::BTreeMap;
use std::sync::{Arc, Weak};

use parking_lot::RwLock;
use sift_select_core::logging::targets;
use sift_select_core::{ChangeBatcher, ExternalChangeSource, Signal, SubscriptionHandle};

use crate::document::Document;

/// One option of a native control.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NativeOption {
    /// Submitted value.
    pub value: String,
    /// Explicit label attribute, if any.
    pub label: Option<String>,
    /// Text content.
    pub text: String,
    /// Whether the option is selected.
    pub selected: bool,
    /// Whether the option is disabled.
    pub disabled: bool,
}

impl NativeOption {
    /// Create an enabled, unselected option.
    pub fn new(value: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            text: text.into(),
            ..Self::default()
        }
    }

    /// Set an explicit label using builder pattern.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Mark the option selected using builder pattern.
    pub fn selected(mut self) -> Self {
        self.selected = true;
        self
    }

    /// Mark the option disabled using builder pattern.
    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }

    /// The label shown to users: the label attribute when non-empty,
    /// otherwise the text content.
    pub fn display_label(&self) -> &str {
        match self.label.as_deref() {
            Some(label) if !label.is_empty() => label,
            _ => &self.text,
        }
    }
}

/// Option attributes whose changes are reported individually.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionAttribute {
    Selected,
    Disabled,
    Value,
    Label,
}

/// A single externally caused change to a native control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationRecord {
    /// Options were added or removed.
    ChildList { added: usize, removed: usize },
    /// The text content of an option was replaced.
    OptionText { index: usize },
    /// An attribute of an option changed.
    OptionAttribute {
        index: usize,
        attribute: OptionAttribute,
    },
    /// An attribute of the control itself changed.
    ControlAttribute { name: String },
}

impl MutationRecord {
    /// Whether this change alters the option list a widget mirrors.
    pub fn affects_options(&self) -> bool {
        !matches!(self, Self::ControlAttribute { .. })
    }
}

/// Notification that the control's selection was changed by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    /// The control's id, if it has one.
    pub control_id: Option<String>,
    /// The control's value after the change.
    pub value: String,
    /// Index of the selected option after the change.
    pub selected_index: Option<usize>,
    /// Whether the event propagates to the document.
    pub bubbles: bool,
}

#[derive(Debug, Default)]
struct ControlState {
    options: Vec<NativeOption>,
    attributes: BTreeMap<String, String>,
}

impl ControlState {
    fn select_only(&mut self, index: usize) {
        for (i, option) in self.options.iter_mut().enumerate() {
            option.selected = i == index;
        }
    }

    fn classes(&self) -> impl Iterator<Item = &str> {
        self.attributes
            .get("class")
            .map(|classes| classes.split_whitespace())
            .into_iter()
            .flatten()
    }
}

/// Builder for [`NativeSelect`].
#[derive(Debug, Default)]
pub struct NativeSelectBuilder {
    id: Option<String>,
    multiple: bool,
    document: Weak<Document>,
    options: Vec<NativeOption>,
    attributes: BTreeMap<String, String>,
}

impl NativeSelectBuilder {
    /// Create a builder for a detached control.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the control id.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Allow multiple selection.
    pub fn multiple(mut self, multiple: bool) -> Self {
        self.multiple = multiple;
        self
    }

    /// Attach the control to a document.
    pub fn document(mut self, document: &Arc<Document>) -> Self {
        self.document = Arc::downgrade(document);
        self
    }

    /// Append an option.
    pub fn option(mut self, option: NativeOption) -> Self {
        self.options.push(option);
        self
    }

    /// Append several options.
    pub fn options(mut self, options: impl IntoIterator<Item = NativeOption>) -> Self {
        self.options.extend(options);
        self
    }

    /// Set an attribute on the control.
    pub fn attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Build the control.
    ///
    /// A single-selection control keeps only the last option marked selected.
    pub fn build(self) -> Arc<NativeSelect> {
        let mut state = ControlState {
            options: self.options,
            attributes: self.attributes,
        };
        if !self.multiple
            && let Some(last) = state.options.iter().rposition(|o| o.selected)
        {
            state.select_only(last);
        }

        Arc::new(NativeSelect {
            id: self.id,
            multiple: self.multiple,
            document: self.document,
            state: RwLock::new(state),
            mutations: ChangeBatcher::new(),
            changed: Signal::new(),
        })
    }
}

/// A native selection control.
pub struct NativeSelect {
    id: Option<String>,
    multiple: bool,
    document: Weak<Document>,
    state: RwLock<ControlState>,
    mutations: ChangeBatcher<MutationRecord>,

    /// Emitted when the user commits a new selection.
    pub changed: Signal<ChangeEvent>,
}

impl NativeSelect {
    /// Start building a control.
    pub fn builder() -> NativeSelectBuilder {
        NativeSelectBuilder::new()
    }

    // =========================================================================
    // Identity
    // =========================================================================

    /// The control's id.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Whether the control allows multiple selection.
    pub fn is_multiple(&self) -> bool {
        self.multiple
    }

    /// The document the control lives in, if it is still alive.
    pub fn document(&self) -> Option<Arc<Document>> {
        self.document.upgrade()
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// A copy of all options in order.
    pub fn options(&self) -> Vec<NativeOption> {
        self.state.read().options.clone()
    }

    /// A copy of the option at `index`.
    pub fn option(&self, index: usize) -> Option<NativeOption> {
        self.state.read().options.get(index).cloned()
    }

    /// Number of options.
    pub fn len(&self) -> usize {
        self.state.read().options.len()
    }

    /// Whether the control has no options.
    pub fn is_empty(&self) -> bool {
        self.state.read().options.is_empty()
    }

    /// Index of the first selected option.
    pub fn selected_index(&self) -> Option<usize> {
        self.state.read().options.iter().position(|o| o.selected)
    }

    /// Value of the selected option, or an empty string.
    pub fn value(&self) -> String {
        let state = self.state.read();
        state
            .options
            .iter()
            .find(|o| o.selected)
            .map(|o| o.value.clone())
            .unwrap_or_default()
    }

    /// Value of a control attribute.
    pub fn attribute(&self, name: &str) -> Option<String> {
        self.state.read().attributes.get(name).cloned()
    }

    /// Whether the control carries `class`.
    pub fn has_class(&self, class: &str) -> bool {
        self.state.read().classes().any(|c| c == class)
    }

    // =========================================================================
    // External mutations
    // =========================================================================

    /// Append an option.
    pub fn append_option(&self, option: NativeOption) {
        let index = self.len();
        self.insert_option(index, option);
    }

    /// Insert an option at `index` (clamped to the option count).
    pub fn insert_option(&self, index: usize, option: NativeOption) {
        {
            let mut state = self.state.write();
            let index = index.min(state.options.len());
            let selected = option.selected && !self.multiple;
            state.options.insert(index, option);
            if selected {
                state.select_only(index);
            }
        }
        self.record(MutationRecord::ChildList {
            added: 1,
            removed: 0,
        });
    }

    /// Remove the option at `index`.
    pub fn remove_option(&self, index: usize) -> Option<NativeOption> {
        let removed = {
            let mut state = self.state.write();
            (index < state.options.len()).then(|| state.options.remove(index))
        };
        if removed.is_some() {
            self.record(MutationRecord::ChildList {
                added: 0,
                removed: 1,
            });
        }
        removed
    }

    /// Remove every option.
    pub fn clear_options(&self) {
        let removed = std::mem::take(&mut self.state.write().options).len();
        if removed > 0 {
            self.record(MutationRecord::ChildList { added: 0, removed });
        }
    }

    /// Set or clear the `selected` attribute of an option.
    ///
    /// Selecting an option in a single-selection control deselects the others.
    pub fn set_option_selected(&self, index: usize, selected: bool) -> bool {
        let multiple = self.multiple;
        self.update_option(index, OptionAttribute::Selected, |state| {
            if selected && !multiple {
                state.select_only(index);
            } else {
                state.options[index].selected = selected;
            }
        })
    }

    /// Set or clear the `disabled` attribute of an option.
    pub fn set_option_disabled(&self, index: usize, disabled: bool) -> bool {
        self.update_option(index, OptionAttribute::Disabled, |state| {
            state.options[index].disabled = disabled;
        })
    }

    /// Set or remove the `label` attribute of an option.
    pub fn set_option_label(&self, index: usize, label: Option<String>) -> bool {
        self.update_option(index, OptionAttribute::Label, |state| {
            state.options[index].label = label;
        })
    }

    /// Set the `value` attribute of an option.
    pub fn set_option_value(&self, index: usize, value: impl Into<String>) -> bool {
        let value = value.into();
        self.update_option(index, OptionAttribute::Value, |state| {
            state.options[index].value = value;
        })
    }

    /// Replace the text content of an option.
    pub fn set_option_text(&self, index: usize, text: impl Into<String>) -> bool {
        let text = text.into();
        {
            let mut state = self.state.write();
            match state.options.get_mut(index) {
                Some(option) => option.text = text,
                None => return false,
            }
        }
        self.record(MutationRecord::OptionText { index });
        true
    }

    /// Set a control attribute.
    pub fn set_attribute(&self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        self.state.write().attributes.insert(name.clone(), value.into());
        self.record(MutationRecord::ControlAttribute { name });
    }

    /// Remove a control attribute, returning its previous value.
    pub fn remove_attribute(&self, name: &str) -> Option<String> {
        let previous = self.state.write().attributes.remove(name);
        if previous.is_some() {
            self.record(MutationRecord::ControlAttribute {
                name: name.to_owned(),
            });
        }
        previous
    }

    /// Add a class to the control's class list.
    pub fn add_class(&self, class: &str) {
        if self.has_class(class) {
            return;
        }
        let classes = {
            let state = self.state.read();
            state.classes().chain(std::iter::once(class)).collect::<Vec<_>>().join(" ")
        };
        self.set_attribute("class", classes);
    }

    /// Remove a class from the control's class list.
    pub fn remove_class(&self, class: &str) {
        if !self.has_class(class) {
            return;
        }
        let remaining = {
            let state = self.state.read();
            state.classes().filter(|c| *c != class).collect::<Vec<_>>().join(" ")
        };
        if remaining.is_empty() {
            self.remove_attribute("class");
        } else {
            self.set_attribute("class", remaining);
        }
    }

    fn update_option<F>(&self, index: usize, attribute: OptionAttribute, apply: F) -> bool
    where
        F: FnOnce(&mut ControlState),
    {
        {
            let mut state = self.state.write();
            if index >= state.options.len() {
                return false;
            }
            apply(&mut state);
        }
        self.record(MutationRecord::OptionAttribute { index, attribute });
        true
    }

    fn record(&self, record: MutationRecord) {
        tracing::trace!(target: targets::NATIVE, control = ?self.id, ?record, "native control mutated");
        self.mutations.record(record);
    }

    // =========================================================================
    // Observation
    // =========================================================================

    /// Deliver queued mutation records to subscribers as one batch.
    ///
    /// This is the host's observation cycle. Returns the number of records
    /// delivered.
    pub fn flush_mutations(&self) -> usize {
        self.mutations.flush()
    }

    /// Number of mutation records waiting for the next flush.
    pub fn pending_mutations(&self) -> usize {
        self.mutations.pending_len()
    }

    /// Number of active mutation subscriptions.
    pub fn observer_count(&self) -> usize {
        self.mutations.subscriber_count()
    }

    // =========================================================================
    // Live selection
    // =========================================================================

    /// Set the live selection without queuing a mutation record.
    ///
    /// `None` deselects every option.
    pub fn set_selected_property(&self, index: Option<usize>) -> bool {
        let mut state = self.state.write();
        match index {
            Some(index) if index >= state.options.len() => false,
            Some(index) => {
                state.select_only(index);
                true
            }
            None => {
                for option in &mut state.options {
                    option.selected = false;
                }
                true
            }
        }
    }

    /// Emit a change notification on the control and, because it bubbles,
    /// on its document.
    pub fn dispatch_change(&self) -> ChangeEvent {
        let event = ChangeEvent {
            control_id: self.id.clone(),
            value: self.value(),
            selected_index: self.selected_index(),
            bubbles: true,
        };
        tracing::debug!(target: targets::NATIVE, control = ?self.id, value = %event.value, "dispatching change");
        self.changed.emit(event.clone());
        if event.bubbles
            && let Some(document) = self.document()
        {
            document.changed.emit(event.clone());
        }
        event
    }
}

impl ExternalChangeSource for NativeSelect {
    type Record = MutationRecord;

    fn subscribe<F>(&self, callback: F) -> SubscriptionHandle
    where
        F: Fn(&[MutationRecord]) + Send + Sync + 'static,
    {
        self.mutations.subscribe(callback)
    }

    fn unsubscribe(&self, handle: SubscriptionHandle) -> bool {
        self.mutations.unsubscribe(handle)
    }
}

impl std::fmt::Debug for NativeSelect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NativeSelect")
            .field("id", &self.id)
            .field("multiple", &self.multiple)
            .field("options", &self.state.read().options)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    fn fruit() -> Arc<NativeSelect> {
        NativeSelect::builder()
            .with_id("fruit")
            .option(NativeOption::new("", "Pick a fruit"))
            .option(NativeOption::new("apple", "Apple"))
            .option(NativeOption::new("banana", "Banana"))
            .build()
    }

    #[test]
    fn test_display_label_prefers_label_attribute() {
        let option = NativeOption::new("a", "Apple");
        assert_eq!(option.display_label(), "Apple");
        assert_eq!(option.clone().with_label("Green apple").display_label(), "Green apple");
        assert_eq!(option.with_label("").display_label(), "Apple");
    }

    #[test]
    fn test_builder_keeps_last_selected() {
        let select = NativeSelect::builder()
            .option(NativeOption::new("a", "A").selected())
            .option(NativeOption::new("b", "B").selected())
            .build();
        assert_eq!(select.selected_index(), Some(1));
        assert_eq!(select.value(), "b");

        let multi = NativeSelect::builder()
            .multiple(true)
            .option(NativeOption::new("a", "A").selected())
            .option(NativeOption::new("b", "B").selected())
            .build();
        assert!(multi.option(0).unwrap().selected);
        assert!(multi.option(1).unwrap().selected);
    }

    #[test]
    fn test_external_mutations_are_recorded() {
        let select = fruit();
        select.append_option(NativeOption::new("cherry", "Cherry"));
        select.set_option_disabled(1, true);
        select.set_attribute("data-kind", "food");
        assert_eq!(select.pending_mutations(), 3);

        let batches = Arc::new(Mutex::new(Vec::new()));
        let batches_clone = batches.clone();
        select.subscribe(move |batch| batches_clone.lock().push(batch.to_vec()));

        assert_eq!(select.flush_mutations(), 3);
        let batches = batches.lock();
        assert_eq!(batches.len(), 1);
        assert_eq!(
            batches[0],
            vec![
                MutationRecord::ChildList { added: 1, removed: 0 },
                MutationRecord::OptionAttribute {
                    index: 1,
                    attribute: OptionAttribute::Disabled
                },
                MutationRecord::ControlAttribute {
                    name: "data-kind".into()
                },
            ]
        );
        assert!(batches[0][0].affects_options());
        assert!(!batches[0][2].affects_options());
    }

    #[test]
    fn test_out_of_range_mutations_are_ignored() {
        let select = fruit();
        assert!(!select.set_option_disabled(9, true));
        assert!(!select.set_option_text(9, "x"));
        assert!(select.remove_option(9).is_none());
        assert_eq!(select.pending_mutations(), 0);
    }

    #[test]
    fn test_set_option_selected_is_exclusive() {
        let select = fruit();
        select.set_option_selected(1, true);
        select.set_option_selected(2, true);
        assert_eq!(select.selected_index(), Some(2));
        select.set_option_selected(2, false);
        assert_eq!(select.selected_index(), None);
        assert_eq!(select.value(), "");
    }

    #[test]
    fn test_selected_property_does_not_record() {
        let select = fruit();
        assert!(select.set_selected_property(Some(2)));
        assert!(!select.set_selected_property(Some(7)));
        assert_eq!(select.selected_index(), Some(2));
        assert_eq!(select.pending_mutations(), 0);
    }

    #[test]
    fn test_class_list() {
        let select = fruit();
        select.add_class("form-select");
        select.add_class("search-select-hidden");
        select.add_class("search-select-hidden");
        assert_eq!(
            select.attribute("class").as_deref(),
            Some("form-select search-select-hidden")
        );

        select.remove_class("search-select-hidden");
        assert!(!select.has_class("search-select-hidden"));
        select.remove_class("form-select");
        assert_eq!(select.attribute("class"), None);
    }

    #[test]
    fn test_dispatch_change_bubbles_to_document() {
        let document = Document::new();
        let select = document
            .create_select()
            .with_id("fruit")
            .option(NativeOption::new("a", "A"))
            .build();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let seen_clone = seen.clone();
        select.changed.connect(move |e: &ChangeEvent| seen_clone.lock().push(("control", e.value.clone())));
        let seen_clone = seen.clone();
        document
            .changed
            .connect(move |e: &ChangeEvent| seen_clone.lock().push(("document", e.value.clone())));

        select.set_selected_property(Some(0));
        let event = select.dispatch_change();
        assert!(event.bubbles);
        assert_eq!(event.control_id.as_deref(), Some("fruit"));
        assert_eq!(
            *seen.lock(),
            vec![("control", "a".to_string()), ("document", "a".to_string())]
        );
    }
}
