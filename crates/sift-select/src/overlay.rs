//! The rendered overlay, as data.
//!
//! An [`OverlayView`] is a pure projection of a widget's state: the display
//! affordance that replaces the native control, and the dropdown holding the
//! search field and the option list. Renderers draw it; assistive tooling
//! reads its roles and states. The option list is regenerated from the
//! option records on every projection, and [`OverlayView::generation`]
//! changes whenever the records themselves were rebuilt from the native
//! control.

use sift_select_core::OverlayId;

use crate::config::SearchSelectConfig;
use crate::option::OptionRecord;
use crate::state::WidgetState;

/// Class marking the option list entries.
pub const OPTION_CLASS: &str = "search-select-option";

/// The accessibility role of an overlay element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessibleRole {
    /// The display affordance: an editable-looking box owning a popup list.
    ComboBox,
    /// The dropdown containing the options.
    ListBox,
    /// An entry of the list box.
    Option,
    /// The search field.
    SearchBox,
    /// Structural element without semantics of its own.
    Presentation,
}

impl AccessibleRole {
    /// The role name as used by web accessibility APIs.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ComboBox => "combobox",
            Self::ListBox => "listbox",
            Self::Option => "option",
            Self::SearchBox => "searchbox",
            Self::Presentation => "presentation",
        }
    }
}

/// The display affordance shown in place of the native control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayView {
    /// Always [`AccessibleRole::ComboBox`].
    pub role: AccessibleRole,
    /// The kind of popup the display owns; always [`AccessibleRole::ListBox`].
    pub has_popup: AccessibleRole,
    /// Label of the selection, or the placeholder text.
    pub text: String,
    /// Whether `text` is the placeholder.
    pub is_placeholder: bool,
    /// Whether the dropdown is expanded.
    pub expanded: bool,
    /// Id of the option assistive technology should announce.
    pub active_descendant: Option<String>,
    /// Whether the display holds keyboard focus.
    pub focused: bool,
}

/// The search field inside the dropdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchView {
    /// Always [`AccessibleRole::SearchBox`].
    pub role: AccessibleRole,
    /// Current search text.
    pub value: String,
    /// Placeholder shown while empty.
    pub placeholder: String,
    /// Accessible label.
    pub label: String,
    /// Whether the field holds keyboard focus.
    pub focused: bool,
}

/// One entry of the option list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionView {
    /// Always [`AccessibleRole::Option`].
    pub role: AccessibleRole,
    /// Element id, referenced by [`DisplayView::active_descendant`].
    pub id: String,
    pub label: String,
    pub value: String,
    pub selected: bool,
    pub disabled: bool,
    pub hidden: bool,
    pub highlighted: bool,
}

impl OptionView {
    fn project(record: &OptionRecord, highlighted: bool) -> Self {
        Self {
            role: AccessibleRole::Option,
            id: record.id.clone(),
            label: record.label.clone(),
            value: record.value.clone(),
            selected: record.selected,
            disabled: record.disabled,
            hidden: record.hidden,
            highlighted,
        }
    }

    /// Style classes of the entry.
    pub fn classes(&self) -> Vec<&'static str> {
        let mut classes = vec![OPTION_CLASS];
        if self.selected {
            classes.push("selected");
        }
        if self.disabled {
            classes.push("disabled");
        }
        if self.hidden {
            classes.push("hidden");
        }
        if self.highlighted {
            classes.push("highlighted");
        }
        classes
    }
}

/// The dropdown: search field plus option list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropdownView {
    /// Always [`AccessibleRole::ListBox`].
    pub role: AccessibleRole,
    /// Role of the list element wrapping the options; always
    /// [`AccessibleRole::Presentation`].
    pub list_role: AccessibleRole,
    /// Whether the dropdown is shown.
    pub visible: bool,
    pub search: SearchView,
    /// Every option, hidden ones included, in native order.
    pub options: Vec<OptionView>,
    /// First visible row in the scrolled list.
    pub scroll_offset: usize,
    /// Number of rows that fit in the list.
    pub max_visible_items: usize,
}

/// The full overlay of one widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayView {
    /// The widget the overlay belongs to.
    pub overlay: OverlayId,
    /// Number of times the option records were rebuilt from the native control.
    pub generation: u64,
    pub display: DisplayView,
    pub dropdown: DropdownView,
}

/// Inputs of a projection that do not live in [`WidgetState`].
pub(crate) struct ProjectionContext<'a> {
    pub overlay: OverlayId,
    pub generation: u64,
    pub config: &'a SearchSelectConfig,
    pub placeholder: &'a str,
    pub display_focused: bool,
    pub search_focused: bool,
}

impl OverlayView {
    pub(crate) fn project(state: &WidgetState, ctx: &ProjectionContext<'_>) -> Self {
        let shown_selection = state.selected().filter(|record| !record.value.is_empty());
        let (text, is_placeholder) = match shown_selection {
            Some(record) => (record.label.clone(), false),
            None => (ctx.placeholder.to_owned(), true),
        };
        let active_descendant = if state.is_open() {
            state.highlighted().map(|record| record.id.clone())
        } else {
            shown_selection.map(|record| record.id.clone())
        };

        let highlighted = state.highlighted_index();
        let options = state
            .options()
            .iter()
            .enumerate()
            .map(|(index, record)| OptionView::project(record, highlighted == Some(index)))
            .collect();

        Self {
            overlay: ctx.overlay,
            generation: ctx.generation,
            display: DisplayView {
                role: AccessibleRole::ComboBox,
                has_popup: AccessibleRole::ListBox,
                text,
                is_placeholder,
                expanded: state.is_open(),
                active_descendant,
                focused: ctx.display_focused,
            },
            dropdown: DropdownView {
                role: AccessibleRole::ListBox,
                list_role: AccessibleRole::Presentation,
                visible: state.is_open(),
                search: SearchView {
                    role: AccessibleRole::SearchBox,
                    value: state.search_text().to_owned(),
                    placeholder: ctx.config.search_placeholder.clone(),
                    label: ctx.config.search_label.clone(),
                    focused: ctx.search_focused,
                },
                options,
                scroll_offset: state.scroll_offset(),
                max_visible_items: ctx.config.max_visible_items,
            },
        }
    }

    /// Options not hidden by the search, in order.
    pub fn visible_options(&self) -> impl Iterator<Item = &OptionView> {
        self.dropdown.options.iter().filter(|option| !option.hidden)
    }

    /// The options inside the scrolled viewport.
    pub fn rows_in_view(&self) -> impl Iterator<Item = &OptionView> {
        self.visible_options()
            .skip(self.dropdown.scroll_offset)
            .take(self.dropdown.max_visible_items)
    }

    /// The option referenced by the display's active descendant.
    pub fn active_option(&self) -> Option<&OptionView> {
        let id = self.display.active_descendant.as_deref()?;
        self.option_by_id(id)
    }

    /// Look an option up by element id.
    pub fn option_by_id(&self, id: &str) -> Option<&OptionView> {
        self.dropdown.options.iter().find(|option| option.id == id)
    }
}
