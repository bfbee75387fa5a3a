//! Option records mirrored from the native control.

use crate::native::NativeOption;

/// The widget's view of one native option.
///
/// Records are rebuilt wholesale from the native control whenever its option
/// list changes; a record is never patched in place across a rebuild.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionRecord {
    /// Submitted value.
    pub value: String,
    /// Label shown in the list and in the display affordance.
    pub label: String,
    /// Whether this is the selected option.
    pub selected: bool,
    /// Whether the option can be chosen.
    pub disabled: bool,
    /// Whether the current search hides the option.
    pub hidden: bool,
    /// Identifier used to reference the option from the display affordance.
    pub id: String,
}

impl OptionRecord {
    /// Whether keyboard navigation may land on this option.
    pub fn is_eligible(&self) -> bool {
        !self.hidden && !self.disabled
    }

    /// Case-insensitive substring match of an already lowercased needle.
    pub(crate) fn matches(&self, needle: &str) -> bool {
        self.label.to_lowercase().contains(needle)
    }
}

/// The id of the option at `index` for a widget identified by `token`.
pub fn option_id(prefix: &str, token: &str, index: usize) -> String {
    format!("{prefix}-{token}-{index}")
}

/// Build records for every native option, in native order.
pub fn records_from_native(options: &[NativeOption], prefix: &str, token: &str) -> Vec<OptionRecord> {
    options
        .iter()
        .enumerate()
        .map(|(index, option)| OptionRecord {
            value: option.value.clone(),
            label: option.display_label().to_owned(),
            selected: option.selected,
            disabled: option.disabled,
            hidden: false,
            id: option_id(prefix, token, index),
        })
        .collect()
}
