//! The widget's state machine over its option list.
//!
//! [`WidgetState`] holds the option records together with the selection,
//! highlight, open/closed status and search text, and implements every rule
//! that does not touch the outside world: filtering, highlight fallback,
//! circular keyboard navigation and scrolling. The widget layers native
//! mirroring, focus and notifications on top.
//!
//! Keyboard navigation only ever moves through the *eligible* options, the
//! ordered subsequence of records that are neither hidden by the search nor
//! disabled.

use crate::option::OptionRecord;

/// Direction of a relative highlight move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Next,
    Previous,
}

/// Selection, highlight and visibility state of a widget.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WidgetState {
    options: Vec<OptionRecord>,
    selected_index: Option<usize>,
    highlighted_index: Option<usize>,
    is_open: bool,
    search_text: String,
    scroll_offset: usize,
}

impl WidgetState {
    /// Create a closed state over `options`.
    pub fn new(options: Vec<OptionRecord>) -> Self {
        let mut state = Self::default();
        state.replace_options(options);
        state
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// All option records in native order.
    pub fn options(&self) -> &[OptionRecord] {
        &self.options
    }

    /// Index of the selected record.
    pub fn selected_index(&self) -> Option<usize> {
        self.selected_index
    }

    /// The selected record.
    pub fn selected(&self) -> Option<&OptionRecord> {
        self.selected_index.and_then(|i| self.options.get(i))
    }

    /// Index of the highlighted record.
    pub fn highlighted_index(&self) -> Option<usize> {
        self.highlighted_index
    }

    /// The highlighted record.
    pub fn highlighted(&self) -> Option<&OptionRecord> {
        self.highlighted_index.and_then(|i| self.options.get(i))
    }

    /// Whether the dropdown is open.
    pub fn is_open(&self) -> bool {
        self.is_open
    }

    /// The current search text.
    pub fn search_text(&self) -> &str {
        &self.search_text
    }

    /// First visible row of the list.
    pub fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    /// Whether the record at `index` is visible and enabled.
    pub fn is_eligible(&self, index: usize) -> bool {
        self.options.get(index).is_some_and(OptionRecord::is_eligible)
    }

    /// Indices of all visible, enabled records in order.
    pub fn eligible_indices(&self) -> Vec<usize> {
        self.options
            .iter()
            .enumerate()
            .filter(|(_, record)| record.is_eligible())
            .map(|(index, _)| index)
            .collect()
    }

    /// Index of the first visible, enabled record.
    pub fn first_eligible(&self) -> Option<usize> {
        self.options.iter().position(OptionRecord::is_eligible)
    }

    /// Index of the last visible, enabled record.
    pub fn last_eligible(&self) -> Option<usize> {
        self.options.iter().rposition(OptionRecord::is_eligible)
    }

    /// Number of records not hidden by the search.
    pub fn visible_count(&self) -> usize {
        self.options.iter().filter(|r| !r.hidden).count()
    }

    /// Index of the record with the given value.
    pub fn position_of_value(&self, value: &str) -> Option<usize> {
        self.options.iter().position(|r| r.value == value)
    }

    // =========================================================================
    // Transitions
    // =========================================================================

    /// Replace every record, recomputing selection and clearing the highlight.
    ///
    /// New records start visible; callers reapply the search when needed.
    pub(crate) fn replace_options(&mut self, options: Vec<OptionRecord>) {
        self.selected_index = options.iter().position(|r| r.selected);
        self.options = options;
        self.highlighted_index = None;
        self.scroll_offset = 0;
    }

    pub(crate) fn set_open(&mut self, open: bool) {
        self.is_open = open;
    }

    /// Recompute visibility from `text` and highlight the first eligible record.
    ///
    /// The match is a case-insensitive substring test of the trimmed text
    /// against each label. Returns the new highlight.
    pub(crate) fn apply_filter(&mut self, text: &str) -> Option<usize> {
        self.search_text = text.to_owned();
        let needle = text.trim().to_lowercase();
        for record in &mut self.options {
            record.hidden = !record.matches(&needle);
        }
        self.highlighted_index = self.first_eligible();
        self.highlighted_index
    }

    /// Highlight `index`, falling back to the first eligible record when it is
    /// hidden, disabled or out of range.
    pub(crate) fn highlight(&mut self, index: usize) -> Option<usize> {
        self.highlighted_index = if self.is_eligible(index) {
            Some(index)
        } else {
            self.first_eligible()
        };
        self.highlighted_index
    }

    pub(crate) fn clear_highlight(&mut self) {
        self.highlighted_index = None;
    }

    /// Highlight the selection when it is eligible, otherwise the first
    /// eligible record.
    pub(crate) fn reset_highlight(&mut self) -> Option<usize> {
        self.highlighted_index = match self.selected_index {
            Some(index) if self.is_eligible(index) => Some(index),
            _ => self.first_eligible(),
        };
        self.highlighted_index
    }

    /// Re-establish the highlight after the records were rebuilt.
    ///
    /// The selection wins when it is eligible. Otherwise `previous`, the
    /// record highlighted before the rebuild at `previous_index`, is looked up
    /// again by value and stays highlighted if it is still eligible. If it is
    /// not, the highlight moves to the first eligible record at or after its
    /// new position (or its old position when it was removed), wrapping to
    /// the start of the list.
    pub(crate) fn restore_highlight(
        &mut self,
        previous: Option<&OptionRecord>,
        previous_index: Option<usize>,
    ) -> Option<usize> {
        if let Some(index) = self.selected_index
            && self.is_eligible(index)
        {
            self.highlighted_index = Some(index);
            return self.highlighted_index;
        }
        let anchor = previous
            .and_then(|record| self.position_of_record(record))
            .or(previous_index);
        let eligible = self.eligible_indices();
        self.highlighted_index = match anchor {
            Some(anchor) => eligible
                .iter()
                .copied()
                .find(|&index| index >= anchor)
                .or_else(|| eligible.first().copied()),
            None => eligible.first().copied(),
        };
        self.highlighted_index
    }

    /// Find `record` among the current records: an exact value and label
    /// match first, then the value alone.
    fn position_of_record(&self, record: &OptionRecord) -> Option<usize> {
        self.options
            .iter()
            .position(|r| r.value == record.value && r.label == record.label)
            .or_else(|| self.position_of_value(&record.value))
    }

    /// Move the highlight one step through the eligible records, wrapping
    /// around at both ends.
    ///
    /// Without a current highlight, `Next` lands on the first eligible record
    /// and `Previous` on the last.
    pub(crate) fn move_highlight(&mut self, step: Step) -> Option<usize> {
        let eligible = self.eligible_indices();
        let count = eligible.len();
        if count == 0 {
            self.highlighted_index = None;
            return None;
        }
        let current = self
            .highlighted_index
            .and_then(|index| eligible.iter().position(|&e| e == index));
        let next = match (step, current) {
            (Step::Next, Some(pos)) => (pos + 1) % count,
            (Step::Next, None) => 0,
            (Step::Previous, Some(pos)) => (pos + count - 1) % count,
            (Step::Previous, None) => count - 1,
        };
        self.highlighted_index = Some(eligible[next]);
        self.highlighted_index
    }

    pub(crate) fn highlight_first(&mut self) -> Option<usize> {
        self.highlighted_index = self.first_eligible();
        self.highlighted_index
    }

    pub(crate) fn highlight_last(&mut self) -> Option<usize> {
        self.highlighted_index = self.last_eligible();
        self.highlighted_index
    }

    /// Make `index` the only selected record. Returns the previous selection.
    pub(crate) fn mark_selected(&mut self, index: usize) -> Option<usize> {
        let previous = self.selected_index;
        if let Some(prev) = previous
            && let Some(record) = self.options.get_mut(prev)
        {
            record.selected = false;
        }
        if let Some(record) = self.options.get_mut(index) {
            record.selected = true;
            self.selected_index = Some(index);
        }
        previous
    }

    /// Adjust the scroll offset so the highlighted record's row is within
    /// `rows` visible rows.
    pub(crate) fn scroll_highlight_into_view(&mut self, rows: usize) {
        let Some(index) = self.highlighted_index else {
            return;
        };
        let rows = rows.max(1);
        let row = self.options[..index].iter().filter(|r| !r.hidden).count();
        if row < self.scroll_offset {
            self.scroll_offset = row;
        } else if row >= self.scroll_offset + rows {
            self.scroll_offset = row + 1 - rows;
        }
    }

    pub(crate) fn reset_scroll(&mut self) {
        self.scroll_offset = 0;
    }
}
