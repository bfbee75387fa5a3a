//! Widget configuration.
//!
//! Every field has a default, so a host only sets what it wants to change,
//! either through the `with_*` builder methods or from TOML:
//!
//! ```
//! use sift_select::SearchSelectConfig;
//!
//! let config = SearchSelectConfig::from_toml_str(r#"
//!     placeholder = "Choose a fruit"
//!     max_visible_items = 6
//! "#).unwrap();
//!
//! assert_eq!(config.placeholder, "Choose a fruit");
//! assert_eq!(config.search_placeholder, "Search..");
//! ```

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Default display text when nothing is selected and the control has no
/// empty-valued leading option.
pub const DEFAULT_PLACEHOLDER: &str = "Select an option...";
/// Default placeholder of the search field.
pub const DEFAULT_SEARCH_PLACEHOLDER: &str = "Search..";
/// Default accessible label of the search field.
pub const DEFAULT_SEARCH_LABEL: &str = "Search options";
/// Default prefix of generated option ids.
pub const DEFAULT_ID_PREFIX: &str = "search-select-option";
/// Default number of option rows the dropdown shows before scrolling.
pub const DEFAULT_MAX_VISIBLE_ITEMS: usize = 10;

/// Configuration for a [`SearchSelect`](crate::SearchSelect).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSelectConfig {
    /// Fallback display text when nothing is selected.
    ///
    /// Only used when the first native option does not have an empty value;
    /// otherwise that option's text is the placeholder.
    pub placeholder: String,
    /// Placeholder text of the search field.
    pub search_placeholder: String,
    /// Accessible label of the search field.
    pub search_label: String,
    /// Number of option rows visible at once; at least 1.
    pub max_visible_items: usize,
    /// Prefix of generated option ids.
    pub id_prefix: String,
}

impl Default for SearchSelectConfig {
    fn default() -> Self {
        Self {
            placeholder: DEFAULT_PLACEHOLDER.to_owned(),
            search_placeholder: DEFAULT_SEARCH_PLACEHOLDER.to_owned(),
            search_label: DEFAULT_SEARCH_LABEL.to_owned(),
            max_visible_items: DEFAULT_MAX_VISIBLE_ITEMS,
            id_prefix: DEFAULT_ID_PREFIX.to_owned(),
        }
    }
}

impl SearchSelectConfig {
    /// Create a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a configuration from TOML, filling unspecified fields with defaults.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let mut config: Self = toml::from_str(text)?;
        config.max_visible_items = config.max_visible_items.max(1);
        Ok(config)
    }

    /// Set the fallback placeholder using builder pattern.
    pub fn with_placeholder(mut self, text: impl Into<String>) -> Self {
        self.placeholder = text.into();
        self
    }

    /// Set the search field placeholder using builder pattern.
    pub fn with_search_placeholder(mut self, text: impl Into<String>) -> Self {
        self.search_placeholder = text.into();
        self
    }

    /// Set the search field's accessible label using builder pattern.
    pub fn with_search_label(mut self, text: impl Into<String>) -> Self {
        self.search_label = text.into();
        self
    }

    /// Set the number of visible rows using builder pattern.
    pub fn with_max_visible_items(mut self, count: usize) -> Self {
        self.max_visible_items = count.max(1);
        self
    }

    /// Set the option id prefix using builder pattern.
    pub fn with_id_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.id_prefix = prefix.into();
        self
    }
}
