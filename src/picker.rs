//! Multi-select relation picker over the topic library.

use crate::api::{RelatedTopic, Topic};

/// Picker behaviour, fixed at start-up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickerSettings {
    pub single_selection: bool,
    pub select_all_text: &'static str,
    pub unselect_all_text: &'static str,
    /// Selected chips shown before collapsing into "+N more".
    pub items_show_limit: usize,
    pub allow_search_filter: bool,
}

impl Default for PickerSettings {
    fn default() -> Self {
        Self {
            single_selection: false,
            select_all_text: "Select All",
            unselect_all_text: "Unselect All",
            items_show_limit: 100,
            allow_search_filter: true,
        }
    }
}

/// A topic picked as related, keyed by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedTopic {
    pub topic: String,
}

/// Selection state plus the overlay's own cursor and search text.
#[derive(Debug, Clone, Default)]
pub struct RelationPicker {
    pub settings: PickerSettings,
    selected: Vec<SelectedTopic>,
    pub search: String,
    pub open: bool,
    /// Index into the filtered list.
    pub cursor: usize,
}

impl RelationPicker {
    pub fn new(settings: PickerSettings) -> Self {
        Self {
            settings,
            ..Default::default()
        }
    }

    pub fn selected(&self) -> &[SelectedTopic] {
        &self.selected
    }

    pub fn selected_names(&self) -> Vec<String> {
        self.selected.iter().map(|s| s.topic.clone()).collect()
    }

    pub fn is_selected(&self, name: &str) -> bool {
        self.selected.iter().any(|s| s.topic == name)
    }

    /// Add `name` unless it is empty or already selected.
    pub fn select(&mut self, name: &str) {
        if name.is_empty() || self.is_selected(name) {
            return;
        }
        if self.settings.single_selection {
            self.selected.clear();
        }
        self.selected.push(SelectedTopic {
            topic: name.to_string(),
        });
    }

    pub fn deselect(&mut self, name: &str) {
        self.selected.retain(|s| s.topic != name);
    }

    /// Toggle `name`; returns whether it is selected afterwards.
    pub fn toggle(&mut self, name: &str) -> bool {
        if self.is_selected(name) {
            self.deselect(name);
            false
        } else {
            self.select(name);
            self.is_selected(name)
        }
    }

    /// Replace the selection with every named item in `items`.
    pub fn select_all<'a>(&mut self, items: impl IntoIterator<Item = &'a str>) {
        self.selected.clear();
        for name in items {
            self.select(name);
        }
    }

    pub fn deselect_all(&mut self) {
        self.selected.clear();
    }

    /// Seed the selection from a topic's stored relations.
    pub fn set_from_related(&mut self, related: &[RelatedTopic]) {
        self.select_all(related.iter().map(|r| r.topic.as_str()));
    }

    /// Library entries matching the search text, case-insensitively.
    pub fn visible<'a>(&self, library: &'a [Topic]) -> Vec<&'a Topic> {
        let needle = self.search.trim().to_lowercase();
        library
            .iter()
            .filter(|t| !t.topic.is_empty())
            .filter(|t| {
                !self.settings.allow_search_filter
                    || needle.is_empty()
                    || t.topic.to_lowercase().contains(&needle)
            })
            .collect()
    }

    pub fn open(&mut self) {
        self.open = true;
        self.search.clear();
        self.cursor = 0;
    }

    pub fn close(&mut self) {
        self.open = false;
        self.search.clear();
        self.cursor = 0;
    }

    /// Forget selections and overlay state; settings stay.
    pub fn reset(&mut self) {
        self.selected.clear();
        self.close();
    }

    pub fn move_cursor(&mut self, delta: isize, visible_len: usize) {
        if visible_len == 0 {
            self.cursor = 0;
            return;
        }
        let max = visible_len - 1;
        self.cursor = self.cursor.saturating_add_signed(delta).min(max);
    }

    /// Chips to render and how many were collapsed.
    pub fn chips(&self) -> (&[SelectedTopic], usize) {
        let limit = self.settings.items_show_limit.min(self.selected.len());
        (&self.selected[..limit], self.selected.len() - limit)
    }
}
