// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

use crate::catalog::{self, CategoryOption};
use crate::model::{Channel, EpgMap};

/// Everything the client knows for one run: the channel catalog, the EPG map,
/// the current selection and the filter inputs.
///
/// State is only ever read or replaced wholesale; nothing here talks to the
/// network or the player.
#[derive(Debug, Default)]
pub struct Session {
    catalog: Vec<Channel>,
    epg: EpgMap,
    selected: Option<Channel>,
    search_term: String,
    category: String,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn catalog(&self) -> &[Channel] {
        &self.catalog
    }

    pub fn epg(&self) -> &EpgMap {
        &self.epg
    }

    pub fn selected(&self) -> Option<&Channel> {
        self.selected.as_ref()
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    /// Swap in a new catalog. Filters are cleared so the whole new catalog is
    /// visible; the selection is kept so playback is not interrupted.
    pub fn replace_catalog(&mut self, channels: Vec<Channel>) {
        self.catalog = channels;
        self.search_term.clear();
        self.category.clear();
    }

    pub fn replace_epg(&mut self, epg: EpgMap) {
        self.epg = epg;
    }

    pub fn select(&mut self, channel: Channel) {
        self.selected = Some(channel);
    }

    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.search_term = term.into();
    }

    pub fn set_category(&mut self, category: impl Into<String>) {
        self.category = category.into();
    }

    /// Channels passing the current search and category filters.
    pub fn visible(&self) -> Vec<&Channel> {
        catalog::filter(&self.catalog, &self.search_term, &self.category)
    }

    pub fn category_options(&self) -> Vec<CategoryOption> {
        catalog::category_options(&self.catalog)
    }

    pub fn find(&self, name: &str) -> Option<&Channel> {
        self.catalog.iter().rev().find(|ch| ch.name == name)
    }

    pub fn is_selected(&self, name: &str) -> bool {
        self.selected.as_ref().is_some_and(|ch| ch.name == name)
    }
}
