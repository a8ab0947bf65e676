//! Cursor pagination for the home feed.
//!
//! The articles endpoint takes a page number plus the number of articles the
//! reader already holds (`totalNews`). Page 1 always replaces the list and
//! later pages append. An empty page ends the feed.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::in_flight::InFlight;
use crate::types::Language;

/// Items that can be found again in a loaded list.
pub trait Identified {
    type Id: PartialEq + Copy;

    fn key(&self) -> Self::Id;
}

/// Parameters for one page load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub language: Language,
    /// Already loaded items (`totalNews`); zero for the first page.
    pub offset: usize,
}

/// A paginated, language-scoped list held in the reader's session.
///
/// Starting a load takes `now` and a `hold`: the in-flight guard refuses a
/// second load until the first one reports back or `hold` has passed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feed<T> {
    language: Language,
    /// Last page that arrived; zero before the first.
    page: u32,
    items: Vec<T>,
    has_more: bool,
    loading: Option<InFlight<u32>>,
}

impl<T> Default for Feed<T> {
    fn default() -> Self {
        Self::new(Language::default())
    }
}

impl<T> Feed<T> {
    #[must_use]
    pub const fn new(language: Language) -> Self {
        Self {
            language,
            page: 0,
            items: Vec::new(),
            has_more: true,
            loading: None,
        }
    }

    #[must_use]
    pub const fn language(&self) -> Language {
        self.language
    }

    /// Last page that arrived.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    #[must_use]
    pub fn items(&self) -> &[T] {
        &self.items
    }

    #[must_use]
    pub const fn has_more(&self) -> bool {
        self.has_more
    }

    /// Whether a load started earlier still holds the guard at `now`.
    #[must_use]
    pub fn is_loading(&self, now: DateTime<Utc>) -> bool {
        self.loading.is_some_and(|load| load.is_active(now))
    }

    /// Start reloading page 1. `None` while another load is in flight.
    pub fn first_page_request(
        &mut self,
        now: DateTime<Utc>,
        hold: TimeDelta,
    ) -> Option<PageRequest> {
        self.begin(1, now, hold)
    }

    /// Start loading the page after the last one that arrived.
    ///
    /// `None` while another load is in flight or once the feed has ended.
    pub fn next_page_request(
        &mut self,
        now: DateTime<Utc>,
        hold: TimeDelta,
    ) -> Option<PageRequest> {
        if !self.has_more {
            return None;
        }
        self.begin(self.page.saturating_add(1), now, hold)
    }

    /// Switch language and start loading its first page.
    ///
    /// Selecting the current language does nothing and returns `None`.
    pub fn switch_language(
        &mut self,
        language: Language,
        now: DateTime<Utc>,
        hold: TimeDelta,
    ) -> Option<PageRequest> {
        if language == self.language || self.is_loading(now) {
            return None;
        }
        self.language = language;
        self.page = 0;
        self.items.clear();
        self.has_more = true;
        self.begin(1, now, hold)
    }

    fn begin(&mut self, page: u32, now: DateTime<Utc>, hold: TimeDelta) -> Option<PageRequest> {
        if self.is_loading(now) {
            return None;
        }
        self.loading = Some(InFlight::start(page, now, hold));
        Some(PageRequest {
            page,
            language: self.language,
            offset: if page == 1 { 0 } else { self.items.len() },
        })
    }

    /// A page arrived. Page 1 replaces the list, later pages append. An
    /// empty page ends the feed. Pages for another language are dropped.
    pub fn complete(&mut self, request: PageRequest, items: Vec<T>) {
        self.loading = None;
        if request.language != self.language {
            return;
        }
        self.page = request.page;
        if request.page == 1 {
            self.has_more = !items.is_empty();
            self.items = items;
        } else if items.is_empty() {
            self.has_more = false;
        } else {
            self.items.extend(items);
        }
    }

    /// A page load failed or was rejected. The feed stops paginating and
    /// keeps what it has.
    pub fn fail(&mut self) {
        self.loading = None;
        self.has_more = false;
    }
}

impl<T: Identified> Feed<T> {
    #[must_use]
    pub fn find(&self, id: T::Id) -> Option<&T> {
        self.items.iter().find(|item| item.key() == id)
    }

    pub fn find_mut(&mut self, id: T::Id) -> Option<&mut T> {
        self.items.iter_mut().find(|item| item.key() == id)
    }

    /// Drop an item without reloading. Returns whether it was present.
    pub fn remove(&mut self, id: T::Id) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.key() != id);
        self.items.len() != before
    }
}
