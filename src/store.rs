//! Per-category fetch-and-cache controller.
//!
//! [`NewsStore`] owns the [`SessionState`] the view renders from. The view
//! never mutates state directly; it dispatches one of two actions:
//!
//! - [`NewsStore::select_category`]: switch sections, fetching only when the
//!   section has never been fetched successfully
//! - [`NewsStore::refresh`]: re-fetch the active section unconditionally
//!
//! Dispatching is synchronous and never waits on the network. An action that
//! needs data hands back a [`FetchTicket`]; the caller runs it against a
//! [`NewsSource`] whenever it likes and feeds the resulting
//! [`FetchCompletion`] back through [`NewsStore::complete`]. Several tickets
//! may be in flight at once; each completion is applied as one synchronous
//! state update.
//!
//! # Overlapping fetches for the same category
//!
//! Governed by [`StalePolicy`]. The default, [`StalePolicy::LastArrivedWins`],
//! applies every completion in arrival order, so a slow stale response can
//! overwrite a newer one. [`StalePolicy::LastIssuedWins`] tags every ticket
//! with a per-category generation and drops completions that are not the
//! latest issued for their category.

use crate::api::{FetchError, NewsSource};
use crate::models::{normalize_articles, ArticleRecord, Category, RawArticle, CATEGORIES};
use clap::ValueEnum;
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Errors returned by store actions. Fetch failures never show up here; they
/// are recorded in [`SessionState::last_error`] instead.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("unknown category `{0}`")]
    InvalidCategory(String),
}

/// How to resolve overlapping fetches for the same category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum StalePolicy {
    /// Whichever response arrives last is kept.
    #[default]
    LastArrivedWins,
    /// Only the most recently dispatched request may update state.
    LastIssuedWins,
}

/// Everything the view may read.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    active: &'static Category,
    cache: HashMap<&'static str, Vec<ArticleRecord>>,
    loading: bool,
    last_error: Option<String>,
}

impl SessionState {
    fn new() -> Self {
        Self {
            active: Category::default_category(),
            cache: HashMap::new(),
            // The initial fetch is implied from the first frame on.
            loading: true,
            last_error: None,
        }
    }

    pub fn active_category(&self) -> &'static Category {
        self.active
    }

    /// Cached records for `id`. `None` means never fetched successfully;
    /// `Some(&[])` means fetched and empty.
    pub fn articles(&self, id: &str) -> Option<&[ArticleRecord]> {
        self.cache.get(id).map(Vec::as_slice)
    }

    pub fn active_articles(&self) -> Option<&[ArticleRecord]> {
        self.articles(self.active.id)
    }

    pub fn is_cached(&self, id: &str) -> bool {
        self.cache.contains_key(id)
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn categories(&self) -> &'static [Category] {
        &CATEGORIES
    }
}

/// A fetch the store has decided to make but that has not run yet.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "a ticket does nothing until it is run and its completion applied"]
pub struct FetchTicket {
    category: &'static Category,
    generation: u64,
}

impl FetchTicket {
    pub fn category(&self) -> &'static Category {
        self.category
    }

    /// Perform the request. This is the only place the store's work waits.
    pub async fn run<S: NewsSource>(self, source: &S) -> FetchCompletion {
        let result = source.fetch(self.category).await;
        FetchCompletion {
            ticket: self,
            result,
        }
    }
}

/// Outcome of a [`FetchTicket`], ready to be applied to the store.
#[derive(Debug)]
pub struct FetchCompletion {
    ticket: FetchTicket,
    result: Result<Vec<RawArticle>, FetchError>,
}

impl FetchCompletion {
    pub fn category(&self) -> &'static Category {
        self.ticket.category
    }
}

/// The fetch-and-cache controller.
#[derive(Debug)]
pub struct NewsStore {
    state: SessionState,
    policy: StalePolicy,
    next_generation: u64,
    latest_issued: HashMap<&'static str, u64>,
}

impl NewsStore {
    pub fn new(policy: StalePolicy) -> Self {
        Self {
            state: SessionState::new(),
            policy,
            next_generation: 0,
            latest_issued: HashMap::new(),
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Initial load: behaves like selecting the default category.
    pub fn start(&mut self) -> Option<FetchTicket> {
        let id = self.state.active.id;
        self.select_category(id).ok().flatten()
    }

    /// Make `id` the active category.
    ///
    /// Returns a ticket only when `id` has never been fetched successfully.
    /// Revisiting a cached category shows the cached records without a
    /// request.
    ///
    /// # Errors
    ///
    /// [`StoreError::InvalidCategory`] if `id` is not one of the fixed
    /// categories. State is left untouched.
    pub fn select_category(&mut self, id: &str) -> Result<Option<FetchTicket>, StoreError> {
        let category =
            Category::lookup(id).ok_or_else(|| StoreError::InvalidCategory(id.to_string()))?;
        self.state.active = category;

        if self.state.is_cached(category.id) {
            debug!(category = %category.id, "Serving cached articles");
            return Ok(None);
        }
        Ok(Some(self.begin_fetch(category)))
    }

    /// Re-fetch the active category, cached or not.
    pub fn refresh(&mut self) -> FetchTicket {
        let category = self.state.active;
        self.begin_fetch(category)
    }

    fn begin_fetch(&mut self, category: &'static Category) -> FetchTicket {
        self.next_generation += 1;
        let generation = self.next_generation;
        self.latest_issued.insert(category.id, generation);
        self.state.loading = true;
        debug!(category = %category.id, generation, "Dispatching fetch");
        FetchTicket {
            category,
            generation,
        }
    }

    /// Apply a finished fetch. Returns `false` if the completion was dropped
    /// as stale under [`StalePolicy::LastIssuedWins`].
    pub fn complete(&mut self, completion: FetchCompletion) -> bool {
        let FetchCompletion { ticket, result } = completion;
        let category = ticket.category;

        if self.policy == StalePolicy::LastIssuedWins
            && self.latest_issued.get(category.id) != Some(&ticket.generation)
        {
            debug!(
                category = %category.id,
                generation = ticket.generation,
                "Dropping superseded response"
            );
            return false;
        }

        match result {
            Ok(raw) => {
                let records = normalize_articles(raw);
                info!(category = %category.id, count = records.len(), "Cached articles");
                self.state.cache.insert(category.id, records);
                self.state.last_error = None;
            }
            Err(e) => {
                warn!(category = %category.id, error = %e, "Fetch failed");
                self.state.last_error = Some(e.to_string());
            }
        }
        self.state.loading = false;
        true
    }
}

impl Default for NewsStore {
    fn default() -> Self {
        Self::new(StalePolicy::default())
    }
}
