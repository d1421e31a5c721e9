//! Test doubles for the network seam.

use crate::api::{FetchError, NewsSource};
use crate::models::{Category, RawArticle};
use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};

/// A [`NewsSource`] that records every call and answers from per-category
/// queues. An empty queue answers with an empty article list.
#[derive(Debug, Default)]
pub struct ScriptedSource {
    calls: RefCell<Vec<&'static str>>,
    responses: RefCell<HashMap<&'static str, VecDeque<Result<Vec<RawArticle>, FetchError>>>>,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the next answer for `id`, in call order.
    pub fn respond(&self, id: &str, response: Result<Vec<RawArticle>, FetchError>) {
        let category = Category::lookup(id).expect("scripted category must exist");
        self.responses
            .borrow_mut()
            .entry(category.id)
            .or_default()
            .push_back(response);
    }

    /// Category ids requested so far, in order.
    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.borrow().clone()
    }
}

impl NewsSource for ScriptedSource {
    async fn fetch(&self, category: &'static Category) -> Result<Vec<RawArticle>, FetchError> {
        self.calls.borrow_mut().push(category.id);
        self.responses
            .borrow_mut()
            .get_mut(category.id)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}

/// Raw articles with the given titles and a fixed source.
pub fn articles(titles: &[&str]) -> Vec<RawArticle> {
    titles
        .iter()
        .map(|title| RawArticle {
            title: Some(title.to_string()),
            description: Some(format!("About {title}")),
            source: Some("Test Wire".to_string()),
            url: Some(format!("https://example.com/{}", title.to_lowercase())),
            url_to_image: None,
            published_at: Some("2025-05-06T14:05:00Z".to_string()),
        })
        .collect()
}
