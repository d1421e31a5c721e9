//! Text renderers for the session state.
//!
//! A renderer is a pure function of a [`Masthead`] and a [`SessionState`]:
//! it never touches the store and never decides to fetch. Both themes share
//! the page frame and differ only in masthead, navigation, and article layout.
//!
//! # Submodules
//!
//! - [`cards`]: Three-column card grid
//! - [`digest`]: Single-column headline list
//!
//! # Page Structure
//!
//! ```text
//! masthead            brand, tagline, today's date
//! navigation          the six categories, active one marked
//! heading             "<Category> Today"
//! error banner        only while the store holds an error
//! body                loading indicator | articles | empty notice
//! footer              copyright line and key hints
//! ```

pub mod cards;
pub mod digest;

use crate::models::ArticleRecord;
use crate::store::SessionState;
use chrono::{DateTime, Datelike, Local, NaiveDate, TimeZone};
use clap::ValueEnum;
use std::fmt::Display;
use std::fmt::Write;

pub const LOADING_TEXT: &str = "Loading latest news...";
pub const EMPTY_TEXT: &str = "No news articles available for this category.";
pub const KEY_HINTS: &str = "[1-6] section  [r] refresh  [t] theme  [q] quit";

/// Static page furniture that is not part of the store's state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Masthead {
    pub brand: String,
    pub tagline: String,
    pub today: NaiveDate,
}

impl Masthead {
    pub fn new(brand: impl Into<String>, tagline: impl Into<String>, today: NaiveDate) -> Self {
        Self {
            brand: brand.into(),
            tagline: tagline.into(),
            today,
        }
    }
}

/// Visual theme. Both themes render identical state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum Theme {
    #[default]
    Cards,
    Digest,
}

impl Theme {
    pub fn renderer(self) -> &'static dyn Renderer {
        match self {
            Theme::Cards => &cards::CardsTheme,
            Theme::Digest => &digest::DigestTheme,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Cards => Theme::Digest,
            Theme::Digest => Theme::Cards,
        }
    }
}

/// A theme. Implementors supply the three theme-specific sections; the
/// page frame is shared.
pub trait Renderer {
    fn masthead(&self, page: &Masthead, out: &mut String);

    fn navigation(&self, state: &SessionState, out: &mut String);

    fn articles(&self, records: &[ArticleRecord], out: &mut String);

    /// Render a complete frame.
    fn render(&self, page: &Masthead, state: &SessionState) -> String {
        let mut out = String::new();
        self.masthead(page, &mut out);
        self.navigation(state, &mut out);

        let _ = writeln!(out, "\n{} Today\n", state.active_category().display_name);
        if let Some(error) = state.last_error() {
            let _ = writeln!(out, "!! Error loading news: {error}\n");
        }

        if state.is_loading() {
            let _ = writeln!(out, "{LOADING_TEXT}");
        } else {
            match state.active_articles() {
                Some(records) if !records.is_empty() => self.articles(records, &mut out),
                _ => {
                    let _ = writeln!(out, "{EMPTY_TEXT}");
                }
            }
        }

        let _ = writeln!(
            out,
            "\n© {} {}. All rights reserved.\n{KEY_HINTS}",
            page.today.year(),
            page.brand
        );
        out
    }
}

/// Masthead date, e.g. `19 October 2026`.
pub fn format_masthead_date(date: NaiveDate) -> String {
    date.format("%-d %B %Y").to_string()
}

/// Publication time as `hh:mm AM/PM` in `tz`. Anything that is not RFC 3339
/// is shown as sent.
pub fn format_published_time<Tz>(raw: &str, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    match DateTime::parse_from_rfc3339(raw) {
        Ok(ts) => ts.with_timezone(tz).format("%I:%M %p").to_string(),
        Err(_) => raw.to_string(),
    }
}

/// Publication time in the viewer's local zone.
pub fn local_published_time(raw: &str) -> String {
    format_published_time(raw, &Local)
}
