//! Single-column digest theme.

use super::{format_masthead_date, local_published_time, Masthead, Renderer};
use crate::models::ArticleRecord;
use crate::store::SessionState;
use itertools::Itertools;
use std::fmt::Write;

#[derive(Debug, Clone, Copy, Default)]
pub struct DigestTheme;

impl Renderer for DigestTheme {
    fn masthead(&self, page: &Masthead, out: &mut String) {
        let title = format!("{} | {}", page.brand, format_masthead_date(page.today));
        let _ = writeln!(out, "{title}");
        let _ = writeln!(out, "{}", page.tagline);
        let _ = writeln!(out, "{}", "-".repeat(title.chars().count()));
    }

    fn navigation(&self, state: &SessionState, out: &mut String) {
        let active = state.active_category().id;
        let tabs = state
            .categories()
            .iter()
            .map(|c| {
                if c.id == active {
                    format!("*{}*", c.display_name)
                } else {
                    c.display_name.to_string()
                }
            })
            .join(" | ");
        let _ = writeln!(out, "{tabs}");
    }

    fn articles(&self, records: &[ArticleRecord], out: &mut String) {
        for record in records {
            let time = local_published_time(&record.published_at);
            let _ = writeln!(out, "{:>3}. {}", record.ordinal, record.title);
            if time.is_empty() {
                let _ = writeln!(out, "     {}", record.source_name);
            } else {
                let _ = writeln!(out, "     {}, {time}", record.source_name);
            }
            let _ = writeln!(out, "     {}", record.snippet);
            if !record.url.is_empty() {
                let _ = writeln!(out, "     {}", record.url);
            }
            out.push('\n');
        }
    }
}
