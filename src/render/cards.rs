//! Card grid theme.
//!
//! Articles are laid out three to a row in fixed-width boxes. Each card shows
//! the ordinal and title, the snippet, the source with its publication time,
//! the article link, and the image location.

use super::{format_masthead_date, local_published_time, Masthead, Renderer};
use crate::models::ArticleRecord;
use crate::store::SessionState;
use crate::utils::fit;
use itertools::Itertools;
use std::fmt::Write;

const COLUMNS: usize = 3;
/// Inner width of one card, excluding the border.
const CARD_WIDTH: usize = 34;
const PAGE_WIDTH: usize = COLUMNS * (CARD_WIDTH + 4) + (COLUMNS - 1);

#[derive(Debug, Clone, Copy, Default)]
pub struct CardsTheme;

impl Renderer for CardsTheme {
    fn masthead(&self, page: &Masthead, out: &mut String) {
        let left = format!(" {}  {}", page.brand.to_uppercase(), page.tagline);
        let right = format!("{} ", format_masthead_date(page.today));
        let gap = PAGE_WIDTH.saturating_sub(left.chars().count() + right.chars().count());

        let _ = writeln!(out, "{}", "=".repeat(PAGE_WIDTH));
        let _ = writeln!(out, "{left}{}{right}", " ".repeat(gap.max(1)));
        let _ = writeln!(out, "{}", "=".repeat(PAGE_WIDTH));
    }

    fn navigation(&self, state: &SessionState, out: &mut String) {
        let active = state.active_category().id;
        let tabs = state
            .categories()
            .iter()
            .enumerate()
            .map(|(i, c)| {
                if c.id == active {
                    format!("[{} {}]", i + 1, c.display_name)
                } else {
                    format!(" {} {} ", i + 1, c.display_name)
                }
            })
            .join(" ");
        let _ = writeln!(out, " {tabs}");
    }

    fn articles(&self, records: &[ArticleRecord], out: &mut String) {
        for row in &records.iter().chunks(COLUMNS) {
            let cards: Vec<Vec<String>> = row.map(card_lines).collect();
            let height = cards.first().map(Vec::len).unwrap_or(0);
            for line in 0..height {
                let joined = cards.iter().map(|card| card[line].as_str()).join(" ");
                let _ = writeln!(out, "{joined}");
            }
        }
    }
}

fn card_lines(record: &ArticleRecord) -> Vec<String> {
    let border = format!("+{}+", "-".repeat(CARD_WIDTH + 2));
    let time = local_published_time(&record.published_at);
    let byline = if time.is_empty() {
        record.source_name.clone()
    } else {
        let room = CARD_WIDTH.saturating_sub(time.chars().count() + 1);
        format!("{} {time}", fit(&record.source_name, room))
    };

    let body = [
        format!("{}. {}", record.ordinal, record.title),
        record.snippet.clone(),
        byline,
        record.url.clone(),
        format!("img: {}", record.image_url),
    ];

    let mut lines = Vec::with_capacity(body.len() + 2);
    lines.push(border.clone());
    lines.extend(body.iter().map(|text| format!("| {} |", fit(text, CARD_WIDTH))));
    lines.push(border);
    lines
}
