//! Interactive driver: reads commands, dispatches store actions, runs fetches,
//! and redraws after every state change.
//!
//! Everything runs on one task. Fetches are polled side by side in a
//! [`FuturesUnordered`] next to the input stream, so the prompt stays live
//! while requests are outstanding and completions are applied one at a time
//! in the order they finish.

use crate::api::NewsSource;
use crate::models::CATEGORIES;
use crate::render::{Masthead, Theme};
use crate::store::{FetchTicket, NewsStore, SessionState};
use futures::stream::{FuturesUnordered, StreamExt};
use std::io::{self, Write};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, info, warn};

/// One line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Select(String),
    Refresh,
    ToggleTheme,
    Quit,
    Redraw,
}

/// Parse a line of input. Numbers pick a section by navigation position;
/// anything unrecognised is treated as a category id.
pub fn parse_command(line: &str) -> Command {
    let line = line.trim();
    match line.to_ascii_lowercase().as_str() {
        "" => Command::Redraw,
        "r" | "refresh" => Command::Refresh,
        "t" | "theme" => Command::ToggleTheme,
        "q" | "quit" | "exit" => Command::Quit,
        other => match other.parse::<usize>() {
            Ok(n) if (1..=CATEGORIES.len()).contains(&n) => {
                Command::Select(CATEGORIES[n - 1].id.to_string())
            }
            _ => Command::Select(other.to_string()),
        },
    }
}

/// The view layer: owns the store, the news source, and the output.
pub struct App<S, W> {
    store: NewsStore,
    source: S,
    theme: Theme,
    masthead: Masthead,
    out: W,
}

impl<S, W> App<S, W>
where
    S: NewsSource,
    W: Write,
{
    pub fn new(store: NewsStore, source: S, theme: Theme, masthead: Masthead, out: W) -> Self {
        Self {
            store,
            source,
            theme,
            masthead,
            out,
        }
    }

    pub fn state(&self) -> &SessionState {
        self.store.state()
    }

    /// Run until `quit`, or until input closes and every outstanding fetch
    /// has been applied.
    pub async fn run<R>(&mut self, input: R) -> io::Result<()>
    where
        R: AsyncBufRead + Unpin,
    {
        let Self {
            store,
            source,
            theme,
            masthead,
            out,
        } = self;
        let source: &S = source;

        let mut lines = input.lines();
        let mut input_open = true;
        let mut in_flight = FuturesUnordered::new();

        if let Some(ticket) = store.start() {
            in_flight.push(ticket.run(source));
        }
        draw(out, *theme, masthead, store.state())?;

        loop {
            tokio::select! {
                biased;

                Some(completion) = in_flight.next(), if !in_flight.is_empty() => {
                    let category = completion.category().id;
                    if store.complete(completion) {
                        draw(out, *theme, masthead, store.state())?;
                    } else {
                        debug!(%category, "Superseded response ignored");
                    }
                }

                line = lines.next_line(), if input_open => {
                    let line = match line {
                        Ok(Some(line)) => line,
                        Ok(None) => {
                            debug!(pending = in_flight.len(), "Input closed");
                            input_open = false;
                            continue;
                        }
                        // The offending line has already been consumed.
                        Err(e) if e.kind() == io::ErrorKind::InvalidData => {
                            warn!(error = %e, "Skipping unreadable input line");
                            continue;
                        }
                        Err(e) => return Err(e),
                    };

                    let ticket: Option<FetchTicket> = match parse_command(&line) {
                        Command::Quit => {
                            info!(pending = in_flight.len(), "Quit requested");
                            break;
                        }
                        Command::Redraw => None,
                        Command::ToggleTheme => {
                            *theme = theme.toggled();
                            None
                        }
                        Command::Refresh => Some(store.refresh()),
                        Command::Select(id) => match store.select_category(&id) {
                            Ok(ticket) => ticket,
                            Err(e) => {
                                warn!(error = %e, "Ignoring selection");
                                writeln!(out, "{e}")?;
                                None
                            }
                        },
                    };

                    if let Some(ticket) = ticket {
                        debug!(
                            category = %ticket.category().id,
                            pending = in_flight.len(),
                            "Queueing fetch"
                        );
                        in_flight.push(ticket.run(source));
                    }
                    draw(out, *theme, masthead, store.state())?;
                }

                else => break,
            }
        }

        out.flush()
    }
}

fn draw<W: Write>(
    out: &mut W,
    theme: Theme,
    masthead: &Masthead,
    state: &SessionState,
) -> io::Result<()> {
    let frame = theme.renderer().render(masthead, state);
    writeln!(out, "{frame}")?;
    out.flush()
}
