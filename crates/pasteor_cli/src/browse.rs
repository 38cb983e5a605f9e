//! Interactive dashboard REPL over the session worker.
//!
//! The REPL thread sends commands and polls events, exactly as a GUI frame
//! loop would; all fetch sequencing lives in the session worker.

use std::io::{self, BufRead, Write};
use std::time::{Duration, Instant};

use anyhow::Result;

use pasteor_client::{ApiClient, AuthSession};
use pasteor_core::models::{AggregateStats, ListResult};
use pasteor_core::{Query, SortKey};
use pasteor_session::{spawn_session, SessionCmd, SessionEvent, SessionHandle};

/// How long each prompt cycle waits for fresh events before rendering.
const POLL_WINDOW: Duration = Duration::from_millis(400);

#[derive(Debug, Clone, PartialEq, Eq)]
enum BrowseCmd {
    Search(String),
    Language(Option<String>),
    Sort(SortKey),
    Page(u32),
    NextPage,
    PrevPage,
    Reset,
    Refresh,
    Delete(String),
    Help,
    Quit,
}

fn parse_command(line: &str) -> Result<BrowseCmd, String> {
    let line = line.trim();
    let (cmd, rest) = match line.split_once(char::is_whitespace) {
        Some((cmd, rest)) => (cmd, rest.trim()),
        None => (line, ""),
    };
    match cmd {
        "/s" | "/search" => Ok(BrowseCmd::Search(rest.to_string())),
        "/l" | "/lang" => Ok(BrowseCmd::Language(if rest.is_empty() || rest == "all" {
            None
        } else {
            Some(rest.to_string())
        })),
        "/o" | "/sort" => rest.parse().map(BrowseCmd::Sort),
        "/p" | "/page" => rest
            .parse()
            .map(BrowseCmd::Page)
            .map_err(|_| format!("not a page number: '{rest}'")),
        "n" | "next" => Ok(BrowseCmd::NextPage),
        "p" | "prev" => Ok(BrowseCmd::PrevPage),
        "/reset" => Ok(BrowseCmd::Reset),
        "/r" | "/refresh" => Ok(BrowseCmd::Refresh),
        "/d" | "/delete" => {
            if rest.is_empty() {
                Err("usage: /d <paste id>".to_string())
            } else {
                Ok(BrowseCmd::Delete(rest.to_string()))
            }
        }
        "?" | "/help" => Ok(BrowseCmd::Help),
        "q" | "/q" | "quit" => Ok(BrowseCmd::Quit),
        other => Err(format!("unknown command '{other}' (? for help)")),
    }
}

/// Rendered state accumulated from session events.
#[derive(Debug, Default)]
struct BrowseView {
    query: Option<Query>,
    list: Option<ListResult>,
    stats: Option<AggregateStats>,
    languages: Vec<String>,
    notices: Vec<String>,
}

impl BrowseView {
    fn apply(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::QueryChanged { query } => self.query = Some(query),
            SessionEvent::ListUpdated { result } => self.list = Some(result),
            SessionEvent::StatsUpdated { stats } => self.stats = Some(stats),
            SessionEvent::LanguagesUpdated { languages } => self.languages = languages,
            SessionEvent::Deleted { id } => self.notices.push(format!("Deleted paste {id}")),
            SessionEvent::NotFound { id } => {
                self.notices.push(format!("Paste {id} no longer exists"))
            }
            SessionEvent::Error { message } => self.notices.push(message),
            SessionEvent::AuthRequired => {
                eprintln!("Session expired. Run: pasteor login");
                std::process::exit(2);
            }
            // Owner sessions do not receive the public landing events.
            SessionEvent::RecentUpdated { .. }
            | SessionEvent::PublicStatsUpdated { .. }
            | SessionEvent::Created { .. }
            | SessionEvent::Updated { .. } => {}
        }
    }

    fn current_page(&self) -> u32 {
        self.query.as_ref().map(|query| query.page).unwrap_or(1)
    }

    fn total_pages(&self) -> u32 {
        self.list
            .as_ref()
            .map(|list| list.total_pages.max(1))
            .unwrap_or(1)
    }

    /// The view clamps page jumps before sending them, like any pager UI.
    fn next_page(&self) -> u32 {
        (self.current_page() + 1).min(self.total_pages())
    }

    fn prev_page(&self) -> u32 {
        self.current_page().saturating_sub(1).max(1)
    }

    fn render(&mut self) {
        for notice in self.notices.drain(..) {
            println!("* {notice}");
        }
        if let Some(stats) = &self.stats {
            println!(
                "{} pastes, {} views, {} active",
                stats.total_pastes, stats.total_views, stats.active_pastes
            );
        }
        if let Some(query) = &self.query {
            let language = query.language.as_deref().unwrap_or("all");
            if !query.search.is_empty() || query.language.is_some() {
                println!(
                    "filter: \"{}\" language={} sort={}",
                    query.search, language, query.sort
                );
            }
        }
        match &self.list {
            Some(list) if list.items.is_empty() => println!("No pastes match"),
            Some(list) => {
                println!("{}", crate::output::format_summary_rows(&list.items));
                println!(
                    "Page {} of {} ({} pastes)",
                    list.page,
                    list.total_pages.max(1),
                    list.total_count
                );
            }
            None => println!("Loading..."),
        }
    }
}

fn drain_events(session: &SessionHandle, view: &mut BrowseView, window: Duration) {
    let deadline = Instant::now() + window;
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return;
        }
        match session.evt_rx.recv_timeout(remaining) {
            Ok(event) => view.apply(event),
            Err(_) => return,
        }
    }
}

fn print_help() {
    println!("/s <text>   search            /l <lang>  filter language (or 'all')");
    println!("/o <key>    sort: date|views|title");
    println!("/p <n>      jump to page      n / p      next / previous page");
    println!("/d <id>     delete paste      /r         refresh");
    println!("/reset      clear filters     q          quit");
}

pub fn run(api: ApiClient, auth: &AuthSession) -> Result<()> {
    let Some(token) = auth.token() else {
        eprintln!("You are not logged in. Run: pasteor login");
        std::process::exit(2);
    };
    let session = spawn_session(api, Some(token.to_string()));
    let mut view = BrowseView::default();
    println!("Pasteor dashboard. ? for help, q to quit.");

    let stdin = io::stdin();
    loop {
        drain_events(&session, &mut view, POLL_WINDOW);
        view.render();
        print!("> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        if line.trim().is_empty() {
            continue;
        }

        match parse_command(&line) {
            Err(message) => println!("{message}"),
            Ok(BrowseCmd::Quit) => break,
            Ok(BrowseCmd::Help) => print_help(),
            Ok(cmd) => {
                let session_cmd = match cmd {
                    BrowseCmd::Search(text) => SessionCmd::SetSearch(text),
                    BrowseCmd::Language(language) => SessionCmd::SetLanguage(language),
                    BrowseCmd::Sort(sort) => SessionCmd::SetSort(sort),
                    BrowseCmd::Page(page) => {
                        SessionCmd::SetPage(page.clamp(1, view.total_pages()))
                    }
                    BrowseCmd::NextPage => SessionCmd::SetPage(view.next_page()),
                    BrowseCmd::PrevPage => SessionCmd::SetPage(view.prev_page()),
                    BrowseCmd::Reset => SessionCmd::ResetFilters,
                    BrowseCmd::Refresh => SessionCmd::Refresh,
                    BrowseCmd::Delete(id) => SessionCmd::Delete { id },
                    BrowseCmd::Help | BrowseCmd::Quit => unreachable!("handled above"),
                };
                let _ = session.cmd_tx.send(session_cmd);
            }
        }
    }

    let _ = session.cmd_tx.send(SessionCmd::Shutdown);
    Ok(())
}
