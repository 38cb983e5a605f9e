//! Background worker that executes queries and mutations for a session.

use std::time::Instant;

use crossbeam_channel::{unbounded, Receiver, Sender};
use tokio::sync::mpsc;
use tracing::{error, info};

use pasteor_client::ApiClient;
use pasteor_core::composer::Composer;
use pasteor_core::config::env_flag_enabled;
use pasteor_core::models::{
    AggregateStats, ListResult, PasteMetadata, PasteSummary, PublicStats,
};
use pasteor_core::refresh::{Mutation, RefreshPlan};
use pasteor_core::sync::{FetchSlot, ListView, SlotOutcome};
use pasteor_core::{ApiError, QueryController};

use crate::protocol::{SessionCmd, SessionEvent};

/// Handle for sending commands to, and receiving events from, a session
/// worker. Dropping the command sender shuts the worker down.
pub struct SessionHandle {
    pub cmd_tx: mpsc::UnboundedSender<SessionCmd>,
    pub evt_rx: Receiver<SessionEvent>,
}

/// Completions reported by fetch and mutation tasks back to the worker loop.
#[derive(Debug)]
enum FetchDone {
    List {
        seq: u64,
        started: Instant,
        result: Result<ListResult, ApiError>,
    },
    Stats {
        seq: u64,
        result: Result<AggregateStats, ApiError>,
    },
    Languages {
        seq: u64,
        result: Result<Vec<String>, ApiError>,
    },
    Recent {
        seq: u64,
        result: Result<Vec<PasteSummary>, ApiError>,
    },
    PublicStats {
        seq: u64,
        result: Result<PublicStats, ApiError>,
    },
    Created {
        from_dashboard: bool,
        result: Result<PasteMetadata, ApiError>,
    },
    Updated {
        id: String,
        result: Result<PasteMetadata, ApiError>,
    },
    Deleted {
        id: String,
        result: Result<(), ApiError>,
    },
}

/// Spawn the session worker on its own thread with a current-thread runtime.
///
/// The token decides the session scope: owner-scoped sources (my list, my
/// stats, language facets) when present, the public landing sources when not.
///
/// # Panics
/// Panics if the worker thread or its runtime cannot be created.
pub fn spawn_session(api: ApiClient, token: Option<String>) -> SessionHandle {
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
    let (evt_tx, evt_rx) = unbounded();

    std::thread::Builder::new()
        .name("pasteor-session".to_string())
        .spawn(move || {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .expect("session runtime");
            rt.block_on(run(api, token, cmd_rx, evt_tx));
        })
        .expect("spawn session thread");

    SessionHandle { cmd_tx, evt_rx }
}

async fn run(
    api: ApiClient,
    token: Option<String>,
    mut cmd_rx: mpsc::UnboundedReceiver<SessionCmd>,
    evt_tx: Sender<SessionEvent>,
) {
    let (done_tx, mut done_rx) = mpsc::unbounded_channel();
    let mut worker = Worker::new(api, token, evt_tx, done_tx);
    worker.start();

    loop {
        tokio::select! {
            cmd = cmd_rx.recv() => match cmd {
                None | Some(SessionCmd::Shutdown) => break,
                Some(cmd) => worker.handle_cmd(cmd),
            },
            Some(done) = done_rx.recv() => worker.handle_done(done),
        }
    }

    worker.close();
}

struct Worker {
    api: ApiClient,
    token: Option<String>,
    evt_tx: Sender<SessionEvent>,
    done_tx: mpsc::UnboundedSender<FetchDone>,
    ctl: QueryController,
    list: ListView,
    stats: FetchSlot<AggregateStats>,
    languages: FetchSlot<Vec<String>>,
    recent: FetchSlot<Vec<PasteSummary>>,
    public_stats: FetchSlot<PublicStats>,
    auth_redirected: bool,
    perf_log: bool,
}

impl Worker {
    fn new(
        api: ApiClient,
        token: Option<String>,
        evt_tx: Sender<SessionEvent>,
        done_tx: mpsc::UnboundedSender<FetchDone>,
    ) -> Self {
        Self {
            api,
            token,
            evt_tx,
            done_tx,
            ctl: QueryController::new(),
            list: ListView::new(),
            stats: FetchSlot::new(),
            languages: FetchSlot::new(),
            recent: FetchSlot::new(),
            public_stats: FetchSlot::new(),
            auth_redirected: false,
            perf_log: env_flag_enabled("PASTEOR_SESSION_PERF_LOG"),
        }
    }

    fn emit(&self, event: SessionEvent) {
        let _ = self.evt_tx.send(event);
    }

    fn emit_query_changed(&self) {
        self.emit(SessionEvent::QueryChanged {
            query: self.ctl.query().clone(),
        });
    }

    fn emit_auth_required(&mut self) {
        if !self.auth_redirected {
            self.auth_redirected = true;
            self.emit(SessionEvent::AuthRequired);
        }
    }

    /// Initial fan-out: every source for the session's scope fetches
    /// concurrently and applies independently.
    fn start(&mut self) {
        if self.token.is_some() {
            self.emit_query_changed();
            self.fetch_list();
            self.fetch_stats();
            self.fetch_languages();
        } else {
            self.fetch_recent();
            self.fetch_public_stats();
        }
    }

    fn handle_cmd(&mut self, cmd: SessionCmd) {
        match cmd {
            SessionCmd::SetSearch(text) => {
                if self.ctl.set_search(&text) {
                    self.on_query_changed();
                }
            }
            SessionCmd::SetLanguage(language) => {
                if self.ctl.set_language(language.as_deref()) {
                    self.on_query_changed();
                }
            }
            SessionCmd::SetSort(sort) => {
                if self.ctl.set_sort(sort) {
                    self.on_query_changed();
                }
            }
            SessionCmd::SetPage(page) => {
                if self.ctl.set_page(page) {
                    self.on_query_changed();
                }
            }
            SessionCmd::ResetFilters => {
                if self.ctl.reset_filters() {
                    self.on_query_changed();
                }
            }
            SessionCmd::Refresh => {
                if self.token.is_some() {
                    self.fetch_list();
                    self.fetch_stats();
                } else {
                    self.fetch_recent();
                    self.fetch_public_stats();
                }
            }
            SessionCmd::Create {
                form,
                from_dashboard,
            } => {
                let mut composer = Composer::with_form(form);
                match composer.begin_create() {
                    Ok(request) => {
                        let api = self.api.clone();
                        let token = self.token.clone();
                        let done_tx = self.done_tx.clone();
                        tokio::spawn(async move {
                            let result = api.create_paste(token.as_deref(), &request).await;
                            let _ = done_tx.send(FetchDone::Created {
                                from_dashboard,
                                result,
                            });
                        });
                    }
                    // Rejected locally; no request was issued.
                    Err(err) => self.emit(SessionEvent::Error {
                        message: err.to_string(),
                    }),
                }
            }
            SessionCmd::Update { id, form } => {
                let Some(token) = self.token.clone() else {
                    self.emit_auth_required();
                    return;
                };
                let mut composer = Composer::with_form(form);
                match composer.begin_update() {
                    Ok(request) => {
                        let api = self.api.clone();
                        let done_tx = self.done_tx.clone();
                        tokio::spawn(async move {
                            let result = api.update_paste(&token, &id, &request).await;
                            let _ = done_tx.send(FetchDone::Updated { id, result });
                        });
                    }
                    Err(err) => self.emit(SessionEvent::Error {
                        message: err.to_string(),
                    }),
                }
            }
            SessionCmd::Delete { id } => {
                let Some(token) = self.token.clone() else {
                    self.emit_auth_required();
                    return;
                };
                // Tentative removal first, so the row disappears immediately;
                // the refetch below reconciles with the server.
                self.list.remove_optimistic(&id);
                if let Some(result) = self.list.visible_result() {
                    self.emit(SessionEvent::ListUpdated { result });
                }
                let api = self.api.clone();
                let done_tx = self.done_tx.clone();
                tokio::spawn(async move {
                    let result = api.delete_paste(&token, &id).await;
                    let _ = done_tx.send(FetchDone::Deleted { id, result });
                });
            }
            SessionCmd::Shutdown => unreachable!("shutdown handled by the run loop"),
        }
    }

    fn on_query_changed(&mut self) {
        self.emit_query_changed();
        self.fetch_list();
    }

    fn fetch_list(&mut self) {
        let Some(token) = self.token.clone() else {
            self.emit_auth_required();
            return;
        };
        let seq = self.list.begin();
        let api = self.api.clone();
        let query = self.ctl.query().clone();
        let done_tx = self.done_tx.clone();
        let started = Instant::now();
        tokio::spawn(async move {
            let result = api.my_pastes(&token, &query).await;
            let _ = done_tx.send(FetchDone::List {
                seq,
                started,
                result,
            });
        });
    }

    fn fetch_stats(&mut self) {
        let Some(token) = self.token.clone() else {
            self.emit_auth_required();
            return;
        };
        let seq = self.stats.begin();
        let api = self.api.clone();
        let done_tx = self.done_tx.clone();
        tokio::spawn(async move {
            let result = api.user_stats(&token).await;
            let _ = done_tx.send(FetchDone::Stats { seq, result });
        });
    }

    fn fetch_languages(&mut self) {
        let Some(token) = self.token.clone() else {
            self.emit_auth_required();
            return;
        };
        let seq = self.languages.begin();
        let api = self.api.clone();
        let done_tx = self.done_tx.clone();
        tokio::spawn(async move {
            let result = api.user_languages(&token).await;
            let _ = done_tx.send(FetchDone::Languages { seq, result });
        });
    }

    fn fetch_recent(&mut self) {
        let seq = self.recent.begin();
        let api = self.api.clone();
        let done_tx = self.done_tx.clone();
        tokio::spawn(async move {
            let result = api.recent_pastes(10).await;
            let _ = done_tx.send(FetchDone::Recent { seq, result });
        });
    }

    fn fetch_public_stats(&mut self) {
        let seq = self.public_stats.begin();
        let api = self.api.clone();
        let done_tx = self.done_tx.clone();
        tokio::spawn(async move {
            let result = api.public_stats().await;
            let _ = done_tx.send(FetchDone::PublicStats { seq, result });
        });
    }

    fn run_plan(&mut self, plan: RefreshPlan) {
        if plan.recent_list {
            self.fetch_recent();
        }
        if plan.public_stats {
            self.fetch_public_stats();
        }
        if self.token.is_some() {
            if plan.my_list {
                self.fetch_list();
            }
            if plan.my_stats {
                self.fetch_stats();
            }
            if plan.languages {
                self.fetch_languages();
            }
        }
    }

    fn handle_done(&mut self, done: FetchDone) {
        match done {
            FetchDone::List {
                seq,
                started,
                result,
            } => self.on_list_done(seq, started, result),
            FetchDone::Stats { seq, result } => match result {
                Ok(stats) => {
                    if self.stats.complete(seq, Ok(stats.clone())) == SlotOutcome::Applied {
                        self.emit(SessionEvent::StatsUpdated { stats });
                    }
                }
                Err(err) => self.on_source_error(err, |worker, message| {
                    worker.stats.complete(seq, Err(message))
                }),
            },
            FetchDone::Languages { seq, result } => match result {
                Ok(languages) => {
                    if self.languages.complete(seq, Ok(languages.clone())) == SlotOutcome::Applied {
                        self.emit(SessionEvent::LanguagesUpdated { languages });
                    }
                }
                Err(err) => self.on_source_error(err, |worker, message| {
                    worker.languages.complete(seq, Err(message))
                }),
            },
            FetchDone::Recent { seq, result } => match result {
                Ok(items) => {
                    if self.recent.complete(seq, Ok(items.clone())) == SlotOutcome::Applied {
                        self.emit(SessionEvent::RecentUpdated { items });
                    }
                }
                Err(err) => self.on_source_error(err, |worker, message| {
                    worker.recent.complete(seq, Err(message))
                }),
            },
            FetchDone::PublicStats { seq, result } => match result {
                Ok(stats) => {
                    if self.public_stats.complete(seq, Ok(stats.clone())) == SlotOutcome::Applied {
                        self.emit(SessionEvent::PublicStatsUpdated { stats });
                    }
                }
                Err(err) => self.on_source_error(err, |worker, message| {
                    worker.public_stats.complete(seq, Err(message))
                }),
            },
            FetchDone::Created {
                from_dashboard,
                result,
            } => match result {
                Ok(paste) => {
                    self.emit(SessionEvent::Created { paste });
                    self.run_plan(RefreshPlan::after(Mutation::Created { from_dashboard }));
                }
                Err(err) => self.on_mutation_error(err, None),
            },
            FetchDone::Updated { id, result } => match result {
                Ok(paste) => {
                    self.emit(SessionEvent::Updated { paste });
                    self.run_plan(RefreshPlan::after(Mutation::Updated));
                }
                Err(err) => self.on_mutation_error(err, Some(id)),
            },
            FetchDone::Deleted { id, result } => match result {
                Ok(()) => {
                    self.emit(SessionEvent::Deleted { id });
                    self.run_plan(RefreshPlan::after(Mutation::Deleted));
                }
                Err(err) => {
                    self.on_mutation_error(err, Some(id));
                    // The tentative removal may be wrong; reconcile with the
                    // server either way.
                    self.run_plan(RefreshPlan::after(Mutation::Deleted));
                }
            },
        }
    }

    fn on_list_done(&mut self, seq: u64, started: Instant, result: Result<ListResult, ApiError>) {
        match result {
            Ok(result) => {
                let total_pages = result.total_pages;
                let items = result.items.len();
                if self.list.complete(seq, Ok(result)) != SlotOutcome::Applied {
                    return;
                }
                if self.perf_log {
                    info!(
                        target: "pasteor_session::perf",
                        elapsed_ms = started.elapsed().as_secs_f64() * 1000.0,
                        items,
                        "list fetch applied"
                    );
                }
                // A shrunken result set can leave the query pointing past the
                // last page; never render that page, refetch the new last one.
                if self.ctl.clamp_page(total_pages) {
                    self.emit_query_changed();
                    self.fetch_list();
                    return;
                }
                if let Some(result) = self.list.visible_result() {
                    self.emit(SessionEvent::ListUpdated { result });
                }
            }
            Err(err) => self.on_source_error(err, |worker, message| {
                worker.list.complete(seq, Err(message))
            }),
        }
    }

    /// Route a fetch failure: auth failures redirect, everything else is a
    /// notification with last-known-good data left in place.
    fn on_source_error(
        &mut self,
        err: ApiError,
        complete: impl FnOnce(&mut Self, String) -> SlotOutcome,
    ) {
        let message = err.to_string();
        let outcome = complete(self, message.clone());
        if outcome != SlotOutcome::Applied {
            return;
        }
        if err.is_auth() {
            self.emit_auth_required();
        } else {
            error!("fetch failed: {}", message);
            self.emit(SessionEvent::Error { message });
        }
    }

    fn on_mutation_error(&mut self, err: ApiError, id: Option<String>) {
        match (&err, id) {
            (ApiError::AuthRequired, _) => self.emit_auth_required(),
            (ApiError::NotFound, Some(id)) => self.emit(SessionEvent::NotFound { id }),
            (_, _) => {
                let message = err.to_string();
                error!("mutation failed: {}", message);
                self.emit(SessionEvent::Error { message });
            }
        }
    }

    /// Teardown: every in-flight completion becomes a no-op on arrival.
    fn close(&mut self) {
        self.list.close();
        self.stats.close();
        self.languages.close();
        self.recent.close();
        self.public_stats.close();
    }
}
