//! Command/event protocol between a frontend thread and the session worker.

use pasteor_core::composer::ComposerForm;
use pasteor_core::models::{
    AggregateStats, ListResult, PasteMetadata, PasteSummary, PublicStats,
};
use pasteor_core::{Query, SortKey};

/// Commands issued by the frontend for the session worker to execute.
#[derive(Debug)]
pub enum SessionCmd {
    /// Update the search filter; resets to page 1 and refetches on change.
    SetSearch(String),
    /// Update the language filter; `None` is the "all" sentinel.
    SetLanguage(Option<String>),
    SetSort(SortKey),
    /// Jump to a page. Callers clamp to the known page range first.
    SetPage(u32),
    /// Restore default filters as one atomic query change.
    ResetFilters,
    /// Refetch the current query's sources without changing the query.
    Refresh,
    /// Submit the composer form as a new paste.
    Create {
        form: ComposerForm,
        from_dashboard: bool,
    },
    /// Submit the composer form as an edit of an existing paste.
    Update { id: String, form: ComposerForm },
    /// Delete a paste; the item disappears from the list immediately and the
    /// confirming refetch follows.
    Delete { id: String },
    /// Tear the session down; in-flight fetches become no-ops.
    Shutdown,
}

/// Events produced by the worker and polled by the frontend.
#[derive(Debug)]
pub enum SessionEvent {
    /// The canonical query changed (echoed so filter controls can render).
    QueryChanged { query: Query },
    /// Snapshot of the owner listing as the view should render it.
    ListUpdated { result: ListResult },
    StatsUpdated { stats: AggregateStats },
    LanguagesUpdated { languages: Vec<String> },
    /// Public recent pastes, for the anonymous landing view.
    RecentUpdated { items: Vec<PasteSummary> },
    PublicStatsUpdated { stats: PublicStats },
    /// A paste was created; frontends navigate to its detail view.
    Created { paste: PasteMetadata },
    Updated { paste: PasteMetadata },
    Deleted { id: String },
    /// The target paste is absent or expired (dedicated not-found state).
    NotFound { id: String },
    /// Owner-scoped operation without a valid token; frontends must route to
    /// login instead of rendering an error.
    AuthRequired,
    /// Recoverable failure; last-known-good data stays in place.
    Error { message: String },
}
