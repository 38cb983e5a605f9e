//! Sequence-gated fetch bookkeeping shared by list, stats, and facet sources.
//!
//! Each data source gets a [`FetchSlot`]: `begin` hands out a sequence number
//! for the outgoing request, and `complete` applies only the most recently
//! issued sequence. A slower response for a superseded query can therefore
//! never overwrite a newer one, regardless of arrival order.

use std::collections::HashSet;

use tracing::debug;

use crate::models::ListResult;

/// Outcome of delivering a fetch completion to a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotOutcome {
    /// The completion belonged to the latest request and was applied.
    Applied,
    /// A newer request superseded this one; the completion was dropped.
    Stale,
    /// The slot was closed (teardown); the completion was dropped.
    Closed,
}

/// Bookkeeping for one asynchronously fetched data source.
#[derive(Debug)]
pub struct FetchSlot<T> {
    latest: u64,
    value: Option<T>,
    error: Option<String>,
    loading: bool,
    closed: bool,
}

impl<T> Default for FetchSlot<T> {
    fn default() -> Self {
        Self {
            latest: 0,
            value: None,
            error: None,
            loading: false,
            closed: false,
        }
    }
}

impl<T> FetchSlot<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new outgoing request and return its sequence number.
    pub fn begin(&mut self) -> u64 {
        self.latest += 1;
        self.loading = true;
        self.latest
    }

    /// Deliver a completion for the request identified by `seq`.
    ///
    /// Failures keep the previous value in place so a transient error does
    /// not wipe the view. `loading` is cleared on every applied exit path.
    pub fn complete(&mut self, seq: u64, result: Result<T, String>) -> SlotOutcome {
        if self.closed {
            return SlotOutcome::Closed;
        }
        if seq != self.latest {
            debug!(seq, latest = self.latest, "dropping stale fetch completion");
            return SlotOutcome::Stale;
        }
        self.loading = false;
        match result {
            Ok(value) => {
                self.value = Some(value);
                self.error = None;
            }
            Err(message) => {
                self.error = Some(message);
            }
        }
        SlotOutcome::Applied
    }

    pub fn value(&self) -> Option<&T> {
        self.value.as_ref()
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Stop accepting completions; in-flight requests become no-ops on arrival.
    pub fn close(&mut self) {
        self.closed = true;
        self.loading = false;
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

/// List state: a fetch slot plus tentative removals applied ahead of the
/// authoritative refetch.
///
/// A delete hides its item immediately via [`ListView::remove_optimistic`];
/// the next successful fetch replaces the whole result and discards the
/// tentative edits, so the server stays the source of truth.
#[derive(Debug, Default)]
pub struct ListView {
    slot: FetchSlot<ListResult>,
    tentative_removals: HashSet<String>,
}

impl ListView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&mut self) -> u64 {
        self.slot.begin()
    }

    pub fn complete(&mut self, seq: u64, result: Result<ListResult, String>) -> SlotOutcome {
        let was_ok = result.is_ok();
        let outcome = self.slot.complete(seq, result);
        if outcome == SlotOutcome::Applied && was_ok {
            self.tentative_removals.clear();
        }
        outcome
    }

    /// Hide `id` from the rendered list ahead of the confirming refetch.
    ///
    /// # Returns
    /// `true` when the item was present in the current result.
    pub fn remove_optimistic(&mut self, id: &str) -> bool {
        let present = self
            .slot
            .value()
            .map(|result| result.items.iter().any(|item| item.id == id))
            .unwrap_or(false);
        self.tentative_removals.insert(id.to_string());
        present
    }

    /// The last authoritative result, untouched by tentative edits.
    pub fn result(&self) -> Option<&ListResult> {
        self.slot.value()
    }

    /// The result as the view should render it: tentative removals applied
    /// and `total_count` adjusted to match.
    pub fn visible_result(&self) -> Option<ListResult> {
        let result = self.slot.value()?;
        if self.tentative_removals.is_empty() {
            return Some(result.clone());
        }
        let items: Vec<_> = result
            .items
            .iter()
            .filter(|item| !self.tentative_removals.contains(&item.id))
            .cloned()
            .collect();
        let hidden = (result.items.len() - items.len()) as u64;
        Some(ListResult {
            items,
            total_count: result.total_count.saturating_sub(hidden),
            page: result.page,
            total_pages: result.total_pages,
        })
    }

    pub fn loading(&self) -> bool {
        self.slot.loading()
    }

    pub fn error(&self) -> Option<&str> {
        self.slot.error()
    }

    pub fn close(&mut self) {
        self.slot.close();
    }
}
