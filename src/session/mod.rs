//! Dashboard session state.
//!
//! A [`Session`] owns the canonical record set, the active view, the filter
//! criteria and the current page. Every operation returns a new session and
//! leaves the old one untouched, so a failed step can never leave the state
//! half-updated.
//!
//! Loads are sequenced with [`LoadTicket`]s: a result that completes after a
//! newer load has already been applied is discarded.

use serde::Serialize;

use crate::filter::{self, FilterCriteria};
use crate::pagination::{PageControls, Pagination};
use crate::records::{LoadError, Record, RecordStore};
use crate::stats::{self, Summary};
use crate::table::{self, TableRow};

/// Identifies one load request. Later tickets compare greater.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct LoadTicket(u64);

/// What happened to a finished load.
#[derive(Debug)]
pub enum LoadOutcome {
    /// The records replaced the canonical set.
    Applied(Session),
    /// A newer load already completed; the result was dropped.
    Stale,
    /// The load failed; the session is unchanged.
    Failed(LoadError),
}

#[derive(Debug, Clone)]
pub struct Session {
    store: RecordStore,
    /// Active view, kept newest-first.
    view: Vec<Record>,
    criteria: FilterCriteria,
    pagination: Pagination,
    loaded: bool,
    issued: u64,
    applied: u64,
}

/// Everything the presentation layer needs to draw the dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub loaded: bool,
    pub rows: Vec<TableRow>,
    pub controls: PageControls,
    pub summary: Summary,
    pub criteria: FilterCriteria,
}

impl Session {
    /// An empty session; nothing has been loaded yet.
    pub fn new(page_size: usize) -> Self {
        Self {
            store: RecordStore::default(),
            view: Vec::new(),
            criteria: FilterCriteria::default(),
            pagination: Pagination::new(page_size),
            loaded: false,
            issued: 0,
            applied: 0,
        }
    }

    pub fn canonical(&self) -> &[Record] {
        self.store.canonical()
    }

    /// The active view, newest first. This is what export writes.
    pub fn view(&self) -> &[Record] {
        &self.view
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn pagination(&self) -> Pagination {
        self.pagination
    }

    /// Whether any load has succeeded.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    // -----------------------------------------------------------------------
    // Loading
    // -----------------------------------------------------------------------

    /// Issue the ticket for a new load request.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.issued += 1;
        LoadTicket(self.issued)
    }

    /// Apply the result of the load identified by `ticket`.
    pub fn finish_load(
        &self,
        ticket: LoadTicket,
        result: Result<Vec<Record>, LoadError>,
    ) -> LoadOutcome {
        if ticket.0 <= self.applied {
            log::debug!(
                "discarding load #{} (already applied #{})",
                ticket.0,
                self.applied
            );
            return LoadOutcome::Stale;
        }

        match result {
            Ok(records) => {
                let mut next = self.with_loaded(records);
                next.applied = ticket.0;
                LoadOutcome::Applied(next)
            }
            Err(e) => LoadOutcome::Failed(e),
        }
    }

    /// Replace the canonical set; the view shows everything from page 1.
    pub fn with_loaded(&self, records: Vec<Record>) -> Self {
        let store = RecordStore::new(records);
        let view = sorted(store.reset());
        Self {
            store,
            view,
            criteria: FilterCriteria::default(),
            pagination: self.pagination.first_page(),
            loaded: true,
            ..self.clone()
        }
    }

    // -----------------------------------------------------------------------
    // Filtering
    // -----------------------------------------------------------------------

    /// Re-derive the view from the canonical set and return to page 1.
    pub fn with_filters(&self, criteria: FilterCriteria) -> Self {
        let criteria = criteria.normalized();
        let view = sorted(filter::apply_filters(self.store.canonical(), &criteria));
        Self {
            view,
            criteria,
            pagination: self.pagination.first_page(),
            ..self.clone()
        }
    }

    /// Clear every criterion and show the full canonical set from page 1.
    pub fn with_reset(&self) -> Self {
        Self {
            view: sorted(self.store.reset()),
            criteria: FilterCriteria::default(),
            pagination: self.pagination.first_page(),
            ..self.clone()
        }
    }

    // -----------------------------------------------------------------------
    // Navigation
    // -----------------------------------------------------------------------

    pub fn with_next_page(&self) -> Self {
        Self {
            pagination: self.pagination.next(self.view.len()),
            ..self.clone()
        }
    }

    pub fn with_previous_page(&self) -> Self {
        Self {
            pagination: self.pagination.previous(),
            ..self.clone()
        }
    }

    pub fn with_page(&self, page: usize) -> Self {
        Self {
            pagination: self.pagination.go_to(page, self.view.len()),
            ..self.clone()
        }
    }

    // -----------------------------------------------------------------------
    // Rendering
    // -----------------------------------------------------------------------

    pub fn render(&self) -> DashboardView {
        DashboardView {
            loaded: self.loaded,
            rows: table::render_page(&self.view, &self.pagination),
            controls: self.pagination.controls(self.view.len()),
            summary: stats::summarize(&self.view),
            criteria: self.criteria.clone(),
        }
    }
}

fn sorted(mut records: Vec<Record>) -> Vec<Record> {
    table::sort_descending(&mut records);
    records
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
