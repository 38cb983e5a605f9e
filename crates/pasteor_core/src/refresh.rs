//! Refetch planning after mutations.
//!
//! A completed mutation invalidates some subset of {list, stats, language
//! facets}; the plan is computed here as a plain value so the trigger rules
//! stay testable away from any I/O.

/// A mutation the views must reconcile with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    /// A paste was created, from the public composer or the dashboard one.
    Created { from_dashboard: bool },
    Updated,
    Deleted,
}

/// Which data sources to refetch, and whether to navigate to the detail view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefreshPlan {
    pub recent_list: bool,
    pub public_stats: bool,
    pub my_list: bool,
    pub my_stats: bool,
    pub languages: bool,
    pub navigate_to_detail: bool,
}

impl RefreshPlan {
    /// The refetch scope for a completed mutation.
    pub fn after(mutation: Mutation) -> Self {
        match mutation {
            Mutation::Created { from_dashboard } => Self {
                recent_list: true,
                public_stats: true,
                my_list: from_dashboard,
                my_stats: from_dashboard,
                // A first use of a language must show up in the filter control.
                languages: from_dashboard,
                navigate_to_detail: true,
            },
            // The optimistic removal already happened; the full refetch
            // corrects total_count/total_pages so pagination stays valid.
            Mutation::Deleted => Self {
                my_list: true,
                my_stats: true,
                ..Self::default()
            },
            Mutation::Updated => Self {
                navigate_to_detail: true,
                ..Self::default()
            },
        }
    }
}
