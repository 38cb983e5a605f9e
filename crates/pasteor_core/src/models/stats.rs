//! Aggregate statistics shapes.

use serde::{Deserialize, Serialize};

use super::paste::PasteSummary;

/// Owner-scoped aggregate counts shown on the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateStats {
    pub total_pastes: u64,
    pub total_views: u64,
    pub active_pastes: u64,
    /// Id of the owner's most viewed paste, if any exist.
    #[serde(default)]
    pub most_viewed_paste: Option<String>,
}

/// A language tag with its usage count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageCount {
    pub language: String,
    pub count: u64,
}

/// Site-wide totals shown to anonymous visitors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicStats {
    pub total_pastes: u64,
    pub total_views: u64,
    #[serde(default)]
    pub top_languages: Vec<LanguageCount>,
    #[serde(default)]
    pub popular_pastes: Vec<PasteSummary>,
}
