//! Paste-related wire models and language helpers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Expiry options accepted by the create form.
pub const EXPIRY_OPTIONS: &[&str] = &["never", "1h", "24h", "7d", "30d"];

/// Author attribution attached to public pastes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

/// Lightweight paste metadata rendered in list views.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasteSummary {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    pub language: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub views: u64,
    /// Content preview, already truncated server-side.
    #[serde(default)]
    pub preview: String,
    #[serde(default)]
    pub author: Option<Author>,
}

impl PasteSummary {
    /// Display title with the untitled fallback used across views.
    pub fn title_or_untitled(&self) -> &str {
        self.title.as_deref().unwrap_or("Untitled Paste")
    }
}

/// Full paste payload returned by the detail endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paste {
    pub id: String,
    pub content: String,
    #[serde(default)]
    pub title: Option<String>,
    pub language: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub views: u64,
    #[serde(default)]
    pub is_owner: bool,
    #[serde(default)]
    pub author: Option<Author>,
}

impl Paste {
    pub fn title_or_untitled(&self) -> &str {
        self.title.as_deref().unwrap_or("Untitled Paste")
    }
}

/// Metadata returned by create and update operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasteMetadata {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    pub language: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    /// Shareable link; present on create responses.
    #[serde(default)]
    pub url: Option<String>,
}

/// One page of an owner-scoped listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResult {
    #[serde(rename = "pastes")]
    pub items: Vec<PasteSummary>,
    pub total_count: u64,
    pub page: u32,
    pub total_pages: u32,
}

/// Request payload for creating a paste.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePasteRequest {
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<String>,
}

/// Request payload for updating a paste. `None` fields are left unchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePasteRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

/// Normalize an optional language filter value.
///
/// # Returns
/// Lowercased language when non-empty after trimming and not the "all"
/// sentinel, otherwise `None`.
pub fn normalize_language_filter(language: Option<&str>) -> Option<String> {
    language
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(|value| value.to_ascii_lowercase())
        .filter(|value| value != "all")
}

/// Whether `value` is a recognized expiry option.
pub fn is_valid_expiry(value: &str) -> bool {
    EXPIRY_OPTIONS.contains(&value)
}
