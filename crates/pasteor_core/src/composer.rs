//! Composer state for the create/edit paste forms.
//!
//! Validation runs before any network call: empty and oversized content are
//! rejected locally for instant feedback, and the busy flag is cleared on
//! every exit path so the submit control never sticks disabled.

use thiserror::Error;

use crate::models::paste::{is_valid_expiry, CreatePasteRequest, UpdatePasteRequest};

/// Hard ceiling on paste content (512 KiB, boundary inclusive).
pub const MAX_CONTENT_BYTES: usize = 512 * 1024;
/// Threshold where views start warning that the limit is near.
pub const CONTENT_WARN_BYTES: usize = 400_000;

/// Client-side validation failures rejected before any request is issued.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Content cannot be empty")]
    EmptyContent,
    #[error("Content is too large (max 512KB)")]
    ContentTooLarge,
    #[error("Unknown expiry option '{0}'")]
    InvalidExpiry(String),
}

/// Character-count feedback mirrored next to the content field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharCountStatus {
    Ok,
    /// Within the limit but close enough to warn.
    Approaching,
    Exceeds,
}

/// Form fields for creating or editing a paste.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposerForm {
    pub content: String,
    pub title: String,
    pub language: String,
    pub expires_in: String,
}

impl Default for ComposerForm {
    fn default() -> Self {
        Self {
            content: String::new(),
            title: String::new(),
            language: "plaintext".to_string(),
            expires_in: "never".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Phase {
    #[default]
    Idle,
    Submitting,
}

/// Composer state machine: Idle -> Submitting -> Idle, with validation on
/// entry. A failed submit returns to Idle with the error recorded and the
/// form fields preserved, so no user work is lost.
#[derive(Debug, Default)]
pub struct Composer {
    pub form: ComposerForm,
    phase: Phase,
    last_error: Option<String>,
}

impl Composer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the form from an existing paste, for the edit flow.
    pub fn with_form(form: ComposerForm) -> Self {
        Self {
            form,
            ..Self::default()
        }
    }

    pub fn is_busy(&self) -> bool {
        self.phase == Phase::Submitting
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn char_count_status(&self) -> CharCountStatus {
        let len = self.form.content.len();
        if len > MAX_CONTENT_BYTES {
            CharCountStatus::Exceeds
        } else if len > CONTENT_WARN_BYTES {
            CharCountStatus::Approaching
        } else {
            CharCountStatus::Ok
        }
    }

    /// Validate form fields without touching state.
    pub fn validate(form: &ComposerForm) -> Result<(), ValidationError> {
        if form.content.trim().is_empty() {
            return Err(ValidationError::EmptyContent);
        }
        if form.content.len() > MAX_CONTENT_BYTES {
            return Err(ValidationError::ContentTooLarge);
        }
        if !is_valid_expiry(&form.expires_in) {
            return Err(ValidationError::InvalidExpiry(form.expires_in.clone()));
        }
        Ok(())
    }

    /// Validate and enter the submitting phase for a create.
    ///
    /// # Errors
    /// Returns the validation failure and stays in Idle; no request payload
    /// is produced, so callers cannot issue a network call by mistake.
    pub fn begin_create(&mut self) -> Result<CreatePasteRequest, ValidationError> {
        self.begin()?;
        Ok(CreatePasteRequest {
            content: self.form.content.clone(),
            title: none_if_empty(&self.form.title),
            language: none_if_empty(&self.form.language),
            expires_in: Some(self.form.expires_in.clone()),
        })
    }

    /// Validate and enter the submitting phase for an update.
    pub fn begin_update(&mut self) -> Result<UpdatePasteRequest, ValidationError> {
        self.begin()?;
        Ok(UpdatePasteRequest {
            content: Some(self.form.content.clone()),
            title: none_if_empty(&self.form.title),
            language: none_if_empty(&self.form.language),
        })
    }

    fn begin(&mut self) -> Result<(), ValidationError> {
        if let Err(err) = Self::validate(&self.form) {
            self.last_error = Some(err.to_string());
            return Err(err);
        }
        self.phase = Phase::Submitting;
        self.last_error = None;
        Ok(())
    }

    /// Leave the submitting phase. Runs on success and failure alike; the
    /// form fields are never cleared here.
    pub fn finish(&mut self, result: Result<(), String>) {
        self.phase = Phase::Idle;
        if let Err(message) = result {
            self.last_error = Some(message);
        }
    }
}

fn none_if_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
