//! Session-scoped auth state: token persistence and the current user.
//!
//! The session hydrates from disk at start, is written only by login/logout,
//! and is read by everything else to decide request scope. Consumers get it
//! injected; nothing here is process-global.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::warn;

use pasteor_core::models::UserProfile;
use pasteor_core::ApiError;

use crate::api::ApiClient;

/// On-disk token store under the user's config directory.
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the saved token, if any. Blank files count as absent.
    pub fn load(&self) -> Option<String> {
        let raw = fs::read_to_string(&self.path).ok()?;
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(trimmed.to_string())
    }

    pub fn save(&self, token: &str) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, token)
    }

    /// Remove the saved token; a missing file is not an error.
    pub fn clear(&self) -> io::Result<()> {
        match fs::remove_file(&self.path) {
            Err(err) if err.kind() != io::ErrorKind::NotFound => Err(err),
            _ => Ok(()),
        }
    }
}

/// Current auth session.
#[derive(Debug, Default)]
pub struct AuthSession {
    token: Option<String>,
    user: Option<UserProfile>,
}

impl AuthSession {
    /// Hydrate from the token store at startup. The profile is fetched
    /// lazily by [`AuthSession::validate`].
    pub fn hydrate(store: &TokenStore) -> Self {
        Self {
            token: store.load(),
            user: None,
        }
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn user(&self) -> Option<&UserProfile> {
        self.user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Exchange a token handed off by the auth callback for a session.
    ///
    /// The token is persisted only after the server confirms it resolves to
    /// a user.
    pub async fn login(
        &mut self,
        api: &ApiClient,
        store: &TokenStore,
        token: String,
    ) -> Result<UserProfile, ApiError> {
        let user = api.me(&token).await?;
        store.save(&token).map_err(ApiError::transport)?;
        self.token = Some(token);
        self.user = Some(user.clone());
        Ok(user)
    }

    /// Confirm a hydrated token still resolves to a user.
    ///
    /// An invalid stored token is discarded, matching the hydrate-on-start
    /// behavior of the web session: a dead token must not leave the app in a
    /// half-authenticated state.
    pub async fn validate(
        &mut self,
        api: &ApiClient,
        store: &TokenStore,
    ) -> Result<Option<&UserProfile>, ApiError> {
        let Some(token) = self.token.clone() else {
            return Ok(None);
        };
        match api.me(&token).await {
            Ok(user) => {
                self.user = Some(user);
                Ok(self.user.as_ref())
            }
            Err(ApiError::AuthRequired) => {
                warn!("stored token rejected; clearing session");
                self.token = None;
                self.user = None;
                store.clear().map_err(ApiError::transport)?;
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    pub fn logout(&mut self, store: &TokenStore) -> io::Result<()> {
        self.token = None;
        self.user = None;
        store.clear()
    }
}
