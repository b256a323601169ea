//! Auth capability injected into the HTTP client.
//!
//! The client needs two things from whoever owns credentials: the current access
//! token, and a way to swap in new tokens after a refresh. [`TokenSource`] is that
//! capability; the engine's state never holds credentials.

use std::sync::{Mutex, PoisonError};

/// A normalized pair of credentials.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AuthTokens {
    /// Bearer token attached to every request.
    pub access_token: String,

    /// Token exchanged for a new access token on HTTP 401. Absent when the server
    /// did not issue one.
    pub refresh_token: Option<String>,
}

/// Supplies and receives credentials for the HTTP client.
pub trait TokenSource: Send + Sync {
    /// The current access token, if logged in.
    fn access_token(&self) -> Option<String>;

    /// The current refresh token, if any.
    fn refresh_token(&self) -> Option<String>;

    /// Replaces the stored credentials after a successful refresh. A missing
    /// refresh token in `tokens` keeps the previous one.
    fn store(&self, tokens: AuthTokens);
}

/// Process-local [`TokenSource`].
#[derive(Debug, Default)]
pub struct MemoryTokenSource {
    inner: Mutex<AuthTokens>,
}

impl MemoryTokenSource {
    /// Creates a source holding the given tokens.
    #[must_use]
    pub fn new(access_token: impl Into<String>, refresh_token: Option<String>) -> Self {
        Self {
            inner: Mutex::new(AuthTokens {
                access_token: access_token.into(),
                refresh_token,
            }),
        }
    }
}

impl TokenSource for MemoryTokenSource {
    fn access_token(&self) -> Option<String> {
        let tokens = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        Some(tokens.access_token.clone()).filter(|t| !t.is_empty())
    }

    fn refresh_token(&self) -> Option<String> {
        let tokens = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        tokens.refresh_token.clone().filter(|t| !t.is_empty())
    }

    fn store(&self, tokens: AuthTokens) {
        let mut current = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        current.access_token = tokens.access_token;
        if tokens.refresh_token.is_some() {
            current.refresh_token = tokens.refresh_token;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_tokens_read_as_absent() {
        let source = MemoryTokenSource::default();
        assert_eq!(source.access_token(), None);
        assert_eq!(source.refresh_token(), None);
    }

    #[test]
    fn store_keeps_refresh_token_when_not_reissued() {
        let source = MemoryTokenSource::new("old", Some("r1".to_string()));
        source.store(AuthTokens {
            access_token: "new".to_string(),
            refresh_token: None,
        });

        assert_eq!(source.access_token().as_deref(), Some("new"));
        assert_eq!(source.refresh_token().as_deref(), Some("r1"));
    }
}
