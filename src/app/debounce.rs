//! Debouncing of raw search input.

use std::time::{Duration, Instant};

/// Default quiet period before a typed query is searched.
pub const DEFAULT_SEARCH_DEBOUNCE: Duration = Duration::from_millis(400);

/// Collapses bursts of keystrokes into one search.
///
/// The debouncer owns no timer: the consumer pushes input as it arrives and polls
/// with the current time from its own loop.
///
/// ```
/// use shopfront::app::SearchDebouncer;
/// use std::time::{Duration, Instant};
///
/// let start = Instant::now();
/// let mut debouncer = SearchDebouncer::default();
/// debouncer.push("ph", start);
/// debouncer.push("phone", start + Duration::from_millis(100));
///
/// assert_eq!(debouncer.poll(start + Duration::from_millis(300)), None);
/// assert_eq!(
///     debouncer.poll(start + Duration::from_millis(500)).as_deref(),
///     Some("phone")
/// );
/// ```
#[derive(Debug, Clone)]
pub struct SearchDebouncer {
    delay: Duration,
    pending: Option<(String, Instant)>,
    last_emitted: Option<String>,
}

impl SearchDebouncer {
    #[must_use]
    pub const fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
            last_emitted: None,
        }
    }

    /// Records raw input typed at `now`, restarting the quiet period.
    pub fn push(&mut self, query: impl Into<String>, now: Instant) {
        self.pending = Some((query.into(), now));
    }

    /// Returns the query to search once the quiet period has passed. A query equal
    /// to the last one emitted is swallowed.
    pub fn poll(&mut self, now: Instant) -> Option<String> {
        let (_, pushed_at) = self.pending.as_ref()?;
        if now.saturating_duration_since(*pushed_at) < self.delay {
            return None;
        }
        let (query, _) = self.pending.take()?;
        self.emit(query)
    }

    /// Emits the pending query without waiting.
    pub fn flush(&mut self) -> Option<String> {
        let (query, _) = self.pending.take()?;
        self.emit(query)
    }

    fn emit(&mut self, query: String) -> Option<String> {
        let query = query.trim().to_string();
        if self.last_emitted.as_deref() == Some(query.as_str()) {
            return None;
        }
        self.last_emitted = Some(query.clone());
        Some(query)
    }
}

impl Default for SearchDebouncer {
    fn default() -> Self {
        Self::new(DEFAULT_SEARCH_DEBOUNCE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_query_is_swallowed() {
        let start = Instant::now();
        let mut debouncer = SearchDebouncer::new(Duration::from_millis(10));

        debouncer.push("phone ", start);
        assert_eq!(debouncer.flush().as_deref(), Some("phone"));

        debouncer.push("phone", start);
        assert_eq!(debouncer.poll(start + Duration::from_millis(20)), None);

        debouncer.push("", start);
        assert_eq!(debouncer.flush().as_deref(), Some(""));
    }

    #[test]
    fn nothing_pending_polls_none() {
        let mut debouncer = SearchDebouncer::default();
        assert_eq!(debouncer.poll(Instant::now()), None);
        assert_eq!(debouncer.flush(), None);
    }
}
