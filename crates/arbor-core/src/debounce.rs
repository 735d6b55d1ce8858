//! Latest-wins debouncing for search queries.
//!
//! Each [`QueryDebouncer::push_at`] replaces the pending value and restarts
//! the quiet period. Once no push has arrived for `delay`,
//! [`QueryDebouncer::poll_at`] yields the most recent value exactly once.
//! Time is always supplied by the caller, so the debouncer is deterministic
//! under test and never runs anything in the background.
//!
//! ```
//! use std::time::{Duration, Instant};
//! use arbor_core::debounce::{DebounceAction, QueryDebouncer};
//!
//! let mut deb = QueryDebouncer::new(Duration::from_millis(100));
//! let t0 = Instant::now();
//! deb.push_at("r".to_string(), t0);
//! deb.push_at("re".to_string(), t0 + Duration::from_millis(40));
//! assert_eq!(deb.poll_at(t0 + Duration::from_millis(100)), DebounceAction::Pending);
//! assert_eq!(
//!     deb.poll_at(t0 + Duration::from_millis(140)),
//!     DebounceAction::Apply("re".to_string())
//! );
//! ```

use std::time::{Duration, Instant};

/// Default quiet period before a query is applied.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(150);

#[inline]
fn duration_since_or_zero(now: Instant, earlier: Instant) -> Duration {
    now.checked_duration_since(earlier).unwrap_or(Duration::ZERO)
}

/// Action returned by the debouncer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DebounceAction<V> {
    /// Nothing pending.
    None,
    /// A value is pending but the quiet period has not elapsed.
    Pending,
    /// Apply this value now.
    Apply(V),
}

/// Latest-wins debouncer with injected time.
#[derive(Debug, Clone)]
pub struct QueryDebouncer<V> {
    delay: Duration,
    pending: Option<V>,
    last_push: Option<Instant>,
    applied: Option<V>,
    superseded: u64,
}

impl<V: Clone> Default for QueryDebouncer<V> {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}

impl<V: Clone> QueryDebouncer<V> {
    /// Create a debouncer with the given quiet period.
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
            last_push: None,
            applied: None,
            superseded: 0,
        }
    }

    /// Quiet period.
    #[must_use]
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Record a new value at `now`.
    ///
    /// With a zero delay the value applies immediately.
    pub fn push_at(&mut self, value: V, now: Instant) -> DebounceAction<V> {
        if self.pending.replace(value).is_some() {
            self.superseded += 1;
        }
        self.last_push = Some(now);

        #[cfg(feature = "tracing")]
        tracing::trace!(superseded = self.superseded, "debounce push");

        if self.delay.is_zero() {
            return self.apply();
        }
        DebounceAction::Pending
    }

    /// Record a new value now.
    pub fn push(&mut self, value: V) -> DebounceAction<V> {
        self.push_at(value, Instant::now())
    }

    /// Check the quiet period at `now`.
    pub fn poll_at(&mut self, now: Instant) -> DebounceAction<V> {
        let Some(last_push) = self.last_push else {
            return DebounceAction::None;
        };
        if self.pending.is_none() {
            return DebounceAction::None;
        }
        if duration_since_or_zero(now, last_push) >= self.delay {
            return self.apply();
        }
        DebounceAction::Pending
    }

    /// Check the quiet period now.
    pub fn poll(&mut self) -> DebounceAction<V> {
        self.poll_at(Instant::now())
    }

    /// Apply the pending value regardless of time.
    pub fn flush(&mut self) -> DebounceAction<V> {
        if self.pending.is_none() {
            return DebounceAction::None;
        }
        self.apply()
    }

    /// Drop the pending value without applying it.
    pub fn cancel(&mut self) {
        self.pending = None;
        self.last_push = None;
    }

    /// Time left before the pending value is due.
    #[must_use]
    pub fn time_until_apply(&self, now: Instant) -> Option<Duration> {
        self.pending.as_ref()?;
        let last_push = self.last_push?;
        Some(self.delay.saturating_sub(duration_since_or_zero(now, last_push)))
    }

    /// Whether a value is waiting.
    #[inline]
    #[must_use]
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Last applied value.
    #[must_use]
    pub fn applied(&self) -> Option<&V> {
        self.applied.as_ref()
    }

    /// Number of pushes that replaced a still-pending value.
    #[must_use]
    pub fn superseded(&self) -> u64 {
        self.superseded
    }

    fn apply(&mut self) -> DebounceAction<V> {
        self.last_push = None;
        match self.pending.take() {
            Some(value) => {
                self.applied = Some(value.clone());
                DebounceAction::Apply(value)
            }
            None => DebounceAction::None,
        }
    }
}
