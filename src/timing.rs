//! Host-driven timers.
//!
//! The core never sleeps or spawns. Hosts pass the current monotonic time
//! into every call and wake the session at [`crate::state::EditorSession::next_deadline`].

/// Monotonic time in milliseconds from a host-chosen origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Millis(u64);

impl Millis {
    /// The origin.
    pub const ZERO: Self = Self(0);

    /// `ms` milliseconds after the origin.
    pub fn new(ms: u64) -> Self {
        Self(ms)
    }

    /// Milliseconds since the origin.
    pub fn get(&self) -> u64 {
        self.0
    }

    /// Add a duration, saturating at `u64::MAX`.
    pub fn saturating_add(&self, ms: u64) -> Self {
        Self(self.0.saturating_add(ms))
    }

    /// Milliseconds elapsed since `earlier`, zero if `earlier` is later.
    pub fn saturating_since(&self, earlier: Millis) -> u64 {
        self.0.saturating_sub(earlier.0)
    }
}

/// Trailing-edge debouncer holding the latest value of a burst.
///
/// Every [`push`](Self::push) replaces the held value and restarts the
/// window. The value is released by [`poll`](Self::poll) once the window
/// has elapsed without another push, or immediately by [`flush`](Self::flush).
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    window_ms: u64,
    pending: Option<(T, Millis)>,
}

impl<T> Debouncer<T> {
    /// Debouncer with a quiet window of `window_ms`.
    pub fn new(window_ms: u64) -> Self {
        Self {
            window_ms,
            pending: None,
        }
    }

    /// Length of the quiet window.
    pub fn window_ms(&self) -> u64 {
        self.window_ms
    }

    /// Hold `value`, restarting the window. Returns the superseded value.
    pub fn push(&mut self, value: T, now: Millis) -> Option<T> {
        let deadline = now.saturating_add(self.window_ms);
        self.pending
            .replace((value, deadline))
            .map(|(previous, _)| previous)
    }

    /// Release the held value if its window has elapsed.
    pub fn poll(&mut self, now: Millis) -> Option<T> {
        match &self.pending {
            Some((_, deadline)) if *deadline <= now => self.pending.take().map(|(v, _)| v),
            _ => None,
        }
    }

    /// Release the held value regardless of the window.
    pub fn flush(&mut self) -> Option<T> {
        self.pending.take().map(|(v, _)| v)
    }

    /// Drop the held value without releasing it.
    pub fn cancel(&mut self) {
        self.pending = None;
    }

    /// When the held value is due, if one is held.
    pub fn deadline(&self) -> Option<Millis> {
        self.pending.as_ref().map(|(_, deadline)| *deadline)
    }

    /// Whether a value is held.
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

/// One-shot cancelable timer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Deadline {
    at: Option<Millis>,
}

impl Deadline {
    /// Arm (or re-arm) to fire `after_ms` from `now`.
    pub fn arm(&mut self, now: Millis, after_ms: u64) {
        self.at = Some(now.saturating_add(after_ms));
    }

    /// Disarm without firing.
    pub fn cancel(&mut self) {
        self.at = None;
    }

    /// When the timer fires, if armed.
    pub fn at(&self) -> Option<Millis> {
        self.at
    }

    /// Whether the timer is armed.
    pub fn is_armed(&self) -> bool {
        self.at.is_some()
    }

    /// Returns `true` exactly once when due, then disarms.
    pub fn fire(&mut self, now: Millis) -> bool {
        match self.at {
            Some(at) if at <= now => {
                self.at = None;
                true
            }
            _ => false,
        }
    }
}

/// Earliest of a set of optional deadlines.
pub fn earliest(deadlines: impl IntoIterator<Item = Option<Millis>>) -> Option<Millis> {
    deadlines.into_iter().flatten().min()
}
