//! Checker Generation bookkeeping.
//!
//! Every checker run — the initial one and each re-run triggered by a
//! reload — gets a monotonically increasing [`GenerationId`]. The spec's
//! at-most-one-active-generation invariant is
//! enforced here: starting a new generation immediately makes it
//! "current", and any checker task still draining output from an older
//! generation can cheaply check whether it has been superseded.

use std::sync::Mutex;
use tuick_core::GenerationId;

/// Tracks which generation is current. Cheap to check from a hot loop
/// (a `Mutex<GenerationId>` guard, not an async lock) since the checker
/// reader task polls it once per parsed block.
pub struct GenerationTracker {
    current: Mutex<GenerationId>,
}

impl GenerationTracker {
    pub fn new() -> Self {
        GenerationTracker {
            current: Mutex::new(GenerationId::FIRST),
        }
    }

    /// The generation that is current right now.
    pub fn current(&self) -> GenerationId {
        *self.current.lock().expect("generation tracker poisoned")
    }

    /// Advance to a new current generation and return its id. Does not
    /// wait for the previous generation's checker to exit — the caller
    /// (the session controller) is responsible for terminating it.
    pub fn start_next(&self) -> GenerationId {
        let mut guard = self.current.lock().expect("generation tracker poisoned");
        *guard = guard.next();
        *guard
    }

    /// Whether `id` is still the current generation. A checker task
    /// uses this to stop forwarding blocks once superseded rather than
    /// racing output from two generations into the same finder stream.
    pub fn is_current(&self, id: GenerationId) -> bool {
        self.current() == id
    }
}

impl Default for GenerationTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_generation_one() {
        let tracker = GenerationTracker::new();
        assert_eq!(tracker.current(), GenerationId::FIRST);
        assert!(tracker.is_current(GenerationId::FIRST));
    }

    #[test]
    fn start_next_advances_and_supersedes_the_previous_generation() {
        let tracker = GenerationTracker::new();
        let first = tracker.current();
        let second = tracker.start_next();
        assert!(second > first);
        assert!(tracker.is_current(second));
        assert!(!tracker.is_current(first));
    }

    #[test]
    fn only_the_most_recently_started_generation_is_current() {
        let tracker = GenerationTracker::new();
        tracker.start_next();
        let third = tracker.start_next();
        assert_eq!(tracker.current(), third);
    }
}
