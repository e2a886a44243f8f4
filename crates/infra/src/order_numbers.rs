//! Human-facing order numbers.
//!
//! An order number is the millisecond epoch of its creation. Within one
//! process the generator never hands out the same number twice: when two
//! orders land in the same millisecond (or the clock steps back) the later
//! one gets `last + 1`. Separate processes can still collide.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Utc};

#[derive(Debug, Default)]
pub struct OrderNumberGenerator {
    last: AtomicI64,
}

impl OrderNumberGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&self, now: DateTime<Utc>) -> i64 {
        let candidate = now.timestamp_millis();
        let previous = self
            .last
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                Some(candidate.max(last + 1))
            })
            .unwrap_or_else(|last| last);

        candidate.max(previous + 1)
    }
}
