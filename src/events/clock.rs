//! Strictly increasing millisecond timestamps

use chrono::Utc;
use std::sync::atomic::{AtomicI64, Ordering};

/// Wall-clock milliseconds, bumped by one whenever the wall clock stalls or
/// steps backwards, so consecutive readings always increase.
#[derive(Debug, Default)]
pub struct MonotonicClock {
    last_ms: AtomicI64,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now_ms(&self) -> i64 {
        self.next_after(Utc::now().timestamp_millis())
    }

    fn next_after(&self, wall_ms: i64) -> i64 {
        let advance = |last: i64| wall_ms.max(last + 1);
        match self
            .last_ms
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| Some(advance(last)))
        {
            Ok(previous) | Err(previous) => advance(previous),
        }
    }
}
