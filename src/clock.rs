//! Strictly increasing wall-clock timestamps.
//!
//! Two calls in the same process never return the same instant: when the
//! wall clock has not moved (or went backwards) the previous value is bumped
//! by one nanosecond.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, TimeZone, Utc};

use crate::history::BatchId;

static LAST_NANOS: AtomicI64 = AtomicI64::new(i64::MIN);

/// Current time, strictly later than any previous call
pub fn now() -> DateTime<Utc> {
    let wall = Utc::now().timestamp_nanos_opt().unwrap_or(i64::MAX - 1);
    let step = |prev: i64| if wall > prev { wall } else { prev + 1 };

    let prev = LAST_NANOS
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |prev| Some(step(prev)))
        .unwrap_or_else(|prev| prev);

    Utc.timestamp_nanos(step(prev))
}

/// Fresh batch identifier derived from [`now`]
pub fn new_batch_id() -> BatchId {
    let at = now();
    BatchId::new(at.timestamp_nanos_opt().unwrap_or_default().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_now_is_strictly_increasing() {
        let stamps: Vec<_> = (0..1000).map(|_| now()).collect();
        assert!(stamps.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_batch_ids_are_unique() {
        let a = new_batch_id();
        let b = new_batch_id();
        assert_ne!(a, b);
        assert!(a.as_str().parse::<i64>().unwrap() < b.as_str().parse::<i64>().unwrap());
    }
}
