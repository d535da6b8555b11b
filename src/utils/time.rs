//! Wall-clock access
//!
//! Only the convenience entry points read the clock; every analysis
//! function takes `now` explicitly so callers can pin it.

use std::time::{SystemTime, UNIX_EPOCH};

/// Current Unix timestamp in whole seconds
///
/// A clock set before the epoch reads as `0` rather than panicking.
pub fn now_ts() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default()
}
