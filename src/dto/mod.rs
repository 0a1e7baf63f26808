use std::time::{Duration, SystemTime, UNIX_EPOCH};

use time::{OffsetDateTime, format_description::well_known::Rfc3339};

pub mod clock;
pub mod display;
pub mod health;
pub mod recovery;
pub mod schedule;
pub mod sse;
pub mod validation;

/// Render a Unix-epoch-milliseconds timestamp as RFC 3339 for API payloads.
pub(crate) fn format_unix_millis(millis: u64) -> String {
    let time = UNIX_EPOCH + Duration::from_millis(millis);
    format_system_time(time)
}

fn format_system_time(time: SystemTime) -> String {
    OffsetDateTime::from(time)
        .format(&Rfc3339)
        .unwrap_or_else(|_| "invalid-timestamp".into())
}
