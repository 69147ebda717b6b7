//! Helpers for converting between UTC and the server's configured timezone.
use time::{OffsetDateTime, UtcOffset};
use time_tz::{Offset, TimeZone};

use crate::{Error, funding_source::Timestamp};

fn get_local_offset(canonical_timezone: &str) -> Option<UtcOffset> {
    time_tz::timezones::get_by_name(canonical_timezone)
        .map(|tz| tz.get_offset_utc(&OffsetDateTime::now_utc()).to_utc())
}

/// The current UTC offset of the timezone named by `canonical_timezone`, e.g. "Pacific/Auckland".
///
/// # Errors
/// Returns [Error::InvalidTimezoneError] if the timezone name is not recognised.
pub fn local_offset(canonical_timezone: &str) -> Result<UtcOffset, Error> {
    get_local_offset(canonical_timezone).ok_or_else(|| {
        tracing::error!("Invalid timezone {canonical_timezone}");
        Error::InvalidTimezoneError(canonical_timezone.to_owned())
    })
}

/// Milliseconds since the Unix epoch for `date_time`.
pub fn to_timestamp(date_time: OffsetDateTime) -> Timestamp {
    (date_time.unix_timestamp_nanos() / 1_000_000) as Timestamp
}

/// Convert milliseconds since the Unix epoch to a date and time at `offset`.
///
/// Returns `None` if `timestamp` is outside the range `time` can represent.
pub fn timestamp_to_local(timestamp: Timestamp, offset: UtcOffset) -> Option<OffsetDateTime> {
    OffsetDateTime::from_unix_timestamp_nanos(i128::from(timestamp) * 1_000_000)
        .ok()
        .map(|date_time| date_time.to_offset(offset))
}
