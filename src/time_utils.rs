// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time formatting.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Normalize a stored availability date into a single display format.
///
/// Listings written by older clients carry either a provider-native
/// timestamp (serialized as RFC3339) or a plain `YYYY-MM-DD` string.
/// Values that parse as neither are returned unchanged.
pub fn display_date(raw: &str) -> String {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.date_naive().format("%a %b %d %Y").to_string();
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.format("%a %b %d %Y").to_string();
    }
    raw.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_date_from_rfc3339() {
        assert_eq!(display_date("2024-03-01T12:30:00Z"), "Fri Mar 01 2024");
    }

    #[test]
    fn test_display_date_from_plain_date() {
        assert_eq!(display_date("2024-03-01"), "Fri Mar 01 2024");
    }

    #[test]
    fn test_display_date_passthrough() {
        assert_eq!(display_date("sometime soon"), "sometime soon");
    }
}
