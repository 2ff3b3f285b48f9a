// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Utility functions for log processor configuration.

use std::time::Duration;

/// Parses a duration such as `10s`, `500ms`, `2m` or `1h`.
///
/// A bare number is read as seconds. Whitespace is trimmed from the input.
///
/// # Returns
///
/// * `Some(Duration)` - The parsed duration
/// * `None` - If the value is empty, negative, or has an unknown unit
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use otlp_log_processor::util::parse_duration;
///
/// assert_eq!(parse_duration("10s"), Some(Duration::from_secs(10)));
/// assert_eq!(parse_duration("500ms"), Some(Duration::from_millis(500)));
/// assert_eq!(parse_duration("30"), Some(Duration::from_secs(30)));
/// assert_eq!(parse_duration("ten"), None);
/// ```
pub fn parse_duration(value: &str) -> Option<Duration> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    let split = trimmed
        .find(|ch: char| !ch.is_ascii_digit())
        .unwrap_or(trimmed.len());
    let (amount, unit) = trimmed.split_at(split);
    let amount = match amount.parse::<u64>() {
        Ok(amount) => amount,
        Err(_) => {
            tracing::error!("Invalid duration '{}'. Ignoring value.", trimmed);
            return None;
        }
    };

    match unit.trim() {
        "ms" => Some(Duration::from_millis(amount)),
        "" | "s" => Some(Duration::from_secs(amount)),
        "m" => amount.checked_mul(60).map(Duration::from_secs),
        "h" => amount.checked_mul(3600).map(Duration::from_secs),
        other => {
            tracing::error!(
                "Unknown duration unit '{}' in '{}'. Supported units are ms, s, m and h. Ignoring value.",
                other,
                trimmed
            );
            None
        }
    }
}
