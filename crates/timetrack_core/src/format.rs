//! Human-readable rendering of elapsed time.

/// Renders whole seconds as `"HH ч MM м"`.
///
/// Leftover seconds are truncated. Hours are zero-padded to two digits but
/// never cut, so 100 hours renders as `"100 ч 00 м"`.
pub fn format_duration(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds / 60) % 60;
    format!("{hours:02} ч {minutes:02} м")
}

#[cfg(test)]
mod tests {
    use super::format_duration;

    #[test]
    fn formats_hours_and_minutes() {
        assert_eq!(format_duration(0), "00 ч 00 м");
        assert_eq!(format_duration(3661), "01 ч 01 м");
        assert_eq!(format_duration(7200), "02 ч 00 м");
        assert_eq!(format_duration(59), "00 ч 00 м");
        assert_eq!(format_duration(3599), "00 ч 59 м");
    }

    #[test]
    fn hours_grow_past_two_digits() {
        assert_eq!(format_duration(100 * 3600 + 5 * 60), "100 ч 05 м");
        assert_eq!(format_duration(360_000), "100 ч 00 м");
    }
}
