/// Render milliseconds as `HH:MM:SS`.
///
/// Hours are not wrapped at 24; negative input renders as `00:00:00`.
pub fn format_hms(ms: i64) -> String {
    let total_secs = ms.max(0) / 1000;
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

/// [`format_hms`] for unsigned millisecond counts.
pub fn format_elapsed(ms: u64) -> String {
    format_hms(i64::try_from(ms).unwrap_or(i64::MAX))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn known_values() {
        assert_eq!(format_hms(0), "00:00:00");
        assert_eq!(format_hms(61_000), "00:01:01");
        assert_eq!(format_hms(3_661_000), "01:01:01");
        assert_eq!(format_hms(24 * 3_600_000 + 42_000), "24:00:42");
        assert_eq!(format_hms(999), "00:00:00");
    }

    #[test]
    fn negative_clamps() {
        assert_eq!(format_hms(-1), "00:00:00");
        assert_eq!(format_hms(i64::MIN), "00:00:00");
    }

    #[test]
    fn unsigned_wrapper() {
        assert_eq!(format_elapsed(61_000), "00:01:01");
    }

    proptest! {
        #[test]
        fn fields_are_zero_padded(ms in 0i64..1_000_000_000_000) {
            let s = format_hms(ms);
            let parts: Vec<&str> = s.split(':').collect();
            prop_assert_eq!(parts.len(), 3);
            prop_assert!(parts[0].len() >= 2);
            prop_assert_eq!(parts[1].len(), 2);
            prop_assert_eq!(parts[2].len(), 2);
            let h: i64 = parts[0].parse().unwrap();
            let m: i64 = parts[1].parse().unwrap();
            let sec: i64 = parts[2].parse().unwrap();
            prop_assert!(m < 60 && sec < 60);
            prop_assert_eq!(h * 3600 + m * 60 + sec, ms / 1000);
        }
    }
}
