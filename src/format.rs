//! Human-readable duration and size formatting
//!
//! The probe pipeline stores these strings verbatim in the catalog, so the
//! exact output shape is part of the persisted format.

/// Unit ladder for [`to_readable_size`], one step per division by 1000
const SIZE_ORDERS: [&str; 5] = ["Bytes", "KB", "MB", "GB", "TB"];

/// Format a duration in seconds as a zero-padded `HH:MM:SS` timestamp.
///
/// A zero (or sub-second) duration yields the two-field literal `00:00`.
pub fn to_timestamp(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds as u64
    } else {
        0
    };
    if total == 0 {
        return "00:00".to_string();
    }

    let rest = total % 3600;
    format!("{:02}:{:02}:{:02}", total / 3600, rest / 60, rest % 60)
}

/// Format a byte count with a decimal (power-of-1000) unit and two decimal
/// places. Zero is the literal `0 bytes`.
pub fn to_readable_size(num_bytes: u64) -> String {
    if num_bytes == 0 {
        return "0 bytes".to_string();
    }

    let mut value = num_bytes as f64;
    let mut order = 0;
    while value >= 1000.0 && order < SIZE_ORDERS.len() - 1 {
        value /= 1000.0;
        order += 1;
    }
    format!("{:.2} {}", value, SIZE_ORDERS[order])
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_timestamp_zero() {
        assert_eq!(to_timestamp(0.0), "00:00");
        assert_eq!(to_timestamp(f64::NAN), "00:00");
        assert_eq!(to_timestamp(-5.0), "00:00");
    }

    #[test]
    fn test_timestamp_fields() {
        assert_eq!(to_timestamp(3661.0), "01:01:01");
        assert_eq!(to_timestamp(59.0), "00:00:59");
        assert_eq!(to_timestamp(3600.0), "01:00:00");
        assert_eq!(to_timestamp(7325.9), "02:02:05");
    }

    #[test]
    fn test_readable_size_fixtures() {
        assert_eq!(to_readable_size(0), "0 bytes");
        assert_eq!(to_readable_size(1), "1.00 Bytes");
        assert_eq!(to_readable_size(999), "999.00 Bytes");
        assert_eq!(to_readable_size(1500), "1.50 KB");
        assert_eq!(to_readable_size(1_000_000), "1.00 MB");
        assert_eq!(to_readable_size(1_234_567_890), "1.23 GB");
        assert_eq!(to_readable_size(2_500_000_000_000), "2.50 TB");
    }

    proptest! {
        #[test]
        fn prop_timestamp_components_reconstruct(total in 1u64..=359_999) {
            let ts = to_timestamp(total as f64);
            let parts: Vec<&str> = ts.split(':').collect();
            prop_assert_eq!(parts.len(), 3);
            for part in &parts {
                prop_assert_eq!(part.len(), 2);
            }
            let hours: u64 = parts[0].parse().unwrap();
            let minutes: u64 = parts[1].parse().unwrap();
            let secs: u64 = parts[2].parse().unwrap();
            prop_assert_eq!(hours * 3600 + minutes * 60 + secs, total);
        }

        #[test]
        fn prop_readable_size_mantissa_bounded(bytes in 1u64..1_000_000_000_000_000) {
            let formatted = to_readable_size(bytes);
            let (mantissa, unit) = formatted.split_once(' ').unwrap();
            prop_assert!(SIZE_ORDERS.contains(&unit));
            // Rounding to two decimals can print 999.999... as 1000.00
            let mantissa: f64 = mantissa.parse().unwrap();
            prop_assert!(mantissa > 0.0 && mantissa <= 1000.0);
        }
    }
}
