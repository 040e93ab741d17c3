//! Time and ID utilities
//!
//! All customer-facing timestamps are rendered in the restaurant's
//! business timezone, a fixed UTC+5:30 offset (IST). Storage keeps UTC;
//! only display strings are offset-adjusted.

use chrono::{DateTime, FixedOffset, Utc};

/// Business timezone offset in seconds (UTC+5:30)
pub const IST_OFFSET_SECS: i32 = 5 * 3600 + 30 * 60;

/// The fixed business timezone offset
pub fn ist_offset() -> FixedOffset {
    // 19800s is within chrono's ±86400s bound, east_opt cannot fail
    FixedOffset::east_opt(IST_OFFSET_SECS).expect("UTC+5:30 is a valid fixed offset")
}

/// Current time in the business timezone
pub fn ist_now() -> DateTime<FixedOffset> {
    Utc::now().with_timezone(&ist_offset())
}

/// Format a timestamp as the KOT display time (hour:minute)
pub fn format_kot_time(dt: DateTime<FixedOffset>) -> String {
    dt.format("%H:%M").to_string()
}

/// Format a timestamp as the order display time shown on tickets
pub fn format_display_time(dt: DateTime<FixedOffset>) -> String {
    dt.format("%d/%m/%Y %H:%M").to_string()
}

/// 获取当前 UTC 时间戳（毫秒）
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Generate a Snowflake-style i64 for use as resource ID.
///
/// Layout (53 bits, fits in JavaScript's Number.MAX_SAFE_INTEGER):
///   - 41 bits: milliseconds since 2024-01-01 UTC (~69 years)
///   - 12 bits: random (4096 values per ms, collision-free at POS scale)
pub fn snowflake_id() -> i64 {
    use rand::Rng;
    // Custom epoch: 2024-01-01 00:00:00 UTC
    const EPOCH_MS: i64 = 1_704_067_200_000;
    let now = now_millis();
    let ts = (now - EPOCH_MS) & 0x1FF_FFFF_FFFF; // 41 bits
    let rand_bits: i64 = rand::thread_rng().gen_range(0..0x1000); // 12 bits
    (ts << 12) | rand_bits
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_kot_time_format() {
        let dt = ist_offset().with_ymd_and_hms(2025, 3, 14, 19, 5, 0).unwrap();
        assert_eq!(format_kot_time(dt), "19:05");
    }

    #[test]
    fn test_display_time_format() {
        let dt = ist_offset().with_ymd_and_hms(2025, 3, 14, 19, 5, 0).unwrap();
        assert_eq!(format_display_time(dt), "14/03/2025 19:05");
    }

    #[test]
    fn test_ist_offset_is_five_thirty() {
        assert_eq!(ist_offset().local_minus_utc(), 19800);
    }

    #[test]
    fn test_snowflake_id_fits_js_safe_integer() {
        let id = snowflake_id();
        assert!(id > 0);
        assert!(id < (1_i64 << 53));
    }
}
