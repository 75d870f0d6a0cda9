use chrono::{Local, NaiveDateTime};

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// `YYYY-MM-DD`, the daily histogram key.
pub fn date_key(at: &NaiveDateTime) -> String {
    at.format("%Y-%m-%d").to_string()
}

/// `00`..`23`, the hourly histogram key.
pub fn hour_key(at: &NaiveDateTime) -> String {
    at.format("%H").to_string()
}

pub fn timestamp(at: &NaiveDateTime) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 7)
            .and_then(|d| d.and_hms_opt(9, 5, 42))
            .unwrap()
    }

    #[test]
    fn test_keys() {
        let at = sample();
        assert_eq!(date_key(&at), "2024-03-07");
        assert_eq!(hour_key(&at), "09");
        assert_eq!(timestamp(&at), "2024-03-07 09:05:42");
    }

    #[test]
    fn test_timestamp_parses_back() {
        let ts = timestamp(&now());
        assert!(NaiveDateTime::parse_from_str(&ts, TIMESTAMP_FORMAT).is_ok());
    }
}
