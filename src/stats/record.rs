use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitorRecord {
    pub first_visit: String,
    pub visit_count: u64,
    #[serde(default)]
    pub last_visit: String,
}

/// Persisted usage counters. Field names are the on-disk JSON keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatsRecord {
    pub total_visits: u64,
    pub unique_visitors: u64,
    pub daily_visits: BTreeMap<String, u64>,
    pub hourly_visits: BTreeMap<String, u64>,
    pub visitor_ips: BTreeMap<String, VisitorRecord>,
    pub last_visit: String,
    pub calculation_count: u64,
    pub most_calculated_numbers: BTreeMap<String, u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HourlyBucket {
    pub label: String,
    pub visits: u64,
}

impl StatsRecord {
    pub fn visits_on(&self, date: &str) -> u64 {
        self.daily_visits.get(date).copied().unwrap_or(0)
    }

    /// Most recent days first.
    pub fn recent_days(&self, limit: usize) -> Vec<(&str, u64)> {
        self.daily_visits
            .iter()
            .rev()
            .take(limit)
            .map(|(day, &count)| (day.as_str(), count))
            .collect()
    }

    /// Hour-of-day histogram folded into six 4-hour buckets (`00-03` .. `20-23`).
    pub fn hourly_buckets(&self) -> Vec<HourlyBucket> {
        (0..6u32)
            .map(|i| {
                let start = i * 4;
                let end = start + 3;
                let visits = (start..=end)
                    .map(|h| self.hourly_visits.get(&format!("{:02}", h)).copied().unwrap_or(0))
                    .sum::<u64>();
                HourlyBucket { label: format!("{:02}-{:02}", start, end), visits }
            })
            .collect()
    }

    /// Most factored numbers, highest count first.
    pub fn top_numbers(&self, limit: usize) -> Vec<(&str, u64)> {
        let mut numbers: Vec<(&str, u64)> = self
            .most_calculated_numbers
            .iter()
            .map(|(n, &count)| (n.as_str(), count))
            .collect();
        // BTreeMap order breaks ties; sort_by is stable
        numbers.sort_by(|a, b| b.1.cmp(&a.1));
        numbers.truncate(limit);
        numbers
    }

    /// `last_visit` without seconds.
    pub fn last_visit_short(&self) -> &str {
        self.last_visit.get(..16).unwrap_or(&self.last_visit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> StatsRecord {
        let mut r = StatsRecord::default();
        for (day, n) in [("2024-01-01", 3), ("2024-01-03", 1), ("2024-01-02", 5)] {
            r.daily_visits.insert(day.to_string(), n);
        }
        for (hour, n) in [("00", 1), ("03", 2), ("09", 4), ("23", 7)] {
            r.hourly_visits.insert(hour.to_string(), n);
        }
        for (num, n) in [("100", 2), ("17", 5), ("12", 2), ("9999", 1)] {
            r.most_calculated_numbers.insert(num.to_string(), n);
        }
        r.last_visit = "2024-01-03 14:22:09".into();
        r
    }

    #[test]
    fn test_default_is_zeroed() {
        let r = StatsRecord::default();
        assert_eq!(r.total_visits, 0);
        assert_eq!(r.calculation_count, 0);
        assert!(r.daily_visits.is_empty() && r.visitor_ips.is_empty());
        assert_eq!(r.last_visit, "");
        assert_eq!(r.last_visit_short(), "");
    }

    #[test]
    fn test_recent_days() {
        let r = sample();
        assert_eq!(r.recent_days(2), vec![("2024-01-03", 1), ("2024-01-02", 5)]);
        assert_eq!(r.visits_on("2024-01-01"), 3);
        assert_eq!(r.visits_on("1999-01-01"), 0);
    }

    #[test]
    fn test_hourly_buckets() {
        let buckets = sample().hourly_buckets();
        assert_eq!(buckets.len(), 6);
        assert_eq!(buckets[0], HourlyBucket { label: "00-03".into(), visits: 3 });
        assert_eq!(buckets[2].visits, 4);
        assert_eq!(buckets[5], HourlyBucket { label: "20-23".into(), visits: 7 });
    }

    #[test]
    fn test_top_numbers() {
        let r = sample();
        assert_eq!(r.top_numbers(3), vec![("17", 5), ("100", 2), ("12", 2)]);
    }

    #[test]
    fn test_last_visit_short() {
        assert_eq!(sample().last_visit_short(), "2024-01-03 14:22");
    }

    #[test]
    fn test_json_shape() {
        let mut r = StatsRecord::default();
        r.visitor_ips.insert(
            "ab12cd34".into(),
            VisitorRecord { first_visit: "a".into(), visit_count: 1, last_visit: "b".into() },
        );
        let value = serde_json::to_value(&r).unwrap();
        for key in [
            "total_visits", "unique_visitors", "daily_visits", "hourly_visits",
            "visitor_ips", "last_visit", "calculation_count", "most_calculated_numbers",
        ] {
            assert!(value.get(key).is_some(), "missing {key}");
        }
        assert_eq!(value["visitor_ips"]["ab12cd34"]["visit_count"], 1);
    }
}
