use crate::analytics::AnalyticsRecord;

/// Aggregates derived from one set of analytics records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryStats {
    pub count: usize,
    pub total: i64,
    pub average: i64,
    pub top_title: String,
}

impl SummaryStats {
    /// Compute count, total, rounded average and the title of the
    /// highest-metric record. Averages round to the nearest integer with
    /// halves toward positive infinity. Ties keep the earliest record.
    /// Returns `None` for an empty set since the average is undefined there.
    pub fn from_records(records: &[AnalyticsRecord]) -> Option<Self> {
        if records.is_empty() {
            return None;
        }
        let total: i64 = records.iter().map(|record| record.metric).sum();
        let count = records.len() as i64;
        let average = (2 * total + count).div_euclid(2 * count);
        let mut top_index = 0;
        for (index, record) in records.iter().enumerate().skip(1) {
            if record.metric > records[top_index].metric {
                top_index = index;
            }
        }
        Some(Self {
            count: records.len(),
            total,
            average,
            top_title: records[top_index].title.clone(),
        })
    }
}

/// Render a metric with thousands separators, e.g. `1234567` -> `1,234,567`.
pub fn format_metric(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let len = digits.len();
    if len <= 3 {
        return if value < 0 {
            format!("-{digits}")
        } else {
            digits
        };
    }
    let lead = match len % 3 {
        0 => 3,
        rem => rem,
    };
    let mut out = String::with_capacity(len + len / 3 + 1);
    if value < 0 {
        out.push('-');
    }
    out.push_str(&digits[..lead]);
    let mut index = lead;
    while index < len {
        out.push(',');
        out.push_str(&digits[index..index + 3]);
        index += 3;
    }
    out
}

/// Shorten a title to at most `max_chars` characters, appending an ellipsis
/// when anything was cut. Counts characters, not bytes, so multi-byte titles
/// stay intact.
pub fn truncate_title(title: &str, max_chars: usize) -> String {
    match title.char_indices().nth(max_chars) {
        Some((byte_index, _)) => format!("{}…", &title[..byte_index]),
        None => title.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(title: &str, metric: i64) -> AnalyticsRecord {
        AnalyticsRecord {
            title: title.to_string(),
            url: format!("https://example.com/{title}"),
            metric,
        }
    }

    #[test]
    fn summary_counts_totals_and_rounds_average() {
        let records = vec![record("A", 120), record("B", 450), record("C", 300)];
        let stats = SummaryStats::from_records(&records).expect("non-empty records");
        assert_eq!(stats.count, 3);
        assert_eq!(stats.total, 870);
        assert_eq!(stats.average, 290);
        assert_eq!(stats.top_title, "B");
    }

    #[test]
    fn average_rounds_to_nearest_integer() {
        let records = vec![record("A", 1), record("B", 2)];
        let stats = SummaryStats::from_records(&records).expect("non-empty records");
        // 1.5 rounds up
        assert_eq!(stats.average, 2);

        let records = vec![record("A", 1), record("B", 1), record("C", 2)];
        let stats = SummaryStats::from_records(&records).expect("non-empty records");
        assert_eq!(stats.average, 1);
    }

    #[test]
    fn negative_half_averages_round_toward_positive_infinity() {
        let records = vec![record("A", -1), record("B", -2)];
        let stats = SummaryStats::from_records(&records).expect("non-empty records");
        assert_eq!(stats.total, -3);
        assert_eq!(stats.average, -1);

        let records = vec![record("A", -2), record("B", -3)];
        let stats = SummaryStats::from_records(&records).expect("non-empty records");
        assert_eq!(stats.average, -2);
    }

    #[test]
    fn top_title_keeps_first_on_ties() {
        let records = vec![record("first", 500), record("second", 500), record("low", 10)];
        let stats = SummaryStats::from_records(&records).expect("non-empty records");
        assert_eq!(stats.top_title, "first");
    }

    #[test]
    fn empty_records_yield_no_stats() {
        assert_eq!(SummaryStats::from_records(&[]), None);
    }

    #[test]
    fn format_metric_groups_thousands() {
        assert_eq!(format_metric(0), "0");
        assert_eq!(format_metric(999), "999");
        assert_eq!(format_metric(1_000), "1,000");
        assert_eq!(format_metric(987_654), "987,654");
        assert_eq!(format_metric(1_234_567), "1,234,567");
    }

    #[test]
    fn format_metric_handles_negatives() {
        assert_eq!(format_metric(-42), "-42");
        assert_eq!(format_metric(-12_345), "-12,345");
    }

    #[test]
    fn short_titles_are_untouched() {
        assert_eq!(truncate_title("short title", 100), "short title");
    }

    #[test]
    fn long_titles_are_cut_with_ellipsis() {
        let long = "y".repeat(130);
        let shown = truncate_title(&long, 100);
        assert_eq!(shown.chars().count(), 101);
        assert!(shown.ends_with('…'));
        assert_eq!(&shown[..100], &long[..100]);
    }

    #[test]
    fn truncation_counts_characters_not_bytes() {
        let title = "é".repeat(101);
        let shown = truncate_title(&title, 100);
        assert_eq!(shown.chars().count(), 101);
        assert!(shown.starts_with('é'));
        assert!(shown.ends_with('…'));
    }
}
