use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

/// Percentage of completed topics, 0 when there are none.
pub fn progress_percent(completed: i64, total: i64) -> f64 {
    if total > 0 {
        completed as f64 / total as f64 * 100.0
    } else {
        0.0
    }
}

/// Whole days from `now` until local midnight of `exam`. Never negative.
pub fn days_until_exam(exam: NaiveDate, now: NaiveDateTime) -> i64 {
    let exam_start = exam.and_time(chrono::NaiveTime::MIN);
    (exam_start - now).num_days().max(0)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct TopicCounts {
    pub total_topics: i64,
    pub completed_topics: i64,
    pub weak_topics: i64,
}

impl TopicCounts {
    pub fn progress(&self) -> f64 {
        progress_percent(self.completed_topics, self.total_topics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(date: &str, time: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(&format!("{date} {time}"), "%Y-%m-%d %H:%M:%S")
            .expect("datetime")
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("date")
    }

    #[test]
    fn progress_is_zero_without_topics() {
        assert_eq!(progress_percent(0, 0), 0.0);
        assert_eq!(TopicCounts::default().progress(), 0.0);
    }

    #[test]
    fn progress_is_completed_over_total() {
        assert_eq!(progress_percent(1, 1), 100.0);
        assert_eq!(progress_percent(1, 4), 25.0);
        assert!((progress_percent(1, 3) - 33.333_333).abs() < 1e-4);
    }

    #[test]
    fn days_until_exam_clamps_past_and_today() {
        let exam = date("2026-02-11");
        assert_eq!(days_until_exam(exam, at("2026-02-11", "09:30:00")), 0);
        assert_eq!(days_until_exam(exam, at("2026-02-11", "00:00:00")), 0);
        assert_eq!(days_until_exam(exam, at("2026-03-01", "12:00:00")), 0);
    }

    #[test]
    fn days_until_exam_floors_partial_days() {
        let exam = date("2026-02-11");
        assert_eq!(days_until_exam(exam, at("2026-02-10", "10:00:00")), 0);
        assert_eq!(days_until_exam(exam, at("2026-02-09", "10:00:00")), 1);
        assert_eq!(days_until_exam(exam, at("2026-02-01", "00:00:00")), 10);
        assert_eq!(days_until_exam(exam, at("2025-12-31", "23:59:59")), 41);
    }
}
