use crate::models::{DailyRecord, TrendBundle};
use chrono::{Duration, NaiveDate};

/// Inclusive window of `days` calendar days ending at `today`.
pub fn trend_window(today: NaiveDate, days: u32) -> (NaiveDate, NaiveDate) {
    let span = days.max(1) as i64;
    (today - Duration::days(span - 1), today)
}

/// Merge the three per-category arrays by their `day` key. Upstream
/// gives no ordering guarantee, so grouping happens here; a day
/// reported by at least one category always gets an entry, and
/// categories missing for that day stay empty.
pub fn build_trend_bundle(
    sleep: Vec<DailyRecord>,
    readiness: Vec<DailyRecord>,
    activity: Vec<DailyRecord>,
) -> TrendBundle {
    let mut bundle = TrendBundle::default();
    for record in sleep {
        let day = record.day.clone();
        bundle.days.entry(day).or_default().sleep = Some(record);
    }
    for record in readiness {
        let day = record.day.clone();
        bundle.days.entry(day).or_default().readiness = Some(record);
    }
    for record in activity {
        let day = record.day.clone();
        bundle.days.entry(day).or_default().activity = Some(record);
    }
    bundle
}
