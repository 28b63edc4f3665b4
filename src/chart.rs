use crate::models::{TrendBundle, TrendSeries};

/// Flatten a trend bundle into aligned plottable series. Labels follow
/// the bundle's calendar-ordered day keys; a day missing a category
/// keeps its slot as `None` so the plotted line breaks instead of
/// dropping the day.
pub fn trend_series(bundle: &TrendBundle) -> TrendSeries {
    let mut series = TrendSeries {
        labels: Vec::with_capacity(bundle.days.len()),
        sleep: Vec::with_capacity(bundle.days.len()),
        readiness: Vec::with_capacity(bundle.days.len()),
        activity: Vec::with_capacity(bundle.days.len()),
    };
    for (day, entry) in &bundle.days {
        series.labels.push(day.clone());
        series.sleep.push(entry.sleep.as_ref().and_then(|r| r.score));
        series
            .readiness
            .push(entry.readiness.as_ref().and_then(|r| r.score));
        series
            .activity
            .push(entry.activity.as_ref().and_then(|r| r.score));
    }
    series
}
