//! Daily, weekly, and trend aggregations over stored gestures.

use crate::summary::SummaryGenerator;
use chrono::{DateTime, Duration, Utc};
use gestura_core::classifier::{count_recognized, GestureClassifier};
use gestura_core::clock::{local_date, local_day_window};
use gestura_core::config::{AnalyticsConfig, MAX_WINDOW_DAYS};
use gestura_core::store::GestureStore;
use gestura_core::types::Gesture;
use serde::{Deserialize, Serialize};

/// Gesture count for one local calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayCount {
    /// Weekday name, e.g. "Monday".
    pub day: String,
    pub count: usize,
}

/// Analytics returned to the parent dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsView {
    pub total_today: usize,
    pub recognized_count: usize,
    /// One entry per day, oldest first, ending today.
    pub weekly_data: Vec<DayCount>,
    /// Recent vs. previous sliding window, in whole percent.
    pub percentage_change: i64,
    pub summary: String,
}

/// Analytics engine over a gesture store.
pub struct Analytics<'a> {
    store: &'a GestureStore,
    classifier: &'a dyn GestureClassifier,
    config: AnalyticsConfig,
}

impl<'a> Analytics<'a> {
    pub fn new(
        store: &'a GestureStore,
        classifier: &'a dyn GestureClassifier,
        config: AnalyticsConfig,
    ) -> Self {
        Self {
            store,
            classifier,
            config,
        }
    }

    /// Compute the view as of the store clock's current time.
    pub fn compute(&self) -> AnalyticsView {
        self.compute_at(self.store.clock().now())
    }

    /// Compute the view as of `now`.
    pub fn compute_at(&self, now: DateTime<Utc>) -> AnalyticsView {
        // Unvalidated configs are clamped to the same bound `AppConfig::validate` enforces.
        let window_days = self.config.window_days.min(MAX_WINDOW_DAYS);
        let comparison_days = self.config.comparison_days.min(MAX_WINDOW_DAYS);

        let today = self.store.today_at(now);
        let history_days = window_days.max(comparison_days.saturating_mul(2));
        let history = self.store.within_days_at(history_days, now);

        let total_today = today.len();
        let recognized_count = count_recognized(self.classifier, &today, self.config.min_confidence);
        let weekly_data = daily_counts(&history, now, window_days);
        let (recent, previous) = window_counts(&history, now, comparison_days);
        let change = percentage_change(recent, previous);
        let summary = SummaryGenerator::summarize(
            total_today,
            change,
            featured_student(&today).map(String::as_str),
        );

        tracing::debug!(
            total_today,
            recognized_count,
            recent,
            previous,
            change,
            "Computed analytics"
        );

        AnalyticsView {
            total_today,
            recognized_count,
            weekly_data,
            percentage_change: change,
            summary,
        }
    }
}

/// Per-day counts for the `days` local calendar days ending on `now`'s date, oldest first.
pub fn daily_counts(gestures: &[Gesture], now: DateTime<Utc>, days: u32) -> Vec<DayCount> {
    let today = local_date(now);
    (0..i64::from(days))
        .rev()
        .map(|offset| {
            let date = today - Duration::days(offset);
            let (start, end) = local_day_window(date);
            let count = gestures
                .iter()
                .filter(|g| g.timestamp >= start && g.timestamp < end)
                .count();
            DayCount {
                day: date.format("%A").to_string(),
                count,
            }
        })
        .collect()
}

/// Counts in two adjacent sliding windows of `span_days * 24h`.
///
/// "Recent" is everything from `now - span` onward; "previous" is
/// `[now - 2*span, now - span)`.
pub fn window_counts(gestures: &[Gesture], now: DateTime<Utc>, span_days: u32) -> (usize, usize) {
    let span = Duration::days(i64::from(span_days));
    let recent_start = now.checked_sub_signed(span).unwrap_or(DateTime::<Utc>::MIN_UTC);
    let previous_start = recent_start
        .checked_sub_signed(span)
        .unwrap_or(DateTime::<Utc>::MIN_UTC);

    let recent = gestures.iter().filter(|g| g.timestamp >= recent_start).count();
    let previous = gestures
        .iter()
        .filter(|g| g.timestamp >= previous_start && g.timestamp < recent_start)
        .count();
    (recent, previous)
}

/// Percent change from `previous` to `recent`.
///
/// With no previous activity the result is 100 if anything happened recently,
/// else 0. Otherwise the ratio is rounded half away from zero (`f64::round`).
pub fn percentage_change(recent: usize, previous: usize) -> i64 {
    if previous == 0 {
        return if recent > 0 { 100 } else { 0 };
    }
    let ratio = (recent as f64 - previous as f64) / previous as f64;
    (ratio * 100.0).round() as i64
}

/// The student named in the summary: whoever sent the most recent gesture.
fn featured_student(today: &[Gesture]) -> Option<&String> {
    today
        .iter()
        .max_by_key(|g| g.timestamp)
        .map(|g| &g.student_name)
}
