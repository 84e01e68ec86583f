//! Parent-facing summary text.

/// Shown when nothing has been sent today.
pub const NO_ACTIVITY_SUMMARY: &str = "No gestures recorded today yet. Encourage your child to use \
Gestura to communicate their needs in the classroom.";

/// Shown after exactly one gesture today.
pub const SINGLE_ACTIVITY_SUMMARY: &str = "Your child communicated 1 time today using Gestura. \
This shows growing confidence in expressing their needs independently.";

/// Used when a student name is unavailable.
const FALLBACK_NAME: &str = "Your child";

/// Generates the written summary attached to each analytics view.
pub struct SummaryGenerator;

impl SummaryGenerator {
    /// Summarize today's activity.
    ///
    /// `student_name` is only used when more than one gesture was sent today.
    pub fn summarize(total_today: usize, percentage_change: i64, student_name: Option<&str>) -> String {
        match total_today {
            0 => NO_ACTIVITY_SUMMARY.to_string(),
            1 => SINGLE_ACTIVITY_SUMMARY.to_string(),
            n => {
                let name = student_name
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .unwrap_or(FALLBACK_NAME);
                format!(
                    "{} tried to communicate {} times today, {}. Each gesture represents their \
                     growing independence and confidence in the classroom.",
                    name,
                    n,
                    Self::trend(percentage_change)
                )
            }
        }
    }

    /// Describe the recent-vs-previous trend.
    pub fn trend(percentage_change: i64) -> String {
        match percentage_change {
            p if p > 0 => format!("showing {}% more activity than earlier this week", p),
            p if p < 0 => format!("with {}% less activity than earlier this week", p.unsigned_abs()),
            _ => "maintaining consistent communication".to_string(),
        }
    }
}
