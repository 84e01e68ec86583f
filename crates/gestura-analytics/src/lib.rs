//! Gesture analytics for the parent dashboard.
//!
//! Derives daily and weekly counts, the week-over-week trend, and a short
//! written summary from the event store. Nothing is cached; every call reads
//! the store's current contents.

pub mod aggregations;
pub mod summary;

pub use aggregations::{percentage_change, Analytics, AnalyticsView, DayCount};
pub use summary::SummaryGenerator;
