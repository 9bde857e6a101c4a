//! Trend analytics over a daily net worth history.

pub mod change;
pub mod format;
pub mod projection;

pub use change::{percentage_change, try_percentage_change};
pub use format::{format_currency, format_percentage, format_possessive, format_tenths};
pub use projection::{
    GOAL_REACHED_MESSAGE, GrowthSamples, MIN_PROJECTION_RECORDS, Projection, ProjectionModel,
    goal_projection, project,
};

use crate::storage::HistorySource;

/// Analytics bound to one history source.
pub struct AnalyticsEngine<'a, S: HistorySource + ?Sized> {
    source: &'a S,
}

impl<'a, S: HistorySource + ?Sized> AnalyticsEngine<'a, S> {
    pub fn new(source: &'a S) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &'a S {
        self.source
    }

    /// Percent change since `days_ago`; `0.0` when there is nothing to compare.
    pub fn percentage_change(&self, days_ago: usize) -> f64 {
        change::percentage_change(self.source, days_ago)
    }

    pub fn try_percentage_change(&self, days_ago: usize) -> Option<f64> {
        change::try_percentage_change(self.source, days_ago)
    }

    pub fn project(&self, goal: i32) -> Projection {
        projection::project(self.source, goal)
    }

    /// Time-to-goal text; empty when no projection is available.
    pub fn goal_projection(&self, goal: i32) -> String {
        projection::goal_projection(self.source, goal)
    }
}
