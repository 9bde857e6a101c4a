//! Time-to-goal projection.
//!
//! The projection runs in four stages: sample the history, pick a growth
//! model from the samples, solve for years, and render the result. Only the
//! first stage touches the history source; the rest are pure functions.

use super::format::{format_currency, format_tenths, pluralize};
use crate::storage::HistorySource;
use std::fmt;
use tracing::debug;

/// Minimum history length before any projection is attempted.
pub const MIN_PROJECTION_RECORDS: usize = 14;

pub const DAYS_PER_YEAR: usize = 365;

pub const GOAL_REACHED_MESSAGE: &str = "Goal reached!";

/// Growth rates at or below this are treated as noise.
const MIN_GROWTH_RATE: f64 = 0.01;

/// Growth rates at or above this are treated as implausible.
const MAX_GROWTH_RATE: f64 = 2.0;

// ============================================================================
// Model Selection
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProjectionModel {
    /// Contributions stay at the baseline annual velocity.
    Linear,
    /// Annual contributions grow by `growth_rate` each year.
    Geometric { growth_rate: f64 },
}

/// Net worth sampled at the latest record and one and two comparison terms before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GrowthSamples {
    pub latest: i32,
    pub term_ago: i32,
    pub two_terms_ago: i32,
}

impl GrowthSamples {
    /// Relative change between the prior and the recent window's gain.
    ///
    /// Defined only when both windows gained.
    pub fn growth_rate(&self) -> Option<f64> {
        let recent = i64::from(self.latest) - i64::from(self.term_ago);
        let prior = i64::from(self.term_ago) - i64::from(self.two_terms_ago);
        if recent > 0 && prior > 0 {
            Some((recent - prior) as f64 / prior as f64)
        } else {
            None
        }
    }
}

/// Length in days of each comparison window, chosen by how much history exists.
pub fn comparison_term(record_count: usize) -> Option<usize> {
    match record_count {
        n if n >= 730 => Some(365),
        n if n >= 365 => Some(180),
        n if n >= 180 => Some(90),
        _ => None,
    }
}

pub fn select_model(record_count: usize, samples: Option<&GrowthSamples>) -> ProjectionModel {
    if comparison_term(record_count).is_none() {
        return ProjectionModel::Linear;
    }
    match samples.and_then(GrowthSamples::growth_rate) {
        Some(rate) if rate > MIN_GROWTH_RATE && rate < MAX_GROWTH_RATE => {
            ProjectionModel::Geometric { growth_rate: rate }
        }
        _ => ProjectionModel::Linear,
    }
}

// ============================================================================
// Solve
// ============================================================================

/// Net worth gained per year, annualized from up to a year of history.
pub fn annual_velocity(latest: i32, year_ago: i32, record_count: usize) -> f64 {
    let days = record_count.min(DAYS_PER_YEAR);
    if days == 0 {
        return 0.0;
    }
    let delta = i64::from(latest) - i64::from(year_ago);
    delta as f64 * DAYS_PER_YEAR as f64 / days as f64
}

/// Years needed to close `gap` at `velocity` per year under `model`.
///
/// The geometric model sums a series of yearly contributions growing at the
/// model's rate; if its logarithm is undefined the linear answer is used.
pub fn solve_years(model: ProjectionModel, gap: f64, velocity: f64) -> f64 {
    if let ProjectionModel::Geometric { growth_rate } = model {
        let arg = 1.0 + gap * growth_rate / velocity;
        if arg > 0.0 {
            return arg.ln() / (1.0 + growth_rate).ln();
        }
        debug!(growth_rate, arg, "geometric solve undefined, using linear model");
    }
    gap / velocity
}

// ============================================================================
// Result
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projection {
    /// Fewer than [`MIN_PROJECTION_RECORDS`] records.
    InsufficientHistory,
    /// The history could not be read.
    Unavailable,
    GoalReached,
    /// Net worth is flat or shrinking over the baseline year.
    NoProgress,
    Eta {
        years: f64,
        model: ProjectionModel,
        goal: i32,
    },
}

impl Projection {
    pub fn is_available(&self) -> bool {
        matches!(self, Self::GoalReached | Self::Eta { .. })
    }
}

impl fmt::Display for Projection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InsufficientHistory | Self::Unavailable | Self::NoProgress => Ok(()),
            Self::GoalReached => f.write_str(GOAL_REACHED_MESSAGE),
            Self::Eta { years, goal, .. } => f.write_str(&format_eta(*years, *goal)),
        }
    }
}

/// Renders a duration in years as the coarsest unit that still reads naturally.
pub fn format_eta(years: f64, goal: i32) -> String {
    let goal = format_currency(goal);
    let months = years * 12.0;
    if months < 1.0 {
        return format!("Less than a month to {}", goal);
    }
    if years < 1.0 {
        let whole = (months.floor() as i64).max(1);
        return format!("{} to {}", pluralize(&whole.to_string(), "month"), goal);
    }
    format!("{} to {}", pluralize(&format_tenths(years), "year"), goal)
}

// ============================================================================
// Projection
// ============================================================================

pub fn project<S>(source: &S, goal: i32) -> Projection
where
    S: HistorySource + ?Sized,
{
    let record_count = source.record_count();
    if record_count < MIN_PROJECTION_RECORDS {
        return Projection::InsufficientHistory;
    }
    let Some(latest) = source.latest() else {
        return Projection::Unavailable;
    };
    if latest.net_worth >= goal {
        return Projection::GoalReached;
    }
    let Some(year_ago) = source.at_offset_from_latest(DAYS_PER_YEAR) else {
        return Projection::Unavailable;
    };

    let velocity = annual_velocity(latest.net_worth, year_ago.net_worth, record_count);
    if velocity <= 0.0 {
        return Projection::NoProgress;
    }

    let samples = comparison_term(record_count).and_then(|term| {
        Some(GrowthSamples {
            latest: latest.net_worth,
            term_ago: source.at_offset_from_latest(term)?.net_worth,
            two_terms_ago: source.at_offset_from_latest(term * 2)?.net_worth,
        })
    });
    let model = select_model(record_count, samples.as_ref());

    let gap = (i64::from(goal) - i64::from(latest.net_worth)) as f64;
    let years = solve_years(model, gap, velocity);
    if !years.is_finite() || years < 0.0 {
        return Projection::NoProgress;
    }
    debug!(record_count, velocity, ?model, years, "goal projection");
    Projection::Eta { years, model, goal }
}

/// Human-readable projection; empty when no projection is available.
pub fn goal_projection<S>(source: &S, goal: i32) -> String
where
    S: HistorySource + ?Sized,
{
    project(source, goal).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{DailyRecord, RecordDate};
    use chrono::{Duration, NaiveDate};

    fn history_from<F: Fn(usize) -> i32>(days: usize, value_at: F) -> Vec<DailyRecord> {
        let start = NaiveDate::from_ymd_opt(2022, 1, 1).unwrap();
        (0..days)
            .map(|i| {
                let date = RecordDate::from_naive(start + Duration::days(i as i64)).unwrap();
                DailyRecord::new(date, value_at(i))
            })
            .collect()
    }

    #[test]
    fn test_insufficient_history_is_empty() {
        for days in [0, 1, 13] {
            let history = history_from(days, |i| 1000 + i as i32 * 10);
            assert_eq!(project(&history, 2000), Projection::InsufficientHistory);
            assert_eq!(goal_projection(&history, 2000), "");
            assert_eq!(goal_projection(&history, -5), "");
        }
    }

    #[test]
    fn test_goal_reached_short_circuits() {
        let history = history_from(14, |_| 5000);
        assert_eq!(goal_projection(&history, 5000), GOAL_REACHED_MESSAGE);
        assert_eq!(goal_projection(&history, 100), GOAL_REACHED_MESSAGE);
    }

    #[test]
    fn test_fifteen_day_linear_scenario() {
        let history = history_from(15, |i| 1000 + i as i32 * 10);
        let projection = project(&history, 2000);
        let Projection::Eta { years, model, .. } = projection else {
            panic!("expected eta, got {:?}", projection);
        };
        assert_eq!(model, ProjectionModel::Linear);
        // 140 gained over 15 records annualizes to 140 * 365 / 15.
        let expected = 860.0 / (140.0 * 365.0 / 15.0);
        assert!((years - expected).abs() < 1e-9);
        assert_eq!(projection.to_string(), "3 months to $2,000");
    }

    #[test]
    fn test_flat_history_has_no_projection() {
        let history = history_from(30, |_| 1000);
        assert_eq!(project(&history, 2000), Projection::NoProgress);
        assert_eq!(goal_projection(&history, 2000), "");
    }

    #[test]
    fn test_declining_history_has_no_projection() {
        let history = history_from(60, |i| 10_000 - i as i32 * 5);
        assert_eq!(goal_projection(&history, 20_000), "");
    }

    #[test]
    fn test_comparison_term_thresholds() {
        assert_eq!(comparison_term(179), None);
        assert_eq!(comparison_term(180), Some(90));
        assert_eq!(comparison_term(364), Some(90));
        assert_eq!(comparison_term(365), Some(180));
        assert_eq!(comparison_term(729), Some(180));
        assert_eq!(comparison_term(730), Some(365));
    }

    #[test]
    fn test_growth_rate_requires_two_gains() {
        let accelerating = GrowthSamples {
            latest: 3000,
            term_ago: 1500,
            two_terms_ago: 500,
        };
        assert_eq!(accelerating.growth_rate(), Some(0.5));

        let dipped = GrowthSamples {
            latest: 3000,
            term_ago: 400,
            two_terms_ago: 500,
        };
        assert_eq!(dipped.growth_rate(), None);
    }

    #[test]
    fn test_select_model_band() {
        let samples = |recent: i32, prior: i32| GrowthSamples {
            latest: 1000 + prior + recent,
            term_ago: 1000 + prior,
            two_terms_ago: 1000,
        };
        assert_eq!(
            select_model(400, Some(&samples(150, 100))),
            ProjectionModel::Geometric { growth_rate: 0.5 }
        );
        // Noise-level acceleration.
        assert_eq!(select_model(400, Some(&samples(1005, 1000))), ProjectionModel::Linear);
        // Implausible acceleration.
        assert_eq!(select_model(400, Some(&samples(300, 100))), ProjectionModel::Linear);
        // Deceleration.
        assert_eq!(select_model(400, Some(&samples(50, 100))), ProjectionModel::Linear);
        // Too little history to compare windows.
        assert_eq!(select_model(100, Some(&samples(150, 100))), ProjectionModel::Linear);
        assert_eq!(select_model(400, None), ProjectionModel::Linear);
    }

    #[test]
    fn test_solve_geometric_is_faster_than_linear() {
        let linear = solve_years(ProjectionModel::Linear, 10_000.0, 1_000.0);
        let geometric = solve_years(
            ProjectionModel::Geometric { growth_rate: 0.5 },
            10_000.0,
            1_000.0,
        );
        assert!((linear - 10.0).abs() < 1e-9);
        // 1000 * (1.5^n - 1) / 0.5 = 10000  =>  n = ln(6) / ln(1.5)
        assert!((geometric - 6f64.ln() / 1.5f64.ln()).abs() < 1e-9);
        assert!(geometric < linear);
    }

    #[test]
    fn test_accelerating_history_uses_geometric_model() {
        // 10 per day through day 109, 15 per day afterwards. The last two
        // 90-day windows gain 1350 and 900.
        let history = history_from(200, |i| {
            let i = i as i32;
            if i <= 109 {
                10_000 + i * 10
            } else {
                11_090 + (i - 109) * 15
            }
        });
        let projection = project(&history, 100_000);
        let Projection::Eta { model, .. } = projection else {
            panic!("expected eta, got {:?}", projection);
        };
        assert_eq!(model, ProjectionModel::Geometric { growth_rate: 0.5 });
    }

    #[test]
    fn test_format_eta_units() {
        assert_eq!(format_eta(0.05, 2000), "Less than a month to $2,000");
        assert_eq!(format_eta(1.0 / 12.0 + 1e-9, 2000), "1 month to $2,000");
        assert_eq!(format_eta(0.5, 2000), "6 months to $2,000");
        assert_eq!(format_eta(0.999, 2000), "11 months to $2,000");
        assert_eq!(format_eta(1.0, 1_000_000), "1 year to $1,000,000");
        assert_eq!(format_eta(3.53, 2000), "3.5 years to $2,000");
        assert_eq!(format_eta(3.96, 2000), "4 years to $2,000");
    }
}
