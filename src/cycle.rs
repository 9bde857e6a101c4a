//! One wake cycle: fold today's fetched value into the store and the cached
//! state, then derive everything the display needs.

use crate::analytics::{AnalyticsEngine, format_currency, format_percentage, format_possessive};
use crate::config::TrackerConfig;
use crate::core::RecordDate;
use crate::state::{CachedState, UNAVAILABLE};
use crate::storage::RecordStore;
use tracing::{info, warn};

/// What the external collaborators produced this cycle.
#[derive(Debug, Clone, Default)]
pub struct CycleInput {
    /// Today's net worth, or `None` when the fetch failed or there was no network.
    pub fetched_net_worth: Option<i32>,
    pub gold_price: Option<String>,
    pub bitcoin_price: Option<String>,
}

impl CycleInput {
    pub fn offline() -> Self {
        Self::default()
    }

    pub fn fetched(net_worth: i32) -> Self {
        Self {
            fetched_net_worth: Some(net_worth),
            ..Self::default()
        }
    }

    pub fn with_quotes(mut self, gold: &str, bitcoin: &str) -> Self {
        self.gold_price = Some(gold.to_string());
        self.bitcoin_price = Some(bitcoin.to_string());
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChangeIndicator {
    pub percent: f64,
    pub rising: bool,
    /// e.g. `5% last 24 hours`
    pub label: String,
}

/// Everything a renderer needs for one refresh.
#[derive(Debug, Clone, PartialEq)]
pub struct Dashboard {
    pub title: String,
    pub net_worth: String,
    pub change: ChangeIndicator,
    /// Empty when no projection is available.
    pub projection: String,
    /// Oldest first; `None` when there are too few points to draw.
    pub sparkline: Option<Vec<i32>>,
    pub gold_price: String,
    pub bitcoin_price: String,
    /// Set when the net worth shown was not fetched this cycle.
    pub stale: bool,
    /// Whether today's value reached the store.
    pub saved: bool,
}

pub struct WakeCycle<'a> {
    config: &'a TrackerConfig,
    store: &'a RecordStore,
}

impl<'a> WakeCycle<'a> {
    pub fn new(config: &'a TrackerConfig, store: &'a RecordStore) -> Self {
        Self { config, store }
    }

    pub fn run(&self, state: &mut CachedState, today: &RecordDate, input: &CycleInput) -> Dashboard {
        if !state.initialized {
            if let Some(stored) = self.store.latest() {
                state.net_worth = stored.net_worth;
                state.initialized = true;
                info!(date = %stored.date, net_worth = stored.net_worth, "loaded stored net worth");
            }
        }

        let analytics = AnalyticsEngine::new(self.store);
        let mut stale = true;
        let mut saved = false;

        // A zero from the fetcher means the fetch failed.
        match input.fetched_net_worth.filter(|v| *v != 0) {
            Some(net_worth) => {
                state.net_worth = net_worth;
                state.initialized = true;
                stale = false;
                saved = self.store.upsert(today, net_worth);
                state.percent_change = analytics.percentage_change(self.config.change_days);
                info!(percent_change = state.percent_change, "net worth refreshed");
            }
            None if !state.initialized => {
                state.net_worth = 0;
                warn!("no net worth fetched and nothing stored");
            }
            None => {
                warn!(net_worth = state.net_worth, "using cached net worth");
            }
        }

        if let Some(gold) = &input.gold_price {
            state.accept_gold_price(gold);
        }
        if let Some(bitcoin) = &input.bitcoin_price {
            state.accept_bitcoin_price(bitcoin);
        }

        let projection = match self.config.goal {
            Some(goal) => analytics.goal_projection(goal),
            None => String::new(),
        };

        let history = self.store.history_window(self.config.sparkline_days);
        let sparkline: Option<Vec<i32>> = (history.len() >= self.config.sparkline_min_points)
            .then(|| history.iter().map(|r| r.net_worth).collect());

        Dashboard {
            title: self.title(),
            net_worth: if state.net_worth > 0 {
                format_currency(state.net_worth)
            } else {
                UNAVAILABLE.to_string()
            },
            change: ChangeIndicator {
                percent: state.percent_change,
                rising: state.percent_change >= 0.0,
                label: format!(
                    "{} {}",
                    format_percentage(state.percent_change),
                    change_window_label(self.config.change_days)
                ),
            },
            projection,
            sparkline,
            gold_price: state.gold_price.clone(),
            bitcoin_price: state.bitcoin_price.clone(),
            stale,
            saved,
        }
    }

    fn title(&self) -> String {
        match &self.config.owner_name {
            Some(name) => format!("{} Net Worth", format_possessive(name)),
            None => "Net Worth".to_string(),
        }
    }
}

fn change_window_label(days: usize) -> String {
    match days {
        1 => "last 24 hours".to_string(),
        n => format!("last {} days", n),
    }
}
