use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, instrument, warn};

use crate::config::FeedSettings;
use crate::error::FeedError;
use crate::feed;
use crate::model::match_view::MatchView;
use crate::model::raw_match::RawMatch;
use crate::render::Renderer;

pub const REFRESHING_MESSAGE: &str = "Aktualisiere…";
pub const ERROR_MESSAGE: &str = "Fehler beim Laden der Daten.";
pub const EMPTY_MESSAGE: &str = "Keine Spiele gefunden.";

/// Where a refresh cycle gets its raw matches from. Called from a blocking thread.
pub trait MatchSource: Send + Sync {
    fn fetch_matches(&self) -> Result<Vec<RawMatch>, FeedError>;
}

/// Handle for one in-flight refresh cycle. Ids only grow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Cycle {
    id: u64,
}

impl Cycle {
    pub fn id(&self) -> u64 {
        self.id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// A fresh list was rendered.
    Rendered { matches: usize },
    /// The cycle failed; the previous list stays and the status message says so.
    Failed,
    /// A newer cycle was applied first; this result was dropped.
    Superseded,
}

struct TickerState {
    last_started: u64,
    last_applied: u64,
    matches: Vec<MatchView>,
    status: String,
    renderers: Vec<Box<dyn Renderer>>,
}

impl TickerState {
    fn render(&mut self) {
        for renderer in self.renderers.iter_mut() {
            renderer.render(&self.matches, &self.status);
        }
    }
}

/// Runs refresh cycles and keeps the rendered board in sync with the newest result.
pub struct Ticker {
    source: Arc<dyn MatchSource>,
    settings: FeedSettings,
    state: Mutex<TickerState>,
}

impl Ticker {
    pub fn new(source: Arc<dyn MatchSource>, renderers: Vec<Box<dyn Renderer>>, settings: FeedSettings) -> Self {
        Self {
            source,
            settings,
            state: Mutex::new(TickerState {
                last_started: 0,
                last_applied: 0,
                matches: Vec::new(),
                status: String::new(),
                renderers,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, TickerState> {
        // Renderers do not leave the state half-updated, so a poisoned lock is still usable.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The list currently on the board.
    pub fn matches(&self) -> Vec<MatchView> {
        self.lock().matches.clone()
    }

    pub fn status(&self) -> String {
        self.lock().status.clone()
    }

    /// Start a cycle: hand out the next id and show the refreshing message.
    pub fn begin_cycle(&self) -> Cycle {
        let mut state = self.lock();
        state.last_started += 1;
        let cycle = Cycle { id: state.last_started };
        state.status = REFRESHING_MESSAGE.to_string();
        state.render();
        debug!(cycle = cycle.id, "Refresh cycle started");
        cycle
    }

    /// Apply the result of `cycle`, classified against `now`.
    ///
    /// Results of cycles older than the last applied one are dropped so a slow
    /// fetch never overwrites a newer board. Failures keep the previous list.
    pub fn complete_cycle(
        &self,
        cycle: Cycle,
        outcome: Result<Vec<RawMatch>, FeedError>,
        now: DateTime<Utc>,
    ) -> CycleOutcome {
        let mut state = self.lock();
        if cycle.id <= state.last_applied {
            info!(cycle = cycle.id, last_applied = state.last_applied, "Dropping result of superseded cycle");
            return CycleOutcome::Superseded;
        }
        state.last_applied = cycle.id;

        let outcome = outcome.and_then(|matches| {
            if matches.is_empty() { Err(FeedError::Empty) } else { Ok(matches) }
        });

        let result = match outcome {
            Ok(raw) => {
                state.matches = feed::build_views(&raw, now, &self.settings);
                let local = now.with_timezone(&self.settings.home_tz);
                state.status = format!("Aktualisiert: {}", local.format("%H:%M:%S"));
                info!(cycle = cycle.id, count = state.matches.len(), "Rendered match list");
                CycleOutcome::Rendered { matches: state.matches.len() }
            }
            Err(FeedError::Empty) => {
                warn!(cycle = cycle.id, "Feed returned no matches; keeping previous list");
                state.status = EMPTY_MESSAGE.to_string();
                CycleOutcome::Failed
            }
            Err(e) => {
                error!(cycle = cycle.id, error = %e, "Refresh failed; keeping previous list");
                state.status = ERROR_MESSAGE.to_string();
                CycleOutcome::Failed
            }
        };
        state.render();
        result
    }

    /// Run one full cycle. Blocks on the network; call it off the async runtime.
    #[instrument(level = "info", skip(self))]
    pub fn refresh(&self) -> CycleOutcome {
        let cycle = self.begin_cycle();
        let outcome = self.source.fetch_matches();
        self.complete_cycle(cycle, outcome, Utc::now())
    }

    /// Refresh now and then every `every` until Ctrl-C.
    pub async fn run(self: Arc<Self>, every: Duration) {
        let mut interval = tokio::time::interval(every);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        info!(interval_secs = every.as_secs(), "Ticker started");

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    let ticker = Arc::clone(&self);
                    // Cycles may overlap; the cycle ids keep late results off the board.
                    tokio::spawn(async move {
                        match tokio::task::spawn_blocking(move || ticker.refresh()).await {
                            Ok(outcome) => debug!(?outcome, "Refresh cycle finished"),
                            Err(e) => error!(error = %e, "Refresh task join error"),
                        }
                    });
                }
                _ = tokio::signal::ctrl_c() => {
                    info!("Shutting down ticker");
                    break;
                }
            }
        }
    }
}
