//! The ticket poll loop.
//!
//! Each cycle fetches the current listing, classifies every ticket against the
//! snapshot store, broadcasts one notification per new or changed ticket, and
//! writes the store.
//!
//! # Bootstrap
//!
//! The store is empty after a restart, so without a seed every ticket in the
//! first listing would be announced as new. When bootstrap is enabled (the
//! default) the first cycle instead loads every non-closed ticket plus the
//! regular listing into the store silently. A failed bootstrap is retried on
//! the next cycle.
//!
//! # Failure
//!
//! A failed fetch makes the cycle a no-op: nothing is sent and the store is
//! untouched. The next cycle is the retry.

use std::fmt;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, trace, warn};

use crate::diff::{Classification, DiffEngine};
use crate::notify::{MessageFormatter, Notifier};
use crate::sdp::{SourceError, TicketFilter, TicketSource, fetch_snapshots};
use crate::store::SnapshotStore;
use crate::telegram::Messenger;
use crate::types::TicketSnapshot;

use super::clock::{Clock, SystemClock};

/// Default interval between poll cycles (60 seconds).
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 60;

/// Configuration for the poll loop.
#[derive(Debug, Clone)]
pub struct PollConfig {
    /// Sleep between the end of one cycle and the start of the next.
    ///
    /// Default: 60 seconds. Configure via `CHECK_INTERVAL`.
    pub poll_interval: Duration,

    /// Whether the first cycle silently seeds the store.
    ///
    /// Default: true. Configure via `BOOTSTRAP_OPEN_TICKETS`.
    pub bootstrap: bool,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl PollConfig {
    pub fn new() -> Self {
        PollConfig {
            poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            bootstrap: true,
        }
    }
}

/// What the loop is doing right now. Logged at trace level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollPhase {
    Idle,
    Fetching,
    Diffing,
    Dispatching,
    Sleeping,
}

impl fmt::Display for PollPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PollPhase::Idle => "idle",
            PollPhase::Fetching => "fetching",
            PollPhase::Diffing => "diffing",
            PollPhase::Dispatching => "dispatching",
            PollPhase::Sleeping => "sleeping",
        };
        f.write_str(name)
    }
}

/// Summary of one cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Tickets returned by the source.
    pub fetched: usize,
    pub new: usize,
    pub changed: usize,
    pub unchanged: usize,
    /// Tickets seeded silently by a bootstrap cycle.
    pub bootstrapped: usize,
    /// Successful sends across all broadcasts in the cycle.
    pub delivered: usize,
    /// The fetch failed and the cycle did nothing.
    pub fetch_failed: bool,
}

/// Polls the ticket source and notifies subscribers about changes.
pub struct PollLoop<S, M, C = SystemClock> {
    source: S,
    notifier: Notifier<M>,
    store: SnapshotStore,
    engine: DiffEngine,
    formatter: MessageFormatter,
    clock: C,
    config: PollConfig,
    needs_bootstrap: bool,
    phase: PollPhase,
}

impl<S, M, C> PollLoop<S, M, C>
where
    S: TicketSource + Send + Sync,
    M: Messenger + Send + Sync,
    C: Clock,
{
    pub fn new(
        source: S,
        notifier: Notifier<M>,
        store: SnapshotStore,
        formatter: MessageFormatter,
        clock: C,
        config: PollConfig,
    ) -> Self {
        PollLoop {
            source,
            notifier,
            store,
            engine: DiffEngine::default(),
            formatter,
            clock,
            needs_bootstrap: config.bootstrap,
            config,
            phase: PollPhase::Idle,
        }
    }

    /// Replaces the default closed-status rules.
    pub fn with_engine(mut self, engine: DiffEngine) -> Self {
        self.engine = engine;
        self
    }

    pub fn phase(&self) -> PollPhase {
        self.phase
    }

    /// Returns true until a bootstrap cycle has succeeded.
    pub fn needs_bootstrap(&self) -> bool {
        self.needs_bootstrap
    }

    fn set_phase(&mut self, phase: PollPhase) {
        trace!(from = %self.phase, to = %phase, "Poll phase");
        self.phase = phase;
    }

    /// Performs exactly one cycle and returns its summary.
    pub async fn run_cycle(&mut self) -> CycleReport {
        let report = if self.needs_bootstrap {
            self.bootstrap_cycle().await
        } else {
            self.regular_cycle().await
        };
        self.set_phase(PollPhase::Idle);
        report
    }

    async fn bootstrap_cycle(&mut self) -> CycleReport {
        self.set_phase(PollPhase::Fetching);
        let mut report = CycleReport::default();

        let seed = match self.fetch_seed().await {
            Ok(seed) => seed,
            Err(e) => {
                warn!(
                    error = %e,
                    transient = e.kind.is_transient(),
                    "Bootstrap fetch failed, will retry next cycle"
                );
                report.fetch_failed = true;
                return report;
            }
        };

        report.fetched = seed.len();
        let before = self.store.len().await;
        self.store.insert_all(seed).await;
        report.bootstrapped = self.store.len().await - before;
        self.needs_bootstrap = false;

        info!(
            bootstrapped = report.bootstrapped,
            "Seeded snapshot store without notifications"
        );
        report
    }

    /// Non-closed tickets first, then the regular listing, so that closed
    /// tickets near the top of the listing are also known before the first
    /// regular cycle.
    async fn fetch_seed(&self) -> Result<Vec<TicketSnapshot>, SourceError> {
        let mut seed = fetch_snapshots(&self.source, TicketFilter::NotClosed).await?;
        seed.extend(fetch_snapshots(&self.source, TicketFilter::All).await?);
        Ok(seed)
    }

    async fn regular_cycle(&mut self) -> CycleReport {
        self.set_phase(PollPhase::Fetching);
        let mut report = CycleReport::default();

        let tickets = match fetch_snapshots(&self.source, TicketFilter::All).await {
            Ok(tickets) => tickets,
            Err(e) => {
                warn!(
                    error = %e,
                    transient = e.kind.is_transient(),
                    "Ticket fetch failed, skipping cycle"
                );
                report.fetch_failed = true;
                return report;
            }
        };
        report.fetched = tickets.len();

        let now = self.clock.now();
        for incoming in tickets {
            self.set_phase(PollPhase::Diffing);
            let previous = self.store.get(&incoming.id).await;
            let classification = self.engine.classify(&incoming, previous.as_ref(), now);

            let (text, to_store) = match classification {
                Classification::Unchanged => {
                    report.unchanged += 1;
                    continue;
                }
                Classification::New => {
                    report.new += 1;
                    debug!(ticket = %incoming.id, "New ticket");
                    (self.formatter.format_new(&incoming), incoming)
                }
                Classification::Changed {
                    changes,
                    metrics,
                    merged,
                } => {
                    report.changed += 1;
                    debug!(
                        ticket = %incoming.id,
                        fields = ?changes.iter().map(|c| c.field.name()).collect::<Vec<_>>(),
                        "Ticket changed"
                    );
                    (
                        self.formatter
                            .format_changed(&incoming.id, &changes, &metrics),
                        merged,
                    )
                }
            };

            self.set_phase(PollPhase::Dispatching);
            let broadcast = self.notifier.broadcast(&text).await;
            report.delivered += broadcast.delivered;
            self.store.insert(to_store).await;
        }

        if report.new > 0 || report.changed > 0 {
            info!(
                fetched = report.fetched,
                new = report.new,
                changed = report.changed,
                delivered = report.delivered,
                "Poll cycle finished"
            );
        } else {
            debug!(fetched = report.fetched, "Poll cycle finished, nothing changed");
        }
        report
    }

    /// Runs cycles until `shutdown` is cancelled.
    #[instrument(skip_all)]
    pub async fn run(mut self, shutdown: CancellationToken) {
        info!(
            interval_secs = self.config.poll_interval.as_secs(),
            bootstrap = self.needs_bootstrap,
            "Poll loop started"
        );

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = self.run_cycle() => {}
            }

            self.set_phase(PollPhase::Sleeping);
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = tokio::time::sleep(self.config.poll_interval) => {}
            }
        }

        info!("Shutdown signal received, poll loop stopped");
    }
}
