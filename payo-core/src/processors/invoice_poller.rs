//! InvoicePoller processor.
//!
//! The InvoicePoller is responsible for:
//! - Fetching one invoice immediately, then once per interval
//! - Publishing the latest [`PollState`] on a `watch` channel
//! - Emitting [`InvoiceEvent`]s when the observed status changes or a fetch
//!   fails
//! - Stopping on its own once a terminal status is observed
//!
//! At most one fetch is in flight. Ticks that fall due while a fetch is
//! still running are dropped rather than replayed afterwards.

use crate::events::{InvoiceEvent, InvoiceEventSender, PollOutcome};
use crate::utils::polling_interval::refetch_interval;
use kanau::processor::Processor;
use payo_sdk::client::{ClientError, InvoiceApi};
use payo_sdk::objects::{InvoiceStatus, InvoiceWithPayment};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::{JoinError, JoinHandle};
use tokio::time::{Instant, MissedTickBehavior};
use tokio_stream::wrappers::WatchStream;
use tracing::{debug, info, warn};

// ---------------------------------------------------------------------------
// Public data types
// ---------------------------------------------------------------------------

/// One scheduled fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollTick {
    /// 1-based count of fetches started by this poller.
    pub sequence: u64,
}

/// Coarse state of the underlying query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryStatus {
    Loading,
    Error,
    Success,
}

/// Snapshot published after every fetch.
#[derive(Debug, Clone, Default)]
pub struct PollState {
    /// Last successfully fetched invoice. Kept across failed fetches.
    pub data: Option<InvoiceWithPayment>,
    /// A fetch is currently in flight.
    pub is_fetching: bool,
    /// Error of the most recent fetch, cleared by the next success.
    pub error: Option<String>,
    /// The poller will fetch again.
    pub is_polling: bool,
    /// Completed fetches, successful or not.
    pub fetch_count: u64,
}

impl PollState {
    /// True until the first fetch completes.
    pub fn is_loading(&self) -> bool {
        self.data.is_none() && self.error.is_none()
    }

    pub fn query_status(&self) -> QueryStatus {
        if self.error.is_some() {
            QueryStatus::Error
        } else if self.data.is_some() {
            QueryStatus::Success
        } else {
            QueryStatus::Loading
        }
    }

    pub fn status(&self) -> Option<InvoiceStatus> {
        self.data.as_ref().map(InvoiceWithPayment::status)
    }
}

// ---------------------------------------------------------------------------
// InvoicePoller
// ---------------------------------------------------------------------------

/// Re-fetches a single invoice until it settles.
pub struct InvoicePoller {
    api: Arc<dyn InvoiceApi>,
    invoice_id: String,
    interval: Duration,
    events: Option<InvoiceEventSender>,
}

impl InvoicePoller {
    pub fn new(api: Arc<dyn InvoiceApi>, invoice_id: impl Into<String>, interval: Duration) -> Self {
        Self {
            api,
            invoice_id: invoice_id.into(),
            interval,
            events: None,
        }
    }

    /// Also report discrete events on `sender`.
    pub fn with_events(mut self, sender: InvoiceEventSender) -> Self {
        self.events = Some(sender);
        self
    }

    /// Spawn the polling task.
    ///
    /// The first fetch happens right away. Dropping the returned handle
    /// stops the poller.
    pub fn start(self) -> PollerHandle {
        let (state_tx, state_rx) = watch::channel(PollState {
            is_polling: true,
            ..Default::default()
        });
        let (stop_tx, stop_rx) = watch::channel(false);
        let task = tokio::spawn(self.run(state_tx, stop_rx));
        PollerHandle {
            state_rx,
            stop_tx,
            task,
        }
    }

    async fn run(
        self,
        state_tx: watch::Sender<PollState>,
        mut stop_rx: watch::Receiver<bool>,
    ) -> PollOutcome {
        let invoice_id = self.invoice_id.clone();
        info!(
            invoice_id = %invoice_id,
            interval_ms = self.interval.as_millis() as u64,
            "InvoicePoller started"
        );

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut last_status: Option<InvoiceStatus> = None;
        let mut sequence = 0u64;

        // -- Main loop ------------------------------------------------------
        let outcome = loop {
            tokio::select! {
                biased;

                // Any change, or the handle being dropped, means stop.
                _ = stop_rx.changed() => break PollOutcome::Stopped,

                _ = ticker.tick() => {}
            }

            sequence += 1;
            state_tx.send_modify(|state| state.is_fetching = true);
            let started = Instant::now();

            let fetched = tokio::select! {
                biased;

                _ = stop_rx.changed() => {
                    debug!(invoice_id = %invoice_id, sequence, "Dropping in-flight fetch");
                    break PollOutcome::Stopped;
                }

                result = self.process(PollTick { sequence }) => result,
            };

            if started.elapsed() >= self.interval {
                ticker.reset();
            }

            match fetched {
                Ok(invoice) => {
                    let status = invoice.status();
                    if last_status != Some(status) {
                        match last_status {
                            Some(previous) if !previous.can_advance_to(status) => warn!(
                                invoice_id = %invoice_id,
                                from = %previous,
                                to = %status,
                                "Observed status is not reachable from the previous one"
                            ),
                            _ => {}
                        }
                        info!(invoice_id = %invoice_id, status = %status, "Invoice status observed");
                        self.emit(InvoiceEvent::StatusObserved {
                            invoice_id: invoice_id.clone(),
                            previous: last_status,
                            status,
                        })
                        .await;
                        last_status = Some(status);
                    }

                    let next = refetch_interval(status, self.interval);
                    state_tx.send_modify(|state| {
                        state.data = Some(invoice);
                        state.error = None;
                        state.is_fetching = false;
                        state.is_polling = next.is_some();
                        state.fetch_count += 1;
                    });

                    if next.is_none() {
                        break PollOutcome::Settled(status);
                    }
                }
                Err(e) => {
                    warn!(invoice_id = %invoice_id, sequence, error = %e, "Invoice fetch failed");
                    let error = e.to_string();
                    state_tx.send_modify(|state| {
                        state.error = Some(error.clone());
                        state.is_fetching = false;
                        state.fetch_count += 1;
                    });
                    self.emit(InvoiceEvent::FetchFailed {
                        invoice_id: invoice_id.clone(),
                        error,
                    })
                    .await;
                }
            }
        };

        // -- Cleanup --------------------------------------------------------
        state_tx.send_modify(|state| {
            state.is_fetching = false;
            state.is_polling = false;
        });
        self.emit(InvoiceEvent::PollingFinished {
            invoice_id: invoice_id.clone(),
            outcome,
        })
        .await;
        info!(invoice_id = %invoice_id, ?outcome, fetches = sequence, "InvoicePoller finished");
        outcome
    }

    async fn emit(&self, event: InvoiceEvent) {
        let Some(sender) = &self.events else {
            return;
        };
        if sender.send(event).await.is_err() {
            debug!(invoice_id = %self.invoice_id, "Event receiver dropped");
        }
    }
}

// ---------------------------------------------------------------------------
// Processor trait implementation
// ---------------------------------------------------------------------------

impl Processor<PollTick> for InvoicePoller {
    type Output = InvoiceWithPayment;
    type Error = ClientError;

    async fn process(&self, tick: PollTick) -> Result<InvoiceWithPayment, ClientError> {
        debug!(invoice_id = %self.invoice_id, sequence = tick.sequence, "Fetching invoice");
        self.api.get_invoice(&self.invoice_id).await
    }
}

// ---------------------------------------------------------------------------
// PollerHandle
// ---------------------------------------------------------------------------

/// Control and observation side of a running [`InvoicePoller`].
pub struct PollerHandle {
    state_rx: watch::Receiver<PollState>,
    stop_tx: watch::Sender<bool>,
    task: JoinHandle<PollOutcome>,
}

impl PollerHandle {
    /// Latest published state.
    pub fn state(&self) -> PollState {
        self.state_rx.borrow().clone()
    }

    /// A receiver that outlives the handle.
    pub fn subscribe(&self) -> watch::Receiver<PollState> {
        self.state_rx.clone()
    }

    /// State snapshots as a stream, starting with the current one.
    pub fn updates(&self) -> WatchStream<PollState> {
        WatchStream::new(self.state_rx.clone())
    }

    pub fn is_polling(&self) -> bool {
        self.state_rx.borrow().is_polling
    }

    /// Stop scheduling fetches and drop any fetch in flight.
    pub fn stop(&self) {
        self.stop_tx.send_replace(true);
    }

    /// Wait for the poller to finish on its own or after [`stop`](Self::stop).
    pub async fn join(self) -> Result<PollOutcome, JoinError> {
        let PollerHandle { stop_tx, task, .. } = self;
        let outcome = task.await;
        drop(stop_tx);
        outcome
    }
}
