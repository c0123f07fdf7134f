//! Fetch-normalize-publish cycle backing the transaction feed view.
//!
//! A [`FeedSynchronizer`] is the only writer of the published [`FeedView`].
//! Presentation code reads it through [`FeedSubscription`]s, which hand out
//! immutable snapshots. Transactions and balance always travel together in one
//! [`FeedSnapshot`], so a reader can never pair a list from one cycle with a
//! balance from another.

use crate::core::error::{FeedError, Result};
use crate::core::normalize::RecordNormalizer;
use crate::core::source::TransactionSource;
use crate::core::transaction::{BalanceSummary, DisplayTransaction};
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Normalized transactions and balance produced by one successful cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedSnapshot {
    cycle: u64,
    transactions: Vec<DisplayTransaction>,
    balance: BalanceSummary,
}

impl FeedSnapshot {
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    pub fn transactions(&self) -> &[DisplayTransaction] {
        &self.transactions
    }

    pub fn balance(&self) -> &BalanceSummary {
        &self.balance
    }
}

/// Outcome of the most recent cycle.
///
/// While a newer cycle is still in flight the status stays `Synchronizing`,
/// even after an older cycle has settled and published its snapshot.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum SyncStatus {
    #[default]
    Unsynchronized,
    Synchronizing,
    Synchronized,
    Failed(FeedError),
}

/// What the presentation layer sees: the latest published snapshot, if any,
/// and the outcome of the most recent cycle.
#[derive(Debug, Clone, Default)]
pub struct FeedView {
    snapshot: Option<Arc<FeedSnapshot>>,
    status: SyncStatus,
    settled_cycle: u64,
}

impl FeedView {
    pub fn snapshot(&self) -> Option<&Arc<FeedSnapshot>> {
        self.snapshot.as_ref()
    }

    /// Published transactions, empty until the first successful cycle.
    pub fn transactions(&self) -> &[DisplayTransaction] {
        self.snapshot
            .as_deref()
            .map(|snapshot| snapshot.transactions())
            .unwrap_or(&[])
    }

    pub fn balance(&self) -> Option<&BalanceSummary> {
        self.snapshot.as_deref().map(|snapshot| snapshot.balance())
    }

    pub fn status(&self) -> &SyncStatus {
        &self.status
    }

    pub fn error(&self) -> Option<&FeedError> {
        match &self.status {
            SyncStatus::Failed(err) => Some(err),
            _ => None,
        }
    }
}

/// Read handle on the published feed. The synchronizer stops publishing once
/// every subscription has been dropped.
#[derive(Debug, Clone)]
pub struct FeedSubscription {
    receiver: watch::Receiver<FeedView>,
}

impl FeedSubscription {
    pub fn current(&self) -> FeedView {
        self.receiver.borrow().clone()
    }

    /// Waits for the next publication. Returns `None` once the synchronizer
    /// is gone.
    pub async fn changed(&mut self) -> Option<FeedView> {
        self.receiver.changed().await.ok()?;
        Some(self.receiver.borrow_and_update().clone())
    }
}

pub struct FeedSynchronizer {
    source: Arc<dyn TransactionSource>,
    normalizer: RecordNormalizer,
    published: watch::Sender<FeedView>,
    cycles: AtomicU64,
}

impl FeedSynchronizer {
    pub fn new(source: Arc<dyn TransactionSource>, normalizer: RecordNormalizer) -> Self {
        let (published, _) = watch::channel(FeedView::default());
        Self {
            source,
            normalizer,
            published,
            cycles: AtomicU64::new(0),
        }
    }

    pub fn subscribe(&self) -> FeedSubscription {
        FeedSubscription {
            receiver: self.published.subscribe(),
        }
    }

    pub fn current(&self) -> FeedView {
        self.published.borrow().clone()
    }

    /// Fetches the feed once, normalizes every record and publishes the result.
    ///
    /// Any failure leaves the published snapshot untouched and is reported
    /// through the view status as well as the return value. A cycle that
    /// finishes after a newer one has already been published returns its
    /// result without replacing the newer view.
    pub async fn sync(&self) -> Result<Arc<FeedSnapshot>> {
        let cycle = self.cycles.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(cycle, "Starting feed synchronization");
        self.mark_synchronizing(cycle);

        match self.fetch_and_normalize(cycle).await {
            Ok(snapshot) => {
                let published = self.settle(cycle, |view| {
                    view.snapshot = Some(Arc::clone(&snapshot));
                    view.status = SyncStatus::Synchronized;
                });
                if published {
                    info!(
                        cycle,
                        count = snapshot.transactions.len(),
                        "Published transaction feed"
                    );
                }
                Ok(snapshot)
            }
            Err(err) => {
                warn!(cycle, error = %err, "Feed synchronization failed");
                self.settle(cycle, |view| view.status = SyncStatus::Failed(err.clone()));
                Err(err)
            }
        }
    }

    /// Runs [`sync`](Self::sync) on a background task.
    pub fn spawn_sync(self: &Arc<Self>) -> JoinHandle<Result<Arc<FeedSnapshot>>> {
        let synchronizer = Arc::clone(self);
        tokio::spawn(async move { synchronizer.sync().await })
    }

    async fn fetch_and_normalize(&self, cycle: u64) -> Result<Arc<FeedSnapshot>> {
        let response = self.source.fetch_transactions().await?;
        debug!(
            cycle,
            count = response.transactions.len(),
            "Normalizing transactions"
        );
        let transactions = self.normalizer.normalize_all(&response.transactions)?;

        Ok(Arc::new(FeedSnapshot {
            cycle,
            transactions,
            balance: response.balance,
        }))
    }

    fn mark_synchronizing(&self, cycle: u64) {
        if self.published.is_closed() {
            debug!(cycle, "No live subscribers, not marking view as synchronizing");
            return;
        }
        self.published
            .send_modify(|view| view.status = SyncStatus::Synchronizing);
    }

    /// Applies the outcome of `cycle` unless every subscriber is gone or a
    /// newer cycle has already settled. The status is held at
    /// `Synchronizing` while a newer cycle is outstanding.
    fn settle(&self, cycle: u64, update: impl FnOnce(&mut FeedView)) -> bool {
        if self.published.is_closed() {
            debug!(cycle, "No live subscribers, dropping publication");
            return false;
        }
        self.published.send_if_modified(|view| {
            if cycle < view.settled_cycle {
                debug!(
                    cycle,
                    settled = view.settled_cycle,
                    "Newer cycle already settled, keeping it"
                );
                return false;
            }
            view.settled_cycle = cycle;
            update(view);
            if cycle < self.cycles.load(Ordering::SeqCst) {
                view.status = SyncStatus::Synchronizing;
            }
            true
        })
    }
}
