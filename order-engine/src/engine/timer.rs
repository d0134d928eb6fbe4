//! Cancellation grace-window timer
//!
//! One timer is armed per outstanding cancellation request. When it fires
//! it re-reads the order and reverts it to the status it held before the
//! request, going through the same optimistic-concurrency write path as a
//! staff resolution; a request resolved in the meantime makes the fire a
//! no-op. Timers live in memory only: after a restart `recover_pending`
//! re-derives them from persisted deadlines.

use crate::core::config::EngineConfig;
use crate::engine::EngineResult;
use crate::storage::{OrderStore, StorageError, StorageResult};
use dashmap::DashMap;
use shared::util::now_millis;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// An armed timer for one order's outstanding request
///
/// `requested_at` is the guard against disarm/rearm races: a fire only
/// reverts the order if the persisted request still carries the same
/// timestamp the timer was armed for.
struct ArmedTimer {
    requested_at: i64,
    cancel: CancellationToken,
}

/// Outcome of a single fire attempt
enum FireOutcome {
    /// The order was still pending this request and has been reverted
    Reverted,
    /// The request was already resolved (or replaced); nothing to do
    Skipped,
}

/// Delay before retry `attempt` (0-based): doubles from the base, capped
///
/// Zero-valued config is clamped to one second so the loop never spins.
fn retry_delay(attempt: u32, base_secs: u64, max_secs: u64) -> Duration {
    let base = base_secs.max(1);
    let max = max_secs.max(1);
    let factor = 2u64.saturating_pow(attempt.min(31));
    Duration::from_secs(base.saturating_mul(factor).min(max))
}

/// Schedules the automatic reversion of unresolved cancellation requests
pub struct CancellationTimerService {
    store: OrderStore,
    config: EngineConfig,
    shutdown: CancellationToken,
    armed: DashMap<String, ArmedTimer>,
}

impl CancellationTimerService {
    pub fn new(store: OrderStore, config: EngineConfig, shutdown: CancellationToken) -> Arc<Self> {
        Arc::new(Self {
            store,
            config,
            shutdown,
            armed: DashMap::new(),
        })
    }

    /// Number of currently armed timers
    pub fn armed_count(&self) -> usize {
        self.armed.len()
    }

    /// Arm a timer for an outstanding cancellation request
    ///
    /// Idempotent: re-arming the same order for the same `requested_at` is
    /// a no-op. Arming for a newer request replaces (and cancels) the old
    /// timer.
    pub fn arm(self: &Arc<Self>, order_id: &str, requested_at: i64, expires_at: i64) {
        if let Some(existing) = self.armed.get(order_id) {
            if existing.requested_at == requested_at {
                return;
            }
        }
        self.disarm(order_id);

        let cancel = self.shutdown.child_token();
        self.armed.insert(
            order_id.to_string(),
            ArmedTimer {
                requested_at,
                cancel: cancel.clone(),
            },
        );
        tracing::debug!(order_id, expires_at, "Armed cancellation timer");

        let service = Arc::clone(self);
        let order_id = order_id.to_string();
        tokio::spawn(async move {
            service
                .run_timer(order_id, requested_at, expires_at, cancel)
                .await;
        });
    }

    /// Disarm the timer for an order, if one is armed
    ///
    /// Called on explicit staff resolution so the timer never fires on an
    /// already-resolved order (the `requested_at` guard would make such a
    /// fire a no-op anyway).
    pub fn disarm(&self, order_id: &str) {
        if let Some((_, timer)) = self.armed.remove(order_id) {
            timer.cancel.cancel();
            tracing::debug!(order_id, "Disarmed cancellation timer");
        }
    }

    /// Re-derive timers from persisted state after a restart
    ///
    /// Requests whose deadline has not passed are re-armed; requests that
    /// expired while the process was down are reverted immediately.
    /// Returns the number of timers armed.
    pub fn recover_pending(self: &Arc<Self>) -> EngineResult<usize> {
        let pending = self.store.pending_cancellations()?;
        let now = now_millis();
        let mut armed = 0;

        for order in pending {
            let Some(request) = order.cancellation.clone() else {
                tracing::warn!(
                    order_id = %order.order_id,
                    "CANCELLATION_PENDING order without request bookkeeping, skipping"
                );
                continue;
            };

            if request.expires_at <= now {
                match self.try_revert(&order.order_id, request.requested_at) {
                    Ok(FireOutcome::Reverted) => {
                        tracing::info!(
                            order_id = %order.order_id,
                            "Reverted overdue cancellation request at startup"
                        );
                    }
                    Ok(FireOutcome::Skipped) => {}
                    Err(e) => {
                        // Let the timer's retry loop deal with it
                        tracing::error!(
                            order_id = %order.order_id,
                            error = %e,
                            "Failed to revert overdue cancellation, arming retry timer"
                        );
                        self.arm(&order.order_id, request.requested_at, request.expires_at);
                        armed += 1;
                    }
                }
            } else {
                self.arm(&order.order_id, request.requested_at, request.expires_at);
                armed += 1;
            }
        }

        Ok(armed)
    }

    async fn run_timer(
        self: Arc<Self>,
        order_id: String,
        requested_at: i64,
        expires_at: i64,
        cancel: CancellationToken,
    ) {
        let wait_millis = (expires_at - now_millis()).max(0) as u64;
        tokio::select! {
            _ = cancel.cancelled() => return,
            _ = tokio::time::sleep(Duration::from_millis(wait_millis)) => {}
        }

        self.fire(&order_id, requested_at).await;
        self.armed
            .remove_if(&order_id, |_, timer| timer.requested_at == requested_at);
    }

    /// Drive one fire to completion
    ///
    /// A lost optimistic-concurrency race is re-read immediately; a
    /// transient storage failure is retried with exponential backoff, so a
    /// pending cancellation always resolves eventually.
    async fn fire(&self, order_id: &str, requested_at: i64) {
        let mut attempt = 0u32;

        loop {
            match self.try_revert(order_id, requested_at) {
                Ok(FireOutcome::Reverted) => {
                    tracing::info!(order_id, "Cancellation request expired, order reverted");
                    return;
                }
                Ok(FireOutcome::Skipped) => {
                    tracing::debug!(order_id, "Timer fired for resolved request, no-op");
                    return;
                }
                Err(StorageError::VersionConflict { .. }) => {
                    // Raced another writer; yield before the re-read so a
                    // contended order never monopolizes a worker thread
                    tokio::task::yield_now().await;
                    continue;
                }
                Err(e) => {
                    let delay = retry_delay(
                        attempt,
                        self.config.timer_retry_base_secs,
                        self.config.timer_retry_max_secs,
                    );
                    tracing::error!(order_id, error = %e, ?delay, "Timer fire failed, will retry");
                    tokio::select! {
                        _ = self.shutdown.cancelled() => return,
                        _ = tokio::time::sleep(delay) => {}
                    }
                    attempt = attempt.saturating_add(1);
                }
            }
        }
    }

    /// One revert attempt through the regular optimistic write path
    fn try_revert(&self, order_id: &str, requested_at: i64) -> StorageResult<FireOutcome> {
        let Some(order) = self.store.get_order(order_id)? else {
            return Ok(FireOutcome::Skipped);
        };
        if !order.is_cancellation_pending() {
            return Ok(FireOutcome::Skipped);
        }
        let matches_request = order
            .cancellation
            .as_ref()
            .is_some_and(|request| request.requested_at == requested_at);
        if !matches_request {
            return Ok(FireOutcome::Skipped);
        }

        let expected_version = order.version;
        let mut updated = order;
        updated.revert_cancellation();
        self.store.update_order(updated, expected_version)?;
        Ok(FireOutcome::Reverted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_delay_doubles_up_to_cap() {
        assert_eq!(retry_delay(0, 1, 30), Duration::from_secs(1));
        assert_eq!(retry_delay(1, 1, 30), Duration::from_secs(2));
        assert_eq!(retry_delay(2, 1, 30), Duration::from_secs(4));
        assert_eq!(retry_delay(4, 1, 30), Duration::from_secs(16));
        assert_eq!(retry_delay(5, 1, 30), Duration::from_secs(30));
        assert_eq!(retry_delay(63, 1, 30), Duration::from_secs(30));
    }

    #[test]
    fn test_retry_delay_scales_with_base() {
        assert_eq!(retry_delay(0, 5, 60), Duration::from_secs(5));
        assert_eq!(retry_delay(1, 5, 60), Duration::from_secs(10));
        assert_eq!(retry_delay(4, 5, 60), Duration::from_secs(60));
    }

    #[test]
    fn test_retry_delay_zero_config_never_spins() {
        assert_eq!(retry_delay(0, 0, 0), Duration::from_secs(1));
        assert_eq!(retry_delay(10, 0, 0), Duration::from_secs(1));
    }
}
