use super::engine::BookingEngine;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Default interval between expiry sweeps.
pub const DEFAULT_SWEEP_PERIOD: Duration = Duration::from_secs(30);

/// Background task that sweeps stale holds on a recurring tick.
///
/// Each tick invokes `BookingEngine::expire_due`; per-order races (an order
/// cancelled or confirmed mid-sweep) are handled inside the engine, and a
/// failed sweep is logged and retried on the next tick rather than stopping
/// the loop.
pub struct HoldExpirySweeper {
    engine: Arc<BookingEngine>,
    period: Duration,
}

impl HoldExpirySweeper {
    pub fn new(engine: Arc<BookingEngine>, period: Duration) -> Self {
        Self { engine, period }
    }

    /// Spawns the sweep loop onto the tokio runtime.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    pub async fn run(self) {
        let mut ticker = tokio::time::interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            match self.engine.expire_due().await {
                Ok(0) => {}
                Ok(count) => tracing::info!(expired = count, "expired stale holds"),
                Err(err) => tracing::warn!(error = %err, "hold-expiry sweep failed"),
            }
        }
    }
}
