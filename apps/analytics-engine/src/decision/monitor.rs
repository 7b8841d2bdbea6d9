//! Cancellable periodic monitoring loop.
//!
//! One monitor per symbol owns that symbol's `PriceHistory` (single
//! writer). Each tick polls the market-data port, records the price and
//! runs the caller-supplied evaluation. Cancellation stops future ticks;
//! an in-flight evaluation finishes.

use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::exit::ExitDecision;
use super::history::PriceHistory;
use crate::market_data::MarketDataPort;
use crate::stores::Clock;

/// Monitoring loop configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Polling interval in milliseconds.
    pub interval_ms: u64,
    /// Price-history ring-buffer capacity.
    pub history_capacity: usize,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            interval_ms: 30_000,
            history_capacity: 512,
        }
    }
}

/// Handle to a running decision monitor.
#[derive(Debug)]
pub struct DecisionMonitor {
    symbol: String,
    token: CancellationToken,
    handle: JoinHandle<()>,
}

impl DecisionMonitor {
    /// Spawn a monitoring loop for one symbol.
    ///
    /// `evaluate` runs on every successful poll with the updated history
    /// and the fresh price; any decision it returns is delivered on the
    /// returned channel.
    #[must_use]
    pub fn spawn<M, F>(
        symbol: impl Into<String>,
        market_data: Arc<M>,
        clock: Arc<dyn Clock>,
        config: MonitorConfig,
        evaluate: F,
    ) -> (Self, mpsc::UnboundedReceiver<ExitDecision>)
    where
        M: MarketDataPort + 'static,
        F: Fn(&PriceHistory, Decimal) -> Option<ExitDecision> + Send + 'static,
    {
        let symbol = symbol.into();
        let token = CancellationToken::new();
        let (tx, rx) = mpsc::unbounded_channel();

        let loop_symbol = symbol.clone();
        let loop_token = token.clone();
        let handle = tokio::spawn(async move {
            let mut history = PriceHistory::new(config.history_capacity);
            let mut interval =
                tokio::time::interval(Duration::from_millis(config.interval_ms.max(1)));
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            info!(symbol = %loop_symbol, interval_ms = config.interval_ms, "monitor started");
            loop {
                tokio::select! {
                    () = loop_token.cancelled() => {
                        info!(symbol = %loop_symbol, "monitor cancelled");
                        break;
                    }
                    _ = interval.tick() => {
                        match market_data.underlying_price(&loop_symbol).await {
                            Ok(update) => {
                                history.push(update.price, clock.now());
                                debug!(symbol = %loop_symbol, price = %update.price, "price recorded");
                                if let Some(decision) = evaluate(&history, update.price) {
                                    if tx.send(decision).is_err() {
                                        // Receiver dropped; nothing left to notify.
                                        break;
                                    }
                                }
                            }
                            Err(e) => {
                                warn!(symbol = %loop_symbol, error = %e, "price poll failed");
                            }
                        }
                    }
                }
            }
        });

        (
            Self {
                symbol,
                token,
                handle,
            },
            rx,
        )
    }

    /// Symbol being monitored.
    #[must_use]
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Stop future ticks. Does not interrupt an in-flight evaluation.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Wait for the loop to finish.
    pub async fn join(self) {
        let _ = self.handle.await;
    }
}
