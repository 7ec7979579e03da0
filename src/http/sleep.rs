//! Suspension capability
//!
//! Every wait the engine performs goes through a [`Sleeper`], so a blocking
//! caller and a cooperative caller share one retry implementation.

use async_trait::async_trait;
use std::time::Duration;

/// Capability to suspend the current unit of work
#[async_trait]
pub trait Sleeper: Send + Sync {
    /// Suspend for `duration`
    async fn sleep(&self, duration: Duration);
}

/// Sleeper backed by the tokio timer
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
