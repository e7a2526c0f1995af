//! Alert scheduler - runs every alert rule on a fixed period

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval_at, sleep, Instant, MissedTickBehavior};

use crate::application::services::Notifier;
use super::engine::AlertEngine;

pub const DEFAULT_ALERT_INTERVAL: Duration = Duration::from_secs(15 * 60);
pub const DEFAULT_ALERT_SPACING: Duration = Duration::from_secs(10);

pub struct AlertScheduler {
    engine: Arc<AlertEngine>,
    notifier: Notifier,
    interval: Duration,
    spacing: Duration,
}

impl AlertScheduler {
    pub fn new(engine: Arc<AlertEngine>, notifier: Notifier) -> Self {
        Self {
            engine,
            notifier,
            interval: DEFAULT_ALERT_INTERVAL,
            spacing: DEFAULT_ALERT_SPACING,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Delay between two alert messages of the same tick
    pub fn with_spacing(mut self, spacing: Duration) -> Self {
        self.spacing = spacing;
        self
    }

    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move { self.run().await })
    }

    /// Tick forever. The first tick happens one interval after start.
    pub async fn run(&self) {
        if self.engine.is_empty() {
            tracing::warn!("Alert service started without rules");
        }
        tracing::info!(
            "Alert service started with {} rule(s), every {:?}",
            self.engine.len(),
            self.interval
        );

        let mut ticker = interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            self.tick().await;
        }
    }

    /// Run every rule once, in registration order, and return how many
    /// alert messages were handed to the notifier.
    pub async fn tick(&self) -> usize {
        let mut sent = 0usize;

        for rule in self.engine.rules() {
            tracing::info!("{} alert running.", rule.name());

            let message = match rule.evaluate().await {
                Ok(Some(message)) if !message.is_empty() => message,
                Ok(_) => continue,
                Err(e) => {
                    tracing::warn!("{} alert failed: {}", rule.name(), e);
                    continue;
                }
            };

            if sent > 0 {
                sleep(self.spacing).await;
            }
            sent += 1;

            if let Err(e) = self.notifier.send_text(message).await {
                let context = format!(
                    "Error occurred while trying to send message during {} alert,",
                    rule.name()
                );
                self.notifier.report(&context, &e).await;
            }
        }

        sent
    }
}
