//! Polls WhatsApp pairing status while the Settings screen is open.

use std::time::Duration;

use nokast_common::ApiClient;
use tokio::sync::mpsc;
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};

use crate::message::{AppMsg, Failure, SessionId};

pub struct WhatsAppWatcher {
    session: SessionId,
    cancel: CancellationToken,
}

impl WhatsAppWatcher {
    /// First poll is immediate.
    #[instrument(skip(client, sender), fields(period_ms = period.as_millis() as u64))]
    pub fn start(client: ApiClient, period: Duration, sender: mpsc::UnboundedSender<AppMsg>) -> Self {
        let session = SessionId::next();
        let cancel = CancellationToken::new();
        if sender.send(AppMsg::WhatsAppWatchStarted(session)).is_err() {
            debug!(%session, "Application gone, watcher start not reported");
        }
        tokio::spawn(watch(client, period, session, sender, cancel.clone()));
        info!(%session, "WhatsApp watcher started");
        Self { session, cancel }
    }

    pub fn session(&self) -> SessionId {
        self.session
    }

    pub fn stop(self) {
        info!(session = %self.session, "WhatsApp watcher stopped");
        self.cancel.cancel();
    }
}

impl Drop for WhatsAppWatcher {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn watch(
    client: ApiClient,
    period: Duration,
    session: SessionId,
    sender: mpsc::UnboundedSender<AppMsg>,
    cancel: CancellationToken,
) {
    let mut ticker = time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {
                let outcome = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => break,
                    result = client.whatsapp_status() => result.map_err(Failure::from),
                };
                if sender.send(AppMsg::WhatsAppPolled { session, outcome }).is_err() {
                    break;
                }
            }
        }
    }
    debug!(%session, "WhatsApp watch loop exited");
}
