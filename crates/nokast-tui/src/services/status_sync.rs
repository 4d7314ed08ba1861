//! Status synchronization with the backend
//!
//! A [`StatusSync`] is started once per application run. It issues the start-up
//! batch (newsletters, keywords, secrets, stories and runtime status), each
//! fetch in its own task so one failure never holds up the others, and then
//! polls pipeline and runtime status every period. The first poll happens one
//! period after start.
//!
//! Every message it emits carries its [`SessionId`]. Shutting the service down
//! cancels the ticker and aborts every in-flight request, and the update
//! function drops anything tagged with a session it no longer knows.

use std::future::Future;
use std::time::Duration;

use nokast_common::ApiClient;
use tokio::sync::mpsc;
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use crate::message::{AppMsg, Failure, Outcome, SessionId, SyncEvent};

#[derive(Debug)]
enum SyncCommand {
    RefreshStories,
}

/// Handle to a running status poller.
pub struct StatusSync {
    session: SessionId,
    cancel: CancellationToken,
    commands: mpsc::UnboundedSender<SyncCommand>,
    task: Option<JoinHandle<()>>,
}

impl StatusSync {
    /// Starts a new session. [`AppMsg::SyncStarted`] is queued before any
    /// result of the session.
    #[instrument(skip(client, sender), fields(period_ms = period.as_millis() as u64))]
    pub fn start(client: ApiClient, period: Duration, sender: mpsc::UnboundedSender<AppMsg>) -> Self {
        let session = SessionId::next();
        let cancel = CancellationToken::new();
        let (commands, command_rx) = mpsc::unbounded_channel();

        if sender.send(AppMsg::SyncStarted(session)).is_err() {
            warn!(%session, "Application channel closed before sync start");
        }

        let fetcher = Fetcher {
            client,
            session,
            sender,
        };
        let task = tokio::spawn(run(fetcher, period, cancel.clone(), command_rx));
        info!(%session, "Status sync started");

        Self {
            session,
            cancel,
            commands,
            task: Some(task),
        }
    }

    pub fn session(&self) -> SessionId {
        self.session
    }

    /// Fetches the story list inside this session. Requests for any other
    /// session are ignored.
    pub fn refresh_stories(&self, session: SessionId) {
        if session != self.session {
            debug!(%session, current = %self.session, "Ignoring refresh for another session");
            return;
        }
        if self.commands.send(SyncCommand::RefreshStories).is_err() {
            warn!(%session, "Status sync is no longer running");
        }
    }

    /// Stops polling and waits for in-flight requests to be aborted.
    #[instrument(skip(self), fields(session = %self.session))]
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                error!(error = %e, "Status sync task ended abnormally");
            }
        }
        info!("Status sync stopped");
    }
}

impl Drop for StatusSync {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Everything a fetch task needs to report back.
#[derive(Clone)]
struct Fetcher {
    client: ApiClient,
    session: SessionId,
    sender: mpsc::UnboundedSender<AppMsg>,
}

impl Fetcher {
    fn emit(&self, event: SyncEvent) {
        let event_name = event.name();
        if self
            .sender
            .send(AppMsg::Synced {
                session: self.session,
                event,
            })
            .is_err()
        {
            debug!(session = %self.session, event = event_name, "Application gone, result dropped");
        }
    }

    fn spawn_fetch<T, Fut>(
        &self,
        tasks: &mut JoinSet<()>,
        fetch: impl FnOnce(ApiClient) -> Fut + Send + 'static,
        wrap: fn(Outcome<T>) -> SyncEvent,
    ) where
        T: Send + 'static,
        Fut: Future<Output = nokast_common::Result<T>> + Send + 'static,
    {
        let fetcher = self.clone();
        tasks.spawn(async move {
            let outcome = fetch(fetcher.client.clone()).await.map_err(Failure::from);
            fetcher.emit(wrap(outcome));
        });
    }

    fn spawn_mount_batch(&self, tasks: &mut JoinSet<()>) {
        debug!(session = %self.session, "Issuing start-up fetches");
        self.spawn_fetch(tasks, |c| async move { c.newsletters().await }, SyncEvent::Newsletters);
        self.spawn_fetch(tasks, |c| async move { c.priority_keywords().await }, SyncEvent::Keywords);
        self.spawn_fetch(tasks, |c| async move { c.secrets_status().await }, SyncEvent::Secrets);
        self.spawn_fetch(tasks, |c| async move { c.stories().await }, SyncEvent::Stories);
        self.spawn_fetch(tasks, |c| async move { c.runtime_status().await }, SyncEvent::Runtime);
    }

    /// One poll: pipeline and runtime status, fetched together and reported
    /// independently.
    async fn poll(self) {
        let issued_at = Instant::now().into_std();
        let (pipeline, runtime) =
            tokio::join!(self.client.pipeline_status(), self.client.runtime_status());
        self.emit(SyncEvent::Pipeline {
            issued_at,
            outcome: pipeline.map_err(Failure::from),
        });
        self.emit(SyncEvent::Runtime(runtime.map_err(Failure::from)));
    }
}

async fn run(
    fetcher: Fetcher,
    period: Duration,
    cancel: CancellationToken,
    mut commands: mpsc::UnboundedReceiver<SyncCommand>,
) {
    let mut tasks = JoinSet::new();
    fetcher.spawn_mount_batch(&mut tasks);

    let mut ticker = time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;

            _ = cancel.cancelled() => break,

            _ = ticker.tick() => {
                // A hung poll must not delay the next tick.
                tasks.spawn(fetcher.clone().poll());
            }

            Some(command) = commands.recv() => match command {
                SyncCommand::RefreshStories => {
                    debug!(session = %fetcher.session, "Refreshing stories");
                    fetcher.spawn_fetch(
                        &mut tasks,
                        |c| async move { c.stories().await },
                        SyncEvent::StoriesRefreshed,
                    );
                }
            },

            Some(joined) = tasks.join_next() => {
                if let Err(e) = joined {
                    if e.is_panic() {
                        error!(session = %fetcher.session, error = %e, "Sync fetch panicked");
                    }
                }
            }
        }
    }

    tasks.shutdown().await;
    debug!(session = %fetcher.session, "Status sync loop exited");
}
