//! Application layer - Core Elm architecture implementation
//!
//! This module implements the Model-Update-View pattern from Elm architecture.
//! [`Application`] is the runtime around it: it feeds terminal events, timer
//! ticks and service results to [`update`], executes the returned effects and
//! redraws.

pub mod state;
pub mod update;
pub mod view;

pub use state::AppModel;
pub use update::update;
pub use view::render_app;

use anyhow::{Context, Result};
use crossterm::event::{Event, EventStream};
use futures::StreamExt;
use nokast_common::ApiClient;
use ratatui::DefaultTerminal;
use tokio::{signal, sync::mpsc, time::interval};
use tracing::{debug, error, info, instrument, warn};

use crate::{
    config::Config,
    error::Error,
    message::{AppMsg, Effect, Failure},
    services::{ActionExecutor, StatusSync, WhatsAppWatcher},
};

/// Largest number of queued service messages handled between two redraws.
const MESSAGE_BATCH: usize = 16;

/// Main application following Elm architecture
pub struct Application {
    config: Config,
    /// Application model (state)
    model: AppModel,
    /// Message sender for async operations
    sender: mpsc::UnboundedSender<AppMsg>,
    /// Message receiver
    receiver: mpsc::UnboundedReceiver<AppMsg>,
    client: ApiClient,
    executor: ActionExecutor,
    status_sync: Option<StatusSync>,
    whatsapp_watcher: Option<WhatsAppWatcher>,
    /// Kept alive so copied text survives on platforms where the owner must
    /// stay around
    clipboard: Option<arboard::Clipboard>,
}

impl Application {
    /// Create new application instance
    #[instrument(skip(config), fields(server = %config.client.server_url))]
    pub fn new(config: Config) -> Result<Self> {
        info!("Initializing Nokast TUI application");

        let client = ApiClient::from_config(&config.client)
            .context("Failed to create backend client")?;
        let (sender, receiver) = mpsc::unbounded_channel();
        let executor = ActionExecutor::new(client.clone(), sender.clone());

        let mut model = AppModel::new();
        if config.ui.show_help_on_start {
            model.toggle_help();
        }

        Ok(Self {
            config,
            model,
            sender,
            receiver,
            client,
            executor,
            status_sync: None,
            whatsapp_watcher: None,
            clipboard: None,
        })
    }

    /// Run the main application loop until the user quits
    #[instrument(skip_all)]
    pub async fn run(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        info!("Starting application main loop");

        self.status_sync = Some(StatusSync::start(
            self.client.clone(),
            self.config.client.sync.poll_interval(),
            self.sender.clone(),
        ));

        let mut events = EventStream::new();
        let mut ticker = interval(self.config.ui.tick_rate());
        let ctrl_c = signal::ctrl_c();
        tokio::pin!(ctrl_c);

        let result = loop {
            if let Err(e) = terminal.draw(|frame| render_app(&self.model, frame)) {
                break Err(Error::ui(format!("Failed to draw: {e}")).into());
            }

            tokio::select! {
                event = events.next() => match event {
                    Some(Ok(Event::Key(key))) => self.handle_message(AppMsg::Key(key)),
                    Some(Ok(Event::Resize(width, height))) => {
                        self.handle_message(AppMsg::Resize(width, height))
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => break Err(Error::from(e).into()),
                    None => {
                        warn!("Terminal event stream ended");
                        break Ok(());
                    }
                },

                Some(msg) = self.receiver.recv() => {
                    self.handle_message(msg);
                    for _ in 1..MESSAGE_BATCH {
                        match self.receiver.try_recv() {
                            Ok(msg) => self.handle_message(msg),
                            Err(_) => break,
                        }
                    }
                }

                _ = ticker.tick() => self.handle_message(AppMsg::Tick),

                _ = &mut ctrl_c => {
                    info!("Received Ctrl+C, initiating graceful shutdown");
                    break Ok(());
                }
            }

            if self.model.should_quit {
                break Ok(());
            }
        };

        self.shutdown().await;
        result
    }

    /// Handle a message using the Elm update pattern
    fn handle_message(&mut self, msg: AppMsg) {
        for effect in update(&mut self.model, msg) {
            self.handle_effect(effect);
        }
    }

    /// Execute one side effect requested by the update function
    fn handle_effect(&mut self, effect: Effect) {
        match effect {
            Effect::RefreshStories(session) => match &self.status_sync {
                Some(sync) => sync.refresh_stories(session),
                None => warn!(%session, "Story refresh requested without a running sync"),
            },
            Effect::StartWhatsAppWatch => {
                if let Some(previous) = self.whatsapp_watcher.take() {
                    previous.stop();
                }
                self.whatsapp_watcher = Some(WhatsAppWatcher::start(
                    self.client.clone(),
                    self.config.client.sync.whatsapp_poll_interval(),
                    self.sender.clone(),
                ));
            }
            Effect::StopWhatsAppWatch => {
                if let Some(watcher) = self.whatsapp_watcher.take() {
                    watcher.stop();
                }
            }
            Effect::CopyToClipboard(text) => {
                let outcome = self
                    .copy_to_clipboard(&text)
                    .map(|()| text.len())
                    .map_err(|e| Failure::backend(e.to_string()));
                if self.sender.send(AppMsg::ExportFinished(outcome)).is_err() {
                    debug!("Application gone, export result dropped");
                }
            }
            request => self.executor.execute(request),
        }
    }

    fn copy_to_clipboard(&mut self, text: &str) -> crate::Result<()> {
        let clipboard = match &mut self.clipboard {
            Some(clipboard) => clipboard,
            slot => slot.insert(arboard::Clipboard::new()?),
        };
        clipboard.set_text(text)?;
        Ok(())
    }

    /// Stop every background service
    async fn shutdown(&mut self) {
        info!("Initiating graceful shutdown");
        if let Some(watcher) = self.whatsapp_watcher.take() {
            watcher.stop();
        }
        if let Some(sync) = self.status_sync.take() {
            sync.shutdown().await;
        }
        info!("Graceful shutdown complete");
    }
}

/// Initialize the terminal, run the application and restore the terminal
/// whatever the outcome.
pub async fn run(config: Config) -> Result<()> {
    let mut app = Application::new(config)?;
    let mut terminal = ratatui::try_init().context("Failed to initialize terminal")?;
    let result = app.run(&mut terminal).await;
    ratatui::restore();
    if let Err(e) = &result {
        error!(error = %e, "Application exited with an error");
    }
    result
}
