//! Main application coordinator

use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{DisableMouseCapture, EnableMouseCapture, EventStream};
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use futures::StreamExt;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tokio::sync::mpsc;
use tokio::time::Interval;
use tracing::{debug, info, warn};

use crate::api::settings::SERVER_URL_SETTING;
use crate::api::{ApiClient, NodeApi};
use crate::config::Config;
use crate::console::{forms, ActionDispatcher, ContainerListSync, NodeHeadSync, PendingSet};
use crate::core::NodeId;
use crate::state::AppState;
use crate::ui::{AppEvent, FormKind, UiAction, UiApp};

/// How often notifications are expired
const TICK_RATE: Duration = Duration::from_millis(250);

/// Main application struct
pub struct App {
    config: Config,
    node_id: NodeId,
    client: Arc<ApiClient>,
    containers: ContainerListSync,
    heads: NodeHeadSync,
    dispatcher: ActionDispatcher,
    ui: UiApp,
    events_tx: mpsc::UnboundedSender<AppEvent>,
    events_rx: mpsc::UnboundedReceiver<AppEvent>,
}

impl App {
    /// Create a new application instance for one node
    pub fn new(config: Config, node_id: NodeId) -> Result<Self> {
        info!("Creating new App instance for node {}", node_id);

        let client = Arc::new(ApiClient::new(&config.api_root(), config.request_timeout())?);
        let api: Arc<dyn NodeApi> = client.clone();
        let containers = ContainerListSync::new(Arc::clone(&api));
        let heads = NodeHeadSync::new(Arc::clone(&api));
        let pending = PendingSet::new();
        let dispatcher = ActionDispatcher::new(api, containers.clone(), pending.clone());

        let state = AppState::new(node_id.clone(), config.console_origin()?, pending);
        let ui = UiApp::new(state).with_server_url(config.suggested_server_url());
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        Ok(Self {
            config,
            node_id,
            client,
            containers,
            heads,
            dispatcher,
            ui,
            events_tx,
            events_rx,
        })
    }

    /// Run the main application loop
    pub async fn run(&mut self) -> Result<()> {
        info!("Starting main application loop");

        let mut terminal = setup_terminal()?;
        let result = self.run_event_loop(&mut terminal).await;
        restore_terminal(&mut terminal)?;

        result
    }

    async fn run_event_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> Result<()> {
        let mut events = EventStream::new();
        let mut containers_rx = self.containers.subscribe(&self.node_id);
        let mut heads_rx = self.heads.subscribe(&self.node_id);
        let mut tick = tokio::time::interval(TICK_RATE);
        let mut auto_refresh = self
            .config
            .general
            .auto_refresh_seconds
            .map(|seconds| tokio::time::interval(Duration::from_secs(seconds)));
        let notification_ttl =
            i64::try_from(self.config.general.notification_ttl_seconds).unwrap_or(i64::MAX);

        self.refresh();
        self.load_server_url();

        while !self.ui.should_quit {
            terminal.draw(|f| self.ui.draw(f))?;

            tokio::select! {
                event = events.next() => match event {
                    Some(Ok(event)) => {
                        if let Some(action) = self.ui.handle_event(event) {
                            self.perform(action);
                        }
                    }
                    Some(Err(e)) => return Err(e.into()),
                    None => break,
                },
                Some(event) = self.events_rx.recv() => self.ui.apply_event(event),
                Ok(()) = containers_rx.changed() => {
                    let snapshot = containers_rx.borrow_and_update().clone();
                    self.ui.apply_event(AppEvent::Containers(snapshot));
                }
                Ok(()) = heads_rx.changed() => {
                    let head = heads_rx.borrow_and_update().value.clone();
                    if let Some(head) = head {
                        self.ui.apply_event(AppEvent::NodeHead(head));
                    }
                }
                _ = tick.tick() => self.ui.state.clear_old_notifications(notification_ttl),
                _ = next_tick(&mut auto_refresh) => {
                    debug!("Auto refresh");
                    self.refresh_containers();
                }
            }
        }

        info!("Quit signal received, exiting event loop");
        Ok(())
    }

    /// Run a UI request in the background; its result comes back on the event channel
    fn perform(&mut self, action: UiAction) {
        match action {
            UiAction::Refresh => self.refresh(),
            UiAction::Dispatch(request) => {
                let Some(dispatch) = self.dispatcher.try_begin(request) else {
                    return;
                };
                let tx = self.events_tx.clone();
                tokio::spawn(async move {
                    let outcome = dispatch.run().await;
                    let _ = tx.send(AppEvent::ActionFinished(outcome));
                });
            }
            UiAction::SaveBaseUrl(url) => {
                let key = self.ui.form_pending_key(FormKind::BaseUrl);
                let Some(token) = self.ui.state.pending.try_acquire(key) else {
                    return;
                };
                let (heads, containers) = (self.heads.clone(), self.containers.clone());
                let node_id = self.node_id.clone();
                let tx = self.events_tx.clone();
                tokio::spawn(async move {
                    let outcome = forms::save_container_base_url(&heads, &node_id, &url).await;
                    if outcome.is_saved() {
                        containers.invalidate(&node_id);
                        if let Err(e) = containers.refresh(&node_id).await {
                            warn!("Container list refresh after base URL change failed: {}", e);
                        }
                    }
                    drop(token);
                    let _ = tx.send(AppEvent::FormFinished {
                        kind: FormKind::BaseUrl,
                        outcome,
                    });
                });
            }
            UiAction::SaveServerUrl(url) => {
                let key = self.ui.form_pending_key(FormKind::ServerUrl);
                let Some(token) = self.ui.state.pending.try_acquire(key) else {
                    return;
                };
                let client = Arc::clone(&self.client);
                let tx = self.events_tx.clone();
                tokio::spawn(async move {
                    let outcome = forms::save_server_url(&client, &url).await;
                    drop(token);
                    if outcome.is_saved() {
                        let _ = tx.send(AppEvent::ServerUrlLoaded(url));
                    }
                    let _ = tx.send(AppEvent::FormFinished {
                        kind: FormKind::ServerUrl,
                        outcome,
                    });
                });
            }
        }
    }

    /// Reload the node head and the container list
    fn refresh(&mut self) {
        self.refresh_containers();

        let heads = self.heads.clone();
        let node_id = self.node_id.clone();
        tokio::spawn(async move {
            if let Err(e) = heads.refresh(&node_id).await {
                warn!("Failed to load node {}: {}", node_id, e);
            }
        });
    }

    fn refresh_containers(&mut self) {
        self.ui.state.loading = true;
        let containers = self.containers.clone();
        let node_id = self.node_id.clone();
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = containers.refresh(&node_id).await {
                let _ = tx.send(AppEvent::RefreshFailed(e.user_message()));
            }
        });
    }

    fn load_server_url(&self) {
        let client = Arc::clone(&self.client);
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            match client.get_setting(SERVER_URL_SETTING).await {
                Ok(setting) if !setting.value.is_empty() => {
                    let _ = tx.send(AppEvent::ServerUrlLoaded(setting.value));
                }
                Ok(_) => {}
                Err(e) => debug!("Could not load {} setting: {}", SERVER_URL_SETTING, e),
            }
        });
    }
}

/// Wait for the next tick, or forever when the interval is disabled
async fn next_tick(interval: &mut Option<Interval>) {
    match interval {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending().await,
    }
}

/// Setup the terminal for TUI
fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    info!("Setting up terminal");

    terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    crossterm::execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;

    info!("Terminal setup complete");
    Ok(terminal)
}

/// Restore terminal to original state
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    info!("Restoring terminal");

    terminal::disable_raw_mode()?;
    crossterm::execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    info!("Terminal restored");
    Ok(())
}
