//! UI Application logic
//!
//! `UiApp` turns key presses into [`UiAction`]s for the coordinator and applies
//! the [`AppEvent`]s that background work sends back. It never performs IO.

use std::sync::Arc;

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, TableState, Wrap};
use ratatui::Frame;
use tracing::{debug, info};

use crate::console::sync::Snapshot;
use crate::console::{
    ActionRequest, ContainerAction, DispatchContext, FollowUp, FormOutcome, Outcome, PendingKey,
};
use crate::core::{ConfirmDialog, ContainerList, InputDialog, NodeHead, NotificationLevel};
use crate::state::{AppState, Modal, View};
use crate::ui::components::dialogs::{render_confirm, render_help, render_input};
use crate::ui::components::{ContainerDetailPanel, ContainerListWidget, EMPTY_LIST_TEXT};
use crate::validation;

/// Work the coordinator performs on behalf of the UI
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiAction {
    Dispatch(ActionRequest),
    SaveBaseUrl(String),
    SaveServerUrl(String),
    Refresh,
}

/// Which dialog a form result belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKind {
    BaseUrl,
    ServerUrl,
}

/// Results of background work, applied on the UI loop
#[derive(Debug, Clone)]
pub enum AppEvent {
    Containers(Snapshot<ContainerList>),
    NodeHead(Arc<NodeHead>),
    RefreshFailed(String),
    ActionFinished(Outcome),
    FormFinished { kind: FormKind, outcome: FormOutcome },
    ServerUrlLoaded(String),
}

/// UI Application controller
pub struct UiApp {
    pub state: AppState,
    pub should_quit: bool,
    /// Current `SERVER_URL` setting, or the console address until it is loaded
    pub server_url: Option<String>,
}

impl UiApp {
    pub fn new(state: AppState) -> Self {
        Self {
            state,
            should_quit: false,
            server_url: None,
        }
    }

    pub fn with_server_url(mut self, url: Option<String>) -> Self {
        self.server_url = url;
        self
    }

    /// Handle a terminal event
    pub fn handle_event(&mut self, event: Event) -> Option<UiAction> {
        match event {
            Event::Key(key_event) => self.handle_key_event(key_event),
            Event::Resize(width, height) => {
                debug!("Terminal resized to {}x{}", width, height);
                self.state.terminal_size = (width, height);
                None
            }
            _ => None,
        }
    }

    /// Handle keyboard events
    pub fn handle_key_event(&mut self, key: KeyEvent) -> Option<UiAction> {
        if key.kind != KeyEventKind::Press {
            return None;
        }

        if key.code == KeyCode::Char('c') && key.modifiers == KeyModifiers::CONTROL {
            info!("Ctrl+C pressed");
            self.should_quit = true;
            return None;
        }

        if self.state.has_modal() {
            return self.handle_modal_key(key);
        }

        match key.code {
            KeyCode::Char('q') if key.modifiers.is_empty() => {
                info!("Quit key pressed");
                self.should_quit = true;
                None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if !self.state.is_detail() {
                    self.state.next_container();
                }
                None
            }
            KeyCode::Up | KeyCode::Char('k') => {
                if !self.state.is_detail() {
                    self.state.previous_container();
                }
                None
            }
            KeyCode::Enter => {
                self.state.open_detail();
                None
            }
            KeyCode::Esc => {
                self.state.leave_detail();
                None
            }
            KeyCode::F(5) | KeyCode::Char('R') => Some(UiAction::Refresh),
            KeyCode::Char('?') => {
                self.state.modal = Some(Modal::Help);
                None
            }
            KeyCode::Char('b') => {
                self.open_base_url_dialog();
                None
            }
            KeyCode::Char('u') => {
                self.open_server_url_dialog();
                None
            }
            KeyCode::Char(c) => {
                let action = ContainerAction::ALL
                    .into_iter()
                    .find(|action| action.shortcut() == c)?;
                self.request_action(action)
            }
            _ => {
                debug!("Unhandled key: {:?}", key);
                None
            }
        }
    }

    fn dispatch_context(&self) -> DispatchContext {
        if self.state.is_detail() {
            DispatchContext::Detail
        } else {
            DispatchContext::List
        }
    }

    /// Start `action` on the current target if its panel allows it right now
    fn request_action(&mut self, action: ContainerAction) -> Option<UiAction> {
        let container = self.state.target()?;
        let allowed = self.state.action_panel(container).allows(action);
        let (container_id, name) = (container.id.clone(), container.name.clone());
        if !allowed {
            debug!("{} not available for container {}", action, container_id);
            return None;
        }

        if action == ContainerAction::Delete {
            let dialog = ConfirmDialog::new(
                "Delete container",
                format!("Are you sure you want to delete container {}?", name),
            )
            .with_labels("Delete", "Cancel");
            self.state.modal = Some(Modal::ConfirmDelete {
                container_id,
                dialog,
            });
            return None;
        }

        Some(UiAction::Dispatch(ActionRequest::new(
            self.state.node_id.clone(),
            container_id,
            action,
            self.dispatch_context(),
        )))
    }

    fn open_base_url_dialog(&mut self) {
        let current = self.state.base_url_override().unwrap_or_default().to_string();
        let dialog = InputDialog::new("Container Base URL", current)
            .with_help("Used for ports bound to all interfaces. Leave empty to use the console host.");
        self.state.modal = Some(Modal::BaseUrl(dialog));
    }

    fn open_server_url_dialog(&mut self) {
        let current = self.server_url.clone().unwrap_or_default();
        let dialog = InputDialog::new("Server URL", current)
            .with_help("Address agents use to reach this console.");
        self.state.modal = Some(Modal::ServerUrl(dialog));
    }

    /// In-flight key guarding a dialog's submission
    pub fn form_pending_key(&self, kind: FormKind) -> PendingKey {
        match kind {
            FormKind::BaseUrl => PendingKey::NodeBaseUrl(self.state.node_id.clone()),
            FormKind::ServerUrl => PendingKey::ServerUrl,
        }
    }

    /// Whether the open input dialog has a submission in flight
    pub fn is_saving(&self) -> bool {
        match self.modal_kind() {
            Some(kind) => self.state.pending.contains(&self.form_pending_key(kind)),
            None => false,
        }
    }

    fn handle_modal_key(&mut self, key: KeyEvent) -> Option<UiAction> {
        let saving = self.is_saving();
        let context = self.dispatch_context();
        let node_id = self.state.node_id.clone();

        match self.state.modal.as_mut()? {
            Modal::Help => {
                self.state.close_modal();
                None
            }
            Modal::ConfirmDelete { container_id, .. } => match key.code {
                KeyCode::Char('y') | KeyCode::Enter => {
                    let request =
                        ActionRequest::new(node_id, container_id.clone(), ContainerAction::Delete, context);
                    self.state.close_modal();
                    Some(UiAction::Dispatch(request))
                }
                KeyCode::Char('n') | KeyCode::Esc => {
                    self.state.close_modal();
                    None
                }
                _ => None,
            },
            Modal::BaseUrl(dialog) | Modal::ServerUrl(dialog) => {
                if saving {
                    return None;
                }
                match key.code {
                    KeyCode::Esc => {
                        self.state.close_modal();
                        None
                    }
                    KeyCode::Backspace => {
                        dialog.value.pop();
                        dialog.error = None;
                        None
                    }
                    KeyCode::Char(c) => {
                        dialog.value.push(c);
                        dialog.error = None;
                        None
                    }
                    KeyCode::Enter => self.submit_input(),
                    _ => None,
                }
            }
        }
    }

    /// Validate the open input dialog; invalid input stays in the dialog
    fn submit_input(&mut self) -> Option<UiAction> {
        let (result, kind) = match &self.state.modal {
            Some(Modal::BaseUrl(dialog)) => (
                validation::container_base_url(&dialog.value),
                FormKind::BaseUrl,
            ),
            Some(Modal::ServerUrl(dialog)) => {
                (validation::server_url(&dialog.value), FormKind::ServerUrl)
            }
            _ => return None,
        };

        match result {
            Ok(value) => Some(match kind {
                FormKind::BaseUrl => UiAction::SaveBaseUrl(value),
                FormKind::ServerUrl => UiAction::SaveServerUrl(value),
            }),
            Err(e) => {
                if let Some(Modal::BaseUrl(dialog) | Modal::ServerUrl(dialog)) = self.state.modal.as_mut() {
                    dialog.error = Some(e.message().to_string());
                }
                None
            }
        }
    }

    /// Apply the result of background work
    pub fn apply_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Containers(snapshot) => {
                if let Some(list) = snapshot.value {
                    self.state.update_containers(list);
                }
                self.state.list_error = snapshot.last_error;
                self.state.loading = false;
            }
            AppEvent::NodeHead(head) => self.state.update_node_head(head),
            AppEvent::RefreshFailed(message) => {
                self.state.loading = false;
                self.state.add_notification(message, NotificationLevel::Error);
            }
            AppEvent::ActionFinished(outcome) => self.apply_outcome(outcome),
            AppEvent::FormFinished { kind, outcome } => self.apply_form_outcome(kind, outcome),
            AppEvent::ServerUrlLoaded(url) => self.server_url = Some(url),
        }
    }

    fn apply_outcome(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Success {
                request,
                message,
                follow_up,
                resync_error,
            } => {
                self.state.add_notification(message, NotificationLevel::Success);
                if let Some(error) = resync_error {
                    self.state.add_notification(error, NotificationLevel::Warning);
                }
                if follow_up == FollowUp::LeaveDetail
                    && self.state.view == View::Detail(request.container_id)
                {
                    self.state.leave_detail();
                }
            }
            Outcome::Failure { message, .. } => {
                self.state.add_notification(message, NotificationLevel::Error);
            }
        }
    }

    fn modal_kind(&self) -> Option<FormKind> {
        match &self.state.modal {
            Some(Modal::BaseUrl(_)) => Some(FormKind::BaseUrl),
            Some(Modal::ServerUrl(_)) => Some(FormKind::ServerUrl),
            _ => None,
        }
    }

    fn apply_form_outcome(&mut self, kind: FormKind, outcome: FormOutcome) {
        let open = self.modal_kind() == Some(kind);
        match outcome {
            FormOutcome::Saved { message } => {
                if open {
                    self.state.close_modal();
                }
                self.state.add_notification(message, NotificationLevel::Success);
            }
            FormOutcome::Invalid { message } => {
                if open {
                    if let Some(Modal::BaseUrl(dialog) | Modal::ServerUrl(dialog)) =
                        self.state.modal.as_mut()
                    {
                        dialog.error = Some(message);
                        return;
                    }
                }
                self.state.add_notification(message, NotificationLevel::Warning);
            }
            FormOutcome::Failed { message } => {
                if open {
                    self.state.close_modal();
                }
                self.state.add_notification(message, NotificationLevel::Error);
            }
            FormOutcome::Busy { message } => {
                self.state.add_notification(message, NotificationLevel::Warning);
            }
        }
    }

    /// Render the UI
    pub fn draw(&self, frame: &mut Frame) {
        let area = frame.area();

        let main_layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // Header
                Constraint::Min(3),    // Main content
                Constraint::Length(1), // Footer
            ])
            .split(area);

        self.render_header(frame, main_layout[0]);
        match &self.state.view {
            View::List => self.render_list(frame, main_layout[1]),
            View::Detail(id) => self.render_detail(frame, main_layout[1], id),
        }
        self.render_footer(frame, main_layout[2]);

        match &self.state.modal {
            Some(Modal::Help) => render_help(frame, area),
            Some(Modal::ConfirmDelete { dialog, .. }) => render_confirm(frame, area, dialog),
            Some(Modal::BaseUrl(dialog)) | Some(Modal::ServerUrl(dialog)) => {
                render_input(frame, area, dialog, self.is_saving())
            }
            None => {}
        }
    }

    fn render_header(&self, frame: &mut Frame, area: Rect) {
        let node = match &self.state.node_head {
            Some(head) => format!("{} ({})", head.name, self.state.node_id),
            None => self.state.node_id.clone(),
        };
        let base = match self.state.base_url_override() {
            Some(url) => url.to_string(),
            None => self.state.origin.prefix(),
        };

        let header = Line::from(vec![
            Span::styled(
                " portside ",
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("v{} ", env!("CARGO_PKG_VERSION")),
                Style::default().fg(Color::Gray),
            ),
            Span::raw("| Node: "),
            Span::styled(node, Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
            Span::raw(" | Ports via: "),
            Span::styled(base, Style::default().fg(Color::Gray)),
        ]);
        frame.render_widget(
            Paragraph::new(header).style(Style::default().bg(Color::Black)),
            area,
        );
    }

    fn render_list(&self, frame: &mut Frame, area: Rect) {
        if self.state.containers.is_none() {
            let text = match &self.state.list_error {
                Some(error) => format!("Could not load containers: {}", error),
                None => "Loading containers...".to_string(),
            };
            let paragraph = Paragraph::new(text)
                .block(Block::default().title(" Containers ").borders(Borders::ALL))
                .wrap(Wrap { trim: true });
            frame.render_widget(paragraph, area);
            return;
        }

        let widget = ContainerListWidget::from_state(&self.state);
        if widget.is_empty() {
            let paragraph = Paragraph::new(EMPTY_LIST_TEXT)
                .block(Block::default().title(" Containers (0) ").borders(Borders::ALL));
            frame.render_widget(paragraph, area);
            return;
        }

        let mut table_state = TableState::default();
        table_state.select(Some(self.state.container_list_selected));
        frame.render_stateful_widget(widget.build_table(), area, &mut table_state);
    }

    fn render_detail(&self, frame: &mut Frame, area: Rect, container_id: &str) {
        match self.state.target() {
            Some(container) => {
                let ports = self.state.port_links(container);
                let panel = self.state.action_panel(container);
                frame.render_widget(ContainerDetailPanel::draw(container, &ports, &panel), area);
            }
            None => frame.render_widget(ContainerDetailPanel::missing(container_id), area),
        }
    }

    fn render_footer(&self, frame: &mut Frame, area: Rect) {
        let footer = match self.state.latest_notification() {
            Some(notification) => {
                let color = match notification.level {
                    NotificationLevel::Success => Color::Green,
                    NotificationLevel::Warning => Color::Yellow,
                    NotificationLevel::Error => Color::Red,
                    NotificationLevel::Info => Color::Gray,
                };
                Paragraph::new(format!(" {} ", notification.message))
                    .style(Style::default().fg(color).bg(Color::Black))
            }
            None => {
                let help_text = if self.state.is_detail() {
                    " [Esc]:Back | [s/x/r/d]:Actions | [b]:Base URL | [?]:Help | [q]:Quit "
                } else {
                    " [↑/↓]:Select | [Enter]:Details | [s/x/r/d]:Actions | [F5]:Refresh | [?]:Help | [q]:Quit "
                };
                Paragraph::new(help_text).style(Style::default().fg(Color::Gray).bg(Color::Black))
            }
        };
        frame.render_widget(footer, area);
    }
}
