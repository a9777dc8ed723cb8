//! Application state management

use std::sync::Arc;

use chrono::Utc;

use crate::console::{port_links, ActionPanel, ConsoleOrigin, PendingKey, PendingSet, PortLink};
use crate::core::{
    Container, ContainerId, ContainerList, ConfirmDialog, InputDialog, NodeHead, NodeId,
    NotificationLevel, OperationId,
};

/// Notifications kept at most
const MAX_NOTIFICATIONS: usize = 10;

/// Main application state
#[derive(Debug, Clone)]
pub struct AppState {
    // Node
    pub node_id: NodeId,
    pub node_head: Option<Arc<NodeHead>>,
    pub origin: ConsoleOrigin,

    // Containers, as last fetched
    pub containers: Option<Arc<ContainerList>>,
    pub list_error: Option<String>,
    pub selected_container: Option<ContainerId>,
    pub container_list_selected: usize,

    // UI state
    pub view: View,
    pub modal: Option<Modal>,
    pub notifications: Vec<Notification>,
    pub terminal_size: (u16, u16),

    // Async operations tracking
    pub pending: PendingSet<PendingKey>,
    pub loading: bool,
}

/// Main area contents
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    List,
    Detail(ContainerId),
}

/// Overlay drawn above the main area; it takes all key input while open
#[derive(Debug, Clone)]
pub enum Modal {
    ConfirmDelete {
        container_id: ContainerId,
        dialog: ConfirmDialog,
    },
    BaseUrl(InputDialog),
    ServerUrl(InputDialog),
    Help,
}

/// Notification message
#[derive(Debug, Clone)]
pub struct Notification {
    pub id: OperationId,
    pub message: String,
    pub level: NotificationLevel,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl AppState {
    pub fn new(node_id: impl Into<NodeId>, origin: ConsoleOrigin, pending: PendingSet<PendingKey>) -> Self {
        Self {
            node_id: node_id.into(),
            node_head: None,
            origin,
            containers: None,
            list_error: None,
            selected_container: None,
            container_list_selected: 0,
            view: View::List,
            modal: None,
            notifications: vec![],
            terminal_size: (80, 24),
            pending,
            loading: false,
        }
    }

    /// Add a notification
    pub fn add_notification(&mut self, message: impl Into<String>, level: NotificationLevel) {
        let notification = Notification {
            id: crate::core::new_operation_id(),
            message: message.into(),
            level,
            timestamp: Utc::now(),
        };
        self.notifications.push(notification);

        if self.notifications.len() > MAX_NOTIFICATIONS {
            self.notifications.remove(0);
        }
    }

    /// Clear old notifications (older than threshold)
    pub fn clear_old_notifications(&mut self, max_age_seconds: i64) {
        let cutoff = chrono::Duration::try_seconds(max_age_seconds)
            .and_then(|max_age| Utc::now().checked_sub_signed(max_age));
        // Out of range means nothing can be that old
        if let Some(cutoff) = cutoff {
            self.notifications.retain(|n| n.timestamp > cutoff);
        }
    }

    pub fn latest_notification(&self) -> Option<&Notification> {
        self.notifications.last()
    }

    fn items(&self) -> &[Container] {
        self.containers
            .as_deref()
            .map(|list| list.items.as_slice())
            .unwrap_or(&[])
    }

    /// Replace the container list; the selection follows the selected container's id
    pub fn update_containers(&mut self, containers: Arc<ContainerList>) {
        self.containers = Some(containers);
        self.list_error = None;

        let position = self
            .selected_container
            .as_deref()
            .and_then(|id| self.items().iter().position(|c| c.id == id));

        let len = self.items().len();
        if len == 0 {
            self.container_list_selected = 0;
            self.selected_container = None;
            return;
        }

        self.container_list_selected = match position {
            Some(index) => index,
            None => self.container_list_selected.min(len - 1),
        };
        self.selected_container = Some(self.items()[self.container_list_selected].id.clone());
    }

    /// Navigate to next container in list
    pub fn next_container(&mut self) {
        let len = self.items().len();
        if len == 0 {
            return;
        }
        self.container_list_selected = (self.container_list_selected + 1) % len;
        self.selected_container = Some(self.items()[self.container_list_selected].id.clone());
    }

    /// Navigate to previous container in list
    pub fn previous_container(&mut self) {
        let len = self.items().len();
        if len == 0 {
            return;
        }
        if self.container_list_selected == 0 {
            self.container_list_selected = len - 1;
        } else {
            self.container_list_selected -= 1;
        }
        self.selected_container = Some(self.items()[self.container_list_selected].id.clone());
    }

    pub fn selected(&self) -> Option<&Container> {
        let id = self.selected_container.as_deref()?;
        self.items().iter().find(|c| c.id == id)
    }

    /// Container the current view acts on: the inspected one, else the selected row
    pub fn target(&self) -> Option<&Container> {
        match &self.view {
            View::Detail(id) => self.items().iter().find(|c| &c.id == id),
            View::List => self.selected(),
        }
    }

    pub fn open_detail(&mut self) {
        if let Some(id) = self.selected_container.clone() {
            self.view = View::Detail(id);
        }
    }

    pub fn leave_detail(&mut self) {
        self.view = View::List;
    }

    pub fn is_detail(&self) -> bool {
        matches!(self.view, View::Detail(_))
    }

    pub fn update_node_head(&mut self, head: Arc<NodeHead>) {
        self.node_head = Some(head);
    }

    pub fn base_url_override(&self) -> Option<&str> {
        self.node_head.as_deref().and_then(NodeHead::base_url_override)
    }

    pub fn action_panel(&self, container: &Container) -> ActionPanel {
        ActionPanel::for_container(&self.node_id, container, &self.pending)
    }

    pub fn port_links(&self, container: &Container) -> Vec<PortLink> {
        port_links(&container.ports, self.node_head.as_deref(), &self.origin)
    }

    pub fn close_modal(&mut self) {
        self.modal = None;
    }

    pub fn has_modal(&self) -> bool {
        self.modal.is_some()
    }
}
