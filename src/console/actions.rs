//! Container lifecycle actions and which of them a container offers
//!
//! Availability depends only on the state the server last reported. Nothing
//! here predicts the state an action will lead to; the next list refresh is
//! what makes a transition visible.

use serde::{Deserialize, Serialize};

use crate::console::pending::{PendingKey, PendingSet};
use crate::core::{Container, ContainerState};

/// User-initiated lifecycle command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerAction {
    Start,
    Stop,
    Restart,
    Delete,
}

impl ContainerAction {
    /// Display order in an action panel
    pub const ALL: [ContainerAction; 4] = [
        ContainerAction::Restart,
        ContainerAction::Start,
        ContainerAction::Stop,
        ContainerAction::Delete,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ContainerAction::Start => "Start",
            ContainerAction::Stop => "Stop",
            ContainerAction::Restart => "Restart",
            ContainerAction::Delete => "Delete",
        }
    }

    /// Key bound to the action in the console
    pub fn shortcut(&self) -> char {
        match self {
            ContainerAction::Start => 's',
            ContainerAction::Stop => 'x',
            ContainerAction::Restart => 'r',
            ContainerAction::Delete => 'd',
        }
    }

    /// Notification text after the server accepted the action
    pub fn success_message(&self) -> &'static str {
        match self {
            ContainerAction::Start => "Container started.",
            ContainerAction::Stop => "Container stopped.",
            ContainerAction::Restart => "Container restarted.",
            ContainerAction::Delete => "Container deleted.",
        }
    }

    /// Whether the action is offered for a container in `state`
    pub fn is_available(&self, state: &ContainerState) -> bool {
        match self {
            ContainerAction::Restart => *state == ContainerState::Running,
            ContainerAction::Start => *state == ContainerState::Exited,
            ContainerAction::Stop => *state != ContainerState::Exited,
            ContainerAction::Delete => true,
        }
    }
}

impl std::fmt::Display for ContainerAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Actions offered for `state`, in display order
pub fn available_actions(state: &ContainerState) -> Vec<ContainerAction> {
    ContainerAction::ALL
        .into_iter()
        .filter(|action| action.is_available(state))
        .collect()
}

/// One button of an action panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Affordance {
    pub action: ContainerAction,
    /// False while an action on the same container is in flight
    pub enabled: bool,
}

/// Per-row action panel derived from the server-reported state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionPanel {
    pub affordances: Vec<Affordance>,
}

impl ActionPanel {
    pub fn for_container(node_id: &str, container: &Container, pending: &PendingSet<PendingKey>) -> Self {
        let busy = pending.contains(&PendingKey::container(node_id, &container.id));
        Self::for_state(&container.state, busy)
    }

    pub fn for_state(state: &ContainerState, busy: bool) -> Self {
        let affordances = available_actions(state)
            .into_iter()
            .map(|action| Affordance {
                action,
                enabled: !busy,
            })
            .collect();
        Self { affordances }
    }

    /// Whether `action` can be triggered right now
    pub fn allows(&self, action: ContainerAction) -> bool {
        self.affordances
            .iter()
            .any(|a| a.action == action && a.enabled)
    }

    pub fn offers(&self, action: ContainerAction) -> bool {
        self.affordances.iter().any(|a| a.action == action)
    }
}
