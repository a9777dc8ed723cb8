//! Container action dispatch
//!
//! One request per dispatch, no retries. A successful action is followed by a
//! refresh of the node's container list, which is the only way the new state
//! becomes visible.

use std::sync::Arc;

use tracing::{info, warn};

use crate::api::NodeApi;
use crate::console::actions::ContainerAction;
use crate::console::pending::{PendingKey, PendingSet, PendingToken};
use crate::console::sync::ContainerListSync;
use crate::core::{ContainerId, NodeId};

/// Where the action was triggered from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchContext {
    /// A row of the container list
    List,
    /// The detail view of a single container
    Detail,
}

/// What the UI does after a successful action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowUp {
    /// Stay where we are; the refreshed list is already in place
    Resync,
    /// The inspected container is gone, go back to the list
    LeaveDetail,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionRequest {
    pub node_id: NodeId,
    pub container_id: ContainerId,
    pub action: ContainerAction,
    pub context: DispatchContext,
}

impl ActionRequest {
    pub fn new(
        node_id: impl Into<NodeId>,
        container_id: impl Into<ContainerId>,
        action: ContainerAction,
        context: DispatchContext,
    ) -> Self {
        Self {
            node_id: node_id.into(),
            container_id: container_id.into(),
            action,
            context,
        }
    }

    pub fn pending_key(&self) -> PendingKey {
        PendingKey::container(&self.node_id, &self.container_id)
    }
}

/// Result of one dispatch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success {
        request: ActionRequest,
        message: String,
        follow_up: FollowUp,
        /// Set when the action went through but the list could not be reloaded
        resync_error: Option<String>,
    },
    Failure {
        request: ActionRequest,
        message: String,
    },
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success { .. })
    }

    pub fn message(&self) -> &str {
        match self {
            Outcome::Success { message, .. } | Outcome::Failure { message, .. } => message,
        }
    }

    pub fn request(&self) -> &ActionRequest {
        match self {
            Outcome::Success { request, .. } | Outcome::Failure { request, .. } => request,
        }
    }

    pub fn follow_up(&self) -> Option<FollowUp> {
        match self {
            Outcome::Success { follow_up, .. } => Some(*follow_up),
            Outcome::Failure { .. } => None,
        }
    }
}

/// Issues lifecycle commands against the node-scoped endpoints
#[derive(Clone)]
pub struct ActionDispatcher {
    api: Arc<dyn NodeApi>,
    containers: ContainerListSync,
    pending: PendingSet<PendingKey>,
}

impl ActionDispatcher {
    pub fn new(
        api: Arc<dyn NodeApi>,
        containers: ContainerListSync,
        pending: PendingSet<PendingKey>,
    ) -> Self {
        Self {
            api,
            containers,
            pending,
        }
    }

    pub fn pending(&self) -> &PendingSet<PendingKey> {
        &self.pending
    }

    /// Issue one action without consulting the pending set
    pub async fn dispatch(
        &self,
        node_id: &str,
        container_id: &str,
        action: ContainerAction,
        context: DispatchContext,
    ) -> Outcome {
        self.run(ActionRequest::new(node_id, container_id, action, context))
            .await
    }

    /// Claim the container for `request`; `None` while another action on it is in flight
    pub fn try_begin(&self, request: ActionRequest) -> Option<PendingDispatch> {
        let token = self.pending.try_acquire(request.pending_key())?;
        Some(PendingDispatch {
            dispatcher: self.clone(),
            request,
            token,
        })
    }

    async fn run(&self, request: ActionRequest) -> Outcome {
        info!(
            "Dispatching {} for container {} on node {}",
            request.action, request.container_id, request.node_id
        );

        let result = self
            .api
            .container_action(&request.node_id, &request.container_id, request.action)
            .await;

        match result {
            Ok(()) => {
                let resync_error = match self.containers.refresh(&request.node_id).await {
                    Ok(_) => None,
                    Err(e) => {
                        warn!("Container list refresh after {} failed: {}", request.action, e);
                        Some(e.user_message())
                    }
                };
                let follow_up = match (request.action, request.context) {
                    (ContainerAction::Delete, DispatchContext::Detail) => FollowUp::LeaveDetail,
                    _ => FollowUp::Resync,
                };
                Outcome::Success {
                    message: request.action.success_message().to_string(),
                    request,
                    follow_up,
                    resync_error,
                }
            }
            Err(e) => {
                warn!(
                    "{} of container {} failed: {}",
                    request.action, request.container_id, e
                );
                Outcome::Failure {
                    message: e.user_message(),
                    request,
                }
            }
        }
    }
}

/// A claimed action; the container stays pending until `run` completes
pub struct PendingDispatch {
    dispatcher: ActionDispatcher,
    request: ActionRequest,
    token: PendingToken<PendingKey>,
}

impl PendingDispatch {
    pub fn request(&self) -> &ActionRequest {
        &self.request
    }

    pub async fn run(self) -> Outcome {
        let PendingDispatch {
            dispatcher,
            request,
            token,
        } = self;
        let outcome = dispatcher.run(request).await;
        drop(token);
        outcome
    }
}
