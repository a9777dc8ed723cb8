//! Console server HTTP API

use async_trait::async_trait;

use crate::console::ContainerAction;
use crate::core::{ApiError, ContainerList, NodeHead};

pub mod client;
pub mod compose;
pub mod containers;
pub mod environments;
pub mod images;
pub mod nodes;
pub mod settings;

pub use client::ApiClient;

pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Node-scoped operations the console core depends on
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NodeApi: Send + Sync {
    /// Current containers on a node
    async fn list_containers(&self, node_id: &str) -> ApiResult<ContainerList>;

    /// Issue one lifecycle command for a container
    async fn container_action(
        &self,
        node_id: &str,
        container_id: &str,
        action: ContainerAction,
    ) -> ApiResult<()>;

    /// Node name and container base URL override
    async fn node_head(&self, node_id: &str) -> ApiResult<NodeHead>;

    /// Replace the node's container base URL; an empty string clears it
    async fn update_container_base_url(&self, node_id: &str, url: &str) -> ApiResult<()>;
}
