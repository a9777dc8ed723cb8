//! Container operations

use reqwest::Method;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::api::{ApiClient, ApiResult};
use crate::console::ContainerAction;
use crate::core::ContainerList;

/// Body of the start/stop/restart endpoints
#[derive(Debug, Serialize)]
struct ContainerRef<'a> {
    id: &'a str,
}

impl ApiClient {
    /// List containers on a node
    pub async fn list_containers(&self, node_id: &str) -> ApiResult<ContainerList> {
        debug!("Listing containers on node {}", node_id);

        let url = self.endpoint(&["nodes", node_id, "containers"])?;
        let list: ContainerList = self.get_json(url).await?;

        info!("Found {} containers on node {}", list.items.len(), node_id);
        Ok(list)
    }

    /// Start a container
    pub async fn start_container(&self, node_id: &str, id: &str) -> ApiResult<()> {
        info!("Starting container: {} on node {}", id, node_id);
        self.post_container_command(node_id, "start", id).await?;
        info!("Container {} started successfully", id);
        Ok(())
    }

    /// Stop a container
    pub async fn stop_container(&self, node_id: &str, id: &str) -> ApiResult<()> {
        info!("Stopping container: {} on node {}", id, node_id);
        self.post_container_command(node_id, "stop", id).await?;
        info!("Container {} stopped successfully", id);
        Ok(())
    }

    /// Restart a container
    pub async fn restart_container(&self, node_id: &str, id: &str) -> ApiResult<()> {
        info!("Restarting container: {} on node {}", id, node_id);
        self.post_container_command(node_id, "restart", id).await?;
        info!("Container {} restarted successfully", id);
        Ok(())
    }

    /// Remove a container
    pub async fn remove_container(&self, node_id: &str, id: &str) -> ApiResult<()> {
        warn!("Removing container: {} on node {}", id, node_id);

        let url = self.endpoint(&["nodes", node_id, "containers", id])?;
        self.execute(Method::DELETE, url, None::<&()>).await?;

        info!("Container {} removed successfully", id);
        Ok(())
    }

    /// Route a lifecycle action to its endpoint
    pub async fn run_container_action(
        &self,
        node_id: &str,
        id: &str,
        action: ContainerAction,
    ) -> ApiResult<()> {
        match action {
            ContainerAction::Start => self.start_container(node_id, id).await,
            ContainerAction::Stop => self.stop_container(node_id, id).await,
            ContainerAction::Restart => self.restart_container(node_id, id).await,
            ContainerAction::Delete => self.remove_container(node_id, id).await,
        }
    }

    async fn post_container_command(&self, node_id: &str, command: &str, id: &str) -> ApiResult<()> {
        let url = self.endpoint(&["nodes", node_id, "containers", command])?;
        self.execute(Method::POST, url, Some(&ContainerRef { id })).await
    }
}
