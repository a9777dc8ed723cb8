//! Node registry operations

use async_trait::async_trait;
use reqwest::Method;
use serde::Serialize;
use tracing::{debug, info};

use crate::api::{ApiClient, ApiResult, NodeApi};
use crate::console::ContainerAction;
use crate::core::{ContainerList, NodeHead, NodeList};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ContainerBaseUrlPatch<'a> {
    container_base_url: &'a str,
}

impl ApiClient {
    /// List registered nodes
    pub async fn list_nodes(&self) -> ApiResult<NodeList> {
        debug!("Listing nodes");
        let url = self.endpoint(&["nodes"])?;
        self.get_json(url).await
    }

    /// Fetch the node head (name and container base URL)
    pub async fn get_node_head(&self, node_id: &str) -> ApiResult<NodeHead> {
        debug!("Fetching head of node {}", node_id);
        let url = self.endpoint(&["nodes", node_id, "head"])?;
        self.get_json(url).await
    }

    /// Set or clear the container base URL override of a node
    pub async fn set_container_base_url(&self, node_id: &str, url: &str) -> ApiResult<()> {
        info!("Setting container base URL of node {} to {:?}", node_id, url);
        let endpoint = self.endpoint(&["nodes", node_id])?;
        self.execute(
            Method::PATCH,
            endpoint,
            Some(&ContainerBaseUrlPatch {
                container_base_url: url,
            }),
        )
        .await
    }
}

#[async_trait]
impl NodeApi for ApiClient {
    async fn list_containers(&self, node_id: &str) -> ApiResult<ContainerList> {
        ApiClient::list_containers(self, node_id).await
    }

    async fn container_action(
        &self,
        node_id: &str,
        container_id: &str,
        action: ContainerAction,
    ) -> ApiResult<()> {
        self.run_container_action(node_id, container_id, action).await
    }

    async fn node_head(&self, node_id: &str) -> ApiResult<NodeHead> {
        self.get_node_head(node_id).await
    }

    async fn update_container_base_url(&self, node_id: &str, url: &str) -> ApiResult<()> {
        self.set_container_base_url(node_id, url).await
    }
}
