//! Image operations

use reqwest::Method;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::api::{ApiClient, ApiResult};
use crate::core::{ImageList, ImagePruneReport};

#[derive(Debug, Serialize)]
struct PruneRequest {
    /// Prune every unused image, not only dangling ones
    all: bool,
}

impl ApiClient {
    /// List images on a node; `all` includes intermediate layers
    pub async fn list_images(&self, node_id: &str, all: bool) -> ApiResult<ImageList> {
        debug!("Listing images on node {} (all={})", node_id, all);

        let mut url = self.endpoint(&["nodes", node_id, "images"])?;
        url.query_pairs_mut().append_pair("all", &all.to_string());
        let list: ImageList = self.get_json(url).await?;

        info!("Found {} images on node {}", list.items.len(), node_id);
        Ok(list)
    }

    /// Remove an image
    pub async fn remove_image(&self, node_id: &str, id: &str, force: bool) -> ApiResult<()> {
        warn!("Removing image: {} on node {} (force={})", id, node_id, force);

        let mut url = self.endpoint(&["nodes", node_id, "images", id])?;
        url.query_pairs_mut().append_pair("force", &force.to_string());
        self.execute(Method::DELETE, url, None::<&()>).await?;

        info!("Image {} removed successfully", id);
        Ok(())
    }

    /// Prune dangling images, or every unused image when `all` is set
    pub async fn prune_images(&self, node_id: &str, all: bool) -> ApiResult<ImagePruneReport> {
        info!("Pruning images on node {} (all={})", node_id, all);

        let url = self.endpoint(&["nodes", node_id, "images", "prune"])?;
        let report: ImagePruneReport = self
            .execute_json(Method::POST, url, Some(&PruneRequest { all }))
            .await?;

        info!(
            "Pruned {} images on node {}, reclaimed {} bytes",
            report.images_deleted.len(),
            node_id,
            report.space_reclaimed
        );
        Ok(report)
    }
}
