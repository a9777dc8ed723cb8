//! Compose library operations

use reqwest::Method;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::api::{ApiClient, ApiResult};
use crate::core::{ComposeLibraryList, ComposeProject};

/// Body of `PUT /composelibrary/{name}`; renaming is done by sending a new name
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ComposeProjectUpdate {
    pub new_project_name: String,
    pub definition: String,
}

impl ApiClient {
    pub async fn list_compose_projects(&self) -> ApiResult<ComposeLibraryList> {
        debug!("Listing compose library");
        let url = self.endpoint(&["composelibrary"])?;
        self.get_json(url).await
    }

    pub async fn get_compose_project(&self, name: &str) -> ApiResult<ComposeProject> {
        debug!("Fetching compose project {}", name);
        let url = self.endpoint(&["composelibrary", name])?;
        self.get_json(url).await
    }

    /// Save a definition under `name`, optionally renaming the project
    pub async fn update_compose_project(
        &self,
        name: &str,
        update: &ComposeProjectUpdate,
    ) -> ApiResult<()> {
        info!(
            "Saving compose project {} as {}",
            name, update.new_project_name
        );
        let url = self.endpoint(&["composelibrary", name])?;
        self.execute(Method::PUT, url, Some(update)).await
    }

    pub async fn delete_compose_project(&self, name: &str) -> ApiResult<()> {
        warn!("Deleting compose project {}", name);
        let url = self.endpoint(&["composelibrary", name])?;
        self.execute(Method::DELETE, url, None::<&()>).await
    }
}
