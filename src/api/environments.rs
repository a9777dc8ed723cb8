//! Environment registry operations

use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::{ApiClient, ApiResult};

#[derive(Debug, Deserialize)]
struct UniqueName {
    unique: bool,
}

#[derive(Debug, Serialize)]
struct NewEnvironment<'a> {
    name: &'a str,
}

impl ApiClient {
    /// Ask the server whether no other environment uses `name`
    pub async fn is_environment_name_unique(&self, name: &str) -> ApiResult<bool> {
        let mut url = self.endpoint(&["environments", "uniquename"])?;
        url.query_pairs_mut().append_pair("value", name);
        let reply: UniqueName = self.get_json(url).await?;
        Ok(reply.unique)
    }

    pub async fn create_environment(&self, name: &str) -> ApiResult<()> {
        info!("Creating environment {}", name);
        let url = self.endpoint(&["environments"])?;
        self.execute(Method::POST, url, Some(&NewEnvironment { name }))
            .await
    }
}
