//! Server-wide settings

use reqwest::Method;
use serde::Serialize;
use tracing::info;

use crate::api::{ApiClient, ApiResult};
use crate::core::Setting;

/// Setting holding the URL agents and operators use to reach the server
pub const SERVER_URL_SETTING: &str = "SERVER_URL";

#[derive(Debug, Serialize)]
struct SettingValue<'a> {
    value: &'a str,
}

impl ApiClient {
    pub async fn get_setting(&self, id: &str) -> ApiResult<Setting> {
        let url = self.endpoint(&["settings", id])?;
        self.get_json(url).await
    }

    pub async fn put_setting(&self, id: &str, value: &str) -> ApiResult<()> {
        info!("Saving setting {}", id);
        let url = self.endpoint(&["settings", id])?;
        self.execute(Method::PUT, url, Some(&SettingValue { value }))
            .await
    }
}
