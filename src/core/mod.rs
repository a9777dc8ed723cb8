use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

pub mod errors;
pub mod types;

pub use errors::*;
pub use types::{
    format_size, new_operation_id, short_id, ConfirmDialog, ContainerId, HelpContent, HelpSection,
    InputDialog, NodeId, NotificationLevel, OperationId, ProjectName, SHORT_ID_LEN,
};

/// Deserialize `null` as the type's default (the server sends `null` for empty arrays)
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A published (or unpublished) container port as reported by the runtime
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PortBinding {
    #[serde(default)]
    pub ip: Option<String>,
    #[serde(default)]
    pub private_port: u16,
    #[serde(default)]
    pub public_port: Option<u16>,
    #[serde(default, rename = "type")]
    pub protocol: Option<String>,
}

/// Container runtime state, exactly as reported by the server
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ContainerState {
    Created,
    Restarting,
    Running,
    Removing,
    Paused,
    Exited,
    Dead,
    /// A value outside the runtime's documented set, kept verbatim
    Other(String),
}

impl ContainerState {
    pub fn as_str(&self) -> &str {
        match self {
            ContainerState::Created => "created",
            ContainerState::Restarting => "restarting",
            ContainerState::Running => "running",
            ContainerState::Removing => "removing",
            ContainerState::Paused => "paused",
            ContainerState::Exited => "exited",
            ContainerState::Dead => "dead",
            ContainerState::Other(raw) => raw,
        }
    }
}

impl From<String> for ContainerState {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "created" => ContainerState::Created,
            "restarting" => ContainerState::Restarting,
            "running" => ContainerState::Running,
            "removing" => ContainerState::Removing,
            "paused" => ContainerState::Paused,
            "exited" => ContainerState::Exited,
            "dead" => ContainerState::Dead,
            _ => ContainerState::Other(raw),
        }
    }
}

impl From<ContainerState> for String {
    fn from(state: ContainerState) -> Self {
        match state {
            ContainerState::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for ContainerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A container on a node, as listed by the console server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Container {
    pub id: ContainerId,
    pub name: String,
    pub state: ContainerState,
    #[serde(default)]
    pub status: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub ports: Vec<PortBinding>,
}

impl Container {
    /// First 12 characters of the ID
    pub fn short_id(&self) -> &str {
        short_id(&self.id)
    }
}

/// `GET /nodes/{id}/containers` response; `items` may be absent or `null`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ContainerList {
    #[serde(default, deserialize_with = "null_as_default")]
    pub items: Vec<Container>,
}

impl ContainerList {
    pub fn new(items: Vec<Container>) -> Self {
        Self { items }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn find(&self, id: &str) -> Option<&Container> {
        self.items.iter().find(|c| c.id == id)
    }
}

/// Lightweight node descriptor used by the port resolver
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct NodeHead {
    #[serde(default)]
    pub id: Option<u64>,
    pub name: String,
    #[serde(default)]
    pub container_base_url: Option<String>,
}

impl NodeHead {
    /// The override, if set to something other than blank
    pub fn base_url_override(&self) -> Option<&str> {
        self.container_base_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
    }
}

/// Node row in the registry listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeSummary {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub online: bool,
    #[serde(default)]
    pub container_base_url: Option<String>,
    #[serde(default)]
    pub environment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct NodeList {
    #[serde(default, deserialize_with = "null_as_default")]
    pub items: Vec<NodeSummary>,
}

/// Server-wide setting (e.g. `SERVER_URL`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Setting {
    pub id: String,
    #[serde(default)]
    pub value: String,
}

/// Compose project definition stored in the library
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ComposeProject {
    pub project_name: ProjectName,
    #[serde(default)]
    pub definition: String,
}

/// Compose library listing row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComposeLibraryItem {
    pub project_name: ProjectName,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ComposeLibraryList {
    #[serde(default, deserialize_with = "null_as_default")]
    pub items: Vec<ComposeLibraryItem>,
}

/// Environment registered on the server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Environment {
    #[serde(default)]
    pub id: Option<u64>,
    pub name: String,
}

/// Name and tag shown for an image without a usable repo tag
pub const NO_TAG: &str = "<none>";

/// An image as the node's runtime reports it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageSummary {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub repo_tags: Vec<String>,
    #[serde(default)]
    pub size: i64,
    /// Unix timestamp
    #[serde(default)]
    pub created: i64,
}

/// An image row: the first repo tag split into name and tag
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Image {
    pub id: String,
    pub name: String,
    pub tag: String,
    pub size: i64,
    pub created: i64,
}

impl Image {
    /// First 12 characters of the digest, without the `sha256:` prefix
    pub fn short_id(&self) -> &str {
        short_id(self.id.strip_prefix("sha256:").unwrap_or(&self.id))
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.created, 0)
    }
}

impl From<ImageSummary> for Image {
    fn from(summary: ImageSummary) -> Self {
        let (name, tag) = split_repo_tag(summary.repo_tags.first().map(String::as_str));
        Self {
            id: summary.id,
            name,
            tag,
            size: summary.size,
            created: summary.created,
        }
    }
}

/// Split `name:tag`. Anything other than exactly one `:` (a registry port,
/// a digest, no tag at all) yields `<none>` for both.
pub fn split_repo_tag(repo_tag: Option<&str>) -> (String, String) {
    let parts: Vec<&str> = repo_tag.map(|t| t.split(':').collect()).unwrap_or_default();
    match parts.as_slice() {
        [name, tag] => (name.to_string(), tag.to_string()),
        _ => (NO_TAG.to_string(), NO_TAG.to_string()),
    }
}

/// `GET /nodes/{id}/images` response, sorted by image name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(from = "RawImageList")]
pub struct ImageList {
    pub items: Vec<Image>,
}

#[derive(Deserialize)]
struct RawImageList {
    #[serde(default, deserialize_with = "null_as_default")]
    items: Vec<ImageSummary>,
}

impl From<RawImageList> for ImageList {
    fn from(raw: RawImageList) -> Self {
        ImageList::new(raw.items)
    }
}

impl ImageList {
    pub fn new(summaries: Vec<ImageSummary>) -> Self {
        let mut items: Vec<Image> = summaries.into_iter().map(Image::from).collect();
        items.sort_by(|a, b| a.name.cmp(&b.name));
        Self { items }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// One entry of a prune report; exactly one of the fields is usually set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PrunedImage {
    #[serde(default)]
    pub deleted: String,
    #[serde(default)]
    pub untagged: String,
}

/// `POST /nodes/{id}/images/prune` response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ImagePruneReport {
    #[serde(default, deserialize_with = "null_as_default")]
    pub images_deleted: Vec<PrunedImage>,
    #[serde(default)]
    pub space_reclaimed: u64,
}
