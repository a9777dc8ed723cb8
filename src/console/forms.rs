//! Dialog submissions: validate, send, refresh what the change affects

use tracing::{info, warn};

use crate::api::compose::ComposeProjectUpdate;
use crate::api::settings::SERVER_URL_SETTING;
use crate::api::ApiClient;
use crate::console::pending::{PendingKey, PendingSet};
use crate::console::sync::NodeHeadSync;
use crate::core::{ConsoleError, Result, ValidationError};
use crate::validation;

const URL_SAVE_FAILED: &str = "There was a problem saving the URL. Try again!";
const ALREADY_SAVING: &str = "Already saving. Wait for it to finish.";

/// Result of submitting a dialog
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormOutcome {
    /// Saved; the dialog closes and the message is shown as a success
    Saved { message: String },
    /// Input rejected locally; the dialog stays open showing the message
    Invalid { message: String },
    /// The server call failed; the dialog closes and the message is shown as an error
    Failed { message: String },
    /// The same save or delete is still in flight; nothing was sent
    Busy { message: String },
}

impl FormOutcome {
    pub fn message(&self) -> &str {
        match self {
            FormOutcome::Saved { message }
            | FormOutcome::Invalid { message }
            | FormOutcome::Failed { message }
            | FormOutcome::Busy { message } => message,
        }
    }

    pub fn is_saved(&self) -> bool {
        matches!(self, FormOutcome::Saved { .. })
    }

    /// Map a finished submission. Server failures show `failed` when given,
    /// otherwise the server's own message.
    fn from_result<T>(result: Result<T>, saved: &str, failed: Option<&str>) -> Self {
        match result {
            Ok(_) => FormOutcome::Saved {
                message: saved.to_string(),
            },
            Err(ConsoleError::Validation(e)) => FormOutcome::Invalid {
                message: e.message().to_string(),
            },
            Err(ConsoleError::Api(e)) => FormOutcome::Failed {
                message: failed.map(str::to_string).unwrap_or_else(|| e.user_message()),
            },
        }
    }

    fn busy() -> Self {
        FormOutcome::Busy {
            message: ALREADY_SAVING.to_string(),
        }
    }
}

/// Save the node's container base URL and reload the node head
pub async fn save_container_base_url(heads: &NodeHeadSync, node_id: &str, input: &str) -> FormOutcome {
    let result = send_container_base_url(heads, node_id, input).await;
    FormOutcome::from_result(result, "Container Base URL has been saved.", Some(URL_SAVE_FAILED))
}

async fn send_container_base_url(heads: &NodeHeadSync, node_id: &str, input: &str) -> Result<()> {
    let url = validation::container_base_url(input)?;
    heads
        .api()
        .update_container_base_url(node_id, &url)
        .await
        .inspect_err(|e| warn!("Saving container base URL failed: {}", e))?;

    info!("Container base URL of node {} saved", node_id);
    heads.invalidate(node_id);
    if let Err(e) = heads.refresh(node_id).await {
        warn!("Could not reload node head after saving base URL: {}", e);
    }
    Ok(())
}

/// Save the `SERVER_URL` setting
pub async fn save_server_url(api: &ApiClient, input: &str) -> FormOutcome {
    let result = send_server_url(api, input).await;
    FormOutcome::from_result(result, "Server URL has been saved.", Some(URL_SAVE_FAILED))
}

async fn send_server_url(api: &ApiClient, input: &str) -> Result<()> {
    let url = validation::server_url(input)?;
    api.put_setting(SERVER_URL_SETTING, &url)
        .await
        .inspect_err(|e| warn!("Saving server URL failed: {}", e))?;
    Ok(())
}

/// Save a compose definition, renaming the project when `new_name` differs
pub async fn save_compose_project(
    api: &ApiClient,
    pending: &PendingSet<PendingKey>,
    name: &str,
    new_name: &str,
    definition: String,
) -> FormOutcome {
    let Some(_token) = pending.try_acquire(PendingKey::ComposeProject(name.to_string())) else {
        return FormOutcome::busy();
    };

    let result = send_compose_project(api, name, new_name, definition).await;
    FormOutcome::from_result(
        result,
        "Definition has been saved.",
        Some("There was a problem when saving the definition. Try again!"),
    )
}

async fn send_compose_project(
    api: &ApiClient,
    name: &str,
    new_name: &str,
    definition: String,
) -> Result<()> {
    let update = ComposeProjectUpdate {
        new_project_name: validation::identifier("newProjectName", new_name)?,
        definition,
    };
    api.update_compose_project(name, &update)
        .await
        .inspect_err(|e| warn!("Saving compose project {} failed: {}", name, e))?;
    Ok(())
}

/// Delete a compose project; the server's message is shown verbatim on failure
pub async fn delete_compose_project(
    api: &ApiClient,
    pending: &PendingSet<PendingKey>,
    name: &str,
) -> FormOutcome {
    let Some(_token) = pending.try_acquire(PendingKey::ComposeProject(name.to_string())) else {
        return FormOutcome::busy();
    };

    let result = api.delete_compose_project(name).await.map_err(ConsoleError::from);
    FormOutcome::from_result(result, "Compose project deleted.", None)
}

/// Add an environment after checking the name is free
pub async fn add_environment(
    api: &ApiClient,
    pending: &PendingSet<PendingKey>,
    input: &str,
) -> FormOutcome {
    let Some(_token) = pending.try_acquire(PendingKey::NewEnvironment) else {
        return FormOutcome::busy();
    };

    // A failed name check shows the server's message; a failed create does not
    let name = match free_environment_name(api, input).await {
        Ok(name) => name,
        Err(e) => return FormOutcome::from_result(Err::<(), _>(e), "", None),
    };

    let result = api
        .create_environment(&name)
        .await
        .inspect_err(|e| warn!("Creating environment {} failed: {}", name, e))
        .map_err(ConsoleError::from);
    FormOutcome::from_result(
        result,
        "New environment has been added.",
        Some("There was a problem when creating new environment. Try again!"),
    )
}

async fn free_environment_name(api: &ApiClient, input: &str) -> Result<String> {
    let name = validation::identifier("name", input)?;
    let unique = api
        .is_environment_name_unique(&name)
        .await
        .inspect_err(|e| warn!("Environment name check failed: {}", e))?;
    if !unique {
        return Err(ValidationError::field(
            "name",
            "Another environment with this name already exists",
        )
        .into());
    }
    Ok(name)
}
