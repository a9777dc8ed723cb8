//! Core type definitions and shared types

/// Type alias for node IDs (opaque, assigned by the console server)
pub type NodeId = String;

/// Type alias for container IDs
pub type ContainerId = String;

/// Type alias for compose library project names
pub type ProjectName = String;

/// Type alias for operation IDs
pub type OperationId = uuid::Uuid;

use uuid::Uuid;

/// Generate a new unique operation ID
pub fn new_operation_id() -> OperationId {
    Uuid::new_v4()
}

/// Number of characters shown for a container ID in tables
pub const SHORT_ID_LEN: usize = 12;

/// Shorten a container ID for display
pub fn short_id(id: &str) -> &str {
    match id.char_indices().nth(SHORT_ID_LEN) {
        Some((idx, _)) => &id[..idx],
        None => id,
    }
}

/// Format a byte count for display
pub fn format_size(size: i64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    if size <= 0 {
        return "0 B".to_string();
    }
    let size = size as f64;
    let exp = (size.ln() / 1024_f64.ln()).min(UNITS.len() as f64 - 1.0) as usize;
    let size = size / 1024_f64.powi(exp as i32);
    format!("{:.1} {}", size, UNITS[exp])
}

/// Notification level for status messages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl std::fmt::Display for NotificationLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NotificationLevel::Info => write!(f, "INFO"),
            NotificationLevel::Success => write!(f, "SUCCESS"),
            NotificationLevel::Warning => write!(f, "WARNING"),
            NotificationLevel::Error => write!(f, "ERROR"),
        }
    }
}

/// Confirmation dialog content
#[derive(Debug, Clone)]
pub struct ConfirmDialog {
    pub title: String,
    pub message: String,
    pub confirm_label: String,
    pub cancel_label: String,
}

impl ConfirmDialog {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            confirm_label: "Confirm".to_string(),
            cancel_label: "Cancel".to_string(),
        }
    }

    pub fn with_labels(
        mut self,
        confirm: impl Into<String>,
        cancel: impl Into<String>,
    ) -> Self {
        self.confirm_label = confirm.into();
        self.cancel_label = cancel.into();
        self
    }
}

/// Single-field input dialog content
#[derive(Debug, Clone)]
pub struct InputDialog {
    pub title: String,
    pub help: String,
    pub value: String,
    /// Validation message shown under the field
    pub error: Option<String>,
}

impl InputDialog {
    pub fn new(title: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            help: String::new(),
            value: value.into(),
            error: None,
        }
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = help.into();
        self
    }
}

/// Help content
#[derive(Debug, Clone)]
pub struct HelpContent {
    pub title: String,
    pub sections: Vec<HelpSection>,
}

/// Help section
#[derive(Debug, Clone)]
pub struct HelpSection {
    pub title: String,
    pub items: Vec<(String, String)>, // (key, description)
}
