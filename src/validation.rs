//! Form input rules shared by the console dialogs and the CLI

use lazy_static::lazy_static;
use regex::Regex;
use reqwest::Url;

use crate::core::ValidationError;

/// Longest identifier accepted for compose projects and environments
pub const MAX_IDENTIFIER_LEN: usize = 20;

/// Longest accepted server URL
pub const MAX_SERVER_URL_LEN: usize = 200;

pub const IDENTIFIER_MESSAGE: &str =
    "Only letters, digits, underscores and hyphens are allowed";

lazy_static! {
    static ref IDENTIFIER: Regex = Regex::new(r"^[a-zA-Z0-9_-]+$").expect("valid identifier regex");
}

/// Any absolute URL; relative references and bare hosts fail to parse
fn is_absolute_url(value: &str) -> bool {
    Url::parse(value).is_ok()
}

/// Container base URL: blank clears the override, anything else must be a URL
pub fn container_base_url(input: &str) -> Result<String, ValidationError> {
    let value = input.trim();
    if value.is_empty() || is_absolute_url(value) {
        Ok(value.to_string())
    } else {
        Err(ValidationError::field("containerBaseUrl", "Invalid URL format"))
    }
}

/// Server URL setting: required URL, at most 200 characters
pub fn server_url(input: &str) -> Result<String, ValidationError> {
    let value = input.trim();
    if value.is_empty() {
        return Err(ValidationError::field("value", "Value is required"));
    }
    if value.chars().count() > MAX_SERVER_URL_LEN {
        return Err(ValidationError::field(
            "value",
            format!("Must be at most {} characters", MAX_SERVER_URL_LEN),
        ));
    }
    if !is_absolute_url(value) {
        return Err(ValidationError::field("value", "Invalid URL format"));
    }
    Ok(value.to_string())
}

/// Compose project and environment names
pub fn identifier(field: &'static str, input: &str) -> Result<String, ValidationError> {
    let value = input.trim();
    if value.is_empty() {
        return Err(ValidationError::field(field, "Name is required"));
    }
    if value.chars().count() > MAX_IDENTIFIER_LEN {
        return Err(ValidationError::field(
            field,
            format!("Must be at most {} characters", MAX_IDENTIFIER_LEN),
        ));
    }
    if !IDENTIFIER.is_match(value) {
        return Err(ValidationError::field(field, IDENTIFIER_MESSAGE));
    }
    Ok(value.to_string())
}
