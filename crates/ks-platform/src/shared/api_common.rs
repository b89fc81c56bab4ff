//! Common API types

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Success response with optional message
#[derive(Debug, Serialize, ToSchema)]
pub struct SuccessResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self { success: true, message: None }
    }

    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
        }
    }
}

/// Created response with ID
#[derive(Debug, Serialize, ToSchema)]
pub struct CreatedResponse {
    pub id: String,
}

impl CreatedResponse {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// Whether a read serves editors (draft content, manage permission) or
/// viewers (read permission).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum ResourceMode {
    #[default]
    Edit,
    View,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ModeParams {
    #[serde(default)]
    pub mode: Option<ResourceMode>,
}

impl ModeParams {
    pub fn mode(&self) -> ResourceMode {
        self.mode.unwrap_or_default()
    }
}

/// Split a comma-separated query value, dropping blanks.
pub fn split_csv(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_csv() {
        assert_eq!(split_csv("a, b,,c "), vec!["a", "b", "c"]);
        assert!(split_csv("").is_empty());
    }

    #[test]
    fn test_resource_mode_default_is_edit() {
        let params: ModeParams = serde_json::from_str("{}").unwrap();
        assert_eq!(params.mode(), ResourceMode::Edit);

        let params: ModeParams = serde_json::from_str(r#"{"mode":"VIEW"}"#).unwrap();
        assert_eq!(params.mode(), ResourceMode::View);
    }
}
