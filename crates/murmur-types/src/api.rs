use serde::{Deserialize, Serialize};

// -- Inline keyboard --

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Button {
    pub label: String,
    pub target: ButtonTarget,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ButtonTarget {
    Url(String),
    Callback(String),
}

impl Button {
    pub fn url(label: impl Into<String>, url: impl Into<String>) -> Self {
        Self { label: label.into(), target: ButtonTarget::Url(url.into()) }
    }

    pub fn callback(label: impl Into<String>, data: impl Into<String>) -> Self {
        Self { label: label.into(), target: ButtonTarget::Callback(data.into()) }
    }
}

/// Buttons are laid out as rows; each inner vec is one row.
pub type Keyboard = Vec<Vec<Button>>;
