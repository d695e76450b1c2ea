use std::fmt;

use serde::{Deserialize, Serialize};

pub const TARGET_SELF: &str = "_self";
pub const TARGET_SYSTEM: &str = "_system";
pub const TARGET_BLANK: &str = "_blank";

/// Source for a script or stylesheet injection. Exactly one of `code` or
/// `file` is expected; an empty string counts as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InjectDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

impl InjectDetails {
    #[must_use]
    pub fn code(code: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            file: None,
        }
    }

    #[must_use]
    pub fn file(file: impl Into<String>) -> Self {
        Self {
            code: None,
            file: Some(file.into()),
        }
    }

    /// Resolves which source wins. `code` is checked first.
    #[must_use]
    pub fn source(&self) -> Option<InjectSource<'_>> {
        if let Some(code) = non_empty(self.code.as_deref()) {
            return Some(InjectSource::Code(code));
        }
        non_empty(self.file.as_deref()).map(InjectSource::File)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InjectSource<'a> {
    Code(&'a str),
    File(&'a str),
}

impl InjectSource<'_> {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Code(value) | Self::File(value) => value,
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.is_empty())
}

/// Where the native side should load a URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WindowTarget {
    SelfWebView,
    System,
    Blank,
    Named(String),
}

impl WindowTarget {
    #[must_use]
    pub fn from_window_name(name: Option<&str>) -> Self {
        match name.map(str::trim) {
            None | Some("") | Some("null") | Some(TARGET_SELF) => Self::SelfWebView,
            Some(TARGET_SYSTEM) => Self::System,
            Some(TARGET_BLANK) => Self::Blank,
            Some(other) => Self::Named(other.to_owned()),
        }
    }

    /// Named targets open in a new browser the same way `_blank` does.
    #[must_use]
    pub fn opens_browser(&self) -> bool {
        !matches!(self, Self::System)
    }
}

impl fmt::Display for WindowTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SelfWebView => f.write_str(TARGET_SELF),
            Self::System => f.write_str(TARGET_SYSTEM),
            Self::Blank => f.write_str(TARGET_BLANK),
            Self::Named(name) => f.write_str(name),
        }
    }
}
