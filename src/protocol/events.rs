use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// The fixed set of event channels a browser instance exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ChannelName {
    LoadStart,
    LoadStop,
    LoadError,
    LoadedStatus,
    NotifyStatus,
    Exit,
    ToolbarItemTapped,
}

impl ChannelName {
    pub const ALL: [Self; 7] = [
        Self::LoadStart,
        Self::LoadStop,
        Self::LoadError,
        Self::LoadedStatus,
        Self::NotifyStatus,
        Self::Exit,
        Self::ToolbarItemTapped,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::LoadStart => "loadstart",
            Self::LoadStop => "loadstop",
            Self::LoadError => "loaderror",
            Self::LoadedStatus => "loadedStatus",
            Self::NotifyStatus => "notifyStatus",
            Self::Exit => "exit",
            Self::ToolbarItemTapped => "toolbarItemTapped",
        }
    }

    #[must_use]
    pub fn lookup(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|channel| channel.as_str() == name)
    }
}

impl fmt::Display for ChannelName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownChannel(pub String);

impl fmt::Display for UnknownChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown channel: {}", self.0)
    }
}

impl std::error::Error for UnknownChannel {}

impl FromStr for ChannelName {
    type Err = UnknownChannel;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::lookup(value).ok_or_else(|| UnknownChannel(value.to_owned()))
    }
}

/// Event reported by the native browser, tagged on the wire by `type`.
///
/// Payload fields are read leniently: missing, `null` or mistyped values fall
/// back to a default or a coerced value, so a known `type` always decodes.
/// Extra fields are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum BrowserEvent {
    #[serde(rename = "loadstart")]
    LoadStart {
        #[serde(default, deserialize_with = "lenient_string")]
        url: String,
    },
    #[serde(rename = "loadstop")]
    LoadStop {
        #[serde(default, deserialize_with = "lenient_string")]
        url: String,
    },
    #[serde(rename = "loaderror")]
    LoadError {
        #[serde(default, deserialize_with = "lenient_string")]
        url: String,
        #[serde(default, deserialize_with = "lenient_i64")]
        code: i64,
        #[serde(default, deserialize_with = "lenient_string")]
        message: String,
    },
    #[serde(rename = "loadedStatus")]
    LoadedStatus {
        #[serde(default, deserialize_with = "lenient_string")]
        loaded: String,
    },
    #[serde(rename = "notifyStatus")]
    NotifyStatus {
        #[serde(default, deserialize_with = "lenient_string")]
        notify: String,
    },
    #[serde(rename = "exit")]
    Exit,
    #[serde(rename = "toolbarItemTapped")]
    ToolbarItemTapped {
        #[serde(default, deserialize_with = "lenient_i64")]
        index: i64,
    },
}

impl BrowserEvent {
    #[must_use]
    pub fn channel(&self) -> ChannelName {
        match self {
            Self::LoadStart { .. } => ChannelName::LoadStart,
            Self::LoadStop { .. } => ChannelName::LoadStop,
            Self::LoadError { .. } => ChannelName::LoadError,
            Self::LoadedStatus { .. } => ChannelName::LoadedStatus,
            Self::NotifyStatus { .. } => ChannelName::NotifyStatus,
            Self::Exit => ChannelName::Exit,
            Self::ToolbarItemTapped { .. } => ChannelName::ToolbarItemTapped,
        }
    }

    /// Decodes a raw native event. Returns `None` only when `type` is missing
    /// or names no known channel.
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        let kind = value.get("type")?.as_str()?;
        ChannelName::lookup(kind)?;
        serde_json::from_value(value.clone()).ok()
    }

    #[must_use]
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => String::new(),
        Value::String(text) => text,
        other => other.to_string(),
    })
}

fn lenient_i64<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let number = match &value {
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().map(|float| float as i64)),
        Value::String(text) => text.trim().parse().ok(),
        Value::Bool(flag) => Some(i64::from(*flag)),
        _ => None,
    };
    Ok(number.unwrap_or_default())
}
