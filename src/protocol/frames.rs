use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const EXEC_FRAME_TYPE: &str = "exec";
pub const RESULT_FRAME_TYPE: &str = "result";

/// Actions understood by the native browser service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NativeAction {
    Open,
    Close,
    Show,
    Hide,
    LoadedStatus,
    NotifyStatus,
    InjectScriptCode,
    InjectScriptFile,
    InjectStyleCode,
    InjectStyleFile,
}

impl NativeAction {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Close => "close",
            Self::Show => "show",
            Self::Hide => "hide",
            Self::LoadedStatus => "loadedStatus",
            Self::NotifyStatus => "notifyStatus",
            Self::InjectScriptCode => "injectScriptCode",
            Self::InjectScriptFile => "injectScriptFile",
            Self::InjectStyleCode => "injectStyleCode",
            Self::InjectStyleFile => "injectStyleFile",
        }
    }
}

/// One call into the native side: service, action and positional args.
#[derive(Debug, Clone, PartialEq)]
pub struct NativeRequest {
    pub service: String,
    pub action: NativeAction,
    pub args: Vec<Value>,
}

impl NativeRequest {
    #[must_use]
    pub fn new(service: impl Into<String>, action: NativeAction, args: Vec<Value>) -> Self {
        Self {
            service: service.into(),
            action,
            args,
        }
    }

    #[must_use]
    pub fn str_arg(&self, index: usize) -> Option<&str> {
        self.args.get(index).and_then(Value::as_str)
    }

    #[must_use]
    pub fn bool_arg(&self, index: usize) -> bool {
        self.args
            .get(index)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecFrame {
    #[serde(rename = "type")]
    pub frame_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callback_id: Option<String>,
    pub service: String,
    pub action: NativeAction,
    #[serde(default)]
    pub args: Vec<Value>,
}

impl ExecFrame {
    #[must_use]
    pub fn from_request(request: NativeRequest, callback_id: Option<String>) -> Self {
        Self {
            frame_type: EXEC_FRAME_TYPE.to_owned(),
            callback_id,
            service: request.service,
            action: request.action,
            args: request.args,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultStatus {
    Ok,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultFrame {
    #[serde(rename = "type")]
    pub frame_type: String,
    pub callback_id: String,
    pub status: ResultStatus,
    #[serde(default)]
    pub keep_callback: bool,
    #[serde(default)]
    pub payload: Option<Value>,
}
