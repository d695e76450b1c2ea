mod errors;
mod events;
mod frames;

pub use errors::{ERROR_INVALID_REQUEST, ERROR_UNAVAILABLE, ErrorShape};
pub use events::{BrowserEvent, ChannelName, UnknownChannel};
pub use frames::{
    EXEC_FRAME_TYPE, ExecFrame, NativeAction, NativeRequest, RESULT_FRAME_TYPE, ResultFrame,
    ResultStatus,
};

pub const DEFAULT_SERVICE: &str = "InAppBrowserBeta";

pub fn parse_result_frame(text: &str) -> Result<ResultFrame, ErrorShape> {
    let frame = serde_json::from_str::<ResultFrame>(text).map_err(|error| {
        ErrorShape::new(
            ERROR_INVALID_REQUEST,
            format!("invalid result frame: {error}"),
        )
    })?;

    if frame.frame_type != RESULT_FRAME_TYPE {
        return Err(ErrorShape::new(
            ERROR_INVALID_REQUEST,
            "invalid result frame: expected type=result",
        ));
    }
    if frame.callback_id.trim().is_empty() {
        return Err(ErrorShape::new(
            ERROR_INVALID_REQUEST,
            "invalid result frame: missing callbackId",
        ));
    }

    Ok(frame)
}

pub fn encode_exec_frame(frame: &ExecFrame) -> Result<String, ErrorShape> {
    serde_json::to_string(frame).map_err(|error| {
        ErrorShape::new(
            ERROR_UNAVAILABLE,
            format!("failed to encode exec frame: {error}"),
        )
    })
}
