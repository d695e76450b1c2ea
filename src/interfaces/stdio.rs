use std::{
    collections::HashMap,
    sync::{
        Mutex, MutexGuard, PoisonError,
        atomic::{AtomicU64, Ordering},
    },
};

use serde_json::Value;
use tokio::{
    io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader},
    sync::mpsc,
};
use tracing::{debug, warn};

use crate::{
    bridge::native::{ExecCallbacks, NativeBridge},
    domain::error::BridgeError,
    protocol::{
        ExecFrame, NativeRequest, ResultFrame, ResultStatus, encode_exec_frame,
        parse_result_frame,
    },
};

/// Native bridge speaking line-delimited JSON.
///
/// Each `exec` becomes one outbound `exec` frame. Requests with callbacks get
/// a `callbackId`; inbound `result` frames are matched against it and the
/// callbacks are released unless the frame sets `keepCallback`.
pub struct StdioBridge {
    next_id: AtomicU64,
    pending: Mutex<HashMap<String, ExecCallbacks>>,
    outbound: Mutex<Option<mpsc::UnboundedSender<ExecFrame>>>,
}

impl StdioBridge {
    #[must_use]
    pub fn new() -> (Self, mpsc::UnboundedReceiver<ExecFrame>) {
        let (outbound, frames) = mpsc::unbounded_channel();
        let bridge = Self {
            next_id: AtomicU64::new(1),
            pending: Mutex::new(HashMap::new()),
            outbound: Mutex::new(Some(outbound)),
        };
        (bridge, frames)
    }

    /// Hands a result to its callbacks. Returns `false` when nothing is
    /// registered under the frame's callback id.
    pub fn deliver(&self, frame: ResultFrame) -> bool {
        let callbacks = {
            let mut pending = self.lock_pending();
            if frame.keep_callback {
                pending.get(&frame.callback_id).cloned()
            } else {
                pending.remove(&frame.callback_id)
            }
        };

        let Some(callbacks) = callbacks else {
            warn!(
                "dropping result for unknown callback id={}",
                frame.callback_id
            );
            return false;
        };

        let callback = match frame.status {
            ResultStatus::Ok => callbacks.success,
            ResultStatus::Error => callbacks.error,
        };
        if let Some(callback) = callback {
            callback(frame.payload.unwrap_or(Value::Null));
        }
        true
    }

    /// Stops accepting requests and releases every registered callback.
    /// Frames already queued are still written.
    pub fn disconnect(&self) {
        self.outbound
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        self.lock_pending().clear();
    }

    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.lock_pending().len()
    }

    fn lock_pending(&self) -> MutexGuard<'_, HashMap<String, ExecCallbacks>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl NativeBridge for StdioBridge {
    fn exec(&self, request: NativeRequest, callbacks: ExecCallbacks) {
        let callback_id = if callbacks.is_empty() {
            None
        } else {
            let id = format!(
                "{}{}",
                request.service,
                self.next_id.fetch_add(1, Ordering::Relaxed)
            );
            self.lock_pending().insert(id.clone(), callbacks);
            Some(id)
        };

        let action = request.action.as_str();
        let frame = ExecFrame::from_request(request, callback_id.clone());
        let sent = self
            .outbound
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|outbound| outbound.send(frame).is_ok());
        if !sent {
            warn!("native transport closed; dropping {action} request");
            if let Some(id) = callback_id {
                self.lock_pending().remove(&id);
            }
        }
    }
}

/// Drains queued exec frames onto `writer`, one JSON document per line.
pub async fn write_frames<W>(
    mut frames: mpsc::UnboundedReceiver<ExecFrame>,
    mut writer: W,
) -> Result<(), BridgeError>
where
    W: AsyncWrite + Unpin,
{
    while let Some(frame) = frames.recv().await {
        let mut line = encode_exec_frame(&frame)
            .map_err(|error| BridgeError::Transport(error.message))?;
        line.push('\n');
        writer
            .write_all(line.as_bytes())
            .await
            .map_err(|error| BridgeError::Transport(format!("failed to write frame: {error}")))?;
        writer
            .flush()
            .await
            .map_err(|error| BridgeError::Transport(format!("failed to flush frame: {error}")))?;
    }
    Ok(())
}

/// Reads result frames until end of input. Malformed lines are logged and
/// skipped.
pub async fn read_results<R>(bridge: &StdioBridge, reader: R) -> Result<(), BridgeError>
where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(reader).lines();
    while let Some(line) = lines
        .next_line()
        .await
        .map_err(|error| BridgeError::Transport(format!("failed to read frame: {error}")))?
    {
        let text = line.trim();
        if text.is_empty() {
            continue;
        }
        match parse_result_frame(text) {
            Ok(frame) => {
                bridge.deliver(frame);
            }
            Err(error) => warn!("{}: {}", error.code, error.message),
        }
    }
    debug!("native transport reached end of input");
    Ok(())
}
