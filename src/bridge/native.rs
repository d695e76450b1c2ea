use std::{fmt, sync::Arc};

use serde_json::Value;

use crate::protocol::NativeRequest;

pub type ResultCallback = Arc<dyn Fn(Value) + Send + Sync>;

/// Success and error continuations attached to a native request.
#[derive(Clone, Default)]
pub struct ExecCallbacks {
    pub success: Option<ResultCallback>,
    pub error: Option<ResultCallback>,
}

impl ExecCallbacks {
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn success(callback: Option<ResultCallback>) -> Self {
        Self {
            success: callback,
            error: None,
        }
    }

    /// Routes both outcomes to the same callback.
    #[must_use]
    pub fn both(callback: ResultCallback) -> Self {
        Self {
            success: Some(Arc::clone(&callback)),
            error: Some(callback),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.success.is_none() && self.error.is_none()
    }
}

impl fmt::Debug for ExecCallbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecCallbacks")
            .field("success", &self.success.is_some())
            .field("error", &self.error.is_some())
            .finish()
    }
}

/// Asynchronous call mechanism into the native browser implementation.
///
/// `exec` must return without waiting for the native side. Results, if any,
/// arrive later through `callbacks`.
pub trait NativeBridge: Send + Sync {
    fn exec(&self, request: NativeRequest, callbacks: ExecCallbacks);
}

impl<T: NativeBridge + ?Sized> NativeBridge for Arc<T> {
    fn exec(&self, request: NativeRequest, callbacks: ExecCallbacks) {
        (**self).exec(request, callbacks);
    }
}
