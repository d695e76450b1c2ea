use std::{
    fmt,
    sync::{Arc, Weak},
};

use serde_json::{Value, json};
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    domain::{
        error::BridgeError,
        models::{InjectDetails, InjectSource},
    },
    protocol::{BrowserEvent, ChannelName, NativeAction, NativeRequest},
};

use super::{
    channel::Listener,
    hub::EventChannelHub,
    native::{ExecCallbacks, NativeBridge, ResultCallback},
};

/// Per-window handle returned by [`super::BrowserLauncher::open`].
///
/// Clones share the same event hub. The native side keeps the hub alive
/// through the open request's callbacks until it reports `exit`.
#[derive(Clone)]
pub struct InAppBrowser {
    inner: Arc<BrowserInner>,
}

struct BrowserInner {
    id: Uuid,
    service: String,
    hub: Arc<EventChannelHub>,
    bridge: Arc<dyn NativeBridge>,
}

impl InAppBrowser {
    pub(crate) fn new(service: impl Into<String>, bridge: Arc<dyn NativeBridge>) -> Self {
        Self {
            inner: Arc::new(BrowserInner {
                id: Uuid::new_v4(),
                service: service.into(),
                hub: Arc::new(EventChannelHub::new()),
                bridge,
            }),
        }
    }

    #[must_use]
    pub fn id(&self) -> Uuid {
        self.inner.id
    }

    #[must_use]
    pub fn hub(&self) -> &EventChannelHub {
        &self.inner.hub
    }

    /// Handle that does not keep the browser alive. Listeners stored in this
    /// browser's own hub must capture this instead of a clone.
    #[must_use]
    pub fn downgrade(&self) -> WeakInAppBrowser {
        WeakInAppBrowser {
            inner: Arc::downgrade(&self.inner),
        }
    }

    pub fn add_event_listener(&self, name: &str, listener: &Listener) {
        self.inner.hub.subscribe_named(name, listener);
    }

    pub fn remove_event_listener(&self, name: &str, listener: &Listener) {
        self.inner.hub.unsubscribe_named(name, listener);
    }

    /// Typed shorthand for [`Self::add_event_listener`]; returns the handle
    /// needed for removal.
    pub fn on(
        &self,
        channel: ChannelName,
        callback: impl Fn(&BrowserEvent) + Send + Sync + 'static,
    ) -> Listener {
        let listener = Listener::new(callback);
        self.inner.hub.subscribe(channel, &listener);
        listener
    }

    /// Routes a raw native event into the channel named by its `type`.
    /// Events naming no known channel are dropped.
    pub fn handle_event(&self, event: &Value) {
        route_event(&self.inner.hub, event);
    }

    pub fn close(&self) {
        self.send(NativeAction::Close, Vec::new(), ExecCallbacks::none());
    }

    pub fn show(&self) {
        self.send(NativeAction::Show, Vec::new(), ExecCallbacks::none());
    }

    pub fn hide(&self) {
        self.send(NativeAction::Hide, Vec::new(), ExecCallbacks::none());
    }

    pub fn loaded_status(&self) {
        self.send(NativeAction::LoadedStatus, Vec::new(), ExecCallbacks::none());
    }

    pub fn notify_status(&self) {
        self.send(NativeAction::NotifyStatus, Vec::new(), ExecCallbacks::none());
    }

    pub fn execute_script(
        &self,
        details: &InjectDetails,
        callback: Option<ResultCallback>,
    ) -> Result<(), BridgeError> {
        self.inject(
            "executeScript",
            details,
            callback,
            NativeAction::InjectScriptCode,
            NativeAction::InjectScriptFile,
        )
    }

    pub fn insert_css(
        &self,
        details: &InjectDetails,
        callback: Option<ResultCallback>,
    ) -> Result<(), BridgeError> {
        self.inject(
            "insertCSS",
            details,
            callback,
            NativeAction::InjectStyleCode,
            NativeAction::InjectStyleFile,
        )
    }

    pub(crate) fn start(&self, url: &str, window_name: Option<&str>, features: &str) {
        info!("browser {} opening {url}", self.inner.id);
        let hub = Arc::clone(&self.inner.hub);
        let router: ResultCallback = Arc::new(move |event: Value| route_event(&hub, &event));
        self.send(
            NativeAction::Open,
            vec![
                json!(url),
                window_name.map_or(Value::Null, |name| json!(name)),
                json!(features),
            ],
            ExecCallbacks::both(router),
        );
    }

    fn inject(
        &self,
        operation: &str,
        details: &InjectDetails,
        callback: Option<ResultCallback>,
        code_action: NativeAction,
        file_action: NativeAction,
    ) -> Result<(), BridgeError> {
        let (action, source) = match details.source() {
            Some(InjectSource::Code(code)) => (code_action, code),
            Some(InjectSource::File(file)) => (file_action, file),
            None => {
                return Err(BridgeError::InvalidArgument(format!(
                    "{operation} requires exactly one of code or file to be specified"
                )));
            }
        };

        let has_callback = callback.is_some();
        self.send(
            action,
            vec![json!(source), json!(has_callback)],
            ExecCallbacks::success(callback),
        );
        Ok(())
    }

    fn send(&self, action: NativeAction, args: Vec<Value>, callbacks: ExecCallbacks) {
        debug!("browser {} native request {}", self.inner.id, action.as_str());
        self.inner.bridge.exec(
            NativeRequest::new(self.inner.service.clone(), action, args),
            callbacks,
        );
    }
}

#[derive(Clone, Debug)]
pub struct WeakInAppBrowser {
    inner: Weak<BrowserInner>,
}

impl WeakInAppBrowser {
    #[must_use]
    pub fn upgrade(&self) -> Option<InAppBrowser> {
        self.inner.upgrade().map(|inner| InAppBrowser { inner })
    }
}

impl fmt::Debug for InAppBrowser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InAppBrowser")
            .field("id", &self.inner.id)
            .field("service", &self.inner.service)
            .finish_non_exhaustive()
    }
}

fn route_event(hub: &EventChannelHub, event: &Value) {
    match BrowserEvent::from_value(event) {
        Some(event) => hub.dispatch(&event),
        None => {
            let kind = event.get("type").and_then(Value::as_str).unwrap_or("<none>");
            debug!("dropping native event type={kind}");
        }
    }
}
