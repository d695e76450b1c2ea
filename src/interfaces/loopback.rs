use std::{
    collections::VecDeque,
    sync::{Mutex, MutexGuard, PoisonError},
};

use serde_json::{Value, json};
use tracing::{debug, info};
use url::Url;

use crate::{
    bridge::native::{ExecCallbacks, NativeBridge, ResultCallback},
    domain::{models::WindowTarget, options::BrowserOptions},
    protocol::{BrowserEvent, NativeAction, NativeRequest},
};

pub const DEFAULT_LOADED_TOKEN: &str = "loaded";
pub const DEFAULT_NOTIFY_VALUE: &str = "false";

/// Browser window as the loopback native side sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoopbackWindow {
    pub url: String,
    pub target: WindowTarget,
    pub options: BrowserOptions,
    pub visible: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Injection {
    pub action: NativeAction,
    pub source: String,
}

/// In-process stand-in for the native browser.
///
/// Replays the native event protocol without a real window. Results are
/// queued rather than delivered inside `exec`; [`LoopbackBridge::run_pending`]
/// delivers them, the way a host event loop would on a later turn.
pub struct LoopbackBridge {
    loaded_token: String,
    notify_value: String,
    state: Mutex<LoopbackState>,
}

#[derive(Default)]
struct LoopbackState {
    event_sink: Option<ExecCallbacks>,
    window: Option<LoopbackWindow>,
    requests: Vec<NativeRequest>,
    injections: Vec<Injection>,
    queue: VecDeque<(ResultCallback, Value)>,
}

impl LoopbackBridge {
    #[must_use]
    pub fn new() -> Self {
        Self::with_status(DEFAULT_LOADED_TOKEN, DEFAULT_NOTIFY_VALUE)
    }

    #[must_use]
    pub fn with_status(loaded_token: impl Into<String>, notify_value: impl Into<String>) -> Self {
        Self {
            loaded_token: loaded_token.into(),
            notify_value: notify_value.into(),
            state: Mutex::new(LoopbackState::default()),
        }
    }

    /// Delivers queued results until the queue stays empty. Callbacks may
    /// issue further requests; their results are delivered in the same call.
    pub fn run_pending(&self) -> usize {
        let mut delivered = 0;
        loop {
            let next = self.lock().queue.pop_front();
            let Some((callback, payload)) = next else {
                return delivered;
            };
            callback(payload);
            delivered += 1;
        }
    }

    #[must_use]
    pub fn requests(&self) -> Vec<NativeRequest> {
        self.lock().requests.clone()
    }

    #[must_use]
    pub fn actions(&self) -> Vec<NativeAction> {
        self.lock()
            .requests
            .iter()
            .map(|request| request.action)
            .collect()
    }

    #[must_use]
    pub fn injections(&self) -> Vec<Injection> {
        self.lock().injections.clone()
    }

    #[must_use]
    pub fn window(&self) -> Option<LoopbackWindow> {
        self.lock().window.clone()
    }

    /// Simulates the user selecting tab `index`. Only an open window with the
    /// tab bar enabled reports it; returns whether an event was queued.
    pub fn tap_toolbar_item(&self, index: u32) -> bool {
        let mut state = self.lock();
        let tabbar = state
            .window
            .as_ref()
            .is_some_and(|window| window.options.tabbar);
        if tabbar {
            state.emit(&BrowserEvent::ToolbarItemTapped {
                index: i64::from(index),
            });
        } else {
            debug!("loopback ignoring tab {index} without a tab bar");
        }
        tabbar
    }

    #[must_use]
    pub fn has_event_sink(&self) -> bool {
        self.lock().event_sink.is_some()
    }

    fn lock(&self) -> MutexGuard<'_, LoopbackState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for LoopbackBridge {
    fn default() -> Self {
        Self::new()
    }
}

impl NativeBridge for LoopbackBridge {
    fn exec(&self, request: NativeRequest, callbacks: ExecCallbacks) {
        let mut state = self.lock();
        state.requests.push(request.clone());

        match request.action {
            NativeAction::Open => state.open(&request, callbacks),
            NativeAction::Close => state.close(),
            NativeAction::Show => {
                state.set_visible(true);
                state.acknowledge(Value::Null);
            }
            NativeAction::Hide => state.set_visible(false),
            NativeAction::LoadedStatus => state.emit(&BrowserEvent::LoadedStatus {
                loaded: self.loaded_token.clone(),
            }),
            NativeAction::NotifyStatus => state.emit(&BrowserEvent::NotifyStatus {
                notify: self.notify_value.clone(),
            }),
            NativeAction::InjectScriptCode
            | NativeAction::InjectScriptFile
            | NativeAction::InjectStyleCode
            | NativeAction::InjectStyleFile => state.inject(&request, callbacks),
        }
    }
}

impl LoopbackState {
    fn open(&mut self, request: &NativeRequest, callbacks: ExecCallbacks) {
        let url = request.str_arg(0).unwrap_or_default().to_owned();
        let target = WindowTarget::from_window_name(request.str_arg(1));
        let options = BrowserOptions::parse(request.str_arg(2).unwrap_or_default());

        if !target.opens_browser() {
            info!("loopback handing {url} to the system browser");
            if let Some(success) = callbacks.success {
                self.queue.push_back((success, json!("")));
            }
            return;
        }

        self.event_sink = Some(callbacks);
        if let Err(error) = Url::parse(&url) {
            self.window = None;
            self.emit_error(&BrowserEvent::LoadError {
                url,
                code: -1,
                message: error.to_string(),
            });
            return;
        }

        debug!("loopback opened {url} target={target} hidden={}", options.hidden);
        self.window = Some(LoopbackWindow {
            url: url.clone(),
            target,
            visible: !options.hidden,
            options,
        });
        self.acknowledge(json!(""));
        self.emit(&BrowserEvent::LoadStart { url: url.clone() });
        self.emit(&BrowserEvent::LoadStop { url });
    }

    fn close(&mut self) {
        if self.window.take().is_none() {
            return;
        }
        self.emit(&BrowserEvent::Exit);
        self.event_sink = None;
    }

    fn set_visible(&mut self, visible: bool) {
        if let Some(window) = self.window.as_mut() {
            window.visible = visible;
        }
    }

    fn inject(&mut self, request: &NativeRequest, callbacks: ExecCallbacks) {
        if self.window.is_none() {
            debug!("loopback ignoring {} without an open window", request.action.as_str());
            return;
        }
        self.injections.push(Injection {
            action: request.action,
            source: request.str_arg(0).unwrap_or_default().to_owned(),
        });
        if request.bool_arg(1)
            && let Some(success) = callbacks.success
        {
            self.queue.push_back((success, json!([])));
        }
    }

    fn emit(&mut self, event: &BrowserEvent) {
        self.acknowledge(event.to_value());
    }

    /// Plain result on the kept callback; carries no event.
    fn acknowledge(&mut self, payload: Value) {
        let sink = self
            .event_sink
            .as_ref()
            .and_then(|sink| sink.success.clone());
        if let Some(callback) = sink {
            self.queue.push_back((callback, payload));
        }
    }

    fn emit_error(&mut self, event: &BrowserEvent) {
        let sink = self
            .event_sink
            .as_ref()
            .and_then(|sink| sink.error.clone());
        if let Some(callback) = sink {
            self.queue.push_back((callback, event.to_value()));
        }
    }
}
