pub mod channel;
pub mod facade;
pub mod hub;
pub mod launcher;
pub mod native;

pub use channel::Listener;
pub use facade::{InAppBrowser, WeakInAppBrowser};
pub use hub::EventChannelHub;
pub use launcher::{
    BaseUrlResolver, BrowserLauncher, DelegatedWindow, OpenOutcome, StaticFrames, UrlResolver,
    WindowOpener,
};
pub use native::{ExecCallbacks, NativeBridge, ResultCallback};
