use std::{collections::BTreeSet, sync::Arc};

use tracing::{debug, info};
use url::Url;

use super::{facade::InAppBrowser, native::NativeBridge};
use crate::protocol::DEFAULT_SERVICE;

/// The host's own window-opening primitive, consulted before bridging.
pub trait WindowOpener: Send + Sync {
    type Window;

    /// Whether `name` already names a same-process window or frame.
    fn has_frame(&self, name: &str) -> bool;

    fn open_original(
        &self,
        url: &str,
        window_name: Option<&str>,
        features: Option<&str>,
    ) -> Self::Window;
}

pub trait UrlResolver: Send + Sync {
    fn make_absolute(&self, url: &str) -> String;
}

/// Resolves relative references against an optional document base.
/// Inputs that cannot be resolved pass through unchanged.
#[derive(Debug, Clone, Default)]
pub struct BaseUrlResolver {
    base: Option<Url>,
}

impl BaseUrlResolver {
    #[must_use]
    pub fn new(base: Option<Url>) -> Self {
        Self { base }
    }
}

impl UrlResolver for BaseUrlResolver {
    fn make_absolute(&self, url: &str) -> String {
        if let Ok(absolute) = Url::parse(url) {
            return absolute.to_string();
        }
        match self.base.as_ref().map(|base| base.join(url)) {
            Some(Ok(joined)) => joined.to_string(),
            _ => url.to_owned(),
        }
    }
}

/// What the original primitive hands back for a frame-targeted open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DelegatedWindow {
    pub url: String,
    pub window_name: String,
    pub features: Option<String>,
}

/// Opener backed by a fixed list of known frame names.
#[derive(Debug, Clone, Default)]
pub struct StaticFrames {
    names: BTreeSet<String>,
}

impl StaticFrames {
    #[must_use]
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }
}

impl WindowOpener for StaticFrames {
    type Window = DelegatedWindow;

    fn has_frame(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    fn open_original(
        &self,
        url: &str,
        window_name: Option<&str>,
        features: Option<&str>,
    ) -> Self::Window {
        DelegatedWindow {
            url: url.to_owned(),
            window_name: window_name.unwrap_or_default().to_owned(),
            features: features.map(str::to_owned),
        }
    }
}

#[derive(Debug)]
pub enum OpenOutcome<W> {
    Bridged(InAppBrowser),
    Delegated(W),
}

impl<W> OpenOutcome<W> {
    #[must_use]
    pub fn browser(self) -> Option<InAppBrowser> {
        match self {
            Self::Bridged(browser) => Some(browser),
            Self::Delegated(_) => None,
        }
    }

    #[must_use]
    pub fn is_delegated(&self) -> bool {
        matches!(self, Self::Delegated(_))
    }
}

/// Entry point that decides between the host primitive and a bridged
/// in-app browser.
pub struct BrowserLauncher<O> {
    service: String,
    bridge: Arc<dyn NativeBridge>,
    opener: O,
    resolver: Box<dyn UrlResolver>,
}

impl<O: WindowOpener> BrowserLauncher<O> {
    pub fn new(bridge: Arc<dyn NativeBridge>, opener: O) -> Self {
        Self {
            service: DEFAULT_SERVICE.to_owned(),
            bridge,
            opener,
            resolver: Box::new(BaseUrlResolver::default()),
        }
    }

    #[must_use]
    pub fn with_service(mut self, service: impl Into<String>) -> Self {
        self.service = service.into();
        self
    }

    #[must_use]
    pub fn with_resolver(mut self, resolver: impl UrlResolver + 'static) -> Self {
        self.resolver = Box::new(resolver);
        self
    }

    /// Frame-targeted calls go to the original primitive untouched, so
    /// same-process navigation is never hijacked. Everything else gets a new
    /// browser whose native window appears asynchronously.
    pub fn open(
        &self,
        url: &str,
        window_name: Option<&str>,
        features: Option<&str>,
    ) -> OpenOutcome<O::Window> {
        if let Some(name) = window_name.filter(|name| self.opener.has_frame(name)) {
            debug!("delegating open to existing frame {name}");
            return OpenOutcome::Delegated(self.opener.open_original(url, window_name, features));
        }

        let url = self.resolver.make_absolute(url);
        let browser = InAppBrowser::new(self.service.clone(), Arc::clone(&self.bridge));
        browser.start(&url, window_name, features.unwrap_or_default());
        info!("in-app browser {} requested", browser.id());
        OpenOutcome::Bridged(browser)
    }
}
