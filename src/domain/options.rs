use std::collections::BTreeMap;

pub const DEFAULT_CLOSE_BUTTON_CAPTION: &str = "Done";

const LOCATION: &str = "location";
const HIDDEN: &str = "hidden";
const CLEAR_ALL_CACHE: &str = "clearcache";
const CLEAR_SESSION_CACHE: &str = "clearsessioncache";
const TOOLBAR: &str = "toolbar";
const TABBAR: &str = "tabbar";
const CLOSE_BUTTON_CAPTION: &str = "closebuttoncaption";

/// Browser window options parsed from a `key=value,key=value` feature string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserOptions {
    pub location: bool,
    pub hidden: bool,
    pub clear_cache: bool,
    pub clear_session_cache: bool,
    pub toolbar: bool,
    pub tabbar: bool,
    pub close_button_caption: String,
    pub extra: BTreeMap<String, bool>,
}

impl Default for BrowserOptions {
    fn default() -> Self {
        Self {
            location: true,
            hidden: false,
            clear_cache: false,
            clear_session_cache: false,
            toolbar: true,
            tabbar: true,
            close_button_caption: DEFAULT_CLOSE_BUTTON_CAPTION.to_owned(),
            extra: BTreeMap::new(),
        }
    }
}

impl BrowserOptions {
    /// Any value other than `no` switches a flag on. Segments without `=` are
    /// skipped and the literal `null` yields the defaults.
    #[must_use]
    pub fn parse(features: &str) -> Self {
        let mut options = Self::default();
        let features = features.trim();
        if features.is_empty() || features == "null" {
            return options;
        }

        for segment in features.split(',') {
            let Some((key, value)) = segment.split_once('=') else {
                continue;
            };
            let key = key.trim();
            let value = value.trim();
            if key.is_empty() {
                continue;
            }

            if key.eq_ignore_ascii_case(CLOSE_BUTTON_CAPTION) {
                options.close_button_caption = value.to_owned();
                continue;
            }

            let enabled = value != "no";
            match key {
                LOCATION => options.location = enabled,
                HIDDEN => options.hidden = enabled,
                CLEAR_ALL_CACHE => options.clear_cache = enabled,
                CLEAR_SESSION_CACHE => options.clear_session_cache = enabled,
                TOOLBAR => options.toolbar = enabled,
                TABBAR => options.tabbar = enabled,
                _ => {
                    options.extra.insert(key.to_owned(), enabled);
                }
            }
        }

        options
    }
}
