use std::{
    fs,
    path::{Path, PathBuf},
};

use clap::{Parser, ValueEnum};
use serde::Deserialize;
use url::Url;

use crate::{domain::error::BridgeError, protocol::DEFAULT_SERVICE};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    /// Exec frames on stdout, result frames on stdin.
    Stdio,
    /// In-process simulated native browser.
    Loopback,
}

impl Transport {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Stdio => "stdio",
            Self::Loopback => "loopback",
        }
    }
}

#[derive(Debug, Clone, Parser)]
#[command(
    name = "iab-bridge",
    version,
    about = "Open an in-app browser through a native bridge and relay its events"
)]
pub struct Args {
    #[arg(long, env = "IAB_CONFIG")]
    pub config: Option<PathBuf>,

    #[arg(long, env = "IAB_URL")]
    pub url: Option<String>,

    #[arg(long, env = "IAB_WINDOW_NAME")]
    pub window_name: Option<String>,

    #[arg(long, env = "IAB_FEATURES")]
    pub features: Option<String>,

    #[arg(long, env = "IAB_BASE_URL")]
    pub base_url: Option<String>,

    #[arg(long, env = "IAB_SERVICE")]
    pub service: Option<String>,

    /// Names of existing same-process frames; opens targeting them are
    /// delegated instead of bridged.
    #[arg(long = "frame", env = "IAB_FRAMES", value_delimiter = ',')]
    pub frames: Vec<String>,

    #[arg(long, env = "IAB_TRANSPORT", value_enum)]
    pub transport: Option<Transport>,

    #[arg(long, env = "IAB_INJECT_SCRIPT_FILE")]
    pub inject_script_file: Option<String>,

    #[arg(long, env = "IAB_INJECT_CSS_FILE")]
    pub inject_css_file: Option<String>,

    #[arg(long, env = "RUST_LOG", default_value = "info")]
    pub log_filter: String,

    #[arg(long, env = "IAB_JSON_LOGS", default_value_t = false)]
    pub json_logs: bool,
}

/// Optional TOML file supplying defaults for anything not given on the
/// command line or in the environment.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub url: Option<String>,
    pub window_name: Option<String>,
    pub features: Option<String>,
    pub base_url: Option<String>,
    pub service: Option<String>,
    pub frames: Vec<String>,
    pub transport: Option<Transport>,
    pub inject_script_file: Option<String>,
    pub inject_css_file: Option<String>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self, BridgeError> {
        let text = fs::read_to_string(path).map_err(|error| {
            BridgeError::Config(format!("failed to read {}: {error}", path.display()))
        })?;
        toml::from_str(&text).map_err(|error| {
            BridgeError::Config(format!("failed to parse {}: {error}", path.display()))
        })
    }
}

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub url: String,
    pub window_name: Option<String>,
    pub features: Option<String>,
    pub base_url: Option<Url>,
    pub service: String,
    pub frames: Vec<String>,
    pub transport: Transport,
    pub inject_script_file: Option<String>,
    pub inject_css_file: Option<String>,
    pub log_filter: String,
    pub json_logs: bool,
}

impl RuntimeConfig {
    pub fn from_args(args: Args) -> Result<Self, BridgeError> {
        let file = match &args.config {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };
        Self::merge(args, file)
    }

    fn merge(args: Args, file: FileConfig) -> Result<Self, BridgeError> {
        let url = normalize(args.url)
            .or_else(|| normalize(file.url))
            .ok_or_else(|| BridgeError::Config("url is required".to_owned()))?;

        let service = normalize(args.service)
            .or_else(|| normalize(file.service))
            .unwrap_or_else(|| DEFAULT_SERVICE.to_owned());

        let base_url = normalize(args.base_url)
            .or_else(|| normalize(file.base_url))
            .map(|raw| {
                Url::parse(&raw).map_err(|error| {
                    BridgeError::Config(format!("invalid base_url {raw}: {error}"))
                })
            })
            .transpose()?;

        let frames = if args.frames.is_empty() {
            file.frames
        } else {
            args.frames
        };
        let frames = frames.into_iter().filter_map(|name| normalize(Some(name))).collect();

        Ok(Self {
            url,
            window_name: normalize(args.window_name).or_else(|| normalize(file.window_name)),
            features: args.features.or(file.features),
            base_url,
            service,
            frames,
            transport: args.transport.or(file.transport).unwrap_or(Transport::Stdio),
            inject_script_file: normalize(args.inject_script_file)
                .or_else(|| normalize(file.inject_script_file)),
            inject_css_file: normalize(args.inject_css_file)
                .or_else(|| normalize(file.inject_css_file)),
            log_filter: args.log_filter,
            json_logs: args.json_logs,
        })
    }

    #[must_use]
    pub fn for_test(url: &str, transport: Transport) -> Self {
        Self {
            url: url.to_owned(),
            window_name: None,
            features: None,
            base_url: None,
            service: DEFAULT_SERVICE.to_owned(),
            frames: Vec::new(),
            transport,
            inject_script_file: None,
            inject_css_file: None,
            log_filter: "warn".to_owned(),
            json_logs: false,
        }
    }
}

fn normalize(input: Option<String>) -> Option<String> {
    input.and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_owned())
        }
    })
}
