use std::{future::Future, sync::Arc};

use tokio::{
    io::{AsyncRead, AsyncWrite},
    sync::Notify,
};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use crate::{
    application::config::{Args, RuntimeConfig, Transport},
    bridge::{
        BaseUrlResolver, BrowserLauncher, InAppBrowser, NativeBridge, OpenOutcome, StaticFrames,
    },
    domain::{error::BridgeError, models::InjectDetails},
    interfaces::{
        loopback::LoopbackBridge,
        stdio::{self, StdioBridge},
    },
    protocol::{BrowserEvent, ChannelName},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The native side reported `exit`.
    Exited,
    /// The window name matched an existing frame; nothing was bridged.
    Delegated,
    /// Input ended or shutdown was requested before `exit`.
    Detached,
}

pub async fn run(args: Args) -> Result<RunOutcome, BridgeError> {
    let config = RuntimeConfig::from_args(args)?;
    init_logging(&config.log_filter, config.json_logs)?;

    info!(
        "starting iab-bridge transport={} service={}",
        config.transport.label(),
        config.service
    );

    match config.transport {
        Transport::Stdio => {
            run_stdio(config, tokio::io::stdin(), tokio::io::stdout(), shutdown_signal()).await
        }
        Transport::Loopback => Ok(run_loopback(&config, &Arc::new(LoopbackBridge::new()))),
    }
}

/// Bridges over a reader/writer pair until the browser exits, the input ends
/// or `shutdown` resolves. On shutdown the browser is asked to close first.
pub async fn run_stdio<R, W>(
    config: RuntimeConfig,
    reader: R,
    writer: W,
    shutdown: impl Future<Output = ()>,
) -> Result<RunOutcome, BridgeError>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (bridge, frames) = StdioBridge::new();
    let bridge = Arc::new(bridge);
    let writer_task = tokio::spawn(stdio::write_frames(frames, writer));

    let launcher = launcher_for(&config, bridge.clone());
    let outcome = match launcher.open(
        &config.url,
        config.window_name.as_deref(),
        config.features.as_deref(),
    ) {
        OpenOutcome::Bridged(browser) => {
            let exited = Arc::new(Notify::new());
            attach_listeners(&browser, &config, Some(Arc::clone(&exited)));

            tokio::select! {
                result = stdio::read_results(&bridge, reader) => {
                    result?;
                    RunOutcome::Detached
                }
                () = exited.notified() => RunOutcome::Exited,
                () = shutdown => {
                    info!("shutdown requested; closing browser {}", browser.id());
                    browser.close();
                    RunOutcome::Detached
                }
            }
        }
        OpenOutcome::Delegated(window) => {
            info!(
                "open delegated to existing frame {} url={}",
                window.window_name, window.url
            );
            RunOutcome::Delegated
        }
    };

    drop(launcher);
    bridge.disconnect();
    match writer_task.await {
        Ok(result) => result?,
        Err(error) => warn!("frame writer task failed: {error}"),
    }

    info!("iab-bridge finished outcome={outcome:?}");
    Ok(outcome)
}

/// Drives a full browser session against the in-process native stand-in:
/// open, status probes, close.
pub fn run_loopback(config: &RuntimeConfig, bridge: &Arc<LoopbackBridge>) -> RunOutcome {
    let launcher = launcher_for(config, bridge.clone());
    let browser = match launcher.open(
        &config.url,
        config.window_name.as_deref(),
        config.features.as_deref(),
    ) {
        OpenOutcome::Bridged(browser) => browser,
        OpenOutcome::Delegated(window) => {
            info!("open delegated to existing frame {}", window.window_name);
            return RunOutcome::Delegated;
        }
    };

    attach_listeners(&browser, config, None);
    bridge.run_pending();

    browser.loaded_status();
    browser.notify_status();
    browser.close();
    bridge.run_pending();

    let outcome = if bridge.has_event_sink() {
        RunOutcome::Detached
    } else {
        RunOutcome::Exited
    };
    info!(
        "loopback session finished requests={} outcome={outcome:?}",
        bridge.requests().len()
    );
    outcome
}

fn launcher_for(
    config: &RuntimeConfig,
    bridge: Arc<dyn NativeBridge>,
) -> BrowserLauncher<StaticFrames> {
    BrowserLauncher::new(bridge, StaticFrames::new(config.frames.iter().cloned()))
        .with_service(config.service.clone())
        .with_resolver(BaseUrlResolver::new(config.base_url.clone()))
}

/// Logs every channel, injects configured resources after each page load
/// and signals `exited` when the browser reports `exit`.
pub fn attach_listeners(
    browser: &InAppBrowser,
    config: &RuntimeConfig,
    exited: Option<Arc<Notify>>,
) {
    let id = browser.id();
    for channel in ChannelName::ALL {
        browser.on(channel, move |event| {
            info!("browser {id} {channel}: {}", event.to_value());
        });
    }

    if config.inject_script_file.is_some() || config.inject_css_file.is_some() {
        let script = config.inject_script_file.clone();
        let css = config.inject_css_file.clone();
        let target = browser.downgrade();
        browser.on(ChannelName::LoadStop, move |_| {
            if let Some(target) = target.upgrade() {
                inject_resources(&target, script.as_deref(), css.as_deref());
            }
        });
    }

    if let Some(exited) = exited {
        browser.on(ChannelName::Exit, move |event: &BrowserEvent| {
            if matches!(event, BrowserEvent::Exit) {
                exited.notify_one();
            }
        });
    }
}

fn inject_resources(browser: &InAppBrowser, script: Option<&str>, css: Option<&str>) {
    if let Some(file) = script
        && let Err(error) = browser.execute_script(&InjectDetails::file(file), None)
    {
        warn!("script injection failed: {error}");
    }
    if let Some(file) = css
        && let Err(error) = browser.insert_css(&InjectDetails::file(file), None)
    {
        warn!("style injection failed: {error}");
    }
}

fn init_logging(filter: &str, json_logs: bool) -> Result<(), BridgeError> {
    let env_filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    if json_logs {
        builder.json().try_init().map_err(|error| {
            BridgeError::Unavailable(format!("failed to initialize logger: {error}"))
        })?;
    } else {
        builder.compact().try_init().map_err(|error| {
            BridgeError::Unavailable(format!("failed to initialize logger: {error}"))
        })?;
    }

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("shutdown signal received");
}
