use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use inappbrowser_bridge::{
    bridge::{BrowserLauncher, InAppBrowser, StaticFrames},
    interfaces::loopback::LoopbackBridge,
    protocol::{BrowserEvent, ChannelName},
};
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, DuplexStream, Lines};

pub(crate) const FRAME_TIMEOUT: Duration = Duration::from_secs(5);

pub(crate) fn loopback_launcher(
    frames: &[&str],
) -> (BrowserLauncher<StaticFrames>, Arc<LoopbackBridge>) {
    let bridge = Arc::new(LoopbackBridge::new());
    let launcher = BrowserLauncher::new(
        bridge.clone(),
        StaticFrames::new(frames.iter().copied()),
    );
    (launcher, bridge)
}

pub(crate) fn record_all(browser: &InAppBrowser) -> Arc<Mutex<Vec<BrowserEvent>>> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    for channel in ChannelName::ALL {
        let sink = Arc::clone(&seen);
        browser.on(channel, move |event| {
            sink.lock().expect("event log lock").push(event.clone());
        });
    }
    seen
}

pub(crate) async fn next_frame(lines: &mut Lines<BufReader<DuplexStream>>) -> Option<Value> {
    let line = tokio::time::timeout(FRAME_TIMEOUT, lines.next_line())
        .await
        .expect("frame should arrive before timeout")
        .expect("native side read should succeed")?;
    Some(serde_json::from_str(&line).expect("exec frame should be json"))
}

pub(crate) async fn send_frame(writer: &mut DuplexStream, frame: &Value) {
    let mut line = frame.to_string();
    line.push('\n');
    writer
        .write_all(line.as_bytes())
        .await
        .expect("result frame should write");
}
