use inappbrowser_bridge::application::{
    config::{RuntimeConfig, Transport},
    startup::{self, RunOutcome},
};
use serde_json::json;
use tokio::io::{AsyncBufReadExt, BufReader, duplex};

use super::support::{FRAME_TIMEOUT, next_frame, send_frame};

#[tokio::test]
async fn session_relays_events_until_exit() {
    let (bridge_reader, mut native_writer) = duplex(16 * 1024);
    let (bridge_writer, native_reader) = duplex(16 * 1024);
    let mut config = RuntimeConfig::for_test("https://a.test/start", Transport::Stdio);
    config.inject_script_file = Some("https://a.test/app.js".to_owned());

    let session = tokio::spawn(startup::run_stdio(
        config,
        bridge_reader,
        bridge_writer,
        std::future::pending(),
    ));
    let mut lines = BufReader::new(native_reader).lines();

    let open = next_frame(&mut lines).await.expect("open frame expected");
    assert_eq!(open["type"], "exec");
    assert_eq!(open["service"], "InAppBrowserBeta");
    assert_eq!(open["action"], "open");
    assert_eq!(open["args"], json!(["https://a.test/start", null, ""]));
    let callback_id = open["callbackId"]
        .as_str()
        .expect("open should carry a callback id")
        .to_owned();

    send_frame(
        &mut native_writer,
        &json!({
            "type": "result",
            "callbackId": callback_id,
            "status": "ok",
            "keepCallback": true,
            "payload": {"type": "loadstop", "url": "https://a.test/start"}
        }),
    )
    .await;

    let inject = next_frame(&mut lines).await.expect("inject frame expected");
    assert_eq!(inject["action"], "injectScriptFile");
    assert_eq!(inject["args"], json!(["https://a.test/app.js", false]));
    assert!(inject.get("callbackId").is_none());

    send_frame(&mut native_writer, &json!({"type": "bogus"})).await;
    send_frame(
        &mut native_writer,
        &json!({
            "type": "result",
            "callbackId": callback_id,
            "status": "ok",
            "payload": {"type": "exit"}
        }),
    )
    .await;

    let outcome = tokio::time::timeout(FRAME_TIMEOUT, session)
        .await
        .expect("session should finish")
        .expect("session task should join")
        .expect("session should succeed");
    assert_eq!(outcome, RunOutcome::Exited);
    assert!(next_frame(&mut lines).await.is_none());
}

#[tokio::test]
async fn session_detaches_when_native_input_ends() {
    let (bridge_reader, native_writer) = duplex(4 * 1024);
    let (bridge_writer, native_reader) = duplex(4 * 1024);
    let config = RuntimeConfig::for_test("https://a.test/", Transport::Stdio);

    let session = tokio::spawn(startup::run_stdio(
        config,
        bridge_reader,
        bridge_writer,
        std::future::pending(),
    ));
    let mut lines = BufReader::new(native_reader).lines();
    let open = next_frame(&mut lines).await.expect("open frame expected");
    assert_eq!(open["action"], "open");

    drop(native_writer);

    let outcome = tokio::time::timeout(FRAME_TIMEOUT, session)
        .await
        .expect("session should finish")
        .expect("session task should join")
        .expect("session should succeed");
    assert_eq!(outcome, RunOutcome::Detached);
}

#[tokio::test]
async fn shutdown_closes_the_browser() {
    let (bridge_reader, _native_writer) = duplex(4 * 1024);
    let (bridge_writer, native_reader) = duplex(4 * 1024);
    let config = RuntimeConfig::for_test("https://a.test/", Transport::Stdio);
    let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();

    let session = tokio::spawn(startup::run_stdio(
        config,
        bridge_reader,
        bridge_writer,
        async move {
            let _ = stop_rx.await;
        },
    ));
    let mut lines = BufReader::new(native_reader).lines();
    let open = next_frame(&mut lines).await.expect("open frame expected");
    assert_eq!(open["action"], "open");

    stop_tx.send(()).expect("shutdown should send");

    let close = next_frame(&mut lines).await.expect("close frame expected");
    assert_eq!(close["action"], "close");
    assert_eq!(close["args"], json!([]));

    let outcome = tokio::time::timeout(FRAME_TIMEOUT, session)
        .await
        .expect("session should finish")
        .expect("session task should join")
        .expect("session should succeed");
    assert_eq!(outcome, RunOutcome::Detached);
}

#[tokio::test]
async fn frame_targeted_open_writes_nothing() {
    let (bridge_reader, _native_writer) = duplex(4 * 1024);
    let (bridge_writer, native_reader) = duplex(4 * 1024);
    let mut config = RuntimeConfig::for_test("https://a.test/", Transport::Stdio);
    config.frames = vec!["sidebar".to_owned()];
    config.window_name = Some("sidebar".to_owned());

    let outcome = startup::run_stdio(config, bridge_reader, bridge_writer, std::future::pending())
        .await
        .expect("session should succeed");

    assert_eq!(outcome, RunOutcome::Delegated);
    let mut lines = BufReader::new(native_reader).lines();
    assert!(next_frame(&mut lines).await.is_none());
}
