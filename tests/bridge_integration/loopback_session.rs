use std::sync::Arc;

use inappbrowser_bridge::{
    application::{
        config::{RuntimeConfig, Transport},
        startup::{self, RunOutcome},
    },
    interfaces::loopback::LoopbackBridge,
    protocol::NativeAction,
};

#[test]
fn loopback_session_runs_open_to_exit() {
    let bridge = Arc::new(LoopbackBridge::with_status("page-token", "true"));
    let mut config = RuntimeConfig::for_test("https://a.test/", Transport::Loopback);
    config.features = Some("hidden=yes,closebuttoncaption=Back".to_owned());
    config.inject_css_file = Some("https://a.test/site.css".to_owned());

    let outcome = startup::run_loopback(&config, &bridge);

    assert_eq!(outcome, RunOutcome::Exited);
    assert_eq!(
        bridge.actions(),
        vec![
            NativeAction::Open,
            NativeAction::InjectStyleFile,
            NativeAction::LoadedStatus,
            NativeAction::NotifyStatus,
            NativeAction::Close,
        ]
    );
    assert_eq!(bridge.injections()[0].source, "https://a.test/site.css");
    assert!(bridge.window().is_none());
    assert!(!bridge.has_event_sink());
    assert_eq!(Arc::strong_count(&bridge), 1);
}

#[test]
fn loopback_session_honours_frame_delegation() {
    let bridge = Arc::new(LoopbackBridge::new());
    let mut config = RuntimeConfig::for_test("https://a.test/", Transport::Loopback);
    config.frames = vec!["sidebar".to_owned()];
    config.window_name = Some("sidebar".to_owned());

    assert_eq!(startup::run_loopback(&config, &bridge), RunOutcome::Delegated);
    assert!(bridge.requests().is_empty());
}
