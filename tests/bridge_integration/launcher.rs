use std::sync::{Arc, Mutex};

use inappbrowser_bridge::{
    bridge::{
        BaseUrlResolver, BrowserLauncher, DelegatedWindow, Listener, OpenOutcome, StaticFrames,
    },
    domain::{error::BridgeError, models::InjectDetails},
    interfaces::loopback::LoopbackBridge,
    protocol::{BrowserEvent, ChannelName, NativeAction},
};
use serde_json::{Value, json};
use url::Url;

use super::support::{loopback_launcher, record_all};

#[test]
fn frame_targeted_open_is_delegated_without_a_bridge() {
    let (launcher, bridge) = loopback_launcher(&["sidebar"]);

    let outcome = launcher.open("page.html", Some("sidebar"), Some("location=no"));

    match outcome {
        OpenOutcome::Delegated(window) => assert_eq!(
            window,
            DelegatedWindow {
                url: "page.html".to_owned(),
                window_name: "sidebar".to_owned(),
                features: Some("location=no".to_owned()),
            }
        ),
        OpenOutcome::Bridged(_) => panic!("frame-targeted open should not be bridged"),
    }
    assert!(bridge.requests().is_empty());
}

#[test]
fn open_resolves_relative_urls_and_defaults_features() {
    let bridge = Arc::new(LoopbackBridge::new());
    let base = Url::parse("file:///app/www/index.html").expect("base url");
    let launcher = BrowserLauncher::new(bridge.clone(), StaticFrames::default())
        .with_service("Shotbow")
        .with_resolver(BaseUrlResolver::new(Some(base)));

    let outcome = launcher.open("help.html", Some("_blank"), None);
    assert!(!outcome.is_delegated());

    let requests = bridge.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].service, "Shotbow");
    assert_eq!(requests[0].action, NativeAction::Open);
    assert_eq!(
        requests[0].args,
        vec![json!("file:///app/www/help.html"), json!("_blank"), json!("")]
    );
}

#[test]
fn listeners_registered_after_open_see_load_events() {
    let (launcher, bridge) = loopback_launcher(&[]);
    let browser = launcher
        .open("https://a.test/", None, None)
        .browser()
        .expect("browser expected");
    let seen = record_all(&browser);

    bridge.run_pending();
    browser.close();
    bridge.run_pending();

    assert_eq!(
        *seen.lock().expect("event log lock"),
        vec![
            BrowserEvent::LoadStart {
                url: "https://a.test/".to_owned()
            },
            BrowserEvent::LoadStop {
                url: "https://a.test/".to_owned()
            },
            BrowserEvent::Exit,
        ]
    );
}

#[test]
fn removed_listener_misses_later_events() {
    let (launcher, bridge) = loopback_launcher(&[]);
    let browser = launcher
        .open("https://a.test/", None, None)
        .browser()
        .expect("browser expected");

    let hits = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&hits);
    let listener = Listener::new(move |event| {
        sink.lock().expect("hits lock").push(event.channel());
    });
    browser.add_event_listener("loadstart", &listener);
    browser.add_event_listener("loadstop", &listener);
    browser.add_event_listener("notifyStatus", &listener);
    browser.add_event_listener("unload", &listener);

    bridge.run_pending();
    browser.remove_event_listener("loadstop", &listener);
    browser.remove_event_listener("unload", &listener);
    browser.handle_event(&json!({"type": "loadstop", "url": "https://a.test/next"}));
    browser.notify_status();
    bridge.run_pending();

    assert_eq!(
        *hits.lock().expect("hits lock"),
        vec![
            ChannelName::LoadStart,
            ChannelName::LoadStop,
            ChannelName::NotifyStatus
        ]
    );
}

#[test]
fn duplicate_exit_listener_runs_per_registration() {
    let (launcher, bridge) = loopback_launcher(&[]);
    let browser = launcher
        .open("https://a.test/", None, None)
        .browser()
        .expect("browser expected");

    let hits = Arc::new(Mutex::new(0));
    let counter = Arc::clone(&hits);
    let listener = Listener::new(move |_| *counter.lock().expect("hits lock") += 1);
    browser.add_event_listener("exit", &listener);
    browser.add_event_listener("exit", &listener);

    browser.close();
    bridge.run_pending();

    assert_eq!(*hits.lock().expect("hits lock"), 2);
}

#[test]
fn toolbar_taps_reach_the_toolbar_channel() {
    let (launcher, bridge) = loopback_launcher(&[]);
    let browser = launcher
        .open("https://a.test/", None, Some("tabbar=yes"))
        .browser()
        .expect("browser expected");
    let seen = record_all(&browser);
    bridge.run_pending();
    seen.lock().expect("event log lock").clear();

    browser.hide();
    browser.show();
    assert!(bridge.tap_toolbar_item(0));
    assert!(bridge.tap_toolbar_item(3));
    bridge.run_pending();

    assert_eq!(
        *seen.lock().expect("event log lock"),
        vec![
            BrowserEvent::ToolbarItemTapped { index: 0 },
            BrowserEvent::ToolbarItemTapped { index: 3 },
        ]
    );
}

#[test]
fn toolbar_taps_are_silent_without_a_tab_bar() {
    let (launcher, bridge) = loopback_launcher(&[]);
    let browser = launcher
        .open("https://a.test/", None, Some("tabbar=no"))
        .browser()
        .expect("browser expected");
    let seen = record_all(&browser);
    bridge.run_pending();

    assert!(!bridge.tap_toolbar_item(0));
    bridge.run_pending();

    assert!(
        !seen
            .lock()
            .expect("event log lock")
            .iter()
            .any(|event| event.channel() == ChannelName::ToolbarItemTapped)
    );
}

#[test]
fn injection_contract_holds_end_to_end() {
    let (launcher, bridge) = loopback_launcher(&[]);
    let browser = launcher
        .open("https://a.test/", None, None)
        .browser()
        .expect("browser expected");

    let empty = browser.execute_script(&InjectDetails::default(), None);
    assert!(matches!(empty, Err(BridgeError::InvalidArgument(_))));
    let empty = browser.insert_css(&InjectDetails::default(), None);
    assert!(matches!(empty, Err(BridgeError::InvalidArgument(_))));
    assert_eq!(bridge.actions(), vec![NativeAction::Open]);

    let answers = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&answers);
    browser
        .execute_script(
            &InjectDetails {
                code: Some("document.title".to_owned()),
                file: Some("ignored.js".to_owned()),
            },
            Some(Arc::new(move |value: Value| {
                sink.lock().expect("answers lock").push(value);
            })),
        )
        .expect("script injection should be accepted");
    bridge.run_pending();

    assert_eq!(
        bridge.actions(),
        vec![NativeAction::Open, NativeAction::InjectScriptCode]
    );
    assert_eq!(bridge.injections()[0].source, "document.title");
    assert_eq!(*answers.lock().expect("answers lock"), vec![json!([])]);
}
