//! Dialog integration tests
//!
//! Stacked dialogs driven through a real interaction thread.

mod common;

use common::{eventually, CallLog, DialogSpy, RecordingHost, ScreenSpy, TestView};
use serde_json::json;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use waypoint::platform::{logging, ThreadDispatcher};
use waypoint::ui::dialogs::{DialogController, DialogError, DialogOrchestrator, DialogState};
use waypoint::ui::screens::{ScreenError, ScreenRegistry};

fn registry(log: &Arc<CallLog>) -> ScreenRegistry {
    let mut registry = ScreenRegistry::new();
    for name in ["Confirm", "Picker"] {
        let log = Arc::clone(log);
        let view_id = format!("{}View", name);
        let view_name = view_id.clone();
        registry.register_dialog(
            name,
            view_id,
            move || Arc::new(DialogSpy::new(name, Arc::clone(&log))),
            move || Arc::new(TestView::new(view_name.clone())),
        );
    }

    let guarded_log = Arc::clone(log);
    registry.register_dialog(
        "Unsaved",
        "UnsavedView",
        move || {
            let spy = DialogSpy::new("Unsaved", Arc::clone(&guarded_log));
            spy.allow_close.store(false, Ordering::SeqCst);
            Arc::new(spy)
        },
        || Arc::new(TestView::new("UnsavedView")),
    );

    let screen_log = Arc::clone(log);
    registry.register_screen(
        "Home",
        "HomeView",
        move || Arc::new(ScreenSpy::new("Home", Arc::clone(&screen_log))),
        || Arc::new(TestView::new("HomeView")),
    );
    registry
}

fn build(log: &Arc<CallLog>) -> (DialogOrchestrator, Arc<RecordingHost>) {
    logging::init_for_tests();
    let dispatcher = Arc::new(ThreadDispatcher::spawn("ui").unwrap());
    let orchestrator = DialogOrchestrator::new(Arc::new(registry(log)), dispatcher);
    let host = RecordingHost::new();
    orchestrator.register_host(host.clone()).unwrap();
    (orchestrator, host)
}

fn top_spy(orchestrator: &DialogOrchestrator) -> Arc<dyn DialogController> {
    orchestrator.top_controller().expect("no open dialog")
}

fn open(
    orchestrator: &DialogOrchestrator,
    dialog: &'static str,
    parameters: Option<serde_json::Value>,
) -> tokio::task::JoinHandle<Result<serde_json::Value, DialogError>> {
    let orchestrator = orchestrator.clone();
    tokio::spawn(async move { orchestrator.show(dialog, parameters).await })
}

#[tokio::test]
async fn test_confirm_round_trip() {
    let log = CallLog::new();
    let (orchestrator, host) = build(&log);

    let shown = open(&orchestrator, "Confirm", Some(json!({ "message": "Delete?" })));
    eventually(|| orchestrator.depth() == 1).await;
    eventually(|| host.layers.lock().len() == 1).await;

    let controller = top_spy(&orchestrator);
    let confirm = controller.downcast_ref::<DialogSpy>().unwrap();
    assert_eq!(confirm.parameters(), Some(json!({ "message": "Delete?" })));

    let (id, _) = orchestrator.top_dialog().unwrap();
    assert_eq!(orchestrator.state_of(id), Some(DialogState::Open));

    assert!(confirm.close_with(json!({ "accepted": true })));
    let result = shown.await.unwrap().unwrap();

    assert_eq!(result, json!({ "accepted": true }));
    assert!(orchestrator.is_empty());
    assert!(host.layers.lock().is_empty());
    assert_eq!(
        log.calls(),
        vec![
            "Confirm.on_opened",
            "Confirm.can_close",
            "Confirm.on_closing",
            "Confirm.on_closed",
        ]
    );
    assert!(host
        .threads
        .lock()
        .iter()
        .all(|name| name.as_deref() == Some("ui")));
}

#[tokio::test]
async fn test_stacked_dialogs_close_lifo() {
    let log = CallLog::new();
    let (orchestrator, host) = build(&log);

    let first = open(&orchestrator, "Confirm", None);
    eventually(|| orchestrator.depth() == 1).await;
    let second = open(&orchestrator, "Picker", None);
    eventually(|| orchestrator.depth() == 2).await;
    eventually(|| host.layers.lock().len() == 2).await;

    assert_eq!(orchestrator.open_dialogs(), vec!["Confirm", "Picker"]);
    assert_eq!(*host.layers.lock(), vec!["ConfirmView", "PickerView"]);

    assert!(orchestrator.request_close(json!("picked")).await);
    assert_eq!(second.await.unwrap().unwrap(), json!("picked"));
    assert_eq!(orchestrator.open_dialogs(), vec!["Confirm"]);
    assert!(!first.is_finished());

    assert!(orchestrator.request_close(json!("confirmed")).await);
    assert_eq!(first.await.unwrap().unwrap(), json!("confirmed"));
    assert!(orchestrator.is_empty());

    let closed: Vec<String> = log
        .calls()
        .into_iter()
        .filter(|call| call.ends_with(".on_closed"))
        .collect();
    assert_eq!(closed, vec!["Picker.on_closed", "Confirm.on_closed"]);
}

#[tokio::test]
async fn test_nested_open_from_dialog_handler() {
    let log = CallLog::new();
    let (orchestrator, host) = build(&log);

    let outer = open(&orchestrator, "Confirm", None);
    eventually(|| orchestrator.depth() == 1).await;
    let confirm = top_spy(&orchestrator);

    // Button handler inside Confirm: ask the user to pick, then close with the pick.
    let handler = {
        let orchestrator = orchestrator.clone();
        tokio::spawn(async move {
            let picked = orchestrator.show("Picker", None).await?;
            let confirm = confirm.downcast_ref::<DialogSpy>().unwrap();
            Ok::<_, DialogError>(confirm.close_with(json!({ "picked": picked })))
        })
    };
    eventually(|| orchestrator.depth() == 2).await;
    assert_eq!(orchestrator.top_dialog().unwrap().1, "Picker");

    let picker = top_spy(&orchestrator);
    assert!(picker
        .downcast_ref::<DialogSpy>()
        .unwrap()
        .close_with(json!("blue")));

    assert!(handler.await.unwrap().unwrap());
    assert_eq!(outer.await.unwrap().unwrap(), json!({ "picked": "blue" }));
    assert!(orchestrator.is_empty());
    assert!(host.layers.lock().is_empty());
}

#[tokio::test]
async fn test_refusing_dialog_blocks_close() {
    let log = CallLog::new();
    let (orchestrator, _host) = build(&log);

    let below = open(&orchestrator, "Confirm", None);
    eventually(|| orchestrator.depth() == 1).await;
    let unsaved = open(&orchestrator, "Unsaved", None);
    eventually(|| orchestrator.depth() == 2).await;

    // Requests always target the top, so the dialog below cannot be closed either.
    assert!(!orchestrator.request_close(json!("discard")).await);
    assert!(!orchestrator.request_close(json!("discard")).await);
    assert_eq!(orchestrator.depth(), 2);
    assert_eq!(log.count("Unsaved.can_close"), 2);
    assert_eq!(log.count("Confirm.can_close"), 0);
    assert!(!unsaved.is_finished());

    let controller = top_spy(&orchestrator);
    controller
        .downcast_ref::<DialogSpy>()
        .unwrap()
        .allow_close
        .store(true, Ordering::SeqCst);

    assert!(orchestrator.request_close(json!("saved")).await);
    assert_eq!(unsaved.await.unwrap().unwrap(), json!("saved"));
    assert_eq!(orchestrator.open_dialogs(), vec!["Confirm"]);

    assert!(orchestrator.request_close(json!(null)).await);
    assert_eq!(below.await.unwrap().unwrap(), json!(null));
}

#[tokio::test]
async fn test_screen_identifier_is_not_a_dialog() {
    let log = CallLog::new();
    let (orchestrator, host) = build(&log);

    let result = orchestrator.show("Home", None).await;
    assert!(matches!(
        result,
        Err(DialogError::Screen(ScreenError::NotDialogAware(_)))
    ));
    assert!(orchestrator.is_empty());
    assert!(host.layers.lock().is_empty());
}

#[tokio::test]
async fn test_typed_result() {
    #[derive(serde::Deserialize, Debug, PartialEq)]
    struct Answer {
        accepted: bool,
    }

    let log = CallLog::new();
    let (orchestrator, _host) = build(&log);

    let shown = {
        let orchestrator = orchestrator.clone();
        tokio::spawn(async move { orchestrator.show_as::<Answer>("Confirm", None).await })
    };
    eventually(|| orchestrator.depth() == 1).await;
    assert!(orchestrator.request_close(json!({ "accepted": false })).await);

    assert_eq!(shown.await.unwrap().unwrap(), Answer { accepted: false });
}
