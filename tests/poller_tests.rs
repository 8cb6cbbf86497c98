
use serde_json::json;
use std::sync::atomic::Ordering;
use std::time::Duration;
use task_status_monitor::app::PageState;
use task_status_monitor::config::Variant;
use task_status_monitor::status::{
    Details, PollOutcome, Poller, StateLabel, SurfaceUpdate,
};
use test_harness::{
    fast_config, pending, progress, reply, unavailable, unreachable_script, ScriptedSource,
};
use tokio_util::sync::CancellationToken;

#[tokio::test]
async fn test_results_stop_after_fifty_unresolved_polls() {
    let source = ScriptedSource::new(Vec::new(), pending);
    let calls = source.calls();
    let mut poller = Poller::new(source, fast_config(Variant::Results));
    let mut surface: Vec<SurfaceUpdate> = Vec::new();

    let outcome = poller.run(&mut surface).await;

    assert_eq!(outcome, PollOutcome::Exhausted { attempts: 50 });
    assert_eq!(calls.load(Ordering::SeqCst), 50);
    assert_eq!(
        surface.last(),
        Some(&SurfaceUpdate::StateLabel(StateLabel::TimedOut))
    );
}

#[tokio::test]
async fn test_attempt_counter_resets_per_run() {
    let source = ScriptedSource::new(Vec::new(), pending);
    let calls = source.calls();
    let config = fast_config(Variant::Results).with_max_attempts(3);
    let mut poller = Poller::new(source, config);

    let mut first = PageState::default();
    assert_eq!(
        poller.run(&mut first).await,
        PollOutcome::Exhausted { attempts: 3 }
    );

    let mut second = PageState::default();
    assert_eq!(
        poller.run(&mut second).await,
        PollOutcome::Exhausted { attempts: 3 }
    );
    assert_eq!(calls.load(Ordering::SeqCst), 6);
    assert_eq!(second.state_label, Some(StateLabel::TimedOut));
}

#[tokio::test]
async fn test_results_success_renders_table() {
    let script = vec![
        pending(),
        progress(1, 2),
        reply("SUCCESS", json!([["A", "B"], ["1", "2"], ["3", "4"]])),
    ];
    let source = ScriptedSource::new(script, unreachable_script);
    let mut poller = Poller::new(source, fast_config(Variant::Results));
    let mut page = PageState::default();

    let outcome = poller.run(&mut page).await;

    assert_eq!(outcome, PollOutcome::Finished { attempts: 3 });
    assert_eq!(page.progress_width, 100.0);
    assert_eq!(page.state_label, Some(StateLabel::Success));
    let Some(Details::Table(table)) = &page.details else {
        panic!("expected a table, got {:?}", page.details);
    };
    assert_eq!(table.headers, vec!["A", "B"]);
    assert_eq!(table.rows, vec![vec!["1", "2"], vec!["3", "4"]]);
    assert!(page.reference.is_none());
}

#[tokio::test]
async fn test_ragged_rows_match_header_width() {
    let script = vec![reply("SUCCESS", json!([["A", "B"], ["1"], ["2", "3"]]))];
    let source = ScriptedSource::new(script, unreachable_script);
    let mut poller = Poller::new(source, fast_config(Variant::Results));
    let mut page = PageState::default();

    let outcome = poller.run(&mut page).await;

    assert_eq!(outcome, PollOutcome::Finished { attempts: 1 });
    let Some(Details::Table(table)) = &page.details else {
        panic!("expected a table, got {:?}", page.details);
    };
    assert_eq!(table.rows, vec![vec!["1", ""], vec!["2", "3"]]);
    assert!(table
        .rows
        .iter()
        .all(|row| row.len() == table.column_count()));
}

#[tokio::test]
async fn test_row_wider_than_header_is_malformed() {
    let script = vec![reply("SUCCESS", json!([["A", "B"], ["1"], ["2", "3", "4"]]))];
    let source = ScriptedSource::new(script, unreachable_script);
    let mut poller = Poller::new(source, fast_config(Variant::Results));
    let mut page = PageState::default();

    let outcome = poller.run(&mut page).await;

    assert!(matches!(outcome, PollOutcome::Malformed { attempts: 1, .. }));
    assert_eq!(page.state_label, Some(StateLabel::Failure));
    let Some(Details::Error(detail)) = &page.details else {
        panic!("expected error details, got {:?}", page.details);
    };
    assert!(detail.contains("row 2"));
}

#[tokio::test]
async fn test_task_polls_past_fifty_until_error() {
    let mut script = Vec::new();
    for i in 0..120 {
        script.push(if i % 2 == 0 { pending() } else { progress(i, 120) });
    }
    script.push(reply("SUCCESS", json!({"error": true})));

    let source = ScriptedSource::new(script, unreachable_script);
    let calls = source.calls();
    let mut poller = Poller::new(source, fast_config(Variant::Task));
    let mut page = PageState::default();

    let outcome = poller.run(&mut page).await;

    assert_eq!(outcome, PollOutcome::Finished { attempts: 121 });
    assert_eq!(calls.load(Ordering::SeqCst), 121);
    assert_eq!(page.state_label, Some(StateLabel::Failure));
    assert_eq!(page.progress_message, "Error");
    assert!(!page.progress_active);
    assert!(!page.continue_enabled);
}

#[tokio::test]
async fn test_task_success_stores_reference() {
    let script = vec![
        progress(2, 4),
        reply("SUCCESS", json!({"error": false, "s3_path": "bucket/key"})),
    ];
    let source = ScriptedSource::new(script, unreachable_script);
    let mut poller = Poller::new(source, fast_config(Variant::Task));
    let mut page = PageState::default();

    poller.run(&mut page).await;

    assert_eq!(page.reference.as_deref(), Some("bucket/key"));
    assert!(page.continue_enabled);
    assert_eq!(page.progress_message, "Finished");
    assert_eq!(page.state_label, Some(StateLabel::Success));
}

#[tokio::test]
async fn test_failure_status_halts_on_first_observation() {
    let script = vec![reply("FAILURE", json!("Table already exists"))];
    let source = ScriptedSource::new(script, unreachable_script);
    let calls = source.calls();
    let mut poller = Poller::new(source, fast_config(Variant::Results));
    let mut page = PageState::default();

    let outcome = poller.run(&mut page).await;

    assert_eq!(outcome, PollOutcome::Finished { attempts: 1 });
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(page.state_label, Some(StateLabel::Failure));
    assert_eq!(
        page.details,
        Some(Details::Error("Table already exists".to_string()))
    );
}

#[tokio::test]
async fn test_transport_errors_are_retried() {
    let script = vec![
        unavailable(),
        unavailable(),
        reply("SUCCESS", json!([["only"]])),
    ];
    let source = ScriptedSource::new(script, unreachable_script);
    let mut poller = Poller::new(source, fast_config(Variant::Results));
    let mut page = PageState::default();

    let outcome = poller.run(&mut page).await;

    assert_eq!(outcome, PollOutcome::Finished { attempts: 3 });
    assert_eq!(page.state_label, Some(StateLabel::Success));
}

#[tokio::test]
async fn test_transport_errors_surface_after_retries() {
    let source = ScriptedSource::new(Vec::new(), unavailable);
    let calls = source.calls();
    let mut poller = Poller::new(source, fast_config(Variant::Task));
    let mut page = PageState::default();

    let outcome = poller.run(&mut page).await;

    let PollOutcome::RequestFailed { attempts, error } = outcome else {
        panic!("expected RequestFailed, got {outcome:?}");
    };
    assert_eq!(attempts, 4);
    assert!(error.contains("503"));
    assert_eq!(calls.load(Ordering::SeqCst), 4);
    assert_eq!(page.state_label, Some(StateLabel::RequestFailed));
    assert!(matches!(page.details, Some(Details::Error(ref e)) if e.contains("503")));
}

#[tokio::test]
async fn test_malformed_progress_is_terminal() {
    let script = vec![reply("PROGRESS", json!({"current": 1}))];
    let source = ScriptedSource::new(script, unreachable_script);
    let mut poller = Poller::new(source, fast_config(Variant::Results));
    let mut page = PageState::default();

    let outcome = poller.run(&mut page).await;

    assert!(matches!(outcome, PollOutcome::Malformed { attempts: 1, .. }));
    assert_eq!(page.state_label, Some(StateLabel::Failure));
    let Some(Details::Error(detail)) = &page.details else {
        panic!("expected error details");
    };
    assert!(detail.starts_with("malformed status payload"));
}

#[tokio::test]
async fn test_cancelled_before_start_issues_no_request() {
    let source = ScriptedSource::new(Vec::new(), unreachable_script);
    let calls = source.calls();
    let cancel = CancellationToken::new();
    cancel.cancel();
    let mut poller = Poller::with_cancellation(source, fast_config(Variant::Task), cancel);
    let mut surface: Vec<SurfaceUpdate> = Vec::new();

    let outcome = poller.run(&mut surface).await;

    assert_eq!(outcome, PollOutcome::Cancelled { attempts: 0 });
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert!(surface.is_empty());
}

#[tokio::test]
async fn test_cancel_during_delay_stops_loop() {
    let source = ScriptedSource::new(Vec::new(), pending);
    let calls = source.calls();
    let config = fast_config(Variant::Task).with_interval(Duration::from_secs(60));
    let mut poller = Poller::new(source, config);
    let cancel = poller.cancellation_token();
    let mut surface: Vec<SurfaceUpdate> = Vec::new();

    let (outcome, _) = tokio::join!(poller.run(&mut surface), async {
        tokio::time::sleep(Duration::from_millis(20)).await;
        cancel.cancel();
    });

    assert_eq!(outcome, PollOutcome::Cancelled { attempts: 1 });
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}
