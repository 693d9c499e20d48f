use super::*;

use contracts::{CommandPayload, CommandType};

fn test_state() -> AppState {
    AppState::new(LedgerApi::from_config(EconomyConfig::default()))
}

#[test]
fn limit_clamps_to_the_maximum_and_rejects_zero() {
    assert_eq!(clamp_limit(None).expect("default limit"), 10);
    assert_eq!(clamp_limit(Some(3)).expect("small limit"), 3);
    assert_eq!(clamp_limit(Some(10_000)).expect("large limit"), 100);
    assert!(clamp_limit(Some(0)).is_err());
}

#[test]
fn outcome_fans_out_welcome_log_and_result() {
    let mut api = LedgerApi::from_config(EconomyConfig::default());
    let command = Command::new(
        "cmd_daily",
        "user:1",
        CommandType::ClaimDaily,
        CommandPayload::ClaimDaily,
    );

    let outcome = api.submit_command(command, 1_700_000_000);
    let messages = outcome_messages(&outcome);

    assert_eq!(messages.len(), 3);
    assert_eq!(messages[0].message_type, "account.created");
    assert_eq!(messages[1].message_type, "activity.logged");
    assert_eq!(messages[2].message_type, "command.result");
    assert_eq!(messages[2].user_id.as_deref(), Some("user:1"));
}

#[test]
fn sweep_report_becomes_log_lines_then_announcement() {
    let mut report = SweepReport::new("weekly_leaderboard");
    report.log_lines.push("User user:1 did something.".to_string());
    report.announcement = Some("**Weekly Leaderboard:**".to_string());

    let messages = sweep_messages(&report);
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].message_type, "activity.logged");
    assert_eq!(messages[1].message_type, "sweep.announcement");
}

#[tokio::test]
async fn broadcast_without_subscribers_is_a_silent_no_op() {
    let state = test_state();
    broadcast_messages(&state, vec![StreamMessage::warning("nobody home".to_string())]);
}

#[tokio::test]
async fn subscribers_see_command_results_in_order() {
    let state = test_state();
    let mut rx = state.stream_tx.subscribe();

    let messages = {
        let mut inner = state.inner.lock().await;
        let outcome = inner.api.submit_command(
            Command::new("cmd_work", "user:1", CommandType::Work, CommandPayload::Work),
            1_700_000_000,
        );
        outcome_messages(&outcome)
    };
    broadcast_messages(&state, messages);

    let first = rx.recv().await.expect("welcome message");
    assert_eq!(first.message_type, "account.created");
    let second = rx.recv().await.expect("log message");
    assert_eq!(second.message_type, "activity.logged");
    let third = rx.recv().await.expect("result message");
    assert_eq!(third.message_type, "command.result");
}

#[tokio::test]
async fn manual_sweep_broadcasts_the_announcement() {
    let state = test_state();
    {
        let mut inner = state.inner.lock().await;
        inner.api.submit_command(
            Command::new(
                "cmd_daily",
                "user:1",
                CommandType::ClaimDaily,
                CommandPayload::ClaimDaily,
            ),
            1_700_000_000,
        );
    }

    let mut rx = state.stream_tx.subscribe();
    let messages = {
        let mut inner = state.inner.lock().await;
        let report = inner.api.run_leaderboard_sweep(LeaderboardCadence::Weekly);
        sweep_messages(&report)
    };
    broadcast_messages(&state, messages);

    let message = rx.recv().await.expect("announcement message");
    assert_eq!(message.message_type, "sweep.announcement");
    assert!(message
        .payload
        .get("message")
        .and_then(Value::as_str)
        .expect("announcement text")
        .contains("1. user:1 - $20"));
}
