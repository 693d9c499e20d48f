async fn run_daily_sweep(State(state): State<AppState>) -> Json<SweepReport> {
    let (report, messages) = {
        let mut inner = state.inner.lock().await;
        let report = inner.api.run_daily_accrual();
        let messages = sweep_messages(&report);
        (report, messages)
    };

    broadcast_messages(&state, messages);

    Json(report)
}

async fn run_loan_status_sweep(State(state): State<AppState>) -> Json<SweepReport> {
    let (report, messages) = {
        let inner = state.inner.lock().await;
        let report = inner.api.run_loan_status_report();
        let messages = sweep_messages(&report);
        (report, messages)
    };

    broadcast_messages(&state, messages);

    Json(report)
}

#[derive(Debug, Deserialize)]
struct LeaderboardSweepRequest {
    cadence: LeaderboardCadence,
}

async fn run_leaderboard_sweep(
    State(state): State<AppState>,
    Json(request): Json<LeaderboardSweepRequest>,
) -> Json<SweepReport> {
    let (report, messages) = {
        let mut inner = state.inner.lock().await;
        let report = inner.api.run_leaderboard_sweep(request.cadence);
        let messages = sweep_messages(&report);
        (report, messages)
    };

    broadcast_messages(&state, messages);

    Json(report)
}
