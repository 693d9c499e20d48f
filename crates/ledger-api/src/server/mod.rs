use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, Query, Request, State};
use axum::http::header::{HeaderName, HeaderValue};
use axum::http::Method;
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use contracts::{
    AccountRecord, ApiError, Command, CommandResult, EconomyConfig, ErrorCode, LeaderboardCadence,
    LeaderboardEntry, SweepReport, SCHEMA_VERSION_V1,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, Mutex};

use crate::{CommandOutcome, LedgerApi};
use ledger_core::StoreError;

const DEFAULT_LEADERBOARD_LIMIT: usize = 10;
const MAX_LEADERBOARD_LIMIT: usize = 100;

include!("error.rs");
include!("state.rs");
include!("routes/commands.rs");
include!("routes/query.rs");
include!("routes/sweeps.rs");
include!("routes/stream.rs");
include!("util.rs");

/// Everything `serve` needs: where to listen, the economy parameters, and the
/// optional store path (no path means a purely in-memory ledger, used by
/// tests).
#[derive(Debug, Clone)]
pub struct ServeConfig {
    pub addr: SocketAddr,
    pub economy: EconomyConfig,
    pub store_path: Option<PathBuf>,
}

pub async fn serve(config: ServeConfig) -> Result<(), ServerError> {
    let mut api = LedgerApi::from_config(config.economy.clone());
    if let Some(path) = &config.store_path {
        api.attach_store(path)?;
    }

    let state = AppState::new(api);
    spawn_sweep_timers(&state, &config.economy);
    let app = router(state);

    let listener = TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/commands", post(submit_command))
        .route("/api/v1/accounts/{user_id}", get(get_account))
        .route("/api/v1/leaderboard", get(get_leaderboard))
        .route("/api/v1/status", get(get_status))
        .route("/api/v1/sweeps/daily", post(run_daily_sweep))
        .route("/api/v1/sweeps/loan-status", post(run_loan_status_sweep))
        .route("/api/v1/sweeps/leaderboard", post(run_leaderboard_sweep))
        .route("/api/v1/stream", get(stream_ledger))
        .layer(middleware::from_fn(cors_middleware))
        .with_state(state)
}

async fn cors_middleware(request: Request, next: Next) -> Response {
    if request.method() == Method::OPTIONS {
        let mut response = Response::new(axum::body::Body::empty());
        *response.status_mut() = StatusCode::NO_CONTENT;
        apply_cors_headers(response.headers_mut());
        return response;
    }

    let mut response = next.run(request).await;
    apply_cors_headers(response.headers_mut());
    response
}

/// The settlement timers. Each sweep is just another caller of the guarded
/// facade, so sweeps and interactive commands never interleave mid-mutation.
fn spawn_sweep_timers(state: &AppState, economy: &EconomyConfig) {
    spawn_recurring(state.clone(), economy.daily_sweep_secs, |inner| {
        let mut reports = vec![inner.api.run_daily_accrual()];
        reports.push(inner.api.run_loan_status_report());
        reports
    });

    spawn_recurring(state.clone(), economy.weekly_sweep_secs, |inner| {
        vec![inner.api.run_leaderboard_sweep(LeaderboardCadence::Weekly)]
    });

    spawn_recurring(state.clone(), economy.monthly_sweep_secs, |inner| {
        vec![inner.api.run_leaderboard_sweep(LeaderboardCadence::Monthly)]
    });
}

fn spawn_recurring<F>(state: AppState, period_secs: u64, run: F)
where
    F: Fn(&mut ServerInner) -> Vec<SweepReport> + Send + 'static,
{
    let period = Duration::from_secs(period_secs.max(1));
    tokio::spawn(async move {
        let start = tokio::time::Instant::now() + period;
        let mut timer = tokio::time::interval_at(start, period);
        loop {
            timer.tick().await;
            let messages = {
                let mut inner = state.inner.lock().await;
                run(&mut inner)
                    .iter()
                    .flat_map(sweep_messages)
                    .collect::<Vec<_>>()
            };
            broadcast_messages(&state, messages);
        }
    });
}

#[cfg(test)]
mod tests;
