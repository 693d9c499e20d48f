#[derive(Debug, Serialize)]
struct AccountView {
    schema_version: String,
    user_id: String,
    #[serde(flatten)]
    record: AccountRecord,
}

async fn get_account(
    Path(user_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<AccountView>, HttpApiError> {
    let view = {
        let inner = state.inner.lock().await;
        let Some(record) = inner.api.account(&user_id) else {
            return Err(HttpApiError::account_not_found(&user_id));
        };

        AccountView {
            schema_version: SCHEMA_VERSION_V1.to_string(),
            user_id: user_id.clone(),
            record,
        }
    };

    Ok(Json(view))
}

#[derive(Debug, Deserialize, Default)]
struct LeaderboardQuery {
    limit: Option<usize>,
}

#[derive(Debug, Serialize)]
struct LeaderboardPage {
    schema_version: String,
    entries: Vec<LeaderboardEntry>,
}

async fn get_leaderboard(
    State(state): State<AppState>,
    Query(query): Query<LeaderboardQuery>,
) -> Result<Json<LeaderboardPage>, HttpApiError> {
    let limit = clamp_limit(query.limit)?;

    let page = {
        let inner = state.inner.lock().await;
        LeaderboardPage {
            schema_version: SCHEMA_VERSION_V1.to_string(),
            entries: inner.api.leaderboard(limit),
        }
    };

    Ok(Json(page))
}

#[derive(Debug, Serialize)]
struct StatusResponse {
    schema_version: String,
    account_count: usize,
    store_path: Option<String>,
    last_store_error: Option<String>,
}

async fn get_status(State(state): State<AppState>) -> Json<StatusResponse> {
    let response = {
        let inner = state.inner.lock().await;
        StatusResponse {
            schema_version: SCHEMA_VERSION_V1.to_string(),
            account_count: inner.api.account_count(),
            store_path: inner
                .api
                .store_path()
                .map(|path| path.display().to_string()),
            last_store_error: inner.api.last_store_error().map(str::to_string),
        }
    };

    Json(response)
}
