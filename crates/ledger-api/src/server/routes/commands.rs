#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SubmitCommandRequest {
    Raw(Command),
    Wrapped { command: Command },
}

impl SubmitCommandRequest {
    fn into_command(self) -> Command {
        match self {
            Self::Raw(command) => command,
            Self::Wrapped { command } => command,
        }
    }
}

async fn submit_command(
    State(state): State<AppState>,
    Json(request): Json<SubmitCommandRequest>,
) -> Json<CommandResult> {
    let command = request.into_command();

    let (result, messages) = {
        let mut inner = state.inner.lock().await;
        let outcome = inner.api.submit_command(command, unix_now());
        let messages = outcome_messages(&outcome);
        (outcome.result, messages)
    };

    broadcast_messages(&state, messages);

    Json(result)
}
