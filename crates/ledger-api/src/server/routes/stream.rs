async fn stream_ledger(
    State(state): State<AppState>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    let initial_message = {
        let inner = state.inner.lock().await;
        StreamMessage::status(inner.api.account_count())
    };

    ws.on_upgrade(move |socket| stream_socket(socket, state, initial_message))
}

async fn stream_socket(mut socket: WebSocket, state: AppState, initial_message: StreamMessage) {
    if send_stream_message(&mut socket, &initial_message)
        .await
        .is_err()
    {
        return;
    }

    let mut rx = state.stream_tx.subscribe();

    loop {
        tokio::select! {
            incoming = socket.recv() => {
                match incoming {
                    Some(Ok(Message::Ping(payload))) => {
                        if socket.send(Message::Pong(payload)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None | Some(Err(_)) => {
                        break;
                    }
                    _ => {}
                }
            }
            outgoing = rx.recv() => {
                match outgoing {
                    Ok(message) => {
                        if send_stream_message(&mut socket, &message).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        let warning = StreamMessage::warning(format!(
                            "stream client lagged and skipped {skipped} message(s)"
                        ));

                        if send_stream_message(&mut socket, &warning).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        break;
                    }
                }
            }
        }
    }
}

async fn send_stream_message(
    socket: &mut WebSocket,
    message: &StreamMessage,
) -> Result<(), axum::Error> {
    let payload = serde_json::to_string(message).map_err(axum::Error::new)?;
    socket.send(Message::Text(payload.into())).await
}

#[derive(Debug, Clone, Serialize)]
struct StreamMessage {
    schema_version: String,
    #[serde(rename = "type")]
    message_type: String,
    user_id: Option<String>,
    payload: Value,
}

impl StreamMessage {
    fn status(account_count: usize) -> Self {
        Self {
            schema_version: SCHEMA_VERSION_V1.to_string(),
            message_type: "ledger.status".to_string(),
            user_id: None,
            payload: json!({ "account_count": account_count }),
        }
    }

    fn log_line(user_id: Option<&str>, line: &str) -> Self {
        Self {
            schema_version: SCHEMA_VERSION_V1.to_string(),
            message_type: "activity.logged".to_string(),
            user_id: user_id.map(str::to_string),
            payload: json!({ "message": line }),
        }
    }

    fn welcome(user_id: &str) -> Self {
        Self {
            schema_version: SCHEMA_VERSION_V1.to_string(),
            message_type: "account.created".to_string(),
            user_id: Some(user_id.to_string()),
            payload: json!({
                "message": "Welcome to the economy! Use /daily to claim your first reward.",
            }),
        }
    }

    fn announcement(sweep: &str, text: &str) -> Self {
        Self {
            schema_version: SCHEMA_VERSION_V1.to_string(),
            message_type: "sweep.announcement".to_string(),
            user_id: None,
            payload: json!({ "sweep": sweep, "message": text }),
        }
    }

    fn command_result(result: &CommandResult) -> Self {
        Self {
            schema_version: SCHEMA_VERSION_V1.to_string(),
            message_type: "command.result".to_string(),
            user_id: Some(result.user_id.clone()),
            payload: json!(result),
        }
    }

    fn warning(warning: String) -> Self {
        Self {
            schema_version: SCHEMA_VERSION_V1.to_string(),
            message_type: "warning".to_string(),
            user_id: None,
            payload: json!({ "message": warning }),
        }
    }
}
