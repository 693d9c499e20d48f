#[derive(Clone)]
struct AppState {
    inner: Arc<Mutex<ServerInner>>,
    stream_tx: broadcast::Sender<StreamMessage>,
}

impl AppState {
    fn new(api: LedgerApi) -> Self {
        let (stream_tx, _) = broadcast::channel(4096);
        Self {
            inner: Arc::new(Mutex::new(ServerInner { api })),
            stream_tx,
        }
    }
}

#[derive(Debug)]
struct ServerInner {
    api: LedgerApi,
}

fn unix_now() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or(0)
}

/// A command outcome fans out into stream messages: welcomes for accounts
/// created along the way, the activity log line, and the result itself.
fn outcome_messages(outcome: &CommandOutcome) -> Vec<StreamMessage> {
    let mut messages = Vec::new();
    for user_id in &outcome.welcomed {
        messages.push(StreamMessage::welcome(user_id));
    }
    if let Some(line) = &outcome.log_line {
        messages.push(StreamMessage::log_line(Some(&outcome.result.user_id), line));
    }
    messages.push(StreamMessage::command_result(&outcome.result));
    messages
}

fn sweep_messages(report: &SweepReport) -> Vec<StreamMessage> {
    let mut messages = Vec::new();
    for line in &report.log_lines {
        messages.push(StreamMessage::log_line(None, line));
    }
    if let Some(announcement) = &report.announcement {
        messages.push(StreamMessage::announcement(&report.sweep, announcement));
    }
    messages
}

// Sending with no subscribers returns an error; a missing log sink is a
// silent no-op, so the result is dropped.
fn broadcast_messages(state: &AppState, messages: Vec<StreamMessage>) {
    for message in messages {
        let _ = state.stream_tx.send(message);
    }
}
