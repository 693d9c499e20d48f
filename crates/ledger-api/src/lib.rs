//! In-process command facade with validation, write-through persistence, and
//! the HTTP server the chat-platform dispatcher calls into.

mod server;

use std::path::Path;

use contracts::{
    ApiError, Command, CommandPayload, CommandResult, CommandType, ErrorCode, LeaderboardCadence,
    LeaderboardEntry, Reply, SweepReport, SCHEMA_VERSION_V1,
};
use ledger_core::{JsonStore, Ledger, StoreError};

pub use server::{serve, ServeConfig, ServerError};

const STORAGE_FAILURE_NOTICE: &str =
    "The ledger is temporarily unavailable. Please try again later.";

/// What one submitted command produced: the result for the requester, the
/// best-effort activity log line, and any users whose accounts were created
/// along the way (each owed a welcome notice).
#[derive(Debug, Clone)]
pub struct CommandOutcome {
    pub result: CommandResult,
    pub log_line: Option<String>,
    pub welcomed: Vec<String>,
}

/// Owns the ledger and the optional backing store. All mutations funnel
/// through this facade; the server wraps it in a single mutex so writers are
/// serialized and no load/save pair can interleave with another.
#[derive(Debug)]
pub struct LedgerApi {
    ledger: Ledger,
    store: Option<JsonStore>,
    command_audit: Vec<CommandResult>,
    last_store_error: Option<String>,
}

impl LedgerApi {
    pub fn from_config(config: contracts::EconomyConfig) -> Self {
        Self {
            ledger: Ledger::new(config),
            store: None,
            command_audit: Vec::new(),
            last_store_error: None,
        }
    }

    /// Attach the JSON document store, creating it on first boot and loading
    /// whatever accounts it already holds.
    pub fn attach_store(&mut self, path: impl AsRef<Path>) -> Result<(), StoreError> {
        let store = JsonStore::open(path)?;
        let accounts = store.load()?;
        self.ledger.restore_accounts(accounts);
        self.store = Some(store);
        self.last_store_error = None;
        Ok(())
    }

    /// Validate and apply one command. Validation failures and storage
    /// failures both reject the command with a private reply; only an
    /// accepted, durably saved mutation broadcasts.
    pub fn submit_command(&mut self, command: Command, now: u64) -> CommandOutcome {
        if let Some(error) = self.validate_command(&command) {
            let reply = Reply::private("That command could not be processed.");
            let result = CommandResult::rejected(&command, reply, error);
            self.command_audit.push(result.clone());
            return CommandOutcome {
                result,
                log_line: None,
                welcomed: Vec::new(),
            };
        }

        let name = command
            .display_name
            .clone()
            .unwrap_or_else(|| command.user_id.clone());
        let rollback = self.store.is_some().then(|| self.ledger.accounts_snapshot());

        let receipt = match self.ledger.apply(
            &command.user_id,
            command.display_name.as_deref(),
            &command.payload,
            now,
        ) {
            Ok(receipt) => receipt,
            Err(err) => {
                // The requester's record may have been lazily created before
                // the guard fired; creations are durable even on rejection.
                self.write_through_or_rollback(None);
                let error = ApiError::new(
                    ErrorCode::ValidationFailed,
                    err.to_string(),
                    Some(format!("user_id={}", command.user_id)),
                );
                let result =
                    CommandResult::rejected(&command, Reply::private(err.user_notice(&name)), error);
                self.command_audit.push(result.clone());
                return CommandOutcome {
                    result,
                    log_line: None,
                    welcomed: Vec::new(),
                };
            }
        };

        if let Err(err) = self.write_through() {
            if let Some(accounts) = rollback {
                self.ledger.restore_accounts(accounts);
            }
            self.last_store_error = Some(err.to_string());
            let error = ApiError::new(
                ErrorCode::StorageUnavailable,
                "ledger store save failed",
                Some(err.to_string()),
            );
            let result =
                CommandResult::rejected(&command, Reply::private(STORAGE_FAILURE_NOTICE), error);
            self.command_audit.push(result.clone());
            return CommandOutcome {
                result,
                log_line: None,
                welcomed: Vec::new(),
            };
        }

        let result = CommandResult::accepted(&command, receipt.reply);
        self.command_audit.push(result.clone());
        CommandOutcome {
            result,
            log_line: receipt.log_line,
            welcomed: receipt.created,
        }
    }

    pub fn run_daily_accrual(&mut self) -> SweepReport {
        let rollback = self.store.is_some().then(|| self.ledger.accounts_snapshot());
        let report = self.ledger.run_daily_accrual();
        self.write_through_or_rollback(rollback);
        report
    }

    pub fn run_loan_status_report(&self) -> SweepReport {
        self.ledger.run_loan_status_report()
    }

    pub fn run_leaderboard_sweep(&mut self, cadence: LeaderboardCadence) -> SweepReport {
        let rollback = self.store.is_some().then(|| self.ledger.accounts_snapshot());
        let report = self.ledger.run_leaderboard_sweep(cadence);
        self.write_through_or_rollback(rollback);
        report
    }

    pub fn account(&self, user_id: &str) -> Option<contracts::AccountRecord> {
        self.ledger.account(user_id).cloned()
    }

    pub fn account_count(&self) -> usize {
        self.ledger.account_count()
    }

    pub fn leaderboard(&self, limit: usize) -> Vec<LeaderboardEntry> {
        self.ledger.leaderboard(limit)
    }

    pub fn config(&self) -> &contracts::EconomyConfig {
        self.ledger.config()
    }

    pub fn store_path(&self) -> Option<&Path> {
        self.store.as_ref().map(JsonStore::path)
    }

    pub fn last_store_error(&self) -> Option<&str> {
        self.last_store_error.as_deref()
    }

    pub fn command_audit(&self) -> &[CommandResult] {
        &self.command_audit
    }

    fn write_through(&mut self) -> Result<(), StoreError> {
        match &self.store {
            Some(store) => store.save(self.ledger.accounts()),
            None => Ok(()),
        }
    }

    fn write_through_or_rollback(
        &mut self,
        rollback: Option<std::collections::BTreeMap<String, contracts::AccountRecord>>,
    ) {
        if let Err(err) = self.write_through() {
            if let Some(accounts) = rollback {
                self.ledger.restore_accounts(accounts);
            }
            self.last_store_error = Some(err.to_string());
        } else {
            self.last_store_error = None;
        }
    }

    fn validate_command(&self, command: &Command) -> Option<ApiError> {
        if command.schema_version != SCHEMA_VERSION_V1 {
            return Some(ApiError::new(
                ErrorCode::ContractVersionUnsupported,
                "Unsupported schema_version",
                Some(format!(
                    "got={} expected={}",
                    command.schema_version, SCHEMA_VERSION_V1
                )),
            ));
        }

        if command.user_id.trim().is_empty() {
            return Some(ApiError::new(
                ErrorCode::InvalidCommand,
                "user_id must not be empty",
                None,
            ));
        }

        if !command_type_matches_payload(command.command_type, &command.payload) {
            return Some(ApiError::new(
                ErrorCode::InvalidCommand,
                "command_type does not match payload variant",
                None,
            ));
        }

        None
    }
}

fn command_type_matches_payload(command_type: CommandType, payload: &CommandPayload) -> bool {
    matches!(
        (command_type, payload),
        (CommandType::ClaimDaily, CommandPayload::ClaimDaily)
            | (CommandType::Work, CommandPayload::Work)
            | (CommandType::Gamble, CommandPayload::Gamble { .. })
            | (CommandType::Gift, CommandPayload::Gift { .. })
            | (CommandType::Deposit, CommandPayload::Deposit { .. })
            | (CommandType::Withdraw, CommandPayload::Withdraw { .. })
            | (CommandType::CheckInterest, CommandPayload::CheckInterest)
            | (CommandType::CheckTax, CommandPayload::CheckTax)
            | (CommandType::PayTax, CommandPayload::PayTax)
            | (CommandType::TakeLoan, CommandPayload::TakeLoan { .. })
            | (CommandType::RepayLoan, CommandPayload::RepayLoan { .. })
            | (CommandType::LoanStatus, CommandPayload::LoanStatus)
            | (CommandType::Balance, CommandPayload::Balance)
            | (CommandType::Shop, CommandPayload::Shop)
            | (CommandType::Rules, CommandPayload::Rules)
            | (CommandType::Leaderboard, CommandPayload::Leaderboard)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::EconomyConfig;

    const NOW: u64 = 1_700_000_000;

    fn temp_store_path(name: &str) -> std::path::PathBuf {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("time should be monotonic")
            .as_nanos();

        std::env::temp_dir().join(format!("hermes_api_{name}_{nanos}/economy.json"))
    }

    #[test]
    fn rejects_mismatched_payload_type() {
        let mut api = LedgerApi::from_config(EconomyConfig::default());

        let bad = Command::new(
            "cmd_bad",
            "user:1",
            CommandType::ClaimDaily,
            CommandPayload::Gamble { amount: 5 },
        );

        let outcome = api.submit_command(bad, NOW);
        assert!(!outcome.result.accepted);
        let error = outcome.result.error.expect("error present");
        assert_eq!(error.error_code, ErrorCode::InvalidCommand);
        assert!(outcome.result.reply.expect("reply present").ephemeral);
    }

    #[test]
    fn rejects_unsupported_schema_version() {
        let mut api = LedgerApi::from_config(EconomyConfig::default());

        let mut command = Command::new(
            "cmd_old",
            "user:1",
            CommandType::Work,
            CommandPayload::Work,
        );
        command.schema_version = "0.9".to_string();

        let outcome = api.submit_command(command, NOW);
        let error = outcome.result.error.expect("error present");
        assert_eq!(error.error_code, ErrorCode::ContractVersionUnsupported);
    }

    #[test]
    fn accepted_command_broadcasts_and_logs() {
        let mut api = LedgerApi::from_config(EconomyConfig::default());

        let command = Command::new(
            "cmd_daily",
            "user:1",
            CommandType::ClaimDaily,
            CommandPayload::ClaimDaily,
        )
        .with_display_name("Ada");

        let outcome = api.submit_command(command, NOW);
        assert!(outcome.result.accepted);
        let reply = outcome.result.reply.expect("reply present");
        assert!(!reply.ephemeral);
        assert!(reply.text.contains("Ada"));
        assert!(outcome
            .log_line
            .expect("log line present")
            .contains("daily reward"));
        assert_eq!(outcome.welcomed, vec!["user:1".to_string()]);
    }

    #[test]
    fn validation_failure_replies_privately_and_mutates_nothing() {
        let mut api = LedgerApi::from_config(EconomyConfig::default());

        let command = Command::new(
            "cmd_gamble",
            "user:1",
            CommandType::Gamble,
            CommandPayload::Gamble { amount: 500 },
        );

        let outcome = api.submit_command(command, NOW);
        assert!(!outcome.result.accepted);
        assert!(outcome.result.reply.expect("reply present").ephemeral);
        assert!(outcome.log_line.is_none());
        assert_eq!(
            api.account("user:1").expect("account initialized").balance,
            0
        );
    }

    #[test]
    fn write_through_persists_every_accepted_mutation() {
        let path = temp_store_path("write_through");
        let mut api = LedgerApi::from_config(EconomyConfig::default());
        api.attach_store(&path).expect("attach store");

        let command = Command::new(
            "cmd_daily",
            "user:1",
            CommandType::ClaimDaily,
            CommandPayload::ClaimDaily,
        );
        let outcome = api.submit_command(command, NOW);
        assert!(outcome.result.accepted);

        // A fresh facade sees the saved state.
        let mut reloaded = LedgerApi::from_config(EconomyConfig::default());
        reloaded.attach_store(&path).expect("attach store");
        assert_eq!(
            reloaded.account("user:1").expect("account persisted").balance,
            20
        );

        let _ = std::fs::remove_dir_all(path.parent().expect("parent dir"));
    }

    #[test]
    fn audit_records_accepted_and_rejected_commands() {
        let mut api = LedgerApi::from_config(EconomyConfig::default());

        api.submit_command(
            Command::new("cmd_1", "user:1", CommandType::Work, CommandPayload::Work),
            NOW,
        );
        api.submit_command(
            Command::new(
                "cmd_2",
                "user:1",
                CommandType::Withdraw,
                CommandPayload::Withdraw { amount: 10 },
            ),
            NOW,
        );

        let audit = api.command_audit();
        assert_eq!(audit.len(), 2);
        assert!(audit[0].accepted);
        assert!(!audit[1].accepted);
    }

    #[test]
    fn sweeps_write_through_when_a_store_is_attached() {
        let path = temp_store_path("sweeps");
        let mut api = LedgerApi::from_config(EconomyConfig::default());
        api.attach_store(&path).expect("attach store");

        api.submit_command(
            Command::new(
                "cmd_loan",
                "user:1",
                CommandType::TakeLoan,
                CommandPayload::TakeLoan { amount: 500 },
            ),
            NOW,
        );
        let report = api.run_daily_accrual();
        assert_eq!(report.touched, 1);

        let mut reloaded = LedgerApi::from_config(EconomyConfig::default());
        reloaded.attach_store(&path).expect("attach store");
        assert_eq!(reloaded.account("user:1").expect("persisted").loan, 550);

        let _ = std::fs::remove_dir_all(path.parent().expect("parent dir"));
    }
}
