//! v1 cross-boundary contracts for the ledger engine, API server, and stream consumers.

use std::fmt;

use serde::{Deserialize, Serialize};

pub const SCHEMA_VERSION_V1: &str = "1.0";

/// Interest rate applied to outstanding loans once per daily accrual sweep.
pub const DEFAULT_LOAN_INTEREST_RATE: f64 = 0.10;

/// Default location of the persisted ledger document.
pub const DEFAULT_STORE_PATH: &str = "data/economy.json";

pub const SECONDS_PER_DAY: u64 = 86_400;

/// Per-user financial state. One record per platform-assigned user ID string.
///
/// `balance` is signed but every debit on the command surface is guarded by a
/// sufficient-funds precondition, so it stays non-negative in practice.
/// `last_daily` is recorded on every claim and only consulted when the daily
/// cooldown toggle is enabled.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AccountRecord {
    pub balance: i64,
    pub bank: i64,
    pub loan: i64,
    pub loan_interest_rate: f64,
    pub taxes_due: i64,
    pub daily_streak: u64,
    pub last_daily: Option<u64>,
}

impl Default for AccountRecord {
    fn default() -> Self {
        Self {
            balance: 0,
            bank: 0,
            loan: 0,
            loan_interest_rate: DEFAULT_LOAN_INTEREST_RATE,
            taxes_due: 0,
            daily_streak: 0,
            last_daily: None,
        }
    }
}

/// Tunable economy parameters. Serialized so a deployment can override the
/// defaults from a config document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EconomyConfig {
    pub schema_version: String,
    pub seed: u64,
    pub daily_base: i64,
    pub daily_streak_bonus: i64,
    pub work_reward_min: i64,
    pub work_reward_max: i64,
    pub bank_interest_rate: f64,
    pub loan_interest_rate: f64,
    pub max_loan: i64,
    pub monthly_bonus: i64,
    pub monthly_bonus_recipients: usize,
    pub leaderboard_size: usize,
    /// Off by default: the streak is purely cumulative. The toggle exists so
    /// a deployment can gate `/daily` to one claim per unix day.
    #[serde(default)]
    pub enforce_daily_cooldown: bool,
    pub daily_sweep_secs: u64,
    pub weekly_sweep_secs: u64,
    pub monthly_sweep_secs: u64,
    pub notes: Option<String>,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION_V1.to_string(),
            seed: 1337,
            daily_base: 20,
            daily_streak_bonus: 20,
            work_reward_min: 10,
            work_reward_max: 50,
            bank_interest_rate: 0.05,
            loan_interest_rate: DEFAULT_LOAN_INTEREST_RATE,
            max_loan: 1000,
            monthly_bonus: 100,
            monthly_bonus_recipients: 5,
            leaderboard_size: 10,
            enforce_daily_cooldown: false,
            daily_sweep_secs: SECONDS_PER_DAY,
            weekly_sweep_secs: 7 * SECONDS_PER_DAY,
            monthly_sweep_secs: 30 * SECONDS_PER_DAY,
            notes: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CommandType {
    ClaimDaily,
    Work,
    Gamble,
    Gift,
    Deposit,
    Withdraw,
    CheckInterest,
    CheckTax,
    PayTax,
    TakeLoan,
    RepayLoan,
    LoanStatus,
    Balance,
    Shop,
    Rules,
    Leaderboard,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CommandPayload {
    ClaimDaily,
    Work,
    Gamble { amount: i64 },
    Gift { to_user_id: String, amount: i64 },
    Deposit { amount: i64 },
    Withdraw { amount: i64 },
    CheckInterest,
    CheckTax,
    PayTax,
    TakeLoan { amount: i64 },
    RepayLoan { amount: i64 },
    LoanStatus,
    Balance,
    Shop,
    Rules,
    Leaderboard,
}

/// One slash-command invocation, as relayed by the chat-platform dispatcher.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Command {
    pub schema_version: String,
    pub command_id: String,
    pub user_id: String,
    pub display_name: Option<String>,
    pub command_type: CommandType,
    pub payload: CommandPayload,
}

impl Command {
    pub fn new(
        command_id: impl Into<String>,
        user_id: impl Into<String>,
        command_type: CommandType,
        payload: CommandPayload,
    ) -> Self {
        Self {
            schema_version: SCHEMA_VERSION_V1.to_string(),
            command_id: command_id.into(),
            user_id: user_id.into(),
            display_name: None,
            command_type,
            payload,
        }
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }
}

/// Text sent back to the requester. Validation failures are marked ephemeral
/// (private to the requester); successful outcomes broadcast normally.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub ephemeral: bool,
}

impl Reply {
    pub fn broadcast(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ephemeral: false,
        }
    }

    pub fn private(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ephemeral: true,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    ValidationFailed,
    StorageUnavailable,
    InvalidCommand,
    ContractVersionUnsupported,
    AccountNotFound,
    InternalError,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiError {
    pub schema_version: String,
    pub error_code: ErrorCode,
    pub message: String,
    pub details: Option<String>,
}

impl ApiError {
    pub fn new(error_code: ErrorCode, message: impl Into<String>, details: Option<String>) -> Self {
        Self {
            schema_version: SCHEMA_VERSION_V1.to_string(),
            error_code,
            message: message.into(),
            details,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.error_code, self.message)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CommandResult {
    pub schema_version: String,
    pub command_id: String,
    pub user_id: String,
    pub accepted: bool,
    pub reply: Option<Reply>,
    pub error: Option<ApiError>,
}

impl CommandResult {
    pub fn accepted(command: &Command, reply: Reply) -> Self {
        Self {
            schema_version: SCHEMA_VERSION_V1.to_string(),
            command_id: command.command_id.clone(),
            user_id: command.user_id.clone(),
            accepted: true,
            reply: Some(reply),
            error: None,
        }
    }

    pub fn rejected(command: &Command, reply: Reply, error: ApiError) -> Self {
        Self {
            schema_version: SCHEMA_VERSION_V1.to_string(),
            command_id: command.command_id.clone(),
            user_id: command.user_id.clone(),
            accepted: false,
            reply: Some(reply),
            error: Some(error),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LeaderboardEntry {
    pub rank: u32,
    pub user_id: String,
    pub balance: i64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LeaderboardCadence {
    Weekly,
    Monthly,
}

impl LeaderboardCadence {
    pub fn label(self) -> &'static str {
        match self {
            Self::Weekly => "Weekly",
            Self::Monthly => "Monthly",
        }
    }
}

/// Outcome of one settlement sweep over the whole store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SweepReport {
    pub schema_version: String,
    pub sweep: String,
    pub processed: usize,
    pub touched: usize,
    pub log_lines: Vec<String>,
    pub announcement: Option<String>,
}

impl SweepReport {
    pub fn new(sweep: impl Into<String>) -> Self {
        Self {
            schema_version: SCHEMA_VERSION_V1.to_string(),
            sweep: sweep.into(),
            processed: 0,
            touched: 0,
            log_lines: Vec::new(),
            announcement: None,
        }
    }
}
