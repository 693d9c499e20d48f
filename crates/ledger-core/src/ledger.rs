use std::cmp::Reverse;
use std::collections::BTreeMap;

use contracts::{AccountRecord, EconomyConfig, LeaderboardEntry};

use crate::sampling;

/// The in-memory ledger: every account record plus the economy configuration
/// and the draw cursor feeding deterministic sampling.
#[derive(Debug, Clone)]
pub struct Ledger {
    config: EconomyConfig,
    accounts: BTreeMap<String, AccountRecord>,
    draw_cursor: u64,
}

impl Ledger {
    pub fn new(config: EconomyConfig) -> Self {
        Self::with_accounts(config, BTreeMap::new())
    }

    pub fn with_accounts(config: EconomyConfig, accounts: BTreeMap<String, AccountRecord>) -> Self {
        Self {
            config,
            accounts,
            draw_cursor: 0,
        }
    }

    pub fn config(&self) -> &EconomyConfig {
        &self.config
    }

    pub fn accounts(&self) -> &BTreeMap<String, AccountRecord> {
        &self.accounts
    }

    pub fn account(&self, user_id: &str) -> Option<&AccountRecord> {
        self.accounts.get(user_id)
    }

    pub fn account_count(&self) -> usize {
        self.accounts.len()
    }

    /// Snapshot of the full map, used by the API layer to roll an operation
    /// back when the write-through save fails.
    pub fn accounts_snapshot(&self) -> BTreeMap<String, AccountRecord> {
        self.accounts.clone()
    }

    pub fn restore_accounts(&mut self, accounts: BTreeMap<String, AccountRecord>) {
        self.accounts = accounts;
    }

    /// Ensure a zero-valued record exists for `user_id`. Returns true when a
    /// record was created; the caller owes a write-through save in that case
    /// so every creation is immediately durable.
    pub fn get_or_create(&mut self, user_id: &str) -> bool {
        if self.accounts.contains_key(user_id) {
            return false;
        }
        let record = AccountRecord {
            loan_interest_rate: self.config.loan_interest_rate,
            ..AccountRecord::default()
        };
        self.accounts.insert(user_id.to_string(), record);
        true
    }

    pub(crate) fn record(&self, user_id: &str) -> AccountRecord {
        self.accounts.get(user_id).cloned().unwrap_or_default()
    }

    pub(crate) fn put_record(&mut self, user_id: &str, record: AccountRecord) {
        self.accounts.insert(user_id.to_string(), record);
    }

    pub(crate) fn next_draw(&mut self, min: i64, max: i64) -> i64 {
        let value = sampling::sample_range_i64(self.config.seed, self.draw_cursor, min, max);
        self.draw_cursor += 1;
        value
    }

    /// Accounts ranked by descending balance; equal balances resolve by
    /// ascending user id so rankings are reproducible.
    pub fn leaderboard(&self, limit: usize) -> Vec<LeaderboardEntry> {
        let mut ranked: Vec<(&String, i64)> = self
            .accounts
            .iter()
            .map(|(user_id, record)| (user_id, record.balance))
            .collect();
        ranked.sort_by_key(|(user_id, balance)| (Reverse(*balance), (*user_id).clone()));

        ranked
            .into_iter()
            .take(limit)
            .enumerate()
            .map(|(index, (user_id, balance))| LeaderboardEntry {
                rank: (index + 1) as u32,
                user_id: user_id.clone(),
                balance,
            })
            .collect()
    }
}
