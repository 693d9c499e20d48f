//! The named transaction operations. Each one validates its preconditions,
//! mutates the requester's record (and the receiver's, for gifts), and
//! produces the user-facing reply plus an optional activity log line.
//! Precondition failures mutate nothing.

use std::fmt;

use contracts::{CommandPayload, Reply, SECONDS_PER_DAY};

use crate::ledger::Ledger;
use crate::settlement::interest_on;

/// Validation failures. Reported privately to the requester; never retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    InvalidAmount(i64),
    InsufficientBalance { needed: i64, available: i64 },
    InsufficientBank { needed: i64, available: i64 },
    LoanCeilingExceeded { outstanding: i64, requested: i64, max_loan: i64 },
    LoanOverpayment { outstanding: i64, requested: i64 },
    SelfGift,
    DailyAlreadyClaimed,
}

impl fmt::Display for LedgerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidAmount(amount) => write!(f, "invalid amount: {amount}"),
            Self::InsufficientBalance { needed, available } => {
                write!(f, "insufficient balance: needed={needed} available={available}")
            }
            Self::InsufficientBank { needed, available } => {
                write!(f, "insufficient bank funds: needed={needed} available={available}")
            }
            Self::LoanCeilingExceeded {
                outstanding,
                requested,
                max_loan,
            } => write!(
                f,
                "loan ceiling exceeded: outstanding={outstanding} requested={requested} max={max_loan}"
            ),
            Self::LoanOverpayment {
                outstanding,
                requested,
            } => write!(
                f,
                "loan overpayment: outstanding={outstanding} requested={requested}"
            ),
            Self::SelfGift => write!(f, "cannot gift to self"),
            Self::DailyAlreadyClaimed => write!(f, "daily reward already claimed today"),
        }
    }
}

impl std::error::Error for LedgerError {}

impl LedgerError {
    /// The private notice shown to the requester when validation fails.
    pub fn user_notice(&self, name: &str) -> String {
        match self {
            Self::InvalidAmount(_) => "Please enter a positive amount.".to_string(),
            Self::InsufficientBalance { .. } => {
                format!("{name}, you don't have enough balance for that.")
            }
            Self::InsufficientBank { .. } => {
                "You don't have enough money in the bank to withdraw that amount.".to_string()
            }
            Self::LoanCeilingExceeded { max_loan, .. } => {
                format!("{name}, you cannot take a loan greater than ${max_loan}.")
            }
            Self::LoanOverpayment { .. } => {
                format!("{name}, you don't owe that much on your loan.")
            }
            Self::SelfGift => "You cannot gift money to yourself.".to_string(),
            Self::DailyAlreadyClaimed => {
                format!("{name}, you already claimed your daily reward today.")
            }
        }
    }
}

/// Outcome of one accepted operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpReceipt {
    pub reply: Reply,
    pub log_line: Option<String>,
    /// User ids whose records were lazily created by this operation; each one
    /// is owed a welcome notice and an immediate save.
    pub created: Vec<String>,
}

impl OpReceipt {
    fn announce(reply: String, log_line: Option<String>, created: Vec<String>) -> Self {
        Self {
            reply: Reply::broadcast(reply),
            log_line,
            created,
        }
    }
}

impl Ledger {
    /// Apply one command payload for `user_id`. The requester's record is
    /// lazily created first, so every command initializes its account; `now`
    /// is unix seconds and only consulted by the daily cooldown toggle.
    pub fn apply(
        &mut self,
        user_id: &str,
        display_name: Option<&str>,
        payload: &CommandPayload,
        now: u64,
    ) -> Result<OpReceipt, LedgerError> {
        let mut created = Vec::new();
        if self.get_or_create(user_id) {
            created.push(user_id.to_string());
        }
        let name = display_name.unwrap_or(user_id).to_string();

        match payload {
            CommandPayload::ClaimDaily => self.claim_daily(user_id, &name, now, created),
            CommandPayload::Work => self.work(user_id, &name, created),
            CommandPayload::Gamble { amount } => self.gamble(user_id, &name, *amount, created),
            CommandPayload::Gift { to_user_id, amount } => {
                self.gift(user_id, &name, to_user_id, *amount, created)
            }
            CommandPayload::Deposit { amount } => self.deposit(user_id, &name, *amount, created),
            CommandPayload::Withdraw { amount } => self.withdraw(user_id, &name, *amount, created),
            CommandPayload::CheckInterest => self.check_interest(user_id, &name, created),
            CommandPayload::CheckTax => self.check_tax(user_id, &name, created),
            CommandPayload::PayTax => self.pay_tax(user_id, &name, created),
            CommandPayload::TakeLoan { amount } => self.take_loan(user_id, &name, *amount, created),
            CommandPayload::RepayLoan { amount } => {
                self.repay_loan(user_id, &name, *amount, created)
            }
            CommandPayload::LoanStatus => self.loan_status(user_id, &name, created),
            CommandPayload::Balance => self.balance(user_id, &name, created),
            CommandPayload::Shop => Ok(OpReceipt::announce(shop_catalog(), None, created)),
            CommandPayload::Rules => Ok(OpReceipt::announce(rules_text(), None, created)),
            CommandPayload::Leaderboard => self.leaderboard_reply(created),
        }
    }

    fn claim_daily(
        &mut self,
        user_id: &str,
        name: &str,
        now: u64,
        created: Vec<String>,
    ) -> Result<OpReceipt, LedgerError> {
        let mut record = self.record(user_id);

        if self.config().enforce_daily_cooldown {
            if let Some(last) = record.last_daily {
                if last / SECONDS_PER_DAY == now / SECONDS_PER_DAY {
                    return Err(LedgerError::DailyAlreadyClaimed);
                }
            }
        }

        let reward =
            self.config().daily_base + self.config().daily_streak_bonus * record.daily_streak as i64;
        record.balance += reward;
        record.daily_streak += 1;
        record.last_daily = Some(now);
        let streak = record.daily_streak;
        self.put_record(user_id, record);

        Ok(OpReceipt::announce(
            format!(
                "{name}, you claimed your daily reward of ${reward}! (Current streak: {streak} days)"
            ),
            Some(format!("{name} claimed their daily reward of ${reward}.")),
            created,
        ))
    }

    fn work(
        &mut self,
        user_id: &str,
        name: &str,
        created: Vec<String>,
    ) -> Result<OpReceipt, LedgerError> {
        let (min, max) = (self.config().work_reward_min, self.config().work_reward_max);
        let earned = self.next_draw(min, max);

        let mut record = self.record(user_id);
        record.balance += earned;
        self.put_record(user_id, record);

        Ok(OpReceipt::announce(
            format!("{name}, you worked hard and earned ${earned}!"),
            Some(format!("{name} earned ${earned} by working.")),
            created,
        ))
    }

    fn gamble(
        &mut self,
        user_id: &str,
        name: &str,
        amount: i64,
        created: Vec<String>,
    ) -> Result<OpReceipt, LedgerError> {
        if amount <= 0 {
            return Err(LedgerError::InvalidAmount(amount));
        }
        let mut record = self.record(user_id);
        if record.balance < amount {
            return Err(LedgerError::InsufficientBalance {
                needed: amount,
                available: record.balance,
            });
        }

        let won = self.next_draw(0, 1) == 1;
        if won {
            record.balance += amount;
        } else {
            record.balance -= amount;
        }
        let balance = record.balance;
        self.put_record(user_id, record);

        let verdict = if won { "won" } else { "lost" };
        Ok(OpReceipt::announce(
            format!("{name}, you gambled ${amount} and {verdict}! You now have ${balance}."),
            Some(format!("{name} gambled ${amount} and {verdict}.")),
            created,
        ))
    }

    fn gift(
        &mut self,
        user_id: &str,
        name: &str,
        to_user_id: &str,
        amount: i64,
        mut created: Vec<String>,
    ) -> Result<OpReceipt, LedgerError> {
        if to_user_id == user_id {
            return Err(LedgerError::SelfGift);
        }
        if amount <= 0 {
            return Err(LedgerError::InvalidAmount(amount));
        }

        let mut sender = self.record(user_id);
        if sender.balance < amount {
            return Err(LedgerError::InsufficientBalance {
                needed: amount,
                available: sender.balance,
            });
        }

        if self.get_or_create(to_user_id) {
            created.push(to_user_id.to_string());
        }
        let mut receiver = self.record(to_user_id);

        sender.balance -= amount;
        receiver.balance += amount;
        self.put_record(user_id, sender);
        self.put_record(to_user_id, receiver);

        Ok(OpReceipt::announce(
            format!("{name}, you gifted ${amount} to {to_user_id}."),
            Some(format!("{name} gifted ${amount} to {to_user_id}.")),
            created,
        ))
    }

    fn deposit(
        &mut self,
        user_id: &str,
        name: &str,
        amount: i64,
        created: Vec<String>,
    ) -> Result<OpReceipt, LedgerError> {
        if amount <= 0 {
            return Err(LedgerError::InvalidAmount(amount));
        }
        let mut record = self.record(user_id);
        if record.balance < amount {
            return Err(LedgerError::InsufficientBalance {
                needed: amount,
                available: record.balance,
            });
        }

        record.balance -= amount;
        record.bank += amount;
        self.put_record(user_id, record);

        Ok(OpReceipt::announce(
            format!("{name}, you successfully deposited ${amount} into your bank account."),
            Some(format!("{name} deposited ${amount} into their bank account.")),
            created,
        ))
    }

    fn withdraw(
        &mut self,
        user_id: &str,
        name: &str,
        amount: i64,
        created: Vec<String>,
    ) -> Result<OpReceipt, LedgerError> {
        if amount <= 0 {
            return Err(LedgerError::InvalidAmount(amount));
        }
        let mut record = self.record(user_id);
        if record.bank < amount {
            return Err(LedgerError::InsufficientBank {
                needed: amount,
                available: record.bank,
            });
        }

        record.balance += amount;
        record.bank -= amount;
        self.put_record(user_id, record);

        Ok(OpReceipt::announce(
            format!("{name}, you successfully withdrew ${amount} from your bank account."),
            Some(format!("{name} withdrew ${amount} from their bank account.")),
            created,
        ))
    }

    // Repeatable on demand; interest claims are not time-gated.
    fn check_interest(
        &mut self,
        user_id: &str,
        name: &str,
        created: Vec<String>,
    ) -> Result<OpReceipt, LedgerError> {
        let rate = self.config().bank_interest_rate;
        let mut record = self.record(user_id);
        let earned = interest_on(record.bank, rate);
        record.balance += earned;
        self.put_record(user_id, record);

        Ok(OpReceipt::announce(
            format!("{name}, you earned ${earned} in interest from your bank balance!"),
            Some(format!("{name} earned ${earned} in bank interest.")),
            created,
        ))
    }

    fn check_tax(
        &mut self,
        user_id: &str,
        name: &str,
        created: Vec<String>,
    ) -> Result<OpReceipt, LedgerError> {
        let taxes_due = self.record(user_id).taxes_due;
        Ok(OpReceipt::announce(
            format!("{name}, you owe ${taxes_due} in taxes."),
            None,
            created,
        ))
    }

    fn pay_tax(
        &mut self,
        user_id: &str,
        name: &str,
        created: Vec<String>,
    ) -> Result<OpReceipt, LedgerError> {
        let mut record = self.record(user_id);
        let taxes_due = record.taxes_due;
        if taxes_due == 0 {
            return Ok(OpReceipt::announce(
                format!("{name}, you don't owe any taxes."),
                None,
                created,
            ));
        }
        if record.balance < taxes_due {
            return Err(LedgerError::InsufficientBalance {
                needed: taxes_due,
                available: record.balance,
            });
        }

        record.balance -= taxes_due;
        record.taxes_due = 0;
        self.put_record(user_id, record);

        Ok(OpReceipt::announce(
            format!("{name}, you successfully paid ${taxes_due} in taxes."),
            Some(format!("{name} paid ${taxes_due} in taxes.")),
            created,
        ))
    }

    fn take_loan(
        &mut self,
        user_id: &str,
        name: &str,
        amount: i64,
        created: Vec<String>,
    ) -> Result<OpReceipt, LedgerError> {
        if amount <= 0 {
            return Err(LedgerError::InvalidAmount(amount));
        }
        let max_loan = self.config().max_loan;
        let mut record = self.record(user_id);
        // checked_add: the requested amount comes straight off the wire and
        // may be large enough to wrap the sum past the ceiling.
        if record
            .loan
            .checked_add(amount)
            .map_or(true, |total| total > max_loan)
        {
            return Err(LedgerError::LoanCeilingExceeded {
                outstanding: record.loan,
                requested: amount,
                max_loan,
            });
        }

        record.loan += amount;
        record.balance += amount;
        self.put_record(user_id, record);

        Ok(OpReceipt::announce(
            format!("{name}, you have taken a loan of ${amount}."),
            Some(format!("{name} took a loan of ${amount}.")),
            created,
        ))
    }

    fn repay_loan(
        &mut self,
        user_id: &str,
        name: &str,
        amount: i64,
        created: Vec<String>,
    ) -> Result<OpReceipt, LedgerError> {
        if amount <= 0 {
            return Err(LedgerError::InvalidAmount(amount));
        }
        let mut record = self.record(user_id);
        if record.loan < amount {
            return Err(LedgerError::LoanOverpayment {
                outstanding: record.loan,
                requested: amount,
            });
        }
        if record.balance < amount {
            return Err(LedgerError::InsufficientBalance {
                needed: amount,
                available: record.balance,
            });
        }

        record.loan -= amount;
        record.balance -= amount;
        self.put_record(user_id, record);

        Ok(OpReceipt::announce(
            format!("{name}, you successfully repaid ${amount} of your loan."),
            Some(format!("{name} repaid ${amount} of their loan.")),
            created,
        ))
    }

    fn loan_status(
        &mut self,
        user_id: &str,
        name: &str,
        created: Vec<String>,
    ) -> Result<OpReceipt, LedgerError> {
        let loan = self.record(user_id).loan;
        Ok(OpReceipt::announce(
            format!("{name}, your current loan balance is ${loan}."),
            None,
            created,
        ))
    }

    fn balance(
        &mut self,
        user_id: &str,
        name: &str,
        created: Vec<String>,
    ) -> Result<OpReceipt, LedgerError> {
        let record = self.record(user_id);
        Ok(OpReceipt::announce(
            format!(
                "{name}, you have ${} in cash and ${} in the bank.",
                record.balance, record.bank
            ),
            None,
            created,
        ))
    }

    fn leaderboard_reply(&mut self, created: Vec<String>) -> Result<OpReceipt, LedgerError> {
        let entries = self.leaderboard(self.config().leaderboard_size);
        let mut lines = vec!["**Leaderboard:**".to_string()];
        for entry in &entries {
            lines.push(format!("{}. {} - ${}", entry.rank, entry.user_id, entry.balance));
        }
        if entries.is_empty() {
            lines.push("No accounts yet.".to_string());
        }
        Ok(OpReceipt::announce(lines.join("\n"), None, created))
    }
}

fn shop_catalog() -> String {
    let items = [
        ("lottery_ticket", "Lottery Ticket", 50, "Chance to win $500."),
        (
            "multiplier_boost",
            "Multiplier Boost",
            200,
            "Doubles work rewards for 1 hour.",
        ),
        (
            "lucky_charm",
            "Lucky Charm",
            100,
            "Increases gambling win chances.",
        ),
    ];
    let listing = items
        .iter()
        .map(|(key, name, price, description)| {
            format!("{key}: {name} - ${price} ({description})")
        })
        .collect::<Vec<_>>()
        .join("\n");
    format!("**Shop Items:**\n{listing}")
}

fn rules_text() -> String {
    concat!(
        "**Hermes Economy Simulator - Rules**\n",
        "- No cheating, exploiting, or abusing bugs.\n",
        "- Respect all other players and staff.\n",
        "- No spamming or excessive messaging.\n",
        "- Do not share personal or sensitive information.\n",
        "- Be mindful of your balance, taxes, loans, and spending.\n\n",
        "**Game Features:**\n",
        "- Earn money by working, gambling, and completing events.\n",
        "- Check your balance, work, gamble, and give gifts to others.\n",
        "- Visit the shop to buy virtual items.\n",
        "- Deposit and withdraw money from your bank.\n",
        "- Pay taxes and take out loans with interest.\n",
        "- Check leaderboards and claim your daily rewards.\n",
    )
    .to_string()
}
