//! Periodic settlement sweeps: daily interest accrual, the daily loan status
//! report, and the weekly/monthly leaderboard announcements. Sweeps iterate
//! the whole store; they never run per-user.

use contracts::{LeaderboardCadence, SweepReport};

use crate::ledger::Ledger;

/// Interest rounded to whole currency units. Rates are small fractions, so
/// the f64 product is exact for any realistic principal.
pub(crate) fn interest_on(principal: i64, rate: f64) -> i64 {
    (principal as f64 * rate).round() as i64
}

impl Ledger {
    /// Credit bank interest and compound loan interest across every account.
    /// One log line per field touched, mirroring the activity log of the
    /// interactive operations.
    pub fn run_daily_accrual(&mut self) -> SweepReport {
        let mut report = SweepReport::new("daily_accrual");
        let bank_rate = self.config().bank_interest_rate;

        let user_ids: Vec<String> = self.accounts().keys().cloned().collect();
        for user_id in user_ids {
            report.processed += 1;
            let mut record = self.record(&user_id);
            let mut touched = false;

            if record.bank > 0 {
                let earned = interest_on(record.bank, bank_rate);
                record.balance += earned;
                touched = true;
                report.log_lines.push(format!(
                    "User {user_id} earned ${earned} interest on their bank balance."
                ));
            }

            if record.loan > 0 {
                let accrued = interest_on(record.loan, record.loan_interest_rate);
                record.loan += accrued;
                touched = true;
                report.log_lines.push(format!(
                    "User {user_id}'s loan increased by ${accrued} due to interest."
                ));
            }

            if touched {
                report.touched += 1;
                self.put_record(&user_id, record);
            }
        }

        report
    }

    /// Read-only daily report of outstanding loans.
    pub fn run_loan_status_report(&self) -> SweepReport {
        let mut report = SweepReport::new("loan_status");
        for (user_id, record) in self.accounts() {
            report.processed += 1;
            if record.loan > 0 {
                report.log_lines.push(format!(
                    "User {user_id} has an outstanding loan of ${}.",
                    record.loan
                ));
            }
        }
        report
    }

    /// Rank accounts and build the announcement. The monthly cadence also
    /// credits a flat bonus to the top accounts.
    pub fn run_leaderboard_sweep(&mut self, cadence: LeaderboardCadence) -> SweepReport {
        let mut report = SweepReport::new(match cadence {
            LeaderboardCadence::Weekly => "weekly_leaderboard",
            LeaderboardCadence::Monthly => "monthly_leaderboard",
        });
        report.processed = self.account_count();

        let entries = self.leaderboard(self.config().leaderboard_size);
        let mut lines = vec![format!("**{} Leaderboard:**", cadence.label())];
        for entry in &entries {
            lines.push(format!("{}. {} - ${}", entry.rank, entry.user_id, entry.balance));
        }
        if entries.is_empty() {
            lines.push("No accounts yet.".to_string());
        }
        report.announcement = Some(lines.join("\n"));

        if cadence == LeaderboardCadence::Monthly {
            let bonus = self.config().monthly_bonus;
            let recipients = self.config().monthly_bonus_recipients;
            for entry in entries.iter().take(recipients) {
                let mut record = self.record(&entry.user_id);
                record.balance += bonus;
                self.put_record(&entry.user_id, record);
                report.touched += 1;
                report.log_lines.push(format!(
                    "User {} received a ${bonus} leaderboard bonus (rank {}).",
                    entry.user_id, entry.rank
                ));
            }
        }

        report
    }
}
